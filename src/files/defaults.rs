//! Starter file tree seeded into every new project.

use super::model::{FileKind, FileNode, FilePayload};
use crate::mapper::Node;

const APP_TSX: &str = r#"function App() {
  return (
    <div className="min-h-screen bg-gradient-to-br from-blue-50 to-indigo-100 flex items-center justify-center p-8">
      <div className="max-w-4xl w-full bg-white rounded-2xl shadow-xl p-12">
        <h1 className="text-5xl font-bold text-gray-900 mb-6">Welcome to AI Builder</h1>
        <p className="text-xl text-gray-600 mb-8">Start creating amazing applications with AI assistance</p>
        <button className="bg-indigo-600 text-white px-8 py-4 rounded-lg text-lg font-semibold hover:bg-indigo-700 transition-colors">
          Get Started
        </button>
      </div>
    </div>
  );
}

export default App;
"#;

const INDEX_CSS: &str = "@tailwind base;\n@tailwind components;\n@tailwind utilities;\n";

const PACKAGE_JSON: &str = r#"{
  "name": "ai-builder-project",
  "version": "1.0.0",
  "type": "module"
}
"#;

fn file(id: &str, name: &str, path: &str, language: &str, content: &str) -> FileNode {
    Node::leaf(
        id,
        FilePayload {
            name: name.to_string(),
            kind: FileKind::File,
            path: path.to_string(),
            content: Some(content.to_string()),
            language: Some(language.to_string()),
        },
    )
}

fn folder(id: &str, name: &str, path: &str, children: Vec<FileNode>) -> FileNode {
    Node {
        id: id.to_string(),
        payload: FilePayload {
            name: name.to_string(),
            kind: FileKind::Folder,
            path: path.to_string(),
            content: None,
            language: None,
        },
        children,
    }
}

/// The tree every new project starts from: a `/src` folder with the welcome
/// component and stylesheet, plus a root `package.json`.
pub fn default_file_tree() -> Vec<FileNode> {
    vec![
        folder(
            "src",
            "src",
            "/src",
            vec![
                file("app-tsx", "App.tsx", "/src/App.tsx", "typescript", APP_TSX),
                file("index-css", "index.css", "/src/index.css", "css", INDEX_CSS),
            ],
        ),
        file(
            "package-json",
            "package.json",
            "/package.json",
            "json",
            PACKAGE_JSON,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_tree_shape() {
        let tree = default_file_tree();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].payload.kind, FileKind::Folder);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[1].payload.name, "package.json");
        assert!(tree[0].children[0]
            .payload
            .content
            .as_deref()
            .unwrap()
            .contains("Welcome to AI Builder"));
    }
}
