//! Welcome design seeded into every new project's canvas.

use super::model::{ElementKind, ElementNode, ElementPayload, StyleMap};
use crate::mapper::Node;

fn styles(pairs: &[(&str, &str)]) -> StyleMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn element(
    id: &str,
    kind: ElementKind,
    content: Option<&str>,
    styles: StyleMap,
    children: Vec<ElementNode>,
) -> ElementNode {
    Node {
        id: id.to_string(),
        payload: ElementPayload {
            kind,
            content: content.map(str::to_string),
            styles,
        },
        children,
    }
}

/// The canvas every new project starts from: a centered card with a title,
/// a description, and a call-to-action button.
pub fn default_design_tree() -> Vec<ElementNode> {
    vec![element(
        "root",
        ElementKind::Container,
        None,
        styles(&[
            ("display", "flex"),
            ("justifyContent", "center"),
            ("alignItems", "center"),
            ("backgroundColor", "#f3f4f6"),
            ("padding", "32px"),
        ]),
        vec![element(
            "card",
            ElementKind::Container,
            None,
            styles(&[
                ("backgroundColor", "#ffffff"),
                ("padding", "48px"),
                ("borderRadius", "16px"),
                ("width", "100%"),
            ]),
            vec![
                element(
                    "title",
                    ElementKind::Text,
                    Some("Welcome to AI Builder"),
                    styles(&[
                        ("fontSize", "48px"),
                        ("fontWeight", "bold"),
                        ("color", "#111827"),
                        ("margin", "0 0 24px 0"),
                    ]),
                    vec![],
                ),
                element(
                    "description",
                    ElementKind::Text,
                    Some("Start creating amazing applications with AI assistance"),
                    styles(&[
                        ("fontSize", "20px"),
                        ("color", "#4b5563"),
                        ("margin", "0 0 32px 0"),
                    ]),
                    vec![],
                ),
                element(
                    "cta-button",
                    ElementKind::Button,
                    Some("Get Started"),
                    styles(&[
                        ("backgroundColor", "#4f46e5"),
                        ("color", "#ffffff"),
                        ("padding", "16px 32px"),
                        ("borderRadius", "8px"),
                        ("fontSize", "18px"),
                        ("fontWeight", "600"),
                    ]),
                    vec![],
                ),
            ],
        )],
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_canvas_shape() {
        let tree = default_design_tree();
        assert_eq!(tree.len(), 1);
        let card = &tree[0].children[0];
        assert_eq!(card.children.len(), 3);
        assert_eq!(card.children[2].payload.kind, ElementKind::Button);
        assert_eq!(
            card.children[2].payload.content.as_deref(),
            Some("Get Started")
        );
    }
}
