//! The file explorer tree: models, SQLite store, starter content.

pub mod defaults;
pub mod model;
pub mod store;

pub use defaults::default_file_tree;
pub use model::{FileKind, FileNode, FilePayload};
pub use store::FileStore;
