//! The design canvas tree: models, SQLite store, starter content.

pub mod defaults;
pub mod model;
pub mod store;

pub use defaults::default_design_tree;
pub use model::{ElementKind, ElementNode, ElementPayload, StyleMap};
pub use store::DesignStore;
