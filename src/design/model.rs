//! Design-canvas data models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mapper::Node;

/// A node of the design canvas tree.
pub type ElementNode = Node<ElementPayload>;

/// Inline CSS-ish properties, persisted as one JSON object per element.
pub type StyleMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPayload {
    pub kind: ElementKind,
    /// Text or label content; containers and images have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: StyleMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Container,
    Button,
    Image,
    Input,
}

impl ElementKind {
    /// Canonical string stored in `design_elements.kind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Container => "container",
            ElementKind::Button => "button",
            ElementKind::Image => "image",
            ElementKind::Input => "input",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = UnknownElementKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ElementKind::Text),
            "container" => Ok(ElementKind::Container),
            "button" => Ok(ElementKind::Button),
            "image" => Ok(ElementKind::Image),
            "input" => Ok(ElementKind::Input),
            other => Err(UnknownElementKind(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown element kind: {0}")]
pub struct UnknownElementKind(pub String);
