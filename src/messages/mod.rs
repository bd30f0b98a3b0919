//! The chat log and the scripted assistant behind it.

pub mod assistant;
pub mod model;
pub mod storage;

pub use assistant::{AssistantScript, ScriptedAssistant};
pub use model::{Message, MessageKind, Role};
pub use storage::MessageStorage;
