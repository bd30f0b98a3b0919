//! Projects: the unit of ownership for files, design elements, and messages.

pub mod model;
pub mod storage;

pub use model::{CreateProjectParams, Project, UpdateProjectParams};
pub use storage::ProjectStorage;

use anyhow::Result;

use crate::messages::{assistant, MessageKind, Role};
use crate::storage::Storage;

/// Create a project and seed it with the starter file tree, the welcome
/// design, and the assistant greeting.
pub async fn bootstrap(storage: &Storage, params: CreateProjectParams) -> Result<Project> {
    let project = storage.projects().create(params).await?;
    storage
        .files()
        .replace_tree(&project.id, &crate::files::default_file_tree())
        .await?;
    storage
        .design()
        .replace_tree(&project.id, &crate::design::default_design_tree())
        .await?;
    storage
        .messages()
        .create(&project.id, Role::System, assistant::GREETING, MessageKind::Normal)
        .await?;
    Ok(project)
}
