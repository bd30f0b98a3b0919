pub mod autosave;
pub mod cli;
pub mod config;
pub mod design;
pub mod events;
pub mod files;
pub mod mapper;
pub mod messages;
pub mod project;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;

use autosave::SaveScheduler;
use config::HostConfig;
use events::EventBroadcaster;
use messages::ScriptedAssistant;
use storage::Storage;

/// Shared application state passed to every command and background task.
#[derive(Clone)]
pub struct HostContext {
    pub config: Arc<HostConfig>,
    pub storage: Arc<Storage>,
    pub broadcaster: Arc<EventBroadcaster>,
    pub autosave: Arc<SaveScheduler>,
}

impl HostContext {
    pub async fn new(config: HostConfig) -> Result<Self> {
        let storage = Arc::new(Storage::new(&config.data_dir).await?);
        let broadcaster = Arc::new(EventBroadcaster::new());
        let autosave = Arc::new(SaveScheduler::new(
            Arc::clone(&storage),
            Arc::clone(&broadcaster),
            config.autosave_quiet(),
        ));
        Ok(Self {
            config: Arc::new(config),
            storage,
            broadcaster,
            autosave,
        })
    }

    /// The scripted chat assistant, on this context's store and broadcaster.
    pub fn assistant(&self) -> ScriptedAssistant {
        ScriptedAssistant::new(self.storage.messages(), Arc::clone(&self.broadcaster))
    }
}
