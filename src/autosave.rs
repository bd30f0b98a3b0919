// SPDX-License-Identifier: MIT
//! Deferred project saves.
//!
//! The studio mutates its in-memory trees on every keystroke and drag; each
//! mutation hands the scheduler a fresh snapshot via
//! [`SaveScheduler::mark_dirty`], which arms a save that fires after a quiet
//! period. A newer snapshot supersedes an armed save. Superseding is done
//! with a generation counter rather than task abort, so a save that has
//! already started writing is never killed halfway. Saves for one project
//! are serialized through a per-project lock; the stores do not tolerate two
//! concurrent replacements of the same tree.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::design::ElementNode;
use crate::events::EventBroadcaster;
use crate::files::FileNode;
use crate::storage::Storage;

/// Everything one save writes: the full file and design forests.
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    pub files: Vec<FileNode>,
    pub elements: Vec<ElementNode>,
}

#[derive(Default)]
struct ProjectSaveState {
    /// Bumped on every mark_dirty; an armed save that wakes up stale returns
    /// without writing.
    generation: u64,
    snapshot: Option<ProjectSnapshot>,
    save_lock: Arc<tokio::sync::Mutex<()>>,
}

pub struct SaveScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<Storage>,
    broadcaster: Arc<EventBroadcaster>,
    quiet: Duration,
    projects: Mutex<HashMap<String, ProjectSaveState>>,
}

impl SaveScheduler {
    pub fn new(storage: Arc<Storage>, broadcaster: Arc<EventBroadcaster>, quiet: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage,
                broadcaster,
                quiet,
                projects: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Record the latest snapshot and (re)arm the deferred save.
    pub fn mark_dirty(&self, project_id: &str, snapshot: ProjectSnapshot) {
        let generation = {
            let mut projects = self.inner.projects.lock().unwrap();
            let state = projects.entry(project_id.to_string()).or_default();
            state.generation += 1;
            state.snapshot = Some(snapshot);
            state.generation
        };
        let inner = Arc::clone(&self.inner);
        let project_id = project_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(inner.quiet).await;
            inner.fire(&project_id, generation).await;
        });
    }

    /// Save the pending snapshot immediately, disarming any deferred save.
    /// Returns `false` when nothing was pending.
    pub async fn flush(&self, project_id: &str) -> Result<bool> {
        let Some((snapshot, lock)) = self.inner.take_pending(project_id, None) else {
            return Ok(false);
        };
        let _guard = lock.lock().await;
        self.inner.save(project_id, &snapshot).await?;
        Ok(true)
    }
}

impl Inner {
    async fn fire(&self, project_id: &str, generation: u64) {
        let Some((snapshot, lock)) = self.take_pending(project_id, Some(generation)) else {
            return;
        };
        let _guard = lock.lock().await;
        if let Err(e) = self.save(project_id, &snapshot).await {
            warn!(err = %e, project_id = %project_id, "deferred save failed");
        }
    }

    /// Claim the pending snapshot. With `expected_generation`, only the save
    /// armed by that generation may claim it; a flush claims unconditionally
    /// and bumps the generation so stale timers stand down.
    fn take_pending(
        &self,
        project_id: &str,
        expected_generation: Option<u64>,
    ) -> Option<(ProjectSnapshot, Arc<tokio::sync::Mutex<()>>)> {
        let mut projects = self.projects.lock().unwrap();
        let state = projects.get_mut(project_id)?;
        if let Some(expected) = expected_generation {
            if state.generation != expected {
                debug!(project_id = %project_id, "deferred save superseded");
                return None;
            }
        } else {
            state.generation += 1;
        }
        let snapshot = state.snapshot.take()?;
        Some((snapshot, Arc::clone(&state.save_lock)))
    }

    async fn save(&self, project_id: &str, snapshot: &ProjectSnapshot) -> Result<()> {
        let result = self.persist(project_id, snapshot).await;
        match &result {
            Ok(()) => self.broadcaster.project_saved(project_id),
            Err(e) => self.broadcaster.project_save_failed(project_id, e),
        }
        result
    }

    async fn persist(&self, project_id: &str, snapshot: &ProjectSnapshot) -> Result<()> {
        self.storage
            .files()
            .replace_tree(project_id, &snapshot.files)
            .await?;
        self.storage
            .design()
            .replace_tree(project_id, &snapshot.elements)
            .await?;
        self.storage.projects().touch(project_id).await?;
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
