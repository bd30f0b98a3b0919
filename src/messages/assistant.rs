//! The scripted chat assistant.
//!
//! Every submission gets the same three staged system replies (a plan that
//! echoes the user's text, a progress update, and a changes summary) on a
//! fixed delay schedule. There is no analysis of the user's text beyond the
//! echo; the value of this module is the message contract (roles, kinds,
//! delivery order), not intelligence.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::warn;

use super::model::{Message, MessageKind, Role};
use super::storage::MessageStorage;
use crate::events::EventBroadcaster;

/// First system message of every new project.
pub const GREETING: &str = "Hello! I'm your AI assistant. I can help you build amazing applications. What would you like to create today?";

const PROGRESS_TEXT: &str = "Working on implementing the requested features...";

const CHANGES_TEXT: &str =
    "Successfully updated:\n- Modified 3 components\n- Added new styles\n- Updated configuration";

fn plan_text(user_text: &str) -> String {
    format!("I understand you want to: {user_text}\n\nLet me create a plan for that.")
}

/// When each staged reply lands, measured from the submission.
#[derive(Debug, Clone)]
pub struct AssistantScript {
    pub plan_after: Duration,
    pub progress_after: Duration,
    pub changes_after: Duration,
}

impl Default for AssistantScript {
    fn default() -> Self {
        Self {
            plan_after: Duration::from_millis(500),
            progress_after: Duration::from_millis(1500),
            changes_after: Duration::from_millis(3000),
        }
    }
}

impl AssistantScript {
    /// A schedule suitable for unit tests (no real waiting).
    pub fn instant() -> Self {
        Self {
            plan_after: Duration::from_millis(1),
            progress_after: Duration::from_millis(2),
            changes_after: Duration::from_millis(3),
        }
    }
}

pub struct ScriptedAssistant {
    messages: MessageStorage,
    broadcaster: Arc<EventBroadcaster>,
    script: AssistantScript,
}

impl ScriptedAssistant {
    pub fn new(messages: MessageStorage, broadcaster: Arc<EventBroadcaster>) -> Self {
        Self::with_script(messages, broadcaster, AssistantScript::default())
    }

    pub fn with_script(
        messages: MessageStorage,
        broadcaster: Arc<EventBroadcaster>,
        script: AssistantScript,
    ) -> Self {
        Self {
            messages,
            broadcaster,
            script,
        }
    }

    /// Persist the user's message and start the staged reply script.
    ///
    /// Returns the stored user message plus a handle on the background
    /// script, so callers that need the full exchange (tests, the CLI) can
    /// await it. A store failure mid-script aborts the remaining stages.
    pub async fn submit(&self, project_id: &str, text: &str) -> Result<(Message, JoinHandle<()>)> {
        let user = self
            .messages
            .create(project_id, Role::User, text, MessageKind::Normal)
            .await?;
        self.broadcaster.message_created(project_id, &user);

        let messages = self.messages.clone();
        let broadcaster = Arc::clone(&self.broadcaster);
        let script = self.script.clone();
        let project_id = project_id.to_string();
        let text = text.to_string();
        let handle = tokio::spawn(async move {
            let stages = [
                (script.plan_after, MessageKind::Plan, plan_text(&text)),
                (script.progress_after, MessageKind::Progress, PROGRESS_TEXT.to_string()),
                (script.changes_after, MessageKind::Changes, CHANGES_TEXT.to_string()),
            ];
            let mut elapsed = Duration::ZERO;
            for (at, kind, content) in stages {
                tokio::time::sleep(at.saturating_sub(elapsed)).await;
                elapsed = at;
                match messages.create(&project_id, Role::System, &content, kind).await {
                    Ok(message) => broadcaster.message_created(&project_id, &message),
                    Err(e) => {
                        warn!(err = %e, project_id = %project_id, "assistant script aborted");
                        return;
                    }
                }
            }
        });

        Ok((user, handle))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{CreateProjectParams, ProjectStorage};
    use crate::storage::test_pool;

    #[tokio::test]
    async fn scripted_exchange_lands_in_order() {
        let pool = test_pool().await;
        let pid = ProjectStorage::new(pool.clone())
            .create(CreateProjectParams {
                name: "test".to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id;
        let storage = MessageStorage::new(pool);
        let broadcaster = Arc::new(EventBroadcaster::new());
        let assistant = ScriptedAssistant::with_script(
            storage.clone(),
            Arc::clone(&broadcaster),
            AssistantScript::instant(),
        );

        let mut rx = broadcaster.subscribe();
        let (user, handle) = assistant.submit(&pid, "build me a dashboard").await.unwrap();
        assert_eq!(user.role, Role::User);
        handle.await.unwrap();

        let transcript = storage.list(&pid).await.unwrap();
        let kinds: Vec<MessageKind> = transcript.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            [
                MessageKind::Normal,
                MessageKind::Plan,
                MessageKind::Progress,
                MessageKind::Changes
            ]
        );
        assert_eq!(transcript[0].content, "build me a dashboard");
        // The plan echoes the user text; later stages do not.
        assert!(transcript[1].content.contains("build me a dashboard"));
        assert!(!transcript[2].content.contains("build me a dashboard"));
        assert!(transcript[3].content.starts_with("Successfully updated:"));

        // One message.created notification per message.
        let mut notified = 0;
        while rx.try_recv().is_ok() {
            notified += 1;
        }
        assert_eq!(notified, 4);
    }
}
