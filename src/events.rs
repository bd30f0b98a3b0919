use serde_json::Value;
use tokio::sync::broadcast;

use crate::messages::Message;

/// Broadcasts JSON-RPC notification strings to all connected studio clients.
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<String>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    /// Send a JSON-RPC notification to all subscribers.
    pub fn broadcast(&self, method: &str, params: Value) {
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        });
        // Ignore errors — no subscribers is fine
        let _ = self
            .tx
            .send(serde_json::to_string(&notification).unwrap_or_default());
    }

    /// Subscribe to all broadcast events.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    // ─── Notification helpers ───────────────────────────────────────────────

    pub fn message_created(&self, project_id: &str, message: &Message) {
        self.broadcast(
            "message.created",
            serde_json::json!({ "projectId": project_id, "message": message }),
        );
    }

    pub fn project_saved(&self, project_id: &str) {
        self.broadcast(
            "project.saved",
            serde_json::json!({ "projectId": project_id }),
        );
    }

    pub fn project_save_failed(&self, project_id: &str, err: &anyhow::Error) {
        self.broadcast(
            "project.save_failed",
            serde_json::json!({ "projectId": project_id, "error": err.to_string() }),
        );
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_reaches_subscriber_as_jsonrpc() {
        let broadcaster = EventBroadcaster::new();
        let mut rx = broadcaster.subscribe();
        broadcaster.project_saved("p1");
        let raw = rx.try_recv().unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["jsonrpc"], "2.0");
        assert_eq!(parsed["method"], "project.saved");
        assert_eq!(parsed["params"]["projectId"], "p1");
    }

    #[test]
    fn broadcast_without_subscribers_is_fine() {
        let broadcaster = EventBroadcaster::new();
        broadcaster.project_saved("p1");
    }
}
