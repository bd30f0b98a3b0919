// SPDX-License-Identifier: MIT
//! Message SQLite operations.

use anyhow::{Context as _, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::model::{Message, MessageKind, Role};

#[derive(Clone)]
pub struct MessageStorage {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: String,
    role: String,
    content: String,
    kind: String,
    created_at: String,
}

impl MessageRow {
    fn into_message(self) -> Result<Message> {
        let role = self
            .role
            .parse()
            .with_context(|| format!("message {}", self.id))?;
        let kind = self
            .kind
            .parse()
            .with_context(|| format!("message {}", self.id))?;
        Ok(Message {
            id: self.id,
            role,
            content: self.content,
            kind,
            created_at: self.created_at,
        })
    }
}

impl MessageStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        project_id: &str,
        role: Role,
        content: &str,
        kind: MessageKind,
    ) -> Result<Message> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO messages (id, project_id, role, content, kind, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(project_id)
        .bind(role.as_str())
        .bind(content)
        .bind(kind.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(Message {
            id,
            role,
            content: content.to_string(),
            kind,
            created_at: now,
        })
    }

    /// Full transcript, oldest first. Rowid breaks timestamp ties so bursts
    /// written within the same instant keep their insertion order.
    pub async fn list(&self, project_id: &str) -> Result<Vec<Message>> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, role, content, kind, created_at FROM messages \
             WHERE project_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MessageRow::into_message).collect()
    }

    pub async fn count(&self, project_id: &str) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE project_id = ?")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{CreateProjectParams, ProjectStorage};
    use crate::storage::test_pool;

    async fn project(pool: &SqlitePool) -> String {
        ProjectStorage::new(pool.clone())
            .create(CreateProjectParams {
                name: "test".to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn create_and_list_in_order() {
        let pool = test_pool().await;
        let pid = project(&pool).await;
        let s = MessageStorage::new(pool);

        s.create(&pid, Role::User, "make it blue", MessageKind::Normal)
            .await
            .unwrap();
        s.create(&pid, Role::System, "planning", MessageKind::Plan)
            .await
            .unwrap();
        s.create(&pid, Role::System, "done", MessageKind::Changes)
            .await
            .unwrap();

        let transcript = s.list(&pid).await.unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[1].kind, MessageKind::Plan);
        assert_eq!(transcript[2].kind, MessageKind::Changes);
        assert_eq!(s.count(&pid).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn empty_project_has_empty_transcript() {
        let pool = test_pool().await;
        let pid = project(&pool).await;
        let s = MessageStorage::new(pool);
        assert!(s.list(&pid).await.unwrap().is_empty());
        assert_eq!(s.count(&pid).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn message_serialises_to_camel_case() {
        let message = Message {
            id: "m1".to_string(),
            role: Role::System,
            content: "hi".to_string(),
            kind: MessageKind::Plan,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"plan\""));
        assert!(json.contains("\"system\""));
    }
}
