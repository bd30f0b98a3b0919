// SPDX-License-Identifier: MIT
//! Project SQLite operations.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::model::*;

pub struct ProjectStorage {
    pool: SqlitePool,
}

impl ProjectStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, params: CreateProjectParams) -> Result<Project> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO projects (id, name, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&params.name)
        .bind(&params.description)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("project not found after insert"))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Project>> {
        Ok(sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list(&self) -> Result<Vec<Project>> {
        Ok(
            sqlx::query_as("SELECT * FROM projects ORDER BY updated_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn update(&self, id: &str, params: UpdateProjectParams) -> Result<Project> {
        let now = Utc::now().to_rfc3339();
        // Partial update — only set fields that were provided
        sqlx::query(
            "UPDATE projects SET \
             name = COALESCE(?, name), \
             description = COALESCE(?, description), \
             updated_at = ? \
             WHERE id = ?",
        )
        .bind(&params.name)
        .bind(&params.description)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("PROJECT_NOT_FOUND: {}", id))
    }

    /// Bump `updated_at` after a save without touching anything else.
    pub async fn touch(&self, id: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE projects SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_pool;

    fn storage(pool: SqlitePool) -> ProjectStorage {
        ProjectStorage::new(pool)
    }

    #[tokio::test]
    async fn test_create_project() {
        let s = storage(test_pool().await);
        let p = s
            .create(CreateProjectParams {
                name: "MyProject".to_string(),
                description: Some("A test project".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(p.name, "MyProject");
        assert_eq!(p.description.as_deref(), Some("A test project"));
        assert_eq!(p.created_at, p.updated_at);
    }

    #[tokio::test]
    async fn test_list_projects() {
        let s = storage(test_pool().await);
        for name in ["Alpha", "Beta"] {
            s.create(CreateProjectParams {
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap();
        }
        let projects = s.list().await.unwrap();
        assert_eq!(projects.len(), 2);
    }

    #[tokio::test]
    async fn test_update_project() {
        let s = storage(test_pool().await);
        let created = s
            .create(CreateProjectParams {
                name: "Original".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let updated = s
            .update(
                &created.id,
                UpdateProjectParams {
                    name: Some("Updated".to_string()),
                    description: Some("New desc".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Updated");
        assert_eq!(updated.description.as_deref(), Some("New desc"));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_delete_project() {
        let s = storage(test_pool().await);
        let p = s
            .create(CreateProjectParams {
                name: "ToDelete".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let existed = s.delete(&p.id).await.unwrap();
        assert!(existed);
        assert!(s.get(&p.id).await.unwrap().is_none());
        // Deleting again returns false
        assert!(!s.delete(&p.id).await.unwrap());
    }
}
