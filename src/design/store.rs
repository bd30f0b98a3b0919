// SPDX-License-Identifier: MIT
//! Design-element SQLite operations.
//!
//! Same shape as the file store: the generic mapper over the
//! `design_elements` table, with each replacement running in one
//! transaction.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::model::{ElementNode, ElementPayload, StyleMap};
use crate::mapper::{self, NewRecord, RecordKey, StoredRecord, TreeStore};

pub struct DesignStore {
    pool: SqlitePool,
}

impl DesignStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace the project's stored design tree with `forest`.
    pub async fn replace_tree(&self, project_id: &str, forest: &[ElementNode]) -> Result<()> {
        let mut records = ElementRecords {
            tx: self.pool.begin().await?,
        };
        mapper::flatten(&mut records, project_id, forest).await?;
        records.tx.commit().await?;
        Ok(())
    }

    /// Load the project's design tree from a consistent read snapshot.
    pub async fn load_tree(&self, project_id: &str) -> Result<Vec<ElementNode>> {
        let mut records = ElementRecords {
            tx: self.pool.begin().await?,
        };
        let forest = mapper::rebuild(&mut records, project_id).await?;
        records.tx.commit().await?;
        Ok(forest)
    }
}

// ─── Record access ────────────────────────────────────────────────────────────

struct ElementRecords {
    tx: Transaction<'static, Sqlite>,
}

#[derive(Debug, sqlx::FromRow)]
struct ElementRow {
    id: String,
    element_id: String,
    kind: String,
    content: Option<String>,
    styles: String,
    parent_id: Option<String>,
    position: i64,
}

impl ElementRow {
    fn into_record(self) -> Result<StoredRecord<ElementPayload>> {
        let kind = self
            .kind
            .parse()
            .with_context(|| format!("design record {}", self.id))?;
        let styles: StyleMap = serde_json::from_str(&self.styles)
            .with_context(|| format!("design record {} styles", self.id))?;
        Ok(StoredRecord {
            key: RecordKey::new(self.id),
            logical_id: self.element_id,
            payload: ElementPayload {
                kind,
                content: self.content,
                styles,
            },
            parent: self.parent_id.map(RecordKey::new),
            position: self.position,
        })
    }
}

#[async_trait]
impl TreeStore for ElementRecords {
    type Payload = ElementPayload;

    async fn delete_all(&mut self, project_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM design_elements WHERE project_id = ?")
            .bind(project_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_one(
        &mut self,
        project_id: &str,
        record: NewRecord<'_, ElementPayload>,
    ) -> Result<RecordKey> {
        let key = RecordKey::new(Uuid::new_v4().to_string());
        let now = Utc::now().to_rfc3339();
        let styles = serde_json::to_string(&record.payload.styles)?;
        sqlx::query(
            "INSERT INTO design_elements \
             (id, project_id, element_id, kind, content, styles, parent_id, position, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(key.as_str())
        .bind(project_id)
        .bind(record.logical_id)
        .bind(record.payload.kind.as_str())
        .bind(&record.payload.content)
        .bind(&styles)
        .bind(record.parent.map(RecordKey::as_str))
        .bind(record.position)
        .bind(&now)
        .bind(&now)
        .execute(&mut *self.tx)
        .await?;
        Ok(key)
    }

    async fn fetch_all(&mut self, project_id: &str) -> Result<Vec<StoredRecord<ElementPayload>>> {
        let rows: Vec<ElementRow> = sqlx::query_as(
            "SELECT id, element_id, kind, content, styles, parent_id, position \
             FROM design_elements WHERE project_id = ? \
             ORDER BY position ASC, rowid ASC",
        )
        .bind(project_id)
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter().map(ElementRow::into_record).collect()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::defaults::default_design_tree;
    use crate::design::model::ElementKind;
    use crate::mapper::Node;
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

    fn text(id: &str, content: &str) -> ElementNode {
        Node::leaf(
            id,
            ElementPayload {
                kind: ElementKind::Text,
                content: Some(content.to_string()),
                styles: StyleMap::new(),
            },
        )
    }

    #[tokio::test]
    async fn default_design_roundtrips() {
        let pool = test_pool().await;
        let pid = project(&pool).await;
        let store = DesignStore::new(pool);

        let forest = default_design_tree();
        store.replace_tree(&pid, &forest).await.unwrap();
        let loaded = store.load_tree(&pid).await.unwrap();
        assert_eq!(loaded, forest);

        // Spot-check nesting: root container → card → three leaves.
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].children.len(), 1);
        let card = &loaded[0].children[0];
        let leaves: Vec<&str> = card.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(leaves, ["title", "description", "cta-button"]);
    }

    #[tokio::test]
    async fn styles_survive_as_json() {
        let pool = test_pool().await;
        let pid = project(&pool).await;
        let store = DesignStore::new(pool.clone());

        let mut styles = StyleMap::new();
        styles.insert("backgroundColor".to_string(), "#3b82f6".to_string());
        styles.insert("padding".to_string(), "16px 32px".to_string());
        let forest = vec![Node::leaf(
            "cta",
            ElementPayload {
                kind: ElementKind::Button,
                content: Some("Get Started".to_string()),
                styles: styles.clone(),
            },
        )];
        store.replace_tree(&pid, &forest).await.unwrap();

        let raw: (String,) =
            sqlx::query_as("SELECT styles FROM design_elements WHERE element_id = 'cta'")
                .fetch_one(&pool)
                .await
                .unwrap();
        let parsed: StyleMap = serde_json::from_str(&raw.0).unwrap();
        assert_eq!(parsed, styles);

        let loaded = store.load_tree(&pid).await.unwrap();
        assert_eq!(loaded[0].payload.styles, styles);
    }

    #[tokio::test]
    async fn sibling_order_preserved_across_replace() {
        let pool = test_pool().await;
        let pid = project(&pool).await;
        let store = DesignStore::new(pool);

        let forest = vec![Node {
            id: "row".to_string(),
            payload: ElementPayload {
                kind: ElementKind::Container,
                content: None,
                styles: StyleMap::new(),
            },
            children: vec![text("z", "last id, first slot"), text("a", "first id, last slot")],
        }];
        store.replace_tree(&pid, &forest).await.unwrap();
        let loaded = store.load_tree(&pid).await.unwrap();
        let order: Vec<&str> = loaded[0].children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, ["z", "a"]);
    }
}
