// SPDX-License-Identifier: MIT
//! File-tree SQLite operations.
//!
//! `replace_tree` and `load_tree` drive the generic mapper against the
//! `files` table. The whole flatten runs inside one transaction, so readers
//! never observe the window between the purge and the last insert, and a
//! failed save leaves the previous tree intact.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::model::{FileNode, FilePayload};
use crate::mapper::{self, NewRecord, RecordKey, StoredRecord, TreeStore};

pub struct FileStore {
    pool: SqlitePool,
}

impl FileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace the project's stored file tree with `forest`.
    pub async fn replace_tree(&self, project_id: &str, forest: &[FileNode]) -> Result<()> {
        let mut records = FileRecords {
            tx: self.pool.begin().await?,
        };
        mapper::flatten(&mut records, project_id, forest).await?;
        records.tx.commit().await?;
        Ok(())
    }

    /// Load the project's file tree from a consistent read snapshot.
    pub async fn load_tree(&self, project_id: &str) -> Result<Vec<FileNode>> {
        let mut records = FileRecords {
            tx: self.pool.begin().await?,
        };
        let forest = mapper::rebuild(&mut records, project_id).await?;
        records.tx.commit().await?;
        Ok(forest)
    }

    /// Update one file's content in place (code editor saves). Returns
    /// whether a matching file existed.
    pub async fn update_content(
        &self,
        project_id: &str,
        logical_id: &str,
        content: &str,
    ) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let rows = sqlx::query(
            "UPDATE files SET content = ?, updated_at = ? WHERE project_id = ? AND file_id = ?",
        )
        .bind(content)
        .bind(&now)
        .bind(project_id)
        .bind(logical_id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows > 0)
    }
}

// ─── Record access ────────────────────────────────────────────────────────────

struct FileRecords {
    tx: Transaction<'static, Sqlite>,
}

#[derive(Debug, sqlx::FromRow)]
struct FileRow {
    id: String,
    file_id: String,
    name: String,
    kind: String,
    path: String,
    content: Option<String>,
    language: Option<String>,
    parent_id: Option<String>,
    position: i64,
}

impl FileRow {
    fn into_record(self) -> Result<StoredRecord<FilePayload>> {
        let kind = self
            .kind
            .parse()
            .with_context(|| format!("file record {}", self.id))?;
        Ok(StoredRecord {
            key: RecordKey::new(self.id),
            logical_id: self.file_id,
            payload: FilePayload {
                name: self.name,
                kind,
                path: self.path,
                content: self.content,
                language: self.language,
            },
            parent: self.parent_id.map(RecordKey::new),
            position: self.position,
        })
    }
}

#[async_trait]
impl TreeStore for FileRecords {
    type Payload = FilePayload;

    async fn delete_all(&mut self, project_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM files WHERE project_id = ?")
            .bind(project_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_one(
        &mut self,
        project_id: &str,
        record: NewRecord<'_, FilePayload>,
    ) -> Result<RecordKey> {
        let key = RecordKey::new(Uuid::new_v4().to_string());
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO files \
             (id, project_id, file_id, name, kind, path, content, language, parent_id, position, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(key.as_str())
        .bind(project_id)
        .bind(record.logical_id)
        .bind(&record.payload.name)
        .bind(record.payload.kind.as_str())
        .bind(&record.payload.path)
        .bind(&record.payload.content)
        .bind(&record.payload.language)
        .bind(record.parent.map(RecordKey::as_str))
        .bind(record.position)
        .bind(&now)
        .bind(&now)
        .execute(&mut *self.tx)
        .await?;
        Ok(key)
    }

    async fn fetch_all(&mut self, project_id: &str) -> Result<Vec<StoredRecord<FilePayload>>> {
        let rows: Vec<FileRow> = sqlx::query_as(
            "SELECT id, file_id, name, kind, path, content, language, parent_id, position \
             FROM files WHERE project_id = ? \
             ORDER BY position ASC, rowid ASC",
        )
        .bind(project_id)
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter().map(FileRow::into_record).collect()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::model::FileKind;
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

    fn file(id: &str, name: &str, path: &str) -> FileNode {
        Node::leaf(
            id,
            FilePayload {
                name: name.to_string(),
                kind: FileKind::File,
                path: path.to_string(),
                content: Some(format!("// {name}")),
                language: Some("typescript".to_string()),
            },
        )
    }

    fn folder(id: &str, name: &str, path: &str, children: Vec<FileNode>) -> FileNode {
        Node {
            id: id.to_string(),
            payload: FilePayload {
                name: name.to_string(),
                kind: FileKind::Folder,
                path: path.to_string(),
                content: None,
                language: None,
            },
            children,
        }
    }

    #[tokio::test]
    async fn replace_and_load_roundtrip() {
        let pool = test_pool().await;
        let pid = project(&pool).await;
        let store = FileStore::new(pool);

        let forest = vec![
            folder(
                "src",
                "src",
                "/src",
                vec![
                    file("app", "App.tsx", "/src/App.tsx"),
                    file("css", "index.css", "/src/index.css"),
                ],
            ),
            file("pkg", "package.json", "/package.json"),
        ];
        store.replace_tree(&pid, &forest).await.unwrap();
        let loaded = store.load_tree(&pid).await.unwrap();
        assert_eq!(loaded, forest);
    }

    #[tokio::test]
    async fn replace_purges_previous_records() {
        let pool = test_pool().await;
        let pid = project(&pool).await;
        let store = FileStore::new(pool.clone());

        store
            .replace_tree(&pid, &[file("old", "old.ts", "/old.ts")])
            .await
            .unwrap();
        store
            .replace_tree(&pid, &[file("new", "new.ts", "/new.ts")])
            .await
            .unwrap();

        let loaded = store.load_tree(&pid).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "new");

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files WHERE project_id = ?")
            .bind(&pid)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn load_missing_project_is_empty() {
        let pool = test_pool().await;
        let store = FileStore::new(pool);
        let loaded = store.load_tree("nope").await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn update_content_edits_in_place() {
        let pool = test_pool().await;
        let pid = project(&pool).await;
        let store = FileStore::new(pool);

        store
            .replace_tree(&pid, &[file("app", "App.tsx", "/src/App.tsx")])
            .await
            .unwrap();
        let matched = store.update_content(&pid, "app", "export {}").await.unwrap();
        assert!(matched);

        let loaded = store.load_tree(&pid).await.unwrap();
        assert_eq!(loaded[0].payload.content.as_deref(), Some("export {}"));

        let missing = store.update_content(&pid, "ghost", "x").await.unwrap();
        assert!(!missing);
    }

    #[tokio::test]
    async fn deleting_project_cascades_to_files() {
        let pool = test_pool().await;
        let pid = project(&pool).await;
        let store = FileStore::new(pool.clone());
        store
            .replace_tree(&pid, &[file("app", "App.tsx", "/src/App.tsx")])
            .await
            .unwrap();

        ProjectStorage::new(pool.clone()).delete(&pid).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
