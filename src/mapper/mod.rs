// SPDX-License-Identifier: MIT
//! Order-preserving conversion between node forests and flat record sets.
//!
//! The studio keeps two tree-shaped models in memory (the file explorer and
//! the design-element canvas) and persists both through the same mapping:
//! [`flatten`] walks a forest depth-first and writes one parent-referencing
//! record per node, [`rebuild`] reconstructs the forest from the stored
//! records. Sibling order survives the round trip; it is carried entirely by
//! each record's `position` (ties broken by insertion order), never by
//! logical id or write timestamp.
//!
//! The mapper owns no storage. Callers hand in any [`TreeStore`]
//! implementation: the SQLite-backed stores in production, an in-memory
//! double in tests.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

// ─── Node & record types ──────────────────────────────────────────────────────

/// One node of an in-memory forest, generic over the domain payload.
///
/// `id` is the caller-assigned logical identifier, unique within one forest
/// snapshot. `children` order is sibling display order and is preserved by a
/// flatten/rebuild round trip; an empty list and an omitted list are the
/// same thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node<P> {
    pub id: String,
    pub payload: P,
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node<P>>,
}

impl<P> Node<P> {
    pub fn leaf(id: impl Into<String>, payload: P) -> Self {
        Self {
            id: id.into(),
            payload,
            children: Vec::new(),
        }
    }
}

/// Store-assigned record identifier. Lives in storage space: distinct from
/// the logical `Node::id`, and not observable through a rebuilt forest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record handed to [`TreeStore::insert_one`]. The parent key is the key
/// the store assigned to the parent's own insert, so parents are always
/// written before their children.
#[derive(Debug)]
pub struct NewRecord<'a, P> {
    pub logical_id: &'a str,
    pub payload: &'a P,
    pub parent: Option<&'a RecordKey>,
    /// 0-based index among the node's siblings at write time.
    pub position: i64,
}

/// A record as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord<P> {
    pub key: RecordKey,
    pub logical_id: String,
    pub payload: P,
    pub parent: Option<RecordKey>,
    pub position: i64,
}

// ─── Store contract ───────────────────────────────────────────────────────────

/// The three storage primitives the mapper consumes, all scoped by project.
///
/// Implementations decide what a key looks like and whether the
/// delete-then-insert sequence of a flatten is atomic; the mapper itself
/// makes no atomicity promise and retries nothing.
#[async_trait]
pub trait TreeStore {
    type Payload: Send + Sync;

    /// Remove every record for the project.
    async fn delete_all(&mut self, project_id: &str) -> Result<()>;

    /// Persist one record, returning the store-assigned key.
    async fn insert_one(
        &mut self,
        project_id: &str,
        record: NewRecord<'_, Self::Payload>,
    ) -> Result<RecordKey>;

    /// All records for the project, ordered by `position` ascending with
    /// ties broken by insertion order.
    async fn fetch_all(&mut self, project_id: &str) -> Result<Vec<StoredRecord<Self::Payload>>>;
}

// ─── Flatten ──────────────────────────────────────────────────────────────────

/// Replace the project's stored records with a flat encoding of `forest`.
///
/// Existing records are purged first; this is a full replacement, never a
/// merge. Nodes are then written depth-first, pre-order, so a parent's
/// store-assigned key is known before any of its children are inserted.
///
/// On a store failure the operation aborts and the error propagates;
/// records already written in this attempt stay behind unless the store
/// makes the whole sequence atomic (the SQLite stores do).
pub async fn flatten<S>(store: &mut S, project_id: &str, forest: &[Node<S::Payload>]) -> Result<()>
where
    S: TreeStore + Send,
{
    store.delete_all(project_id).await?;

    // Explicit stack, pushed in reverse so siblings pop left-to-right.
    let mut stack: Vec<(&Node<S::Payload>, Option<RecordKey>, i64)> = Vec::new();
    for (position, root) in forest.iter().enumerate().rev() {
        stack.push((root, None, position as i64));
    }

    while let Some((node, parent, position)) = stack.pop() {
        let key = store
            .insert_one(
                project_id,
                NewRecord {
                    logical_id: &node.id,
                    payload: &node.payload,
                    parent: parent.as_ref(),
                    position,
                },
            )
            .await?;
        for (position, child) in node.children.iter().enumerate().rev() {
            stack.push((child, Some(key.clone()), position as i64));
        }
    }

    Ok(())
}

// ─── Rebuild ──────────────────────────────────────────────────────────────────

/// Reconstruct the project's forest from its stored records.
///
/// Records are indexed by key, then attached to their parent's child list in
/// fetched (position) order. A record whose parent key is absent or does not
/// resolve to a fetched record becomes a root. Dangling references are a
/// structural anomaly, logged and tolerated, never fatal. A project with no
/// records yields an empty forest.
pub async fn rebuild<S>(store: &mut S, project_id: &str) -> Result<Vec<Node<S::Payload>>>
where
    S: TreeStore + Send,
{
    let records = store.fetch_all(project_id).await?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let mut index: HashMap<RecordKey, usize> = HashMap::with_capacity(records.len());
    for (slot, record) in records.iter().enumerate() {
        index.insert(record.key.clone(), slot);
    }

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (slot, record) in records.iter().enumerate() {
        match record.parent.as_ref().and_then(|p| index.get(p).copied()) {
            Some(parent) if parent != slot => children_of[parent].push(slot),
            Some(_) => {
                warn!(key = record.key.as_str(), "record is its own parent, promoting to root");
                roots.push(slot);
            }
            None => {
                if record.parent.is_some() {
                    warn!(
                        key = record.key.as_str(),
                        "record references a missing parent, promoting to root"
                    );
                }
                roots.push(slot);
            }
        }
    }

    let mut slots: Vec<Option<StoredRecord<S::Payload>>> = records.into_iter().map(Some).collect();
    let mut assembled = 0usize;
    let mut forest = Vec::with_capacity(roots.len());
    for root in roots {
        forest.push(assemble(root, &mut slots, &children_of, &mut assembled));
    }

    if assembled < slots.len() {
        // Parent cycles in corrupt data are unreachable from any root.
        warn!(
            dropped = slots.len() - assembled,
            "records unreachable from any root were dropped"
        );
    }

    Ok(forest)
}

fn assemble<P>(
    slot: usize,
    slots: &mut Vec<Option<StoredRecord<P>>>,
    children_of: &[Vec<usize>],
    assembled: &mut usize,
) -> Node<P> {
    // Every slot appears in exactly one child list or in the root list.
    let record = slots[slot].take().expect("record assembled twice");
    *assembled += 1;
    let children = children_of[slot]
        .iter()
        .map(|&child| assemble(child, slots, children_of, assembled))
        .collect();
    Node {
        id: record.logical_id,
        payload: record.payload,
        children,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
