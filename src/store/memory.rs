//! In-memory bookmark store.

use crate::error::StoreError;
use crate::store::state::{self, MemoryEntries};
use crate::store::{BookmarkStore, CreateDetails, Destination, StoredNode};
use crate::tree::BookmarkNode;
use crate::types::NodeId;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

/// A mutation issued against a store, recorded in issue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreOperation {
    Move {
        id: NodeId,
        parent_id: NodeId,
        index: usize,
    },
    Create {
        assigned_id: NodeId,
        parent_id: NodeId,
        index: usize,
        title: String,
        folder: bool,
    },
}

/// Bookmark store held entirely in memory.
///
/// Mutations are serialized by a lock and every successful one is appended
/// to an operation log.
pub struct MemoryBookmarkStore {
    entries: RwLock<MemoryEntries>,
    operations: Mutex<Vec<StoreOperation>>,
}

impl MemoryBookmarkStore {
    /// Store holding only the root folder.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(MemoryEntries::new()),
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Store seeded with `root` and its identities.
    pub fn from_snapshot(root: &BookmarkNode) -> Result<Self, StoreError> {
        let mut entries = MemoryEntries::new();
        state::load_snapshot(&mut entries, root)?;
        Ok(Self {
            entries: RwLock::new(entries),
            operations: Mutex::new(Vec::new()),
        })
    }

    /// Mutations applied so far.
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.operations.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryBookmarkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookmarkStore for MemoryBookmarkStore {
    async fn get_tree(&self) -> Result<BookmarkNode, StoreError> {
        state::tree(&*self.entries.read())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredNode>, StoreError> {
        state::stored(&*self.entries.read(), id)
    }

    async fn move_node(
        &self,
        id: &str,
        destination: Destination,
    ) -> Result<StoredNode, StoreError> {
        let moved = state::move_node(&mut *self.entries.write(), id, &destination)?;
        self.operations.lock().push(StoreOperation::Move {
            id: id.to_string(),
            parent_id: destination.parent_id,
            index: destination.index,
        });
        Ok(moved)
    }

    async fn create(&self, details: CreateDetails) -> Result<StoredNode, StoreError> {
        let created = state::create(&mut *self.entries.write(), &details)?;
        self.operations.lock().push(StoreOperation::Create {
            assigned_id: created.id.clone(),
            parent_id: details.parent_id,
            index: details.index,
            title: details.title,
            folder: details.url.is_none(),
        });
        Ok(created)
    }
}
