//! Bookmark Store
//!
//! The stateful bookmark collection the sorter reconciles against. Every
//! store exposes the same four asynchronous operations; identities are owned
//! and assigned by the store.

pub mod memory;
pub mod persistence;
pub mod state;

use crate::error::StoreError;
use crate::tree::BookmarkNode;
use crate::types::{NodeId, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use memory::{MemoryBookmarkStore, StoreOperation};
pub use persistence::SledBookmarkStore;

/// A node as the store currently holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub index: Option<usize>,
    pub title: String,
    pub url: Option<String>,
    pub date_added: Option<Timestamp>,
}

impl StoredNode {
    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }
}

/// Target position of a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub parent_id: NodeId,
    pub index: usize,
}

/// Arguments of a create. `url: None` creates a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDetails {
    pub parent_id: NodeId,
    pub index: usize,
    pub title: String,
    pub url: Option<String>,
}

/// Bookmark store interface
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Full snapshot rooted at the synthetic root.
    async fn get_tree(&self) -> Result<BookmarkNode, StoreError>;

    /// Existence check; `None` when no node has this identity.
    async fn get(&self, id: &str) -> Result<Option<StoredNode>, StoreError>;

    async fn move_node(&self, id: &str, destination: Destination)
        -> Result<StoredNode, StoreError>;

    /// Create a node; the returned node carries the assigned identity.
    async fn create(&self, details: CreateDetails) -> Result<StoredNode, StoreError>;
}
