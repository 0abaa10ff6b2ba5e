//! Persistent bookmark store backed by sled.
//!
//! Layout: tree `nodes` maps identity -> bincode `NodeEntry`; tree `meta`
//! holds the identity counter under `next_id`.

use crate::error::StoreError;
use crate::store::state::{self, EntryBackend, NodeEntry};
use crate::store::{BookmarkStore, CreateDetails, Destination, StoredNode};
use crate::tree::BookmarkNode;
use crate::types::{NodeId, ROOT_ID};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use tracing::debug;

const NEXT_ID_KEY: &[u8] = b"next_id";

/// Bookmark store persisted in a sled database.
pub struct SledBookmarkStore {
    db: sled::Db,
    nodes: sled::Tree,
    meta: sled::Tree,
    write_lock: Mutex<()>,
}

impl SledBookmarkStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        debug!(path = %path.display(), "Opening sled bookmark store");
        Self::from_db(sled::open(path)?)
    }

    /// Store in a temporary database removed on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        let nodes = db.open_tree("nodes")?;
        let meta = db.open_tree("meta")?;
        let store = Self {
            db,
            nodes,
            meta,
            write_lock: Mutex::new(()),
        };
        let mut entries = store.entries();
        if entries.entry(ROOT_ID)?.is_none() {
            entries.put(NodeEntry::root())?;
        }
        Ok(store)
    }

    fn entries(&self) -> SledEntries<'_> {
        SledEntries {
            nodes: &self.nodes,
            meta: &self.meta,
        }
    }

    /// Replace the whole store with `root`, keeping its identities.
    pub fn replace_with_snapshot(&self, root: &BookmarkNode) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        state::load_snapshot(&mut self.entries(), root)?;
        self.flush()
    }

    /// Number of stored nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

struct SledEntries<'a> {
    nodes: &'a sled::Tree,
    meta: &'a sled::Tree,
}

impl EntryBackend for SledEntries<'_> {
    fn entry(&self, id: &str) -> Result<Option<NodeEntry>, StoreError> {
        match self.nodes.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&mut self, entry: NodeEntry) -> Result<(), StoreError> {
        let bytes = bincode::serialize(&entry)?;
        self.nodes.insert(entry.id.as_bytes(), bytes)?;
        Ok(())
    }

    fn allocate_id(&mut self) -> Result<NodeId, StoreError> {
        let mut next = match self.meta.get(NEXT_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_ref().try_into().map_err(|_| {
                    StoreError::Storage("corrupt identity counter".to_string())
                })?;
                u64::from_be_bytes(raw)
            }
            None => 1,
        };
        let id = loop {
            let candidate = next.to_string();
            next += 1;
            if !self.nodes.contains_key(candidate.as_bytes())? {
                break candidate;
            }
        };
        self.meta.insert(NEXT_ID_KEY, next.to_be_bytes().to_vec())?;
        Ok(id)
    }

    fn reset(&mut self, reserved_up_to: u64) -> Result<(), StoreError> {
        self.nodes.clear()?;
        self.meta
            .insert(NEXT_ID_KEY, (reserved_up_to + 1).to_be_bytes().to_vec())?;
        Ok(())
    }
}

#[async_trait]
impl BookmarkStore for SledBookmarkStore {
    async fn get_tree(&self) -> Result<BookmarkNode, StoreError> {
        let _guard = self.write_lock.lock();
        state::tree(&self.entries())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredNode>, StoreError> {
        let _guard = self.write_lock.lock();
        state::stored(&self.entries(), id)
    }

    async fn move_node(
        &self,
        id: &str,
        destination: Destination,
    ) -> Result<StoredNode, StoreError> {
        let _guard = self.write_lock.lock();
        state::move_node(&mut self.entries(), id, &destination)
    }

    async fn create(&self, details: CreateDetails) -> Result<StoredNode, StoreError> {
        let _guard = self.write_lock.lock();
        state::create(&mut self.entries(), &details)
    }
}
