//! Store mutation rules shared by every store backend.
//!
//! A backend only needs to read, write and allocate node entries; the
//! create/move/tree semantics live here once.

use crate::error::StoreError;
use crate::store::{CreateDetails, Destination, StoredNode};
use crate::tree::{validate_snapshot, BookmarkNode, NodeKind};
use crate::types::{now_millis, NodeId, Timestamp, ROOT_ID};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Persisted form of one node. Folders list their children in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub title: String,
    pub url: Option<String>,
    pub date_added: Option<Timestamp>,
    pub children: Vec<NodeId>,
}

impl NodeEntry {
    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }

    pub(crate) fn root() -> Self {
        Self {
            id: ROOT_ID.to_string(),
            parent_id: None,
            title: String::new(),
            url: None,
            date_added: Some(now_millis()),
            children: Vec::new(),
        }
    }
}

/// Entry-level access a store backend provides.
pub trait EntryBackend {
    fn entry(&self, id: &str) -> Result<Option<NodeEntry>, StoreError>;
    fn put(&mut self, entry: NodeEntry) -> Result<(), StoreError>;
    /// Hand out an identity no existing node uses.
    fn allocate_id(&mut self) -> Result<NodeId, StoreError>;
    /// Drop every entry and make sure no later allocation reuses `reserved_up_to`.
    fn reset(&mut self, reserved_up_to: u64) -> Result<(), StoreError>;
}

/// In-memory entry map.
#[derive(Debug, Clone)]
pub struct MemoryEntries {
    nodes: HashMap<NodeId, NodeEntry>,
    next_id: u64,
}

impl MemoryEntries {
    /// Entries holding only the root folder.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT_ID.to_string(), NodeEntry::root());
        Self { nodes, next_id: 1 }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for MemoryEntries {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryBackend for MemoryEntries {
    fn entry(&self, id: &str) -> Result<Option<NodeEntry>, StoreError> {
        Ok(self.nodes.get(id).cloned())
    }

    fn put(&mut self, entry: NodeEntry) -> Result<(), StoreError> {
        self.nodes.insert(entry.id.clone(), entry);
        Ok(())
    }

    fn allocate_id(&mut self) -> Result<NodeId, StoreError> {
        loop {
            let candidate = self.next_id.to_string();
            self.next_id += 1;
            if !self.nodes.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
    }

    fn reset(&mut self, reserved_up_to: u64) -> Result<(), StoreError> {
        self.nodes.clear();
        self.next_id = reserved_up_to + 1;
        Ok(())
    }
}

fn require<B: EntryBackend + ?Sized>(backend: &B, id: &str) -> Result<NodeEntry, StoreError> {
    backend
        .entry(id)?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

fn require_folder<B: EntryBackend + ?Sized>(
    backend: &B,
    id: &str,
) -> Result<NodeEntry, StoreError> {
    let entry = require(backend, id)?;
    if !entry.is_folder() {
        return Err(StoreError::InvalidOperation(format!(
            "parent {} is a bookmark, not a folder",
            id
        )));
    }
    Ok(entry)
}

/// Public view of an entry, with its position resolved from the parent.
pub fn stored<B: EntryBackend + ?Sized>(
    backend: &B,
    id: &str,
) -> Result<Option<StoredNode>, StoreError> {
    let Some(entry) = backend.entry(id)? else {
        return Ok(None);
    };
    let index = match &entry.parent_id {
        Some(parent_id) => backend
            .entry(parent_id)?
            .and_then(|parent| parent.children.iter().position(|c| c == id)),
        None => None,
    };
    Ok(Some(StoredNode {
        id: entry.id,
        parent_id: entry.parent_id,
        index,
        title: entry.title,
        url: entry.url,
        date_added: entry.date_added,
    }))
}

/// Create a node under `details.parent_id`, clamping the index to append.
pub fn create<B: EntryBackend + ?Sized>(
    backend: &mut B,
    details: &CreateDetails,
) -> Result<StoredNode, StoreError> {
    let mut parent = require_folder(backend, &details.parent_id)?;
    let id = backend.allocate_id()?;
    let index = details.index.min(parent.children.len());
    parent.children.insert(index, id.clone());

    backend.put(NodeEntry {
        id: id.clone(),
        parent_id: Some(details.parent_id.clone()),
        title: details.title.clone(),
        url: details.url.clone(),
        date_added: Some(now_millis()),
        children: Vec::new(),
    })?;
    backend.put(parent)?;

    stored(backend, &id)?.ok_or(StoreError::NotFound(id))
}

/// Move `id` to `destination`, clamping the index to append.
///
/// The root cannot move, and a node cannot move into itself or one of its
/// descendants.
pub fn move_node<B: EntryBackend + ?Sized>(
    backend: &mut B,
    id: &str,
    destination: &Destination,
) -> Result<StoredNode, StoreError> {
    if id == ROOT_ID {
        return Err(StoreError::InvalidOperation(
            "the root folder cannot be moved".to_string(),
        ));
    }
    let mut entry = require(backend, id)?;
    require_folder(backend, &destination.parent_id)?;

    let mut visited = HashSet::new();
    let mut cursor = Some(destination.parent_id.clone());
    while let Some(ancestor) = cursor {
        if ancestor == id {
            return Err(StoreError::InvalidOperation(format!(
                "cannot move {} into itself or a descendant",
                id
            )));
        }
        if !visited.insert(ancestor.clone()) {
            return Err(StoreError::Storage(format!(
                "parent cycle through {}",
                ancestor
            )));
        }
        cursor = require(backend, &ancestor)?.parent_id;
    }

    if let Some(old_parent_id) = &entry.parent_id {
        let mut old_parent = require(backend, old_parent_id)?;
        old_parent.children.retain(|child| child != id);
        backend.put(old_parent)?;
    }

    let mut parent = require(backend, &destination.parent_id)?;
    let index = destination.index.min(parent.children.len());
    parent.children.insert(index, id.to_string());
    backend.put(parent)?;

    entry.parent_id = Some(destination.parent_id.clone());
    backend.put(entry)?;

    stored(backend, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
}

/// Nested snapshot of everything below the root.
pub fn tree<B: EntryBackend + ?Sized>(backend: &B) -> Result<BookmarkNode, StoreError> {
    let mut root = build_node(backend, ROOT_ID, None, None)?;
    root.link_children();
    Ok(root)
}

fn build_node<B: EntryBackend + ?Sized>(
    backend: &B,
    id: &str,
    parent_id: Option<NodeId>,
    index: Option<usize>,
) -> Result<BookmarkNode, StoreError> {
    let entry = backend.entry(id)?.ok_or_else(|| {
        StoreError::Storage(format!("dangling child reference to {}", id))
    })?;
    let kind = match entry.url {
        Some(url) => NodeKind::Bookmark { url },
        None => NodeKind::Folder {
            children: entry
                .children
                .iter()
                .enumerate()
                .map(|(position, child)| {
                    build_node(backend, child, Some(entry.id.clone()), Some(position))
                })
                .collect::<Result<Vec<_>, _>>()?,
        },
    };
    Ok(BookmarkNode {
        id: entry.id,
        title: entry.title,
        parent_id,
        index,
        date_added: entry.date_added,
        kind,
    })
}

/// Replace the backend's contents with `root`, keeping its identities.
///
/// The snapshot is validated first; a rejected snapshot leaves the backend
/// untouched.
pub fn load_snapshot<B: EntryBackend + ?Sized>(
    backend: &mut B,
    root: &BookmarkNode,
) -> Result<(), StoreError> {
    validate_snapshot(root).map_err(|e| StoreError::InvalidOperation(e.to_string()))?;
    backend.reset(highest_numeric_id(root))?;
    put_subtree(backend, root, None)
}

fn put_subtree<B: EntryBackend + ?Sized>(
    backend: &mut B,
    node: &BookmarkNode,
    parent_id: Option<NodeId>,
) -> Result<(), StoreError> {
    backend.put(NodeEntry {
        id: node.id.clone(),
        parent_id,
        title: node.title.clone(),
        url: node.url().map(str::to_string),
        date_added: node.date_added,
        children: node.children().iter().map(|c| c.id.clone()).collect(),
    })?;
    for child in node.children() {
        put_subtree(backend, child, Some(node.id.clone()))?;
    }
    Ok(())
}

fn highest_numeric_id(node: &BookmarkNode) -> u64 {
    node.children()
        .iter()
        .map(highest_numeric_id)
        .fold(node.id.parse().unwrap_or(0), u64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder_at(backend: &mut MemoryEntries, parent: &str, index: usize, title: &str) -> NodeId {
        create(
            backend,
            &CreateDetails {
                parent_id: parent.to_string(),
                index,
                title: title.to_string(),
                url: None,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_create_clamps_index_and_assigns_fresh_ids() {
        let mut backend = MemoryEntries::new();
        let a = folder_at(&mut backend, ROOT_ID, 0, "a");
        let b = folder_at(&mut backend, ROOT_ID, 99, "b");
        assert_ne!(a, b);
        let root = backend.entry(ROOT_ID).unwrap().unwrap();
        assert_eq!(root.children, vec![a, b.clone()]);
        assert_eq!(stored(&backend, &b).unwrap().unwrap().index, Some(1));
    }

    #[test]
    fn test_create_under_bookmark_is_rejected() {
        let mut backend = MemoryEntries::new();
        let leaf = create(
            &mut backend,
            &CreateDetails {
                parent_id: ROOT_ID.to_string(),
                index: 0,
                title: "leaf".to_string(),
                url: Some("https://leaf.example".to_string()),
            },
        )
        .unwrap();
        let result = folder_at_result(&mut backend, &leaf.id);
        assert!(matches!(result, Err(StoreError::InvalidOperation(_))));
    }

    fn folder_at_result(
        backend: &mut MemoryEntries,
        parent: &str,
    ) -> Result<StoredNode, StoreError> {
        create(
            backend,
            &CreateDetails {
                parent_id: parent.to_string(),
                index: 0,
                title: "x".to_string(),
                url: None,
            },
        )
    }

    #[test]
    fn test_move_reorders_within_parent() {
        let mut backend = MemoryEntries::new();
        let a = folder_at(&mut backend, ROOT_ID, 0, "a");
        let b = folder_at(&mut backend, ROOT_ID, 1, "b");
        let c = folder_at(&mut backend, ROOT_ID, 2, "c");

        let moved = move_node(
            &mut backend,
            &c,
            &Destination {
                parent_id: ROOT_ID.to_string(),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(moved.index, Some(0));
        let root = backend.entry(ROOT_ID).unwrap().unwrap();
        assert_eq!(root.children, vec![c, a, b]);
    }

    #[test]
    fn test_move_into_descendant_is_rejected() {
        let mut backend = MemoryEntries::new();
        let outer = folder_at(&mut backend, ROOT_ID, 0, "outer");
        let inner = folder_at(&mut backend, &outer, 0, "inner");

        let into_child = move_node(
            &mut backend,
            &outer,
            &Destination {
                parent_id: inner,
                index: 0,
            },
        );
        assert!(matches!(into_child, Err(StoreError::InvalidOperation(_))));

        let root_move = move_node(
            &mut backend,
            ROOT_ID,
            &Destination {
                parent_id: outer,
                index: 0,
            },
        );
        assert!(root_move.is_err());
    }

    #[test]
    fn test_load_snapshot_then_tree_round_trips() {
        let snapshot = BookmarkNode::folder(
            "0",
            "",
            vec![BookmarkNode::folder(
                "7",
                "Bookmarks bar",
                vec![BookmarkNode::bookmark("12", "a", "https://a.example").with_date_added(3)],
            )],
        );
        let mut backend = MemoryEntries::new();
        load_snapshot(&mut backend, &snapshot).unwrap();
        assert_eq!(backend.len(), 3);

        let rebuilt = tree(&backend).unwrap();
        assert_eq!(rebuilt.children()[0].children()[0], snapshot.children()[0].children()[0]);

        let fresh = backend.allocate_id().unwrap();
        assert_eq!(fresh, "13");
    }

    fn seeded() -> MemoryEntries {
        let mut backend = MemoryEntries::new();
        let snapshot = BookmarkNode::folder(
            "0",
            "",
            vec![BookmarkNode::folder("1", "Bookmarks bar", Vec::new())],
        );
        load_snapshot(&mut backend, &snapshot).unwrap();
        backend
    }

    #[test]
    fn test_load_snapshot_rejects_reserved_identity_below_root() {
        let mut backend = seeded();
        let snapshot = BookmarkNode::folder(
            "0",
            "",
            vec![
                BookmarkNode::folder(
                    "1",
                    "Bookmarks bar",
                    vec![BookmarkNode::folder("0", "impostor", Vec::new())],
                ),
                BookmarkNode::folder("2", "Other", Vec::new()),
            ],
        );

        let result = load_snapshot(&mut backend, &snapshot);
        assert!(matches!(result, Err(StoreError::InvalidOperation(_))));

        let root = backend.entry(ROOT_ID).unwrap().unwrap();
        assert_eq!(root.parent_id, None);
        assert_eq!(root.children, vec!["1".to_string()]);
        assert_eq!(tree(&backend).unwrap().id, ROOT_ID);
    }

    #[test]
    fn test_load_snapshot_rejects_duplicate_identity() {
        let mut backend = seeded();
        let snapshot = BookmarkNode::folder(
            "0",
            "",
            vec![
                BookmarkNode::folder(
                    "1",
                    "Bookmarks bar",
                    vec![BookmarkNode::bookmark("3", "a", "https://a.example")],
                ),
                BookmarkNode::folder(
                    "2",
                    "Other",
                    vec![BookmarkNode::bookmark("3", "a", "https://a.example")],
                ),
            ],
        );

        let result = load_snapshot(&mut backend, &snapshot);
        assert!(matches!(result, Err(StoreError::InvalidOperation(_))));
        assert_eq!(backend.len(), 2);
    }

    #[test]
    fn test_move_through_parent_cycle_fails_instead_of_looping() {
        let mut backend = seeded();
        let mut first = backend.entry("1").unwrap().unwrap();
        first.parent_id = Some("2".to_string());
        backend.put(first).unwrap();
        backend
            .put(NodeEntry {
                id: "2".to_string(),
                parent_id: Some("1".to_string()),
                title: "loop".to_string(),
                url: None,
                date_added: None,
                children: vec!["1".to_string()],
            })
            .unwrap();
        backend
            .put(NodeEntry {
                id: "3".to_string(),
                parent_id: Some(ROOT_ID.to_string()),
                title: "x".to_string(),
                url: Some("https://x.example".to_string()),
                date_added: None,
                children: Vec::new(),
            })
            .unwrap();

        let result = move_node(
            &mut backend,
            "3",
            &Destination {
                parent_id: "1".to_string(),
                index: 0,
            },
        );
        assert!(matches!(result, Err(StoreError::Storage(_))));
    }
}
