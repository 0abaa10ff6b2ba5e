//! Snapshot validation and JSON import/export.

use crate::error::ApiError;
use crate::tree::node::BookmarkNode;
use crate::types::ROOT_ID;
use serde::Deserialize;
use std::collections::HashSet;

/// Check that `root` can be flattened and reconciled safely.
///
/// The root must carry the reserved identity, no other node may reuse it,
/// and identities must be unique.
pub fn validate_snapshot(root: &BookmarkNode) -> Result<(), ApiError> {
    if root.id != ROOT_ID {
        return Err(ApiError::InvalidNode {
            id: root.id.clone(),
            reason: format!("snapshot root must have identity '{}'", ROOT_ID),
        });
    }

    let mut seen = HashSet::new();
    seen.insert(root.id.as_str());
    let mut stack: Vec<&BookmarkNode> = root.children().iter().collect();
    while let Some(node) = stack.pop() {
        if node.id == ROOT_ID {
            return Err(ApiError::ReservedIdentity(node.id.clone()));
        }
        if !seen.insert(node.id.as_str()) {
            return Err(ApiError::DuplicateIdentity(node.id.clone()));
        }
        stack.extend(node.children());
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Tree(Vec<BookmarkNode>),
    Root(BookmarkNode),
}

/// Parse a snapshot from JSON.
///
/// Accepts either a single root object or a `getTree`-style array whose first
/// element is the root.
pub fn snapshot_from_json(json: &str) -> Result<BookmarkNode, ApiError> {
    let mut root = match serde_json::from_str::<SnapshotDocument>(json)? {
        SnapshotDocument::Root(root) => root,
        SnapshotDocument::Tree(nodes) => nodes.into_iter().next().ok_or_else(|| {
            ApiError::InvalidArgument("snapshot array is empty".to_string())
        })?,
    };
    root.link_children();
    Ok(root)
}

/// Serialize a snapshot as a `getTree`-style JSON array.
pub fn snapshot_to_json(root: &BookmarkNode) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(&[root])?)
}
