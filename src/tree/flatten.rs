//! Tree flattening: nested snapshot to pre-order flat records.

use crate::tree::node::{BookmarkNode, NodeKind};
use crate::types::{NodeId, Timestamp};
use serde::Serialize;

/// One snapshot node with its nesting replaced by identities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRecord {
    pub id: NodeId,
    pub title: String,
    pub url: Option<String>,
    pub parent_id: Option<NodeId>,
    pub index: Option<usize>,
    pub date_added: Option<Timestamp>,
    /// Child identities in original order; `Some` for folders only.
    pub children: Option<Vec<NodeId>>,
}

impl FlatRecord {
    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }
}

/// Flatten `root` into pre-order records, `root` first.
pub fn flatten(root: &BookmarkNode) -> Vec<FlatRecord> {
    let mut records = Vec::with_capacity(root.node_count());
    push_subtree(root, &mut records);
    records
}

fn push_subtree(node: &BookmarkNode, records: &mut Vec<FlatRecord>) {
    let (url, children) = match &node.kind {
        NodeKind::Bookmark { url } => (Some(url.clone()), None),
        NodeKind::Folder { children } => (
            None,
            Some(children.iter().map(|child| child.id.clone()).collect()),
        ),
    };

    records.push(FlatRecord {
        id: node.id.clone(),
        title: node.title.clone(),
        url,
        parent_id: node.parent_id.clone(),
        index: node.index,
        date_added: node.date_added,
        children,
    });

    for child in node.children() {
        push_subtree(child, records);
    }
}
