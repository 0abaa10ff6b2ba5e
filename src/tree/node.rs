//! Bookmark node types as read from a store snapshot.

use crate::error::ApiError;
use crate::types::{NodeId, Timestamp};
use serde::{Deserialize, Serialize};

/// A node of a bookmark tree snapshot.
///
/// Serializes to the `getTree` JSON shape (`id`, `title`, `url`, `parentId`,
/// `index`, `dateAdded`, `children`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct BookmarkNode {
    pub id: NodeId,
    pub title: String,
    pub parent_id: Option<NodeId>,
    pub index: Option<usize>,
    pub date_added: Option<Timestamp>,
    pub kind: NodeKind,
}

/// Leaf or folder. A node is always exactly one of the two.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Bookmark { url: String },
    Folder { children: Vec<BookmarkNode> },
}

impl BookmarkNode {
    pub fn bookmark(
        id: impl Into<NodeId>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent_id: None,
            index: None,
            date_added: None,
            kind: NodeKind::Bookmark { url: url.into() },
        }
    }

    pub fn folder(
        id: impl Into<NodeId>,
        title: impl Into<String>,
        children: Vec<BookmarkNode>,
    ) -> Self {
        let mut node = Self {
            id: id.into(),
            title: title.into(),
            parent_id: None,
            index: None,
            date_added: None,
            kind: NodeKind::Folder { children },
        };
        node.link_children();
        node
    }

    pub fn with_date_added(mut self, date_added: Timestamp) -> Self {
        self.date_added = Some(date_added);
        self
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Bookmark { url } => Some(url),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Children of a folder; empty for a bookmark.
    pub fn children(&self) -> &[BookmarkNode] {
        match &self.kind {
            NodeKind::Folder { children } => children,
            NodeKind::Bookmark { .. } => &[],
        }
    }

    /// Rewrite `parent_id` and `index` of every descendant from tree position.
    pub fn link_children(&mut self) {
        let parent_id = self.id.clone();
        if let NodeKind::Folder { children } = &mut self.kind {
            for (index, child) in children.iter_mut().enumerate() {
                child.parent_id = Some(parent_id.clone());
                child.index = Some(index);
                child.link_children();
            }
        }
    }

    /// First node in pre-order whose title matches exactly.
    pub fn find_by_title(&self, title: &str) -> Option<&BookmarkNode> {
        if self.title == title {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_by_title(title))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(BookmarkNode::node_count)
            .sum::<usize>()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    id: NodeId,
    #[serde(default)]
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_added: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<BookmarkNode>>,
}

impl TryFrom<RawNode> for BookmarkNode {
    type Error = ApiError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let kind = match (raw.url, raw.children) {
            (Some(url), None) => NodeKind::Bookmark { url },
            (None, Some(children)) => NodeKind::Folder { children },
            (Some(_), Some(_)) => {
                return Err(ApiError::InvalidNode {
                    id: raw.id,
                    reason: "node has both a url and children".to_string(),
                })
            }
            (None, None) => {
                return Err(ApiError::InvalidNode {
                    id: raw.id,
                    reason: "node has neither a url nor children".to_string(),
                })
            }
        };

        Ok(BookmarkNode {
            id: raw.id,
            title: raw.title,
            parent_id: raw.parent_id,
            index: raw.index,
            date_added: raw.date_added,
            kind,
        })
    }
}

impl From<BookmarkNode> for RawNode {
    fn from(node: BookmarkNode) -> Self {
        let (url, children) = match node.kind {
            NodeKind::Bookmark { url } => (Some(url), None),
            NodeKind::Folder { children } => (None, Some(children)),
        };
        RawNode {
            id: node.id,
            title: node.title,
            url,
            parent_id: node.parent_id,
            index: node.index,
            date_added: node.date_added,
            children,
        }
    }
}
