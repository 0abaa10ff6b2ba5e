//! Tree reconstruction: flat records back to a nested, ordered tree.
//!
//! Children are appended in the order records are visited, so a sorted record
//! list yields sorted siblings under every parent.

use crate::tree::flatten::FlatRecord;
use crate::types::{now_millis, NodeId, Timestamp, ROOT_ID, ROOT_TITLE};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A node of the rebuilt tree, owning its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstructedNode {
    pub id: NodeId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<Timestamp>,
    pub children: Vec<ReconstructedNode>,
}

impl ReconstructedNode {
    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ReconstructedNode::node_count)
            .sum::<usize>()
    }

    fn from_record(record: &FlatRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            url: record.url.clone(),
            date_added: record.date_added,
            children: Vec::new(),
        }
    }
}

struct Slot<'a> {
    record: Option<&'a FlatRecord>,
    children: Vec<usize>,
}

const ROOT_SLOT: usize = 0;

/// Rebuild the tree and return the synthetic root's children.
pub fn reconstruct(records: &[FlatRecord]) -> Vec<ReconstructedNode> {
    reconstruct_root(records).children
}

/// Rebuild the tree under a synthetic root (`"0"`, `"root"`).
///
/// A record carrying the root identity maps onto the synthetic root. Records
/// whose parent is absent or unknown attach to the root, as do records that
/// a parent cycle makes unreachable.
pub fn reconstruct_root(records: &[FlatRecord]) -> ReconstructedNode {
    let mut lookup: HashMap<&str, usize> = HashMap::with_capacity(records.len() + 1);
    let mut slots: Vec<Slot<'_>> = Vec::with_capacity(records.len() + 1);
    lookup.insert(ROOT_ID, ROOT_SLOT);
    slots.push(Slot {
        record: None,
        children: Vec::new(),
    });

    for record in records {
        if lookup.contains_key(record.id.as_str()) {
            if record.id != ROOT_ID {
                debug!(id = %record.id, "Skipping duplicate record during reconstruction");
            }
            continue;
        }
        lookup.insert(record.id.as_str(), slots.len());
        slots.push(Slot {
            record: Some(record),
            children: Vec::new(),
        });
    }

    for slot in 1..slots.len() {
        let parent = slots[slot]
            .record
            .and_then(|record| record.parent_id.as_deref())
            .and_then(|parent_id| lookup.get(parent_id).copied())
            .unwrap_or(ROOT_SLOT);
        slots[parent].children.push(slot);
    }

    let mut visited = vec![false; slots.len()];
    visited[ROOT_SLOT] = true;
    let mut root = ReconstructedNode {
        id: ROOT_ID.to_string(),
        title: ROOT_TITLE.to_string(),
        url: None,
        date_added: Some(now_millis()),
        children: build_children(ROOT_SLOT, &slots, &mut visited),
    };

    for slot in 1..slots.len() {
        if !visited[slot] {
            if let Some(record) = slots[slot].record {
                warn!(id = %record.id, "Record unreachable from root, attaching to root");
            }
            if let Some(node) = build(slot, &slots, &mut visited) {
                root.children.push(node);
            }
        }
    }

    root
}

fn build(slot: usize, slots: &[Slot<'_>], visited: &mut [bool]) -> Option<ReconstructedNode> {
    visited[slot] = true;
    let mut node = ReconstructedNode::from_record(slots[slot].record?);
    node.children = build_children(slot, slots, visited);
    Some(node)
}

fn build_children(slot: usize, slots: &[Slot<'_>], visited: &mut [bool]) -> Vec<ReconstructedNode> {
    let mut children = Vec::with_capacity(slots[slot].children.len());
    for &child in &slots[slot].children {
        if visited[child] {
            continue;
        }
        if let Some(node) = build(child, slots, visited) {
            children.push(node);
        }
    }
    children
}
