//! Sort Service
//!
//! The entry point that turns a snapshot and a policy name into store
//! mutations: validate, flatten, sort, pin the anchor, reconstruct, reconcile.
//! Invocations on one service are serialized; overlapping runs against the
//! same store would interleave position writes.

use crate::error::ApiError;
use crate::reconcile::{ReconcileOptions, ReconcileReport, Reconciler};
use crate::sort::{pin_anchor, sort_records, SortPolicy};
use crate::store::BookmarkStore;
use crate::tree::{
    flatten, reconstruct, validate_snapshot, BookmarkNode, FlatRecord, ReconstructedNode,
};
use crate::types::{NodeId, DEFAULT_ANCHOR_TITLE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Folder the sorted top level is applied under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyTarget {
    /// The snapshot root.
    #[default]
    Root,
    /// The anchor (toolbar) folder; falls back to the root when it is missing.
    ///
    /// The anchor itself is not re-applied: its sorted children lead the
    /// level, followed by the rest of the sorted top level.
    Anchor,
}

impl fmt::Display for ApplyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyTarget::Root => f.write_str("root"),
            ApplyTarget::Anchor => f.write_str("anchor"),
        }
    }
}

impl FromStr for ApplyTarget {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(ApplyTarget::Root),
            "anchor" => Ok(ApplyTarget::Anchor),
            other => Err(ApiError::InvalidArgument(format!(
                "unknown target '{}' (expected 'root' or 'anchor')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SortOptions {
    pub anchor_title: String,
    pub target: ApplyTarget,
    pub reconcile: ReconcileOptions,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            anchor_title: DEFAULT_ANCHOR_TITLE.to_string(),
            target: ApplyTarget::Root,
            reconcile: ReconcileOptions::default(),
        }
    }
}

/// Everything computed before the store is touched.
#[derive(Debug, Clone, Serialize)]
pub struct SortPlan {
    pub policy: SortPolicy,
    /// Sorted records, anchor pinned first when present.
    #[serde(skip)]
    pub records: Vec<FlatRecord>,
    pub anchor_id: Option<NodeId>,
    pub target_parent: NodeId,
    pub nodes: Vec<ReconstructedNode>,
    pub warnings: Vec<String>,
}

/// Compute the new tree for `snapshot` without touching any store.
pub fn plan(
    snapshot: &BookmarkNode,
    policy: SortPolicy,
    options: &SortOptions,
) -> Result<SortPlan, ApiError> {
    validate_snapshot(snapshot)?;

    let flat = flatten(snapshot);
    let mut records = sort_records(&flat, policy);
    debug!(records = records.len(), %policy, "Sorted flattened snapshot");

    let mut warnings = Vec::new();
    let anchor_id = match pin_anchor(&mut records, &options.anchor_title) {
        Ok(()) => records.first().map(|anchor| anchor.id.clone()),
        Err(e @ ApiError::MissingAnchor(_)) => {
            warn!(anchor = %options.anchor_title, "Anchor folder missing, skipping pinning");
            warnings.push(e.to_string());
            None
        }
        Err(e) => return Err(e),
    };

    let target_parent = match (options.target, &anchor_id) {
        (ApplyTarget::Anchor, Some(anchor_id)) => anchor_id.clone(),
        (ApplyTarget::Anchor, None) => {
            warnings.push(format!(
                "target '{}' unavailable, applying under the root",
                ApplyTarget::Anchor
            ));
            snapshot.id.clone()
        }
        (ApplyTarget::Root, _) => snapshot.id.clone(),
    };

    let mut nodes = reconstruct(&records);
    if target_parent != snapshot.id {
        nodes = lift_anchor(nodes, &target_parent);
    }
    Ok(SortPlan {
        policy,
        records,
        anchor_id,
        target_parent,
        nodes,
        warnings,
    })
}

/// Replace the anchor folder with its own children, placed first.
fn lift_anchor(mut nodes: Vec<ReconstructedNode>, anchor_id: &str) -> Vec<ReconstructedNode> {
    fn take(nodes: &mut Vec<ReconstructedNode>, id: &str) -> Option<ReconstructedNode> {
        if let Some(position) = nodes.iter().position(|node| node.id == id) {
            return Some(nodes.remove(position));
        }
        nodes.iter_mut().find_map(|node| take(&mut node.children, id))
    }

    match take(&mut nodes, anchor_id) {
        Some(anchor) => {
            let mut lifted = anchor.children;
            lifted.append(&mut nodes);
            lifted
        }
        None => nodes,
    }
}

/// Outcome of one `apply_sorted_order` call.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub policy: SortPolicy,
    pub anchor_id: Option<NodeId>,
    pub target_parent: NodeId,
    pub warnings: Vec<String>,
    pub reconcile: ReconcileReport,
}

pub struct SortService {
    store: Arc<dyn BookmarkStore>,
    options: SortOptions,
    in_flight: Mutex<()>,
}

impl SortService {
    pub fn new(store: Arc<dyn BookmarkStore>, options: SortOptions) -> Self {
        Self {
            store,
            options,
            in_flight: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &dyn BookmarkStore {
        self.store.as_ref()
    }

    pub fn options(&self) -> &SortOptions {
        &self.options
    }

    /// Sort `snapshot` by the named policy and apply the result to the store.
    ///
    /// Per-node store failures end up in the report; only an unknown policy
    /// or an unusable snapshot fails the call.
    pub async fn apply_sorted_order(
        &self,
        snapshot: &BookmarkNode,
        policy: &str,
    ) -> Result<ApplyReport, ApiError> {
        let policy: SortPolicy = policy.parse()?;
        let plan = plan(snapshot, policy, &self.options)?;

        let _serialized = self.in_flight.lock().await;
        info!(
            %policy,
            target_parent = %plan.target_parent,
            nodes = plan.nodes.len(),
            "Applying sorted order"
        );
        let reconciler =
            Reconciler::with_options(self.store.as_ref(), self.options.reconcile.clone());
        let reconcile = reconciler.reconcile(&plan.nodes, &plan.target_parent).await;

        Ok(ApplyReport {
            policy,
            anchor_id: plan.anchor_id,
            target_parent: plan.target_parent,
            warnings: plan.warnings,
            reconcile,
        })
    }

    /// Snapshot the store, then sort it in place.
    pub async fn sort_store(&self, policy: &str) -> Result<ApplyReport, ApiError> {
        let snapshot = self.store.get_tree().await?;
        self.apply_sorted_order(&snapshot, policy).await
    }

    /// Apply `snapshot` unsorted: nodes the store lacks are created, known
    /// ones are moved into the snapshot's positions.
    pub async fn import_snapshot(
        &self,
        snapshot: &BookmarkNode,
    ) -> Result<ReconcileReport, ApiError> {
        validate_snapshot(snapshot)?;
        let nodes = reconstruct(&flatten(snapshot));

        let _serialized = self.in_flight.lock().await;
        let reconciler =
            Reconciler::with_options(self.store.as_ref(), self.options.reconcile.clone());
        Ok(reconciler.reconcile(&nodes, &snapshot.id).await)
    }
}
