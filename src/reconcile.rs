//! Store Reconciliation
//!
//! Applies a reconstructed tree to a live store. Each node is moved when the
//! store already holds it and created otherwise; a folder's children are only
//! reconciled once the folder's own operation has been acknowledged, under
//! the identity the store reports for it. Siblings are issued concurrently,
//! each with its index fixed up front.
//!
//! A failed operation is recorded on its node and never aborts siblings or
//! unrelated subtrees.

use crate::error::{ApiError, StoreError};
use crate::store::{BookmarkStore, CreateDetails, Destination};
use crate::tree::ReconstructedNode;
use crate::types::NodeId;
use futures::future::{join_all, BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Tuning for a reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Give up on a single store call after this long.
    pub operation_timeout: Option<Duration>,
    /// Maximum number of store calls in flight at once.
    pub max_in_flight: Option<usize>,
}

/// What was attempted for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    Moved,
    Created,
    /// Never attempted because its parent folder could not be created.
    Skipped,
}

/// Result of reconciling one node and, recursively, its children.
#[derive(Debug, Clone, Serialize)]
pub struct NodeOutcome {
    pub id: NodeId,
    pub title: String,
    pub folder: bool,
    pub parent_id: Option<NodeId>,
    pub index: usize,
    pub action: NodeAction,
    /// Identity the store reported after the operation.
    pub resolved_id: Option<NodeId>,
    pub error: Option<String>,
    pub children: Vec<NodeOutcome>,
}

impl NodeOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.action != NodeAction::Skipped
    }

    fn skipped(node: &ReconstructedNode, index: usize) -> Self {
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            folder: node.is_folder(),
            parent_id: None,
            index,
            action: NodeAction::Skipped,
            resolved_id: None,
            error: None,
            children: skipped_children(node),
        }
    }
}

fn skipped_children(node: &ReconstructedNode) -> Vec<NodeOutcome> {
    node.children
        .iter()
        .enumerate()
        .map(|(index, child)| NodeOutcome::skipped(child, index))
        .collect()
}

/// Counts over a whole outcome tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub moved: usize,
    pub created: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ReconcileSummary {
    fn tally(&mut self, outcomes: &[NodeOutcome]) {
        for outcome in outcomes {
            match (outcome.action, outcome.error.is_some()) {
                (NodeAction::Skipped, _) => self.skipped += 1,
                (_, true) => self.failed += 1,
                (NodeAction::Moved, false) => self.moved += 1,
                (NodeAction::Created, false) => self.created += 1,
            }
            self.tally(&outcome.children);
        }
    }
}

/// Per-run report: the outcome tree plus its summary.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub parent_id: NodeId,
    pub outcomes: Vec<NodeOutcome>,
    pub summary: ReconcileSummary,
}

impl ReconcileReport {
    pub fn new(parent_id: NodeId, outcomes: Vec<NodeOutcome>) -> Self {
        let mut summary = ReconcileSummary::default();
        summary.tally(&outcomes);
        Self {
            parent_id,
            outcomes,
            summary,
        }
    }

    /// True when every node was applied.
    pub fn is_complete(&self) -> bool {
        self.summary.failed == 0 && self.summary.skipped == 0
    }

    /// Failed outcomes in pre-order.
    pub fn failures(&self) -> Vec<&NodeOutcome> {
        fn collect<'a>(outcomes: &'a [NodeOutcome], out: &mut Vec<&'a NodeOutcome>) {
            for outcome in outcomes {
                if outcome.error.is_some() {
                    out.push(outcome);
                }
                collect(&outcome.children, out);
            }
        }
        let mut out = Vec::new();
        collect(&self.outcomes, &mut out);
        out
    }
}

/// Walks a reconstructed tree against one store.
pub struct Reconciler<'a> {
    store: &'a dyn BookmarkStore,
    options: ReconcileOptions,
    limiter: Option<Semaphore>,
    /// Identities handed out by creates during this run.
    created: Mutex<HashSet<NodeId>>,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn BookmarkStore) -> Self {
        Self::with_options(store, ReconcileOptions::default())
    }

    pub fn with_options(store: &'a dyn BookmarkStore, options: ReconcileOptions) -> Self {
        let limiter = options
            .max_in_flight
            .map(|permits| Semaphore::new(permits.max(1)));
        Self {
            store,
            options,
            limiter,
            created: Mutex::new(HashSet::new()),
        }
    }

    /// Apply `nodes`, in order, as the children of `parent_id`.
    pub async fn reconcile(&self, nodes: &[ReconstructedNode], parent_id: &str) -> ReconcileReport {
        let outcomes = self.reconcile_level(nodes, parent_id.to_string()).await;
        let report = ReconcileReport::new(parent_id.to_string(), outcomes);
        info!(
            parent_id,
            moved = report.summary.moved,
            created = report.summary.created,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            "Reconciliation finished"
        );
        report
    }

    fn reconcile_level<'s>(
        &'s self,
        nodes: &'s [ReconstructedNode],
        parent_id: NodeId,
    ) -> BoxFuture<'s, Vec<NodeOutcome>> {
        async move {
            let pending = nodes
                .iter()
                .enumerate()
                .map(|(index, node)| self.reconcile_node(node, parent_id.clone(), index));
            join_all(pending).await
        }
        .boxed()
    }

    async fn reconcile_node(
        &self,
        node: &ReconstructedNode,
        parent_id: NodeId,
        index: usize,
    ) -> NodeOutcome {
        let mut outcome = NodeOutcome {
            id: node.id.clone(),
            title: node.title.clone(),
            folder: node.is_folder(),
            parent_id: Some(parent_id.clone()),
            index,
            action: NodeAction::Moved,
            resolved_id: None,
            error: None,
            children: Vec::new(),
        };

        let exists = match self.exists(node).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(id = %node.id, error = %e, "Existence check failed");
                outcome.error = Some(e.to_string());
                outcome.children = skipped_children(node);
                return outcome;
            }
        };

        let result = if exists {
            let destination = Destination {
                parent_id: parent_id.clone(),
                index,
            };
            self.call(&node.id, self.store.move_node(&node.id, destination))
                .await
        } else {
            outcome.action = NodeAction::Created;
            let details = CreateDetails {
                parent_id: parent_id.clone(),
                index,
                title: node.title.clone(),
                url: node.url.clone(),
            };
            self.call(&node.id, self.store.create(details)).await
        };

        let kind = if node.is_folder() { "folder" } else { "bookmark" };
        let children_parent = match result {
            Ok(stored) => {
                info!(
                    title = %node.title,
                    index,
                    parent_id = %parent_id,
                    "{} {} {}",
                    if exists { "Moved" } else { "Created" },
                    kind,
                    stored.id
                );
                if !exists {
                    self.created.lock().insert(stored.id.clone());
                }
                outcome.resolved_id = Some(stored.id.clone());
                Some(stored.id)
            }
            Err(e) => {
                warn!(
                    title = %node.title,
                    index,
                    parent_id = %parent_id,
                    error = %e,
                    "Failed to apply {}",
                    kind
                );
                outcome.error = Some(e.to_string());
                // A folder that exists keeps its identity even when the move is rejected.
                exists.then(|| node.id.clone())
            }
        };

        if node.is_folder() {
            outcome.children = match children_parent {
                Some(folder_id) => self.reconcile_level(&node.children, folder_id).await,
                None => skipped_children(node),
            };
        }
        outcome
    }

    /// Whether the store already holds this node.
    ///
    /// A hit only counts when the stored kind matches and the identity was not
    /// handed out by a create earlier in this run.
    async fn exists(&self, node: &ReconstructedNode) -> Result<bool, ApiError> {
        let Some(stored) = self.call(&node.id, self.store.get(&node.id)).await? else {
            return Ok(false);
        };
        if self.created.lock().contains(&stored.id) {
            debug!(id = %node.id, "Identity was assigned during this run, treating as missing");
            return Ok(false);
        }
        if stored.is_folder() != node.is_folder() {
            debug!(id = %node.id, "Stored node has a different kind, treating as missing");
            return Ok(false);
        }
        Ok(true)
    }

    async fn call<T, F>(&self, id: &str, operation: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let failed = |reason: String| ApiError::StoreOperationFailed {
            id: id.to_string(),
            reason,
        };
        let _permit = match &self.limiter {
            Some(limiter) => Some(limiter.acquire().await.map_err(|e| failed(e.to_string()))?),
            None => None,
        };
        match self.options.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, operation).await {
                Ok(result) => result.map_err(|e| failed(e.to_string())),
                Err(_) => Err(failed(format!("timed out after {} ms", limit.as_millis()))),
            },
            None => operation.await.map_err(|e| failed(e.to_string())),
        }
    }
}

/// Convenience wrapper: reconcile with default options.
pub async fn reconcile(
    store: &dyn BookmarkStore,
    nodes: &[ReconstructedNode],
    parent_id: &str,
) -> ReconcileReport {
    Reconciler::new(store).reconcile(nodes, parent_id).await
}
