//! Configuration
//!
//! Layered settings for the sorter: built-in defaults, the global config
//! file, an explicit `--config` file, then `BOOKMARK_SORTER__*` environment
//! variables (highest precedence).

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::reconcile::ReconcileOptions;
use crate::service::{ApplyTarget, SortOptions};
use crate::sort::SortPolicy;
use crate::types::DEFAULT_ANCHOR_TITLE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use facade::ConfigLoader;

/// Policy used when none is given on the command line.
pub const DEFAULT_POLICY: &str = "title";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SorterConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sort: SortConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// sled database directory; defaults to the XDG data dir
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortConfig {
    #[serde(default = "default_policy")]
    pub default_policy: String,
    #[serde(default = "default_anchor_title")]
    pub anchor_title: String,
    #[serde(default)]
    pub target: ApplyTarget,
}

fn default_policy() -> String {
    DEFAULT_POLICY.to_string()
}

fn default_anchor_title() -> String {
    DEFAULT_ANCHOR_TITLE.to_string()
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            default_policy: default_policy(),
            anchor_title: default_anchor_title(),
            target: ApplyTarget::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub operation_timeout_ms: Option<u64>,
    #[serde(default)]
    pub max_in_flight: Option<usize>,
}

impl SorterConfig {
    /// Reject values that would only fail later, mid-run.
    pub fn validate(&self) -> Result<(), ApiError> {
        self.sort
            .default_policy
            .parse::<SortPolicy>()
            .map_err(|e| ApiError::ConfigError(format!("sort.default_policy: {}", e)))?;
        if self.sort.anchor_title.is_empty() {
            return Err(ApiError::ConfigError(
                "sort.anchor_title cannot be empty".to_string(),
            ));
        }
        if self.reconcile.max_in_flight == Some(0) {
            return Err(ApiError::ConfigError(
                "reconcile.max_in_flight must be at least 1".to_string(),
            ));
        }
        if self.reconcile.operation_timeout_ms == Some(0) {
            return Err(ApiError::ConfigError(
                "reconcile.operation_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sort_options(&self) -> SortOptions {
        SortOptions {
            anchor_title: self.sort.anchor_title.clone(),
            target: self.sort.target,
            reconcile: ReconcileOptions {
                operation_timeout: self.reconcile.operation_timeout_ms.map(Duration::from_millis),
                max_in_flight: self.reconcile.max_in_flight,
            },
        }
    }

    /// Configured store path, or the default under the XDG data dir.
    pub fn store_path(&self) -> Result<PathBuf, ApiError> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => paths::xdg_root::default_store_path(),
        }
    }
}
