//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::SorterConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the standard sources, plus `explicit` when given.
    pub fn load(explicit: Option<&Path>) -> Result<SorterConfig, ApiError> {
        let config = MergeService::load(explicit)?;
        config.validate()?;
        Ok(config)
    }
}
