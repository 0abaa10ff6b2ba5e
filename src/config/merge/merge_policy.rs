//! Built-in defaults, the lowest-precedence layer.

use crate::config::DEFAULT_POLICY;
use crate::types::DEFAULT_ANCHOR_TITLE;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the default values every later source overrides.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("sort.default_policy", DEFAULT_POLICY)?
        .set_default("sort.anchor_title", DEFAULT_ANCHOR_TITLE)?
        .set_default("sort.target", "root")?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
