//! Environment variable source: BOOKMARK_SORTER_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `BOOKMARK_SORTER__SORT__ANCHOR_TITLE` sets `sort.anchor_title`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("BOOKMARK_SORTER")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
