//! Logging System
//!
//! Structured logging implementation using the `tracing` crate. Provides configurable
//! log levels, output formats, and destinations.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

fn default_log_file_path() -> Result<PathBuf, ApiError> {
    let project_dirs = directories::ProjectDirs::from("", "bookmark-sorter", "bookmark-sorter")
        .ok_or_else(|| {
            ApiError::ConfigError(
                "Could not determine platform state directory for log file".to_string(),
            )
        })?;
    let dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir())
        .to_path_buf();
    Ok(dir.join("bookmark-sorter.log"))
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file, file+stderr, both
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output includes file; None means use runtime default
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format only, stdout/stderr only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Logging flags given on the command line. `Some` values win over both the
/// environment and the config file.
#[derive(Debug, Clone, Default)]
pub struct LogOverrides {
    pub level: Option<String>,
    pub format: Option<String>,
    pub output: Option<String>,
    pub file: Option<PathBuf>,
}

/// Settings after CLI, environment, config and defaults are applied.
#[derive(Debug)]
struct ResolvedLogging {
    level: String,
    format: String,
    output: OutputDestinations,
    file: Option<PathBuf>,
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. CLI flags (`overrides`)
/// 2. Environment variables (BOOKMARK_SORTER_LOG, BOOKMARK_SORTER_LOG_FORMAT, etc.)
/// 3. The given config
/// 4. Defaults
pub fn init_logging(
    config: Option<&LoggingConfig>,
    overrides: &LogOverrides,
) -> Result<(), ApiError> {
    let disabled = config.map(|c| !c.enabled).unwrap_or(false);
    if disabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(std::io::sink))
            .try_init()
            .map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)))?;
        return Ok(());
    }

    let resolved = resolve_settings(config, overrides, &|key| std::env::var(key).ok())?;
    let filter = build_env_filter(&resolved.level, config)?;
    let output = &resolved.output;
    let use_color = config.map(|c| c.color).unwrap_or(true) && !output.file;

    let writer = if output.file {
        let log_file = match &resolved.file {
            Some(path) => path.clone(),
            None => default_log_file_path()?,
        };
        let file = open_log_file(&log_file)?;
        if output.stderr {
            BoxMakeWriter::new(file.and(std::io::stderr))
        } else {
            BoxMakeWriter::new(file)
        }
    } else if output.stdout && output.stderr {
        BoxMakeWriter::new(std::io::stdout.and(std::io::stderr))
    } else if output.stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    let base_subscriber = Registry::default().with(filter);
    let installed = if resolved.format == "json" {
        base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()
    } else {
        base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_color)
                    .with_writer(writer),
            )
            .try_init()
    };
    installed.map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)))
}

fn open_log_file(path: &Path) -> Result<std::sync::Arc<std::fs::File>, ApiError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ApiError::ConfigError(format!("Failed to create log directory: {}", e)))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ApiError::ConfigError(format!("Failed to open log file {:?}: {}", path, e))
        })?;
    Ok(std::sync::Arc::new(file))
}

/// Pick each setting from the first layer that has it: CLI, `env`, config, default.
fn resolve_settings(
    config: Option<&LoggingConfig>,
    overrides: &LogOverrides,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<ResolvedLogging, ApiError> {
    let from_env = |key: &str| env(key).filter(|value| !value.is_empty());

    let level = overrides
        .level
        .clone()
        .or_else(|| from_env("BOOKMARK_SORTER_LOG"))
        .or_else(|| config.map(|c| c.level.clone()))
        .unwrap_or_else(default_log_level);

    let format = overrides
        .format
        .clone()
        .or_else(|| from_env("BOOKMARK_SORTER_LOG_FORMAT"))
        .or_else(|| config.map(|c| c.format.clone()))
        .unwrap_or_else(default_format);
    if format != "json" && format != "text" {
        return Err(ApiError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }

    let output = overrides
        .output
        .clone()
        .or_else(|| from_env("BOOKMARK_SORTER_LOG_OUTPUT"))
        .or_else(|| config.map(|c| c.output.clone()))
        .unwrap_or_else(default_output);

    let file = overrides
        .file
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| from_env("BOOKMARK_SORTER_LOG_FILE").map(PathBuf::from))
        .or_else(|| config.and_then(|c| c.file.clone()));

    Ok(ResolvedLogging {
        level,
        format,
        output: parse_output_destinations(&output)?,
        file,
    })
}

/// Build the filter from the resolved level plus per-module levels from config.
fn build_env_filter(level: &str, config: Option<&LoggingConfig>) -> Result<EnvFilter, ApiError> {
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::try_new(level)
        .map_err(|e| ApiError::ConfigError(format!("Invalid log level '{}': {}", level, e)))?;

    if let Some(config) = config {
        for (module, module_level) in &config.modules {
            let directive = format!("{}={}", module, module_level);
            filter = filter.add_directive(
                directive
                    .parse()
                    .map_err(|e| ApiError::ConfigError(format!("Invalid log directive: {}", e)))?,
            );
        }
    }

    Ok(filter)
}

/// Output destinations
#[derive(Debug)]
struct OutputDestinations {
    stdout: bool,
    stderr: bool,
    file: bool,
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations, ApiError> {
    let (stdout, stderr, file) = match output {
        "stdout" => (true, false, false),
        "stderr" => (false, true, false),
        "file" => (false, false, true),
        "file+stderr" => (false, true, true),
        "both" => (true, true, false),
        _ => {
            return Err(ApiError::ConfigError(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stderr', or 'both')",
                output
            )))
        }
    };
    Ok(OutputDestinations {
        stdout,
        stderr,
        file,
    })
}
