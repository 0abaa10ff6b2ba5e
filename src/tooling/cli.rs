//! CLI Tooling
//!
//! Command-line interface over a persistent bookmark store. Every mutating
//! command goes through [`SortService`], so store calls are reconciled the same
//! way the library does it.

use crate::config::SorterConfig;
use crate::error::ApiError;
use crate::service::{plan, ApplyTarget, SortService};
use crate::sort::SortPolicy;
use crate::store::{BookmarkStore, SledBookmarkStore};
use crate::tooling::render;
use crate::tree::{snapshot_from_json, snapshot_to_json};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// bookmark-sorter - reorder a bookmark tree by date or title
#[derive(Parser, Debug)]
#[command(name = "bookmark-sorter")]
#[command(about = "Sort a bookmark tree and reconcile the new order against a bookmark store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Bookmark store directory (overrides store.path)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sort the store in place
    Sort {
        /// Sort policy (defaults to sort.default_policy)
        #[arg(long, value_parser = parse_policy)]
        policy: Option<SortPolicy>,
        /// Where the sorted top level is placed
        #[arg(long, value_parser = parse_target)]
        target: Option<ApplyTarget>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the tree a sort would produce without touching the store
    Plan {
        #[arg(long, value_parser = parse_policy)]
        policy: Option<SortPolicy>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load a getTree-style JSON snapshot into the store
    Import {
        path: PathBuf,
        /// Replace the store contents instead of reconciling into them
        #[arg(long)]
        replace: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write the store as getTree-style JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the store as an indented tree
    Tree,
    /// List available sort policies
    Policies,
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_policy(value: &str) -> Result<SortPolicy, String> {
    value.parse().map_err(|e: ApiError| e.to_string())
}

fn parse_target(value: &str) -> Result<ApplyTarget, String> {
    value.parse().map_err(|e: ApiError| e.to_string())
}

/// Opened store plus the service driving it.
pub struct CliContext {
    store: Arc<SledBookmarkStore>,
    service: SortService,
    config: SorterConfig,
}

impl CliContext {
    /// Open the configured store; `store_override` wins over `store.path`.
    pub fn from_config(
        config: SorterConfig,
        store_override: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        config.validate()?;
        let store_path = match store_override {
            Some(path) => path,
            None => config.store_path()?,
        };
        std::fs::create_dir_all(&store_path)?;
        let store = Arc::new(SledBookmarkStore::open(&store_path)?);
        info!(path = %store_path.display(), nodes = store.len(), "Opened bookmark store");
        Ok(Self::with_store(config, store))
    }

    /// Build a context around an already opened store.
    pub fn with_store(config: SorterConfig, store: Arc<SledBookmarkStore>) -> Self {
        let service = SortService::new(
            Arc::clone(&store) as Arc<dyn BookmarkStore>,
            config.sort_options(),
        );
        Self {
            store,
            service,
            config,
        }
    }

    pub fn service(&self) -> &SortService {
        &self.service
    }

    /// Execute a CLI command, returning the text to print.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Sort {
                policy,
                target,
                yes,
                format,
            } => self.handle_sort(*policy, *target, *yes, *format).await,
            Commands::Plan { policy, format } => self.handle_plan(*policy, *format).await,
            Commands::Import {
                path,
                replace,
                format,
            } => self.handle_import(path, *replace, *format).await,
            Commands::Export { output } => self.handle_export(output.as_ref()).await,
            Commands::Tree => {
                let root = self.store.get_tree().await?;
                Ok(render::render_tree(&root))
            }
            Commands::Policies => Ok(render::render_policies()),
            Commands::Config => toml::to_string_pretty(&self.config).map_err(|e| {
                ApiError::ConfigError(format!("Failed to serialize configuration: {}", e))
            }),
        }
    }

    fn resolve_policy(&self, policy: Option<SortPolicy>) -> Result<SortPolicy, ApiError> {
        match policy {
            Some(policy) => Ok(policy),
            None => self.config.sort.default_policy.parse(),
        }
    }

    async fn handle_sort(
        &self,
        policy: Option<SortPolicy>,
        target: Option<ApplyTarget>,
        yes: bool,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let policy = self.resolve_policy(policy)?;

        if !yes {
            if !std::io::stdin().is_terminal() {
                return Err(ApiError::InvalidArgument(
                    "Refusing to sort without confirmation; pass --yes".to_string(),
                ));
            }
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Reorder {} bookmarks by {}?",
                    self.store.len().saturating_sub(1),
                    policy
                ))
                .interact()
                .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))?;
            if !confirmed {
                return Ok("Sort cancelled".to_string());
            }
        }

        let report = match target {
            Some(target) if target != self.service.options().target => {
                let mut options = self.service.options().clone();
                options.target = target;
                let service = SortService::new(
                    Arc::clone(&self.store) as Arc<dyn BookmarkStore>,
                    options,
                );
                service.sort_store(policy.name()).await?
            }
            _ => self.service.sort_store(policy.name()).await?,
        };
        self.store.flush()?;

        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => Ok(render::render_apply_report(
                &report,
                self.config.logging.color && std::io::stdout().is_terminal(),
            )),
        }
    }

    async fn handle_plan(
        &self,
        policy: Option<SortPolicy>,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let policy = self.resolve_policy(policy)?;
        let snapshot = self.store.get_tree().await?;
        let sorted = plan(&snapshot, policy, self.service.options())?;
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&sorted)?),
            OutputFormat::Text => Ok(render::render_plan(&sorted)),
        }
    }

    async fn handle_import(
        &self,
        path: &PathBuf,
        replace: bool,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let json = std::fs::read_to_string(path)?;
        let snapshot = snapshot_from_json(&json)?;

        if replace {
            self.store.replace_with_snapshot(&snapshot)?;
            self.store.flush()?;
            let message = format!(
                "Replaced store with {} nodes from {}",
                snapshot.node_count(),
                path.display()
            );
            return match format {
                OutputFormat::Json => Ok(serde_json::json!({
                    "replaced": true,
                    "nodes": snapshot.node_count(),
                })
                .to_string()),
                OutputFormat::Text => Ok(message),
            };
        }

        let report = self.service.import_snapshot(&snapshot).await?;
        self.store.flush()?;
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => Ok(render::render_reconcile_report(
                &report,
                self.config.logging.color && std::io::stdout().is_terminal(),
            )),
        }
    }

    async fn handle_export(&self, output: Option<&PathBuf>) -> Result<String, ApiError> {
        let root = self.store.get_tree().await?;
        let json = snapshot_to_json(&root)?;
        match output {
            Some(path) => {
                std::fs::write(path, &json)?;
                Ok(format!(
                    "Exported {} nodes to {}",
                    root.node_count(),
                    path.display()
                ))
            }
            None => Ok(json),
        }
    }
}
