//! Wiring from loaded configuration to content services.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use hb_config::{CliSettings, Config, RouteConfig};
use hb_site::{Docs, RouteNode, RouteTable, Weeks};
use hb_storage::{FsStorage, Storage};

use crate::error::CliError;

/// Arguments shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover homebase.toml).
    #[arg(short, long, env = "HOMEBASE_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Content root directory (overrides config).
    #[arg(long)]
    pub(crate) content_root: Option<PathBuf>,

    /// Enable verbose output (info-level logging).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl CommonArgs {
    /// Load configuration with this command's overrides applied.
    pub(crate) fn load_config(&self, output_dir: Option<PathBuf>) -> Result<Config, CliError> {
        let settings = CliSettings {
            content_root: self.content_root.clone(),
            output_dir,
        };
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}

/// Content services over the configured content root.
pub(crate) struct Site {
    pub(crate) docs: Docs,
    pub(crate) weeks: Weeks,
}

impl Site {
    pub(crate) fn open(config: &Config) -> Result<Self, CliError> {
        let routes = RouteTable::new(route_nodes(&config.routes))?;
        let storage: Arc<dyn Storage> =
            Arc::new(FsStorage::new(config.content_resolved.root.clone()));
        tracing::info!(
            root = %config.content_resolved.root.display(),
            pages = routes.page_routes().len(),
            "Opened content root"
        );
        Ok(Self {
            docs: Docs::new(Arc::clone(&storage), Arc::new(routes)),
            weeks: Weeks::new(storage),
        })
    }
}

/// Convert declared routes into route tree nodes.
pub(crate) fn route_nodes(routes: &[RouteConfig]) -> Vec<RouteNode> {
    routes
        .iter()
        .map(|route| RouteNode {
            href: route.href.clone(),
            title: route.title.clone(),
            items: route_nodes(&route.items),
            no_link: route.no_link,
        })
        .collect()
}
