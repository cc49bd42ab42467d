use crate::cluster::{GrainFactory, SnapshotCluster};
use crate::config::{parse_stack_size, DashboardConfig};
use crate::controller::DashboardController;
use crate::dispatcher::{CoroutineContext, Dispatcher};
use crate::server::{DashboardService, HttpServer};
use crate::static_files::{AssetLoader, EmbeddedAssets, StaticFiles};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Name of the designated context that runs every cluster call.
pub const CLUSTER_CONTEXT_NAME: &str = "cluster-context";

/// Command-line interface for the dashboard server
#[derive(Parser, Debug)]
#[command(name = "silodash")]
#[command(about = "Cluster dashboard HTTP server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the dashboard
    Serve {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address and port to bind the server to
        #[arg(long)]
        addr: Option<String>,

        /// Serve UI assets from this directory instead of the embedded copies
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Cluster snapshot answering the grain calls
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Per-dispatch timeout in milliseconds, 0 to disable
        #[arg(long)]
        dispatch_timeout_ms: Option<u64>,

        /// Coroutine stack size, decimal or 0x hex
        #[arg(long, value_parser = stack_size_arg)]
        stack_size: Option<usize>,
    },
    /// Print the route table in match order
    Routes,
}

fn stack_size_arg(raw: &str) -> Result<usize, String> {
    parse_stack_size(raw).ok_or_else(|| format!("invalid stack size '{raw}'"))
}

impl Commands {
    /// Layer the flags of `serve` over a loaded configuration.
    pub fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Commands::Serve {
            addr,
            static_dir,
            snapshot,
            dispatch_timeout_ms,
            stack_size,
            ..
        } = self
        {
            if let Some(addr) = addr {
                config.bind_addr = addr.clone();
            }
            if let Some(dir) = static_dir {
                config.static_dir = Some(dir.clone());
            }
            if let Some(path) = snapshot {
                config.snapshot = Some(path.clone());
            }
            if let Some(ms) = dispatch_timeout_ms {
                config.dispatch_timeout_ms = *ms;
            }
            if let Some(size) = stack_size {
                config.stack_size = *size;
            }
        }
    }
}

/// Assemble the service for `config`: cluster, designated context,
/// dispatcher, assets and route table.
///
/// # Errors
///
/// Fails if the snapshot cannot be loaded, the context coroutine cannot be
/// spawned, or a route pattern is invalid.
pub fn build_service(config: &DashboardConfig) -> Result<DashboardService> {
    let factory: Arc<dyn GrainFactory> = match &config.snapshot {
        Some(path) => Arc::new(SnapshotCluster::from_path(path)?),
        None => {
            warn!("No cluster snapshot configured - serving an empty cluster");
            Arc::new(SnapshotCluster::default())
        }
    };

    // SAFETY: the may runtime is configured by the caller before any
    // coroutine is spawned.
    let context = unsafe { CoroutineContext::spawn(CLUSTER_CONTEXT_NAME, config.stack_size) }
        .context("Failed to spawn the cluster execution context")?;
    let dispatcher = Dispatcher::new(Arc::new(context)).with_timeout(config.dispatch_timeout());

    let assets: Arc<dyn AssetLoader> = match &config.static_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Serving dashboard assets from directory");
            Arc::new(StaticFiles::new(dir.clone()))
        }
        None => Arc::new(EmbeddedAssets),
    };

    let routes = DashboardController::routes().context("Invalid dashboard route table")?;
    let controller = DashboardController::new(factory, dispatcher, assets);
    Ok(DashboardService::new(routes, controller))
}

/// Execute the parsed command line.
///
/// # Errors
///
/// Startup failures from configuration, service assembly or binding.
pub fn run_cli(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Serve { config: path, .. } => {
            let mut config = DashboardConfig::load(path.as_deref())?;
            cli.command.apply_overrides(&mut config);

            may::config().set_stack_size(config.stack_size);
            info!(
                bind_addr = %config.bind_addr,
                dispatch_timeout_ms = config.dispatch_timeout_ms,
                stack_size = config.stack_size,
                "Starting dashboard"
            );

            let service = build_service(&config)?;
            let handle = HttpServer(service)
                .start(config.bind_addr.as_str())
                .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
            handle
                .join()
                .map_err(|e| anyhow!("Dashboard server panicked: {e:?}"))?;
            Ok(())
        }
        Commands::Routes => {
            let routes = DashboardController::routes().context("Invalid dashboard route table")?;
            for entry in routes.entries() {
                println!("GET {}", entry.pattern);
            }
            Ok(())
        }
    }
}
