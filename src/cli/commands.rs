use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use tracing::info;

use super::demo;
use crate::options::ApiOptions;
use crate::server::{HttpServer, DEFAULT_WORKERS};
use crate::telemetry::{init_logging, LogConfig};

/// Command-line interface for apigate
#[derive(Parser)]
#[command(name = "apigate", version)]
#[command(about = "apigate API dispatch server", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the demo route groups over HTTP
    Serve {
        /// Options file (YAML, or JSON with a .json extension)
        #[arg(short, long, env = "APIGATE_CONFIG")]
        config: Option<PathBuf>,

        /// Address and port to bind the server to
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,

        /// Number of worker threads
        #[arg(long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,
    },
    /// Print the demo route table
    Routes {
        /// Options file (YAML, or JSON with a .json extension)
        #[arg(short, long, env = "APIGATE_CONFIG")]
        config: Option<PathBuf>,
    },
}

/// Execute a parsed command line.
///
/// # Errors
///
/// Returns an error if the options cannot be loaded, logging cannot be
/// initialized or the server fails to start.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            addr,
            workers,
        } => {
            let options = load_options(config.as_deref())?;
            init_logging(&LogConfig::from_env(options.environment()))?;
            info!(
                label = %options.label(),
                response_type = options.response_type().tag(),
                "Starting apigate"
            );

            let dispatcher = Arc::new(demo::build_dispatcher(Arc::new(options))?);
            let handle = HttpServer::new(dispatcher)
                .workers(workers)
                .start(addr.as_str())?;
            handle
                .join()
                .map_err(|e| anyhow!("worker thread panicked: {e:?}"))
        }
        Commands::Routes { config } => {
            let options = load_options(config.as_deref())?;
            let dispatcher = demo::build_dispatcher(Arc::new(options))?;
            for group in dispatcher.groups() {
                group.dump_routes();
            }
            Ok(())
        }
    }
}

fn load_options(path: Option<&Path>) -> anyhow::Result<ApiOptions> {
    match path {
        Some(path) => ApiOptions::from_yaml_file(path),
        None => Ok(ApiOptions::default()),
    }
}
