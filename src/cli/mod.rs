//! # CLI Module
//!
//! Command-line front end for running the demo service.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Load options, build the demo dispatcher and serve it over HTTP:
//!
//! ```bash
//! apigate serve --config config/config.yaml --addr 0.0.0.0:8080 --workers 8
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML options file (or `APIGATE_CONFIG`); defaults apply when omitted
//! - `--addr <ADDR>` - Address to bind (default `0.0.0.0:8080`)
//! - `--workers <N>` - Worker threads (default 4)
//!
//! ### `routes`
//!
//! Print the route table the demo service would serve:
//!
//! ```bash
//! apigate routes --config config/config.yaml
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use apigate::cli::{Cli, run_cli};
//! use clap::Parser;
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;
pub mod demo;


pub use commands::{run_cli, Cli, Commands};
