//! # CLI Module
//!
//! ## Commands
//!
//! ### `serve`
//!
//! ```bash
//! silodash serve --snapshot cluster.yaml --addr 127.0.0.1:8080
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML configuration file
//! - `--addr <ADDR>` - Bind address (default `0.0.0.0:8080`)
//! - `--static-dir <DIR>` - Serve `Index.html`/`index.min.js` from disk
//! - `--snapshot <FILE>` - Cluster snapshot backing the grain calls
//! - `--dispatch-timeout-ms <MS>` - Bound on each cluster call (0 disables)
//! - `--stack-size <SIZE>` - Coroutine stack size
//!
//! Flags override the config file and `SILODASH_*` variables.
//!
//! ### `routes`
//!
//! Print the registered route patterns in match order.

mod commands;


pub use commands::{build_service, run_cli, Cli, Commands, CLUSTER_CONTEXT_NAME};
