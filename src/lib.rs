//! # silodash
//!
//! **silodash** is the HTTP front end of a cluster monitoring dashboard. It
//! serves a small single-page UI plus a JSON API whose every answer comes
//! from grains hosted by an actor runtime.
//!
//! ## Overview
//!
//! The HTTP layer is free-threaded: requests are served concurrently on `may`
//! coroutines by `may_minihttp`. The actor runtime is not. It only accepts
//! calls made from one designated scheduling context. The crate bridges the
//! two with a dispatcher that marshals each cluster call onto that context
//! and hands the result back to the waiting request.
//!
//! ## Architecture
//!
//! - **[`router`]** - Ordered, first-match-wins table of `/`-separated
//!   patterns with `:name` placeholders
//! - **[`dispatcher`]** - Runs units of work on the designated context and
//!   returns their outcome unchanged
//! - **[`cluster`]** - Grain traits, statistics models and a file-backed
//!   snapshot cluster
//! - **[`controller`]** - The seven dashboard endpoints
//! - **[`server`]** - Response writer, error boundary and server lifecycle
//! - **[`static_files`]** - Embedded and directory-backed UI assets
//! - **[`config`]**, **[`logging`]**, **[`cli`]** - Process setup
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as DashboardService
//!     participant Router as RouteTable
//!     participant Handler as controller
//!     participant Dispatcher
//!     participant Context as designated context
//!     participant Grain
//!
//!     Client->>Service: GET /RuntimeStats/10.0.0.1:11111@1
//!     Service->>Router: route(path)
//!     Router-->>Service: handler + {address}
//!     Service->>Handler: handler(ctx, params)
//!     Handler->>Dispatcher: dispatch(unit)
//!     Dispatcher->>Context: mailbox send
//!     Context->>Grain: get_hosts / get_runtime_statistics
//!     Grain-->>Context: result
//!     Context-->>Dispatcher: reply channel
//!     Dispatcher-->>Handler: Result<T, E> unchanged
//!     Handler->>Service: return_json(ctx, value)
//!     Service-->>Client: 200 application/json
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use silodash::cli::build_service;
//! use silodash::config::DashboardConfig;
//! use silodash::server::HttpServer;
//!
//! let config = DashboardConfig::default();
//! let service = build_service(&config).unwrap();
//! let handle = HttpServer(service).start("127.0.0.1:8080").unwrap();
//! handle.join().unwrap();
//! ```

pub mod cli;
pub mod cluster;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod router;
pub mod server;
pub mod static_files;

pub use controller::{DashboardController, Handler};
pub use dispatcher::{DispatchError, Dispatcher};
pub use error::DashboardError;
pub use router::{RouteError, RouteTable};
