//! HTTP layer: the response writer, the routing service and the server
//! wrapper around `may_minihttp`.

pub mod http_server;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use response::{return_error, return_file, return_json, HttpContext};
pub use service::DashboardService;
