//! # Router Module
//!
//! Path matching and parameter extraction for the dashboard endpoints.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Parsing path patterns such as `/GrainStats/:grain` at startup
//! - Matching incoming request paths against registered patterns
//! - Extracting named path parameters from the matched segments
//!
//! ## Matching Rules
//!
//! 1. **Tokenize**: the pattern and the request path are split on `/`.
//!    A segment starting with `:` is a named placeholder.
//! 2. **Compare**: segment counts must be equal, literals must match exactly
//!    (case-sensitive) and placeholders accept any non-empty segment.
//! 3. **Resolve**: entries are tested in registration order and the first
//!    structural match wins. Register exact-literal routes before the
//!    placeholder routes that could shadow them.
//!
//! ## Example
//!
//! ```rust
//! use silodash::router::RouteTable;
//!
//! let mut table = RouteTable::new();
//! table.register("/GrainStats/:grain", "grain_stats").unwrap();
//!
//! let m = table.route("/GrainStats/MyActorType").unwrap();
//! assert_eq!(*m.handler, "grain_stats");
//! assert_eq!(m.get_param("grain"), Some("MyActorType"));
//! assert!(table.route("/GrainStats").is_none());
//! ```

mod core;

pub use core::{
    param, InvalidPatternReason, ParamVec, RouteEntry, RouteError, RouteMatch, RoutePattern,
    RouteTable, Segment, MAX_INLINE_PARAMS, PARAM_SENTINEL,
};
