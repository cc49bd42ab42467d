//! # Dispatcher Module
//!
//! The dispatcher bridges the free-threaded HTTP layer and the actor runtime,
//! which only accepts calls issued from one designated scheduling context.
//!
//! ## Overview
//!
//! Every cluster call made by an endpoint handler is wrapped in a unit of
//! work (a closure returning `Result<T, E>`) and handed to
//! [`Dispatcher::dispatch`]. The dispatcher:
//! - Sends the unit to the designated [`ExecutionContext`] through its mailbox
//! - Parks the calling coroutine until the unit's reply arrives
//! - Returns the unit's value or error unchanged
//!
//! ## Architecture
//!
//! ```text
//! request coroutine A ──┐
//! request coroutine B ──┼──► mailbox ──► designated context (one coroutine)
//! request coroutine C ──┘                    │ runs units one at a time
//!          ▲                                 │
//!          └──────── per-unit reply channel ◄┘
//! ```
//!
//! - The context runs one unit at a time, to completion, in submission order
//! - Replies travel on a one-shot channel owned by the caller, so handing the
//!   result back never re-enters the designated context
//! - Waiting is bounded by a timeout; an expired unit that has not started is
//!   skipped
//! - A panicking unit is caught on the context, which keeps serving
//!
//! ## Example
//!
//! ```rust,no_run
//! use silodash::dispatcher::{CoroutineContext, DispatchError, Dispatcher};
//! use std::sync::Arc;
//!
//! let context = unsafe { CoroutineContext::spawn("cluster-context", 0x4000) }.unwrap();
//! let dispatcher = Dispatcher::new(Arc::new(context));
//!
//! let answer: Result<u32, DispatchError> = dispatcher.dispatch(|| Ok(6 * 7));
//! assert_eq!(answer, Ok(42));
//! ```
//!
//! ## Testing
//!
//! [`ExecutionContext`] is a plain trait, so tests can inject an instrumented
//! context (for instance a named OS thread) and assert where units ran.

mod context;
mod core;

pub use context::{CoroutineContext, ExecutionContext, Job};
pub use core::{DispatchError, Dispatcher, DEFAULT_DISPATCH_TIMEOUT};
