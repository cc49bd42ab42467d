//! Dispatcher core module - marshals units of work onto the designated context.

use super::context::{ExecutionContext, Job};
use may::sync::mpsc;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Default upper bound for one dispatched unit, matching the 30 second
/// handler wait used by the HTTP layer.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure of the dispatch machinery itself.
///
/// Failures raised *by* a unit are not wrapped in this type; they come back
/// to the caller unchanged. Callers' error types absorb these variants
/// through `From<DispatchError>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The designated context is closed or its worker is gone
    ContextUnavailable,
    /// The unit did not complete within the configured bound
    TimedOut(Duration),
    /// The unit panicked on the designated context
    Panicked(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::ContextUnavailable => {
                write!(f, "designated execution context is not accepting work")
            }
            DispatchError::TimedOut(limit) => {
                write!(f, "dispatched unit did not complete within {}ms", limit.as_millis())
            }
            DispatchError::Panicked(msg) => write!(f, "dispatched unit panicked: {msg}"),
        }
    }
}

impl std::error::Error for DispatchError {}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Runs units of work on one designated [`ExecutionContext`].
///
/// Cheap to clone; all clones share the same context. Callable from any
/// coroutine or thread. Inside a `may` coroutine the wait for the result
/// parks only the calling coroutine, so other requests keep being served.
#[derive(Clone)]
pub struct Dispatcher {
    context: Arc<dyn ExecutionContext>,
    timeout: Option<Duration>,
}

impl Dispatcher {
    /// Create a dispatcher bound to `context` with [`DEFAULT_DISPATCH_TIMEOUT`].
    #[must_use]
    pub fn new(context: Arc<dyn ExecutionContext>) -> Self {
        Self {
            context,
            timeout: Some(DEFAULT_DISPATCH_TIMEOUT),
        }
    }

    /// Replace the per-unit timeout. `None` waits indefinitely.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn context_name(&self) -> &str {
        self.context.name()
    }

    /// Backlog of the designated context, when it reports one.
    #[must_use]
    pub fn queue_depth(&self) -> Option<usize> {
        self.context.queue_depth()
    }

    /// Run `unit` on the designated context and wait for its outcome.
    ///
    /// The value or error produced by `unit` is returned unchanged. Failures
    /// of the dispatch machinery (closed context, timeout, panic) are
    /// converted into `E`. There are no retries.
    ///
    /// When the wait times out, the unit is marked cancelled: if the context
    /// has not started it yet, it is skipped. A unit that already started
    /// runs to completion and its result is discarded.
    ///
    /// # Errors
    ///
    /// Whatever `unit` returns, or `E::from(DispatchError)`.
    pub fn dispatch<T, E, F>(&self, unit: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DispatchError> + Send + 'static,
    {
        let (reply_tx, reply_rx) = mpsc::channel::<thread::Result<Result<T, E>>>();
        let cancelled = Arc::new(AtomicBool::new(false));
        let skip = Arc::clone(&cancelled);

        let job: Job = Box::new(move || {
            if skip.load(Ordering::Acquire) {
                return;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(unit));
            // The caller may have timed out and dropped its receiver.
            let _ = reply_tx.send(outcome);
        });

        self.context.execute(job).map_err(E::from)?;

        let outcome = match self.timeout {
            Some(limit) => match reply_rx.recv_timeout(limit) {
                Ok(outcome) => outcome,
                Err(RecvTimeoutError::Timeout) => {
                    cancelled.store(true, Ordering::Release);
                    warn!(
                        context = %self.context.name(),
                        timeout_ms = limit.as_millis() as u64,
                        queue_depth = ?self.context.queue_depth(),
                        "Dispatched unit timed out"
                    );
                    return Err(E::from(DispatchError::TimedOut(limit)));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(E::from(DispatchError::ContextUnavailable));
                }
            },
            None => reply_rx
                .recv()
                .map_err(|_| E::from(DispatchError::ContextUnavailable))?,
        };

        match outcome {
            Ok(result) => result,
            Err(payload) => Err(E::from(DispatchError::Panicked(panic_message(
                payload.as_ref(),
            )))),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("context", &self.context.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
