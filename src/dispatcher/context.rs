//! Designated execution contexts.
//!
//! An [`ExecutionContext`] accepts boxed jobs and runs them one at a time on
//! a single, distinguished execution resource. The production implementation
//! is [`CoroutineContext`]: one long-lived `may` coroutine draining a mailbox.

use super::core::DispatchError;
use may::coroutine;
use may::sync::mpsc;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// A unit of work handed to an [`ExecutionContext`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// The single scheduling context every cluster call must run on.
///
/// Implementations must run accepted jobs sequentially, in submission order,
/// each to completion before the next starts, and never on the submitting
/// caller's own execution context.
pub trait ExecutionContext: Send + Sync {
    /// Human readable name, used in logs.
    fn name(&self) -> &str;

    /// Queue `job` for execution.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ContextUnavailable`] if the context no longer
    /// accepts work.
    fn execute(&self, job: Job) -> Result<(), DispatchError>;

    /// Jobs accepted but not yet started, if the context tracks them.
    fn queue_depth(&self) -> Option<usize> {
        None
    }
}

/// Single-worker coroutine mailbox.
///
/// Cloning shares the same worker. When the last clone is dropped the
/// mailbox closes; the worker finishes whatever is queued and exits.
#[derive(Clone)]
pub struct CoroutineContext {
    name: Arc<str>,
    sender: mpsc::Sender<Job>,
    queue_depth: Arc<AtomicUsize>,
}

impl CoroutineContext {
    /// Spawn the worker coroutine.
    ///
    /// # Safety
    ///
    /// This function is marked unsafe because it calls `may::coroutine::Builder::spawn()`,
    /// which is unsafe in the `may` runtime. The caller must ensure the May runtime is
    /// configured (stack size, worker count) before the first context is spawned.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the coroutine could not be created.
    pub unsafe fn spawn(name: &str, stack_size: usize) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let queue_depth = Arc::new(AtomicUsize::new(0));
        let worker_depth = Arc::clone(&queue_depth);
        let worker_name = name.to_string();

        // SAFETY: see the function-level contract; the closure only owns
        // Send data and reports failures through the jobs' own reply channels.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .name(name.to_string())
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(context = %worker_name, stack_size, "Execution context start");
                    for job in rx.iter() {
                        worker_depth.fetch_sub(1, Ordering::AcqRel);
                        job();
                    }
                    debug!(context = %worker_name, "Execution context closed");
                })
        };

        if let Err(e) = spawn_result {
            error!(
                context = %name,
                error = %e,
                stack_size,
                "Failed to spawn execution context coroutine - CRITICAL"
            );
            return Err(e);
        }

        info!(context = %name, stack_size, "Execution context spawned");
        Ok(Self {
            name: Arc::from(name),
            sender: tx,
            queue_depth,
        })
    }
}

impl ExecutionContext for CoroutineContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, job: Job) -> Result<(), DispatchError> {
        self.queue_depth.fetch_add(1, Ordering::AcqRel);
        self.sender.send(job).map_err(|_| {
            self.queue_depth.fetch_sub(1, Ordering::AcqRel);
            DispatchError::ContextUnavailable
        })
    }

    fn queue_depth(&self) -> Option<usize> {
        Some(self.queue_depth.load(Ordering::Acquire))
    }
}
