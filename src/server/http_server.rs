//! Listener lifecycle for the dashboard.
//!
//! [`HttpServer`] binds a `may_minihttp` accept loop for a service and hands
//! back a [`ServerHandle`]. The CLI blocks on [`ServerHandle::join`]; tests
//! use [`ServerHandle::wait_ready`] and [`ServerHandle::stop`].

use may::coroutine::JoinHandle;
use may_minihttp::HttpService;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long [`ServerHandle::wait_ready`] polls before giving up.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(250);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Starts the accept loop for any `may_minihttp` service.
pub struct HttpServer<T>(pub T);

/// A running dashboard listener.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the listener was bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// [`wait_ready_within`](Self::wait_ready_within) with [`DEFAULT_READY_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// `TimedOut` if no connection was accepted in time.
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_within(DEFAULT_READY_TIMEOUT)
    }

    /// Poll the listener with TCP connects until one succeeds.
    ///
    /// # Arguments
    ///
    /// * `limit` - Upper bound on the total wait
    ///
    /// # Returns
    ///
    /// `Ok(())` once a connection is accepted.
    ///
    /// # Errors
    ///
    /// `TimedOut` if `limit` passes without a successful connect.
    pub fn wait_ready_within(&self, limit: Duration) -> io::Result<()> {
        let deadline = Instant::now() + limit;
        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            if TcpStream::connect(self.addr).is_ok() {
                debug!(addr = %self.addr, attempts, "Dashboard server accepting connections");
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(addr = %self.addr, attempts, "Dashboard server not ready");
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("dashboard server on {} not ready", self.addr),
                ));
            }
            thread::sleep(READY_POLL_INTERVAL);
        }
    }

    /// Cancel the accept loop and wait for it to finish.
    ///
    /// Requests already inside a handler are not waited for.
    pub fn stop(self) {
        // SAFETY: cancel() is unsafe in may; the handle is valid and the
        // server coroutine is not used after this point.
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            debug!(addr = %self.addr, "Accept loop ended by cancellation");
        }
        info!(addr = %self.addr, "Dashboard server stopped");
    }

    /// Block until the accept loop exits.
    ///
    /// # Returns
    ///
    /// `Ok(())` when the loop returns normally, which only happens after a
    /// listener error.
    ///
    /// # Errors
    ///
    /// The panic payload if the accept coroutine panicked.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind and start serving.
    ///
    /// # Arguments
    ///
    /// * `addr` - Listen address; the first resolved address is used
    ///
    /// # Returns
    ///
    /// A [`ServerHandle`] for the running listener.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `addr` resolves to nothing, otherwise the bind error.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "listen address resolved to nothing")
        })?;
        let handle = may_minihttp::HttpServer(self.0).start(addr).map_err(|e| {
            warn!(addr = %addr, error = %e, "Failed to bind dashboard server");
            e
        })?;
        info!(addr = %addr, "Dashboard server listening");
        Ok(ServerHandle { addr, handle })
    }
}
