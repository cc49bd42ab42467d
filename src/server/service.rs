use super::response::{return_error, HttpContext};
use crate::controller::{DashboardController, Handler};
use crate::error::DashboardError;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::RouteTable;
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The dashboard's `HttpService`.
///
/// Cloned once per connection by `may_minihttp`; clones share the route
/// table and controller.
#[derive(Clone, Debug)]
pub struct DashboardService {
    routes: Arc<RouteTable<Handler>>,
    controller: Arc<DashboardController>,
}

impl DashboardService {
    pub fn new(routes: RouteTable<Handler>, controller: DashboardController) -> Self {
        Self {
            routes: Arc::new(routes),
            controller: Arc::new(controller),
        }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable<Handler> {
        &self.routes
    }

    /// Serve one request with a freshly generated request id.
    pub fn handle(&self, method: &str, raw_path: &str) -> HttpContext {
        self.handle_with_id(RequestId::new(), method, raw_path)
    }

    /// Route the request, run its handler and complete the context.
    ///
    /// Every failure is mapped to a status here; nothing escapes as a
    /// transport error.
    pub fn handle_with_id(&self, request_id: RequestId, method: &str, raw_path: &str) -> HttpContext {
        let start = Instant::now();
        let path = raw_path.split('?').next().unwrap_or("/");
        let mut ctx = HttpContext::new(request_id, method, path);

        if let Err(err) = self.route_and_run(&mut ctx) {
            if err.is_server_error() {
                error!(
                    request_id = %ctx.request_id,
                    method = %ctx.method,
                    path = %ctx.path,
                    error = %err,
                    "Request failed"
                );
            } else {
                warn!(
                    request_id = %ctx.request_id,
                    method = %ctx.method,
                    path = %ctx.path,
                    error = %err,
                    "Request rejected"
                );
            }
            return_error(&mut ctx, &err);
        }

        info!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            status = ctx.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
        ctx
    }

    fn route_and_run(&self, ctx: &mut HttpContext) -> Result<(), DashboardError> {
        if ctx.method != "GET" {
            return Err(DashboardError::MethodNotAllowed {
                method: ctx.method.clone(),
            });
        }
        let path = ctx.path.clone();
        let matched = self
            .routes
            .route(&path)
            .ok_or_else(|| DashboardError::RouteNotFound { path: path.clone() })?;
        debug!(
            request_id = %ctx.request_id,
            pattern = %matched.pattern,
            params = ?matched.params,
            "Dispatching to handler"
        );
        (matched.handler)(self.controller.as_ref(), ctx, &matched.params)?;
        if !ctx.is_completed() {
            warn!(
                request_id = %ctx.request_id,
                path = %ctx.path,
                "Handler returned without writing a response"
            );
        }
        Ok(())
    }
}

impl HttpService for DashboardService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request_id = RequestId::from_header_value(
            req.headers()
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case(REQUEST_ID_HEADER))
                .map(|h| h.value),
        );
        let ctx = self.handle_with_id(request_id, req.method(), req.path());
        ctx.write_to(res);
        Ok(())
    }
}
