//! Response writer: terminal operations that complete an [`HttpContext`].

use crate::error::DashboardError;
use crate::ids::RequestId;
use crate::static_files::AssetLoader;
use http::StatusCode;
use may_minihttp::Response;
use serde::Serialize;
use tracing::warn;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const HTML_CONTENT_TYPE: &str = "text/html";
pub const JAVASCRIPT_CONTENT_TYPE: &str = "application/javascript";

/// `may_minihttp` only accepts `'static` header lines.
fn content_type_header(content_type: &str) -> &'static str {
    match content_type {
        JSON_CONTENT_TYPE => "Content-Type: application/json",
        HTML_CONTENT_TYPE => "Content-Type: text/html",
        JAVASCRIPT_CONTENT_TYPE => "Content-Type: application/javascript",
        "text/css" => "Content-Type: text/css",
        "text/plain" => "Content-Type: text/plain",
        _ => "Content-Type: application/octet-stream",
    }
}

/// Per-request state shared by the router, handlers and writer.
///
/// The response fields can be set once; the first `return_*` call wins.
#[derive(Debug)]
pub struct HttpContext {
    pub request_id: RequestId,
    pub method: String,
    pub path: String,
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
    completed: bool,
}

impl HttpContext {
    #[must_use]
    pub fn new(request_id: RequestId, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id,
            method: method.into(),
            path: path.into(),
            status: StatusCode::OK,
            content_type: JSON_CONTENT_TYPE,
            body: Vec::new(),
            completed: false,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn complete(&mut self, status: StatusCode, content_type: &'static str, body: Vec<u8>) {
        if self.completed {
            warn!(
                request_id = %self.request_id,
                path = %self.path,
                "Response already completed - ignoring second write"
            );
            return;
        }
        self.status = status;
        self.content_type = content_type;
        self.body = body;
        self.completed = true;
    }

    /// Copy the completed response into the wire response.
    pub fn write_to(&self, res: &mut Response) {
        let reason = self.status.canonical_reason().unwrap_or("Unknown");
        res.status_code(usize::from(self.status.as_u16()), reason);
        res.header(content_type_header(self.content_type));
        res.body_vec(self.body.clone());
    }
}

/// Encode `value` as the JSON body of a 200 response.
///
/// `None` and unit values encode as `null`.
///
/// # Errors
///
/// [`DashboardError::Serialization`] if `value` cannot be encoded; the
/// context is left incomplete so the boundary can answer with an error.
pub fn return_json<T: Serialize + ?Sized>(
    ctx: &mut HttpContext,
    value: &T,
) -> Result<(), DashboardError> {
    let body = serde_json::to_vec(value)?;
    ctx.complete(StatusCode::OK, JSON_CONTENT_TYPE, body);
    Ok(())
}

/// Serve the named resource from `assets` with the given content type.
///
/// # Errors
///
/// [`DashboardError::Asset`] if the resource cannot be loaded.
pub fn return_file(
    ctx: &mut HttpContext,
    assets: &dyn AssetLoader,
    name: &str,
    content_type: &'static str,
) -> Result<(), DashboardError> {
    let bytes = assets.load(name).map_err(|source| DashboardError::Asset {
        name: name.to_string(),
        source,
    })?;
    ctx.complete(StatusCode::OK, content_type, bytes);
    Ok(())
}

/// Complete the context with a generic error body for `err`.
///
/// Only the canonical reason phrase is exposed; details stay in the logs.
pub fn return_error(ctx: &mut HttpContext, err: &DashboardError) {
    let status = err.status();
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = serde_json::json!({ "error": reason }).to_string().into_bytes();
    ctx.complete(status, JSON_CONTENT_TYPE, body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_files::EmbeddedAssets;
    use std::collections::BTreeMap;

    fn ctx() -> HttpContext {
        HttpContext::new(RequestId::new(), "GET", "/test")
    }

    #[test]
    fn test_return_json_null() {
        let mut c = ctx();
        return_json(&mut c, &Option::<u32>::None).unwrap();
        assert_eq!(c.status(), StatusCode::OK);
        assert_eq!(c.content_type(), JSON_CONTENT_TYPE);
        assert_eq!(c.body(), b"null");
        assert!(c.is_completed());
    }

    #[test]
    fn test_return_json_rejects_non_string_keys() {
        let mut c = ctx();
        let mut m = BTreeMap::new();
        m.insert(vec![1u8], 1);
        let err = return_json(&mut c, &m).unwrap_err();
        assert!(matches!(err, DashboardError::Serialization(_)));
        assert!(!c.is_completed());
    }

    #[test]
    fn test_first_write_wins() {
        let mut c = ctx();
        return_json(&mut c, &1).unwrap();
        return_json(&mut c, &2).unwrap();
        assert_eq!(c.body(), b"1");
    }

    #[test]
    fn test_return_file_sets_content_type() {
        let mut c = ctx();
        return_file(&mut c, &EmbeddedAssets, "index.min.js", JAVASCRIPT_CONTENT_TYPE).unwrap();
        assert_eq!(c.content_type(), JAVASCRIPT_CONTENT_TYPE);
        assert!(!c.body().is_empty());
    }

    #[test]
    fn test_return_error_hides_detail() {
        let mut c = ctx();
        let err = DashboardError::RouteNotFound {
            path: "/secret/path".into(),
        };
        return_error(&mut c, &err);
        assert_eq!(c.status(), StatusCode::NOT_FOUND);
        assert_eq!(c.body(), br#"{"error":"Not Found"}"#);
    }

    #[test]
    fn test_content_type_header_fallback() {
        assert_eq!(
            content_type_header("image/png"),
            "Content-Type: application/octet-stream"
        );
        assert_eq!(content_type_header(HTML_CONTENT_TYPE), "Content-Type: text/html");
    }
}
