//! Request-level error taxonomy and its HTTP mapping.

use crate::cluster::{AddressParseError, GrainError};
use crate::dispatcher::DispatchError;
use http::StatusCode;
use std::fmt;
use std::io;

/// Everything that can fail while serving one dashboard request.
///
/// Handlers propagate these with `?`; the service boundary turns them into
/// a status code and a generic body.
#[derive(Debug)]
pub enum DashboardError {
    /// No registered pattern matched the path
    RouteNotFound { path: String },
    /// Only GET is served
    MethodNotAllowed { method: String },
    /// A matched route is missing a parameter its handler expects
    MissingParameter(&'static str),
    /// The `:address` segment is not a parsable silo address
    InvalidAddress(AddressParseError),
    /// The dispatch machinery failed (timeout, closed context, panic)
    Dispatch(DispatchError),
    /// A grain call raised an error on the designated context
    Grain(GrainError),
    /// The produced value could not be encoded as JSON
    Serialization(serde_json::Error),
    /// A static asset could not be loaded
    Asset { name: String, source: io::Error },
}

impl DashboardError {
    /// HTTP status reported to the client.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            DashboardError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            DashboardError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            DashboardError::Dispatch(DispatchError::TimedOut(_)) => StatusCode::GATEWAY_TIMEOUT,
            DashboardError::Dispatch(DispatchError::ContextUnavailable) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DashboardError::Dispatch(DispatchError::Panicked(_))
            | DashboardError::MissingParameter(_)
            | DashboardError::Grain(_)
            | DashboardError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::Asset { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                StatusCode::NOT_FOUND
            }
            DashboardError::Asset { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is a server-side failure worth logging at `error`.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::RouteNotFound { path } => write!(f, "no route matches '{path}'"),
            DashboardError::MethodNotAllowed { method } => {
                write!(f, "method {method} is not allowed")
            }
            DashboardError::MissingParameter(name) => {
                write!(f, "route parameter '{name}' was not captured")
            }
            DashboardError::InvalidAddress(e) => write!(f, "invalid silo address: {e}"),
            DashboardError::Dispatch(e) => write!(f, "dispatch failed: {e}"),
            DashboardError::Grain(e) => write!(f, "grain call failed: {e}"),
            DashboardError::Serialization(e) => write!(f, "failed to encode response: {e}"),
            DashboardError::Asset { name, source } => {
                write!(f, "failed to load asset '{name}': {source}")
            }
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::InvalidAddress(e) => Some(e),
            DashboardError::Dispatch(e) => Some(e),
            DashboardError::Grain(e) => Some(e),
            DashboardError::Serialization(e) => Some(e),
            DashboardError::Asset { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DispatchError> for DashboardError {
    fn from(e: DispatchError) -> Self {
        DashboardError::Dispatch(e)
    }
}

impl From<GrainError> for DashboardError {
    fn from(e: GrainError) -> Self {
        DashboardError::Grain(e)
    }
}

impl From<AddressParseError> for DashboardError {
    fn from(e: AddressParseError) -> Self {
        DashboardError::InvalidAddress(e)
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self {
        DashboardError::Serialization(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            DashboardError::RouteNotFound { path: "/x".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DashboardError::from(DispatchError::TimedOut(Duration::from_secs(1))).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            DashboardError::from(DispatchError::ContextUnavailable).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            DashboardError::from(GrainError::Unavailable {
                grain: "g".into(),
                reason: "down".into()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DashboardError::from(AddressParseError::EmptyEndpoint).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_asset_status_depends_on_kind() {
        let missing = DashboardError::Asset {
            name: "a.js".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let denied = DashboardError::Asset {
            name: "a.js".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "no"),
        };
        assert!(denied.is_server_error());
    }
}
