use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::debug;

/// Header a caller may use to supply its own request id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// ULID attached to every log line of one dashboard request.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Id for a request whose `X-Request-Id` header carried `raw`.
    ///
    /// Surrounding whitespace is ignored. A missing header, non UTF-8 bytes
    /// or anything that is not a ULID yields a fresh id.
    #[must_use]
    pub fn from_header_value(raw: Option<&[u8]>) -> Self {
        let Some(raw) = raw else {
            return Self::new();
        };
        match std::str::from_utf8(raw).map(str::trim) {
            Ok(text) => text.parse().unwrap_or_else(|_| {
                debug!(supplied = %text, "Ignoring malformed request id header");
                Self::new()
            }),
            Err(_) => Self::new(),
        }
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(Self)
    }
}
