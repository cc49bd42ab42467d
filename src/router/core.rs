//! Router core module - path pattern parsing and first-match-wins lookup.
//!
//! Patterns are parsed once at registration into a [`RoutePattern`], then
//! every request path is tokenized the same way and compared segment by
//! segment against each [`RouteEntry`] in registration order.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Leading character that turns a pattern segment into a named placeholder.
pub const PARAM_SENTINEL: char = ':';

/// Maximum number of path parameters before heap allocation.
///
/// The dashboard routes carry at most one parameter; eight leaves room for
/// embedders registering their own routes.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage produced by a successful match.
///
/// Names are shared with the pattern (`Arc<str>`), values are the raw path
/// segments, verbatim and unescaped.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Look up a captured parameter by name.
#[inline]
#[must_use]
pub fn param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

/// Error raised while registering a route pattern.
///
/// Registration happens at startup, so callers treat this as fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The pattern could not be turned into a [`RoutePattern`].
    InvalidPattern {
        /// The offending pattern as registered
        pattern: String,
        /// What is wrong with it
        reason: InvalidPatternReason,
    },
}

/// Why a pattern was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidPatternReason {
    /// The same placeholder name appears twice
    DuplicateParameter(String),
    /// A placeholder consists of the sentinel alone (`/a/:`)
    EmptyParameterName,
    /// Two separators with nothing between them (`/a//b`)
    EmptySegment,
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPattern { pattern, reason } => match reason {
                InvalidPatternReason::DuplicateParameter(name) => write!(
                    f,
                    "invalid route pattern '{pattern}': parameter '{name}' appears more than once"
                ),
                InvalidPatternReason::EmptyParameterName => write!(
                    f,
                    "invalid route pattern '{pattern}': parameter placeholder without a name"
                ),
                InvalidPatternReason::EmptySegment => {
                    write!(f, "invalid route pattern '{pattern}': empty path segment")
                }
            },
        }
    }
}

impl std::error::Error for RouteError {}

/// One segment of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly (case-sensitive)
    Literal(String),
    /// Matches any non-empty request segment and binds it under this name
    Param(Arc<str>),
}

/// Split a path into segments.
///
/// Leading and trailing separators are ignored, so `/`, `""` and `//`
/// all tokenize to zero segments. Inner empty segments are preserved so
/// that `/a//b` never matches `/a/:x/b`.
fn tokenize(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.trim_matches('/');
    let mut split = trimmed.split('/');
    if trimmed.is_empty() {
        // Consume the single empty token so the iterator yields nothing.
        split.next();
    }
    split
}

/// Ordered sequence of segments parsed from a registered pattern.
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern such as `/RuntimeStats/:address`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if a parameter name repeats,
    /// a placeholder has no name, or the pattern contains an empty segment.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        for token in tokenize(pattern) {
            if token.is_empty() {
                return Err(invalid(InvalidPatternReason::EmptySegment));
            }
            match token.strip_prefix(PARAM_SENTINEL) {
                Some("") => return Err(invalid(InvalidPatternReason::EmptyParameterName)),
                Some(name) => {
                    let duplicate = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Param(n) if n.as_ref() == name));
                    if duplicate {
                        return Err(invalid(InvalidPatternReason::DuplicateParameter(
                            name.to_string(),
                        )));
                    }
                    segments.push(Segment::Param(Arc::from(name)));
                }
                None => segments.push(Segment::Literal(token.to_string())),
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern string exactly as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_ref()),
            Segment::Literal(_) => None,
        })
    }

    /// Structurally compare a request path against this pattern.
    ///
    /// Returns the captured parameters on success. Pure; no side effects.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<ParamVec> {
        let mut params = ParamVec::new();
        let mut tokens = tokenize(path);

        for segment in &self.segments {
            let token = tokens.next()?;
            match segment {
                Segment::Literal(lit) => {
                    if lit != token {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if token.is_empty() {
                        return None;
                    }
                    params.push((Arc::clone(name), token.to_string()));
                }
            }
        }

        // Segment counts must be equal.
        if tokens.next().is_some() {
            return None;
        }
        Some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A registered pattern paired with its handler.
#[derive(Debug, Clone)]
pub struct RouteEntry<H> {
    pub pattern: RoutePattern,
    pub handler: H,
}

/// Successful lookup: the matched entry's handler and captured parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a, H> {
    pub pattern: &'a RoutePattern,
    pub handler: &'a H,
    pub params: ParamVec,
}

impl<H> RouteMatch<'_, H> {
    /// Get a captured path parameter by name
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        param(&self.params, name)
    }
}

/// Registry of routes, consulted in registration order.
///
/// Built once at startup and read-only afterwards, so it can be shared
/// between request coroutines without locking.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    entries: Vec<RouteEntry<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouteTable<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse `pattern` and append it with `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if the pattern is malformed.
    /// The table is left unchanged in that case.
    pub fn register(&mut self, pattern: &str, handler: H) -> Result<(), RouteError> {
        let pattern = RoutePattern::parse(pattern)?;
        info!(
            route = %pattern,
            params = ?pattern.param_names().collect::<Vec<_>>(),
            position = self.entries.len(),
            "Route registered"
        );
        self.entries.push(RouteEntry { pattern, handler });
        Ok(())
    }

    /// Find the first registered entry that structurally matches `path`.
    ///
    /// First match wins; there is no best-match ranking. Returns `None`
    /// when nothing matches (the caller reports "not found").
    #[must_use]
    pub fn route(&self, path: &str) -> Option<RouteMatch<'_, H>> {
        let found = self.entries.iter().find_map(|entry| {
            entry.pattern.matches(path).map(|params| RouteMatch {
                pattern: &entry.pattern,
                handler: &entry.handler,
                params,
            })
        });

        match &found {
            Some(m) => debug!(
                path = %path,
                route = %m.pattern,
                params = ?m.params,
                "Route matched"
            ),
            None => debug!(path = %path, "No route matched"),
        }
        found
    }

    /// Registered entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[RouteEntry<H>] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
