//! Registration error types.
//!
//! # Responsibilities
//! - Classify build-time route conflicts with a structured kind tag
//! - Keep request-time lookups error-free (no match is a value, not an error)
//!
//! # Design Decisions
//! - Conflicts are returned as values, never panics, so startup code and
//!   tests can branch on the kind
//! - Request-time conditions (no match, bad percent escapes) never surface
//!   here; lookups are pure and infallible

use std::fmt;

use thiserror::Error;

/// The class of a route registration conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The identical literal pattern was registered twice.
    Duplicate,

    /// Two wildcards with different names at the same tree position,
    /// including a longer name extending a shorter one (`:name` vs `:names`).
    AmbiguousWildcard,

    /// A wildcard and static segments collide at the same branch point.
    WildcardStatic,

    /// More than one wildcard marker within a single path segment.
    MalformedWildcard,

    /// A `:` or `*` marker with no name after it.
    EmptyWildcardName,

    /// A catch-all that is not the final segment or is not preceded by `/`.
    MisplacedCatchAll,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConflictKind::Duplicate => "duplicate route",
            ConflictKind::AmbiguousWildcard => "ambiguous wildcard",
            ConflictKind::WildcardStatic => "wildcard/static conflict",
            ConflictKind::MalformedWildcard => "malformed wildcard",
            ConflictKind::EmptyWildcardName => "empty wildcard name",
            ConflictKind::MisplacedCatchAll => "misplaced catch-all",
        };
        f.write_str(s)
    }
}

/// Errors raised while registering routes.
///
/// All of these are fatal build-time errors: they are meant to abort
/// application startup, never to reach a live request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    /// Route patterns must be absolute.
    #[error("route pattern {pattern:?} must begin with '/'")]
    PatternNotAbsolute { pattern: String },

    /// A route needs at least one handler to be dispatchable.
    #[error("route {pattern:?} registered with an empty handler chain")]
    EmptyHandlerChain { pattern: String },

    /// The HTTP method string was empty.
    #[error("HTTP method must be non-empty")]
    EmptyMethod,

    /// The pattern collides with the existing tree.
    #[error("cannot register route {pattern:?}: {kind} (near {detail:?})")]
    Conflict {
        /// What class of conflict was detected.
        kind: ConflictKind,
        /// The pattern being registered.
        pattern: String,
        /// The existing route or offending segment.
        detail: String,
    },
}

impl RouteError {
    pub(crate) fn conflict(kind: ConflictKind, pattern: &str, detail: &str) -> Self {
        RouteError::Conflict {
            kind,
            pattern: pattern.to_string(),
            detail: detail.to_string(),
        }
    }

    /// The conflict kind, if this error is a tree conflict.
    pub fn kind(&self) -> Option<ConflictKind> {
        match self {
            RouteError::Conflict { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
