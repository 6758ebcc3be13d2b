//! HTTP path routing on a compressed radix tree.
//!
//! Routes like `/user/:name` and `/static/*filepath` are registered per
//! HTTP method, then matched in a single allocation-light tree walk that
//! captures path parameters. Near misses are recoverable: trailing-slash
//! detection, lexical path cleaning, and case-insensitive path repair
//! feed redirect decisions.
//!
//! Trees are built up front and then shared read-only, so a frozen
//! [`Router`] can serve lookups from many threads without locking.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod path;
pub mod router;
pub mod tree;

pub use config::RouterOptions;
pub use dispatch::{dispatch, DispatchOutcome};
pub use error::{ConflictKind, RouteError};
pub use path::clean_path;
pub use router::Router;
pub use tree::{Lookup, Param, Params, Tree};
