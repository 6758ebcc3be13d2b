//! Method tree table and registration interface.
//!
//! # Responsibilities
//! - Own one independent radix tree per HTTP method
//! - Register routes during the setup phase
//! - Answer lookups and corrected-path suggestions per method
//!
//! # Design Decisions
//! - Immutable after registration (thread-safe without locks); dynamic
//!   reconfiguration means building a fresh router and swapping it
//! - Methods are plain strings in a small ordered table; typical method
//!   sets are tiny and a linear scan beats hashing
//! - "No tree for this method" is an empty lookup, not an error

use crate::error::RouteError;
use crate::tree::{Lookup, Tree};

/// A path router holding one radix tree per HTTP method.
///
/// `T` is the handler reference type; the router stores and returns handler
/// chains without ever invoking them.
///
/// Registration requires `&mut self` and must complete before serving
/// begins; lookups take `&self` and are safe for unbounded concurrent
/// readers once the router is frozen.
#[derive(Debug, Clone)]
pub struct Router<T> {
    trees: Vec<(String, Tree<T>)>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Router::new()
    }
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Router { trees: Vec::new() }
    }

    /// Registers `pattern` for `method` with the given handler chain.
    ///
    /// Errors are fatal build-time conflicts; they are meant to abort
    /// startup, never to be retried.
    pub fn register(
        &mut self,
        method: &str,
        pattern: &str,
        handlers: Vec<T>,
    ) -> Result<(), RouteError> {
        if method.is_empty() {
            return Err(RouteError::EmptyMethod);
        }

        let idx = match self.trees.iter().position(|(m, _)| m == method) {
            Some(idx) => idx,
            None => {
                self.trees.push((method.to_string(), Tree::new()));
                self.trees.len() - 1
            }
        };

        let handler_count = handlers.len();
        self.trees[idx].1.add_route(pattern, handlers)?;
        tracing::debug!(method, path = pattern, handlers = handler_count, "route registered");
        Ok(())
    }

    /// Looks up the route registered under `method` for `path`.
    ///
    /// An unknown method yields an empty lookup. The path is matched as
    /// received; callers decide whether to normalize first.
    pub fn lookup(&self, method: &str, path: &str, unescape: bool) -> Lookup<'_, T> {
        match self.tree(method) {
            Some(tree) => tree.get_value(path, unescape),
            None => Lookup::not_found(false),
        }
    }

    /// Suggests a case-corrected path for a failed lookup, or `None`.
    pub fn suggest_corrected_path(
        &self,
        method: &str,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        self.tree(method)?
            .find_case_insensitive_path(path, fix_trailing_slash)
    }

    /// Methods other than `exclude` whose trees match `path` exactly.
    /// Backs Allow-header computation for 405 responses.
    pub fn allowed_methods(&self, path: &str, exclude: &str) -> Vec<&str> {
        self.trees
            .iter()
            .filter(|(m, _)| m != exclude)
            .filter(|(_, tree)| tree.get_value(path, false).is_match())
            .map(|(m, _)| m.as_str())
            .collect()
    }

    /// All registered `(method, pattern)` pairs, for diagnostics.
    pub fn routes(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for (method, tree) in &self.trees {
            for pattern in tree.registered_patterns() {
                out.push((method.as_str(), pattern));
            }
        }
        out
    }

    /// The tree owned by `method`, if any route was registered for it.
    pub fn tree(&self, method: &str) -> Option<&Tree<T>> {
        self.trees
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, tree)| tree)
    }
}
