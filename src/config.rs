//! Router configuration schema.
//!
//! All types derive Serde traits so dispatchers can load them from their
//! config files; defaults match the conventional framework behavior.

use serde::{Deserialize, Serialize};

/// Dispatch-time policy toggles.
///
/// These are explicit configuration handed to the dispatcher; the router
/// core itself reads no global state.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Redirect to the path with (or without) a trailing slash when only
    /// that separates the request from a registered route.
    pub redirect_trailing_slash: bool,

    /// When no route matches, lexically clean the path and retry with a
    /// case-insensitive walk, redirecting to the corrected path on success.
    pub redirect_fixed_path: bool,

    /// Answer with the set of allowed methods when another method's tree
    /// matches the path.
    pub handle_method_not_allowed: bool,

    /// Percent-decode extracted parameter values.
    pub unescape_path_values: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            redirect_trailing_slash: true,
            redirect_fixed_path: false,
            handle_method_not_allowed: false,
            unescape_path_values: true,
        }
    }
}
