//! Request dispatch decision.
//!
//! # Data Flow
//! ```text
//! (method, raw path)
//!     → lookup in the method's tree
//!     → on failure: trailing-slash redirect → fixed-path redirect
//!     → on failure: method-not-allowed probe across other trees
//!     → DispatchOutcome
//! ```
//!
//! # Design Decisions
//! - Pure decision function: no network I/O, no handler invocation
//! - Redirects are permanent (301) for GET and temporary (307) otherwise,
//!   so non-GET requests keep their method and body
//! - The raw request path is matched first; lexical cleaning only feeds
//!   the fixed-path recovery

use crate::config::RouterOptions;
use crate::path::clean_path;
use crate::router::Router;
use crate::tree::Params;

/// What the dispatcher should do with a request.
#[derive(Debug)]
pub enum DispatchOutcome<'r, T> {
    /// A route matched: run its handler chain.
    Matched {
        handlers: &'r [T],
        params: Params,
        /// The registered pattern that matched.
        full_path: &'r str,
    },
    /// Redirect to `location` (301 when `permanent`, else 307).
    Redirect { location: String, permanent: bool },
    /// Another method matches this path; answer 405 with an Allow header.
    MethodNotAllowed { allowed: Vec<&'r str> },
    /// Nothing matched.
    NotFound,
}

/// Resolves a request against the router under the given options.
pub fn dispatch<'r, T>(
    router: &'r Router<T>,
    options: &RouterOptions,
    method: &str,
    raw_path: &str,
) -> DispatchOutcome<'r, T> {
    let found = router.lookup(method, raw_path, options.unescape_path_values);
    if let Some(handlers) = found.handlers {
        return DispatchOutcome::Matched {
            handlers,
            params: found.params,
            full_path: found.full_path,
        };
    }

    // CONNECT carries no meaningful path and the root cannot be redirected
    // away from.
    if method != "CONNECT" && raw_path != "/" {
        let permanent = method == "GET";

        if found.tsr && options.redirect_trailing_slash {
            let location = if raw_path.len() > 1 && raw_path.ends_with('/') {
                raw_path[..raw_path.len() - 1].to_string()
            } else {
                format!("{raw_path}/")
            };
            return DispatchOutcome::Redirect {
                location,
                permanent,
            };
        }

        if options.redirect_fixed_path {
            let cleaned = clean_path(raw_path);
            if let Some(fixed) = router.suggest_corrected_path(
                method,
                cleaned.as_ref(),
                options.redirect_trailing_slash,
            ) {
                return DispatchOutcome::Redirect {
                    location: fixed,
                    permanent,
                };
            }
        }
    }

    if options.handle_method_not_allowed {
        let allowed = router.allowed_methods(raw_path, method);
        if !allowed.is_empty() {
            return DispatchOutcome::MethodNotAllowed { allowed };
        }
    }

    DispatchOutcome::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router<&'static str> {
        let mut router = Router::new();
        router.register("GET", "/users", vec!["list"]).unwrap();
        router.register("GET", "/users/:id", vec!["show"]).unwrap();
        router.register("POST", "/users", vec!["create"]).unwrap();
        router
    }

    #[test]
    fn test_match_wins() {
        let r = router();
        let opts = RouterOptions::default();
        match dispatch(&r, &opts, "GET", "/users/7") {
            DispatchOutcome::Matched {
                handlers,
                params,
                full_path,
            } => {
                assert_eq!(handlers, ["show"]);
                assert_eq!(params.get("id"), Some("7"));
                assert_eq!(full_path, "/users/:id");
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_slash_redirect() {
        let r = router();
        let opts = RouterOptions::default();
        match dispatch(&r, &opts, "GET", "/users/") {
            DispatchOutcome::Redirect {
                location,
                permanent,
            } => {
                assert_eq!(location, "/users");
                assert!(permanent);
            }
            other => panic!("expected redirect, got {other:?}"),
        }

        // non-GET methods redirect temporarily so the body survives
        match dispatch(&r, &opts, "POST", "/users/") {
            DispatchOutcome::Redirect { permanent, .. } => assert!(!permanent),
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_slash_redirect_disabled() {
        let r = router();
        let opts = RouterOptions {
            redirect_trailing_slash: false,
            ..RouterOptions::default()
        };
        assert!(matches!(
            dispatch(&r, &opts, "GET", "/users/"),
            DispatchOutcome::NotFound
        ));
    }

    #[test]
    fn test_fixed_path_redirect() {
        let r = router();
        let opts = RouterOptions {
            redirect_fixed_path: true,
            ..RouterOptions::default()
        };
        match dispatch(&r, &opts, "GET", "//USERS") {
            DispatchOutcome::Redirect { location, .. } => assert_eq!(location, "/users"),
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_method_not_allowed() {
        let r = router();
        let opts = RouterOptions {
            handle_method_not_allowed: true,
            ..RouterOptions::default()
        };
        match dispatch(&r, &opts, "DELETE", "/users") {
            DispatchOutcome::MethodNotAllowed { mut allowed } => {
                allowed.sort_unstable();
                assert_eq!(allowed, ["GET", "POST"]);
            }
            other => panic!("expected 405, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found() {
        let r = router();
        let opts = RouterOptions::default();
        assert!(matches!(
            dispatch(&r, &opts, "GET", "/missing"),
            DispatchOutcome::NotFound
        ));
        // the 405 probe is off by default
        assert!(matches!(
            dispatch(&r, &opts, "DELETE", "/users"),
            DispatchOutcome::NotFound
        ));
    }

    #[test]
    fn test_root_is_never_redirected() {
        let r = router();
        let opts = RouterOptions {
            redirect_fixed_path: true,
            ..RouterOptions::default()
        };
        assert!(matches!(
            dispatch(&r, &opts, "GET", "/"),
            DispatchOutcome::NotFound
        ));
    }
}
