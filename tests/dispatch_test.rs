//! Dispatch decisions over a built router: redirects, 405 probing, and
//! the option flags that gate them.

use radix_router::{dispatch, DispatchOutcome, Router, RouterOptions};

fn site_router() -> Router<&'static str> {
    let mut router = Router::new();
    router.register("GET", "/", vec!["home"]).unwrap();
    router.register("GET", "/about", vec!["about"]).unwrap();
    router.register("GET", "/posts/:slug", vec!["post"]).unwrap();
    router.register("GET", "/assets/*path", vec!["asset"]).unwrap();
    router.register("POST", "/posts", vec!["create"]).unwrap();
    router.register("PUT", "/posts/:slug", vec!["update"]).unwrap();
    router
}

#[test]
fn test_matched_carries_params_and_pattern() {
    let router = site_router();
    let opts = RouterOptions::default();

    match dispatch(&router, &opts, "GET", "/posts/hello") {
        DispatchOutcome::Matched {
            handlers,
            params,
            full_path,
        } => {
            assert_eq!(handlers, ["post"]);
            assert_eq!(params.get("slug"), Some("hello"));
            assert_eq!(full_path, "/posts/:slug");
        }
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn test_redirect_adds_and_strips_slash() {
    let router = site_router();
    let opts = RouterOptions::default();

    match dispatch(&router, &opts, "GET", "/about/") {
        DispatchOutcome::Redirect {
            location,
            permanent,
        } => {
            assert_eq!(location, "/about");
            assert!(permanent);
        }
        other => panic!("expected redirect, got {other:?}"),
    }

    // the other direction: registered with, requested without
    let mut router = Router::new();
    router.register("GET", "/docs/", vec!["docs"]).unwrap();
    match dispatch(&router, &opts, "GET", "/docs") {
        DispatchOutcome::Redirect { location, .. } => assert_eq!(location, "/docs/"),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[test]
fn test_non_get_redirect_is_temporary() {
    let router = site_router();
    let opts = RouterOptions::default();

    match dispatch(&router, &opts, "PUT", "/posts/hello/") {
        DispatchOutcome::Redirect { permanent, .. } => assert!(!permanent),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[test]
fn test_fixed_path_recovery_is_opt_in() {
    let router = site_router();

    let opts = RouterOptions::default();
    assert!(matches!(
        dispatch(&router, &opts, "GET", "/About"),
        DispatchOutcome::NotFound
    ));

    let opts = RouterOptions {
        redirect_fixed_path: true,
        ..RouterOptions::default()
    };
    match dispatch(&router, &opts, "GET", "/../About//") {
        DispatchOutcome::Redirect { location, .. } => assert_eq!(location, "/about"),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[test]
fn test_method_not_allowed_lists_alternatives() {
    let router = site_router();
    let opts = RouterOptions {
        handle_method_not_allowed: true,
        ..RouterOptions::default()
    };

    match dispatch(&router, &opts, "DELETE", "/posts/hello") {
        DispatchOutcome::MethodNotAllowed { mut allowed } => {
            allowed.sort_unstable();
            assert_eq!(allowed, ["GET", "PUT"]);
        }
        other => panic!("expected 405, got {other:?}"),
    }

    // no tree matches the path at all
    assert!(matches!(
        dispatch(&router, &opts, "DELETE", "/nowhere"),
        DispatchOutcome::NotFound
    ));
}

#[test]
fn test_connect_and_root_are_exempt_from_redirects() {
    let mut router = Router::new();
    router.register("GET", "/proxy/", vec!["p"]).unwrap();
    let opts = RouterOptions {
        redirect_fixed_path: true,
        ..RouterOptions::default()
    };

    assert!(matches!(
        dispatch(&router, &opts, "CONNECT", "/proxy"),
        DispatchOutcome::NotFound
    ));
    assert!(matches!(
        dispatch(&router, &opts, "GET", "/"),
        DispatchOutcome::NotFound
    ));
}

#[test]
fn test_catch_all_root_request() {
    let router = site_router();
    let opts = RouterOptions::default();

    match dispatch(&router, &opts, "GET", "/assets/js/app.js") {
        DispatchOutcome::Matched { params, .. } => {
            assert_eq!(params.get("path"), Some("/js/app.js"));
        }
        other => panic!("expected match, got {other:?}"),
    }
}
