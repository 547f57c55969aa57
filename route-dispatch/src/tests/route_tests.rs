//! Route entity tests - accessors, mutators and the argument lifecycle

use proptest::prelude::*;

use crate::{
    Arguments, OutputCapture, ROUTE_ATTRIBUTE, Request, Response, Route, RouteErrorCode,
    RouteGroup, RouteId, RouteSettings, handler,
};
use std::sync::Arc;

fn echo_arguments_route() -> Route {
    Route::new(
        ["GET"],
        "/users/{id}",
        handler(|_req, _res, args: &Arguments| {
            let rendered: Vec<String> = args.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            Ok(rendered.join("&"))
        }),
        Vec::new(),
    )
    .unwrap()
}

fn arb_mode() -> impl Strategy<Value = OutputCapture> {
    prop_oneof![
        Just(OutputCapture::Disabled),
        Just(OutputCapture::Prepend),
        Just(OutputCapture::Append),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every valid mode is accepted and reflected by the getter.
    #[test]
    fn prop_valid_output_capture_is_applied(mode in arb_mode()) {
        let mut route = echo_arguments_route();
        route.set_output_capture(mode).unwrap();
        prop_assert_eq!(route.output_capture(), mode);

        let mut by_name = echo_arguments_route();
        by_name.set_output_capture(mode.as_str()).unwrap();
        prop_assert_eq!(by_name.output_capture(), mode);
    }

    /// Unknown modes fail with InvalidConfiguration and keep the prior mode.
    #[test]
    fn prop_unknown_output_capture_is_rejected(
        prior in arb_mode(),
        mode in "[a-zA-Z]{0,12}".prop_filter("must not be a known mode", |m| {
            !matches!(m.as_str(), "append" | "prepend" | "disabled" | "false")
        }),
    ) {
        let mut route = echo_arguments_route();
        route.set_output_capture(prior).unwrap();

        let err = route.set_output_capture(mode.as_str()).unwrap_err();
        prop_assert_eq!(err.code, RouteErrorCode::InvalidConfiguration);
        prop_assert_eq!(route.output_capture(), prior);
    }

    /// A set argument is returned regardless of the default.
    #[test]
    fn prop_set_argument_wins_over_default(
        key in "[a-z_]{1,10}",
        value in ".*",
        default in ".*",
    ) {
        let mut route = echo_arguments_route();
        route.set_argument(key.clone(), value.clone());
        prop_assert_eq!(route.argument(&key, &default), value.as_str());
    }

    /// An unset key yields exactly the default.
    #[test]
    fn prop_unset_argument_returns_default(key in "[a-z_]{1,10}", default in ".*") {
        let route = echo_arguments_route();
        prop_assert_eq!(route.argument(&key, &default), default.as_str());
    }
}

#[test]
fn test_default_output_capture_is_append() {
    assert_eq!(echo_arguments_route().output_capture(), OutputCapture::Append);
}

#[test]
fn test_output_capture_accepts_false_and_rejects_true() {
    let mut route = echo_arguments_route();
    route.set_output_capture(false).unwrap();
    assert_eq!(route.output_capture(), OutputCapture::Disabled);

    let err = route.set_output_capture(true).unwrap_err();
    assert_eq!(err.code, RouteErrorCode::InvalidConfiguration);
    assert_eq!(route.output_capture(), OutputCapture::Disabled);
}

#[test]
fn test_empty_methods_rejected() {
    let err = Route::new(
        Vec::<String>::new(),
        "/",
        handler(|_req, _res, _args: &Arguments| Ok(())),
        Vec::new(),
    )
    .unwrap_err();
    assert_eq!(err.code, RouteErrorCode::InvalidArgument);
}

#[test]
fn test_methods_are_deduplicated_in_order() {
    let route = Route::new(
        ["GET", "POST", "GET"],
        "/",
        handler(|_req, _res, _args: &Arguments| Ok(())),
        Vec::new(),
    )
    .unwrap();
    assert_eq!(route.methods().to_vec(), vec!["GET".to_string(), "POST".to_string()]);
    assert!(route.allows_method("post"));
    assert!(!route.allows_method("DELETE"));
}

#[test]
fn test_set_name() {
    let mut route = echo_arguments_route();
    assert_eq!(route.name(), None);

    route.set_name("users.show").unwrap();
    assert_eq!(route.name(), Some("users.show"));

    for blank in ["", "   ", "\t\n"] {
        let err = route.set_name(blank).unwrap_err();
        assert_eq!(err.code, RouteErrorCode::InvalidArgument);
        assert_eq!(route.name(), Some("users.show"));
    }
}

#[test]
fn test_accessors() {
    let group = Arc::new(RouteGroup::new("/api"));
    let mut route = Route::new(
        ["GET"],
        "/api/users",
        "users.index",
        vec![group.clone()],
    )
    .unwrap();
    route.set_pattern("/api/people");

    assert_eq!(route.pattern(), "/api/people");
    assert_eq!(route.callable().name(), Some("users.index"));
    assert_eq!(route.groups().len(), 1);
    assert!(Arc::ptr_eq(&route.groups()[0], &group));
    assert!(route.middleware().is_empty());
    assert!(route.container().is_none());
    assert!(!route.is_finalized());
}

#[test]
fn test_identifiers_are_unique_and_parse() {
    let a = echo_arguments_route().identifier();
    let b = echo_arguments_route().identifier();
    assert_ne!(a, b);

    let text = a.to_string();
    assert!(text.starts_with("route_"));
    assert_eq!(RouteId::parse(&text).unwrap(), a);
    assert_eq!(RouteId::parse(&a.as_uuid().to_string()).unwrap(), a);
    assert_eq!(text.parse::<RouteId>().unwrap(), a);

    let err = RouteId::parse("route_nope").unwrap_err();
    assert_eq!(err.code, RouteErrorCode::InvalidArgument);
    assert!(err.cause.is_some());
}

#[test]
fn test_set_arguments_replaces_saved_arguments() {
    let mut route = echo_arguments_route();
    route.set_argument("a", "1");
    route.set_arguments(Arguments::from([("b".to_string(), "2".to_string())]));

    assert_eq!(route.argument("a", "none"), "none");
    assert_eq!(route.argument("b", "none"), "2");
}

#[test]
fn test_apply_settings() {
    let mut route = echo_arguments_route();
    route.apply_settings(&RouteSettings::new().with_output_capture(OutputCapture::Prepend));
    assert_eq!(route.output_capture(), OutputCapture::Prepend);
}

// =============================================================================
// Argument lifecycle
// =============================================================================

#[test]
fn test_prepare_tags_request_with_route() {
    let mut route = echo_arguments_route();
    route.set_name("users.show").unwrap();

    let req = route.prepare(
        Request::new("GET", "/users/7"),
        Arguments::from([("id".to_string(), "7".to_string())]),
    );

    let tag = route.identifier().to_string();
    assert_eq!(req.attribute(ROUTE_ATTRIBUTE).and_then(|v| v.as_str()), Some(tag.as_str()));
    let info = req.route_info().unwrap();
    assert_eq!(info.identifier, route.identifier());
    assert_eq!(info.name.as_deref(), Some("users.show"));
    assert_eq!(info.pattern, "/users/{id}");
    assert_eq!(info.argument("id", "?"), "7");
    assert_eq!(req.route_argument("id"), Some("7"));
}

#[test]
fn test_prepare_overlays_matched_on_saved_arguments() {
    let mut route = echo_arguments_route();
    route.set_argument("format", "html");
    route.set_argument("id", "0");

    let req = route.prepare(
        Request::new("GET", "/users/7"),
        Arguments::from([("id".to_string(), "7".to_string())]),
    );
    let res = route.run(req, Response::new()).unwrap();

    assert_eq!(res.body().contents(), "format=html&id=7");
    // The route keeps its saved arguments.
    assert_eq!(route.argument("id", "?"), "0");
}

#[test]
fn test_repeated_dispatch_does_not_leak_arguments() {
    let route = echo_arguments_route();

    let first = route.prepare(
        Request::new("GET", "/users/1"),
        Arguments::from([("id".to_string(), "1".to_string())]),
    );
    let res = route.run(first, Response::new()).unwrap();
    assert_eq!(res.body().contents(), "id=1");

    let second = route.prepare(Request::new("GET", "/users"), Arguments::new());
    let res = route.run(second, Response::new()).unwrap();
    assert_eq!(res.body().contents(), "");
}

#[test]
fn test_unprepared_request_uses_saved_arguments() {
    let mut route = echo_arguments_route();
    route.set_argument("id", "42");

    let res = route.run(Request::new("GET", "/users/42"), Response::new()).unwrap();
    assert_eq!(res.body().contents(), "id=42");
}

#[test]
fn test_with_route_argument_requires_prepared_request() {
    let err = Request::new("GET", "/")
        .with_route_argument("id", "1")
        .unwrap_err();
    assert_eq!(err.code, RouteErrorCode::InvalidArgument);
}
