//! Response type and variant negotiation.

use axum::http::{Method, StatusCode};
use resource_router::dispatch::{DispatchError, Variant};
use resource_router::media::{sort_by_concreteness, ClientPreferences, MediaType, PreferenceList};
use resource_router::negotiation::{
    best_variant, negotiate_response_type, FallbackQualities, StaticSerializers, VariantNegotiator,
};
use resource_router::routing::MethodRoute;

mod common;
use common::*;

fn accept(header: &str) -> PreferenceList<MediaType> {
    PreferenceList::parse_header(header)
}

#[test]
fn test_higher_quality_type_wins() {
    let produces = [mt("text/html"), mt("application/json")];
    let chosen = negotiate_response_type(
        &produces,
        "page",
        &accept("text/html;q=0.8, application/json;q=0.9"),
        &StaticSerializers::new(),
    )
    .unwrap();
    assert_eq!(chosen, mt("application/json"));
}

#[test]
fn test_specificity_order() {
    let concrete = mt("text/plain");
    let partial = mt("text/*");
    let any = MediaType::all();
    assert!(concrete.specificity() > partial.specificity());
    assert!(partial.specificity() > any.specificity());

    let mut types = vec![any.clone(), mt("image/*"), concrete.clone(), partial.clone(), mt("image/png")];
    sort_by_concreteness(&mut types);
    assert_eq!(types, vec![mt("image/png"), concrete, mt("image/*"), partial, any]);
}

#[test]
fn test_dispatch_negotiates_from_serializers() {
    let things = resource("things", vec![method("", "list", Method::GET)]);
    let dispatcher = dispatcher(vec![root("/things", &things)], TestFactory::new());

    let plain = dispatcher
        .dispatch(&accepting(Method::GET, "/things", "text/plain"), b"")
        .unwrap();
    assert_eq!(plain.media_type, Some(mt("text/plain")));
    assert_eq!(plain.body_text(), "things:list");

    let default = dispatcher.dispatch(&request(Method::GET, "/things"), b"").unwrap();
    assert_eq!(default.media_type, Some(mt("application/json")));
}

#[test]
fn test_dispatch_not_acceptable_after_invocation() {
    let things = resource("things", vec![method("", "list", Method::GET)]);
    let dispatcher = dispatcher(vec![root("/things", &things)], TestFactory::new());

    let err = dispatcher
        .dispatch(&accepting(Method::GET, "/things", "image/png"), b"")
        .unwrap_err();
    assert!(matches!(err, DispatchError::Negotiation(_)));
    assert_eq!(err.status(), StatusCode::NOT_ACCEPTABLE);
}

#[test]
fn test_declared_produces_override_serializers() {
    let things = resource(
        "things",
        vec![method_route("", MethodRoute::new("list", Method::GET).produces([mt("text/csv")]))],
    );
    let dispatcher = dispatcher(vec![root("/things", &things)], TestFactory::new());

    let response = dispatcher
        .dispatch(&accepting(Method::GET, "/things", "text/*"), b"")
        .unwrap();
    assert_eq!(response.media_type, Some(mt("text/csv")));
}

#[test]
fn test_head_drops_body_and_options_lists_verbs() {
    let things = resource(
        "things",
        vec![method("", "list", Method::GET), method("", "create", Method::POST)],
    );
    let dispatcher = dispatcher(vec![root("/things", &things)], TestFactory::new());

    let head = dispatcher.dispatch(&request(Method::HEAD, "/things"), b"").unwrap();
    assert_eq!(head.status, StatusCode::OK);
    assert!(head.body.is_empty());
    assert!(head.media_type.is_some());

    let options = dispatcher.dispatch(&request(Method::OPTIONS, "/things"), b"").unwrap();
    assert_eq!(options.status, StatusCode::NO_CONTENT);
    assert_eq!(options.allow, vec![Method::GET, Method::POST]);
}

fn variants() -> Vec<Variant> {
    vec![
        Variant::new(Some(mt("text/html")), "english").with_language("en".parse().unwrap()),
        Variant::new(Some(mt("text/html")), "american").with_language("en-us".parse().unwrap()),
        Variant::new(Some(mt("text/html")), "german").with_language("de".parse().unwrap()),
    ]
}

fn body(variant: Option<&Variant>) -> String {
    variant.map(|v| String::from_utf8_lossy(&v.body).into_owned()).unwrap_or_default()
}

#[test]
fn test_variant_exact_language_match() {
    let client = ClientPreferences::from_headers(None, Some("de, en;q=0.5"), None);
    assert_eq!(body(best_variant(&variants(), &client)), "german");
}

#[test]
fn test_variant_sub_tagged_preference_falls_back_to_primary() {
    let offered = vec![
        Variant::new(Some(mt("text/html")), "english").with_language("en".parse().unwrap()),
        Variant::new(Some(mt("text/html")), "german").with_language("de".parse().unwrap()),
    ];
    let client = ClientPreferences::from_headers(None, Some("en-GB"), None);
    assert_eq!(body(best_variant(&offered, &client)), "english");
}

#[test]
fn test_variant_default_language_breaks_ties() {
    let negotiator = VariantNegotiator::new(Some("de".parse().unwrap()), FallbackQualities::default());
    let client = ClientPreferences::from_headers(None, Some("fr"), None);
    assert_eq!(body(negotiator.best(&variants(), &client)), "german");
}

#[test]
fn test_variant_media_type_mismatch_excludes() {
    let offered = vec![Variant::new(Some(mt("text/html")), "page")];
    let client = ClientPreferences::from_headers(Some("application/json"), None, None);
    assert!(best_variant(&offered, &client).is_none());
}
