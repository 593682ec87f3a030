//! The HTTP adapter end to end, driven through the axum router.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use tokio::sync::mpsc;
use tower::ServiceExt;

use resource_router::config::parse_config;
use resource_router::http::HttpServer;
use resource_router::lifecycle::Shutdown;

mod common;

fn server() -> HttpServer {
    HttpServer::new(parse_config(common::SHOP_CONFIG).unwrap()).unwrap()
}

async fn send(request: Request<Body>) -> Response {
    server().router().oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_get_negotiates_from_serializers() {
    let response = send(Request::get("/shop/items/7").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_text(response).await, "item 7");

    let response = send(
        Request::get("/shop/items/7")
            .header(header::ACCEPT, "text/plain")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
}

#[tokio::test]
async fn test_options_and_method_not_allowed() {
    let options = send(Request::options("/shop").body(Body::empty()).unwrap()).await;
    assert_eq!(options.status(), StatusCode::NO_CONTENT);
    assert_eq!(options.headers()[header::ALLOW], "GET, POST");

    let rejected = send(Request::post("/shop/items/7").body(Body::empty()).unwrap()).await;
    assert_eq!(rejected.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(rejected.headers()[header::ALLOW], "DELETE, GET");
}

#[tokio::test]
async fn test_entity_type_checked_against_consumes() {
    let xml = send(
        Request::post("/shop")
            .header(header::CONTENT_TYPE, "application/xml")
            .body(Body::from("<order/>"))
            .unwrap(),
    )
    .await;
    assert_eq!(xml.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let json = send(
        Request::post("/shop")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"sku":1}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(json.status(), StatusCode::OK);
    assert_eq!(json.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_text(json).await, r#"{"sku":1}"#);
}

#[tokio::test]
async fn test_not_acceptable_and_not_found() {
    let response = send(
        Request::get("/shop")
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

    let missing = send(Request::get("/nowhere").body(Body::empty()).unwrap()).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_variant_selected_by_language() {
    let response = send(
        Request::get("/shop/items/3/greeting")
            .header(header::ACCEPT_LANGUAGE, "fr, en;q=0.5")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_LANGUAGE], "fr");
    assert_eq!(body_text(response).await, "bonjour 3");
}

#[tokio::test]
async fn test_head_and_no_content() {
    let head = send(Request::head("/shop").body(Body::empty()).unwrap()).await;
    assert_eq!(head.status(), StatusCode::OK);
    assert_eq!(head.headers()[header::CONTENT_TYPE], "text/plain");
    assert!(body_text(head).await.is_empty());

    let deleted = send(Request::delete("/shop/items/3").body(Body::empty()).unwrap()).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_invalid_content_type_rejected() {
    let response = send(
        Request::post("/shop")
            .header(header::CONTENT_TYPE, "not a type")
            .body(Body::from("x"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_live_server_reload_and_shutdown() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (updates_tx, updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server().run(listener, updates, server_shutdown).await });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client.get(format!("http://{addr}/shop")).send().await.expect("server unreachable");
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "welcome");

    let mut next = parse_config(common::SHOP_CONFIG).unwrap();
    next.resources[0].path = Some("/store".to_string());
    updates_tx.send(next).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let res = client.get(format!("http://{addr}/store")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let res = client.get(format!("http://{addr}/shop")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    drop(client);
    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop");
    assert!(result.unwrap().is_ok());
}
