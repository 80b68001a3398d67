//! Integration tests for the composed Nominatim wrapper.
//!
//! A mock upstream is started on a loopback port and the composed
//! application is driven over real HTTP through it.

use std::net::SocketAddr;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use nominatim_wrapper::api::{self, compose, BaseApplication, RouteTable};
use nominatim_wrapper::config::Config;
use nominatim_wrapper::error::RouteError;
use nominatim_wrapper::metrics;

/// Echo everything the upstream saw back as JSON.
async fn echo(request: Request) -> impl IntoResponse {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (
        StatusCode::OK,
        [("x-upstream", "mock")],
        Json(json!({
            "method": parts.method.as_str(),
            "path": parts.uri.path(),
            "query": parts.uri.query(),
            "accept_language": parts
                .headers
                .get("accept-language")
                .and_then(|v| v.to_str().ok()),
            "body": String::from_utf8_lossy(&body),
        })),
    )
}

/// Spawn `router` on an ephemeral loopback port.
async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

async fn mock_upstream() -> SocketAddr {
    let router = Router::new()
        .route(
            "/status",
            get(|| async { Json(json!({ "status": 0, "message": "OK" })) }),
        )
        .route(
            "/details",
            get(|| async { (StatusCode::NOT_FOUND, "No place with that OSM ID found.") }),
        )
        .fallback(any(echo));
    spawn(router).await
}

async fn wrapper_for(upstream: SocketAddr) -> SocketAddr {
    let config = Config {
        upstream_url: format!("http://{}", upstream),
        http_timeout_ms: 2_000,
        ..Config::default()
    };
    let app = api::build(&config).unwrap();
    spawn(app.into_router()).await
}

#[tokio::test]
async fn health_answers_without_touching_upstream() {
    // Nothing listens on the upstream port: /health must still answer.
    let config = Config {
        upstream_url: "http://127.0.0.1:9".to_string(),
        ..Config::default()
    };
    let addr = spawn(api::build(&config).unwrap().into_router()).await;

    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    assert_eq!(
        response.text().await.unwrap(),
        r#"{"status":"online","service":"nominatim"}"#
    );
}

#[tokio::test]
async fn health_ignores_query_string() {
    let addr = wrapper_for(mock_upstream().await).await;

    let response = reqwest::get(format!("http://{}/health?foo=bar", addr))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.text().await.unwrap(),
        r#"{"status":"online","service":"nominatim"}"#
    );
}

#[tokio::test]
async fn post_to_health_is_method_not_allowed() {
    let addr = wrapper_for(mock_upstream().await).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/health", addr))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn search_is_forwarded_with_query_and_headers() {
    let addr = wrapper_for(mock_upstream().await).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/search?q=berlin&format=jsonv2", addr))
        .header("accept-language", "de")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-upstream"].to_str().unwrap(), "mock");

    let echoed: Value = response.json().await.unwrap();
    assert_eq!(
        echoed,
        json!({
            "method": "GET",
            "path": "/search",
            "query": "q=berlin&format=jsonv2",
            "accept_language": "de",
            "body": "",
        })
    );
}

#[tokio::test]
async fn request_body_is_forwarded() {
    let addr = wrapper_for(mock_upstream().await).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/lookup", addr))
        .body("osm_ids=R146656")
        .send()
        .await
        .unwrap();

    let echoed: Value = response.json().await.unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/lookup");
    assert_eq!(echoed["body"], "osm_ids=R146656");
}

#[tokio::test]
async fn upstream_status_codes_are_relayed() {
    let addr = wrapper_for(mock_upstream().await).await;

    let response = reqwest::get(format!("http://{}/details?osmtype=N&osmid=0", addr))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.text().await.unwrap(),
        "No place with that OSM ID found."
    );
}

#[tokio::test]
async fn unknown_paths_are_not_forwarded() {
    let addr = wrapper_for(mock_upstream().await).await;

    let response = reqwest::get(format!("http://{}/admin/secret", addr))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_client_reads_upstream() {
    let upstream = mock_upstream().await;
    let config = Config {
        upstream_url: format!("http://{}", upstream),
        ..Config::default()
    };
    let client = nominatim_wrapper::nominatim::NominatimClient::new(&config).unwrap();

    let status = client.status().await.unwrap();

    assert!(status.is_ok());
    assert_eq!(status.message, "OK");
}

#[tokio::test]
async fn foreign_base_application_keeps_its_routes() {
    let mut base = RouteTable::new();
    base.register_route("/tiles", get(|| async { "tile" }))
        .unwrap();

    let app = compose(base).unwrap();
    let addr = spawn(app.into_router()).await;

    let tiles = reqwest::get(format!("http://{}/tiles", addr)).await.unwrap();
    assert_eq!(tiles.text().await.unwrap(), "tile");

    let health = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn upstream_redirect_is_relayed_relative_to_wrapper() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = listener.local_addr().unwrap();
    let location = format!("http://{}/search?q=moved", upstream);
    let router = Router::new().route(
        "/polygons",
        get(move || {
            let location = location.clone();
            async move { (StatusCode::FOUND, [("location", location)]) }
        }),
    );
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    let addr = wrapper_for(upstream).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let response = client
        .get(format!("http://{}/polygons", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()["location"].to_str().unwrap(),
        "/search?q=moved"
    );
}

// The only test in this binary that installs the global recorder.
#[tokio::test]
async fn metrics_route_counts_forwarded_requests() {
    let handle = metrics::init_metrics().unwrap();
    let upstream = mock_upstream().await;
    let config = Config {
        upstream_url: format!("http://{}", upstream),
        ..Config::default()
    };

    let mut app = api::build(&config).unwrap();
    metrics::register_route(&mut app, handle.clone()).unwrap();
    assert!(matches!(
        metrics::register_route(&mut app, handle),
        Err(RouteError::Duplicate { .. })
    ));
    let addr = spawn(app.into_router()).await;

    let forwarded = reqwest::get(format!("http://{}/reverse?lat=52.5&lon=13.4", addr))
        .await
        .unwrap();
    assert_eq!(forwarded.status(), StatusCode::OK);

    let response = reqwest::get(format!("http://{}{}", addr, metrics::METRICS_PATH))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let text = response.text().await.unwrap();
    assert!(text.contains(metrics::METRIC_UPSTREAM_REQUESTS), "{}", text);
    assert!(text.contains(r#"endpoint="/reverse""#), "{}", text);
}

#[test]
fn health_registered_twice_is_rejected() {
    let app = api::build(&Config::default()).unwrap();

    assert!(matches!(compose(app), Err(RouteError::Duplicate { .. })));
}
