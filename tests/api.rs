//! HTTP surface tests driven through the router with `oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modelcat::api::{self, AppState};
use modelcat::config::{Config, ProviderEndpoints};
use modelcat::service::ModelCatalogService;

fn app(server: &MockServer) -> (Router, Arc<AppState>) {
    let config = Config {
        catalog_url: format!("{}/api.json", server.uri()),
        endpoints: ProviderEndpoints::all(&server.uri()),
        fetch_timeout: Duration::from_secs(5),
        max_retries: 0,
        ..Config::default()
    };
    let state = Arc::new(AppState {
        service: ModelCatalogService::new(&config).unwrap(),
    });
    (api::app(state.clone()), state)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api.json"))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"abc\"").set_body_json(json!({
            "openai": {"models": {
                "gpt-4o": {"id": "gpt-4o", "name": "GPT-4o", "cost": {"input": 2.5, "output": 10.0}},
                "gpt-4o-mini": {"id": "gpt-4o-mini", "name": "GPT-4o mini", "cost": {"input": 0.15, "output": 0.6}}
            }}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_healthz_and_response_headers() {
    let server = MockServer::start().await;
    let (app, _) = app(&server);

    let resp = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    assert_eq!(resp.headers()["cache-control"], "no-store");
}

#[tokio::test]
async fn test_resolve_catalog_tier_over_http() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let (app, _) = app(&server);

    let (status, _, body) = send(app, post("/api/v1/models/resolve", json!({"provider": "openai"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "models.dev");
    assert!(body.get("error").is_none());

    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0]["id"], "gpt-4o");
    assert_eq!(models[0]["displayName"], "GPT-4o");
    assert_eq!(models[0]["pricing"]["inputPerMillionTokens"], 2.5);
}

#[tokio::test]
async fn test_resolve_degraded_is_still_200() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let (app, _) = app(&server);

    let (status, _, body) = send(
        app,
        post("/api/v1/models/resolve", json!({"provider": "anthropic", "credential": "bad"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "static");
    assert!(body["error"].as_str().unwrap().contains("401"));
}

#[tokio::test]
async fn test_resolve_unknown_provider_reports_failure() {
    let server = MockServer::start().await;
    let (app, _) = app(&server);

    let (status, _, body) = send(app, post("/api/v1/models/resolve", json!({"provider": "acme"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["models"], json!([]));
}

#[tokio::test]
async fn test_sanitize_endpoint() {
    let server = MockServer::start().await;
    let (app, _) = app(&server);

    let (status, _, body) = send(
        app.clone(),
        post(
            "/api/v1/models/sanitize",
            json!({"chosenId": "bogus-id", "provider": "gemini", "category": "solutionModel"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"modelId": "gemini-2.5-pro", "replaced": true}));

    let (_, _, body) = send(
        app,
        post(
            "/api/v1/models/sanitize",
            json!({
                "chosenId": "gpt-5",
                "provider": "openai",
                "category": "debuggingModel",
                "dynamicAllowList": ["gpt-5"]
            }),
        ),
    )
    .await;
    assert_eq!(body, json!({"modelId": "gpt-5", "replaced": false}));
}

#[tokio::test]
async fn test_sanitize_rejects_unknown_category() {
    let server = MockServer::start().await;
    let (app, _) = app(&server);

    let (status, _, body) = send(
        app,
        post(
            "/api/v1/models/sanitize",
            json!({"chosenId": "gpt-4o", "provider": "openai", "category": "chatModel"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_invalidate_drops_cached_results() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "gpt-4o"}]})))
        .expect(2)
        .mount(&server)
        .await;
    let (app, state) = app(&server);

    let resolve = || post("/api/v1/models/resolve", json!({"provider": "openai", "credential": "sk"}));
    let (_, _, body) = send(app.clone(), resolve()).await;
    assert_eq!(body["source"], "api");
    assert_eq!(state.service.cache().len(), 1);

    let (status, _, body) = send(app.clone(), post("/api/v1/models/invalidate", json!({"provider": "openai"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    // Next resolve goes back to the provider.
    send(app, resolve()).await;
}

#[tokio::test]
async fn test_catalog_status() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let (app, state) = app(&server);

    let (_, _, before) = send(app.clone(), get("/api/v1/catalog/status")).await;
    assert_eq!(before["loaded"], false);
    assert_eq!(before["stale"], true);

    state.service.catalog().ensure_fresh().await;

    let (_, _, after) = send(app, get("/api/v1/catalog/status")).await;
    assert_eq!(after["loaded"], true);
    assert_eq!(after["stale"], false);
    assert_eq!(after["providers"], 1);
    assert_eq!(after["etag"], "\"abc\"");
}

#[tokio::test]
async fn test_providers_table() {
    let server = MockServer::start().await;
    let (app, _) = app(&server);

    let (status, _, body) = send(app, get("/api/v1/providers")).await;
    assert_eq!(status, StatusCode::OK);
    let providers = body.as_array().unwrap();
    assert_eq!(providers.len(), 5);

    let gemini = providers.iter().find(|p| p["id"] == "gemini").unwrap();
    assert_eq!(gemini["catalogNamespace"], "google");
    assert_eq!(gemini["defaults"]["solutionModel"], "gemini-2.5-pro");

    let openrouter = providers.iter().find(|p| p["id"] == "openrouter").unwrap();
    assert_eq!(openrouter["selfPriced"], true);
}

#[tokio::test]
async fn test_unknown_api_route_is_404() {
    let server = MockServer::start().await;
    let (app, _) = app(&server);
    let (status, _, _) = send(app, get("/api/v1/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
