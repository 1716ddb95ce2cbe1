//! End-to-end resolution against mocked provider and catalog endpoints.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modelcat::config::{Config, ProviderEndpoints};
use modelcat::errors::CatalogError;
use modelcat::models::registry;
use modelcat::models::{ProviderId, Tier};
use modelcat::service::{ModelCatalogService, ResolveOptions, ResolveRequest};

fn config(server: &MockServer) -> Config {
    Config {
        catalog_url: format!("{}/api.json", server.uri()),
        endpoints: ProviderEndpoints::all(&server.uri()),
        fetch_timeout: Duration::from_secs(5),
        max_retries: 0,
        ..Config::default()
    }
}

fn service(server: &MockServer) -> ModelCatalogService {
    ModelCatalogService::new(&config(server)).unwrap()
}

fn catalog_body() -> serde_json::Value {
    json!({
        "openai": {
            "name": "OpenAI",
            "models": {
                "gpt-b": {"id": "gpt-b", "name": "Beta", "cost": {"input": 1.0, "output": 2.0}},
                "gpt-a": {"id": "gpt-a", "name": "alpha", "cost": {"input": 0.5, "output": 1.5}},
                "gpt-c": {"id": "gpt-c", "name": "Gamma"},
                "gpt-old": {"id": "gpt-old", "name": "Old", "status": "deprecated"},
                "text-embedding-3-small": {"id": "text-embedding-3-small", "name": "Embedding"}
            }
        },
        "azure": {
            "models": {
                "m1": {"id": "m1", "name": "Model One", "cost": {"input": 1.0, "output": 2.0},
                       "limit": {"context": 128000, "output": 16384}},
                "m2": {"id": "m2", "name": "Model Two", "cost": {"input": 3.0, "output": 4.0}}
            }
        },
        "google": {
            "models": {
                "gemini-2.5-pro": {"id": "gemini-2.5-pro", "name": "Gemini 2.5 Pro"}
            }
        },
        "openrouter": {
            "models": {
                "openai/gpt-4o": {"id": "openai/gpt-4o", "name": "GPT-4o", "cost": {"input": 99.0, "output": 99.0}},
                "x/catalog-only": {"id": "x/catalog-only", "name": "Catalog Only"}
            }
        }
    })
}

async fn mount_catalog(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn ids(models: &[modelcat::models::Model]) -> Vec<&str> {
    models.iter().map(|m| m.id.as_str()).collect()
}

#[tokio::test]
async fn test_no_credential_lists_catalog_models_sorted() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let svc = service(&server);

    let r = svc.resolve(ProviderId::Openai, "", &ResolveOptions::default()).await;

    assert_eq!(r.tier, Tier::Catalog);
    assert!(r.error.is_none());
    assert_eq!(ids(&r.models), vec!["gpt-a", "gpt-b", "gpt-c"]);
}

#[tokio::test]
async fn test_no_credential_uses_provider_namespace() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let svc = service(&server);

    let r = svc.resolve(ProviderId::Gemini, "", &ResolveOptions::default()).await;
    assert_eq!(r.tier, Tier::Catalog);
    assert_eq!(ids(&r.models), vec!["gemini-2.5-pro"]);
}

#[tokio::test]
async fn test_no_credential_without_catalog_entry_is_static() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let svc = service(&server);

    let r = svc.resolve(ProviderId::Anthropic, "", &ResolveOptions::default()).await;

    assert_eq!(r.tier, Tier::Static);
    assert_eq!(*r.models, registry::profile(ProviderId::Anthropic).static_model_list());
    assert!(matches!(r.error, Some(CatalogError::CredentialMissing(ProviderId::Anthropic))));
}

#[tokio::test]
async fn test_api_result_enriched_and_extended_from_catalog() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/openai/models"))
        .and(query_param("api-version", "2024-10-21"))
        .and(header("api-key", "az-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "m1", "capabilities": {"chat_completion": true}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let svc = service(&server);

    let options = ResolveOptions {
        endpoint: Some(server.uri()),
        ..Default::default()
    };
    let r = svc.resolve(ProviderId::Azure, "az-key", &options).await;

    assert_eq!(r.tier, Tier::Api);
    assert!(r.error.is_none());
    assert_eq!(ids(&r.models), vec!["m1", "m2"]);

    let m1 = &r.models[0];
    let pricing = m1.pricing.unwrap();
    assert_eq!(pricing.input_per_million_tokens, 1.0);
    assert_eq!(pricing.output_per_million_tokens, 2.0);
    assert_eq!(m1.context_length, Some(128000));
    assert_eq!(r.models[1].display_name, "Model Two");
}

#[tokio::test]
async fn test_cached_result_makes_no_network_calls() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "gpt-4o"}, {"id": "whisper-1"}, {"id": "gpt-b"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let svc = service(&server);

    let first = svc.resolve(ProviderId::Openai, "sk-test", &ResolveOptions::default()).await;
    let second = svc.resolve(ProviderId::Openai, "sk-test", &ResolveOptions::default()).await;

    assert_eq!(first.tier, Tier::Api);
    assert_eq!(second.tier, Tier::Api);
    assert!(Arc::ptr_eq(&first.models, &second.models));
    // API models in id order, then catalog-only models in catalog order.
    assert_eq!(ids(&first.models), vec!["gpt-4o", "gpt-b", "gpt-a", "gpt-c"]);
}

#[tokio::test]
async fn test_force_refresh_bypasses_cache() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "gpt-4o"}]})))
        .expect(2)
        .mount(&server)
        .await;
    let svc = service(&server);

    svc.resolve(ProviderId::Openai, "sk-test", &ResolveOptions::default()).await;
    let refreshed = svc
        .resolve(
            ProviderId::Openai,
            "sk-test",
            &ResolveOptions {
                force_refresh: true,
                ..Default::default()
            },
        )
        .await;
    assert_eq!(refreshed.tier, Tier::Api);
}

#[tokio::test]
async fn test_credentials_are_cached_independently() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "gpt-4o"}]})))
        .expect(2)
        .mount(&server)
        .await;
    let svc = service(&server);

    let opts_a = ResolveOptions::default();
    let opts_b = ResolveOptions::default();
    let (a, b) = tokio::join!(
        svc.resolve(ProviderId::Openai, "sk-a", &opts_a),
        svc.resolve(ProviderId::Openai, "sk-b", &opts_b),
    );
    assert_eq!(a.tier, Tier::Api);
    assert_eq!(b.tier, Tier::Api);
    assert_eq!(svc.cache().len(), 2);
}

#[tokio::test]
async fn test_fetch_failure_falls_back_to_catalog_and_is_not_cached() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    let svc = service(&server);

    let r = svc.resolve(ProviderId::Openai, "sk-bad", &ResolveOptions::default()).await;
    assert_eq!(r.tier, Tier::Catalog);
    assert_eq!(ids(&r.models), vec!["gpt-a", "gpt-b", "gpt-c"]);
    match r.error {
        Some(CatalogError::Transport(msg)) => assert!(msg.contains("401"), "{}", msg),
        other => panic!("unexpected error {:?}", other),
    }

    // A degraded result does not suppress the next attempt.
    let again = svc.resolve(ProviderId::Openai, "sk-bad", &ResolveOptions::default()).await;
    assert_eq!(again.tier, Tier::Catalog);
    assert!(svc.cache().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_without_catalog_entry_falls_back_to_static() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;
    let svc = service(&server);

    let r = svc.resolve(ProviderId::Anthropic, "sk-ant", &ResolveOptions::default()).await;
    assert_eq!(r.tier, Tier::Static);
    assert!(!r.models.is_empty());
    let msg = r.error.unwrap().to_string();
    assert!(msg.contains("HTTP 500"), "{}", msg);
}

#[tokio::test]
async fn test_unavailable_catalog_and_failed_fetch_is_static() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let svc = service(&server);

    let r = svc.resolve(ProviderId::Openai, "sk", &ResolveOptions::default()).await;
    assert_eq!(r.tier, Tier::Static);
    assert_eq!(*r.models, registry::profile(ProviderId::Openai).static_model_list());
    assert!(!svc.catalog().status().await.loaded);
}

#[tokio::test]
async fn test_empty_api_listing_falls_through() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "text-embedding-3-large"}, {"id": "dall-e-3"}]
        })))
        .mount(&server)
        .await;
    let svc = service(&server);

    let r = svc.resolve(ProviderId::Openai, "sk", &ResolveOptions::default()).await;
    assert_eq!(r.tier, Tier::Catalog);
    assert!(matches!(r.error, Some(CatalogError::EmptyResult { tier: "api", .. })));
}

#[tokio::test]
async fn test_azure_without_endpoint_fails_fast() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/openai/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;
    let svc = service(&server);

    let r = svc.resolve(ProviderId::Azure, "az-key", &ResolveOptions::default()).await;
    assert_eq!(r.tier, Tier::Catalog);
    assert_eq!(ids(&r.models), vec!["m1", "m2"]);
    let msg = r.error.unwrap().to_string();
    assert!(msg.contains("endpoint"), "{}", msg);
}

#[tokio::test]
async fn test_azure_missing_listing_is_unsupported_endpoint() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/openai/models"))
        .and(query_param("api-version", "2024-06-01"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    let svc = service(&server);

    let options = ResolveOptions {
        endpoint: Some(format!("{}/", server.uri())),
        api_version: Some("2024-06-01".into()),
        force_refresh: false,
    };
    let r = svc.resolve(ProviderId::Azure, "az-key", &options).await;
    assert_eq!(r.tier, Tier::Catalog);
    assert!(matches!(r.error, Some(CatalogError::UnsupportedEndpoint(_))));
}

#[tokio::test]
async fn test_self_priced_provider_is_not_enriched() {
    let server = MockServer::start().await;
    mount_catalog(&server, 0).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "openai/gpt-4o",
                "name": "OpenAI: GPT-4o",
                "context_length": 128000,
                "pricing": {"prompt": "0.0000025", "completion": "0.00001"},
                "architecture": {"input_modalities": ["text", "image"], "output_modalities": ["text"]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let svc = service(&server);

    let r = svc.resolve(ProviderId::Openrouter, "or-key", &ResolveOptions::default()).await;
    assert_eq!(r.tier, Tier::Api);
    assert_eq!(ids(&r.models), vec!["openai/gpt-4o"]);
    let pricing = r.models[0].pricing.unwrap();
    assert_eq!(pricing.input_per_million_tokens, 2.5);
    assert_eq!(pricing.output_per_million_tokens, 10.0);
}

#[tokio::test]
async fn test_unknown_provider_request() {
    let server = MockServer::start().await;
    let svc = service(&server);

    let req: ResolveRequest = serde_json::from_value(json!({"provider": "acme", "credential": "k"})).unwrap();
    let resp = svc.resolve_request(req).await;
    assert!(!resp.success);
    assert!(resp.models.is_empty());
    assert!(resp.error.unwrap().contains("acme"));
}

#[tokio::test]
async fn test_request_with_degraded_result_is_still_success() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let svc = service(&server);

    let req: ResolveRequest = serde_json::from_value(json!({"provider": "claude"})).unwrap();
    let resp = svc.resolve_request(req).await;
    assert!(resp.success);
    assert_eq!(resp.source, Tier::Static);
    assert!(resp.error.unwrap().contains("API key is required"));
}

#[tokio::test]
async fn test_hung_provider_costs_one_timeout() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"id": "gpt-4o"}]}))
                .set_delay(Duration::from_secs(10)),
        )
        .expect(1)
        .mount(&server)
        .await;
    // Default retry count; the timed-out attempt must not be repeated.
    let svc = ModelCatalogService::new(&Config {
        fetch_timeout: Duration::from_secs(1),
        max_retries: Config::default().max_retries,
        ..config(&server)
    })
    .unwrap();

    let started = std::time::Instant::now();
    let r = svc.resolve(ProviderId::Openai, "sk-slow", &ResolveOptions::default()).await;
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(1900), "took {:?}", elapsed);
    assert_eq!(r.tier, Tier::Catalog);
    assert!(matches!(r.error, Some(CatalogError::Transport(_))));
}

#[tokio::test]
async fn test_server_errors_are_still_retried() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    let svc = ModelCatalogService::new(&Config {
        max_retries: 1,
        ..config(&server)
    })
    .unwrap();

    let r = svc.resolve(ProviderId::Openai, "sk", &ResolveOptions::default()).await;
    assert_eq!(r.tier, Tier::Catalog);
}
