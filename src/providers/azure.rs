//! Azure OpenAI. Each resource has its own endpoint, passed per request.
//!
//! The models listing is missing on some resource kinds and API versions; a
//! 404/405 there is reported as `UnsupportedEndpoint` so the caller can fall
//! back without treating it as a fault.

use serde::Deserialize;

use super::{dedupe_by_id, decode, is_openai_chat_model, send_checked, sort_by_id, FetchContext, FetchOptions};
use crate::errors::FetchError;
use crate::models::{CapabilitySet, Model, ProviderId};

pub const DEFAULT_API_VERSION: &str = "2024-10-21";

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<AzureModel>,
}

#[derive(Debug, Deserialize)]
struct AzureModel {
    id: String,
    #[serde(default)]
    capabilities: Option<AzureCapabilities>,
}

#[derive(Debug, Default, Deserialize)]
struct AzureCapabilities {
    #[serde(default)]
    chat_completion: bool,
    #[serde(default)]
    embeddings: bool,
}

/// `GET {endpoint}/openai/models?api-version=…`. Fails before any network
/// call when `endpoint` is missing or not an http(s) URL.
pub async fn fetch(
    ctx: &FetchContext<'_>,
    credential: &str,
    options: &FetchOptions,
) -> Result<Vec<Model>, FetchError> {
    let endpoint = validate_endpoint(options.endpoint.as_deref())?;
    let api_version = options
        .api_version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_API_VERSION);

    let url = format!("{}/openai/models", endpoint);
    let request = ctx
        .client
        .get(&url)
        .query(&[("api-version", api_version)])
        .header("api-key", credential);

    let resp = match send_checked(ProviderId::Azure, request).await {
        Ok(resp) => resp,
        Err(FetchError::Status { status: 404 | 405, .. }) => {
            return Err(FetchError::UnsupportedEndpoint {
                provider: ProviderId::Azure,
            })
        }
        Err(e) => return Err(e),
    };
    let body: ListResponse = decode(ProviderId::Azure, resp).await?;
    Ok(normalize(body))
}

fn validate_endpoint(endpoint: Option<&str>) -> Result<String, FetchError> {
    let missing = FetchError::MissingOption {
        provider: ProviderId::Azure,
        option: "endpoint",
    };
    let raw = match endpoint.map(str::trim).filter(|e| !e.is_empty()) {
        Some(raw) => raw,
        None => return Err(missing),
    };

    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            Ok(raw.trim_end_matches('/').to_string())
        }
        _ => Err(missing),
    }
}

fn normalize(body: ListResponse) -> Vec<Model> {
    let models: Vec<Model> = body
        .data
        .into_iter()
        .filter(|m| match &m.capabilities {
            Some(caps) => caps.chat_completion && !caps.embeddings,
            None => is_openai_chat_model(&m.id),
        })
        .map(|m| Model::new(ProviderId::Azure, m.id.clone(), m.id).with_capabilities(CapabilitySet::chat()))
        .collect();

    let mut models = dedupe_by_id(models);
    sort_by_id(&mut models);
    models
}
