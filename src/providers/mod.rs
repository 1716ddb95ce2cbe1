//! Provider-native model listing.
//!
//! One free `fetch` function per provider, selected by `ProviderId` in
//! [`fetch_models`]. Each variant normalizes its API shape into [`Model`]s,
//! applies its own eligibility filter, and sorts by a fixed key:
//!
//! | provider   | sort key                          |
//! |------------|-----------------------------------|
//! | openai     | id                                |
//! | gemini     | display name, case-insensitive    |
//! | anthropic  | id                                |
//! | azure      | id                                |
//! | openrouter | display name, case-insensitive    |

use serde::de::DeserializeOwned;
use std::collections::HashSet;

use crate::config::ProviderEndpoints;
use crate::errors::FetchError;
use crate::models::{Model, ProviderId};
use crate::upstream::UpstreamClient;

pub mod anthropic;
pub mod azure;
pub mod gemini;
pub mod openai;
pub mod openrouter;

/// Per-request options. Only Azure reads them today.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub endpoint: Option<String>,
    pub api_version: Option<String>,
}

/// Shared handles a variant needs to make its call.
pub struct FetchContext<'a> {
    pub client: &'a UpstreamClient,
    pub base_url: &'a str,
}

/// Call `provider`'s native listing endpoint.
pub async fn fetch_models(
    client: &UpstreamClient,
    endpoints: &ProviderEndpoints,
    provider: ProviderId,
    credential: &str,
    options: &FetchOptions,
) -> Result<Vec<Model>, FetchError> {
    let base_url = match provider {
        ProviderId::Openai => endpoints.openai.as_str(),
        ProviderId::Gemini => endpoints.gemini.as_str(),
        ProviderId::Anthropic => endpoints.anthropic.as_str(),
        ProviderId::Openrouter => endpoints.openrouter.as_str(),
        ProviderId::Azure => "",
    };
    let ctx = FetchContext { client, base_url };

    let models = match provider {
        ProviderId::Openai => openai::fetch(&ctx, credential, options).await?,
        ProviderId::Gemini => gemini::fetch(&ctx, credential, options).await?,
        ProviderId::Anthropic => anthropic::fetch(&ctx, credential, options).await?,
        ProviderId::Azure => azure::fetch(&ctx, credential, options).await?,
        ProviderId::Openrouter => openrouter::fetch(&ctx, credential, options).await?,
    };

    tracing::debug!(provider = %provider, models = models.len(), "provider listing fetched");
    Ok(models)
}

/// Send a request and map transport/status failures.
/// 401/403 become `Unauthorized`; any other non-2xx becomes `Status`.
pub(crate) async fn send_checked(
    provider: ProviderId,
    request: reqwest_middleware::RequestBuilder,
) -> Result<reqwest::Response, FetchError> {
    let resp = request.send().await.map_err(|e| FetchError::Transport {
        provider,
        message: e.to_string(),
    })?;

    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(FetchError::Unauthorized {
            provider,
            status: status.as_u16(),
        });
    }

    let body = resp.text().await.unwrap_or_default();
    Err(FetchError::Status {
        provider,
        status: status.as_u16(),
        body: truncate(&body, 200),
    })
}

pub(crate) async fn decode<T: DeserializeOwned>(
    provider: ProviderId,
    resp: reqwest::Response,
) -> Result<T, FetchError> {
    let bytes = resp.bytes().await.map_err(|e| FetchError::Transport {
        provider,
        message: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::Parse {
        provider,
        message: e.to_string(),
    })
}

/// Keep the first occurrence of each id.
pub(crate) fn dedupe_by_id(models: Vec<Model>) -> Vec<Model> {
    let mut seen = HashSet::new();
    models
        .into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect()
}

pub(crate) fn sort_by_id(models: &mut [Model]) {
    models.sort_by(|a, b| a.id.cmp(&b.id));
}

pub(crate) fn sort_by_display_name(models: &mut [Model]) {
    models.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// OpenAI-style chat family check shared by the OpenAI and Azure variants.
/// Listing endpoints return every model in the account with no capability
/// metadata, so families are recognized by id.
pub(crate) fn is_openai_chat_model(id: &str) -> bool {
    const CHAT_PREFIXES: &[&str] = &["gpt-", "chatgpt-", "o1", "o3", "o4"];
    const NON_CHAT_MARKERS: &[&str] = &[
        "embedding",
        "whisper",
        "tts",
        "dall-e",
        "image",
        "audio",
        "realtime",
        "transcribe",
        "moderation",
        "search",
        "instruct",
    ];

    let id = id.to_lowercase();
    CHAT_PREFIXES.iter().any(|p| id.starts_with(p))
        && !NON_CHAT_MARKERS.iter().any(|m| id.contains(m))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}
