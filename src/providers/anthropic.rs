use serde::Deserialize;

use super::{dedupe_by_id, decode, send_checked, sort_by_id, FetchContext, FetchOptions};
use crate::errors::FetchError;
use crate::models::{CapabilitySet, Model, ProviderId};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: Vec<AnthropicModel>,
}

#[derive(Debug, Deserialize)]
struct AnthropicModel {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// `GET {base}/v1/models`. Keeps `claude-*` models sorted by id.
pub async fn fetch(
    ctx: &FetchContext<'_>,
    credential: &str,
    _options: &FetchOptions,
) -> Result<Vec<Model>, FetchError> {
    let url = format!("{}/v1/models", ctx.base_url);
    let request = ctx
        .client
        .get(&url)
        .query(&[("limit", "1000")])
        .header("x-api-key", credential)
        .header("anthropic-version", ANTHROPIC_VERSION);
    let resp = send_checked(ProviderId::Anthropic, request).await?;
    let body: ListResponse = decode(ProviderId::Anthropic, resp).await?;
    Ok(normalize(body))
}

fn normalize(body: ListResponse) -> Vec<Model> {
    let models: Vec<Model> = body
        .data
        .into_iter()
        .filter(|m| m.id.starts_with("claude-"))
        .map(|m| {
            let name = m.display_name.filter(|d| !d.is_empty()).unwrap_or_else(|| m.id.clone());
            // Every current Claude chat model accepts image input.
            let capabilities = CapabilitySet {
                chat: true,
                vision: true,
                ..Default::default()
            };
            Model::new(ProviderId::Anthropic, m.id, name).with_capabilities(capabilities)
        })
        .collect();

    let mut models = dedupe_by_id(models);
    sort_by_id(&mut models);
    models
}
