//! OpenRouter. Self-priced: the listing carries per-token prices, so its
//! results are never enriched from the universal catalog.

use serde::Deserialize;

use super::{dedupe_by_id, decode, send_checked, sort_by_display_name, FetchContext, FetchOptions};
use crate::errors::FetchError;
use crate::models::{CapabilitySet, Model, Pricing, ProviderId};

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: Vec<RouterModel>,
}

#[derive(Debug, Deserialize)]
struct RouterModel {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    context_length: Option<u64>,
    #[serde(default)]
    pricing: Option<RouterPricing>,
    #[serde(default)]
    architecture: Option<Architecture>,
}

/// USD per token, as decimal strings.
#[derive(Debug, Deserialize)]
struct RouterPricing {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    completion: Option<String>,
    #[serde(default)]
    input_cache_read: Option<String>,
    #[serde(default)]
    input_cache_write: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Architecture {
    #[serde(default)]
    input_modalities: Vec<String>,
    #[serde(default)]
    output_modalities: Vec<String>,
}

/// `GET {base}/api/v1/models`. Keeps text-output models, sorted by display name.
pub async fn fetch(
    ctx: &FetchContext<'_>,
    credential: &str,
    _options: &FetchOptions,
) -> Result<Vec<Model>, FetchError> {
    let url = format!("{}/api/v1/models", ctx.base_url);
    let resp = send_checked(ProviderId::Openrouter, ctx.client.get(&url).bearer_auth(credential)).await?;
    let body: ListResponse = decode(ProviderId::Openrouter, resp).await?;
    Ok(normalize(body))
}

/// Per-token price string to per-million. Unparseable or negative (the
/// router's "variable price" marker) values are unknown, not free.
fn per_million(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    // Round away float noise from the decimal strings.
    Some((value * 1_000_000.0 * 1e6).round() / 1e6)
}

fn pricing(raw: &RouterPricing) -> Option<Pricing> {
    let input = per_million(raw.prompt.as_deref())?;
    let output = per_million(raw.completion.as_deref())?;
    Some(Pricing {
        input_per_million_tokens: input,
        output_per_million_tokens: output,
        cache_read_per_million_tokens: per_million(raw.input_cache_read.as_deref()),
        cache_write_per_million_tokens: per_million(raw.input_cache_write.as_deref()),
    })
}

fn normalize(body: ListResponse) -> Vec<Model> {
    let models: Vec<Model> = body
        .data
        .into_iter()
        .filter(|m| !m.id.to_lowercase().contains("embedding"))
        .filter(|m| {
            m.architecture
                .as_ref()
                .map(|a| a.output_modalities.is_empty() || a.output_modalities.iter().any(|o| o == "text"))
                .unwrap_or(true)
        })
        .map(|m| {
            let arch = m.architecture.unwrap_or_default();
            let capabilities = CapabilitySet {
                chat: true,
                vision: arch.input_modalities.iter().any(|i| i == "image"),
                audio: arch.input_modalities.iter().any(|i| i == "audio"),
                embedding: false,
            };
            let name = m.name.filter(|n| !n.is_empty()).unwrap_or_else(|| m.id.clone());
            let mut model = Model::new(ProviderId::Openrouter, m.id, name).with_capabilities(capabilities);
            model.pricing = m.pricing.as_ref().and_then(pricing);
            model.context_length = m.context_length.filter(|c| *c > 0);
            model
        })
        .collect();

    let mut models = dedupe_by_id(models);
    sort_by_display_name(&mut models);
    models
}
