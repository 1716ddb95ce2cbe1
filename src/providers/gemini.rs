use serde::Deserialize;

use super::{dedupe_by_id, decode, send_checked, sort_by_display_name, FetchContext, FetchOptions};
use crate::errors::FetchError;
use crate::models::{CapabilitySet, Model, ProviderId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    models: Vec<GeminiModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    /// `models/<id>`
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    input_token_limit: Option<u64>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

const EXCLUDED_MARKERS: &[&str] = &["embedding", "aqa", "imagen", "tts", "image-generation"];

/// `GET {base}/v1beta/models?key=…`. Keeps `gemini-*` models that support
/// `generateContent`, sorted by display name.
pub async fn fetch(
    ctx: &FetchContext<'_>,
    credential: &str,
    _options: &FetchOptions,
) -> Result<Vec<Model>, FetchError> {
    let url = format!("{}/v1beta/models", ctx.base_url);
    let request = ctx
        .client
        .get(&url)
        .query(&[("key", credential), ("pageSize", "1000")]);
    let resp = send_checked(ProviderId::Gemini, request).await?;
    let body: ListResponse = decode(ProviderId::Gemini, resp).await?;
    Ok(normalize(body))
}

fn normalize(body: ListResponse) -> Vec<Model> {
    let models: Vec<Model> = body
        .models
        .into_iter()
        .filter_map(|m| {
            let id = m.name.strip_prefix("models/").unwrap_or(&m.name).to_string();
            let lower = id.to_lowercase();
            if !lower.starts_with("gemini-") || EXCLUDED_MARKERS.iter().any(|x| lower.contains(x)) {
                return None;
            }
            if !m.supported_generation_methods.iter().any(|g| g == "generateContent") {
                return None;
            }

            let display_name = m.display_name.filter(|d| !d.is_empty()).unwrap_or_else(|| id.clone());
            let capabilities = CapabilitySet {
                chat: true,
                vision: true,
                ..Default::default()
            };
            let mut model = Model::new(ProviderId::Gemini, id, display_name).with_capabilities(capabilities);
            if let Some(limit) = m.input_token_limit.filter(|l| *l > 0) {
                model = model.with_context_length(limit);
            }
            Some(model)
        })
        .collect();

    let mut models = dedupe_by_id(models);
    sort_by_display_name(&mut models);
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_prefix_and_filters() {
        let body: ListResponse = serde_json::from_value(serde_json::json!({
            "models": [
                {
                    "name": "models/gemini-2.5-pro",
                    "displayName": "Gemini 2.5 Pro",
                    "inputTokenLimit": 1048576,
                    "supportedGenerationMethods": ["generateContent", "countTokens"]
                },
                {
                    "name": "models/gemini-2.0-flash",
                    "displayName": "Gemini 2.0 Flash",
                    "supportedGenerationMethods": ["generateContent"]
                },
                {
                    "name": "models/text-embedding-004",
                    "displayName": "Text Embedding 004",
                    "supportedGenerationMethods": ["embedContent"]
                },
                {
                    "name": "models/gemini-embedding-exp",
                    "displayName": "Gemini Embedding",
                    "supportedGenerationMethods": ["embedContent", "generateContent"]
                },
                {
                    "name": "models/gemini-1.0-pro-vision",
                    "displayName": "Gemini 1.0 Pro Vision",
                    "supportedGenerationMethods": ["countTokens"]
                }
            ]
        }))
        .unwrap();

        let models = normalize(body);
        let ids: Vec<_> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["gemini-2.0-flash", "gemini-2.5-pro"]);
        assert_eq!(models[1].context_length, Some(1048576));
        assert_eq!(models[0].context_length, None);
    }

    #[test]
    fn test_empty_listing_parses() {
        let body: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(normalize(body).is_empty());
    }
}
