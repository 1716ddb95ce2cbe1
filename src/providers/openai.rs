use serde::Deserialize;

use super::{dedupe_by_id, decode, is_openai_chat_model, send_checked, sort_by_id, FetchContext, FetchOptions};
use crate::errors::FetchError;
use crate::models::{CapabilitySet, Model, ProviderId};

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: Vec<OpenAiModel>,
}

#[derive(Debug, Deserialize)]
struct OpenAiModel {
    id: String,
}

/// `GET {base}/v1/models`. Returns chat-capable models sorted by id.
pub async fn fetch(
    ctx: &FetchContext<'_>,
    credential: &str,
    _options: &FetchOptions,
) -> Result<Vec<Model>, FetchError> {
    let url = format!("{}/v1/models", ctx.base_url);
    let resp = send_checked(ProviderId::Openai, ctx.client.get(&url).bearer_auth(credential)).await?;
    let body: ListResponse = decode(ProviderId::Openai, resp).await?;
    Ok(normalize(body))
}

fn normalize(body: ListResponse) -> Vec<Model> {
    let models: Vec<Model> = body
        .data
        .into_iter()
        .filter(|m| is_openai_chat_model(&m.id))
        .map(|m| Model::new(ProviderId::Openai, m.id.clone(), m.id).with_capabilities(CapabilitySet::chat()))
        .collect();

    let mut models = dedupe_by_id(models);
    sort_by_id(&mut models);
    models
}
