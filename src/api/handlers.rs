use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::catalog::CatalogStatus;
use crate::errors::AppError;
use crate::models::registry;
use crate::models::{ModelCategory, ProviderId};
use crate::sanitize::{self, Sanitized};
use crate::service::{ModelsResponse, ResolveRequest};

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeRequest {
    pub chosen_id: String,
    pub provider: String,
    pub category: String,
    #[serde(default)]
    pub dynamic_allow_list: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Serialize)]
pub struct InvalidateResponse {
    pub removed: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub label: &'static str,
    pub catalog_namespace: &'static str,
    pub self_priced: bool,
    pub open_model_space: bool,
    pub defaults: BTreeMap<&'static str, &'static str>,
    pub static_models: Vec<&'static str>,
}

// ── Handlers ─────────────────────────────────────────────────

/// Always 200: degradation travels in `error` / `source`.
pub async fn resolve_models(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveRequest>,
) -> Json<ModelsResponse> {
    tracing::debug!(request = ?req, "resolve models");
    Json(state.service.resolve_request(req).await)
}

pub async fn sanitize_model(Json(req): Json<SanitizeRequest>) -> Result<Json<Sanitized>, AppError> {
    let provider: ProviderId = req.provider.parse().map_err(AppError::BadRequest)?;
    let category: ModelCategory = req.category.parse().map_err(AppError::BadRequest)?;

    Ok(Json(sanitize::sanitize_model(
        &req.chosen_id,
        provider,
        category,
        req.dynamic_allow_list.as_deref(),
    )))
}

pub async fn invalidate_cache(
    State(state): State<Arc<AppState>>,
    body: Option<Json<InvalidateRequest>>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let cache = state.service.cache();

    let removed = match req.provider {
        Some(p) => {
            let provider: ProviderId = p.parse().map_err(AppError::BadRequest)?;
            cache.invalidate_provider(provider)
        }
        None => cache.invalidate_all(),
    };

    tracing::info!(removed, "result cache invalidated");
    Ok(Json(InvalidateResponse { removed }))
}

pub async fn catalog_status(State(state): State<Arc<AppState>>) -> Json<CatalogStatus> {
    Json(state.service.catalog().status().await)
}

pub async fn list_providers() -> Json<Vec<ProviderInfo>> {
    let providers = registry::profiles()
        .into_iter()
        .map(|p| ProviderInfo {
            id: p.id,
            label: p.label,
            catalog_namespace: p.catalog_namespace,
            self_priced: p.self_priced,
            open_model_space: p.open_model_space,
            defaults: ModelCategory::ALL
                .iter()
                .map(|c| (c.as_str(), p.default_model(*c)))
                .collect(),
            static_models: p.static_models.iter().map(|m| m.id).collect(),
        })
        .collect();
    Json(providers)
}
