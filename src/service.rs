//! Three-tier model resolution: provider API, then universal catalog, then
//! the built-in static list.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::{CacheKey, ResultCache};
use crate::catalog::{self, CatalogStore};
use crate::config::{Config, ProviderEndpoints};
use crate::errors::CatalogError;
use crate::models::registry;
use crate::models::{Model, ProviderId, Tier};
use crate::providers::{self, FetchOptions};
use crate::upstream::UpstreamClient;

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Azure resource endpoint.
    pub endpoint: Option<String>,
    pub api_version: Option<String>,
    /// Skip the result cache and go to the provider.
    pub force_refresh: bool,
}

impl ResolveOptions {
    /// Blank `endpoint` / `api_version` values count as unset.
    pub fn new(endpoint: Option<String>, api_version: Option<String>, force_refresh: bool) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            endpoint: non_blank(endpoint),
            api_version: non_blank(api_version),
            force_refresh,
        }
    }
}

/// Outcome of a resolution. `error` is set whenever `tier` is not `Api`;
/// non-empty `models` with an error is a degraded but usable result.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub models: Arc<Vec<Model>>,
    pub tier: Tier,
    pub error: Option<CatalogError>,
}

impl Resolution {
    fn new(models: Vec<Model>, tier: Tier, error: Option<CatalogError>) -> Self {
        Self {
            models: Arc::new(models),
            tier,
            error,
        }
    }
}

/// Inbound resolve request.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub provider: String,
    #[serde(default)]
    pub credential: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub force_refresh: bool,
}

impl std::fmt::Debug for ResolveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveRequest")
            .field("provider", &self.provider)
            .field("credential", &if self.credential.is_empty() { "" } else { "<redacted>" })
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("force_refresh", &self.force_refresh)
            .finish()
    }
}

/// Outbound resolve response. `source` serializes as `api`, `models.dev`
/// or `static`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub success: bool,
    pub models: Arc<Vec<Model>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub source: Tier,
}

impl From<Resolution> for ModelsResponse {
    fn from(r: Resolution) -> Self {
        Self {
            success: !r.models.is_empty(),
            models: r.models,
            error: r.error.map(|e| e.to_string()),
            source: r.tier,
        }
    }
}

#[derive(Clone)]
pub struct ModelCatalogService {
    client: UpstreamClient,
    endpoints: Arc<ProviderEndpoints>,
    catalog: CatalogStore,
    cache: ResultCache,
}

impl ModelCatalogService {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = UpstreamClient::new(config.fetch_timeout, config.max_retries)?;
        let catalog = CatalogStore::new(config.catalog_url.clone(), config.catalog_ttl, client.clone());
        Ok(Self {
            client,
            endpoints: Arc::new(config.endpoints.clone()),
            catalog,
            cache: ResultCache::new(config.result_ttl),
        })
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Resolve the model list for `provider`. Never fails: every tier failure
    /// degrades to the next tier and is reported in `Resolution::error`.
    pub async fn resolve(&self, provider: ProviderId, credential: &str, options: &ResolveOptions) -> Resolution {
        let credential = credential.trim();
        if credential.is_empty() {
            return self.resolve_without_credential(provider).await;
        }

        let key = CacheKey::new(provider, credential, options.endpoint.as_deref());
        if !options.force_refresh {
            if let Some(hit) = self.cache.get(&key) {
                tracing::debug!(provider = %provider, models = hit.models.len(), "model list served from cache");
                return Resolution {
                    models: hit.models,
                    tier: hit.tier,
                    error: None,
                };
            }
        }

        match self.fetch_from_api(provider, credential, options).await {
            Ok(models) => {
                let entry = self.cache.put(key, models, Tier::Api);
                Resolution {
                    models: entry.models,
                    tier: Tier::Api,
                    error: None,
                }
            }
            Err(e) => self.degrade(provider, e).await,
        }
    }

    async fn resolve_without_credential(&self, provider: ProviderId) -> Resolution {
        self.catalog.ensure_fresh().await;
        match self.catalog.provider_models(provider).await {
            Ok(models) => Resolution::new(models, Tier::Catalog, None),
            Err(e) => {
                tracing::debug!(provider = %provider, "no catalog models without credential: {}", e);
                self.static_fallback(provider, CatalogError::CredentialMissing(provider))
            }
        }
    }

    async fn fetch_from_api(
        &self,
        provider: ProviderId,
        credential: &str,
        options: &ResolveOptions,
    ) -> Result<Vec<Model>, CatalogError> {
        let fetch_options = FetchOptions {
            endpoint: options.endpoint.clone(),
            api_version: options.api_version.clone(),
        };

        let models = providers::fetch_models(&self.client, &self.endpoints, provider, credential, &fetch_options)
            .await
            .map_err(|e| {
                if e.is_expected() {
                    tracing::info!(provider = %provider, "provider listing unavailable, falling back: {}", e);
                } else {
                    tracing::warn!(provider = %provider, "provider listing failed, falling back: {}", e);
                }
                CatalogError::from(e)
            })?;

        if models.is_empty() {
            tracing::warn!(provider = %provider, "provider listing returned no eligible models");
            return Err(CatalogError::EmptyResult { provider, tier: "api" });
        }

        if registry::profile(provider).self_priced {
            return Ok(models);
        }

        // Enrichment reads only after the refresh attempt has settled.
        self.catalog.ensure_fresh().await;
        let snapshot = self.catalog.snapshot().await;
        Ok(catalog::merge(models, snapshot.provider(provider), provider))
    }

    async fn degrade(&self, provider: ProviderId, cause: CatalogError) -> Resolution {
        self.catalog.ensure_fresh().await;
        match self.catalog.provider_models(provider).await {
            Ok(models) => Resolution::new(models, Tier::Catalog, Some(cause)),
            Err(e) => {
                tracing::debug!(provider = %provider, "catalog tier empty: {}", e);
                self.static_fallback(provider, cause)
            }
        }
    }

    fn static_fallback(&self, provider: ProviderId, cause: CatalogError) -> Resolution {
        let models = registry::profile(provider).static_model_list();
        Resolution::new(models, Tier::Static, Some(cause))
    }

    /// Boundary entry point: parses the provider tag and shapes the response.
    /// An unknown provider is the only case that yields `success = false`.
    pub async fn resolve_request(&self, req: ResolveRequest) -> ModelsResponse {
        let provider = match req.provider.parse::<ProviderId>() {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!(provider = %req.provider, "resolve requested for unknown provider");
                return ModelsResponse {
                    success: false,
                    models: Arc::new(Vec::new()),
                    error: Some(CatalogError::UnknownProvider(req.provider).to_string()),
                    source: Tier::Static,
                };
            }
        };

        let options = ResolveOptions::new(req.endpoint, req.api_version, req.force_refresh);
        self.resolve(provider, &req.credential, &options).await.into()
    }
}
