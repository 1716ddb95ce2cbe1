//! Process-wide universal catalog snapshot.
//!
//! Pull freshness: `ensure_fresh` is called by resolutions, never by a timer.
//! The snapshot is only ever replaced whole (`Arc` swap under the write lock),
//! so readers see either the old or the new catalog. A failed refresh keeps
//! the previous snapshot.

use chrono::{DateTime, Utc};
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use super::types::ProviderCatalog;
use crate::errors::CatalogError;
use crate::models::registry;
use crate::models::{Model, ProviderId};
use crate::upstream::UpstreamClient;

#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub data: Arc<HashMap<String, ProviderCatalog>>,
    /// `None` until the first successful load.
    pub fetched_at: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

impl CatalogSnapshot {
    pub fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }

    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.fetched_at {
            Some(at) => (now - at).to_std().map(|age| age < ttl).unwrap_or(true),
            None => false,
        }
    }

    pub fn provider(&self, provider: ProviderId) -> Option<&ProviderCatalog> {
        self.data.get(registry::profile(provider).catalog_namespace)
    }
}

/// Diagnostics for `GET /catalog/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub providers: usize,
    pub stale: bool,
}

/// Outcome of one refresh attempt, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Fresh,
    Replaced,
    NotModified,
    Failed,
}

/// Shared, cheaply-cloneable catalog store.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<Inner>,
}

struct Inner {
    url: String,
    ttl: Duration,
    client: UpstreamClient,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    // Serializes refreshes so concurrent stale readers share one fetch.
    refresh: Mutex<()>,
}

impl CatalogStore {
    pub fn new(url: impl Into<String>, ttl: Duration, client: UpstreamClient) -> Self {
        Self {
            inner: Arc::new(Inner {
                url: url.into(),
                ttl,
                client,
                snapshot: RwLock::new(Arc::new(CatalogSnapshot::default())),
                refresh: Mutex::new(()),
            }),
        }
    }

    /// Current snapshot. Never blocks on a refresh in progress.
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.inner.snapshot.read().await.clone()
    }

    /// Refresh the snapshot if it is older than the TTL. Failures are logged
    /// and swallowed.
    pub async fn ensure_fresh(&self) -> RefreshOutcome {
        if self.snapshot().await.is_fresh(self.inner.ttl, Utc::now()) {
            return RefreshOutcome::Fresh;
        }

        let _guard = self.inner.refresh.lock().await;

        // Another task may have refreshed while we waited.
        let current = self.snapshot().await;
        if current.is_fresh(self.inner.ttl, Utc::now()) {
            return RefreshOutcome::Fresh;
        }

        match self.fetch(&current).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    url = %self.inner.url,
                    loaded = current.is_loaded(),
                    "catalog refresh failed, keeping previous snapshot: {}",
                    e
                );
                RefreshOutcome::Failed
            }
        }
    }

    async fn fetch(&self, current: &CatalogSnapshot) -> anyhow::Result<RefreshOutcome> {
        let mut request = self.inner.client.get(&self.inner.url);
        if current.is_loaded() {
            if let Some(etag) = &current.etag {
                request = request.header(IF_NONE_MATCH, etag.as_str());
            }
        }

        let resp = request.send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_MODIFIED {
            if !current.is_loaded() {
                anyhow::bail!("catalog answered 304 before any snapshot was loaded");
            }
            let etag = header_etag(&resp).or_else(|| current.etag.clone());
            self.swap(CatalogSnapshot {
                data: current.data.clone(),
                fetched_at: Some(Utc::now()),
                etag,
            })
            .await;
            tracing::debug!("catalog not modified, freshness extended");
            return Ok(RefreshOutcome::NotModified);
        }

        if !status.is_success() {
            anyhow::bail!("catalog returned HTTP {}", status);
        }

        let etag = header_etag(&resp);
        let bytes = resp.bytes().await?;
        let data = parse_catalog(&bytes)?;
        let providers = data.len();

        self.swap(CatalogSnapshot {
            data: Arc::new(data),
            fetched_at: Some(Utc::now()),
            etag,
        })
        .await;
        tracing::info!(providers, "catalog snapshot replaced");
        Ok(RefreshOutcome::Replaced)
    }

    async fn swap(&self, next: CatalogSnapshot) {
        *self.inner.snapshot.write().await = Arc::new(next);
    }

    /// Eligible catalog models for `provider`, filtered and sorted.
    /// Reads whatever snapshot is current; call `ensure_fresh` first.
    pub async fn provider_models(&self, provider: ProviderId) -> Result<Vec<Model>, CatalogError> {
        let snapshot = self.snapshot().await;
        if !snapshot.is_loaded() {
            return Err(CatalogError::CatalogUnavailable);
        }
        let models = snapshot
            .provider(provider)
            .map(|c| c.eligible_models(provider))
            .unwrap_or_default();
        if models.is_empty() {
            return Err(CatalogError::EmptyResult {
                provider,
                tier: "catalog",
            });
        }
        Ok(models)
    }

    pub async fn status(&self) -> CatalogStatus {
        let snapshot = self.snapshot().await;
        CatalogStatus {
            loaded: snapshot.is_loaded(),
            fetched_at: snapshot.fetched_at,
            etag: snapshot.etag.clone(),
            providers: snapshot.data.len(),
            stale: !snapshot.is_fresh(self.inner.ttl, Utc::now()),
        }
    }
}

fn header_etag(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Parse the catalog payload. A namespace that fails to decode is skipped
/// rather than failing the whole snapshot.
pub fn parse_catalog(bytes: &[u8]) -> anyhow::Result<HashMap<String, ProviderCatalog>> {
    let raw: HashMap<String, serde_json::Value> = serde_json::from_slice(bytes)?;
    let mut data = HashMap::with_capacity(raw.len());
    for (namespace, value) in raw {
        match serde_json::from_value::<ProviderCatalog>(value) {
            Ok(mut catalog) => {
                catalog.normalize_ids();
                data.insert(namespace, catalog);
            }
            Err(e) => {
                tracing::debug!(namespace = %namespace, "skipping undecodable catalog namespace: {}", e);
            }
        }
    }
    Ok(data)
}
