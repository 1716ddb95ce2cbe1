use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://models.dev/api.json";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai";

/// Base URLs for providers with a fixed public endpoint. Azure has none; its
/// endpoint arrives with each request.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub openai: String,
    pub gemini: String,
    pub anthropic: String,
    pub openrouter: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai: DEFAULT_OPENAI_BASE_URL.into(),
            gemini: DEFAULT_GEMINI_BASE_URL.into(),
            anthropic: DEFAULT_ANTHROPIC_BASE_URL.into(),
            openrouter: DEFAULT_OPENROUTER_BASE_URL.into(),
        }
    }
}

impl ProviderEndpoints {
    /// Point every fixed-endpoint provider at one base URL (mock servers).
    pub fn all(base: &str) -> Self {
        Self {
            openai: base.into(),
            gemini: base.into(),
            anthropic: base.into(),
            openrouter: base.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Universal catalog endpoint (models.dev shape).
    pub catalog_url: String,
    /// Catalog snapshot freshness window. Default: 1 hour.
    pub catalog_ttl: Duration,
    /// Resolved-result freshness window per (provider, credential). Default: 5 minutes.
    pub result_ttl: Duration,
    /// Per-call budget for provider and catalog fetches. Default: 15s.
    pub fetch_timeout: Duration,
    /// Retries on transient failures (connect errors, 5xx, 429). Default: 1.
    pub max_retries: u32,
    pub endpoints: ProviderEndpoints,
    /// Interval for the expired-result sweep. `None` disables it.
    pub cache_sweep_interval: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8787,
            catalog_url: DEFAULT_CATALOG_URL.into(),
            catalog_ttl: Duration::from_secs(3600),
            result_ttl: Duration::from_secs(300),
            fetch_timeout: Duration::from_secs(15),
            max_retries: 1,
            endpoints: ProviderEndpoints::default(),
            cache_sweep_interval: Some(Duration::from_secs(60)),
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let defaults = Config::default();
    let endpoints = ProviderEndpoints {
        openai: env_string("MODELCAT_OPENAI_BASE_URL").unwrap_or(defaults.endpoints.openai),
        gemini: env_string("MODELCAT_GEMINI_BASE_URL").unwrap_or(defaults.endpoints.gemini),
        anthropic: env_string("MODELCAT_ANTHROPIC_BASE_URL").unwrap_or(defaults.endpoints.anthropic),
        openrouter: env_string("MODELCAT_OPENROUTER_BASE_URL")
            .unwrap_or(defaults.endpoints.openrouter),
    };

    let catalog_url = env_string("MODELCAT_CATALOG_URL").unwrap_or(defaults.catalog_url);
    if url::Url::parse(&catalog_url).is_err() {
        anyhow::bail!("MODELCAT_CATALOG_URL is not a valid URL: {}", catalog_url);
    }

    let cache_sweep_interval = match env_u64("MODELCAT_CACHE_SWEEP_SECS") {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => defaults.cache_sweep_interval,
    };

    Ok(Config {
        port: std::env::var("MODELCAT_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port),
        catalog_url,
        catalog_ttl: env_u64("MODELCAT_CATALOG_TTL_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.catalog_ttl),
        result_ttl: env_u64("MODELCAT_RESULT_TTL_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.result_ttl),
        fetch_timeout: env_u64("MODELCAT_FETCH_TIMEOUT_SECS")
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.fetch_timeout),
        max_retries: env_u64("MODELCAT_MAX_RETRIES")
            .map(|n| n.min(5) as u32)
            .unwrap_or(defaults.max_retries),
        endpoints,
        cache_sweep_interval,
    })
}
