//! Built-in provider table: static model lists, allow-lists and per-category
//! defaults.
//!
//! This is the last-resort tier of the resolution chain and the reference for
//! selection sanitizing. Every category default must appear in its provider's
//! static list.

use serde::Serialize;

use super::model::{CapabilitySet, Model, ModelCategory, ProviderId};

/// A model shipped with the binary.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StaticModel {
    pub id: &'static str,
    pub display_name: &'static str,
}

const fn sm(id: &'static str, display_name: &'static str) -> StaticModel {
    StaticModel { id, display_name }
}

/// Per-provider static configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderProfile {
    pub id: ProviderId,
    pub label: &'static str,
    /// Key of this provider in the universal catalog.
    pub catalog_namespace: &'static str,
    /// Provider API returns its own prices; catalog enrichment is skipped.
    pub self_priced: bool,
    /// Model ids are operator-defined (deployments) or span a third-party
    /// catalog, so any non-empty id is acceptable.
    pub open_model_space: bool,
    pub static_models: &'static [StaticModel],
    /// Indexed by `ModelCategory` order: extraction, solution, debugging.
    pub defaults: [&'static str; 3],
}

impl ProviderProfile {
    pub fn default_model(&self, category: ModelCategory) -> &'static str {
        match category {
            ModelCategory::Extraction => self.defaults[0],
            ModelCategory::Solution => self.defaults[1],
            ModelCategory::Debugging => self.defaults[2],
        }
    }

    pub fn allows_static(&self, model_id: &str) -> bool {
        self.static_models.iter().any(|m| m.id == model_id)
    }

    pub fn static_model_list(&self) -> Vec<Model> {
        self.static_models
            .iter()
            .map(|m| Model::new(self.id, m.id, m.display_name).with_capabilities(CapabilitySet::chat()))
            .collect()
    }
}

const OPENAI_MODELS: &[StaticModel] = &[
    sm("gpt-4o", "GPT-4o"),
    sm("gpt-4o-mini", "GPT-4o Mini"),
    sm("gpt-4.1", "GPT-4.1"),
    sm("gpt-4.1-mini", "GPT-4.1 Mini"),
    sm("o3-mini", "o3-mini"),
];

const GEMINI_MODELS: &[StaticModel] = &[
    sm("gemini-2.5-pro", "Gemini 2.5 Pro"),
    sm("gemini-2.5-flash", "Gemini 2.5 Flash"),
    sm("gemini-2.0-flash", "Gemini 2.0 Flash"),
    sm("gemini-1.5-pro", "Gemini 1.5 Pro"),
];

const ANTHROPIC_MODELS: &[StaticModel] = &[
    sm("claude-sonnet-4-20250514", "Claude Sonnet 4"),
    sm("claude-opus-4-20250514", "Claude Opus 4"),
    sm("claude-3-7-sonnet-20250219", "Claude 3.7 Sonnet"),
    sm("claude-3-5-haiku-20241022", "Claude 3.5 Haiku"),
];

// Common deployment names; real deployments are operator-defined.
const AZURE_MODELS: &[StaticModel] = &[
    sm("gpt-4o", "GPT-4o"),
    sm("gpt-4o-mini", "GPT-4o Mini"),
    sm("gpt-4.1", "GPT-4.1"),
];

const OPENROUTER_MODELS: &[StaticModel] = &[
    sm("openai/gpt-4o", "OpenAI: GPT-4o"),
    sm("openai/gpt-4o-mini", "OpenAI: GPT-4o Mini"),
    sm("anthropic/claude-sonnet-4", "Anthropic: Claude Sonnet 4"),
    sm("google/gemini-2.5-pro", "Google: Gemini 2.5 Pro"),
    sm("deepseek/deepseek-chat", "DeepSeek: DeepSeek V3"),
];

static OPENAI: ProviderProfile = ProviderProfile {
    id: ProviderId::Openai,
    label: "OpenAI",
    catalog_namespace: "openai",
    self_priced: false,
    open_model_space: false,
    static_models: OPENAI_MODELS,
    defaults: ["gpt-4o", "gpt-4o", "gpt-4o"],
};

static GEMINI: ProviderProfile = ProviderProfile {
    id: ProviderId::Gemini,
    label: "Google Gemini",
    catalog_namespace: "google",
    self_priced: false,
    open_model_space: false,
    static_models: GEMINI_MODELS,
    defaults: ["gemini-2.0-flash", "gemini-2.5-pro", "gemini-2.5-flash"],
};

static ANTHROPIC: ProviderProfile = ProviderProfile {
    id: ProviderId::Anthropic,
    label: "Anthropic",
    catalog_namespace: "anthropic",
    self_priced: false,
    open_model_space: false,
    static_models: ANTHROPIC_MODELS,
    defaults: [
        "claude-3-7-sonnet-20250219",
        "claude-sonnet-4-20250514",
        "claude-sonnet-4-20250514",
    ],
};

static AZURE: ProviderProfile = ProviderProfile {
    id: ProviderId::Azure,
    label: "Azure OpenAI",
    catalog_namespace: "azure",
    self_priced: false,
    open_model_space: true,
    static_models: AZURE_MODELS,
    defaults: ["gpt-4o", "gpt-4o", "gpt-4o"],
};

static OPENROUTER: ProviderProfile = ProviderProfile {
    id: ProviderId::Openrouter,
    label: "OpenRouter",
    catalog_namespace: "openrouter",
    self_priced: true,
    open_model_space: true,
    static_models: OPENROUTER_MODELS,
    defaults: ["openai/gpt-4o", "openai/gpt-4o", "openai/gpt-4o"],
};

/// Static profile for a provider.
pub fn profile(provider: ProviderId) -> &'static ProviderProfile {
    match provider {
        ProviderId::Openai => &OPENAI,
        ProviderId::Gemini => &GEMINI,
        ProviderId::Anthropic => &ANTHROPIC,
        ProviderId::Azure => &AZURE,
        ProviderId::Openrouter => &OPENROUTER,
    }
}

/// All profiles in `ProviderId::ALL` order.
pub fn profiles() -> Vec<&'static ProviderProfile> {
    ProviderId::ALL.iter().map(|p| profile(*p)).collect()
}
