//! Core model types returned to callers.
//!
//! Pricing is three-state: `None` means unknown, `Some` with zero prices is an
//! explicit "free" signal. Never collapse the two.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the supported provider surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Openai,
    Gemini,
    Anthropic,
    Azure,
    Openrouter,
}

impl ProviderId {
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Openai,
        ProviderId::Gemini,
        ProviderId::Anthropic,
        ProviderId::Azure,
        ProviderId::Openrouter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Openai => "openai",
            ProviderId::Gemini => "gemini",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Azure => "azure",
            ProviderId::Openrouter => "openrouter",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderId::Openai),
            "gemini" | "google" => Ok(ProviderId::Gemini),
            "anthropic" | "claude" => Ok(ProviderId::Anthropic),
            "azure" | "azure-openai" | "azure_openai" => Ok(ProviderId::Azure),
            "openrouter" => Ok(ProviderId::Openrouter),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// The role a model is selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelCategory {
    #[serde(rename = "extractionModel")]
    Extraction,
    #[serde(rename = "solutionModel")]
    Solution,
    #[serde(rename = "debuggingModel")]
    Debugging,
}

impl ModelCategory {
    pub const ALL: [ModelCategory; 3] = [
        ModelCategory::Extraction,
        ModelCategory::Solution,
        ModelCategory::Debugging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelCategory::Extraction => "extractionModel",
            ModelCategory::Solution => "solutionModel",
            ModelCategory::Debugging => "debuggingModel",
        }
    }
}

impl fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "extractionModel" | "extraction" => Ok(ModelCategory::Extraction),
            "solutionModel" | "solution" => Ok(ModelCategory::Solution),
            "debuggingModel" | "debugging" => Ok(ModelCategory::Debugging),
            other => Err(format!("unknown model category '{}'", other)),
        }
    }
}

/// Which resolution stage produced a model list.
///
/// Serializes to the source labels the UI layer expects
/// (`api`, `models.dev`, `static`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "api")]
    Api,
    #[serde(rename = "models.dev")]
    Catalog,
    #[serde(rename = "static")]
    Static,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Api => "api",
            Tier::Catalog => "catalog",
            Tier::Static => "static",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub input_per_million_tokens: f64,
    pub output_per_million_tokens: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_per_million_tokens: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write_per_million_tokens: Option<f64>,
}

impl Pricing {
    pub fn new(input: f64, output: f64) -> Self {
        Self {
            input_per_million_tokens: input,
            output_per_million_tokens: output,
            cache_read_per_million_tokens: None,
            cache_write_per_million_tokens: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.input_per_million_tokens == 0.0 && self.output_per_million_tokens == 0.0
    }

    /// Fill cache prices this pricing lacks from `other`. Input/output prices are
    /// never touched.
    pub fn fill_missing_from(mut self, other: &Pricing) -> Self {
        if self.cache_read_per_million_tokens.is_none() {
            self.cache_read_per_million_tokens = other.cache_read_per_million_tokens;
        }
        if self.cache_write_per_million_tokens.is_none() {
            self.cache_write_per_million_tokens = other.cache_write_per_million_tokens;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    #[serde(default)]
    pub chat: bool,
    #[serde(default)]
    pub vision: bool,
    #[serde(default)]
    pub audio: bool,
    #[serde(default)]
    pub embedding: bool,
}

impl CapabilitySet {
    pub fn chat() -> Self {
        Self {
            chat: true,
            ..Self::default()
        }
    }

    /// Flags can only be added, never cleared.
    pub fn union(self, other: CapabilitySet) -> Self {
        Self {
            chat: self.chat || other.chat,
            vision: self.vision || other.vision,
            audio: self.audio || other.audio,
            embedding: self.embedding || other.embedding,
        }
    }
}

/// A usable model. `id` is unique within its provider only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub display_name: String,
    pub provider: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<CapabilitySet>,
}

impl Model {
    pub fn new(provider: ProviderId, id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            provider,
            pricing: None,
            context_length: None,
            capabilities: None,
        }
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn with_context_length(mut self, context_length: u64) -> Self {
        self.context_length = Some(context_length);
        self
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = Some(capabilities);
        self
    }
}
