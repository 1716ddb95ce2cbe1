//! Universal catalog records (models.dev `api.json` shape).
//!
//! The payload is a map of `providerNamespace -> ProviderCatalog`. Only the
//! fields this service reads are modelled; everything else is ignored.

use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{CapabilitySet, Model, Pricing, ProviderId};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderCatalog {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub models: HashMap<String, CatalogEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogEntry {
    /// Filled from the map key when the record omits it.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub attachment: bool,
    #[serde(default)]
    pub cost: Option<CatalogCost>,
    #[serde(default)]
    pub limit: Option<CatalogLimit>,
    #[serde(default)]
    pub modalities: Option<Modalities>,
}

/// USD per million tokens. Each field is independently optional.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CatalogCost {
    #[serde(default)]
    pub input: Option<f64>,
    #[serde(default)]
    pub output: Option<f64>,
    #[serde(default)]
    pub cache_read: Option<f64>,
    #[serde(default)]
    pub cache_write: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CatalogLimit {
    #[serde(default)]
    pub context: Option<u64>,
    #[serde(default)]
    pub output: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Modalities {
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
}

const NON_GENERATIVE_MARKERS: &[&str] = &[
    "embed",
    "whisper",
    "transcribe",
    "speech",
    "-tts",
    "tts-",
    "-stt",
    "stt-",
];

impl CatalogEntry {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }

    /// Three-state: `None` when input or output price is not stated;
    /// explicit zeros are kept as a free price.
    pub fn pricing(&self) -> Option<Pricing> {
        let cost = self.cost?;
        Some(Pricing {
            input_per_million_tokens: cost.input?,
            output_per_million_tokens: cost.output?,
            cache_read_per_million_tokens: cost.cache_read,
            cache_write_per_million_tokens: cost.cache_write,
        })
    }

    pub fn capabilities(&self) -> CapabilitySet {
        let (input, output) = match &self.modalities {
            Some(m) => (m.input.as_slice(), m.output.as_slice()),
            None => (&[][..], &[][..]),
        };
        let has = |list: &[String], kind: &str| list.iter().any(|m| m == kind);
        CapabilitySet {
            chat: output.is_empty() || has(output, "text"),
            vision: has(input, "image") || self.attachment,
            audio: has(input, "audio"),
            embedding: self.id.to_lowercase().contains("embed"),
        }
    }

    /// Eligible for listing: not deprecated, not an embedding/speech model, and
    /// not a non-generative entry (zero output limit and zero output cost).
    pub fn is_eligible(&self) -> bool {
        if self
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("deprecated"))
        {
            return false;
        }

        let id = self.id.to_lowercase();
        if NON_GENERATIVE_MARKERS.iter().any(|m| id.contains(m)) {
            return false;
        }

        let zero_output_limit = self.limit.and_then(|l| l.output) == Some(0);
        let zero_output_cost = self.cost.and_then(|c| c.output) == Some(0.0);
        !(zero_output_limit && zero_output_cost)
    }

    pub fn to_model(&self, provider: ProviderId) -> Model {
        let mut model = Model::new(provider, self.id.clone(), self.display_name())
            .with_capabilities(self.capabilities());
        model.pricing = self.pricing();
        model.context_length = self.limit.and_then(|l| l.context).filter(|c| *c > 0);
        model
    }
}

impl ProviderCatalog {
    pub fn get(&self, model_id: &str) -> Option<&CatalogEntry> {
        self.models.get(model_id)
    }

    /// Eligible entries as models, sorted by display name (case-insensitive,
    /// id as tie-break).
    pub fn eligible_models(&self, provider: ProviderId) -> Vec<Model> {
        let mut entries: Vec<&CatalogEntry> = self.models.values().filter(|e| e.is_eligible()).collect();
        entries.sort_by(|a, b| {
            a.display_name()
                .to_lowercase()
                .cmp(&b.display_name().to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        entries.into_iter().map(|e| e.to_model(provider)).collect()
    }

    /// Fill missing entry ids from their map keys.
    pub(crate) fn normalize_ids(&mut self) {
        for (key, entry) in self.models.iter_mut() {
            if entry.id.is_empty() {
                entry.id = key.clone();
            }
        }
    }
}
