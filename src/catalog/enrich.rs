//! Merge a provider-native listing with the universal catalog.

use std::collections::HashSet;

use super::types::ProviderCatalog;
use crate::models::{Model, ProviderId};

/// Enrich `api_models` from `catalog` and append catalog-only models.
///
/// For each API model with a matching catalog entry (any status):
/// - pricing is filled only when the API gave none; an API price is never
///   replaced (missing cache prices may still be filled in);
/// - context length is filled only when missing;
/// - capability flags are OR-ed, so the catalog can add but never clear.
///
/// Then every eligible catalog model absent from the API result is appended
/// in catalog order (display name). API order is preserved; duplicate API ids
/// keep their first occurrence.
pub fn merge(api_models: Vec<Model>, catalog: Option<&ProviderCatalog>, provider: ProviderId) -> Vec<Model> {
    let mut seen: HashSet<String> = HashSet::with_capacity(api_models.len());
    let mut merged: Vec<Model> = Vec::with_capacity(api_models.len());

    for model in api_models {
        if !seen.insert(model.id.clone()) {
            continue;
        }
        let enriched = match catalog.and_then(|c| c.get(&model.id)) {
            Some(entry) => enrich_one(model, &entry.to_model(provider)),
            None => model,
        };
        merged.push(enriched);
    }

    if let Some(catalog) = catalog {
        merged.extend(
            catalog
                .eligible_models(provider)
                .into_iter()
                .filter(|m| !seen.contains(&m.id)),
        );
    }

    merged
}

fn enrich_one(mut model: Model, from_catalog: &Model) -> Model {
    model.pricing = match (model.pricing, from_catalog.pricing) {
        (Some(api), Some(cat)) => Some(api.fill_missing_from(&cat)),
        (Some(api), None) => Some(api),
        (None, cat) => cat,
    };
    if model.context_length.is_none() {
        model.context_length = from_catalog.context_length;
    }
    model.capabilities = match (model.capabilities, from_catalog.capabilities) {
        (Some(api), Some(cat)) => Some(api.union(cat)),
        (api, cat) => api.or(cat),
    };
    model
}
