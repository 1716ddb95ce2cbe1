//! Model selection sanitizing.
//!
//! Resolution order for a chosen model id:
//! 1. a non-empty dynamic allow-list (usually the last resolved model list)
//!    that contains the id;
//! 2. providers with an open model space (Azure deployments, OpenRouter)
//!    accept any non-empty id;
//! 3. the provider's static allow-list;
//! 4. otherwise the provider's default for the category.
//!
//! Stateless and idempotent: the fallback is always a member of the static
//! allow-list, so sanitizing a sanitized id returns it unchanged.

use serde::Serialize;

use crate::models::registry;
use crate::models::{ModelCategory, ProviderId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sanitized {
    pub model_id: String,
    /// True when the chosen id was rejected and the default used.
    pub replaced: bool,
}

pub fn sanitize_model(
    chosen_id: &str,
    provider: ProviderId,
    category: ModelCategory,
    dynamic_allow_list: Option<&[String]>,
) -> Sanitized {
    let keep = || Sanitized {
        model_id: chosen_id.to_string(),
        replaced: false,
    };

    if let Some(list) = dynamic_allow_list.filter(|l| !l.is_empty()) {
        if list.iter().any(|id| id == chosen_id) {
            return keep();
        }
    }

    let profile = registry::profile(provider);
    if profile.open_model_space && !chosen_id.trim().is_empty() {
        return keep();
    }

    if profile.allows_static(chosen_id) {
        return keep();
    }

    let fallback = profile.default_model(category);
    tracing::warn!(
        provider = %provider,
        category = %category,
        chosen = chosen_id,
        fallback,
        "model selection not allowed, using provider default"
    );
    Sanitized {
        model_id: fallback.to_string(),
        replaced: true,
    }
}

/// Always returns a usable model id.
pub fn sanitize(
    chosen_id: &str,
    provider: ProviderId,
    category: ModelCategory,
    dynamic_allow_list: Option<&[String]>,
) -> String {
    sanitize_model(chosen_id, provider, category, dynamic_allow_list).model_id
}
