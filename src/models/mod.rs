pub mod model;
pub mod registry;

pub use model::{CapabilitySet, Model, ModelCategory, Pricing, ProviderId, Tier};
