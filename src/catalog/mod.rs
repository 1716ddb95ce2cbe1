pub mod enrich;
pub mod store;
pub mod types;

pub use enrich::merge;
pub use store::{CatalogSnapshot, CatalogStatus, CatalogStore, RefreshOutcome};
pub use types::{CatalogEntry, ProviderCatalog};
