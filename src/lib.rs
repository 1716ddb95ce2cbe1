//! modelcat: model-catalog resolution service.
//!
//! Resolves the usable model list for an AI provider through three tiers
//! (provider API, universal catalog, built-in list). The binary wraps this
//! library in an HTTP API and a CLI; integration tests in `tests/` drive it
//! directly.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod providers;
pub mod sanitize;
pub mod service;
pub mod upstream;
