//! # Tome Harvest
//!
//! Fetches series and book metadata for comics and manga from external
//! catalogs, with every outbound request paced, retried and bounded per
//! provider.
//!
//! ## Architecture
//!
//! - [`models`]: Canonical metadata types shared by all providers
//! - [`providers`]: Catalog plugins behind the [`MetadataProvider`] trait
//! - [`utils`]: Rate-limited HTTP execution, retry, pagination and matching
//! - [`config`]: Configuration management

pub mod config;
pub mod models;
pub mod providers;
pub mod utils;

// Re-export commonly used types
pub use models::Provider;
pub use providers::{MetadataProvider, ProviderError, ProviderRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
