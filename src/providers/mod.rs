//! Metadata provider plugins with a shared trait-based contract.
//!
//! Every external catalog is one [`MetadataProvider`] implementation, composed
//! from a rate-limited [`HttpClient`](crate::utils::HttpClient), a
//! catalog-specific client that knows the wire format, and a mapper into the
//! canonical models. Providers are collected in a [`ProviderRegistry`].
//!
//! # Feature Flags
//!
//! Individual providers can be disabled at compile time using Cargo features:
//!
//! - `kodansha` - Enable Kodansha USA provider (default: enabled)
//! - `nautiljon` - Enable Nautiljon provider (default: enabled)
//!
//! Providers can also be switched off at runtime with
//! `providers.<id>.enabled = false` in the config file.

#[cfg(feature = "source-kodansha")]
pub mod kodansha;
#[cfg(feature = "source-nautiljon")]
pub mod nautiljon;
mod registry;

pub mod mock;

pub use mock::MockProvider;
pub use registry::ProviderRegistry;

use async_trait::async_trait;
use std::sync::OnceLock;

use crate::models::{
    Provider, ProviderBookId, ProviderBookMetadata, ProviderSeriesId, ProviderSeriesMetadata,
    SeriesSearchResult,
};
use crate::utils::HttpError;

/// Longest query, in characters, sent to any catalog
pub const MAX_QUERY_LENGTH: usize = 400;

/// The contract every metadata provider exposes to callers.
///
/// Each operation is a self-contained pipeline; nothing is cached between
/// calls. Errors from the call layer surface unchanged.
#[async_trait]
pub trait MetadataProvider: Send + Sync + std::fmt::Debug {
    /// Which catalog this provider talks to
    fn provider_name(&self) -> Provider;

    /// Full series metadata by provider-local id
    ///
    /// A series the catalog reports as absent fails with a not-found error.
    async fn get_series_metadata(
        &self,
        series_id: &ProviderSeriesId,
    ) -> Result<ProviderSeriesMetadata, ProviderError>;

    /// Full book metadata by provider-local ids
    async fn get_book_metadata(
        &self,
        series_id: &ProviderSeriesId,
        book_id: &ProviderBookId,
    ) -> Result<ProviderBookMetadata, ProviderError>;

    /// Search summaries, at most `limit`, in catalog order
    async fn search_series(
        &self,
        series_name: &str,
        limit: usize,
    ) -> Result<Vec<SeriesSearchResult>, ProviderError>;

    /// Metadata for the first search hit whose title matches `series_name`
    ///
    /// `Ok(None)` means the catalog has nothing matching; it is not an error.
    async fn match_series_metadata(
        &self,
        series_name: &str,
    ) -> Result<Option<ProviderSeriesMetadata>, ProviderError>;
}

/// Errors that can occur when interacting with a provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Failure from the rate-limited call layer, passed through unchanged
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The catalog answered with something we could not understand
    #[error("Parse error: {0}")]
    Parse(String),

    /// An id that cannot belong to this provider
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Provider could not be built from configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// True when the catalog reported the requested id as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::Http(HttpError::NotFound { .. }))
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(format!("JSON: {}", err))
    }
}

impl From<url::ParseError> for ProviderError {
    fn from(err: url::ParseError) -> Self {
        ProviderError::Parse(format!("URL: {}", err))
    }
}

/// Cut a query to [`MAX_QUERY_LENGTH`] characters
pub(crate) fn truncate_query(name: &str) -> &str {
    match name.char_indices().nth(MAX_QUERY_LENGTH) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

/// Drop parenthetical asides and ellipses that catalogs rarely index
pub(crate) fn strip_asides(name: &str) -> String {
    static PARENTHETICAL: OnceLock<regex::Regex> = OnceLock::new();
    let parenthetical = PARENTHETICAL
        .get_or_init(|| regex::Regex::new(r"\(([^)]+)\)").expect("valid regex"));

    parenthetical
        .replace_all(name, "")
        .replace("...", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_query() {
        let long = "é".repeat(MAX_QUERY_LENGTH + 10);
        assert_eq!(truncate_query(&long).chars().count(), MAX_QUERY_LENGTH);
        assert_eq!(truncate_query("Berserk"), "Berserk");
    }

    #[test]
    fn test_strip_asides() {
        assert_eq!(strip_asides("Foo (2020)..."), "Foo");
        assert_eq!(strip_asides("  Vinland Saga (Deluxe) "), "Vinland Saga");
        assert_eq!(strip_asides("Wait... What?"), "Wait What?");
        assert_eq!(strip_asides("No asides"), "No asides");
    }

    #[test]
    fn test_not_found_detection() {
        let not_found = ProviderError::from(HttpError::NotFound {
            url: "https://catalog.example/series/1".to_string(),
        });
        assert!(not_found.is_not_found());

        let failed = ProviderError::from(HttpError::RequestFailed {
            status: 500,
            body: String::new(),
        });
        assert!(!failed.is_not_found());
        assert!(!ProviderError::Parse("bad".to_string()).is_not_found());
    }
}
