//! Mock provider for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::{
    Provider, ProviderBookId, ProviderBookMetadata, ProviderSeriesId, ProviderSeriesMetadata,
    SeriesSearchResult,
};
use crate::providers::{MetadataProvider, ProviderError};
use crate::utils::HttpError;

/// A mock provider that returns predefined responses.
#[derive(Debug)]
pub struct MockProvider {
    provider: Provider,
    search_results: Mutex<Vec<SeriesSearchResult>>,
    series: Mutex<Option<ProviderSeriesMetadata>>,
    book: Mutex<Option<ProviderBookMetadata>>,
}

impl MockProvider {
    /// Create a new mock answering as `provider`.
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            search_results: Mutex::new(Vec::new()),
            series: Mutex::new(None),
            book: Mutex::new(None),
        }
    }

    /// Set the search results to return.
    pub fn set_search_results(&self, results: Vec<SeriesSearchResult>) {
        *self.search_results.lock().unwrap() = results;
    }

    /// Set the series returned by lookups and matches.
    pub fn set_series(&self, series: ProviderSeriesMetadata) {
        *self.series.lock().unwrap() = Some(series);
    }

    /// Set the book returned by lookups.
    pub fn set_book(&self, book: ProviderBookMetadata) {
        *self.book.lock().unwrap() = Some(book);
    }

    fn not_found(&self, what: &str) -> ProviderError {
        HttpError::NotFound {
            url: format!("mock://{}/{}", self.provider.id(), what),
        }
        .into()
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    fn provider_name(&self) -> Provider {
        self.provider
    }

    async fn get_series_metadata(
        &self,
        series_id: &ProviderSeriesId,
    ) -> Result<ProviderSeriesMetadata, ProviderError> {
        let guard = self.series.lock().unwrap();
        match &*guard {
            Some(series) if series.id == *series_id => Ok(series.clone()),
            _ => Err(self.not_found(series_id.as_str())),
        }
    }

    async fn get_book_metadata(
        &self,
        _series_id: &ProviderSeriesId,
        book_id: &ProviderBookId,
    ) -> Result<ProviderBookMetadata, ProviderError> {
        let guard = self.book.lock().unwrap();
        match &*guard {
            Some(book) if book.id == *book_id => Ok(book.clone()),
            _ => Err(self.not_found(book_id.as_str())),
        }
    }

    async fn search_series(
        &self,
        _series_name: &str,
        limit: usize,
    ) -> Result<Vec<SeriesSearchResult>, ProviderError> {
        let guard = self.search_results.lock().unwrap();
        Ok(guard.iter().take(limit).cloned().collect())
    }

    async fn match_series_metadata(
        &self,
        series_name: &str,
    ) -> Result<Option<ProviderSeriesMetadata>, ProviderError> {
        let guard = self.series.lock().unwrap();
        Ok(guard
            .as_ref()
            .filter(|s| s.metadata.title.as_deref() == Some(series_name))
            .cloned())
    }
}
