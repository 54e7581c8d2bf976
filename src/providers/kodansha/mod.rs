//! Kodansha USA metadata provider.
//!
//! Kodansha's series record declares at most one page of books. When the
//! declared count equals one of the API's page sizes the listing is assumed to
//! be cut off and the paged product endpoint is walked to get the rest.

mod client;
mod mapper;
mod model;

pub use client::KodanshaClient;
pub use mapper::KodanshaMetadataMapper;
pub use model::{
    KodanshaBook, KodanshaBookId, KodanshaSearchResult, KodanshaSeries, KodanshaSeriesBook,
    KodanshaSeriesId,
};

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{
    Image, Provider, ProviderBookId, ProviderBookMetadata, ProviderSeriesId,
    ProviderSeriesMetadata, SeriesSearchResult,
};
use crate::providers::{strip_asides, truncate_query, MetadataProvider, ProviderError};
use crate::utils::{collect_pages, expand_listing, paginate, should_expand, NameMatcher};

/// Listing sizes at which Kodansha truncates a series' declared books
pub const KODANSHA_PAGE_SIZES: [usize; 2] = [4, 30];

#[derive(Debug, Clone)]
pub struct KodanshaMetadataProvider {
    client: KodanshaClient,
    mapper: KodanshaMetadataMapper,
    name_matcher: Arc<dyn NameMatcher>,
    fetch_series_covers: bool,
    fetch_book_covers: bool,
}

impl KodanshaMetadataProvider {
    pub fn new(
        client: KodanshaClient,
        mapper: KodanshaMetadataMapper,
        name_matcher: Arc<dyn NameMatcher>,
        fetch_series_covers: bool,
        fetch_book_covers: bool,
    ) -> Self {
        Self {
            client,
            mapper,
            name_matcher,
            fetch_series_covers,
            fetch_book_covers,
        }
    }

    /// Kodansha ids are numeric; reject anything else before spending a permit
    fn numeric_id(id: &str) -> Result<String, ProviderError> {
        id.trim()
            .parse::<u64>()
            .map(|n| n.to_string())
            .map_err(|_| ProviderError::InvalidId(format!("not a Kodansha id: '{}'", id)))
    }

    fn sanitize_search_input(name: &str) -> String {
        strip_asides(truncate_query(name))
    }

    /// Series record with its book listing expanded if it looks truncated
    async fn get_series(&self, series_id: &KodanshaSeriesId) -> Result<KodanshaSeries, ProviderError> {
        let mut series = self.client.get_series(series_id).await?;

        if should_expand(series.books.len(), &KODANSHA_PAGE_SIZES) {
            tracing::debug!(
                "Kodansha series {} declares {} books, fetching full listing",
                series_id,
                series.books.len()
            );
            let client = &self.client;
            let all_books = collect_pages(paginate(move |page| {
                client.get_series_books(series_id, page)
            }))
            .await?;
            series.books = expand_listing(series.books, all_books);
        }

        Ok(series)
    }

    async fn get_thumbnail(&self, url: Option<&str>) -> Result<Option<Image>, ProviderError> {
        match url {
            Some(url) => Ok(Some(self.client.get_thumbnail(url).await?)),
            None => Ok(None),
        }
    }

    async fn series_metadata(
        &self,
        series_id: &KodanshaSeriesId,
    ) -> Result<ProviderSeriesMetadata, ProviderError> {
        let series = self.get_series(series_id).await?;
        let thumbnail = if self.fetch_series_covers {
            self.get_thumbnail(series.cover_url()).await?
        } else {
            None
        };

        Ok(self.mapper.to_series_metadata(series, thumbnail))
    }
}

#[async_trait]
impl MetadataProvider for KodanshaMetadataProvider {
    fn provider_name(&self) -> Provider {
        Provider::Kodansha
    }

    async fn get_series_metadata(
        &self,
        series_id: &ProviderSeriesId,
    ) -> Result<ProviderSeriesMetadata, ProviderError> {
        let series_id = KodanshaSeriesId(Self::numeric_id(series_id.as_str())?);
        self.series_metadata(&series_id).await
    }

    async fn get_book_metadata(
        &self,
        _series_id: &ProviderSeriesId,
        book_id: &ProviderBookId,
    ) -> Result<ProviderBookMetadata, ProviderError> {
        let book_id = KodanshaBookId(Self::numeric_id(book_id.as_str())?);
        let book = self.client.get_book(&book_id).await?;
        let thumbnail = if self.fetch_book_covers {
            self.get_thumbnail(book.cover_url()).await?
        } else {
            None
        };

        Ok(self.mapper.to_book_metadata(book, thumbnail))
    }

    async fn search_series(
        &self,
        series_name: &str,
        limit: usize,
    ) -> Result<Vec<SeriesSearchResult>, ProviderError> {
        let query = Self::sanitize_search_input(series_name);
        let results = self.client.search_series(&query).await?;

        Ok(results
            .iter()
            .take(limit)
            .map(|r| self.mapper.to_series_search_result(r))
            .collect())
    }

    async fn match_series_metadata(
        &self,
        series_name: &str,
    ) -> Result<Option<ProviderSeriesMetadata>, ProviderError> {
        let query = Self::sanitize_search_input(series_name);
        let results = self.client.search_series(&query).await?;

        let Some(candidate) = results
            .iter()
            .find(|r| self.name_matcher.matches(series_name, &[r.title.as_str()]))
        else {
            tracing::debug!("No Kodansha match for '{}'", series_name);
            return Ok(None);
        };

        self.series_metadata(&candidate.series_id()).await.map(Some)
    }
}
