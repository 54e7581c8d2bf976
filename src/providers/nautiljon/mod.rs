//! Nautiljon metadata provider.
//!
//! French catalog; search rows often carry the original (romanized) title as
//! an alternative, which is also considered when matching.

mod client;
mod mapper;
mod model;
mod parser;

pub use client::NautiljonClient;
pub use mapper::NautiljonMetadataMapper;
pub use model::{
    NautiljonSearchResult, NautiljonSeries, NautiljonSeriesId, NautiljonSeriesVolume,
    NautiljonVolume, NautiljonVolumeId,
};

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{
    Provider, ProviderBookId, ProviderBookMetadata, ProviderSeriesId, ProviderSeriesMetadata,
    SeriesSearchResult,
};
use crate::providers::{truncate_query, MetadataProvider, ProviderError};
use crate::utils::NameMatcher;

#[derive(Debug, Clone)]
pub struct NautiljonMetadataProvider {
    client: NautiljonClient,
    mapper: NautiljonMetadataMapper,
    name_matcher: Arc<dyn NameMatcher>,
    fetch_series_covers: bool,
    fetch_book_covers: bool,
}

impl NautiljonMetadataProvider {
    pub fn new(
        client: NautiljonClient,
        mapper: NautiljonMetadataMapper,
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

    /// Ids become URL path segments; reject anything that would change the path
    fn path_id(id: &str) -> Result<String, ProviderError> {
        let id = id.trim();
        let forbidden =
            |c: char| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control();
        let valid = !id.is_empty() && id != "." && id != ".." && !id.chars().any(forbidden);
        if valid {
            Ok(id.to_string())
        } else {
            Err(ProviderError::InvalidId(format!("not a Nautiljon id: '{}'", id)))
        }
    }

    async fn series_metadata(
        &self,
        series_id: &NautiljonSeriesId,
    ) -> Result<ProviderSeriesMetadata, ProviderError> {
        let series = self.client.get_series(series_id).await?;
        let thumbnail = if self.fetch_series_covers {
            self.client.get_series_thumbnail(&series).await?
        } else {
            None
        };

        Ok(self.mapper.to_series_metadata(series, thumbnail))
    }
}

#[async_trait]
impl MetadataProvider for NautiljonMetadataProvider {
    fn provider_name(&self) -> Provider {
        Provider::Nautiljon
    }

    async fn get_series_metadata(
        &self,
        series_id: &ProviderSeriesId,
    ) -> Result<ProviderSeriesMetadata, ProviderError> {
        let series_id = NautiljonSeriesId(Self::path_id(series_id.as_str())?);
        self.series_metadata(&series_id).await
    }

    async fn get_book_metadata(
        &self,
        series_id: &ProviderSeriesId,
        book_id: &ProviderBookId,
    ) -> Result<ProviderBookMetadata, ProviderError> {
        let series_id = NautiljonSeriesId(Self::path_id(series_id.as_str())?);
        let volume_id = NautiljonVolumeId(Self::path_id(book_id.as_str())?);
        let volume = self.client.get_volume(&series_id, &volume_id).await?;
        let thumbnail = if self.fetch_book_covers {
            self.client.get_volume_thumbnail(&volume).await?
        } else {
            None
        };

        Ok(self.mapper.to_book_metadata(volume, thumbnail))
    }

    async fn search_series(
        &self,
        series_name: &str,
        limit: usize,
    ) -> Result<Vec<SeriesSearchResult>, ProviderError> {
        let results = self.client.search_series(truncate_query(series_name)).await?;

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
        let results = self.client.search_series(truncate_query(series_name)).await?;

        let matched = results.iter().find(|r| {
            let titles: Vec<&str> = std::iter::once(r.title.as_str())
                .chain(r.alternative_title.as_deref())
                .collect();
            self.name_matcher.matches(series_name, &titles)
        });

        match matched {
            Some(candidate) => self.series_metadata(&candidate.id).await.map(Some),
            None => {
                tracing::debug!("No Nautiljon match for '{}'", series_name);
                Ok(None)
            }
        }
    }
}
