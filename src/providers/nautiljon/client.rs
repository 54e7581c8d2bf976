//! HTTP client for nautiljon.com.
//!
//! Nautiljon has no public API, so pages are fetched as HTML and scraped.

use http::header::{self, HeaderValue};
use std::sync::Arc;
use url::Url;

use super::model::{
    NautiljonSearchResult, NautiljonSeries, NautiljonSeriesId, NautiljonVolume, NautiljonVolumeId,
};
use super::parser;
use crate::models::Image;
use crate::providers::ProviderError;
use crate::utils::{HttpClient, HttpRequest};

const NAUTILJON_BASE_URL: &str = "https://www.nautiljon.com";

#[derive(Debug, Clone)]
pub struct NautiljonClient {
    http: Arc<HttpClient>,
    base_url: String,
}

impl NautiljonClient {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self::with_base_url(http, NAUTILJON_BASE_URL)
    }

    /// Point the client at another host (used for testing)
    pub fn with_base_url(http: Arc<HttpClient>, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search_series(
        &self,
        name: &str,
    ) -> Result<Vec<NautiljonSearchResult>, ProviderError> {
        let url = format!("{}/mangas/?q={}", self.base_url, urlencoding::encode(name));
        let html = self.get_html(&url).await?;
        parser::parse_search_results(&html, &self.base_url)
    }

    pub async fn get_series(
        &self,
        series_id: &NautiljonSeriesId,
    ) -> Result<NautiljonSeries, ProviderError> {
        let url = format!("{}/mangas/{}.html", self.base_url, series_id);
        let html = self.get_html(&url).await?;
        parser::parse_series(series_id, &html, &self.base_url)
    }

    pub async fn get_volume(
        &self,
        series_id: &NautiljonSeriesId,
        volume_id: &NautiljonVolumeId,
    ) -> Result<NautiljonVolume, ProviderError> {
        let url = format!(
            "{}/mangas/{}/volume-{}.html",
            self.base_url, series_id, volume_id
        );
        let html = self.get_html(&url).await?;
        parser::parse_volume(series_id, volume_id, &html, &self.base_url)
    }

    pub async fn get_series_thumbnail(
        &self,
        series: &NautiljonSeries,
    ) -> Result<Option<Image>, ProviderError> {
        self.get_thumbnail(series.cover_url.as_deref()).await
    }

    pub async fn get_volume_thumbnail(
        &self,
        volume: &NautiljonVolume,
    ) -> Result<Option<Image>, ProviderError> {
        self.get_thumbnail(volume.cover_url.as_deref()).await
    }

    async fn get_thumbnail(&self, url: Option<&str>) -> Result<Option<Image>, ProviderError> {
        let Some(url) = url else {
            return Ok(None);
        };
        let bytes = self
            .http
            .execute_with_bytes(HttpRequest::get(Url::parse(url)?))
            .await?;
        Ok(Some(Image::new(bytes, None)))
    }

    async fn get_html(&self, url: &str) -> Result<String, ProviderError> {
        let request = HttpRequest::get(Url::parse(url)?)
            .header(header::ACCEPT, HeaderValue::from_static("text/html"))
            .header(header::ACCEPT_LANGUAGE, HeaderValue::from_static("fr-FR,fr;q=0.9"));
        Ok(self.http.execute(request).await?)
    }
}
