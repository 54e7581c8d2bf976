//! HTTP client for the Kodansha USA JSON API.

use http::header::{self, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use super::model::{
    KodanshaBook, KodanshaBookId, KodanshaBookListPage, KodanshaResponse, KodanshaSearchHit,
    KodanshaSearchResult, KodanshaSeries, KodanshaSeriesBook, KodanshaSeriesId,
};
use crate::models::Image;
use crate::providers::ProviderError;
use crate::utils::{HttpClient, HttpError, HttpRequest, Page};

const KODANSHA_API_BASE: &str = "https://api.kodansha.us";

#[derive(Debug, Clone)]
pub struct KodanshaClient {
    http: Arc<HttpClient>,
    base_url: String,
}

impl KodanshaClient {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self::with_base_url(http, KODANSHA_API_BASE)
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
    ) -> Result<Vec<KodanshaSearchResult>, ProviderError> {
        let url = format!(
            "{}/search/V3?query={}",
            self.base_url,
            urlencoding::encode(name)
        );
        let hits: Vec<KodanshaSearchHit> = self.get_json(&url).await?;

        hits.into_iter()
            .filter(|hit| hit.kind == "series")
            .map(|hit| {
                serde_json::from_value(hit.content).map_err(|e| {
                    ProviderError::Parse(format!("Invalid Kodansha series hit from {}: {}", url, e))
                })
            })
            .collect()
    }

    pub async fn get_series(
        &self,
        series_id: &KodanshaSeriesId,
    ) -> Result<KodanshaSeries, ProviderError> {
        let url = format!("{}/series/V2/{}", self.base_url, series_id);
        let series: KodanshaResponse<KodanshaSeries> = self.get_json(&url).await?;
        Ok(series.response)
    }

    /// One page of the full per-series book listing
    pub async fn get_series_books(
        &self,
        series_id: &KodanshaSeriesId,
        page: u32,
    ) -> Result<Page<KodanshaSeriesBook>, ProviderError> {
        let url = format!(
            "{}/product/forSeries/{}?page={}",
            self.base_url, series_id, page
        );
        let listing: KodanshaBookListPage = self.get_json(&url).await?;
        Ok(Page::new(listing.response, listing.page, listing.total_pages))
    }

    pub async fn get_book(&self, book_id: &KodanshaBookId) -> Result<KodanshaBook, ProviderError> {
        let url = format!("{}/product/{}", self.base_url, book_id);
        let book: KodanshaResponse<KodanshaBook> = self.get_json(&url).await?;
        Ok(book.response)
    }

    pub async fn get_thumbnail(&self, url: &str) -> Result<Image, ProviderError> {
        let response = self
            .http
            .execute_with_response(HttpRequest::get(Url::parse(url)?))
            .await?;

        if response.body.is_empty() {
            return Err(HttpError::EmptyBody {
                url: url.to_string(),
            }
            .into());
        }
        let mime_type = response.header("content-type").map(str::to_string);
        Ok(Image::new(response.body, mime_type))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        let request = HttpRequest::get(Url::parse(url)?)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));
        let body = self.http.execute(request).await?;

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::Parse(format!("Failed to parse Kodansha response from {}: {}", url, e))
        })
    }
}
