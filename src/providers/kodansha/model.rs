//! Native Kodansha USA API shapes.

use serde::Deserialize;

/// Kodansha's numeric series id, kept as text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KodanshaSeriesId(pub String);

/// Kodansha's numeric product (book) id, kept as text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KodanshaBookId(pub String);

impl std::fmt::Display for KodanshaSeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for KodanshaBookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wrapper used by every single-object endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct KodanshaResponse<T> {
    pub response: T,
}

/// One entry of `/search/V3`
///
/// Hits mix series, products and articles; `content` is only decoded once the
/// hit is known to be a series.
#[derive(Debug, Deserialize)]
pub(crate) struct KodanshaSearchHit {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: serde_json::Value,
}

/// A series returned by search
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KodanshaSearchResult {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub readable_url: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<KodanshaThumbnail>,
}

impl KodanshaSearchResult {
    pub fn series_id(&self) -> KodanshaSeriesId {
        KodanshaSeriesId(self.id.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KodanshaThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KodanshaCreator {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KodanshaGenre {
    pub name: String,
}

/// A book as it appears in a series listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KodanshaSeriesBook {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub volume_number: Option<f64>,
    #[serde(default)]
    pub variant: Option<String>,
}

/// Full series record from `/series/V2/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KodanshaSeries {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creators: Vec<KodanshaCreator>,
    #[serde(default)]
    pub genres: Vec<KodanshaGenre>,
    #[serde(default)]
    pub age_rating: Option<String>,
    #[serde(default)]
    pub completion_status: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<KodanshaThumbnail>,
    #[serde(default)]
    pub readable_url: Option<String>,
    /// Books as declared on the series record; may be cut at a page size
    #[serde(default)]
    pub books: Vec<KodanshaSeriesBook>,
}

impl KodanshaSeries {
    pub fn series_id(&self) -> KodanshaSeriesId {
        KodanshaSeriesId(self.id.to_string())
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.thumbnails.first().map(|t| t.url.as_str())
    }
}

/// One page of `/product/forSeries/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KodanshaBookListPage {
    pub response: Vec<KodanshaSeriesBook>,
    pub page: u32,
    pub total_pages: u32,
}

/// Full product record from `/product/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KodanshaBook {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub series_id: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub volume_number: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub creators: Vec<KodanshaCreator>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumbnails: Vec<KodanshaThumbnail>,
}

impl KodanshaBook {
    pub fn cover_url(&self) -> Option<&str> {
        self.thumbnails.first().map(|t| t.url.as_str())
    }
}
