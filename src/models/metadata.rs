//! Canonical metadata returned by every provider.
//!
//! Providers translate their native responses into these types, so callers
//! never see provider-specific shapes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The external catalog a piece of metadata came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Kodansha,
    Nautiljon,
}

impl Provider {
    /// All known providers, in registration order
    pub const ALL: [Provider; 2] = [Provider::Kodansha, Provider::Nautiljon];

    /// Returns the display name of the provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Kodansha => "Kodansha USA",
            Provider::Nautiljon => "Nautiljon",
        }
    }

    /// Returns the provider identifier (used in config keys and on the CLI)
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Kodansha => "kodansha",
            Provider::Nautiljon => "nautiljon",
        }
    }

    /// Look up a provider by its identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(id.trim()))
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Opaque series identifier, local to one provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderSeriesId(pub String);

impl ProviderSeriesId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderSeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque book identifier, local to one provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderBookId(pub String);

impl ProviderBookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderBookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Downloaded cover art
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Raw image bytes, skipped when printing metadata
    #[serde(skip)]
    pub bytes: Vec<u8>,

    /// Content type reported by the provider, if any
    pub mime_type: Option<String>,
}

impl Image {
    pub fn new(bytes: Vec<u8>, mime_type: Option<String>) -> Self {
        Self { bytes, mime_type }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Publication status of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStatus {
    Ongoing,
    Ended,
    Hiatus,
    Abandoned,
}

/// Role a person played in creating a work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRole {
    Writer,
    Penciller,
    Inker,
    Colorist,
    Letterer,
    CoverArtist,
    Editor,
    Translator,
}

/// A credited person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub role: AuthorRole,
}

impl Author {
    pub fn new(name: impl Into<String>, role: AuthorRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Series-level metadata in canonical form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    pub title: Option<String>,
    pub alternative_titles: Vec<String>,
    pub summary: Option<String>,
    pub status: Option<SeriesStatus>,
    pub publisher: Option<String>,
    pub age_rating: Option<u32>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub authors: Vec<Author>,
    pub release_date: Option<NaiveDate>,
    pub total_book_count: Option<usize>,
    pub thumbnail: Option<Image>,
}

/// A book as listed in its series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesBook {
    pub id: ProviderBookId,
    pub number: Option<f64>,
    pub name: Option<String>,
    pub edition: Option<String>,
}

/// Series metadata plus the books the provider lists for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSeriesMetadata {
    pub id: ProviderSeriesId,
    pub provider: Provider,
    pub metadata: SeriesMetadata,
    pub books: Vec<SeriesBook>,
}

/// Book-level metadata in canonical form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub number: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub isbn: Option<String>,
    pub page_count: Option<u32>,
    pub authors: Vec<Author>,
    pub tags: Vec<String>,
    pub thumbnail: Option<Image>,
}

/// Book metadata addressed by provider-local ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderBookMetadata {
    pub id: ProviderBookId,
    pub series_id: Option<ProviderSeriesId>,
    pub provider: Provider,
    pub metadata: BookMetadata,
}

/// Lightweight summary of a search hit; never carries full metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSearchResult {
    pub provider: Provider,
    pub result_id: ProviderSeriesId,
    pub title: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
}
