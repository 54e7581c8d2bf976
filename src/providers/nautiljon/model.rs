//! Records scraped from Nautiljon pages.

use chrono::NaiveDate;

/// Series slug, e.g. `shingeki+no+kyojin`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NautiljonSeriesId(pub String);

/// Volume path segment, e.g. `1,12345`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NautiljonVolumeId(pub String);

impl std::fmt::Display for NautiljonSeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for NautiljonVolumeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the search results table
#[derive(Debug, Clone, PartialEq)]
pub struct NautiljonSearchResult {
    pub id: NautiljonSeriesId,
    pub title: String,
    pub alternative_title: Option<String>,
    pub image_url: Option<String>,
}

/// Volume entry listed on a series page
#[derive(Debug, Clone, PartialEq)]
pub struct NautiljonSeriesVolume {
    pub id: NautiljonVolumeId,
    pub number: Option<f64>,
    pub edition: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NautiljonSeries {
    pub id: NautiljonSeriesId,
    pub title: String,
    pub original_title: Option<String>,
    pub alternative_titles: Vec<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub publisher: Option<String>,
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub authors: Vec<String>,
    pub release_year: Option<i32>,
    pub volume_count: Option<usize>,
    pub cover_url: Option<String>,
    pub volumes: Vec<NautiljonSeriesVolume>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NautiljonVolume {
    pub id: NautiljonVolumeId,
    pub series_id: NautiljonSeriesId,
    pub title: String,
    pub number: Option<f64>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub isbn: Option<String>,
    pub page_count: Option<u32>,
    pub authors: Vec<String>,
    pub cover_url: Option<String>,
}
