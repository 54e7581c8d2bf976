//! Kodansha → canonical metadata.

use chrono::{DateTime, NaiveDate};

use super::model::{KodanshaBook, KodanshaCreator, KodanshaSearchResult, KodanshaSeries};
use crate::models::{
    Author, AuthorRole, BookMetadata, Image, Provider, ProviderBookId, ProviderBookMetadata,
    ProviderSeriesId, ProviderSeriesMetadata, SeriesBook, SeriesMetadata, SeriesSearchResult,
    SeriesStatus,
};

const KODANSHA_SITE: &str = "https://kodansha.us";

#[derive(Debug, Clone, Default)]
pub struct KodanshaMetadataMapper;

impl KodanshaMetadataMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn to_series_metadata(
        &self,
        series: KodanshaSeries,
        thumbnail: Option<Image>,
    ) -> ProviderSeriesMetadata {
        let books: Vec<SeriesBook> = series
            .books
            .iter()
            .map(|book| SeriesBook {
                id: ProviderBookId::new(book.id.to_string()),
                number: book.volume_number,
                name: book.name.clone(),
                edition: book.variant.clone(),
            })
            .collect();

        let metadata = SeriesMetadata {
            title: Some(series.title.clone()),
            alternative_titles: Vec::new(),
            summary: series.description.clone().filter(|s| !s.trim().is_empty()),
            status: series.completion_status.as_deref().and_then(parse_status),
            publisher: Some(
                series
                    .publisher
                    .clone()
                    .unwrap_or_else(|| "Kodansha USA".to_string()),
            ),
            age_rating: series.age_rating.as_deref().and_then(parse_age_rating),
            genres: series.genres.iter().map(|g| g.name.clone()).collect(),
            tags: Vec::new(),
            authors: map_creators(&series.creators),
            release_date: None,
            total_book_count: (!books.is_empty()).then_some(books.len()),
            thumbnail,
        };

        ProviderSeriesMetadata {
            id: ProviderSeriesId::new(series.id.to_string()),
            provider: Provider::Kodansha,
            metadata,
            books,
        }
    }

    pub fn to_book_metadata(
        &self,
        book: KodanshaBook,
        thumbnail: Option<Image>,
    ) -> ProviderBookMetadata {
        let metadata = BookMetadata {
            title: Some(book.name.clone()),
            summary: book.description.clone().filter(|s| !s.trim().is_empty()),
            number: book.volume_number,
            release_date: book.release_date.as_deref().and_then(parse_date),
            isbn: book.isbn.clone(),
            page_count: book.page_count,
            authors: map_creators(&book.creators),
            tags: book.tags.clone(),
            thumbnail,
        };

        ProviderBookMetadata {
            id: ProviderBookId::new(book.id.to_string()),
            series_id: book.series_id.map(|id| ProviderSeriesId::new(id.to_string())),
            provider: Provider::Kodansha,
            metadata,
        }
    }

    pub fn to_series_search_result(&self, result: &KodanshaSearchResult) -> SeriesSearchResult {
        SeriesSearchResult {
            provider: Provider::Kodansha,
            result_id: ProviderSeriesId::new(result.id.to_string()),
            title: result.title.clone(),
            url: result
                .readable_url
                .as_ref()
                .map(|slug| format!("{}/series/{}", KODANSHA_SITE, slug)),
            image_url: result.thumbnails.first().map(|t| t.url.clone()),
        }
    }
}

fn map_creators(creators: &[KodanshaCreator]) -> Vec<Author> {
    creators
        .iter()
        .flat_map(|creator| {
            let roles: &[AuthorRole] = match creator.role.as_deref().map(str::to_lowercase) {
                Some(role) if role.contains("translat") => &[AuthorRole::Translator],
                Some(role) if role.contains("letter") => &[AuthorRole::Letterer],
                Some(role) if role.contains("editor") => &[AuthorRole::Editor],
                Some(role) if role.contains("art") => &[AuthorRole::Penciller, AuthorRole::Inker],
                _ => &[AuthorRole::Writer, AuthorRole::Penciller, AuthorRole::Inker],
            };
            roles
                .iter()
                .map(|role| Author::new(creator.name.trim(), *role))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn parse_status(status: &str) -> Option<SeriesStatus> {
    match status.trim().to_lowercase().as_str() {
        "ongoing" => Some(SeriesStatus::Ongoing),
        "completed" | "complete" => Some(SeriesStatus::Ended),
        "hiatus" => Some(SeriesStatus::Hiatus),
        _ => None,
    }
}

/// Kodansha ratings look like "16+" or "T (Teen)"
fn parse_age_rating(rating: &str) -> Option<u32> {
    let digits: String = rating.chars().filter(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        return digits.parse().ok();
    }
    match rating.trim().chars().next()? {
        'A' => Some(0),
        'T' => Some(13),
        'O' | 'M' => Some(18),
        _ => None,
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(date)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
}
