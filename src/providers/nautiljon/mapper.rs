//! Nautiljon → canonical metadata.

use chrono::NaiveDate;

use super::model::{NautiljonSearchResult, NautiljonSeries, NautiljonVolume};
use crate::models::{
    Author, AuthorRole, BookMetadata, Image, Provider, ProviderBookId, ProviderBookMetadata,
    ProviderSeriesId, ProviderSeriesMetadata, SeriesBook, SeriesMetadata, SeriesSearchResult,
    SeriesStatus,
};

#[derive(Debug, Clone)]
pub struct NautiljonMetadataMapper {
    base_url: String,
}

impl NautiljonMetadataMapper {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn to_series_metadata(
        &self,
        series: NautiljonSeries,
        thumbnail: Option<Image>,
    ) -> ProviderSeriesMetadata {
        let books = series
            .volumes
            .iter()
            .map(|volume| SeriesBook {
                id: ProviderBookId::new(volume.id.0.clone()),
                number: volume.number,
                name: volume
                    .number
                    .map(|n| format!("{} Vol. {}", series.title, n)),
                edition: volume.edition.clone(),
            })
            .collect();

        let mut alternative_titles: Vec<String> = series.original_title.iter().cloned().collect();
        alternative_titles.extend(series.alternative_titles.iter().cloned());

        let metadata = SeriesMetadata {
            title: Some(series.title.clone()),
            alternative_titles,
            summary: series.description.clone(),
            status: series.status.as_deref().and_then(parse_status),
            publisher: series.publisher.clone(),
            age_rating: None,
            genres: series.genres.clone(),
            tags: series.themes.clone(),
            authors: series
                .authors
                .iter()
                .flat_map(|name| {
                    [AuthorRole::Writer, AuthorRole::Penciller]
                        .into_iter()
                        .map(move |role| Author::new(name.clone(), role))
                })
                .collect(),
            release_date: series
                .release_year
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
            total_book_count: series.volume_count,
            thumbnail,
        };

        ProviderSeriesMetadata {
            id: ProviderSeriesId::new(series.id.0),
            provider: Provider::Nautiljon,
            metadata,
            books,
        }
    }

    pub fn to_book_metadata(
        &self,
        volume: NautiljonVolume,
        thumbnail: Option<Image>,
    ) -> ProviderBookMetadata {
        let metadata = BookMetadata {
            title: Some(volume.title),
            summary: volume.description,
            number: volume.number,
            release_date: volume.release_date,
            isbn: volume.isbn,
            page_count: volume.page_count,
            authors: volume
                .authors
                .into_iter()
                .map(|name| Author::new(name, AuthorRole::Writer))
                .collect(),
            tags: Vec::new(),
            thumbnail,
        };

        ProviderBookMetadata {
            id: ProviderBookId::new(volume.id.0),
            series_id: Some(ProviderSeriesId::new(volume.series_id.0)),
            provider: Provider::Nautiljon,
            metadata,
        }
    }

    pub fn to_series_search_result(&self, result: &NautiljonSearchResult) -> SeriesSearchResult {
        SeriesSearchResult {
            provider: Provider::Nautiljon,
            result_id: ProviderSeriesId::new(result.id.0.clone()),
            title: result.title.clone(),
            url: Some(format!("{}/mangas/{}.html", self.base_url, result.id)),
            image_url: result.image_url.clone(),
        }
    }
}

fn parse_status(status: &str) -> Option<SeriesStatus> {
    match status.trim().to_lowercase().as_str() {
        "en cours" => Some(SeriesStatus::Ongoing),
        "terminé" => Some(SeriesStatus::Ended),
        "en pause" => Some(SeriesStatus::Hiatus),
        "abandonné" | "arrêté" => Some(SeriesStatus::Abandoned),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::nautiljon::model::{NautiljonSeriesId, NautiljonVolumeId};

    #[test]
    fn test_status_mapping() {
        assert_eq!(parse_status("Terminé"), Some(SeriesStatus::Ended));
        assert_eq!(parse_status("En cours"), Some(SeriesStatus::Ongoing));
        assert_eq!(parse_status("?"), None);
    }

    #[test]
    fn test_book_mapping_keeps_series_id() {
        let volume = NautiljonVolume {
            id: NautiljonVolumeId("1,12345".to_string()),
            series_id: NautiljonSeriesId("berserk".to_string()),
            title: "Berserk Vol. 1".to_string(),
            number: Some(1.0),
            description: None,
            release_date: None,
            isbn: Some("9782723434621".to_string()),
            page_count: Some(224),
            authors: vec!["MIURA Kentarō".to_string()],
            cover_url: None,
        };

        let mapped = NautiljonMetadataMapper::new("https://www.nautiljon.com")
            .to_book_metadata(volume, None);

        assert_eq!(mapped.id, ProviderBookId::new("1,12345"));
        assert_eq!(mapped.series_id, Some(ProviderSeriesId::new("berserk")));
        assert_eq!(mapped.metadata.page_count, Some(224));
        assert_eq!(mapped.metadata.authors.len(), 1);
    }
}
