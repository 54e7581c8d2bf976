//! Canonical data models shared by every provider.

mod metadata;

pub use metadata::{
    Author, AuthorRole, BookMetadata, Image, Provider, ProviderBookId, ProviderBookMetadata,
    ProviderSeriesId, ProviderSeriesMetadata, SeriesBook, SeriesMetadata, SeriesSearchResult,
    SeriesStatus,
};
