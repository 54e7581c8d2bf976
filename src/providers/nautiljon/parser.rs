//! HTML scraping for Nautiljon pages.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use super::model::{
    NautiljonSearchResult, NautiljonSeries, NautiljonSeriesId, NautiljonSeriesVolume,
    NautiljonVolume, NautiljonVolumeId,
};
use crate::providers::ProviderError;

fn selector(css: &str) -> Result<Selector, ProviderError> {
    Selector::parse(css).map_err(|e| ProviderError::Parse(format!("selector '{}': {:?}", css, e)))
}

fn text_of(elem: &ElementRef) -> String {
    elem.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn absolutize(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href.trim_start_matches('/'))
    }
}

/// `/mangas/<slug>.html` → `<slug>`
fn series_id_from_href(href: &str) -> Option<NautiljonSeriesId> {
    let path = href.split("/mangas/").nth(1)?;
    let slug = path.strip_suffix(".html")?;
    (!slug.is_empty() && !slug.contains('/')).then(|| NautiljonSeriesId(slug.to_string()))
}

/// `/mangas/<slug>/volume-<id>.html` → `<id>`
fn volume_id_from_href(href: &str) -> Option<NautiljonVolumeId> {
    let tail = href.rsplit("/volume-").next()?;
    if tail.len() == href.len() {
        return None;
    }
    let id = tail.strip_suffix(".html")?;
    (!id.is_empty()).then(|| NautiljonVolumeId(id.to_string()))
}

/// Volume ids start with the volume number, e.g. `3,56789`
pub(crate) fn volume_number(id: &NautiljonVolumeId) -> Option<f64> {
    id.0.split(',').next()?.trim().parse().ok()
}

/// Labelled entries of the info list, e.g. `Titre original : ...`
struct InfoList<'a> {
    entries: Vec<(String, ElementRef<'a>)>,
}

impl<'a> InfoList<'a> {
    fn parse(document: &'a Html) -> Result<Self, ProviderError> {
        let items = selector("ul.mb10 > li")?;
        let label = selector("span.bold")?;

        let entries = document
            .select(&items)
            .filter_map(|li| {
                let name = li.select(&label).next().map(|l| text_of(&l))?;
                let name = name.trim_end_matches(':').trim().to_string();
                Some((name, li))
            })
            .collect();

        Ok(Self { entries })
    }

    fn find(&self, name: &str) -> Option<&ElementRef<'a>> {
        self.entries
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(name))
            .map(|(_, li)| li)
    }

    /// Entry text with its label removed
    fn value(&self, name: &str) -> Option<String> {
        let li = self.find(name)?;
        let full = text_of(li);
        let value = match full.split_once(':') {
            Some((_, rest)) => rest.trim().to_string(),
            None => full,
        };
        (!value.is_empty()).then_some(value)
    }

    /// Link texts of an entry, falling back to `-` separated text
    fn list(&self, name: &str) -> Vec<String> {
        let Some(li) = self.find(name) else {
            return Vec::new();
        };
        let links: Vec<String> = selector("a")
            .map(|a| li.select(&a).map(|l| text_of(&l)).collect())
            .unwrap_or_default();
        if !links.is_empty() {
            return links.into_iter().filter(|l| !l.is_empty()).collect();
        }
        self.value(name)
            .map(|v| {
                v.split(" - ")
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn page_title(document: &Html) -> Result<String, ProviderError> {
    let title = selector("h1.h1titre span[itemprop='name'], h1.h1titre")?;
    document
        .select(&title)
        .next()
        .map(|t| text_of(&t))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ProviderError::Parse("page has no title".to_string()))
}

fn description(document: &Html) -> Result<Option<String>, ProviderError> {
    let description = selector("div.description")?;
    Ok(document
        .select(&description)
        .next()
        .map(|d| text_of(&d))
        .filter(|d| !d.is_empty()))
}

fn cover_url(document: &Html, base_url: &str) -> Result<Option<String>, ProviderError> {
    let cover = selector("div.image_fiche a")?;
    Ok(document
        .select(&cover)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| absolutize(base_url, href)))
}

pub fn parse_search_results(
    html: &str,
    base_url: &str,
) -> Result<Vec<NautiljonSearchResult>, ProviderError> {
    let document = Html::parse_document(html);
    let rows = selector("table.search tbody tr")?;
    let title = selector("a.eTitre")?;
    let alternative = selector("span.infos_small")?;
    let image = selector("img")?;

    let results = document
        .select(&rows)
        .filter_map(|row| {
            let link = row.select(&title).next()?;
            let id = series_id_from_href(link.value().attr("href")?)?;
            let alternative_title = row
                .select(&alternative)
                .next()
                .map(|s| text_of(&s))
                .map(|s| s.trim_matches(|c| c == '(' || c == ')').trim().to_string())
                .filter(|s| !s.is_empty());
            let image_url = row
                .select(&image)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(|src| absolutize(base_url, src));

            Some(NautiljonSearchResult {
                id,
                title: text_of(&link),
                alternative_title,
                image_url,
            })
        })
        .collect();

    Ok(results)
}

pub fn parse_series(
    series_id: &NautiljonSeriesId,
    html: &str,
    base_url: &str,
) -> Result<NautiljonSeries, ProviderError> {
    let document = Html::parse_document(html);
    let info = InfoList::parse(&document)?;
    let volume_links = selector("div.unVol a")?;

    // "34 (Terminé)" → count 34, status "Terminé"
    let volumes_entry = info.value("Nb volumes VF");
    let volume_count = volumes_entry.as_deref().and_then(|v| {
        v.split_whitespace().next().and_then(|n| n.parse().ok())
    });
    let status = volumes_entry.as_deref().and_then(|v| {
        let start = v.find('(')?;
        let end = v[start..].find(')')? + start;
        Some(v[start + 1..end].trim().to_string())
    });

    let volumes = document
        .select(&volume_links)
        .filter_map(|a| {
            let id = volume_id_from_href(a.value().attr("href")?)?;
            Some(NautiljonSeriesVolume {
                number: volume_number(&id),
                id,
                edition: a.value().attr("title").map(str::to_string),
            })
        })
        .collect();

    let alternative_titles = info
        .value("Titre alternatif")
        .map(|v| {
            v.split(" / ")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(NautiljonSeries {
        id: series_id.clone(),
        title: page_title(&document)?,
        original_title: info.value("Titre original"),
        alternative_titles,
        description: description(&document)?,
        status,
        publisher: info.value("Éditeur VF"),
        genres: info.list("Genres"),
        themes: info.list("Thèmes"),
        authors: info.list("Auteur"),
        release_year: info.value("Année VF").and_then(|y| y.parse().ok()),
        volume_count,
        cover_url: cover_url(&document, base_url)?,
        volumes,
    })
}

pub fn parse_volume(
    series_id: &NautiljonSeriesId,
    volume_id: &NautiljonVolumeId,
    html: &str,
    base_url: &str,
) -> Result<NautiljonVolume, ProviderError> {
    let document = Html::parse_document(html);
    let info = InfoList::parse(&document)?;

    Ok(NautiljonVolume {
        id: volume_id.clone(),
        series_id: series_id.clone(),
        title: page_title(&document)?,
        number: volume_number(volume_id),
        description: description(&document)?,
        release_date: info
            .value("Date de parution VF")
            .and_then(|d| NaiveDate::parse_from_str(&d, "%d/%m/%Y").ok()),
        isbn: info.value("ISBN"),
        page_count: info.value("Nombre de pages").and_then(|p| p.parse().ok()),
        authors: info.list("Auteur"),
        cover_url: cover_url(&document, base_url)?,
    })
}
