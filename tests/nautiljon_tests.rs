//! Nautiljon provider against mocked HTML pages.

#![cfg(feature = "source-nautiljon")]

use mockito::{Matcher, Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;
use tome_harvest::config::HttpSettings;
use tome_harvest::models::{Provider, ProviderBookId, ProviderSeriesId};
use tome_harvest::providers::nautiljon::{
    NautiljonClient, NautiljonMetadataMapper, NautiljonMetadataProvider,
};
use tome_harvest::utils::{
    HttpClient, ProviderRateLimiter, RateLimitConfig, ReqwestTransport, RetryConfig,
    SimilarityMatcher,
};
use tome_harvest::{MetadataProvider, ProviderError};

fn provider(server: &ServerGuard, covers: bool) -> NautiljonMetadataProvider {
    let transport = Arc::new(ReqwestTransport::new(&HttpSettings::default()).unwrap());
    let limiter = Arc::new(ProviderRateLimiter::new(
        Provider::Nautiljon,
        &RateLimitConfig {
            permits_per_period: 50,
            period: Duration::from_secs(1),
            admission_timeout: Duration::from_secs(1),
        },
    ));
    let retry = RetryConfig::default().initial_delay(Duration::from_millis(1));
    let http = Arc::new(HttpClient::new(transport, limiter, retry));

    NautiljonMetadataProvider::new(
        NautiljonClient::with_base_url(http, &server.url()),
        NautiljonMetadataMapper::new(&server.url()),
        Arc::new(SimilarityMatcher::default()),
        covers,
        covers,
    )
}

const SEARCH_HTML: &str = r#"
<html><body>
<table class="search"><tbody>
<tr>
  <td><a class="eTitre" href="/mangas/akira.html">Akira</a></td>
</tr>
<tr>
  <td><a class="eTitre" href="/mangas/snk.html">L'Attaque des Titans</a>
      <span class="infos_small">(Shingeki no Kyojin)</span></td>
</tr>
<tr>
  <td><a class="eTitre" href="/mangas/snk-colossal.html">L'Attaque des Titans - Colossal Edition</a>
      <span class="infos_small">(Shingeki no Kyojin)</span></td>
</tr>
</tbody></table>
</body></html>"#;

fn series_html(cover_href: &str) -> String {
    format!(
        r#"
<html><body>
<h1 class="h1titre"><span itemprop="name">L'Attaque des Titans</span></h1>
<div class="image_fiche"><a href="{}"></a></div>
<ul class="mb10">
  <li><span class="bold">Titre original : </span>Shingeki no Kyojin</li>
  <li><span class="bold">Nb volumes VF : </span>34 (Terminé)</li>
</ul>
<div class="unVol"><a href="/mangas/snk/volume-1,12345.html">Vol. 1</a></div>
</body></html>"#,
        cover_href
    )
}

#[tokio::test]
async fn test_match_uses_alternative_title() {
    let mut server = Server::new_async().await;
    let _search = server
        .mock("GET", "/mangas/")
        .match_query(Matcher::UrlEncoded("q".into(), "Shingeki no Kyojin".into()))
        .with_body(SEARCH_HTML)
        .create_async()
        .await;
    let chosen = server
        .mock("GET", "/mangas/snk.html")
        .with_body(series_html("/covers/snk.jpg"))
        .expect(1)
        .create_async()
        .await;
    let later = server
        .mock("GET", "/mangas/snk-colossal.html")
        .expect(0)
        .create_async()
        .await;

    let matched = provider(&server, false)
        .match_series_metadata("Shingeki no Kyojin")
        .await
        .unwrap()
        .expect("a match");

    chosen.assert_async().await;
    later.assert_async().await;
    assert_eq!(matched.id, ProviderSeriesId::new("snk"));
    assert_eq!(matched.provider, Provider::Nautiljon);
    assert_eq!(matched.metadata.title.as_deref(), Some("L'Attaque des Titans"));
    assert_eq!(matched.metadata.total_book_count, Some(34));
    assert_eq!(matched.books.len(), 1);
}

#[tokio::test]
async fn test_match_without_candidate_is_none() {
    let mut server = Server::new_async().await;
    let _search = server
        .mock("GET", "/mangas/")
        .match_query(Matcher::Any)
        .with_body(SEARCH_HTML)
        .create_async()
        .await;
    let series = server
        .mock("GET", Matcher::Regex(r"^/mangas/.+\.html$".to_string()))
        .expect(0)
        .create_async()
        .await;

    let matched = provider(&server, false)
        .match_series_metadata("Berserk")
        .await
        .unwrap();

    series.assert_async().await;
    assert!(matched.is_none());
}

#[tokio::test]
async fn test_search_respects_limit() {
    let mut server = Server::new_async().await;
    let _search = server
        .mock("GET", "/mangas/")
        .match_query(Matcher::Any)
        .with_body(SEARCH_HTML)
        .create_async()
        .await;

    let results = provider(&server, false)
        .search_series("Titans", 2)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[1].result_id, ProviderSeriesId::new("snk"));
    assert_eq!(
        results[1].url,
        Some(format!("{}/mangas/snk.html", server.url()))
    );
}

#[tokio::test]
async fn test_series_cover_fetched_only_when_enabled() {
    let mut server = Server::new_async().await;
    let _series = server
        .mock("GET", "/mangas/snk.html")
        .with_body(series_html("/covers/snk.jpg"))
        .create_async()
        .await;
    let cover = server
        .mock("GET", "/covers/snk.jpg")
        .with_body(vec![0x89, 0x50, 0x4E, 0x47])
        .expect(1)
        .create_async()
        .await;

    let without = provider(&server, false)
        .get_series_metadata(&ProviderSeriesId::new("snk"))
        .await
        .unwrap();
    let with = provider(&server, true)
        .get_series_metadata(&ProviderSeriesId::new("snk"))
        .await
        .unwrap();

    cover.assert_async().await;
    assert!(without.metadata.thumbnail.is_none());
    let image = with.metadata.thumbnail.expect("cover");
    assert_eq!(image.len(), 4);
    assert_eq!(image.mime_type, None);
}

#[tokio::test]
async fn test_book_metadata_uses_both_ids() {
    let mut server = Server::new_async().await;
    let volume = server
        .mock("GET", "/mangas/snk/volume-1,12345.html")
        .with_body(
            r#"<html><body>
<h1 class="h1titre">L'Attaque des Titans Vol. 1</h1>
<ul class="mb10">
  <li><span class="bold">ISBN : </span>9782811611699</li>
  <li><span class="bold">Nombre de pages : </span>192</li>
</ul>
</body></html>"#,
        )
        .expect(1)
        .create_async()
        .await;

    let book = provider(&server, false)
        .get_book_metadata(
            &ProviderSeriesId::new("snk"),
            &ProviderBookId::new("1,12345"),
        )
        .await
        .unwrap();

    volume.assert_async().await;
    assert_eq!(book.series_id, Some(ProviderSeriesId::new("snk")));
    assert_eq!(book.metadata.number, Some(1.0));
    assert_eq!(book.metadata.page_count, Some(192));
}

#[tokio::test]
async fn test_missing_series_is_not_found() {
    let mut server = Server::new_async().await;
    let _missing = server
        .mock("GET", "/mangas/nope.html")
        .with_status(404)
        .create_async()
        .await;

    let err = provider(&server, false)
        .get_series_metadata(&ProviderSeriesId::new("nope"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_id_that_would_change_the_path_is_rejected() {
    let mut server = Server::new_async().await;
    let any = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let provider = provider(&server, false);
    let series = provider
        .get_series_metadata(&ProviderSeriesId::new("snk?page=2"))
        .await
        .unwrap_err();
    let book = provider
        .get_book_metadata(
            &ProviderSeriesId::new("snk"),
            &ProviderBookId::new("../../admin"),
        )
        .await
        .unwrap_err();

    any.assert_async().await;
    assert!(matches!(series, ProviderError::InvalidId(_)));
    assert!(matches!(book, ProviderError::InvalidId(_)));
}
