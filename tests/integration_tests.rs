//! Integration tests for Tome Harvest
//!
//! These tests wire configuration, per-provider executors and the provider
//! registry together the way the binary does.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tome_harvest::config::{Config, ConfigFile};
use tome_harvest::models::Provider;
use tome_harvest::utils::{
    ClientRegistry, HttpError, HttpRequest, HttpResponse, Transport,
};
use tome_harvest::ProviderRegistry;
use url::Url;

/// Answers every request with `200 ok` after an optional delay
#[derive(Debug, Default)]
struct StaticTransport {
    delay: Option<Duration>,
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for StaticTransport {
    async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(HttpResponse {
            status: http::StatusCode::OK,
            headers: http::HeaderMap::new(),
            body: b"ok".to_vec(),
        })
    }
}

fn request() -> HttpRequest {
    HttpRequest::get(Url::parse("http://catalog.test/ping").unwrap())
}

fn expected_provider_count() -> usize {
    let mut count = 0;
    if cfg!(feature = "source-kodansha") {
        count += 1;
    }
    if cfg!(feature = "source-nautiljon") {
        count += 1;
    }
    count
}

fn load(toml: &str) -> Config {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, toml).unwrap();
    ConfigFile::load(&path).unwrap()
}

#[test]
fn test_default_registry_has_all_compiled_providers() {
    let config = Config::default();
    let clients = ClientRegistry::from_config(&config, Arc::new(StaticTransport::default()));
    let registry = ProviderRegistry::from_config(&config, &clients).unwrap();

    assert_eq!(clients.len(), Provider::ALL.len());
    assert_eq!(registry.len(), expected_provider_count());
    for provider in registry.all() {
        assert!(clients.get(provider.provider_name()).is_some());
    }
}

#[test]
fn test_config_file_disables_provider() {
    let config = load(
        r#"
[providers.nautiljon]
enabled = false
"#,
    );
    let clients = ClientRegistry::from_config(&config, Arc::new(StaticTransport::default()));
    let registry = ProviderRegistry::from_config(&config, &clients).unwrap();

    assert!(!registry.has(Provider::Nautiljon));
    assert_eq!(
        registry.has(Provider::Kodansha),
        cfg!(feature = "source-kodansha")
    );
}

#[tokio::test]
async fn test_saturated_provider_does_not_block_another() {
    let config = load(
        r#"
[providers.kodansha.rate_limit]
permits_per_period = 1
period_ms = 60000
admission_timeout_ms = 50

[providers.kodansha.retry]
max_attempts = 1

[providers.nautiljon.rate_limit]
permits_per_period = 5
period_ms = 1000
"#,
    );
    let transport = Arc::new(StaticTransport::default());
    let clients = ClientRegistry::from_config(&config, transport.clone());
    let kodansha = clients.get(Provider::Kodansha).unwrap();
    let nautiljon = clients.get(Provider::Nautiljon).unwrap();

    assert_eq!(kodansha.execute(request()).await.unwrap(), "ok");
    let err = kodansha.execute(request()).await.unwrap_err();
    assert!(matches!(
        err,
        HttpError::RateLimitTimeout {
            provider: Provider::Kodansha,
            ..
        }
    ));

    for _ in 0..3 {
        assert_eq!(nautiljon.execute(request()).await.unwrap(), "ok");
    }

    assert_eq!(kodansha.permits_granted(), 1);
    assert_eq!(nautiljon.permits_granted(), 3);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_configured_deadline_bounds_slow_calls() {
    let config = load(
        r#"
[http]
call_deadline_secs = 1
"#,
    );
    let transport = Arc::new(StaticTransport {
        delay: Some(Duration::from_secs(3)),
        ..Default::default()
    });
    let clients = ClientRegistry::from_config(&config, transport);

    let err = clients
        .get(Provider::Kodansha)
        .unwrap()
        .execute(request())
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::DeadlineExceeded(_)));
}

#[test]
fn test_saved_config_round_trips_through_loader() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.providers.get_mut(Provider::Kodansha).fetch_book_covers = true;
    config.http.call_deadline_secs = Some(20);
    ConfigFile::save(&config, &path).unwrap();

    let loaded = ConfigFile::load(&path).unwrap();
    assert_eq!(loaded, config);
}
