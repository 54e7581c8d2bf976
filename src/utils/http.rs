//! Rate-limited, retrying HTTP execution.
//!
//! [`HttpClient`] is the single path every provider request takes. Each
//! attempt first waits for a permit from the provider's limiter, then goes out
//! through the [`Transport`]. Failed attempts are retried according to the
//! provider's [`RetryConfig`], so a call that needs three attempts consumes
//! three permits.

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::config::{Config, HttpSettings};
use crate::models::Provider;
use crate::utils::rate_limit::ProviderRateLimiter;
use crate::utils::retry::{with_retry, RetryConfig};

/// Errors raised by the resilient call layer
#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    /// Connection-level failure; retried automatically
    #[error("Transport error: {0}")]
    Transport(String),

    /// No rate limiter permit was granted in time
    #[error("Rate limiter for {provider} did not admit the request within {waited:?}")]
    RateLimitTimeout { provider: Provider, waited: Duration },

    /// The remote source reports the resource as absent
    #[error("Not found: {url}")]
    NotFound { url: String },

    /// Any other non-success response
    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// The caller-supplied deadline elapsed
    #[error("Call did not complete within {0:?}")]
    DeadlineExceeded(Duration),

    /// A binary download returned no bytes
    #[error("Empty response body from {url}")]
    EmptyBody { url: String },
}

impl HttpError {
    /// Classify a non-success response
    fn from_status(url: &Url, response: &HttpResponse) -> Self {
        if response.status == StatusCode::NOT_FOUND {
            HttpError::NotFound {
                url: url.to_string(),
            }
        } else {
            HttpError::RequestFailed {
                status: response.status.as_u16(),
                body: response.text(),
            }
        }
    }
}

/// Outbound call descriptor
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A GET request with no headers
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Fully-read response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// First value of a header, if it is valid text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Raw "perform one request" capability
///
/// Implementations must read the whole body before returning so that the
/// underlying connection is released on every path.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// [`Transport`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport from HTTP settings
    pub fn new(settings: &HttpSettings) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| HttpError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::Transport(format!("{} {}: {}", request.method, request.url, e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::Transport(format!("Failed to read body: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

/// Rate-limited, retrying executor scoped to one provider
#[derive(Debug, Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    limiter: Arc<ProviderRateLimiter>,
    retry: RetryConfig,
    deadline: Option<Duration>,
}

impl HttpClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        limiter: Arc<ProviderRateLimiter>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            transport,
            limiter,
            retry,
            deadline: None,
        }
    }

    /// Bound every call (admission, attempts and backoff) by `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn provider(&self) -> Provider {
        self.limiter.provider()
    }

    /// Permits consumed by this provider across all callers
    pub fn permits_granted(&self) -> u64 {
        self.limiter.permits_granted()
    }

    /// Execute and return the body as text
    pub async fn execute(&self, request: HttpRequest) -> Result<String, HttpError> {
        let response = self.send(&request).await?;
        Ok(response.text())
    }

    /// Execute and return body, status and headers
    pub async fn execute_with_response(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, HttpError> {
        self.send(&request).await
    }

    /// Execute and return the raw body bytes
    pub async fn execute_with_bytes(&self, request: HttpRequest) -> Result<Vec<u8>, HttpError> {
        let response = self.send(&request).await?;
        if response.body.is_empty() {
            return Err(HttpError::EmptyBody {
                url: request.url.to_string(),
            });
        }
        Ok(response.body)
    }

    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        match self.deadline {
            Some(deadline) => timeout(deadline, self.send_with_retry(request))
                .await
                .map_err(|_| HttpError::DeadlineExceeded(deadline))?,
            None => self.send_with_retry(request).await,
        }
    }

    async fn send_with_retry(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let provider = self.provider();

        with_retry(&self.retry, |attempt| async move {
            self.limiter.acquire().await?;
            tracing::debug!(
                "{} {} {} (attempt {})",
                provider.id(),
                request.method,
                request.url,
                attempt
            );

            let response = self.transport.send(request).await?;
            if response.status.is_success() {
                Ok(response)
            } else {
                Err(HttpError::from_status(&request.url, &response))
            }
        })
        .await
    }
}

/// Explicit registry of executors, one per provider
///
/// Built once at startup and handed to each provider. Providers never share a
/// limiter, so saturation of one catalog does not slow another.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<Provider, Arc<HttpClient>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one executor per provider from configuration
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let mut registry = Self::new();

        for provider in Provider::ALL {
            let settings = config.providers.get(provider);
            let limiter = Arc::new(ProviderRateLimiter::new(
                provider,
                &settings.rate_limit.to_rate_limit_config(),
            ));
            let mut client = HttpClient::new(
                Arc::clone(&transport),
                limiter,
                settings.retry.to_retry_config(),
            );
            if let Some(deadline) = config.http.call_deadline() {
                client = client.with_deadline(deadline);
            }
            registry.register(provider, Arc::new(client));
        }

        registry
    }

    /// Register (or replace) the executor for a provider
    pub fn register(&mut self, provider: Provider, client: Arc<HttpClient>) {
        self.clients.insert(provider, client);
    }

    pub fn get(&self, provider: Provider) -> Option<Arc<HttpClient>> {
        self.clients.get(&provider).cloned()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
