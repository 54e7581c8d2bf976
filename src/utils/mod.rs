//! Call-layer utilities shared by every provider.
//!
//! - [`HttpClient`]: rate-limited, retrying HTTP execution over a [`Transport`]
//! - [`ClientRegistry`]: one executor per provider, built from configuration
//! - [`ProviderRateLimiter`]: per-provider permit pacing with an admission timeout
//! - [`RetryConfig`] / [`with_retry`]: exponential backoff on transient failures
//! - [`paginate`] / [`collect_pages`]: lazy, bounded walk over paged listings
//! - [`SimilarityMatcher`]: configurable title matching
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use tome_harvest::utils::{with_retry, HttpError, RetryConfig};
//!
//! # async fn fetch_data() -> Result<String, HttpError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), HttpError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let body = with_retry(&config, |_attempt| fetch_data()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod matcher;
mod pagination;
mod rate_limit;
mod retry;

pub use http::{
    ClientRegistry, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestTransport, Transport,
};
pub use matcher::{normalize_title, MatchMode, NameMatcher, SimilarityMatcher};
pub use pagination::{collect_pages, expand_listing, paginate, should_expand, Page};
pub use rate_limit::{ProviderRateLimiter, RateLimitConfig};
pub use retry::{with_retry, RetryConfig, TransientError};
