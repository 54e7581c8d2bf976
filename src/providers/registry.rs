//! Registry for managing metadata provider plugins.

use std::collections::HashMap;
use std::sync::Arc;

use super::{MetadataProvider, ProviderError};
use crate::config::Config;
use crate::models::Provider;
use crate::utils::{ClientRegistry, NameMatcher, SimilarityMatcher};

/// Registry for all enabled metadata providers
///
/// Providers are built once from configuration, each with the executor the
/// [`ClientRegistry`] holds for it.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn MetadataProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every provider that is compiled in and enabled
    pub fn from_config(config: &Config, clients: &ClientRegistry) -> Result<Self, ProviderError> {
        let matcher: Arc<dyn NameMatcher> = Arc::new(SimilarityMatcher::from_config(&config.matching));
        let mut registry = Self::new();

        for provider in Provider::ALL {
            let settings = config.providers.get(provider);
            if !settings.enabled {
                tracing::debug!("Provider {} disabled by configuration", provider.id());
                continue;
            }

            let client = clients.get(provider).ok_or_else(|| {
                ProviderError::Configuration(format!("no HTTP client for {}", provider.id()))
            })?;

            match provider {
                #[cfg(feature = "source-kodansha")]
                Provider::Kodansha => {
                    use super::kodansha::{
                        KodanshaClient, KodanshaMetadataMapper, KodanshaMetadataProvider,
                    };
                    registry.register(Arc::new(KodanshaMetadataProvider::new(
                        KodanshaClient::new(client),
                        KodanshaMetadataMapper::new(),
                        Arc::clone(&matcher),
                        settings.fetch_series_covers,
                        settings.fetch_book_covers,
                    )));
                }
                #[cfg(feature = "source-nautiljon")]
                Provider::Nautiljon => {
                    use super::nautiljon::{
                        NautiljonClient, NautiljonMetadataMapper, NautiljonMetadataProvider,
                    };
                    let client = NautiljonClient::new(client);
                    registry.register(Arc::new(NautiljonMetadataProvider::new(
                        client,
                        NautiljonMetadataMapper::new("https://www.nautiljon.com"),
                        Arc::clone(&matcher),
                        settings.fetch_series_covers,
                        settings.fetch_book_covers,
                    )));
                }
                #[allow(unreachable_patterns)]
                _ => {
                    let _ = client;
                    tracing::debug!("Provider {} not compiled in", provider.id());
                }
            }
        }

        Ok(registry)
    }

    /// Register a new provider, replacing any previous one with the same name
    pub fn register(&mut self, provider: Arc<dyn MetadataProvider>) {
        self.providers.insert(provider.provider_name(), provider);
    }

    /// Get a provider
    pub fn get(&self, provider: Provider) -> Option<&Arc<dyn MetadataProvider>> {
        self.providers.get(&provider)
    }

    /// Get a provider, returning an error if it is not registered
    pub fn get_required(
        &self,
        provider: Provider,
    ) -> Result<&Arc<dyn MetadataProvider>, ProviderError> {
        self.get(provider).ok_or_else(|| {
            ProviderError::Configuration(format!("provider '{}' is not enabled", provider.id()))
        })
    }

    /// Get all registered providers, in a stable order
    pub fn all(&self) -> Vec<&Arc<dyn MetadataProvider>> {
        Provider::ALL
            .iter()
            .filter_map(|p| self.providers.get(p))
            .collect()
    }

    /// Check if a provider is registered
    pub fn has(&self, provider: Provider) -> bool {
        self.providers.contains_key(&provider)
    }

    /// Get the number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
