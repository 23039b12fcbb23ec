//! Provider adapter registry
//!
//! Built once at startup from configuration and shared read-only.
//! Providers without credentials are simply absent.

use std::collections::BTreeMap;
use std::sync::Arc;

use influlink_domain::{InfluLinkError, Provider, Result};

use super::ports::ProviderAdapter;

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    adapters: BTreeMap<Provider, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own provider, replacing any previous
    /// one.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.provider(), adapter);
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// # Errors
    /// `InfluLinkError::ProviderNotConfigured` when nothing is registered.
    pub fn get(&self, provider: Provider) -> Result<Arc<dyn ProviderAdapter>> {
        self.adapters
            .get(&provider)
            .cloned()
            .ok_or_else(|| InfluLinkError::ProviderNotConfigured(provider.as_str().to_string()))
    }

    pub fn contains(&self, provider: Provider) -> bool {
        self.adapters.contains_key(&provider)
    }

    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        self.adapters.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.adapters.keys()).finish()
    }
}
