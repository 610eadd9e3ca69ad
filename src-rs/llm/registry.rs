use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use super::openai_adapter::OpenAiAdapter;
use super::provider::{Provider, ProviderDefinition};
use super::types::ProviderAdapter;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate provider name: {0}")]
    DuplicateName(String),

    #[error("provider {0} has no credential")]
    MissingCredential(String),

    #[error("failed to build HTTP client for {name}: {source}")]
    Client {
        name: String,
        #[source]
        source: reqwest::Error,
    },
}

pub struct RegisteredProvider {
    pub provider: Provider,
    pub adapter: Arc<dyn ProviderAdapter>,
}

/// Ordered, append-only list of usable providers.
#[derive(Default)]
pub struct ProviderRegistry {
    entries: Vec<RegisteredProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit every definition that carries a credential, in order, each
    /// behind its own chat-completions adapter.
    pub fn from_definitions(defs: Vec<ProviderDefinition>, timeout: Duration) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for def in defs {
            let name = def.name.clone();
            let Some(provider) = def.admit() else {
                debug!(provider = %name, "skipping provider without credential");
                continue;
            };
            let adapter = OpenAiAdapter::new(provider.clone(), timeout)
                .map_err(|source| RegistryError::Client { name: name.clone(), source })?;
            registry.register_provider(provider, Arc::new(adapter))?;
        }
        info!(count = registry.len(), "provider registry built");
        Ok(registry)
    }

    pub fn register_provider(
        &mut self,
        provider: Provider,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Result<(), RegistryError> {
        if provider.credential.trim().is_empty() {
            return Err(RegistryError::MissingCredential(provider.name));
        }
        if self.get(&provider.name).is_some() {
            return Err(RegistryError::DuplicateName(provider.name));
        }
        self.entries.push(RegisteredProvider { provider, adapter });
        Ok(())
    }

    pub fn has_providers(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&RegisteredProvider> {
        self.entries.get(index)
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredProvider> {
        self.entries.iter().find(|entry| entry.provider.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.provider.name == name)
    }

    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.entries.iter().map(|entry| &entry.provider)
    }

    pub fn names(&self) -> Vec<String> {
        self.providers().map(|p| p.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::llm::error::ProviderError;
    use crate::llm::provider::ProviderProfile;
    use crate::llm::types::{Completion, CompletionRequest};

    struct Silent;

    impl ProviderAdapter for Silent {
        fn complete(&self, _request: &CompletionRequest) -> Result<Completion, ProviderError> {
            Ok(Completion::text("ok"))
        }
    }

    fn def(name: &str, credential: Option<&str>) -> ProviderDefinition {
        ProviderDefinition {
            name: name.to_string(),
            endpoint: "http://127.0.0.1:9/chat/completions".to_string(),
            credential: credential.map(|c| c.to_string()),
            model: "m".to_string(),
            profile: ProviderProfile::default(),
            extra_headers: BTreeMap::new(),
        }
    }

    #[test]
    fn test_definitions_without_credentials_are_excluded() {
        let defs = vec![def("a", Some("k1")), def("b", Some("")), def("c", None), def("d", Some("k4"))];
        let registry = ProviderRegistry::from_definitions(defs, Duration::from_secs(1)).unwrap();
        assert_eq!(registry.names(), vec!["a", "d"]);
        assert!(registry.has_providers());
        assert!(registry.get("b").is_none());
        assert_eq!(registry.position("d"), Some(1));
    }

    #[test]
    fn test_empty_registry_reports_no_providers() {
        let registry = ProviderRegistry::from_definitions(vec![def("a", None)], Duration::from_secs(1)).unwrap();
        assert!(!registry.has_providers());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut registry = ProviderRegistry::new();
        registry
            .register_provider(Provider::new("a", "http://x", "k", "m"), Arc::new(Silent))
            .unwrap();
        let err = registry
            .register_provider(Provider::new("a", "http://y", "k2", "m"), Arc::new(Silent))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(name) if name == "a"));
    }

    #[test]
    fn test_blank_credential_is_rejected_on_register() {
        let mut registry = ProviderRegistry::new();
        let err = registry
            .register_provider(Provider::new("a", "http://x", " ", "m"), Arc::new(Silent))
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingCredential(_)));
    }
}
