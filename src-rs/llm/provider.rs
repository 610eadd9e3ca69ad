use std::collections::BTreeMap;

use serde::Serialize;

/// Request-shaping capabilities of an upstream family.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProviderProfile {
    pub supports_tools: bool,
    pub max_output_tokens: Option<u32>,
    /// Some gateways reject `tools` for their `:free` model variants.
    pub free_models_reject_tools: bool,
}

impl Default for ProviderProfile {
    fn default() -> Self {
        Self {
            supports_tools: true,
            max_output_tokens: None,
            free_models_reject_tools: false,
        }
    }
}

/// A configured upstream candidate, before credential filtering.
#[derive(Clone, Debug)]
pub struct ProviderDefinition {
    pub name: String,
    pub endpoint: String,
    pub credential: Option<String>,
    pub model: String,
    pub profile: ProviderProfile,
    pub extra_headers: BTreeMap<String, String>,
}

/// An admitted provider. Immutable once in the registry.
#[derive(Clone, Debug)]
pub struct Provider {
    pub name: String,
    pub endpoint: String,
    pub credential: String,
    pub model: String,
    pub profile: ProviderProfile,
    pub extra_headers: BTreeMap<String, String>,
}

impl Provider {
    pub fn new(name: &str, endpoint: &str, credential: &str, model: &str) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            credential: credential.to_string(),
            model: model.to_string(),
            profile: ProviderProfile::default(),
            extra_headers: BTreeMap::new(),
        }
    }

    pub fn with_profile(mut self, profile: ProviderProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.extra_headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Whether tool declarations may be sent with the default model.
    pub fn tools_allowed(&self) -> bool {
        self.tools_allowed_for(&self.model)
    }

    pub fn tools_allowed_for(&self, model: &str) -> bool {
        if !self.profile.supports_tools {
            return false;
        }
        !(self.profile.free_models_reject_tools && is_free_model(model))
    }
}

impl ProviderDefinition {
    /// Admit the definition if it carries a non-empty credential.
    pub fn admit(self) -> Option<Provider> {
        let credential = self.credential?.trim().to_string();
        if credential.is_empty() {
            return None;
        }
        Some(Provider {
            name: self.name,
            endpoint: self.endpoint,
            credential,
            model: self.model,
            profile: self.profile,
            extra_headers: self.extra_headers,
        })
    }
}

fn is_free_model(model: &str) -> bool {
    model.ends_with(":free")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(model: &str) -> Provider {
        Provider::new("openrouter-1", "http://localhost", "key", model).with_profile(ProviderProfile {
            supports_tools: true,
            max_output_tokens: Some(4096),
            free_models_reject_tools: true,
        })
    }

    #[test]
    fn test_free_models_strip_tools() {
        assert!(!gateway("deepseek/deepseek-chat-v3-0324:free").tools_allowed());
        assert!(gateway("deepseek/deepseek-chat-v3-0324").tools_allowed());
    }

    #[test]
    fn test_profile_without_tool_support() {
        let provider = Provider::new("p", "http://localhost", "key", "m").with_profile(ProviderProfile {
            supports_tools: false,
            ..ProviderProfile::default()
        });
        assert!(!provider.tools_allowed());
    }

    #[test]
    fn test_admit_rejects_blank_credentials() {
        let def = ProviderDefinition {
            name: "p".to_string(),
            endpoint: "http://localhost".to_string(),
            credential: Some("   ".to_string()),
            model: "m".to_string(),
            profile: ProviderProfile::default(),
            extra_headers: BTreeMap::new(),
        };
        assert!(def.clone().admit().is_none());
        let missing = ProviderDefinition {
            credential: None,
            ..def.clone()
        };
        assert!(missing.admit().is_none());
        let present = ProviderDefinition {
            credential: Some(" sk-1 ".to_string()),
            ..def
        };
        assert_eq!(present.admit().map(|p| p.credential), Some("sk-1".to_string()));
    }
}
