use std::collections::BTreeMap;
use std::env;

use crate::chat::ChatOrchestrator;
use crate::config::RelayConfig;
use crate::llm::{ProviderDefinition, ProviderProfile, ProviderRegistry, RegistryError};

struct Family {
    id: &'static str,
    env_prefix: &'static str,
    endpoint: &'static str,
    default_model: &'static str,
    profile: ProviderProfile,
    headers: &'static [(&'static str, &'static str)],
}

fn families() -> [Family; 3] {
    [
        Family {
            id: "deepseek",
            env_prefix: "DEEPSEEK",
            endpoint: "https://api.deepseek.com/chat/completions",
            default_model: "deepseek-chat",
            profile: ProviderProfile {
                supports_tools: true,
                max_output_tokens: Some(8192),
                free_models_reject_tools: false,
            },
            headers: &[],
        },
        Family {
            id: "openrouter",
            env_prefix: "OPENROUTER",
            endpoint: "https://openrouter.ai/api/v1/chat/completions",
            default_model: "deepseek/deepseek-chat-v3-0324:free",
            profile: ProviderProfile {
                supports_tools: true,
                max_output_tokens: Some(4096),
                free_models_reject_tools: true,
            },
            headers: &[("HTTP-Referer", "https://github.com/chat-relay"), ("X-Title", "Chat Relay")],
        },
        Family {
            id: "groq",
            env_prefix: "GROQ",
            endpoint: "https://api.groq.com/openai/v1/chat/completions",
            default_model: "llama-3.3-70b-versatile",
            profile: ProviderProfile {
                supports_tools: true,
                max_output_tokens: Some(4096),
                free_models_reject_tools: false,
            },
            headers: &[],
        },
    ]
}

/// Collect `<PREFIX>_API_KEYS` (comma list), `<PREFIX>_API_KEY` and
/// `<PREFIX>_API_KEY_2..=10`, trimmed, blank and duplicate entries dropped.
fn load_keys<F>(lookup: &F, prefix: &str) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut raw = Vec::new();
    if let Some(list) = lookup(&format!("{}_API_KEYS", prefix)) {
        raw.extend(list.split(',').map(|item| item.to_string()));
    }
    if let Some(single) = lookup(&format!("{}_API_KEY", prefix)) {
        raw.push(single);
    }
    for idx in 2..=10 {
        if let Some(value) = lookup(&format!("{}_API_KEY_{}", prefix, idx)) {
            raw.push(value);
        }
    }

    let mut keys: Vec<String> = Vec::new();
    for item in raw {
        let trimmed = item.trim();
        if !trimmed.is_empty() && !keys.iter().any(|k| k == trimmed) {
            keys.push(trimmed.to_string());
        }
    }
    keys
}

/// One definition per credential, in family order, named `<family>-<n>`.
pub fn provider_definitions<F>(lookup: F) -> Vec<ProviderDefinition>
where
    F: Fn(&str) -> Option<String>,
{
    let mut defs = Vec::new();
    for family in families() {
        let model = lookup(&format!("{}_MODEL", family.env_prefix))
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| family.default_model.to_string());
        let headers: BTreeMap<String, String> = family
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (n, key) in load_keys(&lookup, family.env_prefix).into_iter().enumerate() {
            defs.push(ProviderDefinition {
                name: format!("{}-{}", family.id, n + 1),
                endpoint: family.endpoint.to_string(),
                credential: Some(key),
                model: model.clone(),
                profile: family.profile.clone(),
                extra_headers: headers.clone(),
            });
        }
    }
    defs
}

pub fn provider_definitions_from_env() -> Vec<ProviderDefinition> {
    provider_definitions(|key| env::var(key).ok())
}

pub fn build_orchestrator(cfg: &RelayConfig) -> Result<ChatOrchestrator, RegistryError> {
    let registry = ProviderRegistry::from_definitions(provider_definitions_from_env(), cfg.request_timeout)?;
    Ok(ChatOrchestrator::new(registry, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_each_key_becomes_a_provider() {
        let defs = provider_definitions(lookup(&[
            ("DEEPSEEK_API_KEYS", "sk-a, sk-b ,,"),
            ("DEEPSEEK_API_KEY_3", "sk-c"),
            ("GROQ_API_KEY", "gk-1"),
        ]));
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["deepseek-1", "deepseek-2", "deepseek-3", "groq-1"]);
        assert_eq!(defs[1].credential.as_deref(), Some("sk-b"));
        assert_eq!(defs[0].model, "deepseek-chat");
        assert_eq!(defs[3].endpoint, "https://api.groq.com/openai/v1/chat/completions");
    }

    #[test]
    fn test_duplicate_keys_collapse() {
        let defs = provider_definitions(lookup(&[("DEEPSEEK_API_KEYS", "sk-a,sk-a"), ("DEEPSEEK_API_KEY", "sk-a")]));
        assert_eq!(defs.len(), 1);
    }

    #[test]
    fn test_openrouter_profile_and_model_override() {
        let defs = provider_definitions(lookup(&[
            ("OPENROUTER_API_KEY", "or-1"),
            ("OPENROUTER_MODEL", "meta-llama/llama-3.3-70b-instruct:free"),
        ]));
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].model, "meta-llama/llama-3.3-70b-instruct:free");
        assert!(defs[0].profile.free_models_reject_tools);
        assert_eq!(defs[0].extra_headers.get("X-Title").map(String::as_str), Some("Chat Relay"));
    }

    #[test]
    fn test_no_keys_no_definitions() {
        assert!(provider_definitions(lookup(&[])).is_empty());
    }
}
