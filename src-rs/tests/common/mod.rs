#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chat_relay_rs::llm::{
    Completion, CompletionRequest, ErrorKind, Provider, ProviderAdapter, ProviderError, ProviderProfile,
    ProviderRegistry,
};
use chat_relay_rs::{ChatOrchestrator, RelayConfig};

/// Adapter double that replays canned results and records every request.
pub struct ScriptedAdapter {
    script: Mutex<VecDeque<Result<Completion, ProviderError>>>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedAdapter {
    pub fn new(script: Vec<Result<Completion, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn answering(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(Completion::text(text))])
    }

    pub fn failing(kind: ErrorKind, status: u16) -> Arc<Self> {
        Self::new(vec![Err(status_error(kind, status))])
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ProviderAdapter for ScriptedAdapter {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        self.calls.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::new(ErrorKind::Unknown, "script exhausted")))
    }
}

pub fn status_error(kind: ErrorKind, status: u16) -> ProviderError {
    let mut err = ProviderError::new(kind, "scripted failure");
    err.status = Some(status);
    err
}

pub fn provider(name: &str) -> Provider {
    Provider::new(name, "http://upstream.invalid/chat/completions", "key", "model-x")
}

pub fn toolless_provider(name: &str) -> Provider {
    provider(name).with_profile(ProviderProfile {
        supports_tools: false,
        ..ProviderProfile::default()
    })
}

pub fn orchestrator_with(entries: Vec<(Provider, Arc<ScriptedAdapter>)>, config: RelayConfig) -> ChatOrchestrator {
    let mut registry = ProviderRegistry::new();
    for (provider, adapter) in entries {
        registry.register_provider(provider, adapter).unwrap();
    }
    ChatOrchestrator::new(registry, &config)
}

pub fn orchestrator(adapters: &[(&str, Arc<ScriptedAdapter>)]) -> ChatOrchestrator {
    let entries = adapters
        .iter()
        .map(|(name, adapter)| (provider(name), adapter.clone()))
        .collect();
    orchestrator_with(entries, RelayConfig::default())
}
