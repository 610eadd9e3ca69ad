use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};

use super::error::{ErrorKind, ProviderError};
use super::provider::Provider;
use super::types::{Completion, CompletionRequest, ProviderAdapter, ToolInvocation};

/// Adapter for any endpoint speaking the chat-completions wire format.
pub struct OpenAiAdapter {
    provider: Provider,
    client: Client,
}

impl OpenAiAdapter {
    pub fn new(provider: Provider, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { provider, client })
    }
}

impl ProviderAdapter for OpenAiAdapter {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        let payload = build_payload(&self.provider, request);
        send_request(&self.client, &self.provider, &payload)
    }
}

/// Shape the upstream body from the provider's profile.
pub fn build_payload(provider: &Provider, request: &CompletionRequest) -> Value {
    let model = request.model.as_deref().unwrap_or(&provider.model);
    let mut payload = json!({
        "model": model,
        "messages": request.turns,
        "temperature": request.temperature,
        "stream": false,
    });

    if let Some(limit) = provider.profile.max_output_tokens {
        payload["max_tokens"] = json!(limit);
    }

    if let Some(tools) = request.tools.as_ref().filter(|t| !t.is_empty()) {
        if provider.tools_allowed_for(model) {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters.clone().unwrap_or(json!({"type": "object"})),
                        }
                    })
                })
                .collect();
            payload["tools"] = json!(declarations);
            payload["tool_choice"] = json!("auto");
        }
    }

    payload
}

fn send_request(client: &Client, provider: &Provider, payload: &Value) -> Result<Completion, ProviderError> {
    let mut builder = client
        .post(&provider.endpoint)
        .header("Content-Type", "application/json")
        .bearer_auth(&provider.credential);
    for (name, value) in &provider.extra_headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let resp = builder.json(payload).send().map_err(|err| {
        if err.is_timeout() {
            ProviderError::network(&format!("request timeout: {}", err))
        } else if err.is_connect() {
            ProviderError::network(&format!("connection failed: {}", err))
        } else {
            ProviderError::network(&format!("request failed: {}", err))
        }
    })?;

    let status = resp.status();
    let body = resp
        .text()
        .map_err(|err| ProviderError::network(&format!("reading body failed: {}", err)))?;
    if !status.is_success() {
        return Err(ProviderError::from_status(status.as_u16(), &body));
    }

    let raw: Value = serde_json::from_str(&body)
        .map_err(|err| ProviderError::invalid_response(&format!("invalid json: {}", err)))?;
    parse_response(&raw)
}

/// Pull the first choice out of a chat-completions response body.
pub fn parse_response(raw: &Value) -> Result<Completion, ProviderError> {
    let choice = raw
        .get("choices")
        .and_then(|v| v.as_array())
        .and_then(|list| list.first())
        .ok_or_else(|| ProviderError::invalid_response("no choices in response"))?;
    let message = choice
        .get("message")
        .ok_or_else(|| ProviderError::invalid_response("choice without message"))?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let tool_calls = match message.get("tool_calls") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                serde_json::from_value::<ToolInvocation>(item.clone()).map_err(|err| {
                    ProviderError::new(ErrorKind::MalformedToolCall, &format!("unreadable tool call: {}", err))
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };
    let finish_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let blank = content.as_deref().map(str::trim).unwrap_or("").is_empty();
    if blank && tool_calls.is_empty() {
        return Err(ProviderError::invalid_response("empty completion"));
    }

    Ok(Completion {
        content,
        tool_calls,
        finish_reason,
    })
}
