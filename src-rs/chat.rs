//! Request routing: provider selection, failover, and the two-round
//! image tool protocol.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Persona, RelayConfig};
use crate::fallback::FallbackResponder;
use crate::llm::{
    Completion, CompletionRequest, ErrorKind, HealthSnapshot, HealthTracker, ProviderRegistry, ProviderSelector,
    RegisteredProvider, Severity, ToolInvocation, Turn,
};
use crate::result::{ChatReply, FailureClass};
use crate::tools::{image_tool_schema, ImageToolInvoker, ToolError, ToolRegistry};

pub const EMPTY_MESSAGE_REPLY: &str = "Please type a message so I have something to respond to.";

const FINALIZE_FAILED_NOTE: &str =
    "Your image is ready, but I couldn't write a description for it this time. Here it is:";

/// Fixed system turn content for every upstream call.
pub fn system_prompt(persona: &Persona) -> String {
    format!(
        "You are {name}, an AI assistant created by {creator}. \
         When the user asks you to create, draw, generate or otherwise produce an image, \
         call the `generate_image` tool with a detailed description of the picture. \
         After the tool returns, include the returned image URL in your answer as a markdown image. \
         You can also write code (HTML, CSS, JavaScript); the interface shows a live preview of it. \
         Never reveal or hint at which underlying model or provider answers this conversation. \
         If asked who created you, say \"I was created by {creator}\".",
        name = persona.name,
        creator = persona.creator,
    )
}

/// System turn, then the supplied history in order, then the current message.
pub fn build_turns(system: &str, history: Vec<Turn>, message: &str) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(Turn::system(system));
    turns.extend(history);
    turns.push(Turn::user(message));
    turns
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub model: String,
    pub healthy: bool,
    pub failure_count: u32,
    pub last_error: Option<ErrorKind>,
    pub last_failure_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProviderList {
    pub providers: Vec<String>,
    pub count: usize,
}

/// Owns the routing state shared by every request: the registry, the
/// round-robin cursor and the health counters.
pub struct ChatOrchestrator {
    registry: ProviderRegistry,
    selector: ProviderSelector,
    health: HealthTracker,
    tools: ToolRegistry,
    image: ImageToolInvoker,
    system_prompt: String,
    temperature: f64,
    max_attempts: usize,
}

impl ChatOrchestrator {
    pub fn new(registry: ProviderRegistry, config: &RelayConfig) -> Self {
        let count = registry.len();
        let image = ImageToolInvoker::default();
        let mut tools = ToolRegistry::new();
        if let Err(err) = tools.register(image.clone().handler(), image_tool_schema()) {
            warn!(error = %err, "image tool not registered");
        }
        Self {
            registry,
            selector: ProviderSelector::new(count),
            health: HealthTracker::new(count, config.unhealthy_threshold).with_recovery(config.recovery_after),
            tools,
            image,
            system_prompt: system_prompt(&config.persona),
            temperature: config.temperature,
            max_attempts: config.max_attempts.max(1),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn health(&self) -> &HealthTracker {
        &self.health
    }

    pub fn has_providers(&self) -> bool {
        self.registry.has_providers()
    }

    pub fn handle_chat(&self, message: &str, history: Vec<Turn>) -> ChatReply {
        let message = message.trim();
        if message.is_empty() {
            return ChatReply::failed(
                EMPTY_MESSAGE_REPLY.to_string(),
                FailureClass::InvalidInput,
                "message is required",
            );
        }
        if !self.registry.has_providers() {
            debug!("no providers configured, answering in fallback mode");
            return self.fallback(message, FailureClass::NoProviders);
        }

        let turns = build_turns(&self.system_prompt, history, message);
        let count = self.registry.len();
        let budget = self.max_attempts.min(count);
        let mut tried: Vec<usize> = Vec::with_capacity(budget);
        // Other requests advance the same cursor, so repeats are possible.
        let max_draws = count * 2;
        let mut draws = 0;

        while tried.len() < budget && draws < max_draws {
            draws += 1;
            let Some(index) = self.selector.next() else {
                break;
            };
            if tried.contains(&index) {
                continue;
            }
            tried.push(index);
            let Some(entry) = self.registry.entry(index) else {
                continue;
            };
            if !self.health.is_healthy(index) {
                info!(
                    provider = %entry.provider.name,
                    failures = self.health.failure_count(index),
                    "skipping unhealthy provider"
                );
                continue;
            }
            if let Some(reply) = self.attempt(index, entry, &turns) {
                return reply;
            }
        }

        warn!(tried = tried.len(), "every candidate provider failed, answering in fallback mode");
        self.fallback(message, FailureClass::Exhausted)
    }

    pub fn provider_health(&self) -> Vec<ProviderStatus> {
        self.registry
            .providers()
            .enumerate()
            .map(|(index, provider)| {
                let HealthSnapshot {
                    failure_count,
                    healthy,
                    last_error,
                    last_failure_at,
                } = self.health.snapshot(index);
                ProviderStatus {
                    name: provider.name.clone(),
                    model: provider.model.clone(),
                    healthy,
                    failure_count,
                    last_error,
                    last_failure_at,
                }
            })
            .collect()
    }

    pub fn provider_list(&self) -> ProviderList {
        let providers = self.registry.names();
        ProviderList {
            count: providers.len(),
            providers,
        }
    }

    /// One provider's turn in the loop. `None` means move on to the next one.
    fn attempt(&self, index: usize, entry: &RegisteredProvider, turns: &[Turn]) -> Option<ChatReply> {
        let name = entry.provider.name.as_str();
        let tools_enabled = entry.provider.tools_allowed() && self.tools.count() > 0;
        let request = self.request(entry, turns.to_vec(), tools_enabled);
        debug!(provider = %name, tools = tools_enabled, turns = turns.len(), "calling provider");

        match entry.adapter.complete(&request) {
            Ok(completion) => {
                let Some(call) = completion.tool_invocation() else {
                    let Some(text) = non_blank(&completion) else {
                        warn!(provider = %name, "provider returned an empty completion");
                        self.health.record_failure(index, ErrorKind::Unknown.severity(), ErrorKind::Unknown);
                        return None;
                    };
                    self.health.record_success(index);
                    info!(provider = %name, "provider answered");
                    return Some(ChatReply::answer(text));
                };
                self.health.record_success(index);
                debug!(
                    provider = %name,
                    tool = %call.name(),
                    finish_reason = completion.finish_reason.as_deref().unwrap_or("-"),
                    "model requested a tool"
                );
                match self.run_tool(call) {
                    Ok((url, output)) => Some(self.finalize(index, entry, turns, call.clone(), url, output)),
                    Err(err) => {
                        warn!(provider = %name, tool = %call.name(), error = %err, "malformed tool call");
                        if tools_enabled {
                            self.retry_without_tools(index, entry, turns)
                        } else {
                            None
                        }
                    }
                }
            }
            Err(err) if err.kind == ErrorKind::MalformedToolCall => {
                warn!(provider = %name, error = %err, "unreadable tool call");
                if tools_enabled {
                    self.retry_without_tools(index, entry, turns)
                } else {
                    None
                }
            }
            Err(err) if err.kind == ErrorKind::BadRequest && tools_enabled => {
                warn!(provider = %name, error = %err, "request rejected, retrying without tools");
                self.retry_without_tools(index, entry, turns)
            }
            Err(err) => {
                warn!(provider = %name, kind = %err.kind, status = ?err.status, "provider call failed");
                self.health.record_failure(index, err.kind.severity(), err.kind);
                None
            }
        }
    }

    fn retry_without_tools(&self, index: usize, entry: &RegisteredProvider, turns: &[Turn]) -> Option<ChatReply> {
        let name = entry.provider.name.as_str();
        let request = self.request(entry, turns.to_vec(), false);
        match entry.adapter.complete(&request) {
            Ok(completion) => {
                self.health.record_success(index);
                match non_blank(&completion) {
                    Some(text) => Some(ChatReply::answer(text)),
                    None => {
                        warn!(provider = %name, "tool-less retry returned no text");
                        None
                    }
                }
            }
            Err(err) => {
                warn!(provider = %name, kind = %err.kind, status = ?err.status, "tool-less retry failed");
                self.health.record_failure(index, Severity::Generic, err.kind);
                None
            }
        }
    }

    /// Validate and run the requested tool. Returns the image URL and the
    /// tool-result payload to hand back to the model.
    fn run_tool(&self, call: &ToolInvocation) -> Result<(String, String), ToolError> {
        let args = call
            .parsed_arguments()
            .ok_or_else(|| ToolError::InvalidArguments("arguments are not valid JSON".to_string()))?;
        let output = self.tools.execute(call.name(), &args)?;
        let url = output
            .get("image_url")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArguments("tool produced no image URL".to_string()))?
            .to_string();
        info!(tool = %call.name(), "tool call executed");
        Ok((url, output.to_string()))
    }

    /// Second round-trip on the same provider so the model can describe the image.
    fn finalize(
        &self,
        index: usize,
        entry: &RegisteredProvider,
        turns: &[Turn],
        call: ToolInvocation,
        url: String,
        tool_output: String,
    ) -> ChatReply {
        let name = entry.provider.name.as_str();
        let mut extended = Vec::with_capacity(turns.len() + 2);
        extended.extend_from_slice(turns);
        let call_id = call.id.clone();
        extended.push(Turn::tool_request(call));
        extended.push(Turn::tool_result(&call_id, &tool_output));

        let request = self.request(entry, extended, false);
        match entry.adapter.complete(&request) {
            Ok(completion) => {
                self.health.record_success(index);
                ChatReply::answer(embed_image(&completion.content_or_empty(), &url)).with_image(url)
            }
            Err(err) => {
                warn!(provider = %name, kind = %err.kind, status = ?err.status, "finalize call failed");
                self.health.record_failure(index, err.kind.severity(), err.kind);
                let reply = format!("{}\n\n![image]({})", FINALIZE_FAILED_NOTE, url);
                ChatReply::failed(reply, FailureClass::FinalizeFailed, err.kind.as_str()).with_image(url)
            }
        }
    }

    fn fallback(&self, message: &str, failure: FailureClass) -> ChatReply {
        if let Some(prompt) = FallbackResponder::direct_image_prompt(message) {
            match self.image.invoke(&prompt) {
                Ok(url) => return FallbackResponder::direct_image(url, failure),
                Err(err) => debug!(error = %err, "direct image request not served"),
            }
        }
        FallbackResponder::respond(failure)
    }

    /// Every round on a provider names its model explicitly.
    fn request(&self, entry: &RegisteredProvider, turns: Vec<Turn>, with_tools: bool) -> CompletionRequest {
        CompletionRequest {
            turns,
            tools: with_tools.then(|| self.tools.get_schemas()),
            temperature: self.temperature,
            model: Some(entry.provider.model.clone()),
        }
    }
}

fn non_blank(completion: &Completion) -> Option<String> {
    completion.content.clone().filter(|text| !text.trim().is_empty())
}

/// Append the image as markdown unless the model already included the URL.
fn embed_image(text: &str, url: &str) -> String {
    let text = text.trim_end();
    if text.contains(url) {
        text.to_string()
    } else if text.is_empty() {
        format!("![image]({})", url)
    } else {
        format!("{}\n\n![image]({})", text, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_build_turns_wraps_history() {
        let history = vec![Turn::user("one"), Turn::assistant("two"), Turn::user("three")];
        let turns = build_turns("sys", history.clone(), "four");
        assert_eq!(turns.len(), history.len() + 2);
        assert_eq!(turns[0], Turn::system("sys"));
        assert_eq!(&turns[1..4], history.as_slice());
        assert_eq!(turns[4], Turn::user("four"));
    }

    #[test]
    fn test_build_turns_without_history() {
        let turns = build_turns("sys", Vec::new(), "hi");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[1].role, Role::User);
    }

    #[test]
    fn test_system_prompt_covers_identity_and_tool_use() {
        let prompt = system_prompt(&Persona {
            name: "Nova".to_string(),
            creator: "Acme".to_string(),
        });
        assert!(prompt.starts_with("You are Nova"));
        assert!(prompt.contains("created by Acme"));
        assert!(prompt.contains("generate_image"));
        assert!(prompt.contains("image URL"));
        assert!(prompt.contains("Never reveal"));
    }

    #[test]
    fn test_embed_image() {
        assert_eq!(embed_image("Here you go.", "http://i"), "Here you go.\n\n![image](http://i)");
        assert_eq!(embed_image("See http://i", "http://i"), "See http://i");
        assert_eq!(embed_image("  ", "http://i"), "![image](http://i)");
    }
}
