use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ProviderError;
use crate::tools::ToolSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One conversation turn, shaped like a chat-completions message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolInvocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Turn {
    pub fn system(content: &str) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: &str) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Assistant turn echoing a tool invocation back to the model.
    pub fn tool_request(call: ToolInvocation) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            tool_calls: vec![call],
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: &str, content: &str) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.to_string()),
        }
    }

    fn text(role: Role, content: &str) -> Self {
        Self {
            role,
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the upstream sent it.
    #[serde(default)]
    pub arguments: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

impl ToolInvocation {
    pub fn new(id: &str, name: &str, arguments: Value) -> Self {
        Self {
            id: id.to_string(),
            kind: function_type(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn parsed_arguments(&self) -> Option<Value> {
        serde_json::from_str(&self.function.arguments).ok()
    }
}

#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub turns: Vec<Turn>,
    pub tools: Option<Vec<ToolSchema>>,
    pub temperature: f64,
    /// Overrides the provider's default model when set.
    pub model: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
    pub finish_reason: Option<String>,
}

impl Completion {
    pub fn text(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            finish_reason: Some("stop".to_string()),
        }
    }

    pub fn tool_call(call: ToolInvocation) -> Self {
        Self {
            content: None,
            tool_calls: vec![call],
            finish_reason: Some("tool_calls".to_string()),
        }
    }

    /// The first requested tool call, if the model asked for one.
    pub fn tool_invocation(&self) -> Option<&ToolInvocation> {
        self.tool_calls.first()
    }

    pub fn content_or_empty(&self) -> String {
        self.content.clone().unwrap_or_default()
    }
}

/// One upstream endpoint bound to one credential.
pub trait ProviderAdapter: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_request_turn_wire_shape() {
        let call = ToolInvocation::new("call_1", "generate_image", json!({"prompt": "a fox"}));
        let value = serde_json::to_value(Turn::tool_request(call)).unwrap();
        assert_eq!(value["role"], "assistant");
        assert!(value["content"].is_null());
        assert_eq!(value["tool_calls"][0]["id"], "call_1");
        assert_eq!(value["tool_calls"][0]["type"], "function");
        assert_eq!(value["tool_calls"][0]["function"]["name"], "generate_image");
        assert!(value.get("tool_call_id").is_none());
    }

    #[test]
    fn test_history_turn_deserializes_without_optional_fields() {
        let turn: Turn = serde_json::from_value(json!({"role": "user", "content": "hi"})).unwrap();
        assert_eq!(turn, Turn::user("hi"));
    }

    #[test]
    fn test_unparseable_arguments() {
        let mut call = ToolInvocation::new("c", "generate_image", json!({}));
        call.function.arguments = "{not json".to_string();
        assert!(call.parsed_arguments().is_none());
    }
}
