use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Option<Value>,
}

/// Local tool failure. Never counted against a provider's health.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("tool {0} already registered")]
    AlreadyRegistered(String),
}

pub type ToolHandler = Arc<dyn Fn(&Value) -> Result<Value, ToolError> + Send + Sync>;

pub struct ToolEntry {
    pub handler: ToolHandler,
    pub schema: ToolSchema,
}
