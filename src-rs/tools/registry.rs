use std::collections::BTreeMap;

use serde_json::Value;

use super::types::{ToolEntry, ToolError, ToolHandler, ToolSchema};

/// Name-keyed table of tools the model may call. Filled before the
/// orchestrator is shared, read-only afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: ToolHandler, schema: ToolSchema) -> Result<(), ToolError> {
        if schema.name.is_empty() {
            return Err(ToolError::UnknownTool(String::new()));
        }
        if self.tools.contains_key(&schema.name) {
            return Err(ToolError::AlreadyRegistered(schema.name));
        }
        self.tools.insert(schema.name.clone(), ToolEntry { handler, schema });
        Ok(())
    }

    pub fn execute(&self, name: &str, args: &Value) -> Result<Value, ToolError> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        (entry.handler)(args)
    }

    pub fn get_schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|entry| entry.schema.clone()).collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }
}
