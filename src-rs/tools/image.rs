//! `generate_image`: turns a prompt into a render URL on a free image
//! endpoint. Nothing is fetched here; the client loads the URL itself.

use std::sync::Arc;

use serde_json::{json, Value};

use super::types::{ToolError, ToolHandler, ToolSchema};

pub const IMAGE_TOOL_NAME: &str = "generate_image";

const DEFAULT_BASE_URL: &str = "https://image.pollinations.ai/prompt/";
const DEFAULT_PARAMS: &str = "width=1024&height=1024&nologo=true&enhance=true";

#[derive(Clone, Debug)]
pub struct ImageToolInvoker {
    base_url: String,
    params: String,
}

impl Default for ImageToolInvoker {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            params: DEFAULT_PARAMS.to_string(),
        }
    }
}

impl ImageToolInvoker {
    pub fn new(base_url: &str, params: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            params: params.to_string(),
        }
    }

    /// Build the render URL for `prompt`.
    pub fn invoke(&self, prompt: &str) -> Result<String, ToolError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ToolError::InvalidArguments("prompt is empty".to_string()));
        }
        let encoded = urlencoding::encode(prompt);
        let mut url = format!("{}{}", self.base_url, encoded);
        if !self.params.is_empty() {
            url.push('?');
            url.push_str(&self.params);
        }
        Ok(url)
    }

    /// Run the tool against a model-supplied argument object.
    pub fn invoke_with_args(&self, args: &Value) -> Result<String, ToolError> {
        let prompt = args
            .get("prompt")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing string field `prompt`".to_string()))?;
        self.invoke(prompt)
    }

    pub fn handler(self) -> ToolHandler {
        Arc::new(move |args: &Value| {
            let url = self.invoke_with_args(args)?;
            Ok(json!({ "image_url": url }))
        })
    }
}

pub fn image_tool_schema() -> ToolSchema {
    ToolSchema {
        name: IMAGE_TOOL_NAME.to_string(),
        description: "Generate an image from a text prompt".to_string(),
        parameters: Some(json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "Detailed description of the image to generate"
                }
            },
            "required": ["prompt"]
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_is_deterministic() {
        let invoker = ImageToolInvoker::default();
        let url = invoker.invoke("a red bicycle").unwrap();
        assert_eq!(
            url,
            "https://image.pollinations.ai/prompt/a%20red%20bicycle?width=1024&height=1024&nologo=true&enhance=true"
        );
        assert_eq!(invoker.invoke("a red bicycle").unwrap(), url);
    }

    #[test]
    fn test_reserved_characters_are_encoded() {
        let invoker = ImageToolInvoker::new("http://img/", "");
        assert_eq!(invoker.invoke("cats & dogs/100%?").unwrap(), "http://img/cats%20%26%20dogs%2F100%25%3F");
    }

    #[test]
    fn test_blank_prompt_is_rejected() {
        let invoker = ImageToolInvoker::default();
        assert!(matches!(invoker.invoke("   "), Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn test_args_without_prompt_are_rejected() {
        let invoker = ImageToolInvoker::default();
        assert!(invoker.invoke_with_args(&json!({"subject": "cat"})).is_err());
        assert!(invoker.invoke_with_args(&json!({"prompt": 42})).is_err());
        assert!(invoker.invoke_with_args(&json!({"prompt": ""})).is_err());
    }

    #[test]
    fn test_handler_wraps_url() {
        let handler = ImageToolInvoker::new("http://img/", "").handler();
        let out = handler(&json!({"prompt": "fox"})).unwrap();
        assert_eq!(out, json!({"image_url": "http://img/fox"}));
    }
}
