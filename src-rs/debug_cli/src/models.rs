use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub debug: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub history: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub image: Option<String>,
    pub error: Option<String>,
    pub failure: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderList {
    pub providers: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub model: String,
    pub healthy: bool,
    pub failure_count: u32,
    pub last_error: Option<String>,
}
