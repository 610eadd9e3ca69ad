use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::models::{ChatRequest, ChatResponse, ChatTurn, ProviderList, ProviderStatus};

pub struct HTTPClient {
    pub base_url: String,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<ChatResponse, String> {
        let url = format!("{}/chat", self.base_url);
        let resp = self
            .client
            .post(url)
            .json(&ChatRequest { message, history })
            .send()
            .map_err(|err| err.to_string())?;

        let status = resp.status();
        // 400 still carries a reply body for blank input.
        if status.is_success() || status.as_u16() == 400 {
            resp.json::<ChatResponse>().map_err(|err| err.to_string())
        } else {
            let body = resp.text().unwrap_or_default();
            Err(format!("http {}: {}", status.as_u16(), body))
        }
    }

    pub fn health(&self) -> Result<serde_json::Value, String> {
        self.get_json("/health")
    }

    pub fn providers(&self) -> Result<ProviderList, String> {
        self.get_json("/providers")
    }

    pub fn provider_health(&self) -> Result<Vec<ProviderStatus>, String> {
        let value: serde_json::Value = self.get_json("/providers/health")?;
        let items = value
            .get("providers")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let mut out = Vec::new();
        for item in items {
            if let Ok(status) = serde_json::from_value::<ProviderStatus>(item) {
                out.push(status);
            }
        }
        Ok(out)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(url).send().map_err(|err| err.to_string())?;
        if resp.status().is_success() {
            resp.json::<T>().map_err(|err| err.to_string())
        } else {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            Err(format!("http {}: {}", status.as_u16(), body))
        }
    }
}
