use serde::{Deserialize, Serialize};

/// Why a reply is not a normal model answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    InvalidInput,
    NoProviders,
    Exhausted,
    FinalizeFailed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureClass>,
}

impl ChatReply {
    pub fn answer(reply: String) -> Self {
        Self {
            reply,
            image: None,
            error: None,
            failure: None,
        }
    }

    pub fn with_image(mut self, url: String) -> Self {
        self.image = Some(url);
        self
    }

    pub fn failed(reply: String, failure: FailureClass, error: &str) -> Self {
        Self {
            reply,
            image: None,
            error: Some(error.to_string()),
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}
