//! Upstream failure classification.
//!
//! Every upstream call ends in exactly one `ErrorKind` (or success). The
//! orchestrator never looks at raw status codes; it matches on the kind.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of upstream failure classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credential rejected (401/403).
    Auth,
    /// Throttled (429).
    RateLimited,
    /// Billing or quota exhausted (402, or a 429 whose body says so).
    Quota,
    /// Request shape rejected (400/422).
    BadRequest,
    /// Timeout, connection refused, DNS and friends.
    Network,
    /// The model asked for a tool we cannot run.
    MalformedToolCall,
    /// Anything else: 5xx, unexpected status, unparseable body.
    Unknown,
}

/// How hard a failure counts against a provider's health.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Auth,
    Throttled,
    Quota,
    Generic,
}

impl Severity {
    pub fn weight(self) -> u32 {
        match self {
            Severity::Auth => 5,
            Severity::Quota => 3,
            Severity::Throttled => 1,
            Severity::Generic => 1,
        }
    }
}

impl ErrorKind {
    pub fn severity(self) -> Severity {
        match self {
            ErrorKind::Auth => Severity::Auth,
            ErrorKind::RateLimited => Severity::Throttled,
            ErrorKind::Quota => Severity::Quota,
            ErrorKind::BadRequest
            | ErrorKind::Network
            | ErrorKind::MalformedToolCall
            | ErrorKind::Unknown => Severity::Generic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Quota => "quota",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Network => "network",
            ErrorKind::MalformedToolCall => "malformed_tool_call",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a `ProviderAdapter`.
#[derive(Clone, Debug)]
pub struct ProviderError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ErrorKind, message: &str) -> Self {
        Self {
            kind,
            status: None,
            message: message.to_string(),
        }
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        Self {
            kind: classify_status(status, body),
            status: Some(status),
            message: truncate(body, 300),
        }
    }

    pub fn network(message: &str) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn invalid_response(message: &str) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Map an HTTP error status (and its body) onto an `ErrorKind`.
pub fn classify_status(status: u16, body: &str) -> ErrorKind {
    let lowered = body.to_lowercase();
    let mentions_billing = lowered.contains("insufficient_quota")
        || lowered.contains("insufficient balance")
        || lowered.contains("billing")
        || lowered.contains("credits");
    match status {
        401 | 403 => ErrorKind::Auth,
        402 => ErrorKind::Quota,
        429 if mentions_billing => ErrorKind::Quota,
        429 => ErrorKind::RateLimited,
        400 | 422 => ErrorKind::BadRequest,
        _ => ErrorKind::Unknown,
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.to_string();
    }
    let mut out: String = body.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(classify_status(401, ""), ErrorKind::Auth);
        assert_eq!(classify_status(403, ""), ErrorKind::Auth);
        assert_eq!(classify_status(402, ""), ErrorKind::Quota);
        assert_eq!(classify_status(429, "slow down"), ErrorKind::RateLimited);
        assert_eq!(classify_status(400, ""), ErrorKind::BadRequest);
        assert_eq!(classify_status(422, ""), ErrorKind::BadRequest);
        assert_eq!(classify_status(500, ""), ErrorKind::Unknown);
        assert_eq!(classify_status(404, ""), ErrorKind::Unknown);
    }

    #[test]
    fn test_quota_flavoured_429() {
        let body = r#"{"error":{"code":"insufficient_quota"}}"#;
        assert_eq!(classify_status(429, body), ErrorKind::Quota);
    }

    #[test]
    fn test_severity_weights() {
        assert_eq!(ErrorKind::Auth.severity().weight(), 5);
        assert_eq!(ErrorKind::Quota.severity().weight(), 3);
        assert_eq!(ErrorKind::RateLimited.severity().weight(), 1);
        assert_eq!(ErrorKind::Network.severity().weight(), 1);
        assert_eq!(ErrorKind::BadRequest.severity(), Severity::Generic);
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let err = ProviderError::from_status(500, &body);
        assert_eq!(err.message.len(), 303);
        assert_eq!(err.status, Some(500));
    }
}
