use crate::{Finding, Turn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub session_id: String,
    pub vulnerabilities: Vec<Finding>,
    pub analysis: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Read-only view of a live session, served for inspection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionView {
    pub session_id: String,
    pub created_at: String,
    pub turns: Vec<Turn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_requires_both_fields() {
        let parsed: Result<ChatRequest, _> = serde_json::from_str(r#"{"session_id":"abc"}"#);
        assert!(parsed.is_err());

        let parsed: ChatRequest =
            serde_json::from_str(r#"{"session_id":"abc","message":"explain XSS"}"#)
                .expect("deserialize");
        assert_eq!(parsed.session_id, "abc");
        assert_eq!(parsed.message, "explain XSS");
    }

    #[test]
    fn error_response_has_single_error_field() {
        let json = serde_json::to_value(ErrorResponse::new("boom")).expect("serialize");
        assert_eq!(json, serde_json::json!({"error": "boom"}));
    }
}
