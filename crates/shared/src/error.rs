use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body carried by every non-success response of the glass service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    /// Extracts the user-facing message from a raw error body, ignoring blank or
    /// undecodable payloads.
    pub fn message_from_body(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ApiError>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .filter(|message| !message.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid stock sheet '{input}', expected WIDTHxHEIGHT with positive values")]
pub struct ParseStockError {
    pub input: String,
}
