use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of every non-2xx response: `{"error": "..."}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Error)]
#[error("configuration is not valid JSON: {0}")]
pub struct ConfigParseError(#[from] pub serde_json::Error);
