use shared::error::ConfigParseError;
use thiserror::Error;

/// The single error shape every dispatch failure is normalized to. Callers
/// never learn whether the transport or the service failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn http_status(status: u16) -> Self {
        Self::new(format!("HTTP error {status}"))
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to reach service: {0}")]
    Unreachable(String),
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        Self::Unreachable(value.to_string())
    }
}

impl From<TransportError> for ApiError {
    fn from(value: TransportError) -> Self {
        Self::new(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid JSON: {0}")]
    MalformedConfig(#[from] ConfigParseError),
    #[error("Select a keyboard or mouse first")]
    NoDeviceSelected,
}

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PanelError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}
