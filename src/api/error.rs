use thiserror::Error;

/// Every variant is recoverable: the caller keeps its last good view and
/// tries again on the next tick.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with HTTP {status}")]
    HttpStatus { endpoint: String, status: u16 },
    #[error("{endpoint} reported an error: {message}")]
    Application { endpoint: String, message: String },
    #[error("failed to decode {endpoint} payload: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Client(_) => "API_CLIENT_ERROR",
            Self::Transport { .. } => "API_TRANSPORT_ERROR",
            Self::HttpStatus { .. } => "API_HTTP_STATUS",
            Self::Application { .. } => "API_APPLICATION_ERROR",
            Self::Decode { .. } => "API_DECODE_ERROR",
        }
    }

    /// Text for the transient notification shown to the operator.
    pub fn user_message(&self) -> String {
        match self {
            Self::Application { message, .. } => message.clone(),
            Self::HttpStatus { status, .. } => format!("HTTP error! status: {}", status),
            Self::Transport { .. } => "Network error while contacting the admin API".to_string(),
            Self::Decode { .. } => "Admin API returned an unreadable payload".to_string(),
            Self::Client(reason) => reason.clone(),
        }
    }

    pub(super) fn decode(endpoint: &str, reason: impl ToString) -> Self {
        Self::Decode {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}
