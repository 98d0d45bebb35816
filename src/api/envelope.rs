use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;

const SUCCESS: &str = "success";

/// The `{status, data | message}` wrapper every admin endpoint answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: String,
    pub data: Option<Value>,
    pub message: Option<String>,
}

impl Envelope {
    pub fn parse(endpoint: &str, body: &[u8]) -> Result<Self, ApiError> {
        serde_json::from_slice(body).map_err(|error| ApiError::decode(endpoint, error))
    }

    /// Anything other than `status == "success"` is an application failure,
    /// with the payload's message when it has one.
    pub fn into_data<T: DeserializeOwned>(self, endpoint: &str) -> Result<T, ApiError> {
        if self.status != SUCCESS {
            let message = self
                .message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| format!("unexpected status {:?}", self.status));
            return Err(ApiError::Application {
                endpoint: endpoint.to_string(),
                message,
            });
        }

        let data = self
            .data
            .ok_or_else(|| ApiError::decode(endpoint, "success envelope without data"))?;
        serde_json::from_value(data).map_err(|error| ApiError::decode(endpoint, error))
    }
}
