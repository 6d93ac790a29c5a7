use serde::Deserialize;

/// Response wrapper used by the multisig service's identity endpoints:
/// `{ "success": bool, "message"?: str, "data"?: T, "error"?: any, "timestamp"?: str }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// The payload when the call succeeded and carried data; otherwise the
    /// envelope's message, or `fallback` when it has none.
    pub fn into_data(self, fallback: &str) -> Result<T, String> {
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        if !self.success {
            return Err(message);
        }
        self.data.ok_or(message)
    }
}

/// Body of a non-2xx response; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl ErrorBody {
    /// `message`, else a string `error`, when non-blank.
    pub(crate) fn reason(self) -> Option<String> {
        let error = match self.error {
            Some(serde_json::Value::String(error)) => Some(error),
            _ => None,
        };
        self.message
            .into_iter()
            .chain(error)
            .find(|m| !m.trim().is_empty())
    }

    pub(crate) fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}
