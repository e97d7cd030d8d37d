use serde::{Deserialize, Serialize};

/// Error payload returned by the employee API on non-2xx responses.
///
/// Handlers answer with either `{"message": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// First non-blank of `message` and `error`.
    pub fn text(&self) -> Option<&str> {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}

pub fn fallback_error_message(status: u16) -> String {
    format!("request failed with status {status}")
}
