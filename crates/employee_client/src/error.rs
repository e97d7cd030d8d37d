use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of an application-level rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
