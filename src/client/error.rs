//! Errors surfaced to panels.

/// Why a data-access call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced a response
    Transport(String),
    /// Non-2xx status or `success: false`
    Server { status: u16, message: String },
    /// A required field was left blank
    Validation(String),
    /// The response body had an unexpected shape
    Decode(String),
}

impl ClientError {
    /// Text shown to the user in a notification.
    pub fn message(&self) -> &str {
        match self {
            ClientError::Transport(msg)
            | ClientError::Validation(msg)
            | ClientError::Decode(msg) => msg,
            ClientError::Server { message, .. } => message,
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "transport error: {}", msg),
            ClientError::Server { status, message } => {
                write!(f, "server error ({}): {}", status, message)
            }
            ClientError::Validation(msg) => write!(f, "validation error: {}", msg),
            ClientError::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("HTTP error: {:?}", err);
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
