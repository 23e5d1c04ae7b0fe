use derive_more::Display;

/// Failures talking to the remote marketplace API.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum RemoteError {
    #[display("Network error: {}", _0)]
    Network(String),

    #[display("Request timed out")]
    Timeout,

    #[display("Not found: {}", _0)]
    NotFound(String),

    #[display("Unauthorized: {}", _0)]
    Unauthorized(String),

    #[display("Forbidden: {}", _0)]
    Forbidden(String),

    #[display("Remote API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[display("Failed to decode response: {}", _0)]
    Decode(String),

    #[display("Invalid response: {}", _0)]
    InvalidResponse(String),
}

impl RemoteError {
    /// Maps a non-success status and its `message` body field.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => RemoteError::Unauthorized(message),
            403 => RemoteError::Forbidden(message),
            404 => RemoteError::NotFound(message),
            _ => RemoteError::Status { status, message },
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::from_status(status.as_u16(), err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}
