use http::StatusCode;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraderError {
    InvalidConfiguration(String),
    InvalidRequest(String),
    ConnectionFailed(String),
    HttpStatus(StatusCode),
    InvalidResponse(String),
    SessionClosed,
    Timeout,
}

impl TraderError {
    /// Whether the failure happened on the wire rather than in our own inputs.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            TraderError::ConnectionFailed(_) | TraderError::HttpStatus(_) | TraderError::Timeout
        )
    }
}

impl fmt::Display for TraderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraderError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            TraderError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            TraderError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            TraderError::HttpStatus(status) => write!(f, "Unexpected HTTP status: {}", status),
            TraderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            TraderError::SessionClosed => write!(f, "Session is closed"),
            TraderError::Timeout => write!(f, "Operation timed out"),
        }
    }
}

impl std::error::Error for TraderError {}

pub type Result<T> = std::result::Result<T, TraderError>;
