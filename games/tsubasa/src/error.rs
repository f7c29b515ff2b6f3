//! Error taxonomy for game API calls.

use core_logic::NetworkError;
use thiserror::Error;

/// How a failed call should be treated by the loop that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Server-side rate limit window ("Wait for cooldown")
    Cooldown,
    /// Not enough coins for the requested purchase
    InsufficientFunds,
    /// The account credential was rejected; nothing else will work this turn
    InvalidCredential,
    /// Everything else, transport failures included
    Unknown,
}

impl ErrorKind {
    /// Classifies a server error message by its known substrings.
    pub fn classify(message: &str) -> Self {
        if message.contains("Wait for cooldown") {
            ErrorKind::Cooldown
        } else if message.contains("Insufficient funds") {
            ErrorKind::InsufficientFunds
        } else if message.contains("Invalid initData") {
            ErrorKind::InvalidCredential
        } else {
            ErrorKind::Unknown
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind:?}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Error built from a server message, kind inferred from its text
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::classify(&message),
            message,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<NetworkError> for ApiError {
    fn from(e: NetworkError) -> Self {
        ApiError::unknown(e.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
