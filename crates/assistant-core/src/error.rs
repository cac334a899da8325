use std::time::Duration;
use thiserror::Error;

/// Why a single dispatch to the chat endpoint failed.
///
/// None of these are fatal. Each one turns into exactly one fallback
/// assistant message in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("server responded with {0}")]
    Server(u16),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ChatError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ChatError::Timeout(_))
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        // Only set when a timeout was configured on the reqwest client itself
        if err.is_timeout() {
            return ChatError::Timeout(Duration::ZERO);
        }
        if let Some(status) = err.status() {
            return ChatError::Server(status.as_u16());
        }
        ChatError::Transport(err.to_string())
    }
}
