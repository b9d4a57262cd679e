//! Error types for action primitives

use cdp_adapter::{AdapterError, AdapterErrorKind};
use thiserror::Error;

/// Error types for action primitive operations
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// Navigation timed out waiting for page load
    #[error("Navigation timeout: {0}")]
    NavTimeout(String),

    /// Wait operation timed out
    #[error("Wait timeout: {0}")]
    WaitTimeout(String),

    /// No element matched the locator within the allotted time
    #[error("Element not found: {0}")]
    AnchorNotFound(String),

    /// Caller passed an argument the primitive cannot act on
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// In-page script returned something the primitive cannot interpret
    #[error("Unexpected script result: {0}")]
    Script(String),

    /// CDP communication or protocol error
    #[error("CDP I/O error: {0}")]
    CdpIo(String),

    /// Local filesystem failure (screenshots)
    #[error("I/O error: {0}")]
    Io(String),
}

impl ActionError {
    /// Whether the error only means "the awaited condition never happened".
    ///
    /// Optional UI elements are probed with bounded waits; callers treat a
    /// timeout as "not applicable right now" and everything else as fatal.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ActionError::WaitTimeout(_) | ActionError::NavTimeout(_))
    }

    /// CDP failures that polling waits ride out until their deadline.
    pub fn is_transient(&self) -> bool {
        matches!(self, ActionError::CdpIo(_))
    }
}

impl From<AdapterError> for ActionError {
    fn from(err: AdapterError) -> Self {
        let message = err.to_string();
        match err.kind {
            AdapterErrorKind::NavTimeout => ActionError::NavTimeout(message),
            AdapterErrorKind::CdpIo | AdapterErrorKind::Internal => ActionError::CdpIo(message),
        }
    }
}

impl From<std::io::Error> for ActionError {
    fn from(err: std::io::Error) -> Self {
        ActionError::Io(err.to_string())
    }
}
