//! Error taxonomy for a courier run.
//!
//! Only `DeviceUnavailable` aborts a run. The other variants are recoverable and
//! are turned into "try the next strategy" or a terminal outcome by the caller.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial error enum

use thiserror::Error;

/// Errors raised while talking to the device or the operator.
#[derive(Error, Debug)]
pub enum CourierError {
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Invalid selection: {0}")]
    AmbiguousSelection(String),

    #[error("{action} failed: {reason}")]
    ActionFailed { action: String, reason: String },
}

impl CourierError {
    pub fn action_failed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// True when the run cannot continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DeviceUnavailable(_))
    }

    /// Stable machine-readable code for JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DeviceUnavailable(_) => "DEVICE_UNAVAILABLE",
            Self::ElementNotFound(_) => "ELEMENT_NOT_FOUND",
            Self::AmbiguousSelection(_) => "AMBIGUOUS_SELECTION",
            Self::ActionFailed { .. } => "ACTION_FAILED",
        }
    }
}

pub type Result<T> = std::result::Result<T, CourierError>;
