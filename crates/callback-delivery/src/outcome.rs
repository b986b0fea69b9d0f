//! Final result of a dispatch and its mapping to caller-facing errors.

use crate::error::{DeliveryError, Result};

/// Terminal result of `Dispatcher::send`. Exactly one per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The callback accepted the payload.
    Delivered {
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// Every permitted attempt failed.
    Failed {
        /// Attempts made
        attempts: u32,
        /// Diagnostic from the last attempt
        last_error: String,
    },
}

impl DispatchOutcome {
    /// Whether the payload was delivered.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Number of HTTP attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Delivered { attempts } | Self::Failed { attempts, .. } => *attempts,
        }
    }

    /// Converts the outcome into the caller's success/failure signal.
    ///
    /// # Errors
    ///
    /// `Failed` becomes `DeliveryError::DispatchFailed`, carrying the last
    /// attempt's diagnostic.
    pub fn into_result(self) -> Result<u32> {
        match self {
            Self::Delivered { attempts } => Ok(attempts),
            Self::Failed { attempts, last_error } => {
                Err(DeliveryError::dispatch_failed(attempts, last_error))
            },
        }
    }
}
