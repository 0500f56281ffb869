use thiserror::Error;

use crate::pointer::Pointer;

/// Reasons a WCON document could not be repaired.
///
/// Every variant that concerns a specific value carries its location so the
/// offending source record can be found.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("document has no `data` section")]
    MissingData,
    #[error("expected an object at {at}")]
    NotAnObject { at: Pointer },
    #[error("required field missing at {at}")]
    MissingField { at: Pointer },
    #[error("expected a non-empty list to unwrap at {at}")]
    NotWrapped { at: Pointer },
    #[error("record id at {at} must be a string or a number")]
    InvalidId { at: Pointer },
    #[error("data key {key:?} is not a non-negative integer index")]
    InvalidIndex { key: String },
}

impl NormalizeError {
    /// Where the failure happened, when it concerns a specific value.
    pub fn location(&self) -> Option<&Pointer> {
        match self {
            NormalizeError::NotAnObject { at }
            | NormalizeError::MissingField { at }
            | NormalizeError::NotWrapped { at }
            | NormalizeError::InvalidId { at } => Some(at),
            NormalizeError::MissingData | NormalizeError::InvalidIndex { .. } => None,
        }
    }

    /// Index of the track record being repaired when the failure happened.
    pub fn record_index(&self) -> Option<usize> {
        self.location().and_then(Pointer::record_index)
    }
}
