//! Error and warning types for sweep operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::photo::PhotoId;

/// Errors that can occur while sweeping a photo library.
#[derive(Debug, Error)]
pub enum SweepError {
    /// A photo record could not be fingerprinted.
    #[error("Invalid metadata for photo '{id}': {reason}")]
    InvalidMetadata { id: PhotoId, reason: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The cooperative runtime could not be started.
    #[error("Failed to start sweep runtime: {source}")]
    Runtime {
        #[source]
        source: std::io::Error,
    },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl SweepError {
    /// Create an invalid metadata error.
    pub fn invalid_metadata(id: impl Into<PhotoId>, reason: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Kind of sweep warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Signature generation failed and the coarse fallback was used.
    DegradedSignature,
    /// The progress observer panicked; the panic was contained.
    ProgressCallbackPanicked,
}

/// Non-fatal problem encountered during a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepWarning {
    /// Photo the warning refers to, if any.
    pub photo_id: Option<PhotoId>,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl SweepWarning {
    /// Create a new sweep warning.
    pub fn new(photo_id: Option<PhotoId>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            photo_id,
            message: message.into(),
            kind,
        }
    }

    /// Create a degraded signature warning from the error that caused it.
    pub fn degraded_signature(photo_id: impl Into<PhotoId>, error: &SweepError) -> Self {
        Self {
            photo_id: Some(photo_id.into()),
            message: format!("Fell back to coarse signature: {error}"),
            kind: WarningKind::DegradedSignature,
        }
    }

    /// Create a warning for a panicking progress observer.
    pub fn progress_panicked(percent: u8) -> Self {
        Self {
            photo_id: None,
            message: format!("Progress callback panicked at {percent}%"),
            kind: WarningKind::ProgressCallbackPanicked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_metadata_message() {
        let err = SweepError::invalid_metadata("p1", "photo id is empty");
        assert!(matches!(err, SweepError::InvalidMetadata { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid metadata for photo 'p1': photo id is empty"
        );
    }

    #[test]
    fn test_degraded_signature_warning() {
        let err = SweepError::invalid_metadata("p1", "empty id");
        let warning = SweepWarning::degraded_signature("p1", &err);
        assert_eq!(warning.kind, WarningKind::DegradedSignature);
        assert_eq!(warning.photo_id.as_deref(), Some("p1"));
        assert!(warning.message.contains("coarse signature"));
    }
}
