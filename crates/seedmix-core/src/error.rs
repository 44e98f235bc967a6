//! Error type shared by every seedmix component.

use crate::accumulator::AccumulatorStatus;

/// Errors produced by seedmix.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The accumulator already produced its digest and accepts no more input.
    #[error("accumulator is finalized; no further input is accepted")]
    Finalized,

    /// The accumulator was cancelled and will never produce a digest.
    #[error("accumulator was cancelled")]
    Cancelled,

    /// A pointer sample line could not be parsed.
    #[error("invalid sample on line {line}: {reason}")]
    InvalidSample { line: usize, reason: String },

    /// A mix-in seed was not exactly 16 bytes of hex.
    #[error("invalid mix-in seed: {0}")]
    InvalidSeed(String),

    /// A key file could not be read, parsed or written.
    #[error("key file: {0}")]
    KeyFile(String),

    /// The operating system random source failed.
    #[error("OS random source failed: {0}")]
    Rng(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Invalid-state error matching a closed accumulator status.
    pub(crate) fn closed(status: AccumulatorStatus) -> Option<Self> {
        match status {
            AccumulatorStatus::Open => None,
            AccumulatorStatus::Finalized => Some(Self::Finalized),
            AccumulatorStatus::Cancelled => Some(Self::Cancelled),
        }
    }

    /// True for the errors raised by calls on a closed accumulator.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::Finalized | Self::Cancelled)
    }
}

impl From<getrandom::Error> for Error {
    fn from(e: getrandom::Error) -> Self {
        Self::Rng(e.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_sample() {
        let err = Error::InvalidSample {
            line: 3,
            reason: "expected 3 fields, found 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid sample on line 3: expected 3 fields, found 2"
        );
    }

    #[test]
    fn test_closed_maps_status() {
        assert!(Error::closed(AccumulatorStatus::Open).is_none());
        assert!(matches!(
            Error::closed(AccumulatorStatus::Finalized),
            Some(Error::Finalized)
        ));
        assert!(matches!(
            Error::closed(AccumulatorStatus::Cancelled),
            Some(Error::Cancelled)
        ));
    }

    #[test]
    fn test_invalid_state_classification() {
        assert!(Error::Finalized.is_invalid_state());
        assert!(Error::Cancelled.is_invalid_state());
        assert!(!Error::InvalidSeed("short".into()).is_invalid_state());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "gone");
    }
}
