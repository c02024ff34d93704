//! Error types for the BRKGA-MP-IPR engine.

use thiserror::Error;

/// Error raised by a [`Decoder`](crate::types::Decoder) implementation.
///
/// The engine never constructs, catches, or retries these: a decode failure
/// aborts the current operation and surfaces to the caller, since an
/// unranked individual must never enter a population.
#[derive(Debug, Clone, Error)]
#[error("decode failed: {message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    /// Creates a decode error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors produced by the engine itself.
#[derive(Debug, Error)]
pub enum BrkgaError {
    /// Invalid parameter combination, detected eagerly before any decoding.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A decoder failure, propagated unmodified from the decoder capability.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
