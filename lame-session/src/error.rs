// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for encoder session operations.
//!
//! Collaborator failures keep the raw negative code the codec returned. The
//! session never guesses a cause from it; [`describe_code`] exists for log
//! messages only.

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while driving an encoder session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The codec could not create or configure a handle. The session is left
    /// `Closed`; retrying only makes sense with a different configuration.
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// The codec returned a negative code while encoding a chunk.
    ///
    /// The session stays open and may be used again, e.g. with a larger
    /// output buffer.
    #[error("Encode failed with code {0}")]
    EncodeFailed(i32),

    /// The codec returned a negative code while flushing.
    #[error("Flush failed with code {0}")]
    FlushFailed(i32),

    /// `encode` or `flush` was called on a closed session.
    ///
    /// This is a usage error; the codec is never reached.
    #[error("Invalid state: {operation} called on a closed session")]
    InvalidStateUse {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// A sample chunk does not satisfy the length rules.
    #[error("Invalid chunk: {0}")]
    InvalidChunk(String),

    /// Reading PCM input or writing encoded output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An encoder configuration document could not be parsed.
    #[error("Invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to load the codec dynamic library.
    #[error("Loading library: {0}")]
    LibLoading(#[from] libloading::Error),

    /// A generic error for failures not covered above.
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Returns the raw collaborator code for encode/flush failures.
    pub fn codec_code(&self) -> Option<i32> {
        match self {
            Error::EncodeFailed(code) | Error::FlushFailed(code) => Some(*code),
            _ => None,
        }
    }
}

/// Returns the meaning LAME documents for a negative encode/flush result.
///
/// Purely informational: the codec does not guarantee the mapping, so callers
/// must not branch on it.
pub fn describe_code(code: i32) -> &'static str {
    match code {
        -1 => "output buffer was too small",
        -2 => "memory allocation failed",
        -3 => "parameters were not initialized",
        -4 => "psychoacoustic problem",
        c if c >= 0 => "no error",
        _ => "unknown codec error",
    }
}
