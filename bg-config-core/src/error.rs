//! Errors produced while decoding an on-disk [`EnvData`][crate::record::EnvData]
//! record.
//!
//! Mirrors the `Result<T, E>` convention used throughout this crate's
//! sibling rather than a raw status code: decode failures are recovered
//! locally by the caller (a single bad volume never aborts selection),
//! so the type only needs to say *what* went wrong, not carry behavior.

use core::fmt;

/// Friendly `Result` alias for record decoding.
pub type Result<T> = core::result::Result<T, CodecError>;

/// Why a raw byte buffer could not be decoded into an [`EnvData`][crate::record::EnvData].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    /// Fewer than [`RECORD_SIZE`][crate::record::RECORD_SIZE] bytes were
    /// supplied.
    ShortRead {
        /// Bytes actually supplied.
        got: usize,
    },

    /// The stored CRC did not match the CRC recomputed over the record.
    CrcMismatch {
        /// CRC stored in the record's trailing field.
        stored: u32,
        /// CRC computed over the record body.
        computed: u32,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ShortRead { got } => {
                write!(f, "short read: expected a full record, got {got} bytes")
            }
            CodecError::CrcMismatch { stored, computed } => {
                write!(
                    f,
                    "CRC mismatch: stored {stored:#010x}, computed {computed:#010x}"
                )
            }
        }
    }
}
