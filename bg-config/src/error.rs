//! Error types for the host-facing selector.
//!
//! Mirrors `bg-config-core::error`'s small-`enum`-with-`Display`
//! convention, but one level up: these are errors about talking to
//! firmware and about the selection outcome, not about the record
//! bytes themselves.
use core::fmt;

use bg_config_core::CodecError;

/// Opaque failure of a single [`crate::Firmware`] primitive call.
///
/// The selector never needs to branch on *why* a given firmware
/// primitive failed, only on *which* primitive it was, for logging —
/// matching the original C's uniform `EFI_ERROR(status)` checks across
/// unrelated boot services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareError(pub &'static str);

impl fmt::Display for FirmwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "firmware primitive `{}` failed", self.0)
    }
}

/// Why a single volume's record could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    Open(FirmwareError),
    Read(FirmwareError),
    /// The read returned a number of bytes other than
    /// [`bg_config_core::RECORD_SIZE`].
    BadBufferSize { got: usize },
    Decode(CodecError),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Open(e) => write!(f, "could not open environment file: {e}"),
            ReadError::Read(e) => write!(f, "cannot read environment file: {e}"),
            ReadError::BadBufferSize { got } => {
                write!(f, "environment file has wrong size: got {got} bytes")
            }
            ReadError::Decode(e) => write!(f, "{e}"),
        }
    }
}

/// Why persisting the chosen record back to its volume failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    Open(FirmwareError),
    Write(FirmwareError),
    Close(FirmwareError),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Open(e) => write!(f, "could not open environment file for write: {e}"),
            WriteError::Write(e) => write!(f, "cannot write environment to file: {e}"),
            WriteError::Close(e) => write!(f, "could not close environment config file: {e}"),
        }
    }
}

/// Fatal outcomes of [`crate::load_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// No viable bootable record could be chosen: none present, every
    /// candidate was still `in_progress`, or the only candidate was a
    /// demoted `TESTING` record with no fallback.
    ConfigError,
    /// [`crate::save_config`]: writing new records is a host-side task
    /// (spec Non-goal), not implemented here.
    NotImplemented,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::ConfigError => write!(f, "could not find any valid config partition"),
            LoadError::NotImplemented => write!(f, "not implemented"),
        }
    }
}

/// Commutative monoid over "did anything go wrong". `Clean` is the
/// identity element; folding in a single `Errored` makes the whole
/// fold `Errored`, regardless of order. This replaces the mutable
/// `BOOLEAN *errored` out-parameter of the original C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sticky {
    #[default]
    Clean,
    Errored,
}

impl Sticky {
    pub const fn errored(self) -> bool {
        matches!(self, Sticky::Errored)
    }
}

impl core::ops::BitOr for Sticky {
    type Output = Sticky;
    fn bitor(self, rhs: Sticky) -> Sticky {
        match (self, rhs) {
            (Sticky::Clean, Sticky::Clean) => Sticky::Clean,
            _ => Sticky::Errored,
        }
    }
}

impl core::ops::BitOrAssign for Sticky {
    fn bitor_assign(&mut self, rhs: Sticky) {
        *self = *self | rhs;
    }
}

impl From<bool> for Sticky {
    fn from(errored: bool) -> Self {
        if errored {
            Sticky::Errored
        } else {
            Sticky::Clean
        }
    }
}

impl core::iter::Sum for Sticky {
    fn sum<I: Iterator<Item = Sticky>>(iter: I) -> Self {
        iter.fold(Sticky::Clean, core::ops::BitOr::bitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_is_identity() {
        assert_eq!(Sticky::Clean | Sticky::Clean, Sticky::Clean);
        assert_eq!(Sticky::Clean | Sticky::Errored, Sticky::Errored);
        assert_eq!(Sticky::Errored | Sticky::Clean, Sticky::Errored);
    }

    #[test]
    fn errored_is_absorbing() {
        assert_eq!(Sticky::Errored | Sticky::Errored, Sticky::Errored);
    }

    #[test]
    fn sum_over_any_order_matches() {
        let a: Sticky = [Sticky::Clean, Sticky::Clean, Sticky::Errored, Sticky::Clean]
            .into_iter()
            .sum();
        let b: Sticky = [Sticky::Errored, Sticky::Clean, Sticky::Clean, Sticky::Clean]
            .into_iter()
            .sum();
        assert_eq!(a, Sticky::Errored);
        assert_eq!(a, b);
    }
}
