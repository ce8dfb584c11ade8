//! Spec-exact types for the boot-guard configuration record.
//!
//! This crate has no knowledge of volumes, firmware, or I/O; it only
//! knows how to turn a fixed-size byte buffer into an [`EnvData`] and
//! back, bit-identically with the host tooling that writes these
//! records. See `bg-config` for the host-facing selector built on top.
#![no_std]
extern crate alloc;

pub mod base;
pub mod constants;
pub mod error;
pub mod record;
pub mod string;

pub use base::InProgress;
pub use constants::{ENV_NUM_CONFIG_PARTS, ENV_STRING_LENGTH, N_SLOTS, REVISION_FAILED};
pub use error::{CodecError, Result};
pub use record::{EnvData, UState, RECORD_SIZE};
pub use string::FixedWideStr;
