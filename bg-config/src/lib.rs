//! Boot-time configuration selector: reads the redundant configuration
//! partitions, ranks their records, applies the `INSTALLED` /
//! `TESTING` / `OK` / `FAILED` state machine, and hands the caller the
//! loader parameters for the record it picked.
//!
//! The record layout and codec live in `bg-config-core`, with no
//! knowledge of any host; this crate is the part that actually talks
//! to one, through the [`Firmware`] trait.
#![no_std]
extern crate alloc;

pub mod error;
pub mod firmware;
pub mod rank;
pub mod reader;
pub mod selector;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bg_config_core::{EnvData, UState, REVISION_FAILED};
pub use error::{FirmwareError, LoadError, ReadError, Sticky, WriteError};
pub use firmware::{FileHandle, Firmware, LoaderParams, Topology};
pub use rank::{Candidate, Ranking};
pub use selector::{load_config, save_config, LoadOutcome};
