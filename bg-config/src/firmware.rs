//! The host firmware's side of the contract: everything the selector
//! borrows rather than owns (spec §6 "Consumed from the host firmware").
//!
//! Modeled on the teacher's `BootServices` interface
//! (`nuefi::table::boot`): a trait the selector calls through, so that
//! `bg-config` itself never touches real hardware, and tests can supply
//! an in-memory implementation (see [`crate::testing::MockFirmware`]).
use alloc::vec::Vec;

use crate::error::FirmwareError;

/// An open configuration file handle. Opaque to the selector; only
/// meaningful to the [`Firmware`] implementation that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle(pub u64);

/// Board-specific topology the selector is configured with, rather
/// than hard-coded `#define`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    /// Expected number of redundant configuration partitions. A
    /// mismatch against what [`Firmware::enumerate_config_volumes`]
    /// actually returns degrades the result but does not abort
    /// selection.
    pub expected_config_parts: u32,
}

impl Default for Topology {
    fn default() -> Self {
        Topology {
            expected_config_parts: bg_config_core::ENV_NUM_CONFIG_PARTS,
        }
    }
}

/// The host collaborators the selector needs, borrowed for the
/// duration of one [`crate::load_config`] call.
///
/// Every method independently returns a [`FirmwareError`] so that a
/// test harness can inject a failure at any one call site without
/// touching the others (spec §8 scenario S8's error-injection sweep).
pub trait Firmware {
    /// Reserve bookkeeping for `bytes` worth of host memory. Models
    /// the original's `AllocatePool` call for the volume-index buffer:
    /// failure here is fatal, there is nothing useful selection can do
    /// without it.
    fn allocate(&mut self, bytes: usize) -> Result<(), FirmwareError>;

    /// Release memory reserved by a matching [`Firmware::allocate`].
    fn free(&mut self, bytes: usize);

    /// Enumerate every volume that exposes a configuration root,
    /// already filtered by the host's `filter_cfg_parts` predicate
    /// (spec §4.2). Returns the filtered volume indices.
    fn enumerate_config_volumes(&mut self) -> Result<Vec<u32>, FirmwareError>;

    /// Whether `volume_index` is the volume firmware itself booted
    /// from (spec §4.4 key 4).
    fn is_on_boot_volume(&mut self, volume_index: u32) -> bool;

    /// Open the configuration file on `volume_index` for reading.
    fn open_config_file(&mut self, volume_index: u32) -> Result<FileHandle, FirmwareError>;

    /// Read up to `buf.len()` bytes from `handle`, returning the
    /// number of bytes actually read.
    fn read_config_file(&mut self, handle: FileHandle, buf: &mut [u8]) -> Result<usize, FirmwareError>;

    /// Open the configuration file on `volume_index` for read+write,
    /// for persisting a mutated record back to its origin volume.
    fn open_config_file_rw(&mut self, volume_index: u32) -> Result<FileHandle, FirmwareError>;

    /// Write the full record to `handle`.
    fn write_config_file(&mut self, handle: FileHandle, buf: &[u8]) -> Result<(), FirmwareError>;

    /// Close a file opened with [`Firmware::open_config_file`] or
    /// [`Firmware::open_config_file_rw`].
    fn close_config_file(&mut self, volume_index: u32, handle: FileHandle) -> Result<(), FirmwareError>;
}

/// Owned loader parameters handed to the payload loader: the chosen
/// record's `kernelfile`/`kernelparams`, duplicated into fresh owned
/// strings, plus its watchdog timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderParams {
    pub payload_path: alloc::string::String,
    pub payload_options: alloc::string::String,
    pub timeout: u32,
}
