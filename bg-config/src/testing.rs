//! In-memory [`Firmware`] implementation for tests.
//!
//! Grounded in the teacher's own `nuefi::tests::mock` module — an
//! in-crate mock good enough to drive the real selection logic without
//! real hardware — generalised to also support the original C test
//! harness's two other tricks: single-call error injection
//! (`test_fatvars.c`'s `INJECT_ERROR()`/`error_injection` counter) and
//! volume-order shuffling (`shuffle_volumes()`), both needed to
//! reproduce spec §8's scenarios.
use alloc::vec::Vec;

use bg_config_core::{EnvData, InProgress, UState, ENV_STRING_LENGTH, RECORD_SIZE};

use crate::{
    error::FirmwareError,
    firmware::{FileHandle, Firmware},
};

/// One simulated configuration partition.
#[derive(Debug, Clone, Default)]
pub struct MockVolume {
    /// `None` simulates a read that completes with zero bytes (the
    /// harness's "envdata = null" scenario): not an I/O error, just an
    /// empty file, which fails the buffer-size check downstream.
    pub envdata: Option<EnvData>,
    pub eligible: bool,
    pub on_boot_volume: bool,
    /// Captures whatever the selector last wrote to this volume.
    pub written: Option<EnvData>,
}

impl MockVolume {
    pub fn bootable(envdata: EnvData) -> Self {
        MockVolume {
            envdata: Some(envdata),
            eligible: true,
            on_boot_volume: false,
            written: None,
        }
    }

    pub fn empty() -> Self {
        MockVolume {
            envdata: None,
            eligible: true,
            on_boot_volume: false,
            written: None,
        }
    }

    pub fn on_boot(mut self) -> Self {
        self.on_boot_volume = true;
        self
    }

    pub fn ineligible(mut self) -> Self {
        self.eligible = false;
        self
    }
}

/// Directs single-call error injection, mirroring `test_fatvars.c`'s
/// `INJECT_ERROR()` macro: the `fail_at`-th host-primitive call across
/// the *whole* run (1-indexed, across all volumes and all primitives)
/// fails; every other call succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultSchedule {
    fail_at: Option<usize>,
}

impl FaultSchedule {
    pub fn never() -> Self {
        FaultSchedule { fail_at: None }
    }

    pub fn at(call_index: usize) -> Self {
        FaultSchedule {
            fail_at: Some(call_index),
        }
    }
}

/// A tiny xorshift PRNG, good enough to permute a handful of volumes
/// deterministically from a test-supplied seed without pulling in a
/// `rand` dependency for a crate that otherwise has none.
pub struct XorShift32(u32);

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        XorShift32(if seed == 0 { 0x9e37_79b9 } else { seed })
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next_u32() as usize) % bound
    }
}

/// Fisher-Yates shuffle, matching `test_fatvars.c`'s `shuffle_volumes`.
pub fn shuffle<T>(items: &mut [T], seed: u32) {
    let mut rng = XorShift32::new(seed);
    for i in 0..items.len() {
        let j = i + rng.below(items.len() - i);
        items.swap(i, j);
    }
}

/// In-memory [`Firmware`]. Every method first consults the
/// [`FaultSchedule`] (`tick`), then does its in-memory bookkeeping.
pub struct MockFirmware {
    pub volumes: Vec<MockVolume>,
    fault: FaultSchedule,
    calls: usize,
    allocated_bytes: usize,
}

impl MockFirmware {
    pub fn new(volumes: Vec<MockVolume>) -> Self {
        MockFirmware {
            volumes,
            fault: FaultSchedule::never(),
            calls: 0,
            allocated_bytes: 0,
        }
    }

    pub fn with_fault(mut self, fault: FaultSchedule) -> Self {
        self.fault = fault;
        self
    }

    /// Total number of host-primitive calls made so far. Running a
    /// scenario once with no fault configured gives the number of
    /// injection points to sweep over (spec §8 scenario S8).
    pub fn call_count(&self) -> usize {
        self.calls
    }

    /// Outstanding host memory the selector has not released. Must be
    /// zero after every call to `load_config`, on every exit path.
    pub fn outstanding_bytes(&self) -> usize {
        self.allocated_bytes
    }

    fn tick(&mut self, what: &'static str) -> Result<(), FirmwareError> {
        self.calls += 1;
        if self.fault.fail_at == Some(self.calls) {
            Err(FirmwareError(what))
        } else {
            Ok(())
        }
    }
}

impl Firmware for MockFirmware {
    fn allocate(&mut self, bytes: usize) -> Result<(), FirmwareError> {
        self.tick("allocate")?;
        self.allocated_bytes += bytes;
        Ok(())
    }

    fn free(&mut self, bytes: usize) {
        self.allocated_bytes = self.allocated_bytes.saturating_sub(bytes);
    }

    fn enumerate_config_volumes(&mut self) -> Result<Vec<u32>, FirmwareError> {
        self.tick("enumerate")?;
        Ok(self
            .volumes
            .iter()
            .enumerate()
            .filter(|(_, v)| v.eligible)
            .map(|(i, _)| i as u32)
            .collect())
    }

    fn is_on_boot_volume(&mut self, volume_index: u32) -> bool {
        self.volumes[volume_index as usize].on_boot_volume
    }

    fn open_config_file(&mut self, volume_index: u32) -> Result<FileHandle, FirmwareError> {
        self.tick("open")?;
        Ok(FileHandle(volume_index as u64))
    }

    fn read_config_file(
        &mut self,
        handle: FileHandle,
        buf: &mut [u8],
    ) -> Result<usize, FirmwareError> {
        self.tick("read")?;
        match &self.volumes[handle.0 as usize].envdata {
            Some(envdata) => {
                let bytes = envdata.encode();
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }

    fn open_config_file_rw(&mut self, volume_index: u32) -> Result<FileHandle, FirmwareError> {
        self.tick("open_rw")?;
        Ok(FileHandle(volume_index as u64))
    }

    fn write_config_file(&mut self, handle: FileHandle, buf: &[u8]) -> Result<(), FirmwareError> {
        self.tick("write")?;
        if buf.len() != RECORD_SIZE {
            return Err(FirmwareError("write"));
        }
        let envdata = EnvData::decode(buf).map_err(|_| FirmwareError("write"))?;
        self.volumes[handle.0 as usize].written = Some(envdata);
        Ok(())
    }

    fn close_config_file(&mut self, _volume_index: u32, _handle: FileHandle) -> Result<(), FirmwareError> {
        self.tick("close")
    }
}

/// Build an [`EnvData`] from plain Rust strings, for readable test
/// scenarios, instead of hand-filling fixed `[u16; N]` buffers.
pub fn env(
    revision: u32,
    in_progress: u16,
    ustate: UState,
    kernelfile: &str,
    kernelparams: &str,
    watchdog_timeout_sec: u32,
) -> EnvData {
    let mut kf = [0u16; ENV_STRING_LENGTH];
    for (slot, unit) in kf.iter_mut().zip(kernelfile.encode_utf16()) {
        *slot = unit;
    }
    let mut kp = [0u16; ENV_STRING_LENGTH];
    for (slot, unit) in kp.iter_mut().zip(kernelparams.encode_utf16()) {
        *slot = unit;
    }
    EnvData {
        revision,
        in_progress: InProgress(in_progress),
        ustate,
        kernelfile: kf,
        kernelparams: kp,
        watchdog_timeout_sec,
    }
}
