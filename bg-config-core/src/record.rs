//! The fixed-size, CRC-protected configuration record (`EnvData`).
use crc::{Algorithm, Crc};

use crate::{
    base::InProgress,
    constants::ENV_STRING_LENGTH,
    error::{CodecError, Result},
};

/// The CRC32 variant used by the host updater: IEEE polynomial
/// `0xEDB88320`, seeded with `0`, with no final XOR. This is *not* the
/// usual zlib/`CRC_32_ISO_HDLC` CRC-32 (which seeds with and XORs by
/// `0xFFFFFFFF`) and must stay bit-identical with the host tooling that
/// writes these records.
const RECORD_CRC_ALGORITHM: Algorithm<u32> = Algorithm {
    width: 32,
    poly: 0x04c1_1db7,
    init: 0x0000_0000,
    refin: true,
    refout: true,
    xorout: 0x0000_0000,
    check: 0x0000_0000,
    residue: 0x0000_0000,
};

/// The CRC instance used to protect [`EnvData`] records.
pub static CRC: Crc<u32> = Crc::<u32>::new(&RECORD_CRC_ALGORITHM);

/// Update state of a configuration record.
///
/// Four arms, matching the host updater's state machine exactly. Any
/// raw on-disk byte other than `0`, `1`, or `2` decodes as `Failed`:
/// this folds the original "unknown state" case into the existing
/// `Failed` arm, since both are handled identically by the selector
/// (unselectable, no write-back) and by the rank table (rank `3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UState {
    Installed = 0,
    Testing = 1,
    Ok = 2,
    Failed = 3,
}

impl UState {
    /// Decode a raw on-disk discriminant.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => UState::Installed,
            1 => UState::Testing,
            2 => UState::Ok,
            _ => UState::Failed,
        }
    }

    /// Encode back to the on-disk discriminant.
    pub const fn to_raw(self) -> u8 {
        self as u8
    }

    /// Preference rank used by the ranker: lower sorts first.
    pub const fn rank(self) -> u8 {
        match self {
            UState::Installed => 0,
            UState::Testing => 1,
            UState::Ok => 2,
            UState::Failed => 3,
        }
    }
}

/// Fixed-size on-disk layout of one configuration partition's record.
///
/// `kernelfile`/`kernelparams` are stored as raw UTF-16 code unit
/// arrays rather than [`crate::string::FixedWideString`] so that
/// `EnvData` itself stays a plain `Copy` value, matching the teacher's
/// preference for `Copy` raw structures with ergonomic wrappers layered
/// on top.
#[derive(Debug, Clone, Copy)]
pub struct EnvData {
    /// Monotonic generation counter assigned by the host updater.
    pub revision: u32,
    /// Non-zero while the host updater is still writing this record.
    pub in_progress: InProgress,
    pub ustate: UState,
    pub kernelfile: [u16; ENV_STRING_LENGTH],
    pub kernelparams: [u16; ENV_STRING_LENGTH],
    pub watchdog_timeout_sec: u32,
}

/// Size in bytes of the on-disk record, CRC field included.
pub const RECORD_SIZE: usize = 4 // revision
    + 2 // in_progress
    + 1 // ustate
    + 1 // reserved, must be zero
    + ENV_STRING_LENGTH * 2 // kernelfile
    + ENV_STRING_LENGTH * 2 // kernelparams
    + 4 // watchdog_timeout_sec
    + 4; // crc32

/// Offset of the `crc32` field; CRC is computed over `[0, CRC_OFFSET)`.
const CRC_OFFSET: usize = RECORD_SIZE - 4;

impl EnvData {
    /// Serialize into the on-disk byte layout, computing and filling in
    /// the trailing CRC. `encode` touches only the CRC field; every
    /// other byte is a direct projection of `self`.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        let mut w = 0;

        buf[w..w + 4].copy_from_slice(&self.revision.to_le_bytes());
        w += 4;
        buf[w..w + 2].copy_from_slice(&self.in_progress.0.to_le_bytes());
        w += 2;
        buf[w] = self.ustate.to_raw();
        w += 1;
        // reserved byte
        w += 1;
        for unit in self.kernelfile {
            buf[w..w + 2].copy_from_slice(&unit.to_le_bytes());
            w += 2;
        }
        for unit in self.kernelparams {
            buf[w..w + 2].copy_from_slice(&unit.to_le_bytes());
            w += 2;
        }
        buf[w..w + 4].copy_from_slice(&self.watchdog_timeout_sec.to_le_bytes());
        w += 4;
        debug_assert_eq!(w, CRC_OFFSET);

        let crc = CRC.checksum(&buf[..CRC_OFFSET]);
        buf[CRC_OFFSET..RECORD_SIZE].copy_from_slice(&crc.to_le_bytes());
        buf
    }

    /// Deserialize a full [`RECORD_SIZE`]-byte buffer, verifying the CRC
    /// before normalising the two strings. The CRC check happens on the
    /// raw bytes as read, strictly before any normalisation, so
    /// normalisation can never mask a torn or corrupted write.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RECORD_SIZE {
            return Err(CodecError::ShortRead { got: bytes.len() });
        }

        let stored = u32::from_le_bytes(bytes[CRC_OFFSET..RECORD_SIZE].try_into().unwrap());
        let computed = CRC.checksum(&bytes[..CRC_OFFSET]);
        if stored != computed {
            return Err(CodecError::CrcMismatch { stored, computed });
        }

        let mut r = 0;
        let revision = u32::from_le_bytes(bytes[r..r + 4].try_into().unwrap());
        r += 4;
        let in_progress = InProgress(u16::from_le_bytes(bytes[r..r + 2].try_into().unwrap()));
        r += 2;
        let ustate = UState::from_raw(bytes[r]);
        r += 1;
        r += 1; // reserved

        let mut kernelfile = [0u16; ENV_STRING_LENGTH];
        for unit in &mut kernelfile {
            *unit = u16::from_le_bytes(bytes[r..r + 2].try_into().unwrap());
            r += 2;
        }
        let mut kernelparams = [0u16; ENV_STRING_LENGTH];
        for unit in &mut kernelparams {
            *unit = u16::from_le_bytes(bytes[r..r + 2].try_into().unwrap());
            r += 2;
        }
        let watchdog_timeout_sec = u32::from_le_bytes(bytes[r..r + 4].try_into().unwrap());
        r += 4;
        debug_assert_eq!(r, CRC_OFFSET);

        // Normalise: force NUL-termination. Must run after the CRC
        // check above, never before.
        kernelfile[ENV_STRING_LENGTH - 1] = 0;
        kernelparams[ENV_STRING_LENGTH - 1] = 0;

        Ok(EnvData {
            revision,
            in_progress,
            ustate,
            kernelfile,
            kernelparams,
            watchdog_timeout_sec,
        })
    }

    /// A record is valid iff both strings are NUL-terminated in their
    /// last slot (decode already enforces this, but callers that build
    /// an `EnvData` directly, e.g. in tests, can use this to check).
    pub fn is_normalised(&self) -> bool {
        self.kernelfile[ENV_STRING_LENGTH - 1] == 0
            && self.kernelparams[ENV_STRING_LENGTH - 1] == 0
    }

    /// A record is bootable iff valid and not mid-write.
    pub fn is_bootable(&self) -> bool {
        self.is_normalised() && !self.in_progress.to_bool()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    fn sample() -> EnvData {
        let mut kernelfile = [0u16; ENV_STRING_LENGTH];
        let k: Vec<u16> = "vmlinuz".encode_utf16().collect();
        kernelfile[..k.len()].copy_from_slice(&k);

        let mut kernelparams = [0u16; ENV_STRING_LENGTH];
        let p: Vec<u16> = "console=ttyS0".encode_utf16().collect();
        kernelparams[..p.len()].copy_from_slice(&p);

        EnvData {
            revision: 7,
            in_progress: InProgress(0),
            ustate: UState::Ok,
            kernelfile,
            kernelparams,
            watchdog_timeout_sec: 30,
        }
    }

    #[test]
    fn round_trips() {
        let rec = sample();
        let bytes = rec.encode();
        let decoded = EnvData::decode(&bytes).unwrap();
        assert_eq!(decoded.revision, rec.revision);
        assert_eq!(decoded.ustate, rec.ustate);
        assert_eq!(decoded.kernelfile, rec.kernelfile);
        assert_eq!(decoded.kernelparams, rec.kernelparams);
        assert_eq!(decoded.watchdog_timeout_sec, rec.watchdog_timeout_sec);
    }

    #[test]
    fn encode_touches_only_crc_field() {
        let rec = sample();
        let a = rec.encode();
        let b = rec.encode();
        assert_eq!(a, b);
        assert_eq!(&a[..CRC_OFFSET], &b[..CRC_OFFSET]);
    }

    #[test]
    fn short_read_is_rejected() {
        let rec = sample();
        let bytes = rec.encode();
        let err = EnvData::decode(&bytes[..RECORD_SIZE - 1]).unwrap_err();
        assert_eq!(err, CodecError::ShortRead { got: RECORD_SIZE - 1 });
    }

    #[test]
    fn crc_mismatch_is_detected() {
        let rec = sample();
        let mut bytes = rec.encode();
        bytes[0] ^= 0xff;
        assert!(matches!(
            EnvData::decode(&bytes),
            Err(CodecError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn decode_normalises_unterminated_strings() {
        let mut rec = sample();
        rec.kernelfile[ENV_STRING_LENGTH - 1] = b'x' as u16;
        let bytes = rec.encode();
        let decoded = EnvData::decode(&bytes).unwrap();
        assert!(decoded.is_normalised());
    }

    #[test]
    fn unknown_ustate_byte_collapses_to_failed() {
        assert_eq!(UState::from_raw(42), UState::Failed);
        assert_eq!(UState::Failed.rank(), 3);
    }
}
