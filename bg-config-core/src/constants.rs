//! Compile-time constants of the on-disk record layout.
//!
//! These mirror the `#define`s of the original `envdata.h`/`bg_envdata.h`
//! headers (`ENV_STRING_LENGTH`, `REVISION_FAILED`); they are layout
//! constants, not configuration, so unlike [`crate::Topology`]-style
//! values they are not meant to vary per board.

/// Width, in UTF-16 code units including the terminating NUL, of
/// `kernelfile` and `kernelparams`.
pub const ENV_STRING_LENGTH: usize = 256;

/// Sentinel `revision` written when a `TESTING` record is demoted to
/// `FAILED`.
pub const REVISION_FAILED: u32 = 0;

/// Number of record slots reserved for ranking: one for `best`, one for
/// `second_best`, one scratch slot being filled by the reader.
pub const N_SLOTS: usize = 3;

/// Default number of redundant configuration partitions a platform is
/// expected to carry.
pub const ENV_NUM_CONFIG_PARTS: u32 = 2;
