//! Fixed-width UTF-16 strings, as stored in [`EnvData`][crate::record::EnvData].
//!
//! Modeled after the teacher's borrowed/owned string split
//! (`nuefi::string::{UefiStr, UefiString}`): a thin borrowed view over a
//! `[u16; N]` code-unit array, with a lossy conversion to an owned
//! [`alloc::string::String`] for everything past the boot-time boundary.
use alloc::string::String;

/// A borrowed view over a fixed-width, NUL-padded UTF-16 buffer.
///
/// The buffer is assumed already normalised (last code unit `0`); this
/// type does not re-check that invariant, the way `EnvData::decode`
/// does once, up front.
#[derive(Debug, Clone, Copy)]
pub struct FixedWideStr<'a> {
    units: &'a [u16],
}

impl<'a> FixedWideStr<'a> {
    /// Wrap a fixed-width code-unit buffer.
    pub const fn new(units: &'a [u16]) -> Self {
        Self { units }
    }

    /// The code units up to (not including) the first NUL.
    pub fn as_slice(&self) -> &'a [u16] {
        let len = self
            .units
            .iter()
            .position(|&u| u == 0)
            .unwrap_or(self.units.len());
        &self.units[..len]
    }

    /// Decode to an owned [`String`]. Unpaired surrogates decode to
    /// [`char::REPLACEMENT_CHARACTER`], exactly as the teacher's
    /// `UefiStr::to_string` does.
    pub fn to_string_lossy(&self) -> String {
        char::decode_utf16(self.as_slice().iter().copied())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_up_to_first_nul() {
        let mut buf = [0u16; 8];
        let s: alloc::vec::Vec<u16> = "hi".encode_utf16().collect();
        buf[..s.len()].copy_from_slice(&s);
        let view = FixedWideStr::new(&buf);
        assert_eq!(view.to_string_lossy(), "hi");
    }

    #[test]
    fn empty_buffer_decodes_to_empty_string() {
        let buf = [0u16; 4];
        assert_eq!(FixedWideStr::new(&buf).to_string_lossy(), "");
    }
}
