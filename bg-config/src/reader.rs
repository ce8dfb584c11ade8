//! The record reader (C3): open → read → close one volume's config file.
use bg_config_core::{EnvData, RECORD_SIZE};
use log::{trace, warn};

use crate::{
    error::{ReadError, Sticky},
    firmware::Firmware,
};

/// Read and decode the configuration record on `volume_index`.
///
/// Close failure is reported through the returned [`Sticky`] flag but
/// never masks a prior read error, nor does it get promoted to a hard
/// failure if the read itself succeeded — matching the original C's
/// `read_config`.
pub fn read_volume_record<F: Firmware + ?Sized>(
    fw: &mut F,
    volume_index: u32,
) -> (Result<EnvData, ReadError>, Sticky) {
    let handle = match fw.open_config_file(volume_index) {
        Ok(h) => h,
        Err(e) => {
            warn!("could not open environment file on volume {volume_index}: {e}");
            return (Err(ReadError::Open(e)), Sticky::Errored);
        }
    };

    let mut buf = [0u8; RECORD_SIZE];
    let read_result = fw.read_config_file(handle, &mut buf);

    let mut errored = Sticky::Clean;
    if let Err(e) = fw.close_config_file(volume_index, handle) {
        warn!("could not close environment config file on volume {volume_index}: {e}");
        errored = Sticky::Errored;
    }

    let got = match read_result {
        Ok(got) => got,
        Err(e) => {
            warn!("cannot read environment file on volume {volume_index}: {e}");
            return (Err(ReadError::Read(e)), errored | Sticky::Errored);
        }
    };

    if got != RECORD_SIZE {
        warn!("environment file on volume {volume_index} has wrong size: {got} bytes");
        return (
            Err(ReadError::BadBufferSize { got }),
            errored | Sticky::Errored,
        );
    }

    match EnvData::decode(&buf) {
        Ok(envdata) => {
            trace!("read environment file on volume {volume_index}");
            (Ok(envdata), errored)
        }
        Err(e) => {
            warn!("CRC error in environment data on volume {volume_index}: {e}");
            (Err(ReadError::Decode(e)), errored | Sticky::Errored)
        }
    }
}
