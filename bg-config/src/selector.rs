//! The selector/writer (C5): state-machine transitions on `best`,
//! selective write-back, and the `load_config` entry point.
use bg_config_core::{EnvData, UState, FixedWideStr, REVISION_FAILED};
use log::{error, info};

use crate::{
    error::{LoadError, Sticky, WriteError},
    firmware::{Firmware, LoaderParams, Topology},
    rank::{Candidate, Ranking},
    reader::read_volume_record,
};

/// The two non-error outcomes of [`load_config`], matching spec §7's
/// degraded/clean split. Both carry the same [`LoaderParams`]; only
/// the caller's handling of the status differs (e.g. whether to
/// surface a warning to the platform).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Success(LoaderParams),
    PartiallyCorrupted(LoaderParams),
}

impl LoadOutcome {
    pub fn params(&self) -> &LoaderParams {
        match self {
            LoadOutcome::Success(p) | LoadOutcome::PartiallyCorrupted(p) => p,
        }
    }
}

/// Persist a mutated record back to its origin volume. Write-back
/// failures are reported to the caller, which folds them into the
/// sticky `errored` flag rather than aborting selection (spec §7:
/// "selection continues").
fn persist<F: Firmware + ?Sized>(
    fw: &mut F,
    volume_index: u32,
    envdata: &EnvData,
) -> Result<(), WriteError> {
    let bytes = envdata.encode();
    let handle = fw.open_config_file_rw(volume_index).map_err(WriteError::Open)?;
    let write_result = fw.write_config_file(handle, &bytes);
    let close_result = fw.close_config_file(volume_index, handle);
    write_result.map_err(WriteError::Write)?;
    close_result.map_err(WriteError::Close)?;
    Ok(())
}

fn to_params(envdata: &EnvData) -> LoaderParams {
    LoaderParams {
        payload_path: FixedWideStr::new(&envdata.kernelfile).to_string_lossy(),
        payload_options: FixedWideStr::new(&envdata.kernelparams).to_string_lossy(),
        timeout: envdata.watchdog_timeout_sec,
    }
}

/// Find all the viable configs across every enumerated volume, apply
/// the state-machine transition on the most preferred one, persist it,
/// and produce loader parameters.
///
/// See spec §4.5 for the full state table. The two open questions of
/// spec §9 are both resolved as "preserve the original's behavior
/// exactly" (see `DESIGN.md`).
pub fn load_config<F: Firmware + ?Sized>(
    fw: &mut F,
    topology: Topology,
) -> Result<LoadOutcome, LoadError> {
    // Mirrors the original's `AllocatePool` for the volume-index
    // buffer, sized off the configured topology rather than a
    // `#define`d maximum. Freed below on every exit path.
    let scratch_bytes = topology.expected_config_parts as usize * core::mem::size_of::<u32>();
    if fw.allocate(scratch_bytes).is_err() {
        error!("no volumes available for config partitions");
        return Err(LoadError::ConfigError);
    }

    let result = (|| -> Result<(LoaderParams, Sticky), LoadError> {
        let mut errored = Sticky::Clean;

        let volumes = fw.enumerate_config_volumes().map_err(|_| {
            error!("could not enumerate config partitions");
            LoadError::ConfigError
        })?;

        if volumes.len() as u32 != topology.expected_config_parts {
            errored |= Sticky::Errored;
        }

        let mut ranking = Ranking::new();
        for volume_index in volumes {
            let (outcome, read_errored) = read_volume_record(fw, volume_index);
            errored |= read_errored;

            let envdata = match outcome {
                Ok(envdata) => envdata,
                Err(_) => continue,
            };

            let on_boot_volume = fw.is_on_boot_volume(volume_index);
            ranking.insert(Candidate {
                envdata,
                volume_index,
                on_boot_volume,
            });
        }

        let (best, prev) = ranking.into_parts();

        let best = match best {
            Some(best) if !best.envdata.in_progress.to_bool() => best,
            _ => {
                error!("could not find any valid config partition");
                return Err(LoadError::ConfigError);
            }
        };

        let chosen = match best.envdata.ustate {
            UState::Testing => {
                let mut demoted = best.envdata;
                demoted.ustate = UState::Failed;
                demoted.revision = REVISION_FAILED;
                if persist(fw, best.volume_index, &demoted).is_err() {
                    errored |= Sticky::Errored;
                }

                match prev {
                    Some(prev) => prev.envdata,
                    None => {
                        error!("could not find previous valid config partition");
                        return Err(LoadError::ConfigError);
                    }
                }
            }
            UState::Installed => {
                let mut tested = best.envdata;
                tested.ustate = UState::Testing;
                if persist(fw, best.volume_index, &tested).is_err() {
                    errored |= Sticky::Errored;
                }
                tested
            }
            UState::Ok | UState::Failed => best.envdata,
        };

        let params = to_params(&chosen);
        info!(
            "choosing config revision {}, ustate {:?}: kernel={} args={} timeout={}s",
            chosen.revision,
            chosen.ustate,
            params.payload_path,
            params.payload_options,
            params.timeout
        );

        Ok((params, errored))
    })();

    fw.free(scratch_bytes);

    match result {
        Ok((params, errored)) if errored.errored() => Ok(LoadOutcome::PartiallyCorrupted(params)),
        Ok((params, _)) => Ok(LoadOutcome::Success(params)),
        Err(e) => Err(e),
    }
}

/// Writing new records is a host-side task (spec §1 Non-goal); this
/// crate only ever consumes what the host updater already wrote.
pub fn save_config() -> Result<(), LoadError> {
    Err(LoadError::NotImplemented)
}
