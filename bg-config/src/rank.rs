//! The ranker (C4): a streaming top-2 reduction over read records.
//!
//! A `reduce` over the read stream with a state of
//! `(Option<Candidate>, Option<Candidate>)` and the five-key preference
//! predicate below gives a branch-free, allocation-free implementation
//! that is independent of insertion order — see `rank_key` for the
//! total order that makes this shuffle-invariant.
use core::cmp::Reverse;

use bg_config_core::{EnvData, InProgress};

/// One successfully read, normalised record plus the volume metadata
/// the predicate needs.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub envdata: EnvData,
    pub volume_index: u32,
    pub on_boot_volume: bool,
}

/// Total, deterministic ordering key: smaller is more preferred.
///
/// Keys, in priority order (spec §4.4):
/// 1. `in_progress` ascending — not mid-write beats mid-write.
/// 2. `revision` descending (via [`Reverse`]) — newer beats older.
/// 3. `ustate` rank ascending — `INSTALLED` < `TESTING` < `OK` < `FAILED`/unknown.
/// 4. on-boot-volume descending (via negation) — the copy physically on
///    the booted ESP wins ties.
/// 5. `volume_index` ascending — last-resort, total tiebreak.
fn rank_key(c: &Candidate) -> (InProgress, Reverse<u32>, u8, bool, u32) {
    (
        c.envdata.in_progress,
        Reverse(c.envdata.revision),
        c.envdata.ustate.rank(),
        !c.on_boot_volume,
        c.volume_index,
    )
}

/// `true` if `a` is strictly preferred over `b`. Ties keep `b`
/// (spec: "Otherwise equal ⇒ Keep").
fn better(a: &Candidate, b: &Candidate) -> bool {
    rank_key(a) < rank_key(b)
}

/// Holds the best and second-best [`Candidate`] seen so far.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    best: Option<Candidate>,
    second_best: Option<Candidate>,
}

impl Ranking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one more read record into the ranking. A present candidate
    /// is always preferred to an absent slot; between two present
    /// candidates, [`better`] decides. Two-step bubble: the new
    /// candidate first displaces `second_best` if it wins there, then
    /// the (possibly updated) `second_best` displaces `best` if it
    /// wins there. This is exactly the original's `sift_envdata_volume`
    /// pair, and gives the same result regardless of insertion order.
    pub fn insert(&mut self, candidate: Candidate) {
        let candidate_wins_second = match &self.second_best {
            None => true,
            Some(sb) => better(&candidate, sb),
        };
        if candidate_wins_second {
            self.second_best = Some(candidate);
        }

        let second_wins_best = match (&self.best, &self.second_best) {
            (None, Some(_)) => true,
            (Some(b), Some(sb)) => better(sb, b),
            _ => false,
        };
        if second_wins_best {
            core::mem::swap(&mut self.best, &mut self.second_best);
        }
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    pub fn second_best(&self) -> Option<&Candidate> {
        self.second_best.as_ref()
    }

    pub fn into_parts(self) -> (Option<Candidate>, Option<Candidate>) {
        (self.best, self.second_best)
    }
}

#[cfg(test)]
mod tests {
    use bg_config_core::UState;

    use super::*;

    fn candidate(revision: u32, ustate: UState, in_progress: u16, volume_index: u32) -> Candidate {
        Candidate {
            envdata: EnvData {
                revision,
                in_progress: InProgress(in_progress),
                ustate,
                kernelfile: [0u16; bg_config_core::ENV_STRING_LENGTH],
                kernelparams: [0u16; bg_config_core::ENV_STRING_LENGTH],
                watchdog_timeout_sec: 0,
            },
            volume_index,
            on_boot_volume: false,
        }
    }

    #[test]
    fn higher_revision_wins() {
        let mut r = Ranking::new();
        r.insert(candidate(1, UState::Ok, 0, 0));
        r.insert(candidate(2, UState::Ok, 0, 1));
        assert_eq!(r.best().unwrap().envdata.revision, 2);
        assert_eq!(r.second_best().unwrap().envdata.revision, 1);
    }

    #[test]
    fn in_progress_is_worse_regardless_of_revision() {
        let mut r = Ranking::new();
        r.insert(candidate(2, UState::Ok, 1, 0));
        r.insert(candidate(1, UState::Ok, 0, 1));
        assert_eq!(r.best().unwrap().volume_index, 1);
    }

    #[test]
    fn installed_beats_testing_beats_ok() {
        let mut r = Ranking::new();
        r.insert(candidate(1, UState::Ok, 0, 0));
        r.insert(candidate(1, UState::Testing, 0, 1));
        r.insert(candidate(1, UState::Installed, 0, 2));
        assert_eq!(r.best().unwrap().volume_index, 2);
        assert_eq!(r.second_best().unwrap().volume_index, 1);
    }

    #[test]
    fn failed_is_least_preferred() {
        let mut r = Ranking::new();
        r.insert(candidate(5, UState::Failed, 0, 0));
        r.insert(candidate(1, UState::Ok, 0, 1));
        assert_eq!(r.best().unwrap().volume_index, 1);
    }

    #[test]
    fn shuffle_invariant() {
        let items = [
            candidate(3, UState::Ok, 0, 0),
            candidate(3, UState::Installed, 0, 1),
            candidate(9, UState::Testing, 1, 2),
            candidate(1, UState::Ok, 0, 3),
        ];

        let mut orders = alloc::vec::Vec::new();
        for start in 0..items.len() {
            let mut order: alloc::vec::Vec<usize> = (0..items.len()).collect();
            order.rotate_left(start);
            orders.push(order);
        }

        let mut results = alloc::vec::Vec::new();
        for order in orders {
            let mut r = Ranking::new();
            for idx in order {
                r.insert(items[idx]);
            }
            results.push((r.best().unwrap().volume_index, r.second_best().map(|c| c.volume_index)));
        }

        let first = results[0];
        assert!(results.iter().all(|r| *r == first));
    }

    #[test]
    fn volume_index_is_final_tiebreak() {
        let mut r = Ranking::new();
        r.insert(candidate(1, UState::Ok, 0, 5));
        r.insert(candidate(1, UState::Ok, 0, 2));
        assert_eq!(r.best().unwrap().volume_index, 2);
    }

    #[test]
    fn on_boot_volume_breaks_ties_before_index() {
        let mut a = candidate(1, UState::Ok, 0, 5);
        a.on_boot_volume = true;
        let b = candidate(1, UState::Ok, 0, 2);

        let mut r = Ranking::new();
        r.insert(a);
        r.insert(b);
        assert_eq!(r.best().unwrap().volume_index, 5);
    }
}
