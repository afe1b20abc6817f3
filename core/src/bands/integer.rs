//! Discretized region scan, run-length encoded into [`Integerval`]s (C7).

use crate::error::BandsError;

/// Severity/coloring of a band interval, ordered from least to most
/// cautionary (`Ord` derives the "most severe of two regions" comparison
/// used while merging overlapping traffic contributions). The integer scan
/// itself never assigns `Recovery`; `DaidalusCore::compute` recolors a
/// NEAR-saturated axis to `Recovery` after the fact, once a recovery
/// maneuver has actually been found for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Region {
    None,
    Far,
    Mid,
    Near,
    Recovery,
    Unknown,
}

impl Region {
    pub fn most_severe(self, other: Region) -> Region {
        self.max(other)
    }
}

/// A run of consecutive integer steps sharing one `region`, as produced by
/// [`DaidalusIntegerBands::scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integerval {
    pub lb: i64,
    pub ub: i64,
    pub region: Region,
}

/// Upper bound on the number of runs a scan may produce before it reports
/// [`BandsError::CapacityExceeded`] instead of continuing to grow unbounded.
pub const DEFAULT_MAX_RUNS: usize = 1000;

/// Scans an integer step range, merging consecutive equal-region steps.
/// Growable `Vec`-backed replacement for the reference's fixed-size ring:
/// growth past `capacity` is reported, not silently truncated.
pub struct DaidalusIntegerBands {
    capacity: usize,
}

impl Default for DaidalusIntegerBands {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RUNS)
    }
}

impl DaidalusIntegerBands {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }

    /// Evaluate `region_at(step)` for every `step` in `[min_step, max_step]`
    /// and merge adjacent equal-region steps into a single [`Integerval`].
    pub fn scan(
        &self,
        min_step: i64,
        max_step: i64,
        mut region_at: impl FnMut(i64) -> Region,
    ) -> Result<Vec<Integerval>, BandsError> {
        let mut out: Vec<Integerval> = Vec::new();
        for step in min_step..=max_step {
            let region = region_at(step);
            if let Some(last) = out.last_mut() {
                if last.region == region && last.ub + 1 == step {
                    last.ub = step;
                    continue;
                }
            }
            if out.len() >= self.capacity {
                return Err(BandsError::CapacityExceeded {
                    limit: self.capacity,
                });
            }
            out.push(Integerval {
                lb: step,
                ub: step,
                region,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_equal_regions_are_merged_into_one_run() {
        let bands = DaidalusIntegerBands::default();
        let runs = bands
            .scan(0, 5, |s| if s < 3 { Region::None } else { Region::Near })
            .unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], Integerval { lb: 0, ub: 2, region: Region::None });
        assert_eq!(runs[1], Integerval { lb: 3, ub: 5, region: Region::Near });
    }

    #[test]
    fn capacity_exceeded_is_reported_not_truncated() {
        let bands = DaidalusIntegerBands::new(2);
        let err = bands.scan(0, 5, |s| if s % 2 == 0 { Region::Near } else { Region::Far });
        assert!(matches!(err, Err(BandsError::CapacityExceeded { limit: 2 })));
    }

    #[test]
    fn most_severe_picks_the_more_cautionary_region() {
        assert_eq!(Region::Near.most_severe(Region::Far), Region::Near);
        assert_eq!(Region::Recovery.most_severe(Region::Unknown), Region::Unknown);
    }
}
