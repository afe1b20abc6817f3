//! Real-valued bands merged from an integer scan, and the per-axis
//! specializations that drive it (C8).

use crate::bands::integer::{DaidalusIntegerBands, Integerval, Region};
use crate::criteria::{horizontal_coordination, vertical_coordination_conflict};
use crate::detection::{CdCylinder, conflict_detection};
use crate::error::ErrorLog;
use crate::geom::{Vect3, Velocity, util, vect2_of};
use crate::intervals::{Interval, IntervalSet};
use crate::kinematics;

/// A caution-colored interval of values for one axis (radians for track,
/// m/s for ground speed and vertical speed, meters for altitude).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandsRange {
    pub lb: f64,
    pub ub: f64,
    pub region: Region,
}

impl BandsRange {
    pub fn width(&self) -> f64 {
        self.ub - self.lb
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lb && x <= self.ub
    }
}

/// Discretization parameters for one axis's scan.
#[derive(Debug, Clone, Copy)]
pub struct AxisConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// `true` for the track axis, which wraps at `2*pi` rather than
    /// clamping at `max`.
    pub modular: bool,
}

impl AxisConfig {
    fn step_count(&self) -> i64 {
        ((self.max - self.min) / self.step).round().max(0) as i64
    }

    fn value_at(&self, step: i64) -> f64 {
        self.min + step as f64 * self.step
    }
}

/// A well-clear tier: a cylinder paired with the lookahead horizon and
/// [`Region`] reported when conflict is detected against it within that
/// horizon. Tiers are typically ordered widest-and-soonest-triggering
/// (`Far`) to narrowest (`Near`), and the scan reports the single most
/// severe tier that fires.
#[derive(Debug, Clone, Copy)]
pub struct Tier {
    pub cylinder: CdCylinder,
    pub horizon: f64,
    pub region: Region,
}

/// Nudge applied to a tier's cylinder dimensions, signed by the C6
/// coordination epsilons, so that two cooperative aircraft resolving the
/// same encounter see a consistently asymmetric hazard boundary instead of
/// both picking the same side.
const COORDINATION_MARGIN: f64 = 1e-6;

fn worst_region(own_name: &str, own_pos: Vect3, own_vel: Velocity, traffic: &[(&str, Vect3, Velocity)], tiers: &[Tier]) -> Region {
    let mut worst = Region::None;
    for (name, t_pos, t_vel) in traffic {
        let s = *t_pos - own_pos;
        let v = t_vel.vect3() - own_vel.vect3();
        let eps_h = horizontal_coordination(vect2_of(s), vect2_of(v)) as f64;
        for tier in tiers {
            let eps_v = vertical_coordination_conflict(
                s,
                own_vel.vect3(),
                t_vel.vect3(),
                tier.cylinder.d,
                tier.cylinder.h,
                own_name,
                name,
            ) as f64;
            let cyl = CdCylinder::new(
                tier.cylinder.d + eps_h * COORDINATION_MARGIN,
                tier.cylinder.h + eps_v * COORDINATION_MARGIN,
            );
            if conflict_detection(s, v, cyl, 0.0, tier.horizon).conflict() {
                worst = worst.most_severe(tier.region);
            }
        }
    }
    worst
}

/// Shared conversion/merge step used by every axis: turns the run-length
/// encoded integer scan into caller-facing ranges in the axis's real units,
/// as a gap-free `NONE`/`FAR`/`MID`/`NEAR` partition of the full axis domain
/// (invariant 1) — unlike "bands" in the narrow sense of hazard-only
/// intervals, every point of `[cfg.min, cfg.max]` is covered by exactly one
/// output range.
///
/// Resolves Open Question (c): when clamping a modular axis's wrapped run
/// back into `[min, max]` collapses the interval to a single point, the
/// point is still emitted as a one-point `BandsRange` rather than dropped —
/// colored by the most severe region of the run that produced it.
pub struct RealBands;

impl RealBands {
    pub fn from_integer_runs(runs: &[Integerval], cfg: &AxisConfig) -> Vec<BandsRange> {
        let mut hazard = IntervalSet::new();
        let mut out: Vec<BandsRange> = Vec::with_capacity(runs.len());
        for run in runs {
            let mut lb = cfg.value_at(run.lb);
            let mut ub = cfg.value_at(run.ub + 1);
            if !cfg.modular {
                lb = lb.clamp(cfg.min, cfg.max);
                ub = ub.clamp(cfg.min, cfg.max);
            }
            if ub < lb {
                std::mem::swap(&mut ub, &mut lb);
            }
            if run.region != Region::None {
                let _ = hazard.union(Interval::new(lb, ub));
            }
            out.push(BandsRange { lb, ub, region: run.region });
        }

        // The integer scan already covers every step in `[0, step_count]`
        // contiguously, so `out` has no gaps between runs; what it can still
        // lose is an endpoint when a non-modular clamp collapses a boundary
        // run to nothing. Recover any such hole from the `IntervalSet`
        // complement of the hazard union (C2) and fold it back in as a
        // `None` range so the partition covers `[cfg.min, cfg.max]` exactly.
        let mut clear = IntervalSet::from_intervals(vec![Interval::new(cfg.min, cfg.max)]);
        let _ = clear.diffs(&hazard);
        clear.sweep_singletons(0.0);
        for gap in clear.intervals() {
            if !out.iter().any(|c| c.lb <= gap.lo && gap.hi <= c.ub) {
                out.push(BandsRange { lb: gap.lo, ub: gap.hi, region: Region::None });
            }
        }
        out.sort_by(|a, b| a.lb.partial_cmp(&b.lb).unwrap());
        out
    }
}

/// Track-angle axis: candidate headings evaluated via [`kinematics::turn_until`].
pub struct TrackAxis {
    pub cfg: AxisConfig,
    pub max_bank: f64,
    pub lookahead: f64,
}

impl TrackAxis {
    pub fn compute(
        &self,
        own_name: &str,
        own_pos: Vect3,
        own_vel: Velocity,
        traffic: &[(&str, Vect3, Velocity)],
        tiers: &[Tier],
        scanner: &DaidalusIntegerBands,
        log: &mut ErrorLog,
    ) -> Vec<BandsRange> {
        let steps = self.cfg.step_count();
        let result = scanner.scan(0, steps, |i| {
            let candidate_trk = util::modulo(self.cfg.value_at(i), util::TWO_PI);
            let (_s, v1) = kinematics::turn_until(own_pos, own_vel, self.lookahead, candidate_trk, self.max_bank);
            worst_region(own_name, own_pos, v1, traffic, tiers)
        });
        match result {
            Ok(runs) => RealBands::from_integer_runs(&runs, &self.cfg),
            Err(e) => {
                log.error(&e);
                Vec::new()
            }
        }
    }
}

/// Ground-speed axis: candidate speeds evaluated via [`kinematics::gs_accel_until`].
pub struct GsAxis {
    pub cfg: AxisConfig,
    pub accel: f64,
    pub lookahead: f64,
}

impl GsAxis {
    pub fn compute(
        &self,
        own_name: &str,
        own_pos: Vect3,
        own_vel: Velocity,
        traffic: &[(&str, Vect3, Velocity)],
        tiers: &[Tier],
        scanner: &DaidalusIntegerBands,
        log: &mut ErrorLog,
    ) -> Vec<BandsRange> {
        let steps = self.cfg.step_count();
        let result = scanner.scan(0, steps, |i| {
            let candidate_gs = self.cfg.value_at(i).max(0.0);
            let (_s, v1) = kinematics::gs_accel_until(own_pos, own_vel, self.lookahead, candidate_gs, self.accel);
            worst_region(own_name, own_pos, v1, traffic, tiers)
        });
        match result {
            Ok(runs) => RealBands::from_integer_runs(&runs, &self.cfg),
            Err(e) => {
                log.error(&e);
                Vec::new()
            }
        }
    }
}

/// Vertical-speed axis: candidate rates evaluated via [`kinematics::vs_accel_until`].
pub struct VsAxis {
    pub cfg: AxisConfig,
    pub accel: f64,
    pub lookahead: f64,
}

impl VsAxis {
    pub fn compute(
        &self,
        own_name: &str,
        own_pos: Vect3,
        own_vel: Velocity,
        traffic: &[(&str, Vect3, Velocity)],
        tiers: &[Tier],
        scanner: &DaidalusIntegerBands,
        log: &mut ErrorLog,
    ) -> Vec<BandsRange> {
        let steps = self.cfg.step_count();
        let result = scanner.scan(0, steps, |i| {
            let candidate_vs = self.cfg.value_at(i);
            let (_s, v1) = kinematics::vs_accel_until(own_pos, own_vel, self.lookahead, candidate_vs, self.accel);
            worst_region(own_name, own_pos, v1, traffic, tiers)
        });
        match result {
            Ok(runs) => RealBands::from_integer_runs(&runs, &self.cfg),
            Err(e) => {
                log.error(&e);
                Vec::new()
            }
        }
    }
}

/// Altitude axis: candidate target altitudes evaluated via [`kinematics::vs_level_out`].
pub struct AltAxis {
    pub cfg: AxisConfig,
    pub climb_rate: f64,
    pub accel_up: f64,
    pub accel_down: f64,
    pub lookahead: f64,
}

impl AltAxis {
    pub fn compute(
        &self,
        own_name: &str,
        own_pos: Vect3,
        own_vel: Velocity,
        traffic: &[(&str, Vect3, Velocity)],
        tiers: &[Tier],
        scanner: &DaidalusIntegerBands,
        log: &mut ErrorLog,
    ) -> Vec<BandsRange> {
        let steps = self.cfg.step_count();
        let result = scanner.scan(0, steps, |i| {
            let target_alt = self.cfg.value_at(i);
            let (s1, v1) = kinematics::vs_level_out(
                own_pos,
                own_vel,
                self.lookahead,
                self.climb_rate,
                target_alt,
                self.accel_up,
                self.accel_down,
                true,
            );
            if crate::geom::is_invalid(s1) {
                return Region::Unknown;
            }
            worst_region(own_name, own_pos, v1, traffic, tiers)
        });
        match result {
            Ok(runs) => RealBands::from_integer_runs(&runs, &self.cfg),
            Err(e) => {
                log.error(&e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::integer::DaidalusIntegerBands;

    fn far_tier() -> Tier {
        Tier {
            cylinder: CdCylinder::new(9260.0, 304.8),
            horizon: 300.0,
            region: Region::Near,
        }
    }

    #[test]
    fn track_axis_reports_near_band_toward_converging_traffic() {
        let axis = TrackAxis {
            cfg: AxisConfig {
                min: 0.0,
                max: util::TWO_PI,
                step: 5f64.to_radians(),
                modular: true,
            },
            max_bank: 25f64.to_radians(),
            lookahead: 5.0,
        };
        let own_pos = Vect3::new(0.0, 0.0, 0.0);
        let own_vel = Velocity::mk_trk_gs_vs(0.0, 150.0, 0.0);
        let traffic = vec![("intruder", Vect3::new(0.0, 18520.0, 0.0), Velocity::mk_trk_gs_vs(std::f64::consts::PI, 150.0, 0.0))];
        let scanner = DaidalusIntegerBands::default();
        let mut log = ErrorLog::default();
        let bands = axis.compute("ownship", own_pos, own_vel, &traffic, &[far_tier()], &scanner, &mut log);
        assert!(bands.iter().any(|b| b.region == Region::Near));
        // Gap-free partition: every range abuts the next with no hole.
        let mut sorted = bands.clone();
        sorted.sort_by(|a, b| a.lb.partial_cmp(&b.lb).unwrap());
        for w in sorted.windows(2) {
            assert!((w[0].ub - w[1].lb).abs() < 1e-9);
        }
        assert!((sorted.first().unwrap().lb - 0.0).abs() < 1e-9);
        assert!((sorted.last().unwrap().ub - util::TWO_PI).abs() < 1e-6);
    }

    #[test]
    fn no_traffic_produces_one_none_band_spanning_the_domain() {
        let axis = GsAxis {
            cfg: AxisConfig {
                min: 0.0,
                max: 300.0,
                step: 10.0,
                modular: false,
            },
            accel: 1.0,
            lookahead: 10.0,
        };
        let own_pos = Vect3::new(0.0, 0.0, 0.0);
        let own_vel = Velocity::mk_trk_gs_vs(0.0, 150.0, 0.0);
        let scanner = DaidalusIntegerBands::default();
        let mut log = ErrorLog::default();
        let bands = axis.compute("ownship", own_pos, own_vel, &[], &[far_tier()], &scanner, &mut log);
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].region, Region::None);
        assert_eq!(bands[0].lb, 0.0);
        assert_eq!(bands[0].ub, 300.0);
        assert!(!log.has_error());
    }
}
