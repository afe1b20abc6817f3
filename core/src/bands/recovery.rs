//! Recovery bands: when every direction on an axis is in conflict, find a
//! way back to well-clear instead of reporting a fully-blocked band (C8
//! recovery path).

use crate::detection::{CdCylinder, conflict_detection};
use crate::error::{BandsError, ErrorLog};
use crate::geom::{Vect3, Velocity};

/// Diagnostics describing how recovery bands were computed for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryInformation {
    /// Seconds until the encounter clears on its own, `0.0` if already
    /// clear, or `-inf` if recovery bands saturated (the well-clear cylinder
    /// was shrunk to the configured minimum without finding a clear
    /// direction).
    time_to_recovery: f64,
    /// Number of cylinder-shrink attempts applied before a clear direction
    /// was found (or saturation was declared).
    n_factor: i32,
    horizontal_distance: f64,
    vertical_distance: f64,
}

impl RecoveryInformation {
    pub fn time_to_recovery(&self) -> f64 {
        self.time_to_recovery
    }

    pub fn n_factor(&self) -> i32 {
        self.n_factor
    }

    pub fn recovery_horizontal_distance(&self) -> f64 {
        self.horizontal_distance
    }

    pub fn recovery_vertical_distance(&self) -> f64 {
        self.vertical_distance
    }

    /// `true` if a recovery result was actually produced (finite seconds,
    /// or the saturated sentinel `-inf`) rather than this axis never having
    /// needed recovery at all.
    pub fn recovery_bands_computed(&self) -> bool {
        self.time_to_recovery.is_finite() || self.time_to_recovery == f64::NEG_INFINITY
    }

    pub fn recovery_bands_saturated(&self) -> bool {
        self.time_to_recovery == f64::NEG_INFINITY
    }
}

/// Shrink `base_cyl` (the NMAC cylinder `(D_NMAC, H_NMAC)`, per the recovery
/// algorithm's step 1) by `shrink_factor` up to `max_shrinks` times, looking
/// for a cylinder size small enough that the ownship/traffic geometry is no
/// longer in conflict within `horizon`, then binary-searches the time until
/// that (possibly shrunk) geometry clears on its own, padded by
/// `recovery_stability_time`.
pub fn compute_recovery(
    own_pos: Vect3,
    own_vel: Velocity,
    traffic: &[(Vect3, Velocity)],
    base_cyl: CdCylinder,
    shrink_factor: f64,
    max_shrinks: u32,
    horizon: f64,
    recovery_stability_time: f64,
    log: &mut ErrorLog,
) -> RecoveryInformation {
    let mut cyl = base_cyl;
    let mut shrinks = 0u32;
    loop {
        let any_conflict = traffic.iter().any(|(p, v)| {
            let s = *p - own_pos;
            let rel_v = v.vect3() - own_vel.vect3();
            conflict_detection(s, rel_v, cyl, 0.0, horizon).conflict()
        });
        if !any_conflict {
            let ttr = binary_search_time_to_recovery(own_pos, own_vel, traffic, cyl, horizon, recovery_stability_time);
            return RecoveryInformation {
                time_to_recovery: ttr,
                n_factor: shrinks as i32,
                horizontal_distance: cyl.d,
                vertical_distance: cyl.h,
            };
        }
        if shrinks >= max_shrinks {
            log.error(&BandsError::Saturated { shrinks });
            return RecoveryInformation {
                time_to_recovery: f64::NEG_INFINITY,
                n_factor: shrinks as i32,
                horizontal_distance: cyl.d,
                vertical_distance: cyl.h,
            };
        }
        cyl = CdCylinder::new(cyl.d * shrink_factor, cyl.h * shrink_factor);
        shrinks += 1;
    }
}

fn binary_search_time_to_recovery(
    own_pos: Vect3,
    own_vel: Velocity,
    traffic: &[(Vect3, Velocity)],
    cyl: CdCylinder,
    horizon: f64,
    recovery_stability_time: f64,
) -> f64 {
    let still_conflicted = |from: f64| {
        traffic.iter().any(|(p, v)| {
            let s = *p - own_pos;
            let rel_v = v.vect3() - own_vel.vect3();
            conflict_detection(s, rel_v, cyl, from, horizon).conflict()
        })
    };
    let padding = recovery_stability_time.max(0.0);
    if !still_conflicted(0.0) {
        return padding;
    }
    let (mut lo, mut hi) = (0.0, horizon);
    for _ in 0..40 {
        let mid = 0.5 * (lo + hi);
        if still_conflicted(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    hi + padding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_clear_geometry_recovers_immediately() {
        let own_pos = Vect3::new(0.0, 0.0, 0.0);
        let own_vel = Velocity::mk_trk_gs_vs(0.0, 150.0, 0.0);
        let traffic = vec![(Vect3::new(50000.0, 0.0, 0.0), Velocity::mk_trk_gs_vs(0.0, 150.0, 0.0))];
        let mut log = ErrorLog::default();
        let info = compute_recovery(
            own_pos,
            own_vel,
            &traffic,
            CdCylinder::new(9260.0, 304.8),
            0.8,
            20,
            600.0,
            0.0,
            &mut log,
        );
        assert_eq!(info.time_to_recovery(), 0.0);
        assert_eq!(info.n_factor(), 0);
        assert!(info.recovery_bands_computed());
        assert!(!info.recovery_bands_saturated());
    }

    #[test]
    fn head_on_conflict_reports_positive_time_to_recovery() {
        let own_pos = Vect3::new(0.0, 0.0, 0.0);
        let own_vel = Velocity::mk_trk_gs_vs(0.0, 150.0, 0.0);
        let traffic = vec![(
            Vect3::new(0.0, 18000.0, 0.0),
            Velocity::mk_trk_gs_vs(std::f64::consts::PI, 150.0, 0.0),
        )];
        let mut log = ErrorLog::default();
        let info = compute_recovery(
            own_pos,
            own_vel,
            &traffic,
            CdCylinder::new(9260.0, 304.8),
            0.8,
            20,
            300.0,
            0.0,
            &mut log,
        );
        assert!(info.time_to_recovery() > 0.0);
    }

    #[test]
    fn unrecoverable_geometry_saturates() {
        let own_pos = Vect3::new(0.0, 0.0, 0.0);
        let own_vel = Velocity::mk_trk_gs_vs(0.0, 0.0, 0.0);
        // Stationary traffic permanently inside even a heavily-shrunk cylinder.
        let traffic = vec![(Vect3::new(1.0, 1.0, 0.0), Velocity::mk_trk_gs_vs(0.0, 0.0, 0.0))];
        let mut log = ErrorLog::default();
        let info = compute_recovery(
            own_pos,
            own_vel,
            &traffic,
            CdCylinder::new(9260.0, 304.8),
            0.8,
            5,
            300.0,
            0.0,
            &mut log,
        );
        assert!(info.recovery_bands_saturated());
        assert!(info.recovery_bands_computed());
        assert!(log.has_error());
    }
}
