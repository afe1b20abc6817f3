//! Cylindrical well-clear conflict detection (C5).
//!
//! Public API policy
//! -----------------
//! `violation` and `conflict_detection` are pure closed-form functions over a
//! relative position/velocity pair and the cylinder's half-dimensions `(D, H)`
//! — no trajectory sampling. Horizontal entry/exit times solve
//! `|s_xy + t*v_xy|^2 = D^2` (a quadratic in `t`); vertical entry/exit times
//! solve the linear `|s_z + t*v_z| = H`. A 3D loss-of-separation interval is
//! the intersection of the two 1D windows, clamped to the lookahead horizon
//! `[b, t_horizon]`.

use crate::geom::{Vect2, Vect3, det2, sq, sqrt_safe, vect2_of};

/// Cylindrical protected-zone half-dimensions: `d` horizontal radius (m),
/// `h` vertical half-height (m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdCylinder {
    pub d: f64,
    pub h: f64,
}

impl CdCylinder {
    pub fn new(d: f64, h: f64) -> Self {
        Self { d, h }
    }
}

/// `true` iff the ownship/intruder pair is in loss of separation *right now*
/// (`s` = intruder-relative-to-ownship position, at `t = 0`).
pub fn violation(s: Vect3, cyl: CdCylinder) -> bool {
    vect2_of(s).norm() < cyl.d && s.z.abs() < cyl.h
}

/// The time window, relative to now, during which the ownship/intruder pair
/// is horizontally within `cyl.d` of each other assuming constant relative
/// velocity `v`. `None` if the relative horizontal paths never come within
/// `cyl.d` (includes the degenerate stationary-and-already-clear case).
fn horizontal_window(s: Vect2, v: Vect2, d: f64) -> Option<(f64, f64)> {
    let a = v.norm_squared();
    if a < 1e-12 {
        return if s.norm() < d {
            Some((f64::NEG_INFINITY, f64::INFINITY))
        } else {
            None
        };
    }
    // |s + t v|^2 = d^2  <=>  a t^2 + 2(s.v) t + (|s|^2 - d^2) = 0
    let b = 2.0 * s.dot(&v);
    let c = s.norm_squared() - d * d;
    // Discriminant expressed via the cross product avoids catastrophic
    // cancellation when s and v are nearly parallel: disc/4 = d^2|v|^2 - det(s,v)^2.
    let disc_over_4 = d * d * a - sq(det2(s, v));
    if disc_over_4 < 0.0 {
        return None;
    }
    let sqrt_term = 2.0 * sqrt_safe(disc_over_4);
    let t_in = (-b - sqrt_term) / (2.0 * a);
    let t_out = (-b + sqrt_term) / (2.0 * a);
    let _ = c;
    Some((t_in, t_out))
}

/// The time window during which the ownship/intruder pair is within `cyl.h`
/// vertically, assuming constant relative vertical speed `vz`.
fn vertical_window(sz: f64, vz: f64, h: f64) -> Option<(f64, f64)> {
    if vz.abs() < 1e-12 {
        return if sz.abs() < h {
            Some((f64::NEG_INFINITY, f64::INFINITY))
        } else {
            None
        };
    }
    let t1 = (-h - sz) / vz;
    let t2 = (h - sz) / vz;
    Some((t1.min(t2), t1.max(t2)))
}

/// A resolved loss-of-separation interval within the lookahead horizon, plus
/// the time of closest horizontal approach (tca) used by some criteria
/// helpers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictData {
    pub time_in: f64,
    pub time_out: f64,
    pub time_crit: f64,
    pub dist_crit: f64,
    window_b: f64,
    window_t: f64,
}

impl ConflictData {
    /// `t_in <= t_out` (a grazing, zero-width window still counts as a
    /// conflict) and the window actually intersects the alerting horizon:
    /// `t_in < T` and `t_out > B`.
    pub fn conflict(&self) -> bool {
        self.time_in <= self.time_out && self.time_in < self.window_t && self.time_out > self.window_b
    }
}

fn tca_horizontal(s: Vect2, v: Vect2) -> f64 {
    let a = v.norm_squared();
    if a < 1e-12 {
        0.0
    } else {
        -s.dot(&v) / a
    }
}

/// Intersect the horizontal and vertical LoS windows for relative state
/// `(s, v)` against `cyl`, clamped to `[b, t]` (the alerting lookahead
/// horizon). Returns a `ConflictData` with `time_in >= time_out` (empty
/// window, i.e. no conflict in range) when the axes never overlap or the
/// overlap falls entirely outside `[b, t]`.
pub fn conflict_detection(s: Vect3, v: Vect3, cyl: CdCylinder, b: f64, t: f64) -> ConflictData {
    let empty = ConflictData {
        time_in: t,
        time_out: b,
        time_crit: tca_horizontal(vect2_of(s), vect2_of(v)),
        dist_crit: vect2_of(s).norm(),
        window_b: b,
        window_t: t,
    };
    let Some((h_in, h_out)) = horizontal_window(vect2_of(s), vect2_of(v), cyl.d) else {
        return empty;
    };
    let Some((v_in, v_out)) = vertical_window(s.z, v.z, cyl.h) else {
        return empty;
    };
    let time_in = h_in.max(v_in).max(b);
    let time_out = h_out.min(v_out).min(t);
    let tca = tca_horizontal(vect2_of(s), vect2_of(v)).clamp(b, t);
    ConflictData {
        time_in,
        time_out,
        time_crit: tca,
        dist_crit: vect2_of(s + v * tca).norm(),
        window_b: b,
        window_t: t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_on_traffic_is_detected_as_conflict() {
        // Intruder 10 nmi ahead, closing at 200 m/s; well-clear cylinder 5 nmi / 1000 ft.
        let s = Vect3::new(0.0, 18520.0, 0.0);
        let v = Vect3::new(0.0, -200.0, 0.0);
        let cyl = CdCylinder::new(9260.0, 304.8);
        let cd = conflict_detection(s, v, cyl, 0.0, 600.0);
        assert!(cd.conflict());
        assert!(cd.time_in > 0.0 && cd.time_in < cd.time_out);
    }

    #[test]
    fn parallel_non_crossing_traffic_is_not_a_conflict() {
        let s = Vect3::new(20000.0, 0.0, 0.0);
        let v = Vect3::new(0.0, -200.0, 0.0);
        let cyl = CdCylinder::new(9260.0, 304.8);
        let cd = conflict_detection(s, v, cyl, 0.0, 600.0);
        assert!(!cd.conflict());
    }

    #[test]
    fn violation_requires_both_axes_inside_cylinder() {
        let cyl = CdCylinder::new(9260.0, 304.8);
        assert!(violation(Vect3::new(100.0, 100.0, 50.0), cyl));
        assert!(!violation(Vect3::new(100.0, 100.0, 500.0), cyl));
        assert!(!violation(Vect3::new(50000.0, 0.0, 0.0), cyl));
    }

    #[test]
    fn vertical_separation_alone_prevents_conflict() {
        let s = Vect3::new(0.0, 0.0, 2000.0);
        let v = Vect3::new(0.0, -200.0, 0.0);
        let cyl = CdCylinder::new(9260.0, 304.8);
        let cd = conflict_detection(s, v, cyl, 0.0, 600.0);
        assert!(!cd.conflict());
    }

    #[test]
    fn stationary_relative_state_inside_cylinder_is_conflict_for_full_horizon() {
        let s = Vect3::new(100.0, 0.0, 0.0);
        let v = Vect3::new(0.0, 0.0, 0.0);
        let cyl = CdCylinder::new(9260.0, 304.8);
        let cd = conflict_detection(s, v, cyl, 0.0, 600.0);
        assert!(cd.conflict());
        assert_eq!(cd.time_in, 0.0);
        assert_eq!(cd.time_out, 600.0);
    }
}
