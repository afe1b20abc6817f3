//! 2D/3D vector primitives, velocity, and ULP-tolerant numeric helpers (C1).
//!
//! Public API policy
//! -----------------
//! `Vect2`/`Vect3` are plain `nalgebra` vectors; domain-specific operations
//! (`det`, `perp_l`/`perp_r`, `hat`, turn-delta, "almost equals") are free
//! functions over them rather than inherent methods, since nalgebra's types
//! are foreign to this crate. `Velocity` is a small newtype over `Vect3` that
//! adds the track/ground-speed/vertical-speed view used throughout the bands
//! engine.

use nalgebra as na;

/// 2D vector in the local tangent-plane projection (meters, or m/s for a
/// velocity's horizontal component).
pub type Vect2 = na::Vector2<f64>;
/// 3D vector: `(x, y, z)` with `z` the vertical axis (meters, or m/s).
pub type Vect3 = na::Vector3<f64>;

/// Sentinel returned by kinematic functions given non-finite input. Every
/// component is `NaN`; `IntervalSet` treats `NaN` endpoints as "no bound"
/// rather than propagating a panic.
#[inline]
pub fn invalid_vect3() -> Vect3 {
    Vect3::new(f64::NAN, f64::NAN, f64::NAN)
}

#[inline]
pub fn is_invalid(v: Vect3) -> bool {
    v.x.is_nan() || v.y.is_nan() || v.z.is_nan()
}

/// 2D determinant (z-component of the 3D cross product): `a.x*b.y - a.y*b.x`.
#[inline]
pub fn det2(a: Vect2, b: Vect2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Rotate `v` 90 degrees left (counter-clockwise).
#[inline]
pub fn perp_l(v: Vect2) -> Vect2 {
    Vect2::new(-v.y, v.x)
}

/// Rotate `v` 90 degrees right (clockwise).
#[inline]
pub fn perp_r(v: Vect2) -> Vect2 {
    Vect2::new(v.y, -v.x)
}

/// Unit vector in the direction of `v`, or the zero vector if `v` is (almost)
/// zero-length.
#[inline]
pub fn hat2(v: Vect2) -> Vect2 {
    let n = v.norm();
    if n < 1e-12 { Vect2::zeros() } else { v / n }
}

#[inline]
pub fn hat3(v: Vect3) -> Vect3 {
    let n = v.norm();
    if n < 1e-12 { Vect3::zeros() } else { v / n }
}

/// x/y projection of a 3D vector.
#[inline]
pub fn vect2_of(v: Vect3) -> Vect2 {
    Vect2::new(v.x, v.y)
}

#[inline]
pub fn sq(x: f64) -> f64 {
    x * x
}

/// `sqrt` that treats small negative inputs (round-off from an
/// algebraically-nonnegative quantity) as zero instead of producing `NaN`.
#[inline]
pub fn sqrt_safe(x: f64) -> f64 {
    if x <= 0.0 { 0.0 } else { x.sqrt() }
}

/// A velocity: a `Vect3` viewed through the compass convention
/// `track = atan2(x, y)` (0 = north, positive clockwise), `gs = hypot(x, y)`,
/// `vs = z`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocity {
    v: Vect3,
}

impl Velocity {
    #[inline]
    pub fn mk_vxyz(x: f64, y: f64, z: f64) -> Velocity {
        Velocity {
            v: Vect3::new(x, y, z),
        }
    }

    #[inline]
    pub fn from_vect3(v: Vect3) -> Velocity {
        Velocity { v }
    }

    /// `(gs*sin(trk), gs*cos(trk), vs)` — the compass-to-Cartesian factory.
    #[inline]
    pub fn mk_trk_gs_vs(trk: f64, gs: f64, vs: f64) -> Velocity {
        Velocity::mk_vxyz(gs * trk.sin(), gs * trk.cos(), vs)
    }

    #[inline]
    pub fn invalid() -> Velocity {
        Velocity {
            v: invalid_vect3(),
        }
    }

    #[inline]
    pub fn is_invalid(self) -> bool {
        is_invalid(self.v)
    }

    #[inline]
    pub fn vect3(self) -> Vect3 {
        self.v
    }

    #[inline]
    pub fn vect2(self) -> Vect2 {
        vect2_of(self.v)
    }

    #[inline]
    pub fn trk(self) -> f64 {
        self.v.x.atan2(self.v.y)
    }

    #[inline]
    pub fn gs(self) -> f64 {
        (self.v.x * self.v.x + self.v.y * self.v.y).sqrt()
    }

    #[inline]
    pub fn vs(self) -> f64 {
        self.v.z
    }

    #[inline]
    pub fn mk_trk(self, trk: f64) -> Velocity {
        Velocity::mk_trk_gs_vs(trk, self.gs(), self.vs())
    }

    #[inline]
    pub fn mk_gs(self, gs: f64) -> Velocity {
        Velocity::mk_trk_gs_vs(self.trk(), gs, self.vs())
    }

    #[inline]
    pub fn mk_vs(self, vs: f64) -> Velocity {
        Velocity::mk_vxyz(self.v.x, self.v.y, vs)
    }

    /// Track advanced by `delta_trk`, same ground speed and vertical speed.
    /// Used by `turn_omega`, which needs the velocity at `t` without a second
    /// independent trig evaluation of the track.
    #[inline]
    pub fn mk_add_trk(self, delta_trk: f64) -> Velocity {
        Velocity::mk_trk_gs_vs(self.trk() + delta_trk, self.gs(), self.vs())
    }

    /// Signed angle from `other` to `self`, in `(-pi, pi]`.
    #[inline]
    pub fn angle(self, other: Velocity) -> f64 {
        util::modulo_pi(self.trk() - other.trk())
    }
}

/// ULP-based "almost equals" and related helpers (C1 `Util`).
pub mod util {
    use super::*;

    /// Default ULP tolerance used throughout the engine, matching the
    /// reference's `Util.almost_equals` default of 10 ULP at double
    /// precision. Axis-wrap logic and interval coalescing are only stable if
    /// this, not an epsilon comparison, is used everywhere.
    pub const DEFAULT_ULP: u64 = 10;

    /// Distance between `a` and `b` measured in ULPs, using the IEEE-754 bit
    /// layout directly (monotonic integer ordering trick: flip the sign bit
    /// on non-negative numbers, and negate negative numbers' bit patterns).
    fn ulp_key(x: f64) -> i64 {
        let bits = x.to_bits() as i64;
        if bits < 0 { i64::MIN - bits } else { bits }
    }

    pub fn ulp_distance(a: f64, b: f64) -> u64 {
        if a.is_nan() || b.is_nan() {
            return u64::MAX;
        }
        ulp_key(a).abs_diff(ulp_key(b))
    }

    #[inline]
    pub fn almost_equals(a: f64, b: f64) -> bool {
        almost_equals_ulps(a, b, DEFAULT_ULP)
    }

    #[inline]
    pub fn almost_equals_ulps(a: f64, b: f64, ulps: u64) -> bool {
        if a == b {
            return true;
        }
        ulp_distance(a, b) <= ulps
    }

    #[inline]
    pub fn almost_leq(a: f64, b: f64) -> bool {
        a <= b || almost_equals(a, b)
    }

    #[inline]
    pub fn almost_less(a: f64, b: f64) -> bool {
        a < b && !almost_equals(a, b)
    }

    pub const TWO_PI: f64 = std::f64::consts::TAU;

    /// Non-negative modulo: result is always in `[0, m)`.
    #[inline]
    pub fn modulo(x: f64, m: f64) -> f64 {
        if m <= 0.0 {
            return x;
        }
        let r = x % m;
        if r < 0.0 { r + m } else { r }
    }

    /// `x` wrapped into `(-pi, pi]`.
    #[inline]
    pub fn modulo_pi(x: f64) -> f64 {
        let m = modulo(x + std::f64::consts::PI, TWO_PI) - std::f64::consts::PI;
        if m <= -std::f64::consts::PI {
            m + TWO_PI
        } else {
            m
        }
    }

    /// `true` iff the shorter arc from `from` to `to` is clockwise (the
    /// compass-positive direction).
    #[inline]
    pub fn clockwise(from: f64, to: f64) -> bool {
        modulo(to - from, TWO_PI) <= std::f64::consts::PI
    }

    /// Signed angle swept moving from `from` to `to` in the given direction,
    /// in `[0, 2*pi)`. `right = true` sweeps clockwise.
    #[inline]
    pub fn turn_delta_dir(from: f64, to: f64, right: bool) -> f64 {
        if right {
            modulo(to - from, TWO_PI)
        } else {
            modulo(from - to, TWO_PI)
        }
    }

    /// Unsigned magnitude of the *shorter* turn from `from` to `to`, in
    /// `[0, pi]` — matches the reference's two-argument `turnDelta`.
    #[inline]
    pub fn turn_delta(from: f64, to: f64) -> f64 {
        let right = turn_delta_dir(from, to, true);
        let left = turn_delta_dir(from, to, false);
        right.min(left)
    }

    #[inline]
    pub fn sign(x: f64) -> f64 {
        if x >= 0.0 { 1.0 } else { -1.0 }
    }

    /// Select one root of `a*x^2 + b*x + c = 0` by sign convention `eps`
    /// (`+1` picks `+sqrt`, `-1` picks `-sqrt`), returning `NaN` when the
    /// discriminant is negative or `a` is (almost) zero.
    pub fn root(a: f64, b: f64, c: f64, eps: f64) -> f64 {
        if almost_equals(a, 0.0) {
            if almost_equals(b, 0.0) {
                return f64::NAN;
            }
            return -c / b;
        }
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return f64::NAN;
        }
        (-b + sign(eps) * disc.sqrt()) / (2.0 * a)
    }

    #[inline]
    pub fn min(a: f64, b: f64) -> f64 {
        a.min(b)
    }

    #[inline]
    pub fn max(a: f64, b: f64) -> f64 {
        a.max(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn velocity_round_trips_through_trk_gs_vs() {
        let v = Velocity::mk_trk_gs_vs(FRAC_PI_2, 10.0, -2.0);
        assert!((v.trk() - FRAC_PI_2).abs() < 1e-9);
        assert!((v.gs() - 10.0).abs() < 1e-9);
        assert!((v.vs() + 2.0).abs() < 1e-9);
    }

    #[test]
    fn mk_add_trk_matches_mk_trk_gs_vs() {
        let v = Velocity::mk_trk_gs_vs(0.3, 120.0, 1.5);
        let a = v.mk_add_trk(0.4);
        let b = Velocity::mk_trk_gs_vs(0.7, 120.0, 1.5);
        assert!((a.vect3() - b.vect3()).norm() < 1e-9);
    }

    #[test]
    fn clockwise_matches_shorter_arc() {
        assert!(util::clockwise(0.0, 0.1));
        assert!(!util::clockwise(0.0, -0.1 + util::TWO_PI));
        assert!(!util::clockwise(0.0, PI + 0.1));
    }

    #[test]
    fn turn_delta_is_symmetric_in_magnitude() {
        let d = util::turn_delta(0.1, 3.0);
        assert!(d >= 0.0 && d <= PI + 1e-9);
    }

    #[test]
    fn almost_equals_within_ulp_tolerance() {
        let a = 1.0_f64;
        let mut b = a;
        for _ in 0..5 {
            b = b.next_up();
        }
        assert!(util::almost_equals(a, b));
        let c = a + 1e-6;
        assert!(!util::almost_equals(a, c));
    }

    #[test]
    fn det2_is_antisymmetric() {
        let a = Vect2::new(1.0, 0.0);
        let b = Vect2::new(0.0, 1.0);
        assert!((det2(a, b) - 1.0).abs() < 1e-12);
        assert!((det2(b, a) + 1.0).abs() < 1e-12);
    }
}
