//! Pure-function trajectory generators for the four maneuver axes (C4).
//!
//! Public API policy
//! -----------------
//! Every function here is pure: `(s, v, t, params...) -> (s(t), v(t))`. None
//! of them return `Result` or touch an [`crate::error::ErrorLog`] — per the
//! non-negotiable contract in the design, the advisory hot path never aborts.
//! Non-finite input yields `(geom::invalid_vect3(), Velocity::invalid())`.
//! The one exception is [`turn_radius_checked`], a thin wrapper used by
//! callers that *do* want the `NumericOutOfRange` condition surfaced to an
//! `ErrorLog` without changing the numeric contract of `turn_radius` itself.

use crate::error::{BandsError, ErrorLog};
use crate::geom::{Vect3, Velocity, invalid_vect3, util};
use std::f64::consts::FRAC_PI_2;

/// Standard gravity, m/s^2 (matches the reference's `Units::gn`).
pub const STANDARD_GRAVITY: f64 = 9.80665;

fn finite3(s: Vect3, v: Velocity) -> bool {
    s.iter().all(|c| c.is_finite()) && v.vect3().iter().all(|c| c.is_finite())
}

/// Straight-line motion at constant velocity.
pub fn linear(s0: Vect3, v0: Velocity, t: f64) -> (Vect3, Velocity) {
    if !finite3(s0, v0) || !t.is_finite() {
        return (invalid_vect3(), Velocity::invalid());
    }
    (s0 + v0.vect3() * t, v0)
}

/// Turn radius for ground speed `gs` at bank angle `bank` under gravity `g`.
/// `R = gs^2 / (g * tan|bank|)`; `∞` at `bank = 0`, `0` at `|bank| >= pi/2`
/// (a physically invalid bank for a steady turn).
pub fn turn_radius(gs: f64, bank: f64, g: f64) -> f64 {
    let abank = bank.abs();
    let g = if g <= 0.0 { STANDARD_GRAVITY } else { g };
    if abank >= FRAC_PI_2 {
        return 0.0;
    }
    if abank == 0.0 {
        return f64::INFINITY;
    }
    gs * gs / (g * abank.tan())
}

/// [`turn_radius`] with standard gravity, reporting [`BandsError::NumericOutOfRange`]
/// to `log` when `bank` is clamped because it is at or beyond `pi/2`.
pub fn turn_radius_checked(gs: f64, bank: f64, log: &mut ErrorLog) -> f64 {
    if bank.abs() >= FRAC_PI_2 {
        log.error(&BandsError::NumericOutOfRange { bank_rad: bank });
        return 0.0;
    }
    turn_radius(gs, bank, STANDARD_GRAVITY)
}

/// Turn at constant turn rate `omega` (rad/s, signed: positive = clockwise).
/// Derives the displacement from the velocity delta rather than evaluating
/// `sin`/`cos` of the new track twice.
pub fn turn_omega(s0: Vect3, v0: Velocity, t: f64, omega: f64) -> (Vect3, Velocity) {
    if !finite3(s0, v0) || !t.is_finite() || !omega.is_finite() {
        return (invalid_vect3(), Velocity::invalid());
    }
    if util::almost_equals(omega, 0.0) {
        return linear(s0, v0, t);
    }
    let nv = v0.mk_add_trk(omega * t);
    let x = s0.x + (v0.vect3().y - nv.vect3().y) / omega;
    let y = s0.y + (-v0.vect3().x + nv.vect3().x) / omega;
    let z = s0.z + v0.vs() * t;
    (Vect3::new(x, y, z), nv)
}

/// Turn at constant turn radius `r` (meters), `right` selecting direction.
pub fn turn(s0: Vect3, v0: Velocity, t: f64, r: f64, right: bool) -> (Vect3, Velocity) {
    if util::almost_equals(r, 0.0) {
        return (s0, v0);
    }
    let dir = if right { 1.0 } else { -1.0 };
    let omega = dir * v0.gs() / r;
    turn_omega(s0, v0, t, omega)
}

/// Time to sweep `delta_trk` (as returned by [`util::turn_delta_dir`]) at turn
/// rate magnitude `|omega|`.
pub fn turn_time_for_delta(delta_trk: f64, omega: f64) -> f64 {
    if util::almost_equals(omega, 0.0) {
        return f64::INFINITY;
    }
    (delta_trk / omega).abs()
}

/// Minimum turn toward `goal_track` at bank `max_bank`, held until reached
/// then continued linearly. Direction is the shorter way round
/// ([`util::clockwise`]).
pub fn turn_until(
    s0: Vect3,
    v0: Velocity,
    t: f64,
    goal_track: f64,
    max_bank: f64,
) -> (Vect3, Velocity) {
    if !finite3(s0, v0) || !t.is_finite() {
        return (invalid_vect3(), Velocity::invalid());
    }
    let right = util::clockwise(v0.trk(), goal_track);
    let delta = util::turn_delta_dir(v0.trk(), goal_track, right);
    let r = turn_radius(v0.gs(), max_bank, STANDARD_GRAVITY);
    let omega = (if right { 1.0 } else { -1.0 }) * v0.gs() / r.max(1e-9);
    let turn_time = turn_time_for_delta(delta, omega);

    if t <= turn_time {
        turn_omega(s0, v0, t, omega)
    } else {
        let (s1, v1) = turn_omega(s0, v0, turn_time, omega);
        linear(s1, v1, t - turn_time)
    }
}

/// Time to accelerate from `v0.gs()` to `goal_gs` at magnitude `accel`.
pub fn gs_accel_time(gs_in: f64, goal_gs: f64, accel: f64) -> f64 {
    if util::almost_equals(accel, 0.0) {
        return f64::INFINITY;
    }
    (goal_gs - gs_in).abs() / accel.abs()
}

/// Ground-speed acceleration at constant track and constant magnitude `a`
/// (signed: the actual acceleration applied, not clamped to `goal_gs`).
fn gs_accel(s0: Vect3, v0: Velocity, t: f64, a: f64) -> (Vect3, Velocity) {
    if !finite3(s0, v0) || !t.is_finite() {
        return (invalid_vect3(), Velocity::invalid());
    }
    let dir = crate::geom::hat2(crate::geom::vect2_of(v0.vect3()));
    let gs_t = v0.gs() + a * t;
    let dist = v0.gs() * t + 0.5 * a * t * t;
    let xy = s0_xy(s0) + dir * dist;
    let z = s0.z + v0.vs() * t;
    let nv = v0.mk_gs(gs_t.max(0.0));
    (Vect3::new(xy.x, xy.y, z), nv)
}

fn s0_xy(s: Vect3) -> crate::geom::Vect2 {
    crate::geom::Vect2::new(s.x, s.y)
}

/// Accelerate at magnitude `accel` (sign derived, negative input is coerced
/// positive) until `goal_gs` is reached, then continue at constant velocity.
pub fn gs_accel_until(s0: Vect3, v0: Velocity, t: f64, goal_gs: f64, accel: f64) -> (Vect3, Velocity) {
    let accel = accel.abs();
    let accel_time = gs_accel_time(v0.gs(), goal_gs, accel);
    let sgn = if goal_gs < v0.gs() { -1.0 } else { 1.0 };
    let a = sgn * accel;
    if t <= accel_time {
        gs_accel(s0, v0, t, a)
    } else {
        let (s1, v1) = gs_accel(s0, v0, accel_time, a);
        gs_accel(s1, v1, t - accel_time, 0.0)
    }
}

/// Distance covered accelerating from `gs_in` to `goal_gs` at `accel`.
pub fn gs_accel_dist(gs_in: f64, goal_gs: f64, accel: f64) -> f64 {
    let t = gs_accel_time(gs_in, goal_gs, accel);
    gs_in * t + 0.5 * (if goal_gs < gs_in { -accel.abs() } else { accel.abs() }) * t * t
}

/// Solve for `(goal_gs, t)` accelerating from `gs_in` to cover `dist` in
/// `rta` seconds at acceleration magnitude `accel`, choosing the root nearest
/// the required average speed's direction. Returns `(NaN, NaN)` when the
/// required average speed cannot be reached within `[0, rta]`.
pub fn gs_accel_to_rta(gs_in: f64, dist: f64, rta: f64, accel: f64) -> (f64, f64) {
    let avg_gs = dist / rta;
    let sign = if avg_gs < gs_in { -1.0 } else { 1.0 };
    let a = accel.abs() * sign;
    let aa = 0.5 * a;
    let bb = -a * rta;
    let cc = dist - gs_in * rta;
    let disc = bb * bb - 4.0 * aa * cc;
    if disc < 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let sqrt_d = disc.sqrt();
    let ta = (-bb + sqrt_d) / (2.0 * aa);
    let tb = (-bb - sqrt_d) / (2.0 * aa);
    let t = if ta > 0.0 && ta < rta {
        ta
    } else if tb > 0.0 && tb < rta {
        tb
    } else {
        return (f64::NAN, f64::NAN);
    };
    (gs_in + a * t, t)
}

/// Vertical-speed acceleration at magnitude `a` (signed) until `goal_vs`,
/// then constant vertical speed. Horizontal motion is unaffected.
pub fn vs_accel_until(s0: Vect3, v0: Velocity, t: f64, goal_vs: f64, accel: f64) -> (Vect3, Velocity) {
    if !finite3(s0, v0) || !t.is_finite() {
        return (invalid_vect3(), Velocity::invalid());
    }
    let accel = accel.abs();
    let accel_time = if util::almost_equals(accel, 0.0) {
        f64::INFINITY
    } else {
        (goal_vs - v0.vs()).abs() / accel
    };
    let sgn = if goal_vs < v0.vs() { -1.0 } else { 1.0 };
    let a = sgn * accel;
    let (z, vz) = if t <= accel_time {
        (s0.z + v0.vs() * t + 0.5 * a * t * t, v0.vs() + a * t)
    } else {
        let z1 = s0.z + v0.vs() * accel_time + 0.5 * a * accel_time * accel_time;
        (z1 + goal_vs * (t - accel_time), goal_vs)
    };
    let xy = s0_xy(s0) + s0_xy(v0.vect3()) * t;
    (Vect3::new(xy.x, xy.y, z), v0.mk_vs(vz))
}

/// `v(T) = voz + a1*T`.
fn v1(voz: f64, a1: f64, t: f64) -> f64 {
    voz + a1 * t
}

/// Distance travelled in time `t` at constant acceleration `a1` from `voz`.
fn s1_dist(voz: f64, a1: f64, t: f64) -> f64 {
    voz * t + 0.5 * a1 * t * t
}

/// Time to decelerate from `voz` to zero at rate `a1`.
fn t3_time(voz: f64, a1: f64) -> f64 {
    -voz / a1
}

/// Distance consumed decelerating from `voz` to level flight at rate `a1`.
fn s3_dist(voz: f64, a1: f64) -> f64 {
    s1_dist(voz, a1, t3_time(voz, a1))
}

/// `(T1, T2, T3, a1, a2)` schedule for [`vs_level_out_times`]'s base case
/// (already moving with the correct sign of vertical speed, or starting from
/// rest).
fn vs_level_out_times_base(
    s0z: f64,
    v0z: f64,
    climb_rate: f64,
    target_alt: f64,
    accel_up: f64,
    accel_down: f64,
    allow_rate_change: bool,
) -> (f64, f64, f64, f64, f64) {
    let alt_dir = if target_alt >= s0z { 1.0 } else { -1.0 };
    let mut climb_rate = alt_dir * climb_rate.abs();
    if allow_rate_change {
        climb_rate = alt_dir * util::max(climb_rate.abs(), v0z.abs());
    }
    let s = target_alt - s0z;
    let a1 = if climb_rate >= v0z { accel_up } else { accel_down };
    let a2 = if target_alt >= s0z { accel_down } else { accel_up };
    let t1 = (climb_rate - v0z) / a1;

    if (s1_dist(v0z, a1, t1) + s3_dist(v1(v0z, a1, t1), a2)).abs() <= s.abs() {
        let t2 = (s - s1_dist(v0z, a1, t1) - s3_dist(v1(v0z, a1, t1), a2)) / climb_rate;
        (t1, t1 + t2, t1 + t2 + t3_time(climb_rate, a2), a1, a2)
    } else {
        let aa = 0.5 * a1 * (1.0 - a1 / a2);
        let bb = v0z * (1.0 - a1 / a2);
        let cc = -v0z * v0z / (2.0 * a2) - s;
        let root1 = util::root(aa, bb, cc, 1.0);
        let root2 = util::root(aa, bb, cc, -1.0);
        let t1 = if root1 < 0.0 {
            root2
        } else if root2 < 0.0 {
            root1
        } else {
            util::min(root1, root2)
        };
        (t1, t1, t1 + t3_time(v1(v0z, a1, t1), a2), a1, a2)
    }
}

/// Five-phase level-out schedule `(T1, T2, T3, a1, a2)`: accelerate to
/// `climb_rate`, cruise, decelerate to level at `target_alt`. `T1 < 0`
/// signals the altitude-overshoot infeasibility case the caller must
/// recognise (only possible when `allow_rate_change` is false).
pub fn vs_level_out_times(
    s0z: f64,
    v0z: f64,
    climb_rate: f64,
    target_alt: f64,
    accel_up: f64,
    accel_down: f64,
    allow_rate_change: bool,
) -> (f64, f64, f64, f64, f64) {
    let sgnv = if v0z >= 0.0 { 1.0 } else { -1.0 };
    let alt_dir = if target_alt >= s0z { 1.0 } else { -1.0 };
    let a1 = if target_alt >= s0z { accel_up } else { accel_down };
    let a2 = if target_alt >= s0z { accel_down } else { accel_up };

    if sgnv == alt_dir || util::almost_equals(v0z, 0.0) {
        if (target_alt - s0z).abs() >= s3_dist(v0z, a2).abs() {
            vs_level_out_times_base(
                s0z,
                v0z,
                climb_rate,
                target_alt,
                accel_up,
                accel_down,
                allow_rate_change,
            )
        } else {
            let (t1, t2, t3, oa1, oa2) = vs_level_out_times_base(
                s0z + s3_dist(v0z, a2),
                0.0,
                climb_rate,
                target_alt,
                accel_up,
                accel_down,
                allow_rate_change,
            );
            let shift = -v0z / a2;
            (shift + t1, shift + t2, shift + t3, oa1, oa2)
        }
    } else {
        let (t1, t2, t3, oa1, oa2) = vs_level_out_times_base(
            s0z + s3_dist(v0z, a1),
            0.0,
            climb_rate,
            target_alt,
            accel_up,
            accel_down,
            allow_rate_change,
        );
        let shift = -v0z / a1;
        (shift + t1, shift + t2, shift + t3, oa1, oa2)
    }
}

/// `(altitude, vertical speed)` at time `t` within a level-out schedule
/// already solved by [`vs_level_out_times`].
fn vs_level_out_calc(
    s0z: f64,
    v0z: f64,
    target_alt: f64,
    a1: f64,
    a2: f64,
    t1: f64,
    t2: f64,
    t3: f64,
    t: f64,
) -> (f64, f64) {
    if t <= t1 {
        (s0z + s1_dist(v0z, a1, t), v0z + a1 * t)
    } else if t <= t2 {
        (
            s0z + s1_dist(v0z, a1, t1) + v1(v0z, a1, t1) * (t - t1),
            v0z + a1 * t1,
        )
    } else if t <= t3 {
        (
            s0z + s1_dist(v0z, a1, t1) + v1(v0z, a1, t1) * (t2 - t1) + s1_dist(v1(v0z, a1, t1), a2, t - t2),
            v0z + a1 * t1 + a2 * (t - t2),
        )
    } else {
        (target_alt, 0.0)
    }
}

/// Altitude-capture maneuver: level at `target_alt`, climbing/descending
/// toward `climb_rate` bounded by `accel_up`/`accel_down`. Returns
/// `(invalid, invalid)` if the schedule is infeasible (`T1 < 0`, the
/// overshoot case with `allow_rate_change = false`).
pub fn vs_level_out(
    s0: Vect3,
    v0: Velocity,
    t: f64,
    climb_rate: f64,
    target_alt: f64,
    accel_up: f64,
    accel_down: f64,
    allow_rate_change: bool,
) -> (Vect3, Velocity) {
    if !finite3(s0, v0) || !t.is_finite() {
        return (invalid_vect3(), Velocity::invalid());
    }
    let (t1, t2, t3, a1, a2) = vs_level_out_times(
        s0.z,
        v0.vs(),
        climb_rate,
        target_alt,
        accel_up,
        accel_down,
        allow_rate_change,
    );
    if t1 < 0.0 {
        return (invalid_vect3(), Velocity::invalid());
    }
    let (z, vz) = vs_level_out_calc(s0.z, v0.vs(), target_alt, a1, a2, t1, t2, t3, t);
    let xy = s0_xy(s0) + s0_xy(v0.vect3()) * t;
    (Vect3::new(xy.x, xy.y, z), v0.mk_vs(vz))
}

/// Which shape a candidate heading's path is evaluated with during a
/// track-band scan: the true circular arc, or the straight chord between the
/// start point and the arc's endpoint (cheaper to re-evaluate at the many
/// candidate headings a full scan samples). Resolves Open Question (b):
/// callers choose per scan rather than the mode being a global toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordMode {
    Chordal,
    Arc,
}

/// Position/velocity after turning through a horizontal distance `dist`
/// along a circle of radius `r` (`right` selects direction). [`ChordMode::Arc`]
/// evaluates the true curved path; [`ChordMode::Chordal`] approximates it
/// with the straight line along the *initial* track for `dist`, cheaper to
/// re-evaluate at the many candidate headings a full band scan samples, at
/// the cost of drifting from the true arc as `dist` grows relative to `r`.
pub fn turn_by_dist_2d(
    s0: Vect3,
    v0: Velocity,
    r: f64,
    right: bool,
    dist: f64,
    mode: ChordMode,
) -> (Vect3, Velocity) {
    if util::almost_equals(r, 0.0) || mode == ChordMode::Chordal {
        return linear(s0, v0, dist / v0.gs().max(1e-9));
    }
    let turn_time = (dist / v0.gs().max(1e-9)).abs();
    turn(s0, v0, turn_time, r, right)
}

/// `T3`, the time at which the level-out schedule reaches `target_alt`.
pub fn vs_level_out_t3(s0z: f64, v0z: f64, climb_rate: f64, target_alt: f64, accel_up: f64, accel_down: f64, allow_rate_change: bool) -> f64 {
    vs_level_out_times(s0z, v0z, climb_rate, target_alt, accel_up, accel_down, allow_rate_change).2
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn turn_radius_matches_s2() {
        let r = turn_radius(154.3, 25f64.to_radians(), STANDARD_GRAVITY);
        assert!((r - 5207.0).abs() < 1.0, "r = {r}");
    }

    #[test]
    fn turn_radius_clamps_at_right_angle_bank() {
        assert_eq!(turn_radius(100.0, FRAC_PI_2, STANDARD_GRAVITY), 0.0);
        assert!(turn_radius(100.0, 0.0, STANDARD_GRAVITY).is_infinite());
    }

    #[test]
    fn turn_radius_checked_reports_error() {
        let mut log = ErrorLog::default();
        let r = turn_radius_checked(100.0, FRAC_PI_2 + 0.1, &mut log);
        assert_eq!(r, 0.0);
        assert!(log.has_error());
    }

    #[test]
    fn turn_omega_composes_additively_s6() {
        let s0 = Vect3::new(0.0, 0.0, 1000.0);
        let v0 = Velocity::mk_trk_gs_vs(0.3, 120.0, 2.0);
        let omega = 0.05;
        let (s_a, v_a) = turn_omega(s0, v0, 3.0, omega);
        let (s_ab, _v_ab) = turn_omega(s_a, v_a, 4.0, omega);
        let (s_direct, _) = turn_omega(s0, v0, 7.0, omega);
        assert!((s_ab - s_direct).norm() < 1e-9);
    }

    #[test]
    fn gs_accel_to_rta_matches_s3() {
        let (goal_gs, t) = gs_accel_to_rta(154.3, 18520.0, 100.0, 0.5);
        assert!(t.is_finite());
        assert!((goal_gs - (154.3 + 0.5 * t)).abs() < 1e-6);
        assert!((154.3 * t + 0.5 * 0.5 * t * t - 18520.0).abs() < 1e-3);
    }

    #[test]
    fn vs_level_out_reaches_target_alt_s4() {
        let s0 = Vect3::new(0.0, 0.0, 6096.0);
        let v0 = Velocity::mk_vxyz(0.0, 0.0, -14.09);
        let (t1, t2, t3, _a1, _a2) =
            vs_level_out_times(s0.z, v0.vs(), -1.68, 3360.4, 2.0, 2.0, true);
        assert!((t1 - 0.0).abs() < 1e-2, "t1={t1}");
        assert!((t2 - 190.67).abs() < 0.5, "t2={t2}");
        assert!((t3 - 197.72).abs() < 0.5, "t3={t3}");

        let (s_end, v_end) = vs_level_out(s0, v0, 198.0, -1.68, 3360.4, 2.0, 2.0, true);
        assert!((s_end.z - 3360.4).abs() < 1e-6);
        assert!(v_end.vs().abs() < 1e-6);
    }

    #[test]
    fn non_finite_input_yields_invalid_sentinel() {
        let s0 = Vect3::new(f64::NAN, 0.0, 0.0);
        let v0 = Velocity::mk_vxyz(1.0, 0.0, 0.0);
        let (s, v) = linear(s0, v0, 1.0);
        assert!(crate::geom::is_invalid(s));
        assert!(v.is_invalid());
    }

    #[test]
    fn turn_by_dist_2d_chordal_and_arc_agree_for_small_turns() {
        let s0 = Vect3::new(0.0, 0.0, 0.0);
        let v0 = Velocity::mk_trk_gs_vs(0.0, 100.0, 0.0);
        let (s_chord, _) = turn_by_dist_2d(s0, v0, 5000.0, true, 10.0, ChordMode::Chordal);
        let (s_arc, _) = turn_by_dist_2d(s0, v0, 5000.0, true, 10.0, ChordMode::Arc);
        assert!((s_chord - s_arc).norm() < 0.1);
    }

    #[test]
    fn turn_until_reaches_goal_track_then_extends_linearly() {
        let s0 = Vect3::new(0.0, 0.0, 0.0);
        let v0 = Velocity::mk_trk_gs_vs(0.0, 150.0, 0.0);
        let (_s, v_mid) = turn_until(s0, v0, 1000.0, PI, 25f64.to_radians());
        assert!((util::turn_delta(v_mid.trk(), PI)) < 1e-6);
    }
}
