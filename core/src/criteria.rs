//! Coordination criteria for cooperative conflict resolution (C6).
//!
//! Public API policy
//! -----------------
//! These functions answer one question each: which direction (horizontal
//! turn sense, vertical climb/descend sense) should *this* aircraft take so
//! that a cooperating intruder running the same logic picks the complementary
//! direction. They are pure sign functions over the relative geometry; ties
//! are broken by [`break_symmetry`], whose tie-break rule (reversed-name
//! lexicographic comparison) is load-bearing and must not be "simplified" —
//! it is what keeps two aircraft running this same code from both turning
//! the same way.

use crate::geom::{Vect2, Vect3, det2, util, vect2_of};

/// `+1` to turn/pass right of the intruder, `-1` to pass left, determined by
/// the sign of the relative-velocity's rotation of the relative position.
pub fn horizontal_coordination(s: Vect2, v: Vect2) -> i32 {
    util::sign(det2(v, s)) as i32
}

/// Decision vector used by [`break_symmetry`] when the geometry doesn't
/// already imply a vertical sense: projects the relative velocity at the
/// point of closest approach, falling back to the raw relative position.
///
/// `s`/`vo`/`vi` are the relative position and the two aircraft's absolute
/// velocities; `ca_d`/`ca_h` are the (possibly buffered) "criteria" cylinder
/// half-dimensions, generally wider than the alerting cylinder.
pub fn vertical_decision_vect(s: Vect3, vo: Vect3, vi: Vect3, ca_d: f64, ca_h: f64) -> Vect3 {
    let v = vo - vi;
    if crate::detection::violation(s, crate::detection::CdCylinder::new(ca_d, ca_h)) {
        return s;
    }
    if util::almost_equals(vo.z, vi.z) {
        return s;
    }
    let s2 = vect2_of(s);
    let v2 = vect2_of(vo) - vect2_of(vi);
    if s.norm() < 1e-6 || (vo - vi).norm() < 1e-6 {
        return s;
    }
    if s2.dot(&v2) <= 0.0 {
        s
    } else {
        let tcpa = -s2.dot(&v2) / v2.norm_squared().max(1e-12);
        s + v * tcpa
    }
}

/// `+1`/`-1` vertical sense, breaking a near-zero `decision_vect.z` by
/// reversing both call signs and comparing them lexicographically — this
/// mirrors the original ACCoRD reference exactly and must, not just happen
/// to, preserve that reversal: it is what makes two cooperating aircraft
/// computing this with their own id and the other's id swapped agree on
/// complementary (not identical) answers.
pub fn break_symmetry(decision_vect: Vect3, ownship_name: &str, traffic_name: &str) -> i32 {
    if util::almost_equals(decision_vect.z, 0.0) {
        let rev_own: String = ownship_name.chars().rev().collect();
        let rev_traffic: String = traffic_name.chars().rev().collect();
        if rev_own <= rev_traffic { 1 } else { -1 }
    } else {
        util::sign(decision_vect.z) as i32
    }
}

/// Vertical coordination sense for a pair currently in loss of separation:
/// delegates straight to [`break_symmetry`] on the raw relative position,
/// matching the reference's `verticalCoordinationLoS`.
pub fn vertical_coordination_los(s: Vect3, ownship_name: &str, traffic_name: &str) -> i32 {
    break_symmetry(s, ownship_name, traffic_name)
}

/// Vertical coordination sense for a pair not yet in loss of separation but
/// in conflict: uses the projected decision vector so both aircraft resolve
/// the *predicted* encounter the same way.
pub fn vertical_coordination_conflict(
    s: Vect3,
    vo: Vect3,
    vi: Vect3,
    ca_d: f64,
    ca_h: f64,
    ownship_name: &str,
    traffic_name: &str,
) -> i32 {
    let dv = vertical_decision_vect(s, vo, vi, ca_d, ca_h);
    break_symmetry(dv, ownship_name, traffic_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_coordination_is_antisymmetric_in_velocity() {
        let s = Vect2::new(1.0, 0.0);
        let v = Vect2::new(0.0, 1.0);
        assert_eq!(horizontal_coordination(s, v), -horizontal_coordination(s, -v));
    }

    #[test]
    fn break_symmetry_uses_z_sign_when_unambiguous() {
        assert_eq!(break_symmetry(Vect3::new(0.0, 0.0, 5.0), "AAL1", "UAL2"), 1);
        assert_eq!(break_symmetry(Vect3::new(0.0, 0.0, -5.0), "AAL1", "UAL2"), -1);
    }

    #[test]
    fn break_symmetry_tie_break_is_reversed_name_order_not_raw_order() {
        // "AAL1" reversed is "1LAA"; "UAL2" reversed is "2LAU". "1LAA" <= "2LAU".
        let a = break_symmetry(Vect3::new(0.0, 0.0, 0.0), "AAL1", "UAL2");
        assert_eq!(a, 1);
        let b = break_symmetry(Vect3::new(0.0, 0.0, 0.0), "UAL2", "AAL1");
        assert_eq!(b, -1);
    }

    #[test]
    fn break_symmetry_tie_break_is_self_consistent_across_swapped_callers() {
        // A cooperating pair invokes this with their own name first; the two
        // calls must disagree (one gets +1, the other -1) so they pick
        // complementary, not identical, vertical senses.
        let from_a = break_symmetry(Vect3::new(0.0, 0.0, 0.0), "N12345", "N67890");
        let from_b = break_symmetry(Vect3::new(0.0, 0.0, 0.0), "N67890", "N12345");
        assert_eq!(from_a, -from_b);
    }

    #[test]
    fn vertical_decision_vect_returns_raw_position_inside_los() {
        let s = Vect3::new(10.0, 0.0, 10.0);
        let vo = Vect3::new(0.0, 100.0, 0.0);
        let vi = Vect3::new(0.0, -100.0, 0.0);
        let dv = vertical_decision_vect(s, vo, vi, 9260.0, 304.8);
        assert_eq!(dv, s);
    }
}
