//! Aircraft state data model (C3 traffic half): ownship and traffic entries
//! carried by [`crate::daidalus::DaidalusCore`].

use crate::geom::{Vect3, Velocity};

/// One aircraft's kinematic state at the current time, in the ownship's
/// local tangent-plane projection (`Vect3` in meters, `z` up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficState {
    pub position: Vect3,
    pub velocity: Velocity,
}

impl TrafficState {
    pub fn new(position: Vect3, velocity: Velocity) -> Self {
        Self { position, velocity }
    }

    /// Position and velocity relative to `ownship`, the form every
    /// detection/criteria function operates on.
    pub fn relative_to(&self, ownship: &TrafficState) -> (Vect3, Vect3) {
        (
            self.position - ownship.position,
            self.velocity.vect3() - ownship.velocity.vect3(),
        )
    }
}

/// A named traffic aircraft tracked by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficEntry {
    pub name: String,
    pub state: TrafficState,
}

impl TrafficEntry {
    pub fn new(name: impl Into<String>, state: TrafficState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }
}

/// The aircraft running this instance of the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Ownship {
    pub name: String,
    pub state: TrafficState,
}

impl Ownship {
    pub fn new(name: impl Into<String>, state: TrafficState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_to_subtracts_position_and_velocity() {
        let own = TrafficState::new(Vect3::new(0.0, 0.0, 0.0), Velocity::mk_trk_gs_vs(0.0, 100.0, 0.0));
        let other = TrafficState::new(Vect3::new(10.0, 20.0, 30.0), Velocity::mk_trk_gs_vs(0.0, 50.0, 0.0));
        let (s, v) = other.relative_to(&own);
        assert_eq!(s, Vect3::new(10.0, 20.0, 30.0));
        assert!((v.y - (-50.0)).abs() < 1e-9);
    }
}
