//! Top-level orchestration (C11): owns parameters, traffic, per-axis caches,
//! and the error log; drives the integer scan into merged real bands and
//! exposes the engine's outer API.
//!
//! Public API policy
//! -----------------
//! `compute()` is the one place that can fail loudly (a `CapacityExceeded`
//! scan is mirrored into the log and leaves the previous cache in place);
//! every accessor below it (`length`, `interval`, `region`, `resolution`,
//! `recovery_information`) is infallible and returns a documented default
//! (`0`, an empty interval, `Region::Unknown`) when asked about an axis that
//! hasn't been computed yet or an index out of range, per the "advisory
//! engine never panics" contract.

use crate::bands::{
    AltAxis, AxisConfig, BandsHysteresis, BandsRange, DaidalusIntegerBands, GsAxis, Region,
    TrackAxis, VsAxis, compute_recovery,
};
use crate::bands::real::Tier;
use crate::detection::CdCylinder;
use crate::error::ErrorLog;
use crate::geom::util;
use crate::parameters::ParameterData;
use crate::traffic::{Ownship, TrafficEntry, TrafficState};
use crate::units::Unit;

/// Which kinematic axis a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Track,
    GroundSpeed,
    VerticalSpeed,
    Altitude,
}

const ALL_AXES: [Axis; 4] = [Axis::Track, Axis::GroundSpeed, Axis::VerticalSpeed, Axis::Altitude];

fn empty_axes() -> [Vec<BandsRange>; 4] {
    [Vec::new(), Vec::new(), Vec::new(), Vec::new()]
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::Track => 0,
        Axis::GroundSpeed => 1,
        Axis::VerticalSpeed => 2,
        Axis::Altitude => 3,
    }
}

fn axis_is_modular(axis: Axis) -> bool {
    matches!(axis, Axis::Track)
}

fn axis_domain(axis: Axis) -> f64 {
    match axis {
        Axis::Track => util::TWO_PI,
        _ => f64::INFINITY,
    }
}

/// The bands engine: one ownship, a roster of traffic, and the parameters
/// that configure how the four axes are scanned.
pub struct DaidalusCore {
    params: ParameterData,
    log: ErrorLog,
    ownship: Option<Ownship>,
    traffic: Vec<TrafficEntry>,
    cache: [Vec<BandsRange>; 4],
    hysteresis: [BandsHysteresis; 4],
    scanner: DaidalusIntegerBands,
    time: f64,
}

impl Default for DaidalusCore {
    fn default() -> Self {
        let mut params = ParameterData::new();
        // Defaults mirror a DO-365 well-clear cylinder (roughly 0.66 nmi /
        // 450 ft) and a one-minute lookahead horizon split into far/mid/near
        // tiers at decreasing multiples of it.
        params.set("min_gs", 0.0, Unit::Knot).unwrap();
        params.set("max_gs", 400.0, Unit::Knot).unwrap();
        params.set("min_vs", -3000.0, Unit::FeetPerMinute).unwrap();
        params.set("max_vs", 3000.0, Unit::FeetPerMinute).unwrap();
        params.set("min_alt", 0.0, Unit::Foot).unwrap();
        params.set("max_alt", 50000.0, Unit::Foot).unwrap();
        params.set("lookahead_time", 180.0, Unit::Second).unwrap();
        params.set("left_trk", 180.0, Unit::Degree).unwrap();
        params.set("right_trk", 180.0, Unit::Degree).unwrap();
        params.set("trk_step", 1.0, Unit::Degree).unwrap();
        params.set("gs_step", 5.0, Unit::Knot).unwrap();
        params.set("vs_step", 100.0, Unit::FeetPerMinute).unwrap();
        params.set("alt_step", 250.0, Unit::Foot).unwrap();
        params.set("d", 0.66, Unit::NauticalMile).unwrap();
        params.set("h", 450.0, Unit::Foot).unwrap();
        // NMAC cylinder: much smaller than the well-clear cylinder above.
        // Recovery starts from here (§4.8), not from `d`/`h`.
        params.set("horizontal_nmac", 150.0, Unit::Meter).unwrap();
        params.set("vertical_nmac", 30.48, Unit::Meter).unwrap();
        params.set("bank_angle", 25.0, Unit::Degree).unwrap();
        params.set("horizontal_accel", 2.0, Unit::MetersPerSecond).unwrap();
        params.set("vertical_accel", 2.0, Unit::MetersPerSecond).unwrap();
        params.set("recovery_shrink_factor", 0.8, Unit::Internal).unwrap();
        params.set("recovery_max_shrinks", 20.0, Unit::Internal).unwrap();
        params.set("recovery_stability_time", 2.0, Unit::Second).unwrap();
        // Internal: these compare directly against each axis's own working
        // unit (radians, m/s, meters), not a single physical unit.
        params.set("max_delta_resolution", 0.05, Unit::Internal).unwrap();
        params.set("persistence_preferred_resolution", 0.05, Unit::Internal).unwrap();

        Self {
            params,
            log: ErrorLog::default(),
            ownship: None,
            traffic: Vec::new(),
            cache: empty_axes(),
            hysteresis: [BandsHysteresis::default(); 4],
            scanner: DaidalusIntegerBands::default(),
            time: 0.0,
        }
    }
}

impl DaidalusCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameters(&self) -> &ParameterData {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterData {
        &mut self.params
    }

    pub fn set_ownship(&mut self, name: impl Into<String>, state: TrafficState) {
        self.ownship = Some(Ownship::new(name, state));
    }

    pub fn add_traffic(&mut self, name: impl Into<String>, state: TrafficState) {
        self.traffic.push(TrafficEntry::new(name, state));
    }

    pub fn clear_traffic(&mut self) {
        self.traffic.clear();
    }

    pub fn has_error(&self) -> bool {
        self.log.has_error()
    }

    pub fn get_message(&self) -> Option<&str> {
        self.log.message()
    }

    pub fn clear_errors(&mut self) {
        self.log.clear();
    }

    /// Clear all persisted resolution/preferred-direction state on every
    /// axis. Call after a parameter change that invalidates the held values
    /// (a different `max_delta_resolution` or coordination threshold), or
    /// whenever the caller's own staleness check says the engine has gone
    /// idle too long to keep trusting them.
    pub fn reset_hysteresis(&mut self) {
        for h in &mut self.hysteresis {
            h.reset();
        }
    }

    fn cylinder(&self) -> CdCylinder {
        CdCylinder::new(self.params.get_value("d"), self.params.get_value("h"))
    }

    fn nmac_cylinder(&self) -> CdCylinder {
        CdCylinder::new(self.params.get_value("horizontal_nmac"), self.params.get_value("vertical_nmac"))
    }

    fn tiers(&self) -> [Tier; 3] {
        let base = self.cylinder();
        let horizon = self.params.get_value("lookahead_time");
        [
            Tier { cylinder: CdCylinder::new(base.d * 3.0, base.h * 3.0), horizon, region: Region::Far },
            Tier { cylinder: CdCylinder::new(base.d * 1.5, base.h * 1.5), horizon: horizon * 0.5, region: Region::Mid },
            Tier { cylinder: base, horizon: horizon * 0.2, region: Region::Near },
        ]
    }

    fn traffic_pairs(&self) -> Vec<(crate::geom::Vect3, crate::geom::Velocity)> {
        self.traffic.iter().map(|t| (t.state.position, t.state.velocity)).collect()
    }

    fn traffic_refs(&self) -> Vec<(&str, crate::geom::Vect3, crate::geom::Velocity)> {
        self.traffic.iter().map(|t| (t.name.as_str(), t.state.position, t.state.velocity)).collect()
    }

    /// `true` once every band on `axis` is `Near` or worse, i.e. there is no
    /// clear direction left to pick without already being in conflict.
    fn axis_is_near_saturated(&self, axis: Axis) -> bool {
        let bands = &self.cache[axis_index(axis)];
        !bands.is_empty() && bands.iter().all(|b| b.region >= Region::Near)
    }

    /// Recompute every axis's bands against the current ownship/traffic
    /// state and advance the hysteresis clock by `dt` seconds. A no-op
    /// (other than advancing time) if no ownship has been set.
    pub fn compute(&mut self, dt: f64) {
        self.time += dt.max(0.0);
        let Some(ownship) = self.ownship.clone() else {
            return;
        };
        let own_name = ownship.name.as_str();
        let own_pos = ownship.state.position;
        let own_vel = ownship.state.velocity;
        let traffic = self.traffic_refs();
        let tiers = self.tiers();

        let track_axis = TrackAxis {
            cfg: AxisConfig {
                min: 0.0,
                max: util::TWO_PI,
                step: self.params.get_value("trk_step"),
                modular: true,
            },
            max_bank: self.params.get_value("bank_angle"),
            lookahead: self.params.get_value("lookahead_time"),
        };
        let gs_axis = GsAxis {
            cfg: AxisConfig {
                min: self.params.get_value("min_gs"),
                max: self.params.get_value("max_gs"),
                step: self.params.get_value("gs_step"),
                modular: false,
            },
            accel: self.params.get_value("horizontal_accel"),
            lookahead: self.params.get_value("lookahead_time"),
        };
        let vs_axis = VsAxis {
            cfg: AxisConfig {
                min: self.params.get_value("min_vs"),
                max: self.params.get_value("max_vs"),
                step: self.params.get_value("vs_step"),
                modular: false,
            },
            accel: self.params.get_value("vertical_accel"),
            lookahead: self.params.get_value("lookahead_time"),
        };
        let alt_axis = AltAxis {
            cfg: AxisConfig {
                min: self.params.get_value("min_alt"),
                max: self.params.get_value("max_alt"),
                step: self.params.get_value("alt_step"),
                modular: false,
            },
            climb_rate: self.params.get_value("vs_step"),
            accel_up: self.params.get_value("vertical_accel"),
            accel_down: self.params.get_value("vertical_accel"),
            lookahead: self.params.get_value("lookahead_time"),
        };

        self.cache[axis_index(Axis::Track)] =
            track_axis.compute(own_name, own_pos, own_vel, &traffic, &tiers, &self.scanner, &mut self.log);
        self.cache[axis_index(Axis::GroundSpeed)] =
            gs_axis.compute(own_name, own_pos, own_vel, &traffic, &tiers, &self.scanner, &mut self.log);
        self.cache[axis_index(Axis::VerticalSpeed)] =
            vs_axis.compute(own_name, own_pos, own_vel, &traffic, &tiers, &self.scanner, &mut self.log);
        self.cache[axis_index(Axis::Altitude)] =
            alt_axis.compute(own_name, own_pos, own_vel, &traffic, &tiers, &self.scanner, &mut self.log);

        // §4.7 step 3: an axis whose every band saturated to `Near` is
        // recolored to `Recovery` once a recovery maneuver actually exists
        // for it, rather than left fully blocked with nowhere to go.
        for axis in ALL_AXES {
            if !self.axis_is_near_saturated(axis) {
                continue;
            }
            let info = self.recovery_information(axis);
            if info.recovery_bands_computed() && !info.recovery_bands_saturated() {
                for band in &mut self.cache[axis_index(axis)] {
                    if band.region == Region::Near {
                        band.region = Region::Recovery;
                    }
                }
            }
        }
    }

    pub fn length(&self, axis: Axis) -> usize {
        self.cache[axis_index(axis)].len()
    }

    pub fn interval(&self, axis: Axis, i: usize) -> Option<BandsRange> {
        self.cache[axis_index(axis)].get(i).copied()
    }

    pub fn region(&self, axis: Axis, i: usize) -> Region {
        self.interval(axis, i).map(|b| b.region).unwrap_or(Region::Unknown)
    }

    /// The worst region currently reported anywhere on `axis`'s cached
    /// bands, `Region::None` if it has not been computed yet.
    pub fn current_region(&self, axis: Axis) -> Region {
        self.cache[axis_index(axis)].iter().map(|b| b.region).max().unwrap_or(Region::None)
    }

    fn bordering_none_edge(&self, axis: Axis, current_value: f64, right: bool) -> f64 {
        let bands = &self.cache[axis_index(axis)];
        if bands.iter().any(|b| b.region == Region::None && b.contains(current_value)) {
            return f64::NAN;
        }
        let none_ranges: Vec<&BandsRange> = bands.iter().filter(|b| b.region == Region::None).collect();
        if none_ranges.is_empty() {
            return if right { f64::INFINITY } else { f64::NEG_INFINITY };
        }
        if right {
            none_ranges
                .iter()
                .filter(|b| b.lb >= current_value)
                .map(|b| b.lb)
                .fold(f64::INFINITY, f64::min)
        } else {
            none_ranges
                .iter()
                .filter(|b| b.ub <= current_value)
                .map(|b| b.ub)
                .fold(f64::NEG_INFINITY, f64::max)
        }
    }

    /// The near edge of the bordering `NONE` interval on the `right`
    /// (increasing-value) or left side of `current_value`, shifted a further
    /// `max_delta_resolution` past it so the caller lands solidly inside the
    /// clear region rather than right on its boundary (§4.7). `NaN` if
    /// `current_value` is already inside a `NONE` range; `+inf`/`-inf` if no
    /// `NONE` range exists in that direction at all.
    fn raw_resolution(&self, axis: Axis, current_value: f64, right: bool) -> f64 {
        let edge = self.bordering_none_edge(axis, current_value, right);
        if !edge.is_finite() {
            return edge;
        }
        let delta = self.params.get_value("max_delta_resolution");
        if right { edge + delta } else { edge - delta }
    }

    /// Hysteresis-filtered resolution value: the raw value from
    /// [`Self::raw_resolution`], held at its previous value if it has not
    /// moved by more than `max_delta_resolution` since the last call for
    /// this axis/direction (C9).
    pub fn resolution(&mut self, axis: Axis, current_value: f64, right: bool) -> f64 {
        let raw = self.raw_resolution(axis, current_value, right);
        let delta = self.params.get_value("max_delta_resolution");
        self.hysteresis[axis_index(axis)].filter_resolution(raw, delta, right)
    }

    /// `true` if turning right (increasing the axis value) is the preferred
    /// way to reach a clear value — the side whose resolution lands closer
    /// to `current_value`, with the choice held across a flip unless the
    /// two-sided gap exceeds `persistence_preferred_resolution` (C9).
    pub fn preferred_direction(&mut self, axis: Axis, current_value: f64) -> bool {
        let right = self.raw_resolution(axis, current_value, true);
        let left = self.raw_resolution(axis, current_value, false);
        let raw = match (right.is_finite(), left.is_finite()) {
            (false, false) => true,
            (true, false) => true,
            (false, true) => false,
            (true, true) => {
                let dist_right = dist_on_axis(axis, current_value, right);
                let dist_left = dist_on_axis(axis, current_value, left);
                dist_right <= dist_left
            }
        };
        let gap = (right - left).abs();
        let threshold = self.params.get_value("persistence_preferred_resolution");
        self.hysteresis[axis_index(axis)].filter_preferred_direction(raw, gap, threshold)
    }

    pub fn recovery_information(&mut self, axis: Axis) -> crate::bands::RecoveryInformation {
        let base = self.nmac_cylinder();
        let shrink = self.params.get_value("recovery_shrink_factor");
        let max_shrinks = self.params.get_value("recovery_max_shrinks") as u32;
        let horizon = self.params.get_value("lookahead_time");
        let stability_time = self.params.get_value("recovery_stability_time");
        let (own_pos, own_vel) = match &self.ownship {
            Some(o) => (o.state.position, o.state.velocity),
            None => {
                return compute_recovery(
                    crate::geom::Vect3::zeros(),
                    crate::geom::Velocity::invalid(),
                    &[],
                    base,
                    shrink,
                    max_shrinks,
                    horizon,
                    stability_time,
                    &mut self.log,
                );
            }
        };
        let _ = axis;
        let traffic = self.traffic_pairs();
        compute_recovery(own_pos, own_vel, &traffic, base, shrink, max_shrinks, horizon, stability_time, &mut self.log)
    }
}

/// Distance between `current_value` and `edge` along `axis`, accounting for
/// modular wraparound on the track axis so "closer" reflects the actual
/// turn angle rather than the raw radian difference.
fn dist_on_axis(axis: Axis, current_value: f64, edge: f64) -> f64 {
    let raw = (edge - current_value).abs();
    if axis_is_modular(axis) {
        let domain = axis_domain(axis);
        raw.min(domain - raw)
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Vect3, Velocity};

    #[test]
    fn no_traffic_yields_one_none_band_on_every_axis() {
        let mut core = DaidalusCore::new();
        core.set_ownship("own", TrafficState::new(Vect3::zeros(), Velocity::mk_trk_gs_vs(0.0, 150.0, 0.0)));
        core.compute(0.0);
        for axis in ALL_AXES {
            assert_eq!(core.length(axis), 1);
            assert_eq!(core.region(axis, 0), Region::None);
        }
        assert!(!core.has_error());
    }

    #[test]
    fn head_on_traffic_produces_a_near_track_band_s1() {
        let mut core = DaidalusCore::new();
        core.set_ownship("own", TrafficState::new(Vect3::zeros(), Velocity::mk_trk_gs_vs(0.0, 150.0, 0.0)));
        core.add_traffic(
            "intruder",
            TrafficState::new(Vect3::new(0.0, 18520.0, 0.0), Velocity::mk_trk_gs_vs(std::f64::consts::PI, 150.0, 0.0)),
        );
        core.compute(0.0);
        assert!(core.length(Axis::Track) > 0);
        assert!((0..core.length(Axis::Track)).any(|i| core.region(Axis::Track, i) >= Region::Mid));
    }

    #[test]
    fn recovery_information_on_clear_geometry_is_immediate() {
        let mut core = DaidalusCore::new();
        core.set_ownship("own", TrafficState::new(Vect3::zeros(), Velocity::mk_trk_gs_vs(0.0, 150.0, 0.0)));
        let info = core.recovery_information(Axis::Track);
        assert_eq!(info.time_to_recovery(), core.parameters().get_value("recovery_stability_time"));
    }

    #[test]
    fn parameter_overwrite_through_core_respects_unit_compatibility() {
        let mut core = DaidalusCore::new();
        assert!(core.get_message().is_none());
        assert!(core.parameters_mut().set("min_gs", 10.0, Unit::Meter).is_err());
        assert!(core.parameters_mut().set("min_gs", 5.0, Unit::MetersPerSecond).is_ok());
    }

    #[test]
    fn resolution_is_nan_inside_a_clear_value_and_holds_small_drift() {
        let mut core = DaidalusCore::new();
        core.set_ownship("own", TrafficState::new(Vect3::zeros(), Velocity::mk_trk_gs_vs(0.0, 150.0, 0.0)));
        core.compute(0.0);
        assert!(core.resolution(Axis::GroundSpeed, 150.0, true).is_nan());
    }
}
