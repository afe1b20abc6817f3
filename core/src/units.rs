//! Unit conversions for the parameter surface and recovery-distance accessors.
//!
//! Internal computation is always in SI base units (meters, seconds, radians,
//! m/s). This module is the only place that knows about the small set of
//! external units DAIDALUS parameter files and callers use.

/// A recognised external unit. `Internal` is the identity conversion and is
/// what a bare numeric parameter value (no `[unit]` suffix) is assumed to be
/// in, matching the reference's "internal units" convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Internal,
    Meter,
    Foot,
    NauticalMile,
    Knot,
    MetersPerSecond,
    FeetPerMinute,
    Degree,
    Radian,
    Second,
    Minute,
}

impl Unit {
    /// Parse the bracketed unit suffix text (e.g. `"m"`, `"ft"`, `"deg"`).
    /// Unknown text falls back to `Internal`, matching the reference's
    /// permissive parser (an unrecognised unit is treated as dimensionless).
    pub fn parse(text: &str) -> Unit {
        match text.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" => Unit::Meter,
            "ft" | "foot" | "feet" => Unit::Foot,
            "nmi" | "nm" => Unit::NauticalMile,
            "kn" | "knot" | "knots" => Unit::Knot,
            "m/s" | "mps" => Unit::MetersPerSecond,
            "fpm" => Unit::FeetPerMinute,
            "deg" | "degree" | "degrees" => Unit::Degree,
            "rad" | "radian" | "radians" => Unit::Radian,
            "s" | "sec" | "second" | "seconds" => Unit::Second,
            "min" | "minute" | "minutes" => Unit::Minute,
            "" | "unitless" | "unspecified" => Unit::Internal,
            _ => Unit::Internal,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Unit::Internal => "unitless",
            Unit::Meter => "m",
            Unit::Foot => "ft",
            Unit::NauticalMile => "nmi",
            Unit::Knot => "kn",
            Unit::MetersPerSecond => "m/s",
            Unit::FeetPerMinute => "fpm",
            Unit::Degree => "deg",
            Unit::Radian => "rad",
            Unit::Second => "s",
            Unit::Minute => "min",
        }
    }

    /// Which physical dimension this unit belongs to. Two units are
    /// compatible (can overwrite a `ParameterData` entry) iff their kinds
    /// match; `Internal` is compatible with everything since it carries no
    /// dimension of its own.
    pub fn kind(self) -> UnitKind {
        match self {
            Unit::Internal => UnitKind::Any,
            Unit::Meter | Unit::Foot | Unit::NauticalMile => UnitKind::Distance,
            Unit::Knot | Unit::MetersPerSecond | Unit::FeetPerMinute => UnitKind::Speed,
            Unit::Degree | Unit::Radian => UnitKind::Angle,
            Unit::Second | Unit::Minute => UnitKind::Time,
        }
    }

    /// Multiply a value expressed in `self` by this factor to get internal
    /// (SI) units.
    fn to_internal_factor(self) -> f64 {
        match self {
            Unit::Internal => 1.0,
            Unit::Meter => 1.0,
            Unit::Foot => 0.3048,
            Unit::NauticalMile => 1852.0,
            Unit::Knot => 0.514_444_444_444,
            Unit::MetersPerSecond => 1.0,
            Unit::FeetPerMinute => 0.3048 / 60.0,
            Unit::Degree => std::f64::consts::PI / 180.0,
            Unit::Radian => 1.0,
            Unit::Second => 1.0,
            Unit::Minute => 60.0,
        }
    }

    pub fn to_internal(self, value: f64) -> f64 {
        value * self.to_internal_factor()
    }

    pub fn from_internal(self, value: f64) -> f64 {
        value / self.to_internal_factor()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Any,
    Distance,
    Speed,
    Angle,
    Time,
}

impl UnitKind {
    pub fn compatible(self, other: UnitKind) -> bool {
        self == UnitKind::Any || other == UnitKind::Any || self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knots_round_trip_through_internal() {
        let kn = Unit::Knot.to_internal(300.0);
        assert!((kn - 154.333_333).abs() < 1e-3);
        let back = Unit::Knot.from_internal(kn);
        assert!((back - 300.0).abs() < 1e-9);
    }

    #[test]
    fn feet_and_meters_are_compatible_distance_units() {
        assert!(Unit::Foot.kind().compatible(Unit::Meter.kind()));
        assert!(!Unit::Foot.kind().compatible(Unit::Knot.kind()));
    }
}
