//! Kinematic band computation: discretized scan (C7), real-valued band
//! merging (C8), recovery bands, and temporal hysteresis (C9).
//!
//! Module layout
//! -------------
//! [`integer`] turns a step-indexed region function into run-length-encoded
//! [`Integerval`]s. [`real`] converts those runs into caller-facing
//! [`BandsRange`]s and provides the per-axis (track/gs/vs/altitude)
//! specializations that drive the scan. [`recovery`] computes
//! [`RecoveryInformation`] when every axis is in conflict. [`hysteresis`]
//! smooths the resolution value and preferred direction reported across
//! successive recomputations.

pub mod hysteresis;
pub mod integer;
pub mod real;
pub mod recovery;

pub use hysteresis::BandsHysteresis;
pub use integer::{DaidalusIntegerBands, Integerval, Region};
pub use real::{AltAxis, AxisConfig, BandsRange, GsAxis, RealBands, TrackAxis, VsAxis};
pub use recovery::{RecoveryInformation, compute_recovery};
