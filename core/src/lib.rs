//! Kinematic detect-and-avoid bands engine: given an ownship and a roster of
//! traffic, computes caution-colored "bands" (no-go intervals) on the
//! track, ground-speed, vertical-speed, and altitude axes.
//!
//! Public API policy
//! -----------------
//! Expose the pieces a caller assembling a bands query needs: the
//! orchestrator ([`daidalus::DaidalusCore`]), the data model
//! ([`traffic::TrafficState`]/[`traffic::Ownship`]), and the configuration
//! surface ([`parameters::ParameterData`]). The lower-level modules
//! (`geom`, `kinematics`, `detection`, `criteria`, `intervals`, `bands`) are
//! public so a caller can build a custom query pipeline, but the common path
//! only needs `daidalus` and `traffic`.

pub mod bands;
pub mod criteria;
pub mod daidalus;
pub mod detection;
pub mod error;
pub mod geom;
pub mod intervals;
pub mod kinematics;
pub mod parameters;
pub mod traffic;
pub mod units;

pub use daidalus::{Axis, DaidalusCore};
pub use error::{BandsError, ErrorLog};
pub use traffic::{Ownship, TrafficEntry, TrafficState};
