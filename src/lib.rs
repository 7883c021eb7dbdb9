//! Lagrange - Three-Body Lagrange Point Simulator
//!
//! Integrates a star, a planet on a circular orbit, and a massless
//! satellite placed near one of the pair's Lagrange points, then views the
//! result in the corotating frame and checks it against conserved
//! quantities and two-body period estimates.

pub mod config;
pub mod diagnostics;
pub mod frame;
pub mod initial;
pub mod lagrange;
pub mod physics;
pub mod types;
pub mod vector;

#[cfg(test)]
pub mod test_utils;

pub use config::{ConfigError, IntegrationParams, SimulationConfig};
pub use diagnostics::{
    ConservedQuantities, DiagnosticsError, DriftReport, calc_period_from_initial_conditions,
    calc_period_from_position_data, conservation_calculations,
};
pub use frame::{FrameError, transform_to_corotating};
pub use initial::{Perturbation, ReferencePoint, initialize};
pub use lagrange::LagrangePoint;
pub use physics::{SimulationError, SimulationPlugin, SimulationRun, integrate, simulate};
pub use types::{BodyId, Masses, ThreeBody, Trajectories};
