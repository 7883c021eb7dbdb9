//! Common test utilities for integration tests.

#![allow(dead_code)]

use bevy::math::DVec3;
use lagrange::types::{METERS_TO_AU, SECONDS_PER_DAY, Trajectories};
use lagrange::{Perturbation, SimulationConfig, initialize, integrate};

/// Sun–Earth config over one Julian year.
pub fn one_year(num_steps: usize) -> SimulationConfig {
    SimulationConfig::for_years(1.0, num_steps)
}

/// Integrate `perturbation` under `config`, panicking on failure.
pub fn run(config: &SimulationConfig, perturbation: &Perturbation) -> Trajectories {
    integrate(config.integration_params(), initialize(config, perturbation))
        .unwrap_or_else(|e| panic!("integration failed: {e}"))
}

/// `|a − b| / |b|`.
pub fn relative_distance(a: DVec3, b: DVec3) -> f64 {
    (a - b).length() / b.length()
}

/// Convert meters to AU.
pub fn meters_to_au(meters: f64) -> f64 {
    meters * METERS_TO_AU
}

/// Convert seconds to days.
pub fn seconds_to_days(seconds: f64) -> f64 {
    seconds / SECONDS_PER_DAY
}
