//! Test utilities for the three-body simulation.
//!
//! Provides fixtures for short runs and assertions for checking the
//! conserved quantities of a finished run.

use bevy::math::DVec3;

use crate::config::SimulationConfig;
use crate::types::{AU_TO_METERS, BodyState, G, SUN_MASS};

/// Fixtures for creating test configurations and states.
pub mod fixtures {
    use super::*;
    use crate::initial::{Perturbation, initialize};
    use crate::physics::integrate;
    use crate::types::Trajectories;

    /// Sun–Earth config covering `years` with `steps_per_year` steps per year.
    pub fn short_config(years: f64, steps_per_year: usize) -> SimulationConfig {
        let num_steps = ((years * steps_per_year as f64).round() as usize).max(1);
        SimulationConfig::for_years(years, num_steps)
    }

    /// Integrate `perturbation` under `config`.
    ///
    /// # Panics
    /// Panics if the integration hits a singular configuration.
    pub fn run(config: &SimulationConfig, perturbation: &Perturbation) -> Trajectories {
        integrate(config.integration_params(), initialize(config, perturbation))
            .expect("test run should not hit a singularity")
    }

    /// Circular orbit about a lone Sun at `distance_au`, on +x moving +y.
    pub fn circular_orbit(distance_au: f64) -> BodyState {
        let r = distance_au * AU_TO_METERS;
        let v = (G * SUN_MASS / r).sqrt();
        BodyState::new(DVec3::new(r, 0.0, 0.0), DVec3::new(0.0, v, 0.0))
    }

    /// Orbit about a lone Sun starting at perihelion on +x.
    pub fn elliptical_orbit(perihelion_au: f64, eccentricity: f64) -> BodyState {
        assert!(
            (0.0..1.0).contains(&eccentricity),
            "Eccentricity must be in [0, 1) for elliptical orbit"
        );
        let r_p = perihelion_au * AU_TO_METERS;
        let a = r_p / (1.0 - eccentricity);
        let v = (G * SUN_MASS * (2.0 / r_p - 1.0 / a)).sqrt();
        BodyState::new(DVec3::new(r_p, 0.0, 0.0), DVec3::new(0.0, v, 0.0))
    }
}

/// Assertions for conserved quantities.
pub mod assertions {
    /// `|actual/expected − 1|`, or `|actual − expected|` when `expected`
    /// is zero.
    pub fn relative_error(actual: f64, expected: f64) -> f64 {
        if expected == 0.0 {
            (actual - expected).abs()
        } else {
            (actual / expected - 1.0).abs()
        }
    }

    /// Assert that `actual` is within `tolerance` of `expected`, relatively.
    ///
    /// # Panics
    /// Panics with both values and the error when out of tolerance.
    pub fn assert_relative_within(what: &str, actual: f64, expected: f64, tolerance: f64) {
        let error = relative_error(actual, expected);
        assert!(
            error <= tolerance,
            "{what}: expected={expected:.6e}, actual={actual:.6e}, error={error:.3e}, tolerance={tolerance:.3e}"
        );
    }
}

/// Utilities for headless Bevy apps.
pub mod bevy_test {
    use bevy::prelude::*;

    use crate::physics::SimulationPlugin;

    /// App with only the simulation plugin; no window or renderer.
    pub fn headless_app() -> App {
        let mut app = App::new();
        app.add_plugins(SimulationPlugin);
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JULIAN_YEAR;

    #[test]
    fn test_short_config_step_count() {
        let config = fixtures::short_config(0.5, 1000);
        assert_eq!(config.num_steps, 500);
        assert_eq!(config.duration, 0.5 * JULIAN_YEAR);
    }

    #[test]
    fn test_elliptical_orbit_reduces_to_circular() {
        assert_eq!(fixtures::elliptical_orbit(1.0, 0.0), fixtures::circular_orbit(1.0));
    }

    #[test]
    fn test_relative_error() {
        assert_eq!(assertions::relative_error(2.0, 0.0), 2.0);
        assert!((assertions::relative_error(1.1, 1.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "energy")]
    fn test_assert_relative_within_panics() {
        assertions::assert_relative_within("energy", 2.0, 1.0, 0.5);
    }
}
