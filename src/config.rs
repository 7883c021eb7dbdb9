//! Run configuration and parameter validation.
//!
//! Everything here is checked before the first integrator step so an
//! invalid run is rejected as a whole, never partially executed.

use bevy::prelude::Resource;

use crate::types::{AU_TO_METERS, BodyId, JULIAN_YEAR, Masses};

/// Errors raised while validating simulation parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid time step: {0} s (must be positive and finite)")]
    InvalidTimeStep(f64),

    #[error("invalid step count: {0} (must be at least 1)")]
    InvalidStepCount(usize),

    #[error("invalid {body} mass: {mass} kg (must be positive and finite)")]
    InvalidMass { body: BodyId, mass: f64 },

    #[error("invalid duration: {0} s (must be positive and finite)")]
    InvalidDuration(f64),

    #[error("invalid separation: {0} m (must be positive and finite)")]
    InvalidSeparation(f64),

    #[error("invalid orbital period: {0} s (must be positive and finite)")]
    InvalidOrbitalPeriod(f64),

    #[error("initial trajectories hold no step-0 state")]
    MissingInitialState,

    #[error("unknown Lagrange point {0:?} (expected one of L1, L2, L3, L4, L5)")]
    UnknownLagrangePoint(String),
}

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Check that every mass is positive and finite.
pub fn validate_masses(masses: &Masses) -> Result<(), ConfigError> {
    for body in BodyId::ALL {
        let mass = masses.get(body);
        if !positive_finite(mass) {
            return Err(ConfigError::InvalidMass { body, mass });
        }
    }
    Ok(())
}

/// Step size and step count of a fixed-step run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegrationParams {
    /// Duration of one step in seconds.
    pub time_step: f64,
    /// Number of steps after step 0.
    pub num_steps: usize,
}

impl IntegrationParams {
    pub fn new(time_step: f64, num_steps: usize) -> Self {
        Self {
            time_step,
            num_steps,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_steps == 0 {
            return Err(ConfigError::InvalidStepCount(self.num_steps));
        }
        if !positive_finite(self.time_step) {
            return Err(ConfigError::InvalidTimeStep(self.time_step));
        }
        Ok(())
    }

    /// Total simulated time in seconds.
    pub fn duration(&self) -> f64 {
        self.time_step * self.num_steps as f64
    }
}

/// Configuration for a complete simulation run.
#[derive(Resource, Clone, Debug)]
pub struct SimulationConfig {
    /// Simulated time span in seconds. Default: 10 Julian years.
    pub duration: f64,
    /// Number of integrator steps. Default: 100 000.
    pub num_steps: usize,
    /// Body masses. Default: Sun, Earth, 1 kg satellite.
    pub masses: Masses,
    /// Initial star–planet distance in meters. Default: 1 AU.
    pub separation: f64,
    /// Reference orbital period in seconds. Default: 1 Julian year.
    pub orbital_period: f64,
    /// Relative drift of energy and angular momentum above which a run
    /// logs a warning. Default: 1e-6.
    pub drift_tolerance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration: 10.0 * JULIAN_YEAR,
            num_steps: 100_000,
            masses: Masses::default(),
            separation: AU_TO_METERS,
            orbital_period: JULIAN_YEAR,
            drift_tolerance: 1e-6,
        }
    }
}

impl SimulationConfig {
    /// Config covering `years` Julian years in `num_steps` steps.
    pub fn for_years(years: f64, num_steps: usize) -> Self {
        Self {
            duration: years * JULIAN_YEAR,
            num_steps,
            ..Default::default()
        }
    }

    pub fn time_step(&self) -> f64 {
        self.duration / self.num_steps as f64
    }

    /// Angular speed of the reference orbit (rad/s).
    pub fn angular_speed(&self) -> f64 {
        std::f64::consts::TAU / self.orbital_period
    }

    pub fn integration_params(&self) -> IntegrationParams {
        IntegrationParams::new(self.time_step(), self.num_steps)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive_finite(self.duration) {
            return Err(ConfigError::InvalidDuration(self.duration));
        }
        if !positive_finite(self.separation) {
            return Err(ConfigError::InvalidSeparation(self.separation));
        }
        if !positive_finite(self.orbital_period) {
            return Err(ConfigError::InvalidOrbitalPeriod(self.orbital_period));
        }
        validate_masses(&self.masses)?;
        self.integration_params().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.time_step() - 10.0 * JULIAN_YEAR / 1e5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_steps_rejected() {
        let config = SimulationConfig {
            num_steps: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidStepCount(0)));
    }

    #[test]
    fn test_negative_time_step_rejected() {
        let params = IntegrationParams::new(-1.0, 10);
        assert_eq!(params.validate(), Err(ConfigError::InvalidTimeStep(-1.0)));

        let params = IntegrationParams::new(f64::NAN, 10);
        assert!(matches!(params.validate(), Err(ConfigError::InvalidTimeStep(_))));
    }

    #[test]
    fn test_non_positive_mass_rejected() {
        let mut config = SimulationConfig::default();
        config.masses.planet = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidMass {
                body: BodyId::Planet,
                mass: 0.0
            })
        );
    }

    #[test]
    fn test_error_messages_name_the_body() {
        let err = ConfigError::InvalidMass {
            body: BodyId::Star,
            mass: -1.0,
        };
        assert!(err.to_string().contains("star mass"));
    }

    #[test]
    fn test_angular_speed_one_orbit_per_period() {
        let config = SimulationConfig::default();
        let angle = config.angular_speed() * config.orbital_period;
        assert!((angle - std::f64::consts::TAU).abs() < 1e-12);
    }
}
