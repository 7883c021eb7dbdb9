//! Physics simulation for the star–planet–satellite system.
//!
//! This module provides the acceleration law, the position-Verlet
//! integrator, and a plugin that advances a run a fixed number of steps per
//! frame so an app can show progress or cancel between steps.

mod gravity;
mod integrator;

#[cfg(test)]
mod proptest_physics;

use bevy::log::{debug, info};
use bevy::prelude::*;

pub use gravity::{Singularity, calc_acceleration};
pub use integrator::{IntegrationError, IntegrationFailure, Integrator};

use crate::config::{ConfigError, IntegrationParams, SimulationConfig};
use crate::diagnostics::check_drift;
use crate::initial::{Perturbation, initialize};
use crate::types::Trajectories;

/// Any error a simulation run can end with.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid parameters: {0}")]
    Config(#[from] ConfigError),

    #[error("integration failed: {0}")]
    Integration(#[from] IntegrationFailure),
}

impl SimulationError {
    /// Trajectories computed before a singular configuration, if any.
    pub fn partial(&self) -> Option<&Trajectories> {
        match self {
            SimulationError::Config(_) => None,
            SimulationError::Integration(failure) => Some(&failure.partial),
        }
    }
}

/// Integrate `initial` for `params.num_steps` steps.
///
/// Only step 0 of `initial` is read. On success every body has
/// `num_steps + 1` recorded states.
///
/// # Errors
/// [`SimulationError::Config`] when the parameters or masses are invalid
/// (nothing is computed), [`SimulationError::Integration`] with the partial
/// trajectories when two bodies coincide.
pub fn integrate(params: IntegrationParams, initial: Trajectories) -> Result<Trajectories, SimulationError> {
    Ok(Integrator::new(params, initial)?.run()?)
}

/// Build the initial conditions and integrate them over `config.duration`.
///
/// Logs a warning when energy or angular momentum drift beyond
/// `config.drift_tolerance`.
pub fn simulate(config: &SimulationConfig, perturbation: &Perturbation) -> Result<Trajectories, SimulationError> {
    config.validate()?;
    let trajectories = integrate(config.integration_params(), initialize(config, perturbation))?;
    check_drift(&trajectories, config.drift_tolerance);
    Ok(trajectories)
}

/// Plugin advancing a [`SimulationRun`] resource every frame.
///
/// Inserting a `SimulationRun` starts it; the plugin itself inserts
/// nothing.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, advance_simulation);
    }
}

/// Where a [`SimulationRun`] stands.
#[derive(Debug)]
pub enum RunState {
    Running(Integrator),
    Finished(Trajectories),
    /// Stopped by [`SimulationRun::cancel`]; holds the steps computed so far.
    Cancelled(Trajectories),
    Failed(IntegrationFailure),
}

/// A run that is stepped incrementally by [`SimulationPlugin`].
#[derive(Resource, Debug)]
pub struct SimulationRun {
    /// Integrator steps per frame.
    pub steps_per_update: usize,
    /// Drift tolerance checked when the run finishes.
    pub drift_tolerance: Option<f64>,
    num_steps: usize,
    state: RunState,
}

impl SimulationRun {
    pub fn new(integrator: Integrator, steps_per_update: usize) -> Self {
        Self {
            steps_per_update,
            drift_tolerance: None,
            num_steps: integrator.params().num_steps,
            state: RunState::Running(integrator),
        }
    }

    /// Start a run from a config and a perturbation.
    ///
    /// # Errors
    /// Rejects an invalid config before anything is stepped.
    pub fn from_config(
        config: &SimulationConfig,
        perturbation: &Perturbation,
        steps_per_update: usize,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let integrator = Integrator::new(config.integration_params(), initialize(config, perturbation))?;
        Ok(Self {
            drift_tolerance: Some(config.drift_tolerance),
            ..Self::new(integrator, steps_per_update)
        })
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running(_))
    }

    /// Fraction of the run computed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let computed = self.trajectories().len().saturating_sub(1);
        computed as f64 / self.num_steps as f64
    }

    /// Trajectories computed so far, whatever the state.
    pub fn trajectories(&self) -> &Trajectories {
        match &self.state {
            RunState::Running(integrator) => integrator.trajectories(),
            RunState::Finished(t) | RunState::Cancelled(t) => t,
            RunState::Failed(failure) => &failure.partial,
        }
    }

    /// Stop a running run, keeping the steps computed so far.
    pub fn cancel(&mut self) {
        if let Some(integrator) = self.take_integrator() {
            info!("Simulation cancelled at step {}", integrator.step());
            self.state = RunState::Cancelled(integrator.into_partial());
        }
    }

    /// Compute the next `steps_per_update` steps.
    pub fn advance(&mut self) {
        let steps = self.steps_per_update.max(1);
        let outcome = match &mut self.state {
            RunState::Running(integrator) => integrator.advance(steps).map(|_| integrator.is_finished()),
            _ => return,
        };

        match outcome {
            Ok(false) => {
                if let RunState::Running(integrator) = &self.state {
                    debug!("Simulation {:.1}% complete", integrator.progress() * 100.0);
                }
            }
            Ok(true) => {
                if let Some(integrator) = self.take_integrator() {
                    let trajectories = integrator.into_partial();
                    info!("Simulation finished: {} steps", trajectories.len() - 1);
                    if let Some(tolerance) = self.drift_tolerance {
                        check_drift(&trajectories, tolerance);
                    }
                    self.state = RunState::Finished(trajectories);
                }
            }
            Err(error) => {
                if let Some(integrator) = self.take_integrator() {
                    self.state = RunState::Failed(integrator.fail(error));
                }
            }
        }
    }

    fn take_integrator(&mut self) -> Option<Integrator> {
        if !self.is_running() {
            return None;
        }
        match std::mem::replace(&mut self.state, RunState::Cancelled(Trajectories::default())) {
            RunState::Running(integrator) => Some(integrator),
            other => {
                self.state = other;
                None
            }
        }
    }
}

fn advance_simulation(run: Option<ResMut<SimulationRun>>) {
    if let Some(mut run) = run {
        run.advance();
    }
}
