//! Fixed-step position-Verlet integrator for the three-body system.
//!
//! Each step k → k+1:
//!
//! 1. `mid = pos[k] + ½·vel[k]·dt`
//! 2. `acc = a(mid)`
//! 3. `vel[k+1] = vel[k] + acc·dt`
//! 4. `pos[k+1] = mid + ½·vel[k+1]·dt`
//!
//! Evaluating the force at the midpoint and splitting the drift around the
//! kick makes the scheme symplectic and time-reversible, so energy and
//! angular momentum oscillate instead of drifting.

use std::time::Instant;

use bevy::log::{debug, info, warn};

use crate::config::{ConfigError, IntegrationParams, validate_masses};
use crate::types::{BodyId, BodyState, Masses, ThreeBody, Trajectories};

use super::gravity::{Singularity, calc_acceleration};

/// Fatal conditions met while stepping.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationError {
    /// Two bodies coincided while computing `step`.
    #[error("singular configuration at step {step}: {first} and {second} coincide")]
    SingularConfiguration {
        step: usize,
        first: BodyId,
        second: BodyId,
    },

    /// The update for `step` overflowed or produced NaN for `body`.
    #[error("non-finite {body} state at step {step}")]
    NonFinite { step: usize, body: BodyId },
}

impl IntegrationError {
    /// The step that could not be computed.
    pub fn step(&self) -> usize {
        match *self {
            IntegrationError::SingularConfiguration { step, .. } | IntegrationError::NonFinite { step, .. } => step,
        }
    }
}

/// An aborted run: the error and every step computed before it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{error} (trajectories kept up to step {last_valid_step})")]
pub struct IntegrationFailure {
    #[source]
    pub error: IntegrationError,
    /// Last step present in `partial`.
    pub last_valid_step: usize,
    /// Trajectories for steps `0..=last_valid_step`.
    pub partial: Box<Trajectories>,
}

/// Stepping state of one run.
///
/// The cursor only moves forward; the state at the cursor is always fully
/// written, so a caller may stop between any two calls to
/// [`Integrator::advance`] and keep what has been computed.
#[derive(Clone, Debug)]
pub struct Integrator {
    params: IntegrationParams,
    masses: Masses,
    trajectories: Trajectories,
    current: ThreeBody<BodyState>,
    step: usize,
}

impl Integrator {
    /// Prepare a run from step-0 trajectories.
    ///
    /// Only step 0 of `initial` is used; any later steps are discarded.
    ///
    /// # Errors
    /// Rejects a non-positive or non-finite time step, a zero step count,
    /// non-positive masses and empty trajectories before any stepping.
    pub fn new(params: IntegrationParams, mut initial: Trajectories) -> Result<Self, ConfigError> {
        params.validate()?;
        let masses = initial.masses();
        validate_masses(&masses)?;

        let current = initial.state(0).ok_or(ConfigError::MissingInitialState)?;
        if initial.len() > 1 {
            debug!("Discarding {} recorded steps after step 0", initial.len() - 1);
        }

        for id in BodyId::ALL {
            let trajectory = &mut initial.get_mut(id).trajectory;
            trajectory.truncate(1);
            trajectory.reserve(params.num_steps);
        }

        Ok(Self {
            params,
            masses,
            trajectories: initial,
            current,
            step: 0,
        })
    }

    pub fn params(&self) -> IntegrationParams {
        self.params
    }

    /// Index of the last computed step.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Steps still to compute.
    pub fn remaining(&self) -> usize {
        self.params.num_steps - self.step
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.params.num_steps
    }

    /// Fraction of the run completed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.step as f64 / self.params.num_steps as f64
    }

    /// State of all bodies at the cursor.
    pub fn current(&self) -> ThreeBody<BodyState> {
        self.current
    }

    /// Trajectories computed so far.
    pub fn trajectories(&self) -> &Trajectories {
        &self.trajectories
    }

    /// Compute up to `max_steps` further steps.
    ///
    /// Returns the number of steps taken, zero once the run is finished.
    ///
    /// # Errors
    /// Stops at the first singular configuration or non-finite state. The
    /// failing step is not recorded, so the trajectories remain valid up to
    /// [`Integrator::step`].
    pub fn advance(&mut self, max_steps: usize) -> Result<usize, IntegrationError> {
        let steps = max_steps.min(self.remaining());
        let dt = self.params.time_step;
        let half_dt = 0.5 * dt;
        let masses = self.masses;
        let mut current = self.current;

        for taken in 0..steps {
            let mid = current.map(|s| s.pos + half_dt * s.vel);

            let accel = match calc_acceleration(&masses, &mid) {
                Ok(accel) => accel,
                Err(Singularity { first, second }) => {
                    self.current = current;
                    self.step += taken;
                    return Err(IntegrationError::SingularConfiguration {
                        step: self.step + 1,
                        first,
                        second,
                    });
                }
            };

            let next = current
                .zip_with(mid, |s, m| (s.vel, m))
                .zip_with(accel, |(vel, mid), a| {
                    let vel = vel + a * dt;
                    BodyState::new(mid + half_dt * vel, vel)
                });

            if let Some((body, _)) = next.iter().find(|(_, state)| !state.is_finite()) {
                self.current = current;
                self.step += taken;
                return Err(IntegrationError::NonFinite {
                    step: self.step + 1,
                    body,
                });
            }
            current = next;

            self.trajectories.star.trajectory.push(current.star);
            self.trajectories.planet.trajectory.push(current.planet);
            self.trajectories.satellite.trajectory.push(current.satellite);
        }

        self.current = current;
        self.step += steps;
        Ok(steps)
    }

    /// Step to the end of the run.
    ///
    /// # Errors
    /// On a singular configuration returns the error together with the
    /// trajectories up to the last valid step.
    pub fn run(mut self) -> Result<Trajectories, IntegrationFailure> {
        let started = Instant::now();
        info!(
            "Integrating {} steps of {:.1} s ({:.3e} s total)",
            self.params.num_steps,
            self.params.time_step,
            self.params.duration()
        );

        match self.advance(self.remaining()) {
            Ok(_) => {
                info!(
                    "Integration finished in {:.3} s",
                    started.elapsed().as_secs_f64()
                );
                Ok(self.trajectories)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Stop here and keep the steps computed so far.
    pub fn into_partial(self) -> Trajectories {
        self.trajectories
    }

    /// Package an error from [`Integrator::advance`] with the partial result.
    pub fn fail(self, error: IntegrationError) -> IntegrationFailure {
        warn!("Integration aborted: {}", error);
        IntegrationFailure {
            error,
            last_valid_step: self.step,
            partial: Box::new(self.trajectories),
        }
    }
}
