//! Initial conditions for a run.
//!
//! Star and planet start on circular orbits about the common barycenter at
//! the reference angular speed. The satellite starts at a reference point
//! (a Lagrange point by default), displaced by a planar perturbation, with a
//! caller-chosen speed and heading.

use bevy::math::DVec3;

use crate::config::SimulationConfig;
use crate::lagrange::LagrangePoint;
use crate::types::{AU_TO_METERS, Body, BodyState, DEG_TO_RAD, RAD_TO_DEG, ThreeBody, Trajectories, Trajectory};
use crate::vector::{barycenter, planar_unit, polar_angle};

/// Unperturbed satellite position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReferencePoint {
    /// One of the Lagrange points of the configured star–planet pair.
    Lagrange(LagrangePoint),
    /// An arbitrary position in meters.
    Position(DVec3),
}

impl Default for ReferencePoint {
    fn default() -> Self {
        ReferencePoint::Lagrange(LagrangePoint::L4)
    }
}

impl ReferencePoint {
    pub fn position(&self, config: &SimulationConfig) -> DVec3 {
        match *self {
            ReferencePoint::Lagrange(point) => point.position(config),
            ReferencePoint::Position(pos) => pos,
        }
    }
}

impl From<LagrangePoint> for ReferencePoint {
    fn from(point: LagrangePoint) -> Self {
        ReferencePoint::Lagrange(point)
    }
}

/// Displacement and launch velocity applied to the satellite at step 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perturbation {
    /// Size of the positional offset in AU.
    pub size_au: f64,
    /// Direction of the offset in degrees from the positive x-axis.
    /// `None` = along the reference point's polar angle.
    pub angle_deg: Option<f64>,
    /// Initial speed as a multiple of the planet's orbital speed.
    pub speed: f64,
    /// Direction of the initial velocity in degrees from the positive
    /// x-axis. `None` = 90° ahead of the reference point's polar angle,
    /// i.e. prograde circular motion.
    pub vel_angle_deg: Option<f64>,
    /// Unperturbed satellite position.
    pub reference: ReferencePoint,
}

impl Default for Perturbation {
    fn default() -> Self {
        Self {
            size_au: 0.0,
            angle_deg: None,
            speed: 1.0,
            vel_angle_deg: None,
            reference: ReferencePoint::default(),
        }
    }
}

impl Perturbation {
    /// No perturbation: the satellite sits at `reference` with the
    /// prograde circular velocity.
    pub fn at(reference: impl Into<ReferencePoint>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }

    /// Offset direction and velocity heading in degrees, with defaults
    /// resolved against the reference position.
    pub fn resolved_angles(&self, reference: DVec3) -> (f64, f64) {
        let default_angle = polar_angle(reference) * RAD_TO_DEG;
        (
            self.angle_deg.unwrap_or(default_angle),
            self.vel_angle_deg.unwrap_or(default_angle + 90.0),
        )
    }

    /// Satellite step-0 state and the initial barycenter.
    pub fn satellite_initial_state(&self, config: &SimulationConfig) -> (BodyState, DVec3) {
        let (states, cm) = initial_states(config, self);
        (states.satellite, cm)
    }
}

/// Step-0 states of all bodies and the initial barycenter.
pub fn initial_states(config: &SimulationConfig, perturbation: &Perturbation) -> (ThreeBody<BodyState>, DVec3) {
    let masses = &config.masses;
    let reference = perturbation.reference.position(config);
    let (angle_deg, vel_angle_deg) = perturbation.resolved_angles(reference);

    let star_pos = DVec3::ZERO;
    let planet_pos = DVec3::new(config.separation, 0.0, 0.0);
    let offset = perturbation.size_au * AU_TO_METERS * planar_unit(angle_deg * DEG_TO_RAD);
    let sat_pos = reference + offset;

    let cm = barycenter(&[
        (star_pos, masses.star),
        (planet_pos, masses.planet),
        (sat_pos, masses.satellite),
    ]);

    // Counter-clockwise orbits: angular velocity along +z
    let omega = DVec3::new(0.0, 0.0, config.angular_speed());
    let star_vel = omega.cross(star_pos - cm);
    let planet_vel = omega.cross(planet_pos - cm);

    let sat_speed = perturbation.speed * planet_vel.length();
    let sat_vel = sat_speed * planar_unit(vel_angle_deg * DEG_TO_RAD);

    let states = ThreeBody::new(
        BodyState::new(star_pos, star_vel),
        BodyState::new(planet_pos, planet_vel),
        BodyState::new(sat_pos, sat_vel),
    );
    (states, cm)
}

/// Build trajectories holding only step 0, with room for the whole run.
pub fn initialize(config: &SimulationConfig, perturbation: &Perturbation) -> Trajectories {
    let (states, _) = initial_states(config, perturbation);
    let capacity = config.num_steps.saturating_add(1);
    let masses = config.masses;

    states.zip_with(ThreeBody::new(masses.star, masses.planet, masses.satellite), |state, mass| {
        let mut trajectory = Trajectory::with_capacity(capacity);
        trajectory.push(state);
        Body::new(mass, trajectory)
    })
}
