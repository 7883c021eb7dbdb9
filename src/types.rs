//! Core physics types and constants for the three-body simulation.

use std::fmt;

use bevy::math::DVec3;

/// Physical constants (SI units)

/// Gravitational constant (m³·kg⁻¹·s⁻²)
pub const G: f64 = 6.67430e-11;

/// Astronomical unit in meters
pub const AU_TO_METERS: f64 = 1.495978707e11;

/// Meters to AU
pub const METERS_TO_AU: f64 = 1.0 / AU_TO_METERS;

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees conversion factor
pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

/// Seconds per day
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// One Julian year (365.25 days) in seconds
pub const JULIAN_YEAR: f64 = 365.25 * SECONDS_PER_DAY;

/// Mass of the Sun in kilograms
pub const SUN_MASS: f64 = 1.98847e30;

/// Mass of the Earth in kilograms
pub const EARTH_MASS: f64 = 5.9722e24;

/// Mass of the satellite in kilograms.
///
/// Only enters the barycenter and the conserved quantities; the
/// satellite never attracts the other two bodies.
pub const SATELLITE_MASS: f64 = 1.0;

/// Identifies one of the three simulated bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyId {
    /// Primary (Sun-like) body
    Star,
    /// Secondary (Earth-like) body
    Planet,
    /// Test particle studied near a Lagrange point
    Satellite,
}

impl BodyId {
    /// All bodies in storage order.
    pub const ALL: [BodyId; 3] = [BodyId::Star, BodyId::Planet, BodyId::Satellite];
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BodyId::Star => "star",
            BodyId::Planet => "planet",
            BodyId::Satellite => "satellite",
        };
        f.write_str(name)
    }
}

/// One value per body.
///
/// Positions, velocities, accelerations and whole trajectories are all
/// stored this way so every per-body formula is written once.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThreeBody<T> {
    pub star: T,
    pub planet: T,
    pub satellite: T,
}

impl<T> ThreeBody<T> {
    pub fn new(star: T, planet: T, satellite: T) -> Self {
        Self {
            star,
            planet,
            satellite,
        }
    }

    pub fn get(&self, id: BodyId) -> &T {
        match id {
            BodyId::Star => &self.star,
            BodyId::Planet => &self.planet,
            BodyId::Satellite => &self.satellite,
        }
    }

    pub fn get_mut(&mut self, id: BodyId) -> &mut T {
        match id {
            BodyId::Star => &mut self.star,
            BodyId::Planet => &mut self.planet,
            BodyId::Satellite => &mut self.satellite,
        }
    }

    /// Apply `f` to each body's value.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> ThreeBody<U> {
        ThreeBody {
            star: f(self.star),
            planet: f(self.planet),
            satellite: f(self.satellite),
        }
    }

    /// Combine two per-body values body by body.
    pub fn zip_with<U, V>(self, other: ThreeBody<U>, mut f: impl FnMut(T, U) -> V) -> ThreeBody<V> {
        ThreeBody {
            star: f(self.star, other.star),
            planet: f(self.planet, other.planet),
            satellite: f(self.satellite, other.satellite),
        }
    }

    /// Iterate as `(BodyId, &T)` in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &T)> {
        BodyId::ALL.into_iter().map(move |id| (id, self.get(id)))
    }
}

/// Masses of the three bodies in kilograms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Masses {
    pub star: f64,
    pub planet: f64,
    pub satellite: f64,
}

impl Default for Masses {
    fn default() -> Self {
        Self {
            star: SUN_MASS,
            planet: EARTH_MASS,
            satellite: SATELLITE_MASS,
        }
    }
}

impl Masses {
    pub fn get(&self, id: BodyId) -> f64 {
        match id {
            BodyId::Star => self.star,
            BodyId::Planet => self.planet,
            BodyId::Satellite => self.satellite,
        }
    }

    pub fn total(&self) -> f64 {
        self.star + self.planet + self.satellite
    }
}

/// Instantaneous state of a single body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyState {
    /// Position in meters
    pub pos: DVec3,
    /// Velocity in meters per second
    pub vel: DVec3,
}

impl BodyState {
    pub fn new(pos: DVec3, vel: DVec3) -> Self {
        Self { pos, vel }
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

/// Position and velocity history of one body, indexed by step number.
///
/// Both sequences always have the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    pub positions: Vec<DVec3>,
    pub velocities: Vec<DVec3>,
}

impl Trajectory {
    /// Empty trajectory with room for `steps` entries.
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            positions: Vec::with_capacity(steps),
            velocities: Vec::with_capacity(steps),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn push(&mut self, state: BodyState) {
        self.positions.push(state.pos);
        self.velocities.push(state.vel);
    }

    pub fn state(&self, step: usize) -> Option<BodyState> {
        Some(BodyState::new(
            *self.positions.get(step)?,
            *self.velocities.get(step)?,
        ))
    }

    pub fn last(&self) -> Option<BodyState> {
        self.len().checked_sub(1).and_then(|step| self.state(step))
    }

    /// Keep only the first `len` steps.
    pub fn truncate(&mut self, len: usize) {
        self.positions.truncate(len);
        self.velocities.truncate(len);
    }

    /// Make room for `additional` more steps up front.
    pub fn reserve(&mut self, additional: usize) {
        self.positions.reserve(additional);
        self.velocities.reserve(additional);
    }
}

/// A body: its fixed mass and its trajectory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
    pub mass: f64,
    pub trajectory: Trajectory,
}

impl Body {
    pub fn new(mass: f64, trajectory: Trajectory) -> Self {
        Self { mass, trajectory }
    }
}

/// Trajectories of all three bodies over one run.
pub type Trajectories = ThreeBody<Body>;

impl ThreeBody<Body> {
    /// Number of recorded steps (step 0 included).
    ///
    /// The three bodies are written in lockstep, so the star's length is
    /// representative.
    pub fn len(&self) -> usize {
        self.star.trajectory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn masses(&self) -> Masses {
        Masses {
            star: self.star.mass,
            planet: self.planet.mass,
            satellite: self.satellite.mass,
        }
    }

    /// State of all three bodies at `step`.
    pub fn state(&self, step: usize) -> Option<ThreeBody<BodyState>> {
        Some(ThreeBody::new(
            self.star.trajectory.state(step)?,
            self.planet.trajectory.state(step)?,
            self.satellite.trajectory.state(step)?,
        ))
    }

    pub fn positions(&self, id: BodyId) -> &[DVec3] {
        &self.get(id).trajectory.positions
    }

    pub fn velocities(&self, id: BodyId) -> &[DVec3] {
        &self.get(id).trajectory.velocities
    }

    /// Barycenter position at every recorded step.
    pub fn barycenter(&self) -> Vec<DVec3> {
        let masses = self.masses();
        let total = masses.total();
        self.star
            .trajectory
            .positions
            .iter()
            .zip(&self.planet.trajectory.positions)
            .zip(&self.satellite.trajectory.positions)
            .map(|((&s, &p), &q)| {
                (s * masses.star + p * masses.planet + q * masses.satellite) / total
            })
            .collect()
    }
}
