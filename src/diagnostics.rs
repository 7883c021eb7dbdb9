//! Conserved quantities and orbital period estimates.
//!
//! Nothing here feeds back into the integrator. The conserved-quantity
//! series are used to judge whether a time step was small enough; the
//! period estimators cross-check the satellite's orbit against the
//! two-body solution.

use bevy::log::{debug, warn};
use bevy::math::DVec3;
use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::initial::Perturbation;
use crate::types::{BodyId, BodyState, G, Masses, Trajectories};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticsError {
    #[error("no position data")]
    Empty,

    #[error("length mismatch: {expected} barycenter points for {actual} positions")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Total momentum, angular momentum and energy at every step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConservedQuantities {
    /// Σ m·v (kg·m/s)
    pub momentum: Vec<DVec3>,
    /// Σ m·r×v (kg·m²/s)
    pub angular_momentum: Vec<DVec3>,
    /// Kinetic plus pairwise potential energy (J)
    pub energy: Vec<f64>,
}

/// Largest deviation of each conserved quantity from its step-0 value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriftReport {
    /// max |E/E₀ − 1|
    pub energy: f64,
    /// max |L − L₀| / |L₀|
    pub angular_momentum: f64,
    /// max |P − P₀| divided by the reference momentum.
    ///
    /// Linear momentum is not conserved exactly: the satellite feels the
    /// other bodies without pulling back. The change stays far below the
    /// planet's own momentum.
    pub momentum: f64,
}

impl DriftReport {
    /// Whether energy and angular momentum both stay within `tolerance`.
    pub fn within(&self, tolerance: f64) -> bool {
        self.energy <= tolerance && self.angular_momentum <= tolerance
    }
}

impl ConservedQuantities {
    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }

    /// `E/E₀ − 1` at every step.
    pub fn normalized_energy(&self) -> Vec<f64> {
        let Some(&e0) = self.energy.first() else {
            return Vec::new();
        };
        self.energy.par_iter().map(|&e| e / e0 - 1.0).collect()
    }

    /// `L_z/L_z₀ − 1` at every step. The x and y components vanish for
    /// planar motion.
    pub fn normalized_angular_momentum(&self) -> Vec<f64> {
        let Some(l0) = self.angular_momentum.first() else {
            return Vec::new();
        };
        let l0 = l0.z;
        self.angular_momentum.par_iter().map(|l| l.z / l0 - 1.0).collect()
    }

    /// Total momentum divided by `reference` (typically the planet's
    /// momentum magnitude).
    pub fn normalized_momentum(&self, reference: f64) -> Vec<DVec3> {
        self.momentum.par_iter().map(|&p| p / reference).collect()
    }

    /// Maximum drift of every series from its first entry.
    pub fn drift(&self, reference_momentum: f64) -> DriftReport {
        let (Some(&e0), Some(&l0), Some(&p0)) = (
            self.energy.first(),
            self.angular_momentum.first(),
            self.momentum.first(),
        ) else {
            return DriftReport::default();
        };
        let l0_len = l0.length();

        let energy = self
            .energy
            .par_iter()
            .map(|&e| (e / e0 - 1.0).abs())
            .reduce(|| 0.0, f64::max);
        let angular_momentum = self
            .angular_momentum
            .par_iter()
            .map(|&l| (l - l0).length() / l0_len)
            .reduce(|| 0.0, f64::max);
        let momentum = self
            .momentum
            .par_iter()
            .map(|&p| (p - p0).length() / reference_momentum)
            .reduce(|| 0.0, f64::max);

        DriftReport {
            energy,
            angular_momentum,
            momentum,
        }
    }
}

/// Compute total momentum, angular momentum and energy at every step.
///
/// Runs in parallel over steps; each worker writes its own output slots.
/// The satellite's mass is included in every sum. If the bodies were
/// recorded for different numbers of steps, a warning is logged and only
/// the steps common to all of them are used.
pub fn conservation_calculations(trajectories: &Trajectories) -> ConservedQuantities {
    let masses = trajectories.masses();
    let lengths = BodyId::ALL.map(|id| {
        (
            id,
            trajectories.positions(id).len(),
            trajectories.velocities(id).len(),
        )
    });
    let n = lengths.iter().map(|&(_, p, v)| p.min(v)).min().unwrap_or(0);
    if let Some(&(id, p, v)) = lengths.iter().find(|&&(_, p, v)| p != n || v != n) {
        warn!(
            "Trajectory length mismatch ({} has {} positions, {} velocities); using the first {} steps",
            id, p, v, n
        );
    }

    let mut out = ConservedQuantities {
        momentum: vec![DVec3::ZERO; n],
        angular_momentum: vec![DVec3::ZERO; n],
        energy: vec![0.0; n],
    };

    out.momentum
        .par_iter_mut()
        .zip(out.angular_momentum.par_iter_mut())
        .zip(out.energy.par_iter_mut())
        .enumerate()
        .for_each(|(k, ((momentum, angular_momentum), energy))| {
            let state = |id| {
                BodyState::new(trajectories.positions(id)[k], trajectories.velocities(id)[k])
            };
            let star = state(BodyId::Star);
            let planet = state(BodyId::Planet);
            let sat = state(BodyId::Satellite);

            *momentum = masses.star * star.vel + masses.planet * planet.vel + masses.satellite * sat.vel;

            *angular_momentum = star.pos.cross(masses.star * star.vel)
                + planet.pos.cross(masses.planet * planet.vel)
                + sat.pos.cross(masses.satellite * sat.vel);

            let potential = -G * masses.star * masses.planet / (star.pos - planet.pos).length()
                - G * masses.satellite * masses.planet / (sat.pos - planet.pos).length()
                - G * masses.satellite * masses.star / (sat.pos - star.pos).length();

            let kinetic = 0.5 * masses.star * star.vel.length_squared()
                + 0.5 * masses.planet * planet.vel.length_squared()
                + 0.5 * masses.satellite * sat.vel.length_squared();

            *energy = potential + kinetic;
        });

    out
}

/// Compute the drift of a finished run and warn if it exceeds `tolerance`.
///
/// Linear momentum is reported relative to the planet's initial momentum.
pub fn check_drift(trajectories: &Trajectories, tolerance: f64) -> DriftReport {
    let quantities = conservation_calculations(trajectories);
    let reference = trajectories
        .velocities(BodyId::Planet)
        .first()
        .map(|v| trajectories.planet.mass * v.length())
        .unwrap_or(1.0);
    let report = quantities.drift(reference);

    if report.within(tolerance) {
        debug!(
            "Conserved quantities within {:e}: energy drift {:.3e}, angular momentum drift {:.3e}",
            tolerance, report.energy, report.angular_momentum
        );
    } else {
        warn!(
            "Conserved quantity drift exceeds {:e} (energy {:.3e}, angular momentum {:.3e}); consider a smaller time step",
            tolerance, report.energy, report.angular_momentum
        );
    }
    report
}

/// Two-body orbit of the satellite about the star.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitalElements {
    pub eccentricity: f64,
    /// Semi-major axis in meters. Not positive for unbound orbits.
    pub semi_major_axis: f64,
    /// Period in seconds; infinite for unbound orbits.
    pub period: f64,
}

impl OrbitalElements {
    /// Derive the orbit from the satellite's state relative to the
    /// barycenter, ignoring the planet's pull.
    ///
    /// Splits the velocity into radial and transverse parts, then uses the
    /// angular momentum `L = |r × m·v|` and `k = G·M·m`:
    ///
    /// * `e² = (L·v_r/k)² + (L/k·(k/L − v_t))²`
    /// * `a = L² / (k·μ·(1 − e²))` with reduced mass `μ = M·m/(M + m)`
    pub fn from_initial_conditions(satellite: BodyState, barycenter: DVec3, masses: &Masses) -> Self {
        let r = satellite.pos - barycenter;
        let radial = r.normalize();
        // 90° counter-clockwise from the radial direction
        let transverse = DVec3::new(-radial.y, radial.x, radial.z);

        let v_r = satellite.vel.dot(radial);
        let v_t = satellite.vel.dot(transverse);

        let (big, small) = (masses.star, masses.satellite);
        let angular_momentum = r.cross(small * satellite.vel).length();
        let k = G * big * small;

        let radial_term = angular_momentum / k * v_r;
        let transverse_term = angular_momentum / k * (k / angular_momentum - v_t);
        let eccentricity_squared = radial_term * radial_term + transverse_term * transverse_term;

        let reduced_mass = big * small / (big + small);
        let semi_major_axis =
            angular_momentum * angular_momentum / (k * reduced_mass * (1.0 - eccentricity_squared));

        Self {
            eccentricity: eccentricity_squared.sqrt(),
            semi_major_axis,
            period: period_from_semi_major_axis(semi_major_axis, big),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.eccentricity < 1.0
    }
}

/// Kepler's third law, `T = 2π·√(a³ / (G·M))`.
///
/// Returns infinity when `a` is not a positive finite length.
pub fn period_from_semi_major_axis(semi_major_axis: f64, star_mass: f64) -> f64 {
    if !(semi_major_axis.is_finite() && semi_major_axis > 0.0) {
        return f64::INFINITY;
    }
    std::f64::consts::TAU * (semi_major_axis.powi(3) / (G * star_mass)).sqrt()
}

/// Period of the satellite's two-body orbit predicted from its initial
/// conditions.
pub fn calc_period_from_initial_conditions(config: &SimulationConfig, perturbation: &Perturbation) -> f64 {
    let (satellite, barycenter) = perturbation.satellite_initial_state(config);
    OrbitalElements::from_initial_conditions(satellite, barycenter, &config.masses).period
}

/// Semi-major axis from observed perihelion and aphelion,
/// `(min |r − cm| + max |r − cm|) / 2`.
pub fn semi_major_axis_from_position_data(positions: &[DVec3], barycenter: &[DVec3]) -> Result<f64, DiagnosticsError> {
    if positions.is_empty() {
        return Err(DiagnosticsError::Empty);
    }
    if positions.len() != barycenter.len() {
        return Err(DiagnosticsError::LengthMismatch {
            expected: positions.len(),
            actual: barycenter.len(),
        });
    }

    let (perihelion, aphelion) = positions
        .par_iter()
        .zip(barycenter.par_iter())
        .map(|(&p, &cm)| {
            let d = (p - cm).length();
            (d, d)
        })
        .reduce(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)),
        );

    Ok((perihelion + aphelion) / 2.0)
}

/// Period of the satellite's orbit estimated from a trajectory.
pub fn calc_period_from_position_data(
    positions: &[DVec3],
    barycenter: &[DVec3],
    star_mass: f64,
) -> Result<f64, DiagnosticsError> {
    let semi_major_axis = semi_major_axis_from_position_data(positions, barycenter)?;
    Ok(period_from_semi_major_axis(semi_major_axis, star_mass))
}
