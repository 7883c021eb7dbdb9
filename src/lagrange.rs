//! Lagrange point positions for the star–planet pair.
//!
//! Positions are given in the initial inertial frame: star at the origin,
//! planet on the positive x-axis at the configured separation.

use std::fmt;
use std::str::FromStr;

use bevy::math::DVec3;

use crate::config::{ConfigError, SimulationConfig};
use crate::vector::planar_unit;

/// One of the five equilibrium points of the restricted three-body problem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LagrangePoint {
    /// Between star and planet.
    L1,
    /// Beyond the planet.
    L2,
    /// Opposite the planet, slightly beyond the planet's distance.
    L3,
    /// 60° ahead of the planet.
    #[default]
    L4,
    /// 60° behind the planet.
    L5,
}

impl LagrangePoint {
    pub const ALL: [LagrangePoint; 5] = [
        LagrangePoint::L1,
        LagrangePoint::L2,
        LagrangePoint::L3,
        LagrangePoint::L4,
        LagrangePoint::L5,
    ];

    /// Position of this point for the given masses and separation.
    ///
    /// L1–L3 use the usual first-order approximations in `m/M`; L4 and L5
    /// are the exact triangular points.
    pub fn position(self, config: &SimulationConfig) -> DVec3 {
        let d = config.separation;
        let ratio = config.masses.planet / config.masses.star;
        let hill = hill_radius(d, ratio);

        match self {
            LagrangePoint::L1 => DVec3::new(d - hill, 0.0, 0.0),
            LagrangePoint::L2 => DVec3::new(d + hill, 0.0, 0.0),
            LagrangePoint::L3 => DVec3::new(-d - d * 7.0 / 12.0 * ratio, 0.0, 0.0),
            LagrangePoint::L4 => d * planar_unit(std::f64::consts::FRAC_PI_3),
            LagrangePoint::L5 => d * planar_unit(-std::f64::consts::FRAC_PI_3),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LagrangePoint::L1 => "L1",
            LagrangePoint::L2 => "L2",
            LagrangePoint::L3 => "L3",
            LagrangePoint::L4 => "L4",
            LagrangePoint::L5 => "L5",
        }
    }
}

/// Hill sphere radius `d·(m / 3M)^(1/3)` for mass ratio `m/M`.
pub fn hill_radius(separation: f64, mass_ratio: f64) -> f64 {
    separation * (mass_ratio / 3.0).cbrt()
}

impl fmt::Display for LagrangePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LagrangePoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|point| point.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownLagrangePoint(s.to_string()))
    }
}
