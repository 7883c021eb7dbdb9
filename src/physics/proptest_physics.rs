//! Property-based tests for the simulation using proptest.
//!
//! These tests check physical invariants across a range of positions,
//! perturbations and orbits.

use bevy::math::DVec3;
use proptest::prelude::*;

use crate::config::SimulationConfig;
use crate::diagnostics::{OrbitalElements, conservation_calculations};
use crate::frame::transform_to_corotating;
use crate::initial::{Perturbation, initial_states};
use crate::lagrange::LagrangePoint;
use crate::physics::calc_acceleration;
use crate::test_utils::{assertions, fixtures};
use crate::types::{AU_TO_METERS, Masses, ThreeBody};

fn planar(x_au: f64, y_au: f64) -> DVec3 {
    DVec3::new(x_au, y_au, 0.0) * AU_TO_METERS
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Star and planet pull on each other with equal and opposite forces.
    #[test]
    fn prop_star_planet_forces_balance(
        px in -5.0f64..5.0,
        py in 0.1f64..5.0,
        sx in -5.0f64..5.0,
        sy in -5.0f64..-0.1,
    ) {
        let masses = Masses::default();
        let positions = ThreeBody::new(DVec3::ZERO, planar(px, py), planar(sx, sy));
        let acc = calc_acceleration(&masses, &positions).unwrap();

        let net = masses.star * acc.star + masses.planet * acc.planet;
        prop_assert!(net.length() <= 1e-12 * masses.star * acc.star.length());
    }

    /// A satellite on the far side from the planet is pulled inward.
    #[test]
    fn prop_satellite_pulled_toward_star(
        sx in 0.1f64..5.0,
        sy in -5.0f64..5.0,
    ) {
        // Planet far away on the −x side so the star dominates
        let masses = Masses::default();
        let sat = planar(sx, sy);
        let positions = ThreeBody::new(DVec3::ZERO, planar(-100.0, 0.0), sat);
        let acc = calc_acceleration(&masses, &positions).unwrap();

        prop_assert!(acc.satellite.dot(sat) < 0.0);
    }

    /// The corotating transform preserves planar distance from the origin.
    #[test]
    fn prop_corotating_preserves_planar_norm(
        points in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0, -1.0f64..1.0), 1..32),
        omega in -2.0f64..2.0,
        dt in 0.01f64..10.0,
    ) {
        let positions: Vec<DVec3> = points.iter().map(|&(x, y, z)| DVec3::new(x, y, z)).collect();
        let times: Vec<f64> = (0..positions.len()).map(|k| k as f64 * dt).collect();
        let out = transform_to_corotating(&times, omega, &positions).unwrap();

        for (o, p) in out.iter().zip(&positions) {
            let planar_norm = p.truncate().length();
            prop_assert!((o.length() - planar_norm).abs() <= 1e-12 * planar_norm.max(1.0));
            prop_assert_eq!(o.z, 0.0);
        }
    }

    /// L4 and L5 form equilateral triangles with the star and the planet.
    #[test]
    fn prop_triangular_points_equilateral(separation_au in 0.1f64..50.0) {
        let config = SimulationConfig {
            separation: separation_au * AU_TO_METERS,
            ..Default::default()
        };
        let planet = DVec3::new(config.separation, 0.0, 0.0);

        for point in [LagrangePoint::L4, LagrangePoint::L5] {
            let pos = point.position(&config);
            assertions::assert_relative_within("distance to star", pos.length(), config.separation, 1e-12);
            assertions::assert_relative_within("distance to planet", (pos - planet).length(), config.separation, 1e-12);
        }
    }

    /// Star and planet start on circular orbits about the barycenter for
    /// any satellite perturbation.
    #[test]
    fn prop_initial_orbits_are_circular(
        size_au in 0.0f64..0.05,
        angle_deg in 0.0f64..360.0,
        speed in 0.5f64..1.5,
    ) {
        let config = SimulationConfig::default();
        let perturbation = Perturbation {
            size_au,
            angle_deg: Some(angle_deg),
            speed,
            ..Default::default()
        };
        let (states, cm) = initial_states(&config, &perturbation);

        for state in [states.star, states.planet] {
            let r = state.pos - cm;
            prop_assert!(r.dot(state.vel).abs() <= 1e-9 * r.length() * state.vel.length());
        }
    }

    /// A circular orbit about a lone Sun has zero eccentricity and a
    /// semi-major axis equal to its radius.
    #[test]
    fn prop_circular_orbit_elements(distance_au in 0.3f64..30.0) {
        let state = fixtures::circular_orbit(distance_au);
        let elements = OrbitalElements::from_initial_conditions(state, DVec3::ZERO, &Masses::default());

        prop_assert!(elements.eccentricity < 1e-6);
        assertions::assert_relative_within("semi-major axis", elements.semi_major_axis, distance_au * AU_TO_METERS, 1e-9);
    }

    /// Eccentricity recovered from a perihelion state matches the one the
    /// state was built with.
    #[test]
    fn prop_eccentricity_roundtrip(
        perihelion_au in 0.3f64..10.0,
        eccentricity in 0.0f64..0.9,
    ) {
        let state = fixtures::elliptical_orbit(perihelion_au, eccentricity);
        let elements = OrbitalElements::from_initial_conditions(state, DVec3::ZERO, &Masses::default());

        prop_assert!((elements.eccentricity - eccentricity).abs() < 1e-6);
        prop_assert!(elements.is_bound());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Energy and angular momentum stay put over a short run near L4.
    #[test]
    fn prop_short_run_conserves_energy(
        size_au in 0.0f64..0.01,
        angle_deg in 0.0f64..360.0,
        speed in 0.98f64..1.02,
    ) {
        let config = fixtures::short_config(0.1, 20_000);
        let perturbation = Perturbation {
            size_au,
            angle_deg: Some(angle_deg),
            speed,
            ..Default::default()
        };
        let trajectories = fixtures::run(&config, &perturbation);
        let report = conservation_calculations(&trajectories).drift(1.0);

        prop_assert!(report.energy < 1e-6, "energy drift {:e}", report.energy);
        prop_assert!(report.angular_momentum < 1e-6, "angular momentum drift {:e}", report.angular_momentum);
    }
}
