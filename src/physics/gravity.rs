//! Gravity calculation for the star–planet–satellite system.
//!
//! The satellite is a test particle: it is pulled by star and planet but
//! exerts no pull of its own. Star and planet attract each other.

use bevy::math::DVec3;

use crate::types::{BodyId, G, Masses, ThreeBody};
use crate::vector::inverse_cube;

/// Two bodies whose separation made the acceleration undefined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Singularity {
    pub first: BodyId,
    pub second: BodyId,
}

/// Compute the acceleration of every body at the given positions.
///
/// With `r_sp = planet − star`, `r_ss = sat − star`, `r_ps = sat − planet`:
///
/// * star: `+G·m_planet·r_sp/|r_sp|³`
/// * planet: `−G·m_star·r_sp/|r_sp|³`
/// * satellite: `−G·m_star·r_ss/|r_ss|³ − G·m_planet·r_ps/|r_ps|³`
///
/// The star's term has no minus sign because `r_sp` already points from
/// the star toward the planet. The satellite mass is ignored.
///
/// # Errors
/// Returns the offending pair when two bodies coincide or a separation is
/// not finite, and when any resulting component is not finite.
#[inline]
pub fn calc_acceleration(masses: &Masses, positions: &ThreeBody<DVec3>) -> Result<ThreeBody<DVec3>, Singularity> {
    let r_star_to_planet = positions.planet - positions.star;
    let r_star_to_sat = positions.satellite - positions.star;
    let r_planet_to_sat = positions.satellite - positions.planet;

    check_separation(r_star_to_planet, BodyId::Star, BodyId::Planet)?;
    check_separation(r_star_to_sat, BodyId::Star, BodyId::Satellite)?;
    check_separation(r_planet_to_sat, BodyId::Planet, BodyId::Satellite)?;

    let star_planet = inverse_cube(r_star_to_planet);
    let star_sat = inverse_cube(r_star_to_sat);
    let planet_sat = inverse_cube(r_planet_to_sat);

    let accel = ThreeBody::new(
        G * masses.planet * star_planet,
        -G * masses.star * star_planet,
        -G * masses.star * star_sat - G * masses.planet * planet_sat,
    );

    if !accel.star.is_finite() || !accel.planet.is_finite() {
        return Err(Singularity {
            first: BodyId::Star,
            second: BodyId::Planet,
        });
    }
    if !accel.satellite.is_finite() {
        // Blame whichever body the satellite is closer to
        let second = if r_star_to_sat.length_squared() <= r_planet_to_sat.length_squared() {
            BodyId::Star
        } else {
            BodyId::Planet
        };
        return Err(Singularity {
            first: second,
            second: BodyId::Satellite,
        });
    }

    Ok(accel)
}

#[inline]
fn check_separation(r: DVec3, first: BodyId, second: BodyId) -> Result<(), Singularity> {
    let d2 = r.length_squared();
    if d2 > 0.0 && d2.is_finite() {
        Ok(())
    } else {
        Err(Singularity { first, second })
    }
}
