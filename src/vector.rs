//! Small vector helpers shared by the physics and analysis code.
//!
//! `DVec3` already provides difference, norm, dot and cross products; the
//! helpers here cover the planar operations the simulation repeats.

use bevy::math::DVec3;

/// Unit vector in the xy-plane at `angle` radians from the positive x-axis.
#[inline]
pub fn planar_unit(angle: f64) -> DVec3 {
    let (sin, cos) = angle.sin_cos();
    DVec3::new(cos, sin, 0.0)
}

/// Rotate `v` by `angle` radians about the z-axis and drop its z-component.
#[inline]
pub fn rotate_z(v: DVec3, angle: f64) -> DVec3 {
    let (sin, cos) = angle.sin_cos();
    DVec3::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y, 0.0)
}

/// Polar angle of `v` in the xy-plane, in radians.
#[inline]
pub fn polar_angle(v: DVec3) -> f64 {
    v.y.atan2(v.x)
}

/// Mass-weighted mean of `(position, mass)` pairs.
///
/// Returns `DVec3::ZERO` when the total mass is not positive.
pub fn barycenter(points: &[(DVec3, f64)]) -> DVec3 {
    let total: f64 = points.iter().map(|&(_, m)| m).sum();
    if total <= 0.0 {
        return DVec3::ZERO;
    }
    points.iter().fold(DVec3::ZERO, |acc, &(p, m)| acc + p * m) / total
}

/// `v / |v|³`, the common factor of every inverse-square term.
///
/// Not finite when `v` is zero; callers check.
#[inline]
pub fn inverse_cube(v: DVec3) -> DVec3 {
    let d = v.length();
    v / (d * d * d)
}
