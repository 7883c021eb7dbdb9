//! Rotating-frame view of a run.
//!
//! In a frame that turns with the star–planet pair, the Lagrange points
//! stay put and the satellite's tadpole or horseshoe path becomes visible.

use bevy::math::DVec3;
use rayon::prelude::*;
use wide::f64x4;

use crate::config::SimulationConfig;
use crate::types::{Body, BodyId, ThreeBody, Trajectories};
use crate::vector::rotate_z;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("length mismatch: {times} sample times for {positions} positions")]
    LengthMismatch { times: usize, positions: usize },
}

/// `num_steps + 1` evenly spaced sample times starting at 0.
pub fn sample_times(time_step: f64, num_steps: usize) -> Vec<f64> {
    (0..=num_steps).map(|k| k as f64 * time_step).collect()
}

/// Rotate every position by `−ω·t` about the z-axis.
///
/// Output z components are zero. Each index is independent: chunks run in
/// parallel and points within a chunk are rotated two at a time.
///
/// # Errors
/// [`FrameError::LengthMismatch`] when `times` and `positions` differ in
/// length.
pub fn transform_to_corotating(
    times: &[f64],
    angular_speed: f64,
    positions: &[DVec3],
) -> Result<Vec<DVec3>, FrameError> {
    if times.len() != positions.len() {
        return Err(FrameError::LengthMismatch {
            times: times.len(),
            positions: positions.len(),
        });
    }

    let mut out = vec![DVec3::ZERO; positions.len()];
    out.par_chunks_mut(CHUNK_LEN)
        .zip(positions.par_chunks(CHUNK_LEN))
        .zip(times.par_chunks(CHUNK_LEN))
        .for_each(|((out, pos), t)| rotate_chunk(out, pos, t, angular_speed));

    Ok(out)
}

/// Points per parallel work item.
const CHUNK_LEN: usize = 1024;

/// Rotate one chunk, two points per SIMD lane group, odd tail scalar.
fn rotate_chunk(out: &mut [DVec3], pos: &[DVec3], times: &[f64], angular_speed: f64) {
    let mut out_pairs = out.chunks_exact_mut(2);
    let mut pos_pairs = pos.chunks_exact(2);
    let mut time_pairs = times.chunks_exact(2);

    for ((o, p), t) in (&mut out_pairs).zip(&mut pos_pairs).zip(&mut time_pairs) {
        let [a, b] = rotate_pair([p[0], p[1]], [-angular_speed * t[0], -angular_speed * t[1]]);
        o[0] = a;
        o[1] = b;
    }

    let tail = out_pairs.into_remainder();
    for ((o, &p), &t) in tail.iter_mut().zip(pos_pairs.remainder()).zip(time_pairs.remainder()) {
        *o = rotate_z(p, -angular_speed * t);
    }
}

/// Rotate two planar points at once.
#[inline]
fn rotate_pair(p: [DVec3; 2], angle: [f64; 2]) -> [DVec3; 2] {
    let (s0, c0) = angle[0].sin_cos();
    let (s1, c1) = angle[1].sin_cos();

    // [x0, y0, x1, y1] and its quarter turn [-y0, x0, -y1, x1]
    let xy = f64x4::new([p[0].x, p[0].y, p[1].x, p[1].y]);
    let perp = f64x4::new([-p[0].y, p[0].x, -p[1].y, p[1].x]);

    let cos = f64x4::new([c0, c0, c1, c1]);
    let sin = f64x4::new([s0, s0, s1, s1]);

    let r = (xy * cos + perp * sin).to_array();
    [DVec3::new(r[0], r[1], 0.0), DVec3::new(r[2], r[3], 0.0)]
}

impl ThreeBody<Body> {
    /// Positions of every body relative to the barycenter, in the frame
    /// rotating at `angular_speed`.
    ///
    /// Step `k` is taken to be at time `k·time_step`.
    ///
    /// # Errors
    /// [`FrameError::LengthMismatch`] when the bodies were recorded for a
    /// different number of steps.
    pub fn corotating(&self, time_step: f64, angular_speed: f64) -> Result<ThreeBody<Vec<DVec3>>, FrameError> {
        let barycenter = self.barycenter();
        let times = sample_times(time_step, barycenter.len().saturating_sub(1));
        let times = &times[..barycenter.len()];

        let transform = |id: BodyId| {
            let positions = self.positions(id);
            if positions.len() != barycenter.len() {
                return Err(FrameError::LengthMismatch {
                    times: times.len(),
                    positions: positions.len(),
                });
            }
            let relative: Vec<DVec3> = positions
                .par_iter()
                .zip(barycenter.par_iter())
                .map(|(&p, &cm)| p - cm)
                .collect();
            transform_to_corotating(times, angular_speed, &relative)
        };

        Ok(ThreeBody::new(
            transform(BodyId::Star)?,
            transform(BodyId::Planet)?,
            transform(BodyId::Satellite)?,
        ))
    }
}

/// Convenience for [`Trajectories::corotating`] using the run's own time
/// step and the reference angular speed.
pub fn corotating_positions(
    trajectories: &Trajectories,
    config: &SimulationConfig,
) -> Result<ThreeBody<Vec<DVec3>>, FrameError> {
    trajectories.corotating(config.time_step(), config.angular_speed())
}
