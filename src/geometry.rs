//! Geometry-control kernels for simplex-based trust-region optimization.
//!
//! A derivative-free trust-region driver keeps an interpolation set of N+1
//! points: one "best" vertex plus N others, stored as the edge matrix `sim`
//! (N×(N+1), first N columns are edges from the best vertex) together with
//! `simi`, the inverse of `sim[:, 0..N]`. The kernels in this module decide
//! when that set has become too thin or too stretched to support an accurate
//! local model, which vertex to discard, and what displacement to evaluate
//! next. The driver owns all of the state; every kernel here is a pure
//! function over borrowed inputs.

use crate::error::GeometryError;
use crate::linalg::is_inverse_pair;
use ndarray::prelude::*;

pub mod adequacy;
pub mod drop;
pub mod quadratic;
pub mod step;

pub use self::adequacy::assess_geometry;
pub use self::drop::{drop_after_trust_step, drop_for_geometry};
pub use self::quadratic::{geometry_step, QuadStepResult};
pub use self::step::simplex_geometry_step;

/// Shape-control constants for the interpolation simplex.
///
/// `alpha` bounds how thin a simplex may become (minimum vertex-to-face
/// distance, relative to the trust radius) and `beta` how stretched
/// (maximum edge length). `delta` is the distance multiple beyond which a
/// replaced vertex is considered far from the new point, and `gamma` sets
/// the length of a freshly inserted geometry step as a fraction of the
/// radius. The orderings `0 < alpha < 1 < beta` and `delta > 1`,
/// `0 < gamma < 1` are validated at construction; the kernels only
/// `debug_assert` them afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryFactors {
    pub alpha: f64,
    pub beta: f64,
    pub delta: f64,
    pub gamma: f64,
}

impl Default for GeometryFactors {
    fn default() -> Self {
        GeometryFactors {
            alpha: 0.25,
            beta: 2.1,
            delta: 1.1,
            gamma: 0.5,
        }
    }
}

impl GeometryFactors {
    pub fn new(alpha: f64, beta: f64, delta: f64, gamma: f64) -> Result<Self, GeometryError> {
        if !(alpha.is_finite() && beta.is_finite() && delta.is_finite() && gamma.is_finite()) {
            return Err(GeometryError::InvalidFactors(
                "factors must be finite".to_string(),
            ));
        }
        if !(0.0 < alpha && alpha < 1.0) {
            return Err(GeometryError::InvalidFactors(format!(
                "alpha must lie in (0, 1), got {}",
                alpha
            )));
        }
        if !(beta > 1.0) {
            return Err(GeometryError::InvalidFactors(format!(
                "beta must exceed 1, got {}",
                beta
            )));
        }
        if !(delta > 1.0) {
            return Err(GeometryError::InvalidFactors(format!(
                "delta must exceed 1, got {}",
                delta
            )));
        }
        if !(0.0 < gamma && gamma < 1.0) {
            return Err(GeometryError::InvalidFactors(format!(
                "gamma must lie in (0, 1), got {}",
                gamma
            )));
        }
        Ok(GeometryFactors {
            alpha,
            beta,
            delta,
            gamma,
        })
    }
}

/// Release-build validation of a trust-region radius. The kernels only
/// `debug_assert` this contract; drivers can call it once per iteration.
pub fn check_radius(delta: f64) -> Result<(), GeometryError> {
    if delta > 0.0 && delta.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::InvalidRadius)
    }
}

/// Verify that `simi` inverts the square part of `sim` to within `tol`.
///
/// Drivers maintain `simi` incrementally and should re-check it after a
/// vertex replacement; the kernels themselves only run this check in debug
/// builds.
pub fn check_inverse_pair(
    sim: &Array2<f64>,
    simi: &Array2<f64>,
    tol: f64,
) -> Result<(), GeometryError> {
    let n = simi.nrows();
    if sim.nrows() != n || sim.ncols() != n + 1 || simi.ncols() != n {
        return Err(GeometryError::DimensionMismatch(format!(
            "sim is {}x{}, simi is {}x{}",
            sim.nrows(),
            sim.ncols(),
            simi.nrows(),
            simi.ncols()
        )));
    }
    let edges = sim.slice(s![.., ..n]).to_owned();
    if !is_inverse_pair(simi, &edges, tol) {
        return Err(GeometryError::InconsistentInverse(format!(
            "simi * sim[:, 0..{}] deviates from identity by more than {}",
            n, tol
        )));
    }
    Ok(())
}

/// Distance from each vertex to the face of the simplex opposite it:
/// `vsig[j] = 1/‖simi[j, :]‖`. A row of zeros yields +inf, NaN poisoning
/// propagates.
pub(crate) fn face_distances(simi: &Array2<f64>) -> Array1<f64> {
    let n = simi.nrows();
    Array1::from_shape_fn(n, |j| {
        let row = simi.row(j);
        1.0 / row.dot(&row).sqrt()
    })
}

/// Length of each edge from the best vertex: `veta[j] = ‖sim[:, j]‖` over
/// the first N columns.
pub(crate) fn edge_lengths(sim: &Array2<f64>) -> Array1<f64> {
    let n = sim.nrows();
    Array1::from_shape_fn(n, |j| {
        let col = sim.column(j);
        col.dot(&col).sqrt()
    })
}
