use super::{edge_lengths, face_distances, GeometryFactors};
use crate::linalg::is_inverse_pair;
use ndarray::prelude::*;

/// Whether the interpolation simplex is well-poised enough that no
/// geometry-improving step is needed.
///
/// Adequate iff every vertex keeps a distance of at least
/// `alpha * delta` from its opposite face and every edge from the best
/// vertex is no longer than `beta * delta`. A NaN measurement fails both
/// comparisons and reports inadequate. O(N²), pure.
pub fn assess_geometry(
    delta: f64,
    factors: &GeometryFactors,
    sim: &Array2<f64>,
    simi: &Array2<f64>,
) -> bool {
    let n = simi.nrows();
    debug_assert!(delta > 0.0 && delta.is_finite());
    debug_assert!(factors.alpha < 1.0 && factors.beta > 1.0);
    debug_assert_eq!(sim.nrows(), n);
    debug_assert_eq!(sim.ncols(), n + 1);
    debug_assert!(is_inverse_pair(
        simi,
        &sim.slice(s![.., ..n]).to_owned(),
        1e-6 * (n as f64 + 1.0)
    ));

    let vsig = face_distances(simi);
    let veta = edge_lengths(sim);

    vsig.iter().all(|&s| s >= factors.alpha * delta)
        && veta.iter().all(|&e| e <= factors.beta * delta)
}
