use super::{edge_lengths, face_distances, GeometryFactors};
use crate::linalg::{argmax_filtered, argmin_filtered, norm};
use ndarray::prelude::*;

/// Select the vertex to discard after a trust-region step `d` has been
/// evaluated.
///
/// `ximproved` says whether `d` improved the merit function, in which case
/// the new point must enter the interpolation set and the result is always
/// `Some(_)` (for finite inputs). `None` means the set should be left
/// intact, which is only possible when the step failed to improve.
///
/// The selection runs in three stages: a pivot pass on the barycentric
/// coordinates `simi * d`, a threshold pass replacing far-away vertices
/// whose pivots are still acceptable, and a final combined
/// distance-times-pivot scoring pass that also rates the option of keeping
/// the set intact. The final pass wins whenever it finds a positively
/// scored vertex; NaN entries never qualify as candidates and ties break
/// to the lowest index.
pub fn drop_after_trust_step(
    ximproved: bool,
    d: &Array1<f64>,
    delta: f64,
    factors: &GeometryFactors,
    sim: &Array2<f64>,
    simi: &Array2<f64>,
) -> Option<usize> {
    let n = simi.nrows();
    debug_assert!(delta > 0.0 && delta.is_finite());
    debug_assert_eq!(d.len(), n);
    debug_assert_eq!(sim.nrows(), n);
    debug_assert_eq!(sim.ncols(), n + 1);
    debug_assert!(factors.alpha < 1.0 && factors.delta > 1.0);

    // Barycentric-like coordinates of d in the simplex basis. A coordinate
    // beyond 1 in magnitude means replacing that vertex conforms best.
    let simid = simi.dot(d);
    let abs_simid = simid.mapv(f64::abs);

    let mut jdrop: Option<usize> = None;
    if ximproved || abs_simid.iter().any(|&v| v > 1.0) {
        jdrop = argmax_filtered(&abs_simid);
    }

    // Distance from each vertex to the incoming point (or to the best
    // vertex when the step failed), built column by column.
    let veta = if ximproved {
        Array1::from_shape_fn(n, |j| {
            let mut acc = 0.0;
            for i in 0..n {
                let diff = sim[[i, j]] - d[i];
                acc += diff * diff;
            }
            acc.sqrt()
        })
    } else {
        edge_lengths(sim)
    };
    let vsig = face_distances(simi);

    // Replace a far-away vertex provided its normalized pivot stays
    // acceptable.
    let sigbar = Array1::from_shape_fn(n, |j| abs_simid[j] * vsig[j]);
    let mut far_best: Option<(usize, f64)> = None;
    for j in 0..n {
        let far = veta[j] > factors.delta * delta;
        let pivot_ok = sigbar[j] >= factors.alpha * delta || sigbar[j] >= vsig[j];
        if far && pivot_ok && !veta[j].is_nan() {
            match far_best {
                Some((_, best)) if veta[j] <= best => {}
                _ => far_best = Some((j, veta[j])),
            }
        }
    }
    if let Some((j, _)) = far_best {
        jdrop = Some(j);
    }

    // An accepted point must displace something even if every pivot was NaN.
    if ximproved && jdrop.is_none() {
        jdrop = argmax_filtered(&veta);
    }

    // Final scoring pass: distance times pivot for each vertex, against a
    // virtual slot rating the no-op choice. A winning no-op slot leaves the
    // earlier selection standing, which keeps the postcondition above.
    if veta.iter().any(|&v| v > 0.0) {
        let score = Array1::from_shape_fn(n, |j| veta[j] * abs_simid[j]);
        let keep_score = if ximproved {
            norm(d) * (1.0 - simid.sum()).abs()
        } else {
            0.0
        };
        if let Some(j) = argmax_filtered(&score) {
            if score[j] > 0.0 && score[j] >= keep_score {
                jdrop = Some(j);
            }
        }
    }

    jdrop
}

/// Select the vertex to discard for a pure geometry-improvement step.
///
/// The longest edge is discarded when any edge exceeds `beta * delta`;
/// otherwise the vertex closest to its opposite face is discarded when any
/// face distance falls below `alpha * delta`. `None` signals a
/// degenerate or NaN-poisoned simplex, which the caller must treat as
/// fatal bookkeeping corruption; it cannot occur when this selector is
/// invoked on a simplex that genuinely failed the adequacy check.
pub fn drop_for_geometry(
    delta: f64,
    factors: &GeometryFactors,
    sim: &Array2<f64>,
    simi: &Array2<f64>,
) -> Option<usize> {
    let n = simi.nrows();
    debug_assert!(delta > 0.0 && delta.is_finite());
    debug_assert_eq!(sim.nrows(), n);
    debug_assert_eq!(sim.ncols(), n + 1);
    debug_assert!(factors.alpha < 1.0 && factors.beta > 1.0);

    let veta = edge_lengths(sim);
    if veta.iter().any(|&e| e > factors.beta * delta) {
        return argmax_filtered(&veta);
    }

    let vsig = face_distances(simi);
    if vsig.iter().any(|&s| s < factors.alpha * delta) {
        return argmin_filtered(&vsig);
    }

    None
}

#[cfg(test)]
mod geometry_drop_tests {
    use super::*;

    fn identity_pair() -> (Array2<f64>, Array2<f64>) {
        let sim = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let simi = array![[1.0, 0.0], [0.0, 1.0]];
        (sim, simi)
    }

    #[test]
    fn test_geometry_drop_prefers_long_edge() {
        let (sim, simi) = identity_pair();
        let factors = GeometryFactors::new(0.25, 1.5, 1.1, 0.5).unwrap();
        // Both edges have length 1 > beta * delta = 0.75: tie breaks low.
        assert_eq!(drop_for_geometry(0.5, &factors, &sim, &simi), Some(0));
    }

    #[test]
    fn test_geometry_drop_picks_thin_face() {
        let sim = array![[1.0, 0.0, 0.0], [0.0, 0.01, 0.0]];
        let simi = array![[1.0, 0.0], [0.0, 100.0]];
        let factors = GeometryFactors::default();
        // Edges are within beta, but vertex 1 sits 0.01 from its face.
        assert_eq!(drop_for_geometry(1.0, &factors, &sim, &simi), Some(1));
    }

    #[test]
    fn test_geometry_drop_none_when_within_thresholds() {
        let (sim, simi) = identity_pair();
        let factors = GeometryFactors::default();
        assert_eq!(drop_for_geometry(1.0, &factors, &sim, &simi), None);
    }

    #[test]
    fn test_trust_drop_improved_always_selects() {
        let (sim, simi) = identity_pair();
        let factors = GeometryFactors::default();

        let d = array![2.0, 0.0];
        let jdrop = drop_after_trust_step(true, &d, 1.0, &factors, &sim, &simi);
        assert_eq!(jdrop, Some(0));

        // Even a tiny accepted step displaces a vertex.
        let d = array![1e-8, 0.0];
        let jdrop = drop_after_trust_step(true, &d, 1.0, &factors, &sim, &simi);
        assert!(jdrop.is_some());
    }

    #[test]
    fn test_trust_drop_large_pivot_without_improvement() {
        let (sim, simi) = identity_pair();
        let factors = GeometryFactors::default();

        // |simid| = [2, 0]: coordinate beyond 1 forces a candidate even
        // though the merit function did not improve.
        let d = array![2.0, 0.0];
        let jdrop = drop_after_trust_step(false, &d, 1.0, &factors, &sim, &simi);
        assert_eq!(jdrop, Some(0));
    }

    #[test]
    fn test_trust_drop_far_vertex_override() {
        // Vertex 1 is far from the new point and keeps a healthy pivot, so
        // the threshold pass overrides the pivot argmax (vertex 0).
        let sim = array![[1.0, -3.0, 0.0], [0.0, 0.5, 0.0]];
        let simi = array![[1.0, 6.0], [0.0, 2.0]];
        let factors = GeometryFactors::default();

        let d = array![1.5, 0.5];
        // simid = [4.5, 1.0]; veta(improved) = [sqrt(0.25)+..., far for 1].
        let jdrop = drop_after_trust_step(true, &d, 1.0, &factors, &sim, &simi);
        assert_eq!(jdrop, Some(1));
    }

    #[test]
    fn test_trust_drop_nan_pivots_fall_back_to_distance() {
        // A corrupted inverse makes every pivot NaN; the improved step must
        // still displace a vertex, so the farthest one goes.
        let sim = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let simi = array![
            [f64::NAN, f64::NAN],
            [f64::NAN, f64::NAN]
        ];
        let factors = GeometryFactors::default();

        let d = array![0.5, 0.0];
        let jdrop = drop_after_trust_step(true, &d, 1.0, &factors, &sim, &simi);
        assert_eq!(jdrop, Some(1));
    }

    #[test]
    fn test_trust_drop_unimproved_small_step_keeps_set() {
        let (sim, simi) = identity_pair();
        let factors = GeometryFactors::default();

        // Orthogonal-to-nothing zero step: no pivot exceeds 1, nothing is
        // far, and every combined score is 0.
        let d = array![0.0, 0.0];
        let jdrop = drop_after_trust_step(false, &d, 1.0, &factors, &sim, &simi);
        assert_eq!(jdrop, None);
    }
}
