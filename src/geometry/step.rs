use super::GeometryFactors;
use crate::linalg::norm;
use ndarray::prelude::*;

/// Displacement that replaces vertex `jdrop` of the interpolation simplex.
///
/// The step runs along the normal of the face opposite the dropped vertex
/// (the `jdrop`-th row of `simi`), scaled to length `gamma * delta`. Its
/// sign is chosen by a linearized merit estimate: the objective and
/// constraint gradients implied by the vertex values are formed through
/// `simi`, the worst-case constraint-violation excursions at `+d` and `-d`
/// are compared, and the direction that best trades objective change
/// against penalized violation wins. Constraint values follow the
/// `c >= 0` feasibility convention.
///
/// # Arguments
/// * `jdrop` - vertex being replaced (0-based, `< N`)
/// * `cpen` - penalty weight on constraint violation (`>= 0`)
/// * `conmat` - constraint values at each vertex (M×(N+1), best last)
/// * `cval` - aggregate constraint violation per vertex (N+1, `>= 0`)
/// * `delta` - trust-region radius
/// * `factors` - geometry constants; only `gamma` is used here
/// * `fval` - objective values at each vertex (N+1, best last)
/// * `simi` - inverse of the simplex edge matrix (N×N)
///
/// The returned step satisfies
/// `0.9 * gamma * delta < ‖d‖ <= 1.1 * gamma * delta`; that bound is a
/// debug-build check on the caller's bookkeeping, never a renormalization.
pub fn simplex_geometry_step(
    jdrop: usize,
    cpen: f64,
    conmat: &Array2<f64>,
    cval: &Array1<f64>,
    delta: f64,
    factors: &GeometryFactors,
    fval: &Array1<f64>,
    simi: &Array2<f64>,
) -> Array1<f64> {
    let n = simi.nrows();
    let m = conmat.nrows();
    debug_assert!(jdrop < n);
    debug_assert!(cpen >= 0.0);
    debug_assert!(delta > 0.0 && delta.is_finite());
    debug_assert!(factors.gamma > 0.0 && factors.gamma < 1.0);
    debug_assert_eq!(simi.ncols(), n);
    debug_assert_eq!(conmat.ncols(), n + 1);
    debug_assert_eq!(cval.len(), n + 1);
    debug_assert_eq!(fval.len(), n + 1);
    debug_assert!(cval.iter().all(|&c| c >= 0.0 && c.is_finite()));
    debug_assert!(fval.iter().all(|&f| f.is_finite()));
    debug_assert!(conmat.iter().all(|&c| c.is_finite()));

    // Unit normal of the face opposite the dropped vertex, scaled to the
    // target insertion length.
    let row = simi.row(jdrop).to_owned();
    let vsigj = 1.0 / norm(&row);
    let mut d = row.mapv(|x| factors.gamma * delta * vsigj * x);

    // Linearized gradients of the M constraints and the objective, formed
    // column by column from the vertex values relative to the best vertex.
    let mut congrad = Array2::<f64>::zeros((n, m));
    for k in 0..m {
        let mut diff = Array1::<f64>::zeros(n);
        for j in 0..n {
            diff[j] = conmat[[k, j]] - conmat[[k, n]];
        }
        congrad.column_mut(k).assign(&simi.t().dot(&diff));
    }
    let mut fdiff = Array1::<f64>::zeros(n);
    for j in 0..n {
        fdiff[j] = fval[j] - fval[n];
    }
    let fgrad = simi.t().dot(&fdiff);

    // Worst-case linearized violation at +d and at -d.
    let mut cvmaxp = 0.0_f64;
    let mut cvmaxn = 0.0_f64;
    for k in 0..m {
        let slope = congrad.column(k).dot(&d);
        cvmaxp = cvmaxp.max(-slope - conmat[[k, n]]);
        cvmaxn = cvmaxn.max(slope - conmat[[k, n]]);
    }

    if 2.0 * fgrad.dot(&d) < cpen * (cvmaxp - cvmaxn) {
        d.mapv_inplace(|x| -x);
    }

    let len = norm(&d);
    debug_assert!(
        !len.is_finite() || (len > 0.9 * factors.gamma * delta && len <= 1.1 * factors.gamma * delta)
    );
    d
}
