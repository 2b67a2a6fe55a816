use crate::linalg::{argmax_filtered, inprod, is_symmetric, norm, zero_nans};
use ndarray::prelude::*;
use std::f64::consts::FRAC_1_SQRT_2;

/// Result of the quadratic-model geometry step.
#[derive(Debug, Clone)]
pub struct QuadStepResult {
    pub d: Array1<f64>,
    pub vmax: f64,
}

/// Which closed-form branch produced the curvature-subspace direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubspaceBranch {
    /// `v` and `Hv` were nearly parallel; the direction is `Hv` itself.
    Parallel,
    /// The direction was assembled from the orthogonalized pair.
    Deflected,
}

/// Which closed-form branch chose the plane rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationBranch {
    /// The cross term was already negligible; no rotation applied.
    Identity,
    Rotated,
}

/// Which combination of the orthonormal basis vectors won the final search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateBranch {
    FirstAxis,
    SecondAxis,
    Diagonal,
}

/// Step approximately maximizing `|Q(0) - Q(d)|` over `‖d‖ <= delbar` for
/// the quadratic model `Q(x) = g'x + x'Hx/2`.
///
/// Searches a two-dimensional subspace built from the dominant column of
/// `H` instead of solving the exact trust-region subproblem, so the cost is
/// O(N²). The returned `vmax` estimates the achieved model-value change and
/// is always finite and non-negative.
///
/// # Arguments
/// * `g` - model gradient (length N)
/// * `h` - model Hessian (N×N, supplied symmetric)
/// * `delbar` - trust-region radius (positive)
///
/// Non-finite entries in `g` or `h` short-circuit to a Cauchy-like
/// fallback (the gradient scaled to the boundary, reversed under negative
/// curvature) with `vmax = 0`. Intermediate NaN components are zeroed, and
/// a direction that collapses to zero is replaced by the same fallback.
pub fn geometry_step(g: &Array1<f64>, h: &Array2<f64>, delbar: f64) -> QuadStepResult {
    let n = g.len();
    debug_assert!(delbar > 0.0 && delbar.is_finite());
    debug_assert_eq!(h.nrows(), n);
    debug_assert_eq!(h.ncols(), n);

    if n == 0 {
        return QuadStepResult {
            d: Array1::zeros(0),
            vmax: 0.0,
        };
    }

    // Cauchy-like fallback direction.
    let gnorm = norm(g);
    let mut dcauchy = g * (delbar / gnorm);
    zero_nans(&mut dcauchy);
    let ghg = inprod(g, &h.dot(g));
    if ghg < 0.0 {
        dcauchy.mapv_inplace(|x| -x);
    }

    let finite = g.iter().all(|x| x.is_finite()) && h.iter().all(|x| x.is_finite());
    let hmax = h.iter().fold(0.0_f64, |a, &b| a.max(b.abs()));
    debug_assert!(!finite || is_symmetric(h, 1e-10 * (1.0 + hmax)));
    if !finite {
        return QuadStepResult {
            d: dcauchy,
            vmax: 0.0,
        };
    }

    // The column of H with the largest squared sum approximates the
    // direction v maximizing ‖Hv‖/‖v‖.
    let colsq = Array1::from_shape_fn(n, |j| {
        let c = h.column(j);
        c.dot(&c)
    });
    let k = argmax_filtered(&colsq).unwrap_or(0);
    let v = h.column(k).to_owned();

    let (mut d, _) = subspace_direction(h, &v);
    zero_nans(&mut d);
    if inprod(&d, &d) <= 0.0 {
        // H contributed nothing (e.g. a zero Hessian); continue along the
        // gradient so the result degrades to the Cauchy step.
        d = dcauchy.clone();
    }

    // Move to the subspace spanned by g and d.
    let gg = gnorm * gnorm;
    let gd = inprod(g, &d);
    let dd = inprod(&d, &d);
    let dhd = inprod(&d, &h.dot(&d));

    let vperp = &d - &(g * (gd / gg));
    let vv = inprod(&vperp, &vperp);
    let scale = (delbar / dd.sqrt()).copysign(gd * dhd);

    // A multiple of d suffices unless the gradient term is significant and
    // d keeps a meaningful component orthogonal to g.
    if !(gnorm * dd > 5.0e-3 * delbar * dhd.abs() && vv > 1.0e-4 * dd) {
        let mut d = &d * scale;
        zero_nans(&mut d);
        if inprod(&d, &d) <= 0.0 {
            d = dcauchy;
        }
        let vmax = (scale * (gd + 0.5 * scale * dhd)).abs().max(0.0);
        return QuadStepResult { d, vmax };
    }

    // g and vperp are orthogonal; rotate them into an orthonormal basis
    // {dhat, vhat} in which the cross curvature term vanishes (or nearly).
    let hg = h.dot(g);
    let hv = h.dot(&vperp);
    let vnorm = vv.sqrt();
    let ghg = inprod(g, &hg) / gg;
    let vhg = inprod(&vperp, &hg) / (vnorm * gnorm);
    let vhv = inprod(&vperp, &hv) / vv;
    let (wcos, wsin, vmu, _) = plane_rotation(ghg, vhg, vhv);

    let dhat = &(g * (wcos / gnorm)) + &(&vperp * (wsin / vnorm));
    let vhat = &(&vperp * (wcos / vnorm)) - &(g * (wsin / gnorm));
    let dlin = wcos * gnorm / delbar;
    let vlin = -wsin * gnorm / delbar;

    let (cd, cv, tmax, _) = select_candidate(dlin, vlin, ghg, vhv, vmu, delbar);
    let mut d = &(&dhat * cd) + &(&vhat * cv);
    zero_nans(&mut d);
    if inprod(&d, &d) <= 0.0 {
        d = dcauchy;
    }
    let vmax = (delbar * delbar * tmax).abs().max(0.0);
    QuadStepResult { d, vmax }
}

/// Direction in span{v, Hv} maximizing `|d'Hd|/(d'd)`.
///
/// When `v` and `Hv` are nearly parallel the answer is `Hv` itself;
/// otherwise the pair is orthogonalized and recombined with the
/// closed-form coefficients of the extreme root.
fn subspace_direction(h: &Array2<f64>, v: &Array1<f64>) -> (Array1<f64>, SubspaceBranch) {
    let vv = inprod(v, v);
    let hv = h.dot(v);
    let vhv = inprod(v, &hv);

    if vhv * vhv > 0.9999 * inprod(&hv, &hv) * vv {
        return (hv, SubspaceBranch::Parallel);
    }

    let w = &hv - &(v * (vhv / vv));
    let wsq = inprod(&w, &w);
    let whw = inprod(&w, &h.dot(&w));

    // Rescale v to the length of w so the 2x2 quadratic form has a common
    // normalization; then v'Hw reduces to ratio * w'w.
    let ratio = (wsq / vv).sqrt();
    let vhv_scaled = ratio * ratio * vhv;
    let vhw = ratio * wsq;
    let (cv, cw) = plane_extreme_coeffs(vhv_scaled, vhw, whw);

    let d = &(&(v * ratio) * cv) + &(&w * cw);
    (d, SubspaceBranch::Deflected)
}

/// Coefficients combining an equal-norm orthogonal pair (quadratic form
/// entries `vhv`, `vhw`, `whw`) into the direction of extreme Rayleigh
/// quotient. The larger-magnitude root of the characteristic quadratic is
/// taken, selected by the sign of `whw + vhv`.
fn plane_extreme_coeffs(vhv: f64, vhw: f64, whw: f64) -> (f64, f64) {
    let half_gap = 0.5 * (whw - vhv);
    let root = (half_gap * half_gap + vhw * vhw).sqrt();
    (vhw, half_gap + root.copysign(whw + vhv))
}

/// Rotation (cos, sin) of the orthonormal pair chosen to null the cross
/// curvature term, plus the shifted eigenvalue `mu` it exposes. When the
/// cross term is already negligible the identity rotation is kept.
fn plane_rotation(ghg: f64, vhg: f64, vhv: f64) -> (f64, f64, f64, RotationBranch) {
    if vhg.abs() <= 0.01 * ghg.abs().max(vhv.abs()) {
        return (1.0, 0.0, ghg - vhv, RotationBranch::Identity);
    }
    let half_gap = 0.5 * (ghg - vhv);
    let mu = half_gap + (half_gap * half_gap + vhg * vhg).sqrt().copysign(half_gap);
    let scale = (mu * mu + vhg * vhg).sqrt();
    (mu / scale, vhg / scale, mu, RotationBranch::Rotated)
}

/// Pick the best of the four candidate combinations of the orthonormal
/// basis (each axis alone, or the two diagonals), returning the basis
/// coefficients, the winning magnitude estimate, and the branch taken.
/// Ties resolve toward the first axis.
fn select_candidate(
    dlin: f64,
    vlin: f64,
    ghg: f64,
    vhv: f64,
    mu: f64,
    delbar: f64,
) -> (f64, f64, f64, CandidateBranch) {
    let est_d = dlin.abs() + 0.5 * (mu + vhv).abs();
    let est_v = vlin.abs() + 0.5 * (ghg - mu).abs();
    let est_diag = FRAC_1_SQRT_2 * (dlin.abs() + vlin.abs()) + 0.25 * (ghg + vhv).abs();

    if est_d >= est_v && est_d >= est_diag {
        let cd = delbar.copysign(dlin * (mu + vhv));
        (cd, 0.0, est_d, CandidateBranch::FirstAxis)
    } else if est_v >= est_diag {
        let cv = delbar.copysign(vlin * (ghg - mu));
        (0.0, cv, est_v, CandidateBranch::SecondAxis)
    } else {
        let c = FRAC_1_SQRT_2 * delbar;
        let cd = c.copysign(dlin * (ghg + vhv));
        let cv = c.copysign(vlin * (ghg + vhv));
        (cd, cv, est_diag, CandidateBranch::Diagonal)
    }
}
