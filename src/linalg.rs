//! Dense linear-algebra primitives shared by the geometry kernels.
//!
//! Everything here operates on small dense `ndarray` vectors and matrices.
//! The argmax/argmin helpers treat NaN entries as invalid candidates and
//! break ties toward the lowest index, so every selection made from them
//! is deterministic.

use ndarray::prelude::*;

/// Inner product of two vectors of equal length.
pub fn inprod(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.dot(b)
}

/// Euclidean norm.
pub fn norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

/// Whether `h` is square and symmetric to within `tol` (absolute, per entry).
pub fn is_symmetric(h: &Array2<f64>, tol: f64) -> bool {
    let n = h.nrows();
    if h.ncols() != n {
        return false;
    }
    for i in 0..n {
        for j in 0..i {
            let diff = h[[i, j]] - h[[j, i]];
            if !(diff.abs() <= tol) {
                return false;
            }
        }
    }
    true
}

/// Whether `b` is the inverse of `a` to within `tol`, judged by the largest
/// entry of `a·b − I`. Non-square or mismatched shapes fail outright.
pub fn is_inverse_pair(a: &Array2<f64>, b: &Array2<f64>, tol: f64) -> bool {
    let n = a.nrows();
    if a.ncols() != n || b.nrows() != n || b.ncols() != n {
        return false;
    }
    let prod = a.dot(b);
    for i in 0..n {
        for j in 0..n {
            let target = if i == j { 1.0 } else { 0.0 };
            let diff = prod[[i, j]] - target;
            if !(diff.abs() <= tol) {
                return false;
            }
        }
    }
    true
}

/// Replace every NaN component of `v` with zero, in place.
pub fn zero_nans(v: &mut Array1<f64>) {
    for x in v.iter_mut() {
        if x.is_nan() {
            *x = 0.0;
        }
    }
}

/// Index of the largest non-NaN entry; `None` when every entry is NaN or
/// the vector is empty. Ties go to the lowest index.
pub fn argmax_filtered(v: &Array1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &x) in v.iter().enumerate() {
        if x.is_nan() {
            continue;
        }
        match best {
            Some((_, bx)) if x <= bx => {}
            _ => best = Some((i, x)),
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the smallest non-NaN entry; `None` when every entry is NaN or
/// the vector is empty. Ties go to the lowest index.
pub fn argmin_filtered(v: &Array1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &x) in v.iter().enumerate() {
        if x.is_nan() {
            continue;
        }
        match best {
            Some((_, bx)) if x >= bx => {}
            _ => best = Some((i, x)),
        }
    }
    best.map(|(i, _)| i)
}
