//! Geometry-control kernels for derivative-free trust-region optimization.
//!
//! `dfokit` provides the simplex bookkeeping decisions a model-based
//! derivative-free solver needs between function evaluations: judging
//! whether the interpolation set is still well poised, choosing which
//! vertex to replace, and computing the replacement displacement, either
//! along the face normal of the dropped vertex or by maximizing a
//! quadratic Lagrange model inside the trust region. All kernels are pure
//! functions over `ndarray` views; the solver loop owns the state.
//!
//! ```
//! use dfokit::prelude::*;
//! use ndarray::array;
//!
//! let sim = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
//! let simi = array![[1.0, 0.0], [0.0, 1.0]];
//! let factors = GeometryFactors::default();
//!
//! assert!(assess_geometry(1.0, &factors, &sim, &simi));
//! ```

pub mod error;
pub mod geometry;
pub mod linalg;
pub mod prelude;
