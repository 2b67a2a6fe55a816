//! dfokit prelude.
//!
//! This module contains the most used types, functions, and errors that you
//! can import easily as a group.
//!
//! ```
//! use dfokit::prelude::*;
//!
//! ```

#[doc(no_inline)]
pub use crate::error::GeometryError;

#[doc(no_inline)]
pub use crate::geometry::{
    assess_geometry, check_inverse_pair, check_radius, drop_after_trust_step, drop_for_geometry,
    geometry_step, simplex_geometry_step, GeometryFactors, QuadStepResult,
};
