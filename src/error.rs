use std::fmt;

/// Error types for the geometry kernels.
///
/// These surface only from configuration and bookkeeping helpers; the
/// kernels themselves recover from numerical degeneracy silently and never
/// return errors.
#[derive(Debug, PartialEq)]
pub enum GeometryError {
    InvalidFactors(String),
    InvalidRadius,
    DimensionMismatch(String),
    InconsistentInverse(String),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GeometryError::InvalidFactors(msg) => {
                write!(f, "Invalid geometry factors: {}", msg)
            }
            GeometryError::InvalidRadius => {
                write!(f, "Trust-region radius must be positive and finite")
            }
            GeometryError::DimensionMismatch(msg) => write!(f, "Dimension mismatch: {}", msg),
            GeometryError::InconsistentInverse(msg) => {
                write!(f, "Simplex inverse is inconsistent: {}", msg)
            }
        }
    }
}

impl std::error::Error for GeometryError {}
