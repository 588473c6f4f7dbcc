//! Error taxonomy for values on the Riemann sphere.

use thiserror::Error;

/// Raised when an `ExtendedComplex` is built from inconsistent parts.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConstructionError {
    #[error("a finite value cannot have an undefined component ({re}, {im})")]
    UndefinedComponent { re: f64, im: f64 },

    #[error("an infinite value must have undefined components, got ({re}, {im})")]
    DefinedInfinite { re: f64, im: f64 },
}

/// An operation that has no value on the extended complex plane.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("0 x oo is not defined")]
    ZeroTimesInfinity,

    #[error("division by zero")]
    DivisionByZero,

    #[error("the logarithm of 0 is not defined")]
    LogarithmOfZero,

    #[error("0 has no argument")]
    ArgumentOfZero,

    #[error("oo has no argument")]
    ArgumentOfInfinity,

    #[error("z ** alpha is not defined for z == 0")]
    ZeroToPower,

    #[error("oo ** 0 is not defined")]
    InfinityToZero,

    /// Reported by a sampled function for a point where it has no value.
    #[error("{0}")]
    Undefined(String),
}

/// Invalid sampling geometry.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GridError {
    #[error("resolution must be positive")]
    ZeroResolution,

    #[error("rectangle corners must be finite, got {0}")]
    InfiniteCorner(String),

    #[error("lower-left corner {lower_left} is not below and left of {upper_right}")]
    InvertedCorners {
        lower_left: String,
        upper_right: String,
    },

    #[error("no grid point at resolution {resolution} lies inside the rectangle")]
    EmptyGrid { resolution: u32 },

    #[error("cache key for ({x}, {y}) does not fit in 64 bits")]
    KeyOverflow { x: String, y: String },
}
