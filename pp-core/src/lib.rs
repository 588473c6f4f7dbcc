//! Library code for drawing phase portraits of functions on the Riemann sphere.

pub mod color;
pub mod error;
pub mod function;
pub mod grid;
pub mod image;
pub mod special;
pub mod sphere;

pub use error::{ConstructionError, DomainError, GridError};
pub use function::PortraitFunction;
pub use grid::{CacheKey, Grid, GridCoordinate, Pixel, PixelValueMap};
pub use sphere::ExtendedComplex;

/// A pair of integer (width, height) dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}
