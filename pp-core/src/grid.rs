//! Exact sampling grids and the cache keys derived from them.
//!
//! Grid points are kept as `BigRational`s so that the same mathematical point compares equal no
//! matter which resolution produced it; conversion to floating point happens only when a point is
//! handed to the sampled function.

use std::{collections::HashMap, fmt};

use num::{BigInt, BigRational, Integer, ToPrimitive};

use crate::{error::GridError, sphere::ExtendedComplex, Size};

/// Scaled corners this close to a lattice index, relative to their size, are taken to lie on it.
///
/// Decimal corners such as `0.1` are not exact in binary; without snapping, `0.1 * 10` would
/// round up past the first lattice index.
const SNAP_TOLERANCE: f64 = 1e-9;

/// A pixel of the sampled rectangle.
///
/// `x` counts columns from the left edge, `y` counts rows from the *bottom* edge, so that `y`
/// grows with the imaginary part.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel {
    pub x: usize,
    pub y: usize,
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Sampled values by pixel. Points whose evaluation failed have no entry.
pub type PixelValueMap = HashMap<Pixel, ExtendedComplex>;

/// An exact grid point `x + i y`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridCoordinate {
    pub x: BigRational,
    pub y: BigRational,
}

impl GridCoordinate {
    pub fn new(x: BigRational, y: BigRational) -> Self {
        Self { x, y }
    }

    /// The point as a sphere value. Components too large for `f64` become infinity.
    pub fn to_extended(&self) -> ExtendedComplex {
        match (self.x.to_f64(), self.y.to_f64()) {
            (Some(x), Some(y)) => ExtendedComplex::absorb(x, y),
            _ => ExtendedComplex::INFINITY,
        }
    }

    /// Reduces the point to its normalized integer key.
    ///
    /// Both components are scaled by the least common multiple of their (reduced) denominators,
    /// so the key depends only on the point, not on the grid it came from.
    pub fn key(&self) -> Result<CacheKey, GridError> {
        let overflow = || GridError::KeyOverflow {
            x: self.x.to_string(),
            y: self.y.to_string(),
        };
        let multiplier: BigInt = self.x.denom().lcm(self.y.denom());
        let real = self.x.numer() * (&multiplier / self.x.denom());
        let imaginary = self.y.numer() * (&multiplier / self.y.denom());
        Ok(CacheKey {
            multiplier: multiplier.to_i64().ok_or_else(overflow)?,
            real: real.to_i64().ok_or_else(overflow)?,
            imaginary: imaginary.to_i64().ok_or_else(overflow)?,
        })
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} i", self.x, self.y)
    }
}

/// The point `(real + i imaginary) / multiplier`, in lowest terms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub multiplier: i64,
    pub real: i64,
    pub imaginary: i64,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} + {} i) / {}",
            self.real, self.imaginary, self.multiplier
        )
    }
}

/// The lattice of points `k / resolution` inside a rectangle, corners included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    resolution: u32,
    // Inclusive lattice index bounds on each axis.
    x: (i64, i64),
    y: (i64, i64),
}

impl Grid {
    pub fn new(
        lower_left: &ExtendedComplex,
        upper_right: &ExtendedComplex,
        resolution: u32,
    ) -> Result<Self, GridError> {
        if resolution == 0 {
            return Err(GridError::ZeroResolution);
        }
        let (x0, y0) = lower_left
            .finite()
            .ok_or_else(|| GridError::InfiniteCorner(lower_left.to_string()))?;
        let (x1, y1) = upper_right
            .finite()
            .ok_or_else(|| GridError::InfiniteCorner(upper_right.to_string()))?;
        if x0 > x1 || y0 > y1 {
            return Err(GridError::InvertedCorners {
                lower_left: lower_left.to_string(),
                upper_right: upper_right.to_string(),
            });
        }

        let scale = BigRational::from_integer(resolution.into());
        let index = |v: f64, up: bool| -> Result<i64, GridError> {
            let overflow = || GridError::KeyOverflow {
                x: lower_left.to_string(),
                y: upper_right.to_string(),
            };
            let approximate = v * f64::from(resolution);
            let nearest = approximate.round();
            let bound = if (approximate - nearest).abs()
                <= SNAP_TOLERANCE * approximate.abs().max(1.0)
            {
                BigRational::from_float(nearest).ok_or_else(overflow)?
            } else {
                let scaled = BigRational::from_float(v).ok_or_else(overflow)? * &scale;
                if up {
                    scaled.ceil()
                } else {
                    scaled.floor()
                }
            };
            bound.to_integer().to_i64().ok_or_else(overflow)
        };
        let x = (index(x0, true)?, index(x1, false)?);
        let y = (index(y0, true)?, index(y1, false)?);
        if x.0 > x.1 || y.0 > y.1 {
            return Err(GridError::EmptyGrid { resolution });
        }
        Ok(Self { resolution, x, y })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn size(&self) -> Size {
        Size {
            width: (self.x.1 - self.x.0 + 1) as usize,
            height: (self.y.1 - self.y.0 + 1) as usize,
        }
    }

    pub fn len(&self) -> usize {
        let size = self.size();
        size.width * size.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The exact grid point sampled at `pixel`.
    pub fn coordinate(&self, pixel: Pixel) -> GridCoordinate {
        let denom: BigInt = self.resolution.into();
        let at = |start: i64, offset: usize| {
            BigRational::new(BigInt::from(start) + BigInt::from(offset), denom.clone())
        };
        GridCoordinate::new(at(self.x.0, pixel.x), at(self.y.0, pixel.y))
    }

    /// The sphere value sampled at `pixel`.
    pub fn point(&self, pixel: Pixel) -> ExtendedComplex {
        self.coordinate(pixel).to_extended()
    }

    /// All pixels, column by column from the lower-left corner.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> {
        let size = self.size();
        (0..size.width).flat_map(move |x| (0..size.height).map(move |y| Pixel { x, y }))
    }
}
