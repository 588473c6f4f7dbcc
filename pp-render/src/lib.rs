//! Compute engine for phase portraits.
//!
//! Sampling a function is independent per grid point, so evaluation runs on a thread pool.
//! A portrait is computed in these steps:
//! -   Build the grid for the requested rectangle and resolution.
//! -   If a sample store is given, reuse every point it already holds.
//! -   Evaluate the remaining points in chunks. Each chunk is evaluated in parallel;
//!     results are recorded, and appended to the store, from the calling thread.
//! -   Flush the store and report progress after each chunk.

use std::path::PathBuf;

use pp_core::{ExtendedComplex, GridError, PortraitFunction};
use thiserror::Error;

mod cache;
mod compute;

pub use cache::{CacheRecord, SampleCache, SampledValue, StoreError};
pub use compute::{ComputeStats, Failure, GridComputer, Portrait};

/// Errors that can occur during execution.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What to draw.
pub struct PortraitRequest<'f> {
    pub lower_left: ExtendedComplex,
    pub upper_right: ExtendedComplex,
    /// Grid points per unit length.
    pub resolution: u32,
    pub function: &'f dyn PortraitFunction,
    /// Sample store to reuse and extend. `None`, or an empty path, disables persistence.
    pub store: Option<PathBuf>,
}

/// How to compute it.
#[derive(Clone, Debug)]
pub struct ComputeConfig {
    /// Report progress at `info` level rather than `debug`.
    pub progress: bool,
    /// Fraction of the points to evaluate between progress reports and store flushes.
    pub report_every: f64,
    pub threads: usize,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        ComputeConfig {
            progress: false,
            report_every: 0.005,
            threads: rayon::current_num_threads(),
        }
    }
}
