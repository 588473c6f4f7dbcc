use std::{collections::HashMap, time::Instant};

use pp_core::{
    image::Renderer, CacheKey, DomainError, ExtendedComplex, Grid, Pixel, PixelValueMap,
};
use rayon::prelude::*;

use crate::{cache::SampleCache, ComputeConfig, Error, PortraitRequest};

/// A point the function could not be evaluated at.
#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    pub pixel: Pixel,
    pub argument: ExtendedComplex,
    pub error: DomainError,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComputeStats {
    /// Points in the grid.
    pub points: usize,
    /// Points read back from the sample store.
    pub reused: usize,
    /// Function evaluations performed.
    pub evaluated: usize,
    pub failures: Vec<Failure>,
}

/// A computed grid: every pixel except the failed ones has a value.
#[derive(Clone, Debug)]
pub struct Portrait {
    pub grid: Grid,
    pub values: PixelValueMap,
    pub stats: ComputeStats,
}

impl Portrait {
    pub fn render(&self, renderer: &Renderer) -> image::RgbImage {
        renderer.render(&self.grid, &self.values)
    }
}

/// Samples functions over grids, in its own thread pool.
pub struct GridComputer {
    pool: rayon::ThreadPool,
    config: ComputeConfig,
}

impl GridComputer {
    pub fn new() -> Result<Self, Error> {
        Self::with_config(ComputeConfig::default())
    }

    pub fn with_config(config: ComputeConfig) -> Result<Self, Error> {
        if config.threads < 1 {
            return Err(Error::InvalidArgument(
                "must provide >=1 thread".to_string(),
            ));
        }
        if !(config.report_every > 0.0 && config.report_every <= 1.0) {
            return Err(Error::InvalidArgument(format!(
                "report interval {} is not in (0, 1]",
                config.report_every
            )));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|v| Error::InvalidArgument(format!("error creating thread pool: {}", v)))?;
        Ok(GridComputer { pool, config })
    }

    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    /// Sample `request.function` at every point of the requested grid.
    ///
    /// Points where the function fails are logged and left out of the result; the computation
    /// continues. Grid and store errors abort it.
    pub fn compute(&self, request: &PortraitRequest) -> Result<Portrait, Error> {
        let grid = Grid::new(
            &request.lower_left,
            &request.upper_right,
            request.resolution,
        )?;
        let function = request.function;
        let span = tracing::info_span!(
            "compute",
            function = function.name(),
            resolution = request.resolution,
            points = grid.len()
        );
        let _guard = span.enter();
        let start = Instant::now();

        let mut cache = match request.store.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => Some(SampleCache::open(path)?),
            _ => None,
        };

        let mut values = PixelValueMap::with_capacity(grid.len());
        let mut keys: HashMap<Pixel, CacheKey> = HashMap::new();
        if let Some(cache) = cache.as_mut() {
            for pixel in grid.pixels() {
                keys.insert(pixel, grid.coordinate(pixel).key()?);
            }
            if !cache.is_fresh() {
                let pixels: HashMap<CacheKey, Pixel> =
                    keys.iter().map(|(pixel, key)| (*key, *pixel)).collect();
                let requested: Vec<CacheKey> = pixels.keys().copied().collect();
                for (key, sampled) in cache.lookup(&requested)? {
                    let Some(&pixel) = pixels.get(&key) else {
                        continue;
                    };
                    match sampled.to_extended() {
                        Ok(value) => {
                            values.insert(pixel, value);
                        }
                        Err(err) => {
                            tracing::warn!(%key, %err, "ignoring unreadable stored sample")
                        }
                    }
                }
            }
        }
        let reused = values.len();
        tracing::info!(
            reused,
            percent = percent(reused, grid.len()),
            "values reused from the sample store"
        );

        let pending: Vec<Pixel> = grid
            .pixels()
            .filter(|pixel| !values.contains_key(pixel))
            .collect();
        let chunk = ((pending.len() as f64 * self.config.report_every) as usize).max(1);
        let mut failures = Vec::new();
        let mut done = 0;
        for batch in pending.chunks(chunk) {
            let results: Vec<_> = self.pool.install(|| {
                batch
                    .par_iter()
                    .map(|&pixel| {
                        let argument = grid.point(pixel);
                        let result = function.eval(&argument);
                        (pixel, argument, result)
                    })
                    .collect()
            });
            for (pixel, argument, result) in results {
                match result {
                    Ok(value) => {
                        if let (Some(cache), Some(&key)) = (cache.as_mut(), keys.get(&pixel)) {
                            cache.append(key, &value);
                        }
                        values.insert(pixel, value);
                    }
                    Err(error) => {
                        tracing::warn!(%argument, %pixel, %error, "value not computed");
                        failures.push(Failure {
                            pixel,
                            argument,
                            error,
                        });
                    }
                }
            }
            done += batch.len();
            if let Some(cache) = cache.as_mut() {
                cache.flush()?;
            }
            self.report(done, pending.len(), start);
        }
        if let Some(cache) = cache.as_mut() {
            cache.flush()?;
        }

        tracing::info!(
            evaluated = pending.len(),
            failed = failures.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "computation finished"
        );
        let stats = ComputeStats {
            points: grid.len(),
            reused,
            evaluated: pending.len(),
            failures,
        };
        Ok(Portrait {
            grid,
            values,
            stats,
        })
    }

    fn report(&self, done: usize, total: usize, start: Instant) {
        let percent = percent(done, total);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        if self.config.progress {
            tracing::info!(done, total, percent, elapsed_ms, "progress");
        } else {
            tracing::debug!(done, total, percent, elapsed_ms, "progress");
        }
    }
}

/// `part` as a percentage of `whole`, to two decimal places.
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 100.0;
    }
    (part as f64 * 10000.0 / whole as f64).floor() / 100.0
}
