use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use pp_core::{function, image, ExtendedComplex};
use pp_render::{ComputeConfig, GridComputer, PortraitRequest};
use tracing_subscriber::EnvFilter;

/// Draw the phase portrait of a function over a rectangle of the complex plane.
#[derive(Debug, Parser)]
#[command(allow_negative_numbers = true)]
struct Args {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,

    /// Grid points per unit length.
    #[arg(long)]
    resolution: u32,

    /// One of the builtin functions, e.g. `zeta`.
    #[arg(long)]
    function: String,

    /// Sample store to reuse and extend.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Log progress at info level.
    #[arg(long)]
    progress: bool,

    /// Worker threads; defaults to one per CPU.
    #[arg(long)]
    threads: Option<usize>,

    /// Grow each sample into a square of this many pixels.
    #[arg(long, default_value_t = 1)]
    magnify: u32,

    /// Output PNG file.
    #[arg(long)]
    output: PathBuf,
}

fn run(args: Args) -> Result<(), String> {
    let f = function::builtin(&args.function).ok_or_else(|| {
        format!(
            "unknown function {}; options are: {}",
            args.function,
            function::builtins().collect::<Vec<_>>().join(", ")
        )
    })?;
    let corner = |re, im| ExtendedComplex::new(re, im).map_err(|err| err.to_string());
    let request = PortraitRequest {
        lower_left: corner(args.x_min, args.y_min)?,
        upper_right: corner(args.x_max, args.y_max)?,
        resolution: args.resolution,
        function: &f,
        store: args.store,
    };

    let mut config = ComputeConfig {
        progress: args.progress,
        ..Default::default()
    };
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    let exec = GridComputer::with_config(config).map_err(|err| err.to_string())?;
    let portrait = exec.compute(&request).map_err(|err| err.to_string())?;

    let img = portrait.render(&image::Renderer::default());
    let img = if args.magnify > 1 {
        image::magnify(&img, args.magnify)
    } else {
        img
    };
    img.save(&args.output)
        .map_err(|err| format!("failed to write {}: {}", args.output.display(), err))?;
    tracing::info!(
        output = %args.output.display(),
        width = img.width(),
        height = img.height(),
        failed = portrait.stats.failures.len(),
        "wrote portrait"
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
