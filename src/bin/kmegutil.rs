#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use kmeg::{codec, Error, KmeansOptions, KmegPipeline, PaletteSize};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Subcommand)]
enum Command {
    /// Convert an image into the kmeg format.
    ToKmeg,
    /// Reconstruct a color quantized image from a kmeg file.
    FromKmeg,
}

/// Utility to convert an image to the kmeg format and reconstruct it as a k-means color quantized image.
#[derive(Parser)]
#[command(name = "kmegutil")]
struct Options {
    /// Source file.
    #[arg(long, global = true)]
    from: Option<PathBuf>,

    /// Destination file.
    #[arg(long, global = true)]
    to: Option<PathBuf>,

    /// Number of quantization levels (palette colors).
    #[arg(long, global = true, default_value_t = 0)]
    levels: u16,

    /// Maximum number of k-means iterations.
    #[arg(long, global = true, default_value_t = KmeansOptions::DEFAULT_MAX_ITERATIONS)]
    max_iterations: u32,

    /// Seed for the k-means initialization.
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,

    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let options = Options::parse();

    let filter = if options.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&options) {
        Ok(()) => {
            info!("executed the command successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &Options) -> anyhow::Result<()> {
    let (Some(from), Some(to)) = (&options.from, &options.to) else {
        return Err(Error::InvalidInput(
            "both source and destination file paths must be provided".to_owned(),
        )
        .into());
    };

    match options.command {
        Command::ToKmeg => {
            if options.levels == 0 {
                return Err(Error::InvalidInput("levels should not be zero".to_owned()).into());
            }
            let k = PaletteSize::try_from(options.levels)
                .map_err(|e| Error::InvalidInput(format!("levels {e}")))?;
            let kmeans = KmeansOptions::new()
                .max_iterations(options.max_iterations)
                .seed(options.seed);
            compress(from, to, k, kmeans)
        }
        Command::FromKmeg => decompress(from, to),
    }
}

fn compress(from: &Path, to: &Path, k: PaletteSize, kmeans: KmeansOptions) -> anyhow::Result<()> {
    let image = kmeg::read_rgb_image(from)
        .with_context(|| format!("error decoding the original image file {}", from.display()))?;

    let container = KmegPipeline::try_from(&image)?
        .palette_size(k)
        .kmeans_options(kmeans)
        .container()
        .context("construction of kmeg format failed")?;

    codec::write_file(to, &container).context("encoding kmeg to disk failed")?;

    info!(
        from = %from.display(),
        to = %to.display(),
        colors = container.palette().len(),
        "wrote kmeg file"
    );
    Ok(())
}

fn decompress(from: &Path, to: &Path) -> anyhow::Result<()> {
    let container = codec::read_file(from).context("decoding kmeg to rgb image failed")?;

    let image = container
        .to_rgbimage()
        .context("reconstructing the image failed")?;

    kmeg::write_rgb_image(to, &image).context("encoding the reconstructed image failed")?;

    info!(from = %from.display(), to = %to.display(), "reconstructed image");
    Ok(())
}
