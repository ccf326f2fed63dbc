//! Command-line interface for the placepack tile-placement codec.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod batch;
mod compress;
mod decompress;
mod error;
mod jsonl;
mod pool;
mod query;
mod render;

pub use error::CliError;

pub(crate) const ARG_INPUT: &str = "input";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_STRIDE: &str = "stride";
pub(crate) const ARG_TARGET: &str = "target";
pub(crate) const ARG_COORD: &str = "coord";
pub(crate) const ARG_DIR: &str = "dir";
pub(crate) const ARG_OUT_DIR: &str = "out-dir";
pub(crate) const ARG_JOBS: &str = "jobs";
pub(crate) const ARG_NAMES: &str = "names";
pub(crate) const ARG_LEGEND: &str = "legend";

pub(crate) const ENV_COMPRESS_INPUT: &str = "PLACEPACK_CMDS_COMPRESS_INPUT";
pub(crate) const ENV_DECOMPRESS_INPUT: &str = "PLACEPACK_CMDS_DECOMPRESS_INPUT";
pub(crate) const ENV_QUERY_TARGET: &str = "PLACEPACK_CMDS_QUERY_TARGET";
pub(crate) const ENV_QUERY_COORD: &str = "PLACEPACK_CMDS_QUERY_COORD";
pub(crate) const ENV_BATCH_DIR: &str = "PLACEPACK_CMDS_BATCH_DIR";
pub(crate) const ENV_RENDER_DIR: &str = "PLACEPACK_CMDS_RENDER_DIR";

/// Default tile-column width used for progression detection.
pub(crate) const DEFAULT_STRIDE: i64 = 4;

/// Run the placepack CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    init_logging();
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Compress(args) => compress::run_compress(args),
        Command::Decompress(args) => decompress::run_decompress(args),
        Command::Query(args) => {
            let mut stdout = std::io::stdout().lock();
            query::run_query_with(args, &mut stdout)
        }
        Command::Batch(args) => {
            let mut stdout = std::io::stdout().lock();
            batch::run_batch_with(args, &mut stdout)
        }
        Command::Render(args) => render::run_render(args),
    }
}

fn init_logging() {
    // A second call (tests, embedding) keeps the installed logger.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init()
        .ok();
}

#[derive(Debug, Parser)]
#[command(
    name = "placepack",
    about = "Compact two-tier codec for per-tile placement records",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compress one JSON-lines placement file into a compact document.
    Compress(compress::CompressArgs),
    /// Expand a compact document back into JSON-lines records.
    Decompress(decompress::DecompressArgs),
    /// Resolve which placement covers a tile coordinate.
    Query(query::QueryArgs),
    /// Compress every JSON-lines file in a directory.
    Batch(batch::BatchArgs),
    /// Render record rows as a PNG map with a country legend.
    Render(render::RenderArgs),
}

#[cfg(test)]
mod tests;
