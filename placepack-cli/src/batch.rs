//! Batch command implementation: compress a directory with a worker pool.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{error, info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::compress::{compress_file, pack_output_path, validate_stride};
use crate::{
    ARG_DIR, ARG_JOBS, ARG_OUT_DIR, ARG_STRIDE, CliError, ENV_BATCH_DIR, pool,
};

/// CLI arguments for the `batch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compress every .jsonl file in a directory using a bounded \
                 worker pool. Per-file failures are logged and do not cancel \
                 sibling workers; completion means every file was attempted.",
    about = "Compress every JSON-lines file in a directory"
)]
#[ortho_config(prefix = "PLACEPACK")]
pub(crate) struct BatchArgs {
    /// Directory containing `.jsonl` placement files.
    #[arg(value_name = "dir")]
    #[serde(default)]
    pub(crate) dir: Option<Utf8PathBuf>,
    /// Directory for the compact documents (default: alongside each input).
    #[arg(long = ARG_OUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) out_dir: Option<Utf8PathBuf>,
    /// Fixed tile-column width assumed for progression detection.
    #[arg(long = ARG_STRIDE, value_name = "n")]
    #[serde(default)]
    pub(crate) stride: Option<i64>,
    /// Worker threads (default: available parallelism).
    #[arg(long = ARG_JOBS, value_name = "n")]
    #[serde(default)]
    pub(crate) jobs: Option<usize>,
}

impl BatchArgs {
    pub(crate) fn into_config(self) -> Result<BatchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BatchConfig::try_from(merged)
    }
}

/// Resolved `batch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BatchConfig {
    /// Directory holding the inputs.
    pub(crate) dir: Utf8PathBuf,
    /// Output directory, when not writing alongside the inputs.
    pub(crate) out_dir: Option<Utf8PathBuf>,
    /// Tile-column width for progression detection.
    pub(crate) stride: i64,
    /// Worker threads.
    pub(crate) jobs: Option<usize>,
}

impl TryFrom<BatchArgs> for BatchConfig {
    type Error = CliError;

    fn try_from(args: BatchArgs) -> Result<Self, Self::Error> {
        let dir = args.dir.ok_or(CliError::MissingArgument {
            field: ARG_DIR,
            env: ENV_BATCH_DIR,
        })?;
        let stride = validate_stride(args.stride)?;
        Ok(Self {
            dir,
            out_dir: args.out_dir,
            stride,
            jobs: args.jobs,
        })
    }
}

/// Final batch summary, printed even when individual files failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BatchSummary {
    /// Files found in the directory.
    pub(crate) attempted: usize,
    /// Files compressed successfully.
    pub(crate) succeeded: usize,
    /// Files that failed and were logged.
    pub(crate) failed: usize,
}

pub(super) fn run_batch_with(args: BatchArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_batch(&config, writer)
}

pub(crate) fn execute_batch(
    config: &BatchConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let files = placepack_fs::list_files_with_extension(&config.dir, "jsonl").map_err(
        |source| CliError::ListDirectory {
            path: config.dir.clone(),
            source,
        },
    )?;
    if files.is_empty() {
        warn!("no .jsonl files under {}", config.dir);
    }
    let workers = pool::worker_count(config.jobs, files.len());

    let succeeded = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    pool::for_each_parallel(&files, workers, |input| {
        let output = output_path(config, input);
        match compress_file(input, &output, config.stride) {
            Ok(stats) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                info!(
                    "compressed {input} -> {output} ({} records into {} blobs)",
                    stats.records, stats.blobs
                );
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::Relaxed);
                error!("failed to compress {input}: {err}");
            }
        }
    });

    let summary = BatchSummary {
        attempted: files.len(),
        succeeded: succeeded.into_inner(),
        failed: failed.into_inner(),
    };
    let payload = serde_json::to_string(&summary).map_err(CliError::SerialiseReport)?;
    writeln!(writer, "{payload}").map_err(CliError::WriteReport)
}

fn output_path(config: &BatchConfig, input: &Utf8Path) -> Utf8PathBuf {
    let packed = pack_output_path(input);
    match (&config.out_dir, packed.file_name()) {
        (Some(out_dir), Some(name)) => out_dir.join(name),
        _ => packed,
    }
}
