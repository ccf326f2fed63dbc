//! Compress command implementation.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_INPUT, ARG_OUTPUT, ARG_STRIDE, CliError, DEFAULT_STRIDE, ENV_COMPRESS_INPUT, jsonl,
};

/// CLI arguments for the `compress` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compress a JSON-lines placement file into the two-tier \
                 compact document. Options can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Compress a JSON-lines placement file"
)]
#[ortho_config(prefix = "PLACEPACK")]
pub(crate) struct CompressArgs {
    /// Path to the JSON-lines placement records.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Destination for the compact document (default: input with a
    /// `.pack.json` extension).
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Fixed tile-column width assumed for progression detection.
    #[arg(long = ARG_STRIDE, value_name = "n")]
    #[serde(default)]
    pub(crate) stride: Option<i64>,
}

impl CompressArgs {
    pub(crate) fn into_config(self) -> Result<CompressConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CompressConfig::try_from(merged)
    }
}

/// Resolved `compress` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompressConfig {
    /// Path to the JSON-lines input.
    pub(crate) input: Utf8PathBuf,
    /// Path the compact document is written to.
    pub(crate) output: Utf8PathBuf,
    /// Tile-column width for progression detection.
    pub(crate) stride: i64,
}

impl TryFrom<CompressArgs> for CompressConfig {
    type Error = CliError;

    fn try_from(args: CompressArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_COMPRESS_INPUT,
        })?;
        let output = args
            .output
            .unwrap_or_else(|| pack_output_path(&input));
        let stride = validate_stride(args.stride)?;
        Ok(Self {
            input,
            output,
            stride,
        })
    }
}

/// Default compact-document path for a JSON-lines input.
pub(crate) fn pack_output_path(input: &Utf8Path) -> Utf8PathBuf {
    input.with_extension("pack.json")
}

/// Check the caller-supplied stride, falling back to the default.
pub(crate) fn validate_stride(stride: Option<i64>) -> Result<i64, CliError> {
    let value = stride.unwrap_or(DEFAULT_STRIDE);
    if value < 1 {
        return Err(CliError::InvalidStride { value });
    }
    Ok(value)
}

/// Sizes observed while compressing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CompressStats {
    /// Records read from the input.
    pub(crate) records: usize,
    /// Blobs in the emitted document.
    pub(crate) blobs: usize,
}

pub(super) fn run_compress(args: CompressArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing_file(&config.input, ARG_INPUT)?;
    let stats = compress_file(&config.input, &config.output, config.stride)?;
    info!(
        "compressed {} -> {} ({} records into {} blobs)",
        config.input, config.output, stats.records, stats.blobs
    );
    Ok(())
}

/// Read, encode, and write one file. Shared with the batch runner.
pub(crate) fn compress_file(
    input: &Utf8Path,
    output: &Utf8Path,
    stride: i64,
) -> Result<CompressStats, CliError> {
    let records = jsonl::read_records(input)?;
    let document = placepack_core::encode(&records, stride);
    jsonl::write_document(output, &document)?;
    Ok(CompressStats {
        records: records.len(),
        blobs: document.blobs().len(),
    })
}

/// Fail fast when a required input file is absent.
pub(crate) fn require_existing_file(
    path: &Utf8Path,
    field: &'static str,
) -> Result<(), CliError> {
    match placepack_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::UnusableSourcePath {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}
