//! Decompress command implementation.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::compress::require_existing_file;
use crate::{ARG_INPUT, ARG_OUTPUT, CliError, ENV_DECOMPRESS_INPUT, jsonl};

/// CLI arguments for the `decompress` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Expand a compact document back into one JSON object per \
                 line, in canonical record order.",
    about = "Expand a compact document into JSON-lines records"
)]
#[ortho_config(prefix = "PLACEPACK")]
pub(crate) struct DecompressArgs {
    /// Path to the compact document.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Destination for the JSON-lines records (default: input with a
    /// `.jsonl` extension).
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl DecompressArgs {
    pub(crate) fn into_config(self) -> Result<DecompressConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DecompressConfig::try_from(merged)
    }
}

/// Resolved `decompress` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecompressConfig {
    /// Path to the compact document.
    pub(crate) input: Utf8PathBuf,
    /// Path the records are written to.
    pub(crate) output: Utf8PathBuf,
}

impl TryFrom<DecompressArgs> for DecompressConfig {
    type Error = CliError;

    fn try_from(args: DecompressArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_DECOMPRESS_INPUT,
        })?;
        let output = args
            .output
            .unwrap_or_else(|| records_output_path(&input));
        Ok(Self { input, output })
    }
}

/// Default JSON-lines path for a compact-document input.
pub(crate) fn records_output_path(input: &Utf8Path) -> Utf8PathBuf {
    let name = input.file_name().unwrap_or("records");
    let stem = name
        .strip_suffix(".pack.json")
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(name);
    input.with_file_name(format!("{stem}.jsonl"))
}

pub(super) fn run_decompress(args: DecompressArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing_file(&config.input, ARG_INPUT)?;
    let records = decompress_file(&config.input, &config.output)?;
    info!(
        "decompressed {} -> {} ({records} records)",
        config.input, config.output
    );
    Ok(())
}

/// Read a compact document and write the expanded records.
pub(crate) fn decompress_file(input: &Utf8Path, output: &Utf8Path) -> Result<usize, CliError> {
    let document = jsonl::read_document(input)?;
    let records = placepack_core::decode(&document);
    jsonl::write_records(output, &records)?;
    Ok(records.len())
}
