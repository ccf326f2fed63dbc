//! Query command implementation: point lookups against compact documents.

use std::io::Write;
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::error;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use placepack_core::{QueryHit, Tier, resolve_point};
use placepack_fs::PathKind;
use serde::{Deserialize, Serialize};

use crate::{
    ARG_COORD, ARG_JOBS, ARG_TARGET, CliError, ENV_QUERY_COORD, ENV_QUERY_TARGET, jsonl, pool,
};

/// Accepted coordinate spellings: `[x, y]` or `{"x": X, "y": Y}`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub(crate) enum CoordArg {
    /// Two-element array form.
    Pair(i64, i64),
    /// Object form.
    Object {
        /// Tile column.
        x: i64,
        /// Tile row.
        y: i64,
    },
}

impl CoordArg {
    /// Parse a coordinate argument from its raw CLI text.
    pub(crate) fn parse(value: &str) -> Result<Self, CliError> {
        serde_json::from_str(value).map_err(|source| CliError::ParseCoord {
            value: value.to_owned(),
            source,
        })
    }

    pub(crate) fn into_xy(self) -> (i64, i64) {
        match self {
            Self::Pair(x, y) | Self::Object { x, y } => (x, y),
        }
    }
}

/// CLI arguments for the `query` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Resolve which placement covers a tile coordinate, directly \
                 against the compact form. The target is a compact document \
                 or a directory of compact documents; the coordinate is \
                 JSON, either [x, y] or {\"x\": X, \"y\": Y}.",
    about = "Resolve which placement covers a tile coordinate"
)]
#[ortho_config(prefix = "PLACEPACK")]
pub(crate) struct QueryArgs {
    /// Compact document, or directory of compact documents.
    #[arg(value_name = "target")]
    #[serde(default)]
    pub(crate) target: Option<Utf8PathBuf>,
    /// Tile coordinate, as `[x, y]` or `{"x": X, "y": Y}`.
    #[arg(value_name = "coord")]
    #[serde(default)]
    pub(crate) coord: Option<String>,
    /// Worker threads for directory queries (default: available parallelism).
    #[arg(long = ARG_JOBS, value_name = "n")]
    #[serde(default)]
    pub(crate) jobs: Option<usize>,
}

impl QueryArgs {
    pub(crate) fn into_config(self) -> Result<QueryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        QueryConfig::try_from(merged)
    }
}

/// Resolved `query` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryConfig {
    /// Compact document or directory.
    pub(crate) target: Utf8PathBuf,
    /// Queried tile column.
    pub(crate) x: i64,
    /// Queried tile row.
    pub(crate) y: i64,
    /// Worker threads for directory queries.
    pub(crate) jobs: Option<usize>,
}

impl TryFrom<QueryArgs> for QueryConfig {
    type Error = CliError;

    fn try_from(args: QueryArgs) -> Result<Self, Self::Error> {
        let target = args.target.ok_or(CliError::MissingArgument {
            field: ARG_TARGET,
            env: ENV_QUERY_TARGET,
        })?;
        let coord = args.coord.ok_or(CliError::MissingArgument {
            field: ARG_COORD,
            env: ENV_QUERY_COORD,
        })?;
        let (x, y) = CoordArg::parse(&coord)?.into_xy();
        Ok(Self {
            target,
            x,
            y,
            jobs: args.jobs,
        })
    }
}

/// The query result object emitted on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct QueryReport {
    /// Whether any record covers the coordinate.
    #[serde(rename = "match")]
    pub(crate) matched: bool,
    /// File (or directory, on a directory-wide miss) that was queried.
    pub(crate) file: String,
    /// Queried tile column.
    pub(crate) x: i64,
    /// Queried tile row.
    pub(crate) y: i64,
    /// City identifier of the hit.
    #[serde(rename = "cityId", skip_serializing_if = "Option::is_none")]
    pub(crate) city_id: Option<i64>,
    /// Group label of the hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    /// Country identifier of the hit.
    #[serde(rename = "countryId", skip_serializing_if = "Option::is_none")]
    pub(crate) country_id: Option<i64>,
    /// Place identifier of the hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<i64>,
    /// Sequential number of the hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) number: Option<i64>,
    /// First covered column of the hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) xs: Option<i64>,
    /// Last covered column of the hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) xe: Option<i64>,
    /// Tier that matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) format: Option<Tier>,
}

impl QueryReport {
    pub(crate) fn hit(file: &Utf8Path, x: i64, y: i64, hit: QueryHit) -> Self {
        Self {
            matched: true,
            file: file.to_string(),
            x,
            y,
            city_id: Some(hit.city_id),
            name: Some(hit.name),
            country_id: Some(hit.country_id),
            id: Some(hit.id),
            number: Some(hit.number),
            xs: Some(hit.x_start),
            xe: Some(hit.x_end),
            format: Some(hit.tier),
        }
    }

    pub(crate) fn miss(file: &Utf8Path, x: i64, y: i64) -> Self {
        Self {
            matched: false,
            file: file.to_string(),
            x,
            y,
            city_id: None,
            name: None,
            country_id: None,
            id: None,
            number: None,
            xs: None,
            xe: None,
            format: None,
        }
    }
}

pub(super) fn run_query_with(args: QueryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_query(&config, writer)
}

pub(crate) fn execute_query(
    config: &QueryConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = match placepack_fs::path_kind(&config.target) {
        Ok(PathKind::File) => query_file(&config.target, config.x, config.y)?,
        Ok(PathKind::Directory) => query_directory(config)?,
        Ok(PathKind::Other) => {
            return Err(CliError::UnusableSourcePath {
                field: ARG_TARGET,
                path: config.target.clone(),
            });
        }
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            return Err(CliError::MissingSourceFile {
                field: ARG_TARGET,
                path: config.target.clone(),
            });
        }
        Err(source) => {
            return Err(CliError::InspectSourcePath {
                field: ARG_TARGET,
                path: config.target.clone(),
                source,
            });
        }
    };
    write_report(writer, &report)
}

fn query_file(path: &Utf8Path, x: i64, y: i64) -> Result<QueryReport, CliError> {
    let document = jsonl::read_document(path)?;
    Ok(resolve_point(&document, x, y)
        .map_or_else(|| QueryReport::miss(path, x, y), |hit| QueryReport::hit(path, x, y, hit)))
}

/// Fan the lookup out across every compact document in the directory.
///
/// Workers complete in nondeterministic order, so among concurrent hits the
/// lexicographically smallest file wins; a per-file failure is logged and
/// does not cancel sibling workers.
fn query_directory(config: &QueryConfig) -> Result<QueryReport, CliError> {
    let files = placepack_fs::list_files_with_extension(&config.target, "json").map_err(
        |source| CliError::ListDirectory {
            path: config.target.clone(),
            source,
        },
    )?;
    let workers = pool::worker_count(config.jobs, files.len());

    let hits: Mutex<Vec<(Utf8PathBuf, QueryHit)>> = Mutex::new(Vec::new());
    pool::for_each_parallel(&files, workers, |path| {
        match jsonl::read_document(path) {
            Ok(document) => {
                if let Some(hit) = resolve_point(&document, config.x, config.y) {
                    if let Ok(mut guard) = hits.lock() {
                        guard.push((path.clone(), hit));
                    }
                }
            }
            Err(err) => error!("query failed for {path}: {err}"),
        }
    });

    let mut collected = hits
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    collected.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(collected.into_iter().next().map_or_else(
        || QueryReport::miss(&config.target, config.x, config.y),
        |(file, hit)| QueryReport::hit(&file, config.x, config.y, hit),
    ))
}

fn write_report(writer: &mut dyn Write, report: &QueryReport) -> Result<(), CliError> {
    let payload = serde_json::to_string(report).map_err(CliError::SerialiseReport)?;
    writeln!(writer, "{payload}").map_err(CliError::WriteReport)
}
