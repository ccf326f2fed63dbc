//! Render command implementation: rasterise record rows into a PNG map.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use image::{Rgb, RgbImage};
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use placepack_fs::{create_utf8_file, open_utf8_file};
use serde::{Deserialize, Serialize};

use crate::{ARG_DIR, ARG_LEGEND, ARG_NAMES, ARG_OUTPUT, CliError, ENV_RENDER_DIR};

/// Default map file name when `--output` is absent.
const DEFAULT_MAP_OUTPUT: &str = "map.png";
/// Default country-name mapping when `--names` is absent.
const DEFAULT_NAMES_FILE: &str = "countryid_to_name.csv";

/// CLI arguments for the `render` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rasterise a directory of tileY-<N>.jsonl record files into \
                 a PNG map, one image row per file in ascending numeric row \
                 order, one pixel per record line. Each pixel takes a \
                 deterministic per-country colour; a legend listing every \
                 rendered country is written beside the map.",
    about = "Render record rows as a PNG map with a country legend"
)]
#[ortho_config(prefix = "PLACEPACK")]
pub(crate) struct RenderArgs {
    /// Directory containing `tileY-<N>.jsonl` row files.
    #[arg(value_name = "dir")]
    #[serde(default)]
    pub(crate) dir: Option<Utf8PathBuf>,
    /// Destination for the PNG map (default: `map.png`).
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// CSV mapping of country ids to names (default:
    /// `countryid_to_name.csv`).
    #[arg(long = ARG_NAMES, value_name = "path")]
    #[serde(default)]
    pub(crate) names: Option<Utf8PathBuf>,
    /// Destination for the legend (default: output with a `.legend.txt`
    /// extension).
    #[arg(long = ARG_LEGEND, value_name = "path")]
    #[serde(default)]
    pub(crate) legend: Option<Utf8PathBuf>,
}

impl RenderArgs {
    pub(crate) fn into_config(self) -> Result<RenderConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RenderConfig::try_from(merged)
    }
}

/// Resolved `render` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderConfig {
    /// Directory holding the row files.
    pub(crate) dir: Utf8PathBuf,
    /// Path the PNG map is written to.
    pub(crate) output: Utf8PathBuf,
    /// Path of the country-name mapping.
    pub(crate) names: Utf8PathBuf,
    /// Path the legend is written to.
    pub(crate) legend: Utf8PathBuf,
}

impl TryFrom<RenderArgs> for RenderConfig {
    type Error = CliError;

    fn try_from(args: RenderArgs) -> Result<Self, Self::Error> {
        let dir = args.dir.ok_or(CliError::MissingArgument {
            field: ARG_DIR,
            env: ENV_RENDER_DIR,
        })?;
        let output = args
            .output
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_MAP_OUTPUT));
        let names = args
            .names
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_NAMES_FILE));
        let legend = args
            .legend
            .unwrap_or_else(|| output.with_extension("legend.txt"));
        Ok(Self {
            dir,
            output,
            names,
            legend,
        })
    }
}

/// Sizes observed while rendering one map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RenderStats {
    /// Row files painted.
    pub(crate) rows: usize,
    /// Pixel columns per row.
    pub(crate) width: usize,
    /// Distinct countries that appeared.
    pub(crate) countries: usize,
}

pub(super) fn run_render(args: RenderArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let stats = execute_render(&config)?;
    info!(
        "rendered {} -> {} ({} rows x {} columns, {} countries)",
        config.dir, config.output, stats.rows, stats.width, stats.countries
    );
    Ok(())
}

pub(crate) fn execute_render(config: &RenderConfig) -> Result<RenderStats, CliError> {
    let rows = collect_rows(&config.dir)?;
    let Some(first) = rows.first() else {
        return Err(CliError::NoRenderRows {
            path: config.dir.clone(),
        });
    };
    let width = count_lines(first)?;
    if width == 0 {
        return Err(CliError::EmptyRenderRow {
            path: first.clone(),
        });
    }

    let mut image = RgbImage::new(
        u32::try_from(width).unwrap_or(u32::MAX),
        u32::try_from(rows.len()).unwrap_or(u32::MAX),
    );
    let mut palette: BTreeMap<i64, Rgb<u8>> = BTreeMap::new();
    for (row, path) in rows.iter().enumerate() {
        let y = u32::try_from(row).unwrap_or(u32::MAX);
        paint_row(&mut image, y, path, &mut palette)?;
    }

    placepack_fs::ensure_parent_dir(&config.output).map_err(|source| CliError::CreateOutput {
        path: config.output.clone(),
        source,
    })?;
    image
        .save(config.output.as_std_path())
        .map_err(|source| CliError::EncodeMap {
            path: config.output.clone(),
            source,
        })?;

    let names = load_country_names(&config.names);
    write_legend(&config.legend, &palette, &names)?;
    Ok(RenderStats {
        rows: rows.len(),
        width,
        countries: palette.len(),
    })
}

/// Row files under `dir`, in ascending numeric row order.
///
/// `tileY-10.jsonl` follows `tileY-2.jsonl`; lexicographic listing order
/// would interleave them.
fn collect_rows(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, CliError> {
    let files = placepack_fs::list_files_with_extension(dir, "jsonl").map_err(|source| {
        CliError::ListDirectory {
            path: dir.to_path_buf(),
            source,
        }
    })?;
    let mut rows: Vec<(u64, Utf8PathBuf)> = files
        .into_iter()
        .filter_map(|path| tile_row_number(&path).map(|number| (number, path)))
        .collect();
    rows.sort_by_key(|(number, _)| *number);
    Ok(rows.into_iter().map(|(_, path)| path).collect())
}

/// Numeric row of a `tileY-<N>.jsonl` file, `None` for any other name.
pub(crate) fn tile_row_number(path: &Utf8Path) -> Option<u64> {
    path.file_name()?
        .strip_prefix("tileY-")?
        .strip_suffix(".jsonl")?
        .parse()
        .ok()
}

/// Deterministic per-country colour, non-negative for negative ids.
pub(crate) fn country_color(country_id: i64) -> Rgb<u8> {
    let channel = |factor: i64| {
        let value = country_id.wrapping_mul(factor).rem_euclid(256);
        u8::try_from(value).unwrap_or(u8::MAX)
    };
    Rgb([channel(97), channel(57), channel(31)])
}

/// The one field the rasteriser reads; absent ids render as country 0.
#[derive(Deserialize)]
struct RenderRecord {
    #[serde(rename = "countryId", default)]
    country_id: i64,
}

fn count_lines(path: &Utf8Path) -> Result<usize, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut count = 0;
    for read in BufReader::new(file).lines() {
        read.map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        count += 1;
    }
    Ok(count)
}

/// Paint one row file onto image row `y`, one pixel per line.
///
/// Malformed lines keep their column black; columns beyond the canvas
/// width are dropped.
fn paint_row(
    image: &mut RgbImage,
    y: u32,
    path: &Utf8Path,
    palette: &mut BTreeMap<i64, Rgb<u8>>,
) -> Result<(), CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    for (column, read) in BufReader::new(file).lines().enumerate() {
        let line = read.map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        let Ok(record) = serde_json::from_str::<RenderRecord>(&line) else {
            continue;
        };
        let x = match u32::try_from(column) {
            Ok(x) if x < image.width() => x,
            _ => break,
        };
        let color = *palette
            .entry(record.country_id)
            .or_insert_with(|| country_color(record.country_id));
        image.put_pixel(x, y, color);
    }
    Ok(())
}

/// Load the country-name mapping, degrading to an empty map on failure.
fn load_country_names(path: &Utf8Path) -> BTreeMap<i64, String> {
    match read_country_names(path) {
        Ok(names) => names,
        Err(err) => {
            warn!("country names unavailable from {path}: {err}");
            BTreeMap::new()
        }
    }
}

/// Parse a CSV of country ids and names, locating the columns by
/// case-insensitive header substring match.
pub(crate) fn read_country_names(path: &Utf8Path) -> Result<BTreeMap<i64, String>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut lines = BufReader::new(file).lines();
    let header = match lines.next() {
        Some(read) => read.map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?,
        None => return Ok(BTreeMap::new()),
    };
    let columns: Vec<String> = header
        .split(',')
        .map(|column| column.trim().to_lowercase())
        .collect();
    let id_lookup = columns.iter().position(|column| column.contains("id"));
    let name_lookup = columns.iter().position(|column| column.contains("name"));
    let (Some(id_column), Some(name_column)) = (id_lookup, name_lookup) else {
        warn!("no id/name columns in {path}; country names skipped");
        return Ok(BTreeMap::new());
    };

    let mut names = BTreeMap::new();
    for read in lines {
        let line = read.map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        let fields: Vec<&str> = line.split(',').collect();
        let Some(id) = fields.get(id_column).and_then(|f| f.trim().parse().ok()) else {
            continue;
        };
        let Some(name) = fields.get(name_column) else {
            continue;
        };
        names.insert(id, name.trim().to_owned());
    }
    Ok(names)
}

/// Write the legend: one `countryId,countryName,RGB` row per rendered
/// country, in ascending id order.
pub(crate) fn write_legend(
    path: &Utf8Path,
    palette: &BTreeMap<i64, Rgb<u8>>,
    names: &BTreeMap<i64, String>,
) -> Result<(), CliError> {
    let file = create_utf8_file(path).map_err(|source| CliError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    let write_failed = |source| CliError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };
    writeln!(writer, "countryId,countryName,RGB").map_err(write_failed)?;
    for (country_id, Rgb([r, g, b])) in palette {
        let name = names.get(country_id).map_or("Unknown", String::as_str);
        writeln!(writer, "{country_id},{name},({r}, {g}, {b})").map_err(write_failed)?;
    }
    writer.flush().map_err(write_failed)
}
