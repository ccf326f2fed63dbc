//! Error types emitted by the placepack CLI.
//!
//! Keep this error type reasonably small, as most CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use placepack_core::DocumentError;
use thiserror::Error;

/// Errors emitted by the placepack CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Argument name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// The stride must cover at least one tile column.
    #[error("stride must be at least 1, got {value}")]
    InvalidStride {
        /// Rejected value.
        value: i64,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Argument the path came from.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is neither a file nor a directory
    /// the command can work with.
    #[error("{field} path {path:?} is not usable here")]
    UnusableSourcePath {
        /// Argument the path came from.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Argument the path came from.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The coordinate argument deserialised to neither `[x, y]` nor `{x, y}`.
    #[error("failed to parse coordinate {value:?} (expected [x, y] or {{\"x\": X, \"y\": Y}}): {source}")]
    ParseCoord {
        /// Raw argument text.
        value: String,
        /// Underlying deserialisation failure.
        #[source]
        source: serde_json::Error,
    },
    /// Opening an input file failed.
    #[error("failed to open {path:?}: {source}")]
    OpenInput {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Reading an input file failed mid-stream.
    #[error("failed to read {path:?}: {source}")]
    ReadInput {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// One JSON-lines record could not be decoded.
    #[error("invalid placement record at {path:?} line {line}: {source}")]
    ParseRecord {
        /// File holding the record.
        path: Utf8PathBuf,
        /// One-based line number.
        line: usize,
        /// Underlying deserialisation failure.
        #[source]
        source: serde_json::Error,
    },
    /// A compact document could not be decoded.
    #[error("invalid compact document at {path:?}: {source}")]
    ParseDocument {
        /// File holding the document.
        path: Utf8PathBuf,
        /// Underlying decode failure.
        #[source]
        source: DocumentError,
    },
    /// Serialising an output payload failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] DocumentError),
    /// Creating an output file failed.
    #[error("failed to create {path:?}: {source}")]
    CreateOutput {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Writing an output file failed.
    #[error("failed to write {path:?}: {source}")]
    WriteOutput {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Writing a report to the output stream failed.
    #[error("failed to write report: {0}")]
    WriteReport(#[source] std::io::Error),
    /// Serialising a report to JSON failed.
    #[error("failed to serialise report: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    /// Listing a batch directory failed.
    #[error("failed to list directory {path:?}: {source}")]
    ListDirectory {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// A render directory holds no row files.
    #[error("no tileY-*.jsonl files under {path:?}")]
    NoRenderRows {
        /// Scanned directory.
        path: Utf8PathBuf,
    },
    /// The first render row has no lines, leaving the canvas widthless.
    #[error("render row {path:?} has no records")]
    EmptyRenderRow {
        /// Offending row file.
        path: Utf8PathBuf,
    },
    /// Encoding the rendered map image failed.
    #[error("failed to encode map {path:?}: {source}")]
    EncodeMap {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying encode failure.
        #[source]
        source: image::ImageError,
    },
}
