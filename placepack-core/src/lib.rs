//! Two-tier compaction codec for per-tile placement records.
//!
//! Raw placement records are grouped by `(cityId, name, countryId)` and
//! collapsed into contiguous tile-column intervals (Tier-1). Groups whose
//! intervals form an arithmetic progression of fixed width are re-encoded as
//! compact runs (Tier-2). The codec is pure and single-threaded: encoding,
//! decoding, and point lookup are deterministic functions of their inputs.

#![forbid(unsafe_code)]

mod codec;
mod document;
mod interval;
mod progression;
mod query;
mod record;

pub use codec::{decode, encode};
pub use document::{Blob, CompactDocument, DocumentError};
pub use interval::{IntervalEntry, IntervalGroup, build_interval_groups};
pub use progression::{ProgressionGroup, ProgressionRun, compact_group};
pub use query::{QueryHit, Tier, resolve_point};
pub use record::{PlacementRecord, TileCoord, sort_canonical};
