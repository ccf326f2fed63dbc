//! Facade crate for the placepack tile-placement codec.
//!
//! Re-exports the core record model, the two-tier compact document, and the
//! encode/decode/query entry points so downstream tooling can depend on a
//! single crate.

#![forbid(unsafe_code)]

pub use placepack_core::{
    Blob, CompactDocument, DocumentError, IntervalEntry, IntervalGroup, PlacementRecord,
    ProgressionGroup, ProgressionRun, QueryHit, Tier, TileCoord, build_interval_groups,
    compact_group, decode, encode, resolve_point, sort_canonical,
};
