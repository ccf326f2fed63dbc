//! Point lookups against the compact document, without expansion.

use serde::{Deserialize, Serialize};

use crate::document::{Blob, CompactDocument};
use crate::interval::IntervalGroup;
use crate::progression::ProgressionGroup;

/// Which encoding tier answered a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// Interval entries.
    V1,
    /// Progression runs.
    V2,
}

/// The record covering a queried tile, plus the tier that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryHit {
    /// City identifier of the matching group.
    pub city_id: i64,
    /// Group label of the matching group.
    pub name: String,
    /// Country identifier of the matching group.
    pub country_id: i64,
    /// Place identifier of the matching record.
    pub id: i64,
    /// Sequential number of the matching record.
    pub number: i64,
    /// First column of the covering interval.
    pub x_start: i64,
    /// Last column of the covering interval, inclusive.
    pub x_end: i64,
    /// Encoding tier that produced the match.
    pub tier: Tier,
}

/// Answer "which record, if any, covers tile `(x, y)`?" directly against the
/// compact form.
///
/// Blobs are tried in document order and the first hit wins. Tier-2 blobs
/// are resolved in constant time per run by inverting the encoding
/// arithmetic; Tier-1 blobs by linear scan. No records are materialised.
#[must_use]
pub fn resolve_point(document: &CompactDocument, x: i64, y: i64) -> Option<QueryHit> {
    document.blobs().iter().find_map(|blob| match blob {
        Blob::Interval(group) => resolve_interval(group, x, y),
        Blob::Progression(group) => resolve_progression(group, x, y),
    })
}

fn resolve_interval(group: &IntervalGroup, x: i64, y: i64) -> Option<QueryHit> {
    group
        .entries
        .iter()
        .find(|entry| entry.y == y && (entry.x_start..=entry.x_end).contains(&x))
        .map(|entry| QueryHit {
            city_id: group.city_id,
            name: group.name.clone(),
            country_id: group.country_id,
            id: entry.id,
            number: entry.number,
            x_start: entry.x_start,
            x_end: entry.x_end,
            tier: Tier::V1,
        })
}

fn resolve_progression(group: &ProgressionGroup, x: i64, y: i64) -> Option<QueryHit> {
    if group.y != y || group.stride < 1 {
        // A non-positive stride covers no columns; only hand-written
        // documents can carry one.
        return None;
    }
    for run in &group.runs {
        if x < run.x_start0 {
            continue;
        }
        let offset = (x - run.x_start0) / group.stride;
        if offset >= run.count {
            continue;
        }
        let x_start = run.x_start0 + offset * group.stride;
        let x_end = x_start + group.stride - 1;
        if (x_start..=x_end).contains(&x) {
            return Some(QueryHit {
                city_id: group.city_id,
                name: group.name.clone(),
                country_id: group.country_id,
                id: run.id0 + offset,
                number: run.number0 + offset,
                x_start,
                x_end,
                tier: Tier::V2,
            });
        }
    }
    None
}
