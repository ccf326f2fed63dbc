//! The encode/decode orchestration over both tiers.

use crate::document::{Blob, CompactDocument};
use crate::interval::{IntervalGroup, build_interval_groups};
use crate::progression::{ProgressionGroup, compact_group};
use crate::record::{PlacementRecord, TileCoord, sort_canonical};

/// Encode raw records into a compact document.
///
/// Builds interval groups, then attempts progression compaction per group
/// with the caller-supplied `stride`; groups whose natural entry width does
/// not equal `stride` stay Tier-1. Exactly one group produces a single blob,
/// anything else the ordered collection.
#[must_use]
pub fn encode(records: &[PlacementRecord], stride: i64) -> CompactDocument {
    let blobs = build_interval_groups(records)
        .into_iter()
        .map(|group| match compact_group(&group, stride) {
            Some(progression) => Blob::Progression(progression),
            None => Blob::Interval(group),
        })
        .collect();
    CompactDocument::from_blobs(blobs)
}

/// Expand a compact document back into the full record set in canonical
/// order `(cityId, countryId, name, tileY, tileX, id, number)`.
#[must_use]
pub fn decode(document: &CompactDocument) -> Vec<PlacementRecord> {
    let mut records = Vec::new();
    for blob in document.blobs() {
        match blob {
            Blob::Interval(group) => expand_interval(group, &mut records),
            Blob::Progression(group) => expand_progression(group, &mut records),
        }
    }
    sort_canonical(&mut records);
    records
}

fn expand_interval(group: &IntervalGroup, out: &mut Vec<PlacementRecord>) {
    for entry in &group.entries {
        for x in entry.x_start..=entry.x_end {
            out.push(PlacementRecord {
                id: entry.id,
                city_id: group.city_id,
                name: group.name.clone(),
                number: entry.number,
                country_id: group.country_id,
                coord: TileCoord {
                    tile_x: x,
                    tile_y: entry.y,
                },
            });
        }
    }
}

fn expand_progression(group: &ProgressionGroup, out: &mut Vec<PlacementRecord>) {
    for run in &group.runs {
        for i in 0..run.count {
            let x_start = run.x_start0 + i * group.stride;
            for x in x_start..x_start + group.stride {
                out.push(PlacementRecord {
                    id: run.id0 + i,
                    city_id: group.city_id,
                    name: group.name.clone(),
                    number: run.number0 + i,
                    country_id: group.country_id,
                    coord: TileCoord {
                        tile_x: x,
                        tile_y: group.y,
                    },
                });
            }
        }
    }
}
