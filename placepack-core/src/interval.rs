//! Tier-1 interval entries and the builder that produces them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::record::PlacementRecord;

/// All tile columns `[x_start, x_end]` at row `y` owned by one `(id, number)` pair.
///
/// Derived ordering doubles as the entry sort key
/// `(id, number, y, x_start, x_end)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntervalEntry {
    /// Place identifier.
    pub id: i64,
    /// Sequential number tied to `id`.
    #[serde(rename = "n")]
    pub number: i64,
    /// Tile row.
    pub y: i64,
    /// First column of the contiguous run.
    #[serde(rename = "xs")]
    pub x_start: i64,
    /// Last column of the contiguous run, inclusive.
    #[serde(rename = "xe")]
    pub x_end: i64,
}

/// Tier-1 blob: one group's interval entries with its metadata key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalGroup {
    /// City identifier.
    #[serde(rename = "c")]
    pub city_id: i64,
    /// Group label.
    #[serde(rename = "n")]
    pub name: String,
    /// Country identifier.
    #[serde(rename = "id")]
    pub country_id: i64,
    /// Entries sorted by `(id, number, y, x_start, x_end)`.
    #[serde(rename = "e")]
    pub entries: Vec<IntervalEntry>,
}

/// Group identity; derived ordering is the `(cityId, countryId, name)`
/// document order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    city_id: i64,
    country_id: i64,
    name: String,
}

/// Collapse raw records into per-group interval entries.
///
/// Records are partitioned by `(cityId, name, countryId)`, sub-partitioned by
/// `(id, number, y)`, and each sub-key's column set is deduplicated, sorted,
/// and merged into maximal consecutive runs. Duplicate `(id, number, y,
/// tileX)` combinations collapse silently. An empty input yields an empty
/// group list.
#[must_use]
pub fn build_interval_groups(records: &[PlacementRecord]) -> Vec<IntervalGroup> {
    let mut columns: BTreeMap<GroupKey, BTreeMap<(i64, i64, i64), BTreeSet<i64>>> = BTreeMap::new();
    for record in records {
        let key = GroupKey {
            city_id: record.city_id,
            country_id: record.country_id,
            name: record.name.clone(),
        };
        columns
            .entry(key)
            .or_default()
            .entry((record.id, record.number, record.coord.tile_y))
            .or_default()
            .insert(record.coord.tile_x);
    }

    columns
        .into_iter()
        .map(|(key, sub_keys)| {
            let mut entries = Vec::new();
            for ((id, number, y), tile_columns) in sub_keys {
                for (x_start, x_end) in merge_consecutive(&tile_columns) {
                    entries.push(IntervalEntry {
                        id,
                        number,
                        y,
                        x_start,
                        x_end,
                    });
                }
            }
            entries.sort();
            IntervalGroup {
                city_id: key.city_id,
                name: key.name,
                country_id: key.country_id,
                entries,
            }
        })
        .collect()
}

/// Merge an ascending, deduplicated column set into maximal `[start, end]` runs.
fn merge_consecutive(columns: &BTreeSet<i64>) -> Vec<(i64, i64)> {
    let mut runs = Vec::new();
    let mut current: Option<(i64, i64)> = None;
    for &x in columns {
        current = match current {
            Some((start, end)) if x == end + 1 => Some((start, x)),
            Some(finished) => {
                runs.push(finished);
                Some((x, x))
            }
            None => Some((x, x)),
        };
    }
    if let Some(last) = current {
        runs.push(last);
    }
    runs
}
