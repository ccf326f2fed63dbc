//! Tier-2 arithmetic-progression runs and the compactor that detects them.

use serde::{Deserialize, Serialize};

use crate::interval::IntervalGroup;

/// `count` consecutive interval entries whose `id`, `number`, and start
/// column advance in lockstep by `1`, `1`, and the group stride.
///
/// The `i`-th member reconstructs as `id = id0 + i`, `number = number0 + i`,
/// `x_start = x_start0 + i * stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRun {
    /// Start column of the first member.
    #[serde(rename = "x0")]
    pub x_start0: i64,
    /// Number of members.
    #[serde(rename = "k")]
    pub count: i64,
    /// Place identifier of the first member.
    pub id0: i64,
    /// Sequential number of the first member.
    #[serde(rename = "n0")]
    pub number0: i64,
}

/// Tier-2 blob: one group re-encoded as progression runs on a single row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionGroup {
    /// City identifier.
    #[serde(rename = "c")]
    pub city_id: i64,
    /// Group label.
    #[serde(rename = "n")]
    pub name: String,
    /// Country identifier.
    #[serde(rename = "id")]
    pub country_id: i64,
    /// Shared tile row of every entry.
    pub y: i64,
    /// Fixed tile-column width of every entry.
    #[serde(rename = "s")]
    pub stride: i64,
    /// Maximal lockstep runs in ascending column order.
    #[serde(rename = "seq")]
    pub runs: Vec<ProgressionRun>,
}

/// Attempt to re-encode an interval group as progression runs.
///
/// Returns `None` when the group is not a Tier-2 candidate (entries on more
/// than one row, or any entry's width differing from `stride`) or when the
/// re-encoding would not pay for itself: the run count must be `1` or at most
/// half the entry count. An empty group encodes as the explicit empty
/// sentinel `{y: 0, runs: []}` rather than `None`.
#[must_use]
pub fn compact_group(group: &IntervalGroup, stride: i64) -> Option<ProgressionGroup> {
    if group.entries.is_empty() {
        return Some(ProgressionGroup {
            city_id: group.city_id,
            name: group.name.clone(),
            country_id: group.country_id,
            y: 0,
            stride,
            runs: Vec::new(),
        });
    }
    if stride < 1 {
        return None;
    }
    let y = group.entries.first()?.y;
    if !group
        .entries
        .iter()
        .all(|entry| entry.y == y && entry.x_end - entry.x_start + 1 == stride)
    {
        return None;
    }

    let mut ordered: Vec<_> = group.entries.iter().collect();
    ordered.sort_by_key(|entry| entry.x_start);

    let mut runs: Vec<ProgressionRun> = Vec::new();
    for entry in ordered {
        match runs.last_mut() {
            // `run.count` is also the offset the next lockstep member must sit at.
            Some(run)
                if entry.x_start == run.x_start0 + run.count * stride
                    && entry.id == run.id0 + run.count
                    && entry.number == run.number0 + run.count =>
            {
                run.count += 1;
            }
            _ => runs.push(ProgressionRun {
                x_start0: entry.x_start,
                count: 1,
                id0: entry.id,
                number0: entry.number,
            }),
        }
    }

    if runs.len() == 1 || 2 * runs.len() <= group.entries.len() {
        Some(ProgressionGroup {
            city_id: group.city_id,
            name: group.name.clone(),
            country_id: group.country_id,
            y,
            stride,
            runs,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::IntervalEntry;

    fn entry(id: i64, number: i64, y: i64, x_start: i64, x_end: i64) -> IntervalEntry {
        IntervalEntry {
            id,
            number,
            y,
            x_start,
            x_end,
        }
    }

    fn group(entries: Vec<IntervalEntry>) -> IntervalGroup {
        IntervalGroup {
            city_id: 1,
            name: "A".into(),
            country_id: 9,
            entries,
        }
    }

    #[test]
    fn empty_group_encodes_as_sentinel() {
        let compacted = compact_group(&group(Vec::new()), 4).unwrap();
        assert_eq!(compacted.y, 0);
        assert!(compacted.runs.is_empty());
    }

    #[test]
    fn mixed_rows_disqualify() {
        let g = group(vec![entry(1, 1, 5, 0, 3), entry(2, 2, 6, 4, 7)]);
        assert!(compact_group(&g, 4).is_none());
    }

    #[test]
    fn width_other_than_stride_disqualifies() {
        let g = group(vec![entry(1, 1, 5, 0, 3), entry(2, 2, 5, 4, 8)]);
        assert!(compact_group(&g, 4).is_none());
    }

    #[test]
    fn lockstep_entries_collapse_into_one_run() {
        let g = group(vec![
            entry(1, 1, 5, 0, 3),
            entry(2, 2, 5, 4, 7),
            entry(3, 3, 5, 8, 11),
        ]);
        let compacted = compact_group(&g, 4).unwrap();
        assert_eq!(
            compacted.runs,
            vec![ProgressionRun {
                x_start0: 0,
                count: 3,
                id0: 1,
                number0: 1,
            }]
        );
    }

    #[test]
    fn id_jump_starts_a_new_run() {
        let g = group(vec![
            entry(1, 1, 5, 0, 3),
            entry(2, 2, 5, 4, 7),
            entry(9, 3, 5, 8, 11),
            entry(10, 4, 5, 12, 15),
        ]);
        let compacted = compact_group(&g, 4).unwrap();
        assert_eq!(compacted.runs.len(), 2);
        assert_eq!(compacted.runs.last().unwrap().id0, 9);
    }

    #[test]
    fn column_gap_starts_a_new_run() {
        let g = group(vec![
            entry(1, 1, 5, 0, 3),
            entry(2, 2, 5, 8, 11),
            entry(3, 3, 5, 12, 15),
            entry(4, 4, 5, 16, 19),
        ]);
        let compacted = compact_group(&g, 4).unwrap();
        assert_eq!(compacted.runs.len(), 2);
    }

    #[test]
    fn marginal_compaction_is_rejected() {
        // Three entries collapsing to two runs: 2 * 2 > 3.
        let g = group(vec![
            entry(1, 1, 5, 0, 3),
            entry(5, 5, 5, 4, 7),
            entry(6, 6, 5, 8, 11),
        ]);
        assert!(compact_group(&g, 4).is_none());
    }

    #[test]
    fn exact_halving_is_accepted() {
        // Four entries collapsing to two runs: 2 * 2 <= 4.
        let g = group(vec![
            entry(1, 1, 5, 0, 3),
            entry(2, 2, 5, 4, 7),
            entry(7, 7, 5, 8, 11),
            entry(8, 8, 5, 12, 15),
        ]);
        assert!(compact_group(&g, 4).is_some());
    }

    #[test]
    fn single_entry_is_a_single_run() {
        let compacted = compact_group(&group(vec![entry(1, 1, 5, 0, 3)]), 4).unwrap();
        assert_eq!(compacted.runs.len(), 1);
        assert_eq!(compacted.runs.first().unwrap().count, 1);
    }

    #[test]
    fn unsorted_entries_are_walked_in_column_order() {
        let g = group(vec![
            entry(3, 3, 5, 8, 11),
            entry(1, 1, 5, 0, 3),
            entry(2, 2, 5, 4, 7),
        ]);
        let compacted = compact_group(&g, 4).unwrap();
        assert_eq!(compacted.runs.len(), 1);
    }
}
