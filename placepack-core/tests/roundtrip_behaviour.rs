//! Round-trip and ordering behaviour of the two-tier codec.

use placepack_core::{
    Blob, CompactDocument, PlacementRecord, TileCoord, decode, encode, sort_canonical,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rstest::rstest;

fn record(id: i64, number: i64, name: &str, x: i64, y: i64) -> PlacementRecord {
    PlacementRecord {
        id,
        city_id: 1,
        name: name.into(),
        number,
        country_id: 9,
        coord: TileCoord {
            tile_x: x,
            tile_y: y,
        },
    }
}

/// Six lockstep places of width 4 on one row: qualifies for Tier-2.
fn lockstep_records() -> Vec<PlacementRecord> {
    (0..6)
        .flat_map(|i| (0..4).map(move |dx| (i, dx)))
        .map(|(i, dx)| record(i + 1, i + 1, "Harbour", i * 4 + dx, 12))
        .collect()
}

/// Scattered places across rows and names: stays Tier-1.
fn ragged_records() -> Vec<PlacementRecord> {
    vec![
        record(1, 1, "Harbour", 0, 12),
        record(1, 1, "Harbour", 1, 12),
        record(4, 9, "Harbour", 7, 13),
        record(2, 2, "Market", 0, 3),
        record(2, 2, "Market", 5, 3),
    ]
}

fn canonical(mut records: Vec<PlacementRecord>) -> Vec<PlacementRecord> {
    sort_canonical(&mut records);
    records.dedup();
    records
}

#[rstest]
#[case::tier2(lockstep_records())]
#[case::tier1(ragged_records())]
fn decode_inverts_encode(#[case] records: Vec<PlacementRecord>) {
    let document = encode(&records, 4);
    assert_eq!(decode(&document), canonical(records));
}

#[rstest]
fn lockstep_set_actually_encodes_as_tier2() {
    let document = encode(&lockstep_records(), 4);
    assert!(matches!(
        document.blobs().first(),
        Some(Blob::Progression(_))
    ));
}

#[rstest]
fn ragged_set_actually_stays_tier1() {
    let document = encode(&ragged_records(), 4);
    assert!(
        document
            .blobs()
            .iter()
            .all(|blob| matches!(blob, Blob::Interval(_)))
    );
}

#[rstest]
fn shuffled_input_produces_a_byte_identical_document() {
    let mut records: Vec<_> = lockstep_records()
        .into_iter()
        .chain(ragged_records())
        .collect();
    let baseline = encode(&records, 4).to_json().unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..5 {
        records.shuffle(&mut rng);
        assert_eq!(encode(&records, 4).to_json().unwrap(), baseline);
    }
}

#[rstest]
fn single_entry_group_round_trips() {
    // Width happens to equal the stride, so the single entry may legally be
    // published as a one-run Tier-2 group; the contract is the round trip.
    let records = vec![
        record(1, 1, "A", 0, 5),
        record(1, 1, "A", 1, 5),
        record(1, 1, "A", 2, 5),
        record(1, 1, "A", 3, 5),
    ];
    let document = encode(&records, 4);
    assert_eq!(document.blobs().len(), 1);
    assert_eq!(decode(&document), canonical(records));
}

#[rstest]
fn document_survives_the_wire() {
    let document = encode(&lockstep_records(), 4);
    let reparsed = CompactDocument::from_json(&document.to_json().unwrap()).unwrap();
    assert_eq!(reparsed, document);
    assert_eq!(decode(&reparsed), decode(&document));
}

proptest! {
    /// Any well-formed record set round-trips after canonical sorting and
    /// duplicate collapse, whatever mix of tiers the encoder picks.
    #[test]
    fn round_trip_preserves_any_record_set(
        raw in prop::collection::vec(
            (0i64..5, 0i64..3, 0i64..2, 0i64..12, 0i64..3),
            0..50,
        ),
        stride in 1i64..6,
    ) {
        let records: Vec<_> = raw
            .into_iter()
            .map(|(id, number, city, x, y)| PlacementRecord {
                id,
                city_id: city,
                name: "P".into(),
                number,
                country_id: 9,
                coord: TileCoord { tile_x: x, tile_y: y },
            })
            .collect();
        let document = encode(&records, stride);
        prop_assert_eq!(decode(&document), canonical(records));
    }
}
