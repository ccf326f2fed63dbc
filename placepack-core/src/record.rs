//! The raw placement record model and its canonical ordering.

use serde::{Deserialize, Serialize};

/// Integer grid position of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCoord {
    /// Tile column.
    #[serde(rename = "tileX")]
    pub tile_x: i64,
    /// Tile row.
    #[serde(rename = "tileY")]
    pub tile_y: i64,
}

/// One placement tied to a single tile.
///
/// Mirrors the JSON-lines input format: `id`, `cityId`, `name`, `number`,
/// `countryId`, and a nested `coord` object. Unknown fields in the input are
/// tolerated and dropped; missing required fields fail deserialisation.
///
/// # Examples
/// ```
/// use placepack_core::PlacementRecord;
///
/// let line = r#"{"id":1,"cityId":1,"name":"A","number":1,"countryId":9,
///                "coord":{"tileX":0,"tileY":5},"extra":true}"#;
/// let record: PlacementRecord = serde_json::from_str(line)?;
/// assert_eq!(record.coord.tile_y, 5);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    /// Place identifier, unique per tile run before grouping.
    pub id: i64,
    /// City the placement belongs to.
    #[serde(rename = "cityId")]
    pub city_id: i64,
    /// Group label.
    pub name: String,
    /// Sequential number tied to `id`.
    pub number: i64,
    /// Country the placement belongs to.
    #[serde(rename = "countryId")]
    pub country_id: i64,
    /// Tile position.
    pub coord: TileCoord,
}

impl PlacementRecord {
    /// The canonical sort key `(cityId, countryId, name, tileY, tileX, id, number)`.
    ///
    /// Decoder output sorted by this key is independent of blob order and
    /// tier choice.
    #[must_use]
    pub fn canonical_key(&self) -> (i64, i64, &str, i64, i64, i64, i64) {
        (
            self.city_id,
            self.country_id,
            self.name.as_str(),
            self.coord.tile_y,
            self.coord.tile_x,
            self.id,
            self.number,
        )
    }
}

/// Sort records into the canonical order.
pub fn sort_canonical(records: &mut [PlacementRecord]) {
    records.sort_by(|a, b| a.canonical_key().cmp(&b.canonical_key()));
}
