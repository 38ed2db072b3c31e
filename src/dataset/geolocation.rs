use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One raw geolocation row: a zip-code prefix and its coordinates in
/// decimal degrees. The raw table carries many rows per prefix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Geolocation {
    #[serde(rename = "geolocation_zip_code_prefix")]
    pub(crate) zip_code_prefix: String,
    #[serde(rename = "geolocation_lat")]
    pub(crate) latitude: f64,
    #[serde(rename = "geolocation_lng")]
    pub(crate) longitude: f64,
}

/// The deduplicated geolocation table: exactly one row per zip-code prefix,
/// the first occurrence in source order, plus a lookup index for joins.
pub(crate) struct GeoTable {
    rows: Vec<Geolocation>,
    index: HashMap<String, usize>,
}

impl GeoTable {
    /// Deduplicate by zip prefix, keeping the first occurrence and the
    /// source order of the survivors. Later duplicates are dropped silently.
    pub(crate) fn from_rows(raw: Vec<Geolocation>) -> GeoTable {
        let mut rows: Vec<Geolocation> = Vec::new();
        let mut index = HashMap::new();
        for row in raw {
            match index.entry(row.zip_code_prefix.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(rows.len());
                    rows.push(row);
                }
                Entry::Occupied(_) => {}
            }
        }
        GeoTable { rows, index }
    }

    /// Coordinates for a zip prefix, or `None` if the prefix never appeared
    /// in the geolocation table.
    pub(crate) fn coordinates(&self, zip_code_prefix: &str) -> Option<(f64, f64)> {
        self.index
            .get(zip_code_prefix)
            .map(|&i| (self.rows[i].latitude, self.rows[i].longitude))
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub(crate) fn rows(&self) -> &[Geolocation] {
        &self.rows
    }
}

/// Read the raw geolocation table. Dedup happens in [`GeoTable::from_rows`],
/// not here.
pub(crate) fn read_geolocations(path: &Path) -> Result<Vec<Geolocation>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for (index, row) in reader.deserialize::<Geolocation>().enumerate() {
        let row = row.with_context(|| format!("malformed geolocation row at line {}", index + 2))?;
        rows.push(row);
    }
    Ok(rows)
}
