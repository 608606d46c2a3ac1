//! Plot point storage shapes and their normalization.
//!
//! Older projects stored a unit's plot points as a sparse map keyed by numeric
//! strings (`{"0": "...", "1": "..."}`); newer ones store an ordered list. Both are
//! accepted here and turned into a list, so nothing past this boundary branches on
//! the stored shape. Each unit is decoded on its own: a unit stored in neither shape
//! reads as empty without affecting the others.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::cmp::Ordering;

/// Unit key -> ordered plot points.
pub type PlotPointsByUnit = IndexMap<String, Vec<String>>;

/// A unit's plot points in any stored shape.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredPlotPoints {
    List(Vec<String>),
    Legacy(IndexMap<String, String>),
    /// `null`, a scalar, or anything else that holds no plot points.
    Unrecognized,
}

impl StoredPlotPoints {
    /// Classify a stored value. Entries that are not strings are dropped.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => StoredPlotPoints::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::Object(entries) => StoredPlotPoints::Legacy(
                entries
                    .into_iter()
                    .filter_map(|(key, item)| match item {
                        Value::String(text) => Some((key, text)),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => StoredPlotPoints::Unrecognized,
        }
    }

    /// Normalize into an ordered list.
    ///
    /// Legacy entries are sorted by numeric key; keys that are not numbers sort after
    /// all numeric keys, lexically.
    pub fn into_list(self) -> Vec<String> {
        match self {
            StoredPlotPoints::List(list) => list,
            StoredPlotPoints::Legacy(map) => {
                let mut entries: Vec<_> = map.into_iter().collect();
                entries.sort_by(|(a, _), (b, _)| compare_legacy_keys(a, b));
                entries.into_iter().map(|(_, text)| text).collect()
            }
            StoredPlotPoints::Unrecognized => Vec::new(),
        }
    }
}

impl From<StoredPlotPoints> for Vec<String> {
    fn from(stored: StoredPlotPoints) -> Self {
        stored.into_list()
    }
}

fn compare_legacy_keys(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Deserialize a unit -> plot points map, normalizing every value to list form.
///
/// Units stored in no recognized shape (including `null`) read as an empty list. A
/// `plotPoints` value that is not a map at all reads as no units.
pub fn deserialize_plot_points_by_unit<'de, D>(deserializer: D) -> Result<PlotPointsByUnit, D::Error>
where
    D: Deserializer<'de>,
{
    let units = match Value::deserialize(deserializer)? {
        Value::Object(units) => units,
        _ => return Ok(PlotPointsByUnit::new()),
    };

    Ok(units
        .into_iter()
        .map(|(unit, stored)| (unit, StoredPlotPoints::from_value(stored).into_list()))
        .collect())
}
