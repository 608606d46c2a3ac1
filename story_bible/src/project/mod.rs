//! The persisted project record, as read back from storage.

mod plot_points;

pub use plot_points::*;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::entities::StoryInput;
use crate::lenient::default_on_mismatch;
use crate::template::{StructureMap, TemplateDescriptor, UnitDescriptor};

/// Errors raised while ingesting a stored project record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to decode project record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The fields of a stored project that the context engine reads.
///
/// Plot points are normalized to ordered lists on ingestion, whichever shape they
/// were stored in. Fields that fail to decode read as empty, so one bad field never
/// hides the plot points of every unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectRecord {
    #[serde(deserialize_with = "default_on_mismatch")]
    pub story_input: StoryInput,

    /// Structure generated for this project (unit key -> descriptor). Units that fail
    /// to decode are left out.
    #[serde(deserialize_with = "deserialize_structure_skipping_invalid")]
    pub generated_structure: StructureMap,

    /// The template the project was created from.
    #[serde(deserialize_with = "default_on_mismatch")]
    pub template_data: TemplateDescriptor,

    /// Generated plot points per unit key.
    #[serde(deserialize_with = "deserialize_plot_points_by_unit")]
    pub plot_points: PlotPointsByUnit,
}

impl ProjectRecord {
    /// Decode a record from its stored JSON form.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a record from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Plot points stored for a unit, empty when the unit has none yet.
    pub fn plot_points_for(&self, unit_key: &str) -> &[String] {
        self.plot_points
            .get(unit_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replace the plot points of a unit.
    pub fn set_plot_points(&mut self, unit_key: impl Into<String>, plot_points: Vec<String>) {
        self.plot_points.insert(unit_key.into(), plot_points);
    }

    /// Display name of a unit: generated structure first, then the template, then the key.
    pub fn unit_name<'a>(&'a self, unit_key: &'a str) -> &'a str {
        self.generated_structure
            .get(unit_key)
            .filter(|u| !u.name.trim().is_empty())
            .or_else(|| self.template_data.structure.get(unit_key))
            .map(|u| u.display_name(unit_key))
            .unwrap_or(unit_key)
    }
}

fn deserialize_structure_skipping_invalid<'de, D>(deserializer: D) -> Result<StructureMap, D::Error>
where
    D: Deserializer<'de>,
{
    let units = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Object(units) => units,
        _ => return Ok(StructureMap::new()),
    };

    Ok(units
        .into_iter()
        .filter_map(|(key, unit)| {
            serde_json::from_value::<UnitDescriptor>(unit)
                .ok()
                .map(|unit| (key, unit))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_json_normalizes_both_shapes() {
        let record = ProjectRecord::from_json(
            r#"{
                "storyInput": {"title": "Skyward", "totalScenes": 40},
                "generatedStructure": {},
                "templateData": {"name": "Three-Act Structure", "structure": {}},
                "plotPoints": {
                    "setup": ["a", "b", "c"],
                    "confrontation": {"1": "y", "0": "x"}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(record.story_input.title, "Skyward");
        assert_eq!(record.plot_points_for("setup"), ["a", "b", "c"]);
        assert_eq!(record.plot_points_for("confrontation"), ["x", "y"]);
        assert!(record.plot_points_for("resolution").is_empty());
    }

    #[test]
    fn test_record_tolerates_null_and_malformed_fields() {
        let record = ProjectRecord::from_json(
            r#"{
                "storyInput": {"title": "Skyward", "totalScenes": null},
                "generatedStructure": {
                    "setup": {"name": "Setup", "description": null},
                    "confrontation": {"name": 42}
                },
                "templateData": "three-act",
                "plotPoints": {
                    "setup": ["a", "b"],
                    "confrontation": "pending"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(record.story_input.title, "Skyward");
        assert_eq!(record.story_input.total_scenes, 0);
        assert_eq!(record.unit_name("setup"), "Setup");
        assert_eq!(record.unit_name("confrontation"), "confrontation");
        assert!(record.template_data.structure.is_empty());
        assert_eq!(record.plot_points_for("setup"), ["a", "b"]);
        assert!(record.plot_points_for("confrontation").is_empty());
    }

    #[test]
    fn test_unreadable_story_input_reads_as_default() {
        let record = ProjectRecord::from_json(
            r#"{"storyInput": {"totalScenes": "seventy"}, "plotPoints": {"setup": ["a"]}}"#,
        )
        .unwrap();

        assert_eq!(record.story_input, StoryInput::default());
        assert_eq!(record.plot_points_for("setup"), ["a"]);
    }

    #[test]
    fn test_record_decode_error() {
        let err = ProjectRecord::from_json("{ not json").unwrap_err();
        assert!(matches!(err, RecordError::Decode(_)));
    }

    #[test]
    fn test_unit_name_precedence() {
        let mut record = ProjectRecord::default();
        record
            .template_data
            .structure
            .insert("setup".into(), UnitDescriptor::new("Template Setup", ""));
        assert_eq!(record.unit_name("setup"), "Template Setup");

        record
            .generated_structure
            .insert("setup".into(), UnitDescriptor::new("The Ordinary World", ""));
        assert_eq!(record.unit_name("setup"), "The Ordinary World");

        assert_eq!(record.unit_name("unknown"), "unknown");
    }
}
