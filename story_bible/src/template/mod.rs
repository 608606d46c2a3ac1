//! Structure templates: named, reusable definitions of structural units.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::lenient::null_as_default;

/// Unit key -> descriptor, in the order the map was stored.
///
/// The stored order is not trusted as chronological; it is only the fallback when a
/// template has no registered canonical order.
pub type StructureMap = IndexMap<String, UnitDescriptor>;

/// Description of one structural unit ("act") of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(
        default,
        alias = "characterDevelopment",
        skip_serializing_if = "Option::is_none"
    )]
    pub character_development: Option<String>,
    /// Free-text directions the author attached to this unit.
    #[serde(
        default,
        rename = "userDirections",
        alias = "user_directions",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_directions: Option<String>,
}

impl UnitDescriptor {
    /// Create a descriptor with a name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            character_development: None,
            user_directions: None,
        }
    }

    /// Set the character development note.
    pub fn with_character_development(mut self, note: impl Into<String>) -> Self {
        self.character_development = Some(note.into());
        self
    }

    /// Set the author's directions.
    pub fn with_user_directions(mut self, directions: impl Into<String>) -> Self {
        self.user_directions = Some(directions.into());
        self
    }

    /// The display name, falling back to the unit key when unnamed.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        if self.name.trim().is_empty() {
            key
        } else {
            &self.name
        }
    }
}

/// A template as selected for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    /// Stable template identifier, when the template came from a known catalogue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub structure: StructureMap,
}

impl TemplateDescriptor {
    /// Create a descriptor without a stable identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            structure: StructureMap::new(),
        }
    }

    /// Set the stable identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a unit to the structure.
    pub fn with_unit(mut self, key: impl Into<String>, unit: UnitDescriptor) -> Self {
        self.structure.insert(key.into(), unit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_json_preserves_native_order() {
        let template: TemplateDescriptor = serde_json::from_str(
            r#"{
                "name": "Custom Arc",
                "structure": {
                    "zeta": {"name": "Zeta", "description": "first"},
                    "alpha": {"name": "Alpha", "description": "second",
                              "character_development": "grows", "userDirections": "keep it tight"}
                }
            }"#,
        )
        .unwrap();

        let keys: Vec<_> = template.structure.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert!(template.id.is_none());

        let alpha = &template.structure["alpha"];
        assert_eq!(alpha.character_development.as_deref(), Some("grows"));
        assert_eq!(alpha.user_directions.as_deref(), Some("keep it tight"));
    }

    #[test]
    fn test_null_name_and_description_default() {
        let unit: UnitDescriptor =
            serde_json::from_str(r#"{"name": "Setup", "description": null}"#).unwrap();
        assert_eq!(unit.name, "Setup");
        assert!(unit.description.is_empty());

        let unit: UnitDescriptor = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(unit.display_name("setup"), "setup");
    }

    #[test]
    fn test_display_name_falls_back_to_key() {
        let unit = UnitDescriptor::new("", "no name");
        assert_eq!(unit.display_name("setup"), "setup");
        let unit = UnitDescriptor::new("Setup", "named");
        assert_eq!(unit.display_name("setup"), "Setup");
    }
}
