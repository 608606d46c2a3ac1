//! Character definitions.

use serde::{Deserialize, Serialize};

use crate::lenient::null_as_default;

/// Prefix of the placeholder description given to characters nobody described.
const GENERIC_DESCRIPTION_PREFIX: &str = "Main character: ";

/// A named character of the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Character {
    /// Create a new character with the given name and no description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check whether the description carries no information of its own.
    ///
    /// Blank descriptions and the exact placeholder `"Main character: <name>"` are
    /// generic. The placeholder is compared verbatim; padded variants are kept.
    pub fn is_generic_description(&self) -> bool {
        match self.description.as_deref() {
            None => true,
            Some(description) if description.trim().is_empty() => true,
            Some(description) => description
                .strip_prefix(GENERIC_DESCRIPTION_PREFIX)
                .is_some_and(|rest| rest == self.name),
        }
    }

    /// Render the character as `"Name (Description)"`, or the bare name when the
    /// description is generic.
    pub fn display(&self) -> String {
        match &self.description {
            Some(description) if !self.is_generic_description() => {
                format!("{} ({})", self.name, description.trim())
            }
            _ => self.name.clone(),
        }
    }
}

/// Flatten a character list into its display form, one entry per character.
pub fn character_display(characters: &[Character]) -> Vec<String> {
    characters
        .iter()
        .filter(|c| !c.name.trim().is_empty())
        .map(Character::display)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_description_suppressed() {
        let ava = Character::new("Ava").with_description("Main character: Ava");
        assert!(ava.is_generic_description());
        assert_eq!(ava.display(), "Ava");
    }

    #[test]
    fn test_specific_description_rendered() {
        let ava = Character::new("Ava").with_description("A reluctant pilot");
        assert!(!ava.is_generic_description());
        assert_eq!(ava.display(), "Ava (A reluctant pilot)");
    }

    #[test]
    fn test_placeholder_for_other_name_is_kept() {
        let ava = Character::new("Ava").with_description("Main character: Bo");
        assert_eq!(ava.display(), "Ava (Main character: Bo)");
    }

    #[test]
    fn test_padded_placeholder_is_not_generic() {
        let ava = Character::new("Ava").with_description("  Main character: Ava ");
        assert!(!ava.is_generic_description());
        assert_eq!(ava.display(), "Ava (Main character: Ava)");
    }

    #[test]
    fn test_missing_or_blank_description() {
        assert_eq!(Character::new("Ava").display(), "Ava");
        assert_eq!(Character::new("Ava").with_description("   ").display(), "Ava");
    }

    #[test]
    fn test_character_display_skips_unnamed() {
        let characters = vec![
            Character::new("Ava").with_description("A reluctant pilot"),
            Character::new(""),
            Character::new("Bo"),
        ];
        assert_eq!(
            character_display(&characters),
            vec!["Ava (A reluctant pilot)".to_string(), "Bo".to_string()]
        );
    }
}
