//! Story-level input supplied by the author.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Character;
use crate::lenient::null_as_default;

/// Influence category (e.g. "books", "films") -> titles, in the author's order.
pub type Influences = IndexMap<String, Vec<String>>;

/// The author's story input as stored on the project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryInput {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub logline: String,
    #[serde(deserialize_with = "null_as_default")]
    pub characters: Vec<Character>,
    #[serde(deserialize_with = "null_as_default")]
    pub tone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub genre: String,
    /// Target number of scenes for the whole story.
    #[serde(deserialize_with = "null_as_default")]
    pub total_scenes: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub influences: Influences,
}

impl StoryInput {
    /// Create a story input with a title and logline.
    pub fn new(title: impl Into<String>, logline: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            logline: logline.into(),
            ..Self::default()
        }
    }

    /// Add a character.
    pub fn with_character(mut self, character: Character) -> Self {
        self.characters.push(character);
        self
    }

    /// Set tone and genre.
    pub fn with_tone_and_genre(mut self, tone: impl Into<String>, genre: impl Into<String>) -> Self {
        self.tone = tone.into();
        self.genre = genre.into();
        self
    }

    /// Set the target scene count.
    pub fn with_total_scenes(mut self, total_scenes: u32) -> Self {
        self.total_scenes = total_scenes;
        self
    }

    /// Add an influence under a category.
    pub fn with_influence(mut self, category: impl Into<String>, title: impl Into<String>) -> Self {
        self.influences
            .entry(category.into())
            .or_default()
            .push(title.into());
        self
    }
}

/// Richer project-level data maintained outside the story input.
///
/// Present fields take precedence over the story input's equivalents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectProfile {
    pub characters: Option<Vec<Character>>,
    pub influences: Option<Influences>,
}

impl ProjectProfile {
    /// Characters from the profile if present, otherwise from the story input.
    pub fn characters_or<'a>(&'a self, input: &'a StoryInput) -> &'a [Character] {
        self.characters.as_deref().unwrap_or(input.characters.as_slice())
    }

    /// Influences from the profile if present, otherwise from the story input.
    pub fn influences_or<'a>(&'a self, input: &'a StoryInput) -> &'a Influences {
        self.influences.as_ref().unwrap_or(&input.influences)
    }
}
