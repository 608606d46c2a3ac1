//! The five context levels and their payloads.

use serde::{Deserialize, Serialize};
use story_bible::{Influences, TemplateDescriptor, UnitDescriptor};

use crate::causality::CausalEntry;
use crate::error::ContextError;
use crate::order_resolver::OrderConfidence;

/// Position of a context in the chain. Each level requires the one below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContextLevel {
    Story = 1,
    Structure = 2,
    Act = 3,
    PlotPoints = 4,
    Scene = 5,
}

impl ContextLevel {
    /// All levels, lowest first.
    pub const ALL: [ContextLevel; 5] = [
        ContextLevel::Story,
        ContextLevel::Structure,
        ContextLevel::Act,
        ContextLevel::PlotPoints,
        ContextLevel::Scene,
    ];

    /// The 1-based level number.
    pub fn number(self) -> u8 {
        self as u8
    }

    /// 0-based slot index.
    pub(crate) fn index(self) -> usize {
        self as usize - 1
    }

    /// The level this one is built on, if any.
    pub fn precursor(self) -> Option<ContextLevel> {
        match self {
            ContextLevel::Story => None,
            ContextLevel::Structure => Some(ContextLevel::Story),
            ContextLevel::Act => Some(ContextLevel::Structure),
            ContextLevel::PlotPoints => Some(ContextLevel::Act),
            ContextLevel::Scene => Some(ContextLevel::PlotPoints),
        }
    }

    /// Levels strictly above this one, lowest first.
    pub fn above(self) -> impl Iterator<Item = ContextLevel> {
        Self::ALL.into_iter().filter(move |level| *level > self)
    }
}

impl TryFrom<u8> for ContextLevel {
    type Error = ContextError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|level| level.number() == value)
            .ok_or(ContextError::InvalidLevel(value))
    }
}

impl std::fmt::Display for ContextLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContextLevel::Story => "story",
            ContextLevel::Structure => "structure",
            ContextLevel::Act => "act",
            ContextLevel::PlotPoints => "plot points",
            ContextLevel::Scene => "scene",
        };
        f.write_str(name)
    }
}

/// Story-level facts carried into every generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryContext {
    pub title: String,
    pub logline: String,
    /// Characters flattened to `"Name (Description)"` / `"Name"`.
    pub characters: Vec<String>,
    pub tone: String,
    pub genre: String,
    pub total_scenes: u32,
    pub influences: Influences,
    pub original_prompt: Option<String>,
    pub system_message: Option<String>,
}

/// The template in use and the chronological order of its units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureContext {
    pub template: TemplateDescriptor,
    /// Unit keys in chronological order.
    pub ordered_keys: Vec<String>,
    pub total_units: usize,
    pub order_confidence: OrderConfidence,
}

impl StructureContext {
    /// Descriptor of a unit.
    pub fn unit(&self, key: &str) -> Option<&UnitDescriptor> {
        self.template.structure.get(key)
    }

    /// 1-based chronological position of a unit.
    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.ordered_keys.iter().position(|k| k == key).map(|i| i + 1)
    }

    /// Display name of a unit, falling back to its key.
    pub fn unit_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.unit(key).map(|u| u.display_name(key)).unwrap_or(key)
    }
}

/// The structural unit currently being worked on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActContext {
    pub key: String,
    pub name: String,
    pub description: String,
    pub character_development: Option<String>,
    pub user_directions: Option<String>,
    /// 1-based chronological position.
    pub position: usize,
    pub total_units: usize,
}

/// Plot points of the current act plus everything that happened before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPointsContext {
    pub plot_points: Vec<String>,
    pub count: usize,
    /// Scene budget for the whole story.
    pub target_scenes: u32,
    pub scenes_per_plot_point: u32,
    pub distribution_note: String,
    /// Plot points of chronologically earlier acts, in story order.
    pub causal_history: Vec<CausalEntry>,
    pub has_causal_history: bool,
}

/// The scene currently being generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneContext {
    pub scene_index: usize,
    /// 1-based position within the act.
    pub position: usize,
    pub total_scenes_in_act: usize,
    pub plot_point_index: Option<usize>,
    pub plot_point: Option<String>,
    pub existing_scene: Option<serde_json::Value>,
    pub title: String,
}

/// Level-specific data held by a context node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContextPayload {
    Story(StoryContext),
    Structure(StructureContext),
    Act(ActContext),
    PlotPoints(PlotPointsContext),
    Scene(SceneContext),
}

impl ContextPayload {
    /// The level this payload lives at.
    pub fn level(&self) -> ContextLevel {
        match self {
            ContextPayload::Story(_) => ContextLevel::Story,
            ContextPayload::Structure(_) => ContextLevel::Structure,
            ContextPayload::Act(_) => ContextLevel::Act,
            ContextPayload::PlotPoints(_) => ContextLevel::PlotPoints,
            ContextPayload::Scene(_) => ContextLevel::Scene,
        }
    }

    /// Short kind label.
    pub fn kind(&self) -> &'static str {
        match self {
            ContextPayload::Story(_) => "story",
            ContextPayload::Structure(_) => "structure",
            ContextPayload::Act(_) => "act",
            ContextPayload::PlotPoints(_) => "plot_points",
            ContextPayload::Scene(_) => "scene",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_numbers_round_trip() {
        for level in ContextLevel::ALL {
            assert_eq!(ContextLevel::try_from(level.number()).unwrap(), level);
        }
        assert!(matches!(
            ContextLevel::try_from(0),
            Err(ContextError::InvalidLevel(0))
        ));
        assert!(matches!(
            ContextLevel::try_from(6),
            Err(ContextError::InvalidLevel(6))
        ));
    }

    #[test]
    fn test_precursors() {
        assert_eq!(ContextLevel::Story.precursor(), None);
        assert_eq!(ContextLevel::Scene.precursor(), Some(ContextLevel::PlotPoints));
        let above: Vec<_> = ContextLevel::Act.above().collect();
        assert_eq!(above, vec![ContextLevel::PlotPoints, ContextLevel::Scene]);
    }

    #[test]
    fn test_structure_lookup() {
        let structure = StructureContext {
            template: TemplateDescriptor::new("Three-Act")
                .with_unit("setup", UnitDescriptor::new("Setup", "Meet Ava"))
                .with_unit("resolution", UnitDescriptor::new("", "End")),
            ordered_keys: vec!["setup".into(), "resolution".into()],
            total_units: 2,
            order_confidence: OrderConfidence::Fragment,
        };

        assert_eq!(structure.position_of("resolution"), Some(2));
        assert_eq!(structure.position_of("missing"), None);
        assert_eq!(structure.unit_name("setup"), "Setup");
        assert_eq!(structure.unit_name("resolution"), "resolution");
    }
}
