//! Registry of canonical chronological unit orders for known templates.

use serde::{Deserialize, Serialize};

/// Canonical chronological unit order of one known template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOrder {
    /// Stable template identifier.
    pub id: String,

    /// Display-name fragments that identify the template when no id is available.
    #[serde(default)]
    pub fragments: Vec<String>,

    /// Unit keys in chronological order.
    pub order: Vec<String>,
}

impl TemplateOrder {
    /// Create a registry entry.
    pub fn new<I, F, O>(id: I, fragments: F, order: O) -> Self
    where
        I: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            id: id.into(),
            fragments: fragments.into_iter().map(Into::into).collect(),
            order: order.into_iter().map(Into::into).collect(),
        }
    }
}

/// How to choose between several templates whose fragments match one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The earliest registered template wins.
    #[default]
    FirstRegistered,
    /// The template with the longest matching fragment wins; equal lengths fall back
    /// to registration order.
    LongestFragment,
}

/// Normalize a template display name for fragment matching: lowercase, then drop
/// everything outside `[a-z-]`.
pub fn normalize_template_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == '-')
        .collect()
}

/// Ordered collection of [`TemplateOrder`] entries.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    entries: Vec<TemplateOrder>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in template orders.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for entry in builtin_orders() {
            registry.register(entry);
        }
        registry
    }

    /// Register an entry. An entry with an already registered id replaces it in place.
    pub fn register(&mut self, entry: TemplateOrder) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Look an entry up by its stable id.
    pub fn get(&self, id: &str) -> Option<&TemplateOrder> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Iterate over entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TemplateOrder> {
        self.entries.iter()
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry whose fragments match a display name.
    ///
    /// A fragment matches when the normalized name contains it or it contains the
    /// normalized name. An empty normalized name matches nothing.
    pub fn find_by_name(&self, name: &str, tie_break: TieBreak) -> Option<&TemplateOrder> {
        let normalized = normalize_template_name(name);
        if normalized.is_empty() {
            return None;
        }

        let mut best: Option<(&TemplateOrder, usize)> = None;
        for entry in &self.entries {
            let Some(length) = longest_matching_fragment(entry, &normalized) else {
                continue;
            };
            match tie_break {
                TieBreak::FirstRegistered => return Some(entry),
                TieBreak::LongestFragment => {
                    if best.map_or(true, |(_, best_length)| length > best_length) {
                        best = Some((entry, length));
                    }
                }
            }
        }

        best.map(|(entry, _)| entry)
    }
}

fn longest_matching_fragment(entry: &TemplateOrder, normalized: &str) -> Option<usize> {
    entry
        .fragments
        .iter()
        .map(|f| normalize_template_name(f))
        .filter(|f| !f.is_empty() && (normalized.contains(f.as_str()) || f.contains(normalized)))
        .map(|f| f.len())
        .max()
}

/// Canonical orders for the templates shipped with the engine.
pub fn builtin_orders() -> Vec<TemplateOrder> {
    vec![
        TemplateOrder::new(
            "three_act",
            ["three-act", "threeact"],
            ["setup", "confrontation", "resolution"],
        ),
        TemplateOrder::new(
            "five_act",
            ["five-act", "fiveact", "freytag"],
            [
                "exposition",
                "rising_action",
                "climax",
                "falling_action",
                "denouement",
            ],
        ),
        TemplateOrder::new(
            "heros_journey",
            ["herosjourney", "heros-journey", "herojourney", "hero-journey"],
            [
                "ordinary_world",
                "call_to_adventure",
                "refusal_of_the_call",
                "meeting_the_mentor",
                "crossing_the_threshold",
                "tests_allies_enemies",
                "approach_to_inmost_cave",
                "ordeal",
                "reward",
                "the_road_back",
                "resurrection",
                "return_with_elixir",
            ],
        ),
        TemplateOrder::new(
            "save_the_cat",
            ["savethecat", "save-the-cat"],
            [
                "opening_image",
                "theme_stated",
                "setup",
                "catalyst",
                "debate",
                "break_into_two",
                "b_story",
                "fun_and_games",
                "midpoint",
                "bad_guys_close_in",
                "all_is_lost",
                "dark_night_of_the_soul",
                "break_into_three",
                "finale",
                "final_image",
            ],
        ),
        TemplateOrder::new(
            "seven_point",
            ["sevenpoint", "seven-point"],
            [
                "hook",
                "plot_turn_1",
                "pinch_1",
                "midpoint",
                "pinch_2",
                "plot_turn_2",
                "resolution",
            ],
        ),
        TemplateOrder::new(
            "kishotenketsu",
            ["kishotenketsu", "kishtenketsu"],
            ["ki", "sho", "ten", "ketsu"],
        ),
    ]
}
