//! Rendering of the individual directive sections.

use crate::causality::CausalEntry;
use crate::chain::{ActContext, PlotPointsContext, SceneContext, StoryContext, StructureContext};

pub const STORY_HEADING: &str = "## STORY";
pub const STRUCTURE_HEADING: &str = "## STRUCTURE";
pub const CAUSAL_HISTORY_HEADING: &str = "## STORY SO FAR";
pub const ACT_FOCUS_HEADING: &str = "## CURRENT ACT FOCUS";
pub const SCENE_FOCUS_HEADING: &str = "## SCENE FOCUS";
pub const CUSTOM_INSTRUCTIONS_HEADING: &str = "## ADDITIONAL INSTRUCTIONS";

/// Appended to the final plot point of the causal history.
pub const LAST_PLOT_POINT_MARKER: &str =
    "[LAST PLOT POINT OVERALL: the current act continues directly from this event]";

/// Placed at the top of the act focus when it is moved ahead of the story details.
pub const ACT_PRECEDENCE_NOTE: &str = "This act's description takes precedence over the general story details. \
Every plot point must serve this act, not the logline as a whole.";

pub(crate) fn story(story: &StoryContext) -> String {
    let mut lines = vec![STORY_HEADING.to_string()];
    push_field(&mut lines, "Title", &story.title);
    push_field(&mut lines, "Logline", &story.logline);
    push_field(&mut lines, "Genre", &story.genre);
    push_field(&mut lines, "Tone", &story.tone);

    if !story.characters.is_empty() {
        lines.push(format!("Characters: {}", story.characters.join(", ")));
    }

    let influences: Vec<String> = story
        .influences
        .iter()
        .filter(|(_, titles)| !titles.is_empty())
        .map(|(category, titles)| format!("{}: {}", category, titles.join(", ")))
        .collect();
    if !influences.is_empty() {
        lines.push(format!("Influences: {}", influences.join("; ")));
    }

    if story.total_scenes > 0 {
        lines.push(format!("Target length: {} scenes", story.total_scenes));
    }
    if let Some(prompt) = &story.original_prompt {
        lines.push(format!("Original concept: {}", prompt));
    }

    lines.join("\n")
}

pub(crate) fn structure(structure: &StructureContext) -> String {
    let mut lines = vec![
        STRUCTURE_HEADING.to_string(),
        format!(
            "Template: {} ({} acts)",
            structure.template.name, structure.total_units
        ),
    ];
    for (i, key) in structure.ordered_keys.iter().enumerate() {
        let name = structure.unit_name(key);
        match structure.unit(key).map(|u| u.description.trim()) {
            Some(description) if !description.is_empty() => {
                lines.push(format!("{}. {}: {}", i + 1, name, description))
            }
            _ => lines.push(format!("{}. {}", i + 1, name)),
        }
    }
    lines.join("\n")
}

/// Entries grouped by act, preserving order; the act name is printed once per group.
pub(crate) fn causal_history(entries: &[CausalEntry]) -> String {
    let mut lines = vec![
        CAUSAL_HISTORY_HEADING.to_string(),
        "Events already established in earlier acts, in story order:".to_string(),
    ];

    let mut current_act: Option<&str> = None;
    for entry in entries {
        if current_act != Some(entry.act_key.as_str()) {
            lines.push(format!("{}:", entry.act_name));
            current_act = Some(entry.act_key.as_str());
        }
        if entry.is_last_overall {
            lines.push(format!("- {} {}", entry.text, LAST_PLOT_POINT_MARKER));
        } else {
            lines.push(format!("- {}", entry.text));
        }
    }

    lines.join("\n")
}

pub(crate) fn act_focus(
    act: &ActContext,
    plot_points: Option<&PlotPointsContext>,
    with_precedence: bool,
) -> String {
    let mut lines = vec![ACT_FOCUS_HEADING.to_string()];
    if with_precedence {
        lines.push(ACT_PRECEDENCE_NOTE.to_string());
    }

    lines.push(format!(
        "Act {} of {}: {}",
        act.position, act.total_units, act.name
    ));
    push_field(&mut lines, "Description", &act.description);
    if let Some(note) = &act.character_development {
        push_field(&mut lines, "Character development", note);
    }
    if let Some(directions) = &act.user_directions {
        push_field(&mut lines, "Author directions", directions);
    }
    if let Some(plot_points) = plot_points {
        push_field(&mut lines, "Scene budget", &plot_points.distribution_note);
    }

    lines.join("\n")
}

pub(crate) fn scene_focus(scene: &SceneContext, plot_points: Option<&PlotPointsContext>) -> String {
    let mut lines = vec![
        SCENE_FOCUS_HEADING.to_string(),
        format!(
            "Scene {} of {} in this act: {}",
            scene.position, scene.total_scenes_in_act, scene.title
        ),
    ];

    if let Some(plot_point) = &scene.plot_point {
        lines.push(format!("This scene dramatizes: {}", plot_point));
    }

    if let Some(plot_points) = plot_points.filter(|p| !p.plot_points.is_empty()) {
        lines.push("Plot points of this act:".to_string());
        for (i, text) in plot_points.plot_points.iter().enumerate() {
            let current = if scene.plot_point_index == Some(i) {
                " (current)"
            } else {
                ""
            };
            lines.push(format!("{}. {}{}", i + 1, text, current));
        }
    }

    if let Some(existing) = &scene.existing_scene {
        let rendered = serde_json::to_string_pretty(existing).unwrap_or_else(|_| existing.to_string());
        lines.push("Existing scene data:".to_string());
        lines.push(rendered);
    }

    lines.join("\n")
}

pub(crate) fn custom_instructions(instructions: &str) -> String {
    format!("{}\n{}", CUSTOM_INSTRUCTIONS_HEADING, instructions.trim())
}

fn push_field(lines: &mut Vec<String>, label: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        lines.push(format!("{}: {}", label, value));
    }
}
