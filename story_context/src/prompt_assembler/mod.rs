//! Prompt Assembler - renders a context chain into one generation directive.
//!
//! Sections render in level order:
//! 1. **Story** - story-wide facts
//! 2. **Structure** - template and unit order
//! 3. **Story so far** - causal history from earlier acts
//! 4. **Act focus** - the unit being generated
//! 5. **Scene focus** - the scene being generated
//! 6. **Additional instructions** - caller-supplied text
//!
//! Models weigh later instructions more heavily, so when generating plot points
//! (target level 4) the act focus moves up to sit right after the story section,
//! flagged as taking precedence. Otherwise plot points drift toward the logline
//! instead of the act's own description.

mod sections;

pub use sections::{
    ACT_FOCUS_HEADING, ACT_PRECEDENCE_NOTE, CAUSAL_HISTORY_HEADING, CUSTOM_INSTRUCTIONS_HEADING,
    LAST_PLOT_POINT_MARKER, SCENE_FOCUS_HEADING, STORY_HEADING, STRUCTURE_HEADING,
};

use crate::chain::{ContextChain, ContextLevel};
use crate::error::ContextError;

/// Renders [`ContextChain`]s into directive strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptAssembler;

impl PromptAssembler {
    /// Create an assembler.
    pub fn new() -> Self {
        Self
    }

    /// Render the chain up to and including `target_level`.
    ///
    /// Levels without an active context are skipped; levels above the target never
    /// render.
    pub fn assemble(
        &self,
        chain: &ContextChain,
        target_level: ContextLevel,
        custom_instructions: &str,
    ) -> String {
        let act_first = target_level == ContextLevel::PlotPoints;
        let plot_points = chain
            .plot_points()
            .filter(|_| target_level >= ContextLevel::PlotPoints);

        let act_focus = chain
            .act()
            .filter(|_| target_level >= ContextLevel::Act)
            .map(|act| sections::act_focus(act, plot_points, act_first));

        let mut rendered: Vec<String> = Vec::new();

        if let Some(story) = chain.story() {
            rendered.push(sections::story(story));
        }

        if act_first {
            rendered.extend(act_focus.clone());
        }

        if let Some(structure) = chain
            .structure()
            .filter(|_| target_level >= ContextLevel::Structure)
        {
            rendered.push(sections::structure(structure));
        }

        if let Some(plot_points) = plot_points.filter(|p| !p.causal_history.is_empty()) {
            rendered.push(sections::causal_history(&plot_points.causal_history));
        }

        if !act_first {
            rendered.extend(act_focus);
        }

        if let Some(scene) = chain.scene().filter(|_| target_level >= ContextLevel::Scene) {
            rendered.push(sections::scene_focus(scene, plot_points));
        }

        if !custom_instructions.trim().is_empty() {
            rendered.push(sections::custom_instructions(custom_instructions));
        }

        rendered.join("\n\n")
    }

    /// [`assemble`](Self::assemble) with a numeric target level (1-5).
    pub fn assemble_level(
        &self,
        chain: &ContextChain,
        target_level: u8,
        custom_instructions: &str,
    ) -> Result<String, ContextError> {
        let level = ContextLevel::try_from(target_level)?;
        Ok(self.assemble(chain, level, custom_instructions))
    }

    /// The system message supplied with the story context, if any.
    ///
    /// It is not part of the directive; callers send it through the generator's
    /// system channel.
    pub fn system_message<'a>(&self, chain: &'a ContextChain) -> Option<&'a str> {
        chain.story().and_then(|story| story.system_message.as_deref())
    }
}
