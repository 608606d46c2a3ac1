//! Context Builder - one operation per level, each requiring the level below.

use std::sync::Arc;
use story_bible::{
    character_display, ProjectProfile, StoryInput, StructureMap, TemplateDescriptor,
    UnitDescriptor,
};

use super::{
    ActContext, ContextChain, ContextLevel, ContextPayload, NodeId, PlotPointsContext,
    SceneContext, StoryContext, StructureContext,
};
use crate::causality::CausalitySource;
use crate::config::EngineConfig;
use crate::distribution::DistributionCalculator;
use crate::error::ContextError;
use crate::order_resolver::OrderResolver;

/// Builds a [`ContextChain`] level by level for one generation request.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    chain: ContextChain,
    resolver: Arc<OrderResolver>,
    distribution: DistributionCalculator,
}

impl ContextBuilder {
    /// Create a builder with an empty chain.
    pub fn new(resolver: Arc<OrderResolver>, distribution: DistributionCalculator) -> Self {
        Self {
            chain: ContextChain::new(),
            resolver,
            distribution,
        }
    }

    /// Create a builder from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(Arc::new(config.order_resolver()), config.distribution_calculator())
    }

    /// The chain built so far.
    pub fn chain(&self) -> &ContextChain {
        &self.chain
    }

    /// Take the chain out of the builder.
    pub fn into_chain(self) -> ContextChain {
        self.chain
    }

    /// The distribution calculator used for scene budgets.
    pub fn distribution(&self) -> &DistributionCalculator {
        &self.distribution
    }

    /// Build the story context.
    ///
    /// Characters and influences from `profile`, when present, replace the story
    /// input's own.
    pub fn build_story(
        &mut self,
        input: &StoryInput,
        original_prompt: Option<&str>,
        system_message: Option<&str>,
        profile: Option<&ProjectProfile>,
    ) -> Result<NodeId, ContextError> {
        let (characters, influences) = match profile {
            Some(profile) => (profile.characters_or(input), profile.influences_or(input)),
            None => (input.characters.as_slice(), &input.influences),
        };

        self.chain.push(ContextPayload::Story(StoryContext {
            title: input.title.clone(),
            logline: input.logline.clone(),
            characters: character_display(characters),
            tone: input.tone.clone(),
            genre: input.genre.clone(),
            total_scenes: input.total_scenes,
            influences: influences.clone(),
            original_prompt: non_blank(original_prompt),
            system_message: non_blank(system_message),
        }))
    }

    /// Build the structure context, resolving the chronological unit order.
    pub fn build_structure(
        &mut self,
        structure: &StructureMap,
        template: &TemplateDescriptor,
    ) -> Result<NodeId, ContextError> {
        self.chain.require(ContextLevel::Structure, ContextLevel::Story)?;

        let template = TemplateDescriptor {
            id: template.id.clone(),
            name: template.name.clone(),
            structure: structure.clone(),
        };
        let resolved = self.resolver.resolve_descriptor(&template);

        self.chain.push(ContextPayload::Structure(StructureContext {
            total_units: resolved.keys.len(),
            ordered_keys: resolved.keys,
            order_confidence: resolved.confidence,
            template,
        }))
    }

    /// Build the act context for a unit at a 1-based chronological position.
    pub fn build_act(
        &mut self,
        key: &str,
        act: &UnitDescriptor,
        position: usize,
    ) -> Result<NodeId, ContextError> {
        let total_units = self.structure(ContextLevel::Act)?.total_units;

        self.chain.push(ContextPayload::Act(ActContext {
            key: key.to_string(),
            name: act.display_name(key).to_string(),
            description: act.description.clone(),
            character_development: act.character_development.clone(),
            user_directions: act.user_directions.clone(),
            position,
            total_units,
        }))
    }

    /// Build the act context for a unit of the active structure, deriving its position.
    pub fn build_act_from_structure(&mut self, key: &str) -> Result<NodeId, ContextError> {
        let structure = self.structure(ContextLevel::Act)?;
        let (unit, position) = structure
            .unit(key)
            .zip(structure.position_of(key))
            .map(|(unit, position)| (unit.clone(), position))
            .ok_or_else(|| ContextError::UnknownUnit(key.to_string()))?;

        self.build_act(key, &unit, position)
    }

    /// Build the plot points context for the active act.
    ///
    /// `total_scenes_target` overrides the story's scene budget. When a causality
    /// source is given, the plot points of every earlier act are loaded from storage.
    pub async fn build_plot_points(
        &mut self,
        plot_points: Vec<String>,
        total_scenes_target: Option<u32>,
        causality: Option<CausalitySource<'_>>,
    ) -> Result<NodeId, ContextError> {
        let act_key = self.act(ContextLevel::PlotPoints)?.key.clone();
        let structure = self.structure(ContextLevel::PlotPoints)?;
        let total_units = structure.total_units;
        let target_scenes = match total_scenes_target {
            Some(target) => target,
            None => self.story(ContextLevel::PlotPoints)?.total_scenes,
        };

        let causal_history = match causality {
            Some(source) => {
                let order = structure.ordered_keys.clone();
                source
                    .loader
                    .load(source.project_id, &act_key, &order)
                    .await?
            }
            None => Vec::new(),
        };

        let count = plot_points.len();
        self.chain.push(ContextPayload::PlotPoints(PlotPointsContext {
            scenes_per_plot_point: self
                .distribution
                .scenes_per_plot_point(target_scenes, total_units),
            distribution_note: self.distribution.describe(target_scenes, total_units, count),
            plot_points,
            count,
            target_scenes,
            has_causal_history: !causal_history.is_empty(),
            causal_history,
        }))
    }

    /// Build the scene context.
    ///
    /// Without an explicit plot point index, the scene is assigned by the scene
    /// distribution of the active plot points context.
    pub fn build_scene(
        &mut self,
        scene_index: usize,
        plot_point_index: Option<usize>,
        existing_scene: Option<serde_json::Value>,
        total_scenes_in_act: usize,
    ) -> Result<NodeId, ContextError> {
        let plot_points = self.plot_points(ContextLevel::Scene)?;

        let plot_point_index = plot_point_index.or_else(|| {
            DistributionCalculator::plot_point_for_scene(
                scene_index,
                plot_points.scenes_per_plot_point,
                plot_points.count,
            )
        });
        let plot_point = plot_point_index.and_then(|i| plot_points.plot_points.get(i).cloned());

        let position = scene_index + 1;
        let title = existing_scene
            .as_ref()
            .and_then(|scene| scene.get("title"))
            .and_then(|title| title.as_str())
            .filter(|title| !title.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Scene {}", position));

        self.chain.push(ContextPayload::Scene(SceneContext {
            scene_index,
            position,
            total_scenes_in_act,
            plot_point_index,
            plot_point,
            existing_scene,
            title,
        }))
    }

    fn story(&self, requested: ContextLevel) -> Result<&StoryContext, ContextError> {
        self.chain
            .story()
            .ok_or(missing(requested, ContextLevel::Story))
    }

    fn structure(&self, requested: ContextLevel) -> Result<&StructureContext, ContextError> {
        self.chain
            .structure()
            .ok_or(missing(requested, ContextLevel::Structure))
    }

    fn act(&self, requested: ContextLevel) -> Result<&ActContext, ContextError> {
        self.chain.act().ok_or(missing(requested, ContextLevel::Act))
    }

    fn plot_points(&self, requested: ContextLevel) -> Result<&PlotPointsContext, ContextError> {
        self.chain
            .plot_points()
            .ok_or(missing(requested, ContextLevel::PlotPoints))
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(Arc::new(OrderResolver::with_defaults()), DistributionCalculator::default())
    }
}

fn missing(requested: ContextLevel, missing: ContextLevel) -> ContextError {
    ContextError::PrecursorMissing { requested, missing }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
