//! Context Chain - the layered context a generation request is built from.
//!
//! Contexts live in an arena of nodes addressed by [`NodeId`]. Each node points at its
//! parent by index; nothing owns anything else. One node per level is *active* at a
//! time:
//! 1. **Story** - title, logline, characters, tone
//! 2. **Structure** - template and chronological unit order
//! 3. **Act** - the unit being worked on
//! 4. **Plot points** - the unit's plot points and causal history
//! 5. **Scene** - the scene being generated
//!
//! Rebuilding a level supersedes its active node and invalidates every active node
//! above it, so a stale act can never sit on top of a new structure.

mod builder;
mod levels;

pub use builder::*;
pub use levels::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ContextError;

/// Index of a node in a [`ContextChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    Active,
    /// Replaced by a newer node at the same level.
    Superseded,
    /// A level below it was rebuilt.
    Invalidated,
}

/// One context record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextNode {
    pub id: NodeId,
    pub level: ContextLevel,
    /// The node this one was built on (index only).
    pub parent: Option<NodeId>,
    pub payload: ContextPayload,
    pub created_at: DateTime<Utc>,
    pub status: NodeStatus,
}

impl ContextNode {
    /// Short kind label of the payload.
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }

    /// Check if the node is the active one for its level.
    pub fn is_active(&self) -> bool {
        self.status == NodeStatus::Active
    }
}

/// Arena of context nodes with one active slot per level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextChain {
    nodes: Vec<ContextNode>,
    active: [Option<NodeId>; 5],
}

impl ContextChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload as the new active node of its level.
    ///
    /// Fails with `PrecursorMissing` when the level below has no active node. On
    /// success, the previous node of the level is superseded and every active node
    /// above it is invalidated.
    pub fn push(&mut self, payload: ContextPayload) -> Result<NodeId, ContextError> {
        let level = payload.level();
        let parent = match level.precursor() {
            Some(precursor) => Some(self.require(level, precursor)?),
            None => None,
        };

        self.retire(level, NodeStatus::Superseded);
        for higher in level.above() {
            self.retire(higher, NodeStatus::Invalidated);
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(ContextNode {
            id,
            level,
            parent,
            payload,
            created_at: Utc::now(),
            status: NodeStatus::Active,
        });
        self.active[level.index()] = Some(id);

        debug!(node = %id, %level, parent = ?parent, "Context built");
        Ok(id)
    }

    /// The active node id of `precursor`, or `PrecursorMissing` naming `requested`.
    pub fn require(
        &self,
        requested: ContextLevel,
        precursor: ContextLevel,
    ) -> Result<NodeId, ContextError> {
        self.active[precursor.index()].ok_or(ContextError::PrecursorMissing {
            requested,
            missing: precursor,
        })
    }

    fn retire(&mut self, level: ContextLevel, status: NodeStatus) {
        if let Some(id) = self.active[level.index()].take() {
            self.nodes[id.0].status = status;
            if status == NodeStatus::Invalidated {
                debug!(node = %id, %level, "Context invalidated by lower-level rebuild");
            }
        }
    }

    /// Drop the active nodes at `level` and above, marking them invalidated.
    pub fn invalidate_from(&mut self, level: ContextLevel) {
        self.retire(level, NodeStatus::Invalidated);
        for higher in level.above() {
            self.retire(higher, NodeStatus::Invalidated);
        }
    }

    /// Get a node by id, active or not.
    pub fn get(&self, id: NodeId) -> Option<&ContextNode> {
        self.nodes.get(id.0)
    }

    /// The active node of a level.
    pub fn active(&self, level: ContextLevel) -> Option<&ContextNode> {
        self.active[level.index()].and_then(|id| self.get(id))
    }

    /// Check if a level has an active node.
    pub fn has(&self, level: ContextLevel) -> bool {
        self.active[level.index()].is_some()
    }

    /// Highest level with an active node.
    pub fn highest_level(&self) -> Option<ContextLevel> {
        ContextLevel::ALL.into_iter().rev().find(|level| self.has(*level))
    }

    /// All nodes ever built, oldest first.
    pub fn nodes(&self) -> &[ContextNode] {
        &self.nodes
    }

    /// Walk from a node down to the story node through parent links.
    pub fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut lineage = Vec::new();
        let mut current = self.get(id);
        while let Some(node) = current {
            lineage.push(node.id);
            current = node.parent.and_then(|parent| self.get(parent));
        }
        lineage
    }

    /// The active story context.
    pub fn story(&self) -> Option<&StoryContext> {
        match self.active(ContextLevel::Story).map(|n| &n.payload) {
            Some(ContextPayload::Story(story)) => Some(story),
            _ => None,
        }
    }

    /// The active structure context.
    pub fn structure(&self) -> Option<&StructureContext> {
        match self.active(ContextLevel::Structure).map(|n| &n.payload) {
            Some(ContextPayload::Structure(structure)) => Some(structure),
            _ => None,
        }
    }

    /// The active act context.
    pub fn act(&self) -> Option<&ActContext> {
        match self.active(ContextLevel::Act).map(|n| &n.payload) {
            Some(ContextPayload::Act(act)) => Some(act),
            _ => None,
        }
    }

    /// The active plot points context.
    pub fn plot_points(&self) -> Option<&PlotPointsContext> {
        match self.active(ContextLevel::PlotPoints).map(|n| &n.payload) {
            Some(ContextPayload::PlotPoints(plot_points)) => Some(plot_points),
            _ => None,
        }
    }

    /// The active scene context.
    pub fn scene(&self) -> Option<&SceneContext> {
        match self.active(ContextLevel::Scene).map(|n| &n.payload) {
            Some(ContextPayload::Scene(scene)) => Some(scene),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_resolver::OrderConfidence;
    use story_bible::{Influences, TemplateDescriptor};

    fn story(title: &str) -> ContextPayload {
        ContextPayload::Story(StoryContext {
            title: title.to_string(),
            logline: String::new(),
            characters: Vec::new(),
            tone: String::new(),
            genre: String::new(),
            total_scenes: 30,
            influences: Influences::new(),
            original_prompt: None,
            system_message: None,
        })
    }

    fn structure() -> ContextPayload {
        ContextPayload::Structure(StructureContext {
            template: TemplateDescriptor::new("Custom"),
            ordered_keys: Vec::new(),
            total_units: 0,
            order_confidence: OrderConfidence::Native,
        })
    }

    fn act(key: &str) -> ContextPayload {
        ContextPayload::Act(ActContext {
            key: key.to_string(),
            name: key.to_string(),
            description: String::new(),
            character_development: None,
            user_directions: None,
            position: 1,
            total_units: 1,
        })
    }

    #[test]
    fn test_push_requires_precursor() {
        let mut chain = ContextChain::new();
        let err = chain.push(structure()).unwrap_err();
        assert!(matches!(
            err,
            ContextError::PrecursorMissing {
                requested: ContextLevel::Structure,
                missing: ContextLevel::Story
            }
        ));
        assert!(chain.nodes().is_empty());
    }

    #[test]
    fn test_parent_links_and_lineage() {
        let mut chain = ContextChain::new();
        let s = chain.push(story("A")).unwrap();
        let st = chain.push(structure()).unwrap();
        let a = chain.push(act("setup")).unwrap();

        assert_eq!(chain.get(a).unwrap().parent, Some(st));
        assert_eq!(chain.get(st).unwrap().parent, Some(s));
        assert_eq!(chain.lineage(a), vec![a, st, s]);
        assert_eq!(chain.highest_level(), Some(ContextLevel::Act));
        assert_eq!(chain.get(a).unwrap().kind(), "act");
    }

    #[test]
    fn test_rebuild_invalidates_higher_levels() {
        let mut chain = ContextChain::new();
        let first_story = chain.push(story("A")).unwrap();
        let st = chain.push(structure()).unwrap();
        let a = chain.push(act("setup")).unwrap();

        let second_story = chain.push(story("B")).unwrap();

        assert_eq!(chain.get(first_story).unwrap().status, NodeStatus::Superseded);
        assert_eq!(chain.get(st).unwrap().status, NodeStatus::Invalidated);
        assert_eq!(chain.get(a).unwrap().status, NodeStatus::Invalidated);
        assert!(chain.get(second_story).unwrap().is_active());
        assert_eq!(chain.story().unwrap().title, "B");
        assert!(chain.structure().is_none());
        assert!(chain.act().is_none());

        // The act can no longer be rebuilt until the structure is rebuilt.
        assert!(matches!(
            chain.push(act("setup")),
            Err(ContextError::PrecursorMissing { .. })
        ));
    }

    #[test]
    fn test_same_level_rebuild_keeps_lower_levels() {
        let mut chain = ContextChain::new();
        chain.push(story("A")).unwrap();
        chain.push(structure()).unwrap();
        let first = chain.push(act("setup")).unwrap();
        let second = chain.push(act("confrontation")).unwrap();

        assert_eq!(chain.get(first).unwrap().status, NodeStatus::Superseded);
        assert_eq!(chain.act().unwrap().key, "confrontation");
        assert!(chain.structure().is_some());
        assert_eq!(chain.get(second).unwrap().parent, chain.get(first).unwrap().parent);
    }

    #[test]
    fn test_invalidate_from() {
        let mut chain = ContextChain::new();
        chain.push(story("A")).unwrap();
        chain.push(structure()).unwrap();
        chain.push(act("setup")).unwrap();

        chain.invalidate_from(ContextLevel::Structure);

        assert!(chain.story().is_some());
        assert!(!chain.has(ContextLevel::Structure));
        assert!(!chain.has(ContextLevel::Act));
        assert_eq!(chain.highest_level(), Some(ContextLevel::Story));
    }
}
