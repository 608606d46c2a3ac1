//! Order Resolver - recovers the chronological order of a template's units.
//!
//! Stored structure maps do not reliably keep units in story order, so the order is
//! taken from a registry of canonical template orders:
//! 1. **Identifier**: a template carrying a stable id is looked up directly
//! 2. **Fragment**: otherwise the display name is matched against known fragments
//! 3. **Native**: otherwise the structure map's own key order is used, flagged as
//!    low confidence

mod registry;

pub use registry::*;

use serde::{Deserialize, Serialize};
use story_bible::{StructureMap, TemplateDescriptor};
use tracing::{debug, warn};

/// How an order was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderConfidence {
    /// Matched by stable template id.
    Exact,
    /// Matched by display-name fragment.
    Fragment,
    /// No canonical order known; native key order used.
    Native,
}

/// A resolved chronological unit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOrder {
    /// Unit keys in chronological order.
    pub keys: Vec<String>,
    pub confidence: OrderConfidence,
    /// Registry entry the order came from, if any.
    pub template_id: Option<String>,
}

impl ResolvedOrder {
    /// Whether the order is only the structure map's native order.
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == OrderConfidence::Native
    }

    fn native(structure: &StructureMap) -> Self {
        Self {
            keys: structure.keys().cloned().collect(),
            confidence: OrderConfidence::Native,
            template_id: None,
        }
    }
}

/// Resolves canonical unit order against a [`TemplateRegistry`].
#[derive(Debug, Clone)]
pub struct OrderResolver {
    registry: TemplateRegistry,
    tie_break: TieBreak,
}

impl OrderResolver {
    /// Create a resolver over the given registry.
    pub fn new(registry: TemplateRegistry, tie_break: TieBreak) -> Self {
        Self { registry, tie_break }
    }

    /// Create a resolver with the built-in registry and first-registered tie-break.
    pub fn with_defaults() -> Self {
        Self::new(TemplateRegistry::with_builtins(), TieBreak::default())
    }

    /// The underlying registry.
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// The tie-break strategy in use.
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Resolve the order for a template display name and its structure map.
    ///
    /// Falls back to the map's native key order when no fragment matches.
    pub fn resolve(&self, template_name: &str, structure: &StructureMap) -> ResolvedOrder {
        match self.registry.find_by_name(template_name, self.tie_break) {
            Some(entry) => self.apply(entry, OrderConfidence::Fragment, template_name, structure),
            None => {
                warn!(
                    template = template_name,
                    units = structure.len(),
                    "No canonical order registered for template, using stored key order"
                );
                ResolvedOrder::native(structure)
            }
        }
    }

    /// Resolve the order for a template descriptor, preferring its stable id.
    pub fn resolve_descriptor(&self, template: &TemplateDescriptor) -> ResolvedOrder {
        if let Some(entry) = template.id.as_deref().and_then(|id| self.registry.get(id)) {
            return self.apply(entry, OrderConfidence::Exact, &template.name, &template.structure);
        }
        if let Some(id) = &template.id {
            debug!(template_id = %id, "Template id not registered, matching by name");
        }
        self.resolve(&template.name, &template.structure)
    }

    fn apply(
        &self,
        entry: &TemplateOrder,
        confidence: OrderConfidence,
        template_name: &str,
        structure: &StructureMap,
    ) -> ResolvedOrder {
        let keys: Vec<String> = entry
            .order
            .iter()
            .filter(|key| structure.contains_key(key.as_str()))
            .cloned()
            .collect();

        if keys.is_empty() {
            warn!(
                template = template_name,
                template_id = %entry.id,
                "Canonical order shares no units with the structure, using stored key order"
            );
            return ResolvedOrder::native(structure);
        }

        let dropped = structure.len().saturating_sub(keys.len());
        if dropped > 0 {
            warn!(
                template = template_name,
                template_id = %entry.id,
                dropped,
                "Structure has units outside the canonical order; they are left out"
            );
        }

        debug!(template_id = %entry.id, ?confidence, units = keys.len(), "Resolved unit order");
        ResolvedOrder {
            keys,
            confidence,
            template_id: Some(entry.id.clone()),
        }
    }
}

impl Default for OrderResolver {
    fn default() -> Self {
        Self::with_defaults()
    }
}
