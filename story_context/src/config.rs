//! Engine configuration.
//!
//! Loaded from TOML. Every section is optional; missing values fall back to defaults.
//!
//! ```toml
//! [distribution]
//! per_unit_plot_point_estimate = 3
//!
//! [ordering]
//! tie_break = "longest_fragment"
//!
//! [[ordering.templates]]
//! id = "four_part"
//! fragments = ["four-part"]
//! order = ["opening", "build", "turn", "close"]
//!
//! [generation]
//! model = "story-large"
//! temperature = 0.8
//!
//! [logging]
//! level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::distribution::{DistributionCalculator, DEFAULT_PLOT_POINTS_PER_UNIT};
use crate::error::ContextError;
use crate::generation::GenerationParams;
use crate::logging::{validate_format, LoggingConfig};
use crate::order_resolver::{OrderResolver, TemplateOrder, TemplateRegistry, TieBreak};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub distribution: DistributionConfig,

    #[serde(default)]
    pub ordering: OrderingConfig,

    #[serde(default)]
    pub generation: GenerationParams,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scene distribution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Projected plot points per structural unit.
    #[serde(default = "default_plot_points_per_unit")]
    pub per_unit_plot_point_estimate: u32,
}

fn default_plot_points_per_unit() -> u32 {
    DEFAULT_PLOT_POINTS_PER_UNIT
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            per_unit_plot_point_estimate: default_plot_points_per_unit(),
        }
    }
}

/// Template order resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderingConfig {
    #[serde(default)]
    pub tie_break: TieBreak,

    /// Extra templates, registered after the built-ins. An entry with a built-in id
    /// replaces that template's order.
    #[serde(default)]
    pub templates: Vec<TemplateOrder>,
}

impl EngineConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self, ContextError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContextError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            ContextError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&source)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.distribution.per_unit_plot_point_estimate == 0 {
            return Err(ContextError::Config(
                "per_unit_plot_point_estimate must be greater than 0".to_string(),
            ));
        }

        for template in &self.ordering.templates {
            if template.id.trim().is_empty() {
                return Err(ContextError::Config(
                    "Template order id cannot be empty".to_string(),
                ));
            }
            if template.order.is_empty() {
                return Err(ContextError::Config(format!(
                    "Template order '{}' has no units",
                    template.id
                )));
            }
        }

        self.generation
            .validate()
            .map_err(|e| ContextError::Config(format!("Generation: {}", e)))?;
        validate_format(&self.logging.format)?;

        Ok(())
    }

    /// Build the order resolver described by this configuration.
    pub fn order_resolver(&self) -> OrderResolver {
        let mut registry = TemplateRegistry::with_builtins();
        for template in &self.ordering.templates {
            registry.register(template.clone());
        }
        OrderResolver::new(registry, self.ordering.tie_break)
    }

    /// Build the distribution calculator described by this configuration.
    pub fn distribution_calculator(&self) -> DistributionCalculator {
        DistributionCalculator::new(self.distribution.per_unit_plot_point_estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_bible::{StructureMap, UnitDescriptor};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.distribution.per_unit_plot_point_estimate, 3);
        assert_eq!(config.ordering.tie_break, TieBreak::FirstRegistered);
    }

    #[test]
    fn test_full_config() {
        let config = EngineConfig::from_toml_str(
            r#"
            [distribution]
            per_unit_plot_point_estimate = 4

            [ordering]
            tie_break = "longest_fragment"

            [[ordering.templates]]
            id = "four_part"
            fragments = ["four-part"]
            order = ["opening", "build", "turn", "close"]

            [generation]
            model = "story-large"
            temperature = 0.9

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.distribution_calculator().per_unit_estimate(), 4);
        assert_eq!(config.generation.model, "story-large");
        assert_eq!(config.generation.max_output_tokens, 4096);
        assert_eq!(config.logging.format, "json");

        let resolver = config.order_resolver();
        assert_eq!(resolver.tie_break(), TieBreak::LongestFragment);

        let structure: StructureMap = ["close", "opening", "turn"]
            .iter()
            .map(|k| (k.to_string(), UnitDescriptor::new(*k, "")))
            .collect();
        let resolved = resolver.resolve("A Four-Part Story", &structure);
        assert_eq!(resolved.keys, vec!["opening", "turn", "close"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("[distribution]\nper_unit_plot_point_estimate = 0"),
            Err(ContextError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[[ordering.templates]]\nid = \"x\"\norder = []"),
            Err(ContextError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[logging]\nformat = \"xml\""),
            Err(ContextError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[ordering]\ntie_break = \"random\""),
            Err(ContextError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EngineConfig::load("/nonexistent/storyloom.toml"),
            Err(ContextError::Config(_))
        ));
    }
}
