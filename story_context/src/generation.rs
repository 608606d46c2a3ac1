//! Generation collaborator interface.
//!
//! The engine only produces the directive string. Submitting it to a text model and
//! interpreting whatever comes back is the caller's job; nothing here parses output.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Parameters sent alongside a directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Model identifier understood by the generator.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated output, in tokens.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_model() -> String {
    "default".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    4096
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl GenerationParams {
    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model cannot be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// An opaque text-in/text-out model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Generate raw text for a directive. The output is returned untouched.
    async fn generate(&self, directive: &str, params: &GenerationParams) -> Result<String, Self::Error>;
}
