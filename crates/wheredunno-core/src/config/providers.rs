use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Environment variable consulted when `provider.gemini.api_key` is empty.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider")]
    pub default: String,
    pub gemini: Option<GeminiConfig>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default: default_provider(),
            gemini: None,
        }
    }
}

impl ProviderConfig {
    /// Fill an empty Gemini API key from the environment.
    ///
    /// Creates a default `[provider.gemini]` section when the variable is set
    /// but the section is missing.
    pub fn apply_env(&mut self, env_key: Option<String>) {
        let Some(key) = env_key.filter(|k| !k.trim().is_empty()) else {
            return;
        };
        let gemini = self.gemini.get_or_insert_with(GeminiConfig::default);
        if gemini.api_key.is_empty() {
            gemini.api_key = key;
        }
    }
}

/// Google Gemini API provider config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            model: default_gemini_model(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}
