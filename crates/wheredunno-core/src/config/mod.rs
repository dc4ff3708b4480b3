mod defaults;
mod prompts;
mod providers;

#[cfg(test)]
mod tests;

pub use prompts::*;
pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::WhereError;
use crate::message::Identity;
use defaults::*;

/// Top-level wheredunno configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wheredunno: AppConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub responder: ResponderConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// The local user, as the sign-in collaborator would report them.
/// Everything empty = anonymous.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl IdentityConfig {
    pub fn identity(&self) -> Identity {
        Identity::resolve(
            self.user_id.as_deref(),
            self.display_name.as_deref(),
            self.email.as_deref(),
        )
    }
}

/// Storage config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// How many recently updated whereabouts a name lookup scans.
    #[serde(default = "default_lookup_window")]
    pub lookup_window: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            lookup_window: default_lookup_window(),
        }
    }
}

/// Delayed whereabouts responder config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How long humans get to answer before the assistant does.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Queue inspection interval.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: default_delay_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

/// "Ask AI" config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Recent room messages sent as conversation history.
    #[serde(default = "default_history_messages")]
    pub history_messages: usize,
    /// Recent room messages included when analyzing the chat.
    #[serde(default = "default_analyze_messages")]
    pub analyze_messages: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            history_messages: default_history_messages(),
            analyze_messages: default_analyze_messages(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. An empty Gemini key is
/// filled from `GEMINI_API_KEY`.
pub fn load(path: &str) -> Result<Config, WhereError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WhereError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str::<Config>(&content)
            .map_err(|e| WhereError::Config(format!("failed to parse config: {}", e)))?
    } else {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config {
            provider: ProviderConfig {
                default: default_provider(),
                gemini: Some(GeminiConfig::default()),
            },
            ..Default::default()
        }
    };

    config
        .provider
        .apply_env(std::env::var(GEMINI_API_KEY_ENV).ok());
    Ok(config)
}
