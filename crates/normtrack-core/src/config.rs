use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{NormtrackError, Result};

/// Top-level configuration for the normtrack application.
///
/// Loaded from `~/.normtrack/config.toml` by default. Each section
/// corresponds to a bounded context or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormtrackConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl NormtrackConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NormtrackConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| NormtrackError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for form records and uploaded attachments.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Remote inference assistant configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Base URL of the hosted inference service. Model ids are appended.
    pub api_base_url: String,
    /// Instruction-tuned model tried first.
    pub primary_model: String,
    /// Summarization model used when the primary cannot answer.
    pub fallback_model: String,
    /// Environment variable holding the API credential.
    pub api_key_env: String,
    /// Bounded output length sent with every generation request.
    pub max_length: u32,
    /// Turns kept in the rolling conversation context.
    pub context_turns: usize,
    /// Turns included when formatting a prompt.
    pub prompt_turns: usize,
    /// Total attempts per model (first try included).
    pub max_attempts: u32,
    /// Backoff floor in seconds.
    pub backoff_floor_secs: u64,
    /// Backoff cap in seconds.
    pub backoff_cap_secs: u64,
    /// Whether to add bounded jitter to backoff delays.
    pub jitter: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api-inference.huggingface.co/models/".to_string(),
            primary_model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            fallback_model: "google/flan-t5-base".to_string(),
            api_key_env: "HUGGINGFACE_API_KEY".to_string(),
            max_length: 500,
            context_turns: 5,
            prompt_turns: 3,
            max_attempts: 3,
            backoff_floor_secs: 4,
            backoff_cap_secs: 10,
            jitter: true,
        }
    }
}

/// Record and attachment storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Uploads root, relative to `general.data_dir`.
    pub uploads_dir: String,
    /// Records file name inside the uploads root.
    pub records_file: String,
    /// Attachments older than this many days are eligible for cleanup.
    pub cleanup_after_days: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: "uploads".to_string(),
            records_file: "forms_data.json".to_string(),
            cleanup_after_days: 30,
        }
    }
}

/// Form validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Allowed attachment extensions (lowercase, with leading dot).
    pub allowed_extensions: Vec<String>,
    /// Maximum attachment size in bytes.
    pub max_file_size_bytes: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![".pdf".to_string()],
            max_file_size_bytes: 5 * 1024 * 1024,
        }
    }
}
