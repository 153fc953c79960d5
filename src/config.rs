//! Configuration.
//!
//! Loaded from `~/.stepchain/config.toml`, created with defaults on first
//! run. Environment variables override the file; the API key is the only
//! required value and is checked just before a chat starts so `status`
//! keeps working without one.

use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::UserDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tools::policy::ExecMode;

// ─────────────────────────────── Schema ───────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Absolute path this config was loaded from. Not part of the file.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// OpenAI API key. Usually supplied via `OPENAI_API_KEY` instead.
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-turn reasoning step limit.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Transcript window size in messages. 0 means unbounded.
    #[serde(default)]
    pub max_history_messages: usize,

    #[serde(default)]
    pub exec: ExecConfig,

    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecConfig {
    #[serde(default)]
    pub mode: ExecMode,
    #[serde(default)]
    pub allowed_commands: Vec<String>,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f64 {
    1.0
}

fn default_max_steps() -> u32 {
    32
}

fn default_weather_base_url() -> String {
    "https://wttr.in".to_string()
}

fn default_config_path() -> PathBuf {
    UserDirs::new().map_or_else(
        || PathBuf::from(".").join(".stepchain").join("config.toml"),
        |dirs| dirs.home_dir().join(".stepchain").join("config.toml"),
    )
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_steps: default_max_steps(),
            max_history_messages: 0,
            exec: ExecConfig::default(),
            weather_base_url: default_weather_base_url(),
        }
    }
}

// ─────────────────────────────── Loading ───────────────────────────────

impl Config {
    /// Loads the config file, writing a default one on first run.
    pub fn load_or_init() -> anyhow::Result<Self> {
        let path = default_config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create .stepchain directory")?;
        }
        if path.exists() {
            Ok(Self::load_from(&path)?)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::Load(e.to_string()))?;
        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Validation(
                "max_steps must be at least 1".to_string(),
            ));
        }
        if self.max_history_messages != 0 && self.max_history_messages < 8 {
            return Err(ConfigError::Validation(format!(
                "max_history_messages must be 0 (unbounded) or at least 8, got {}",
                self.max_history_messages
            )));
        }
        Ok(())
    }

    /// Applies environment overrides on top of the loaded file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("STEPCHAIN_MODEL")
            && !model.is_empty()
        {
            self.model = model;
        }
        if let Ok(base_url) = std::env::var("STEPCHAIN_BASE_URL")
            && !base_url.is_empty()
        {
            self.base_url = base_url;
        }
        if let Ok(raw) = std::env::var("STEPCHAIN_TEMPERATURE")
            && let Ok(temperature) = raw.parse::<f64>()
            && (0.0..=2.0).contains(&temperature)
        {
            self.temperature = temperature;
        }
        if let Ok(raw) = std::env::var("STEPCHAIN_MAX_STEPS")
            && let Ok(max_steps) = raw.parse::<u32>()
            && max_steps > 0
        {
            self.max_steps = max_steps;
        }
    }

    /// API key, or the startup error telling the operator where to put one.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                config_path: self.config_path.display().to_string(),
            })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&self.config_path, raw).context("Failed to write config file")?;
        Ok(())
    }
}

// ─────────────────────────────── Tests ───────────────────────────────
