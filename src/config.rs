//! Settings loaded once at startup and passed explicitly to the client.
//!
//! Resolution order, highest precedence first:
//!
//! 1. process environment
//! 2. `.env` in the working directory (never overrides variables already set)
//! 3. YAML settings file (`GLM_COOKBOOK_CONFIG`, or `glm-cookbook.yaml` when present)
//! 4. built-in defaults
//!
//! ```yaml
//! # glm-cookbook.yaml
//! base_url: https://open.bigmodel.cn/api/paas/v4/
//! models:
//!   llm: glm-5
//!   vision: glm-4.6v
//! defaults:
//!   temperature: 0.6
//! ```

use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4/";
pub const DEFAULT_SETTINGS_FILE: &str = "glm-cookbook.yaml";

const API_KEY_VARS: &[&str] = &["GLM_API_KEY", "ZHIPUAI_API_KEY"];

/// Model identifiers used by the recipes, one per capability.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Models {
    pub llm: String,
    pub vision: String,
    pub image_gen: String,
    pub video_gen: String,
    pub asr: String,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            llm: "glm-5".to_string(),
            vision: "glm-4.6v".to_string(),
            image_gen: "cogview-4-250304".to_string(),
            video_gen: "cogvideox-3".to_string(),
            asr: "glm-asr-2512".to_string(),
        }
    }
}

/// Sampling defaults applied when a request does not set its own.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

/// Shape of the optional YAML settings file. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub samples_dir: Option<PathBuf>,
    pub models: Models,
    pub defaults: Defaults,
}

impl SettingsFile {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| {
            Error::configuration_with_context(
                "settings file is not valid YAML",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("settings"),
            )
        })
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read settings file {}", path.display()),
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("settings"),
            )
        })?;
        Self::from_yaml_str(&raw)
    }
}

/// Immutable process-wide configuration.
#[derive(Clone)]
pub struct Settings {
    api_key: String,
    pub base_url: String,
    pub models: Models,
    pub defaults: Defaults,
    pub timeout_secs: u64,
    pub samples_dir: PathBuf,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("defaults", &self.defaults)
            .field("timeout_secs", &self.timeout_secs)
            .field("samples_dir", &self.samples_dir)
            .finish()
    }
}

impl Settings {
    /// Load settings from `.env`, the optional YAML file and the environment.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => debug!("no .env file found"),
            Err(e) => {
                return Err(Error::configuration_with_context(
                    "failed to parse .env file",
                    ErrorContext::new()
                        .with_details(e.to_string())
                        .with_source("settings"),
                ))
            }
        }

        let file = match std::env::var("GLM_COOKBOOK_CONFIG") {
            Ok(path) => SettingsFile::read(path)?,
            Err(_) if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
                SettingsFile::read(DEFAULT_SETTINGS_FILE)?
            }
            Err(_) => SettingsFile::default(),
        };

        Self::from_lookup(|key| std::env::var(key).ok(), file)
    }

    /// Resolve settings from a variable lookup and a parsed settings file.
    pub fn from_lookup<F>(lookup: F, file: SettingsFile) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|k| non_blank(*k))
            .or_else(|| file.api_key.clone().filter(|v| !v.trim().is_empty()))
            .ok_or_else(missing_credential)?;

        let base_url = non_blank("GLM_BASE_URL")
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match non_blank("GLM_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::configuration_with_context(
                    "timeout must be a whole number of seconds",
                    ErrorContext::new()
                        .with_field_path("GLM_HTTP_TIMEOUT_SECS")
                        .with_details(raw.clone()),
                )
            })?,
            None => file.timeout_secs.unwrap_or(300),
        };

        let samples_dir = non_blank("GLM_SAMPLES_DIR")
            .map(PathBuf::from)
            .or(file.samples_dir)
            .unwrap_or_else(|| PathBuf::from("images"));

        let mut models = file.models;
        let overrides = [
            ("GLM_LLM_MODEL", &mut models.llm),
            ("GLM_VISION_MODEL", &mut models.vision),
            ("GLM_IMAGE_MODEL", &mut models.image_gen),
            ("GLM_VIDEO_MODEL", &mut models.video_gen),
            ("GLM_ASR_MODEL", &mut models.asr),
        ];
        for (key, slot) in overrides {
            if let Some(v) = non_blank(key) {
                *slot = v;
            }
        }

        Settings::builder(api_key)
            .base_url(base_url)
            .models(models)
            .defaults(file.defaults)
            .timeout_secs(timeout_secs)
            .samples_dir(samples_dir)
            .build()
    }

    pub fn builder(api_key: impl Into<String>) -> SettingsBuilder {
        SettingsBuilder::new(api_key)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Join a relative API path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn missing_credential() -> Error {
    Error::configuration_with_context(
        "API key is not set. Create a .env file in the working directory containing \
         GLM_API_KEY=<your key> (or export GLM_API_KEY)",
        ErrorContext::new()
            .with_field_path("GLM_API_KEY")
            .with_source("settings"),
    )
}

/// Programmatic construction, mostly for tests and embedding.
pub struct SettingsBuilder {
    api_key: String,
    base_url: String,
    models: Models,
    defaults: Defaults,
    timeout_secs: u64,
    samples_dir: PathBuf,
}

impl SettingsBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            models: Models::default(),
            defaults: Defaults::default(),
            timeout_secs: 300,
            samples_dir: PathBuf::from("images"),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn models(mut self, models: Models) -> Self {
        self.models = models;
        self
    }

    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn samples_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.samples_dir = dir.into();
        self
    }

    pub fn build(self) -> Result<Settings> {
        let api_key = self.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(missing_credential());
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "timeout must be greater than zero",
                ErrorContext::new().with_field_path("timeout_secs"),
            ));
        }
        let mut base_url = self.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Settings {
            api_key,
            base_url,
            models: self.models,
            defaults: self.defaults,
            timeout_secs: self.timeout_secs,
            samples_dir: self.samples_dir,
        })
    }
}
