//! Configuration loading, validation, and management for LawDesk.
//!
//! Loads configuration from `~/.lawdesk/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use lawdesk_core::{ChatModel, StatuteMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// System instructions used when the config does not override them.
///
/// The 800–4000 character range is a request to the model about the length
/// of its answer. Nothing measures or enforces it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
あなたはナレッジベースに提供されている書類と最新の法令検索結果に基づいて情報を提供するチャットボットです。
利用者の質問に、正確かつなるべく詳細に、参考資料を引用しながら答えてください。
情報は800文字以上、4000文字以内に収めてください。
マークダウン形式で見やすく出力してください。
情報源を明記して回答するように努めてください。
複数の解釈がある場合は、それぞれを提示してください。
与えられた情報だけでは判断できない場合には、判断できない旨を伝えてください。
法令の解釈が必要な場合は、その旨を明確に述べ、可能な解釈を示してください。
検索結果が提供された場合、それらを参照しながら回答してください。";

/// The root configuration structure.
///
/// Maps directly to `~/.lawdesk/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for chat turns
    #[serde(default)]
    pub model: ChatModel,

    /// Whether one or many statutes can be attached to a prompt
    #[serde(default)]
    pub statute_mode: StatuteMode,

    /// System instructions placed at the top of every prompt
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Statute registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// LLM endpoint settings
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("statute_mode", &self.statute_mode)
            .field("system_prompt", &format!("{} chars", self.system_prompt.chars().count()))
            .field("registry", &self.registry)
            .field("llm", &self.llm)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the e-Gov statute API (version 1)
    #[serde(default = "default_registry_url")]
    pub base_url: String,

    #[serde(default = "default_registry_timeout")]
    pub timeout_secs: u64,
}

fn default_registry_url() -> String {
    "https://elaws.e-gov.go.jp/api/1".into()
}
fn default_registry_timeout() -> u64 {
    30
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_url(),
            timeout_secs: default_registry_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the Gemini REST API
    #[serde(default = "default_llm_url")]
    pub base_url: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_url(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.lawdesk/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `LAWDESK_API_KEY` (highest priority)
    /// - `GEMINI_API_KEY`
    /// - `GOOGLE_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if !self.has_api_key() {
            self.api_key = ["LAWDESK_API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"]
                .into_iter()
                .filter_map(&lookup)
                .find(|value| !value.trim().is_empty());
        }

        // Allow env var to override the model
        if let Some(model) = lookup("LAWDESK_MODEL") {
            self.model = model
                .parse()
                .map_err(|e: lawdesk_core::ProviderError| ConfigError::ValidationError(e.to_string()))?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".lawdesk")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, url) in [
            ("registry.base_url", &self.registry.base_url),
            ("llm.base_url", &self.llm.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "{field} must start with http:// or https://"
                )));
            }
        }

        if self.registry.timeout_secs == 0 || self.llm.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if a non-empty API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: ChatModel::default(),
            statute_mode: StatuteMode::default(),
            system_prompt: default_system_prompt(),
            registry: RegistryConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.model, ChatModel::Gemini15Pro);
        assert_eq!(config.statute_mode, StatuteMode::Multi);
        assert_eq!(config.registry.base_url, "https://elaws.e-gov.go.jp/api/1");
        assert_eq!(config.registry.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.system_prompt, config.system_prompt);
        assert_eq!(parsed.llm.timeout_secs, config.llm.timeout_secs);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().model, ChatModel::Gemini15Pro);
    }

    #[test]
    fn load_from_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
api_key = "AIza-test"
model = "gemini-pro"
statute_mode = "single"
system_prompt = "短く答えてください。"

[registry]
base_url = "http://localhost:9000/api/1"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, ChatModel::GeminiPro);
        assert_eq!(config.statute_mode, StatuteMode::Single);
        assert_eq!(config.system_prompt, "短く答えてください。");
        assert_eq!(config.registry.base_url, "http://localhost:9000/api/1");
        assert_eq!(config.registry.timeout_secs, 30);
        assert!(config.has_api_key());
    }

    #[test]
    fn unknown_model_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = \"gpt-4o\"\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_base_url_rejected() {
        let config = AppConfig {
            registry: RegistryConfig {
                base_url: "elaws.e-gov.go.jp".into(),
                timeout_secs: 30,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = AppConfig {
            llm: LlmConfig {
                timeout_secs: 0,
                ..LlmConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_key_fills_missing_api_key_in_priority_order() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[("GOOGLE_API_KEY", "google"), ("GEMINI_API_KEY", "gemini")]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("gemini"));
    }

    #[test]
    fn env_key_does_not_override_file_key() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env_overrides(env(&[("LAWDESK_API_KEY", "from-env")])).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn blank_keys_do_not_count() {
        let mut config = AppConfig {
            api_key: Some("   ".into()),
            ..AppConfig::default()
        };
        assert!(!config.has_api_key());
        config.apply_env_overrides(env(&[("LAWDESK_API_KEY", "")])).unwrap();
        assert!(!config.has_api_key());
    }

    #[test]
    fn env_model_override_is_validated() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[("LAWDESK_MODEL", "gemini-pro")])).unwrap();
        assert_eq!(config.model, ChatModel::GeminiPro);

        let err = config.apply_env_overrides(env(&[("LAWDESK_MODEL", "claude")]));
        assert!(matches!(err, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("AIza-secret".into()),
            ..AppConfig::default()
        };
        let dbg = format!("{config:?}");
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("AIza-secret"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gemini-1.5-pro"));
        assert!(toml_str.contains("elaws.e-gov.go.jp"));
    }
}
