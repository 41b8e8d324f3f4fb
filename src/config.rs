use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

/// User settings as written by the options page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// OpenAI API key (empty when not configured)
    #[serde(default, rename = "apiKey")]
    pub api_key: String,

    /// Escalate inconclusive pages to the external classifier
    #[serde(default = "default_true", rename = "enableAI")]
    pub enable_ai: bool,

    /// Fade the badge after a few seconds
    #[serde(default = "default_true", rename = "autoHide")]
    pub auto_hide: bool,

    /// Show the badge even when nothing was found
    #[serde(default = "default_true", rename = "showAlways")]
    pub show_always: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            enable_ai: true,
            auto_hide: true,
            show_always: true,
        }
    }
}

/// On-disk layout: settings live under the `settings` storage key
#[derive(Debug, Default, Serialize, Deserialize)]
struct Storage {
    #[serde(default)]
    settings: Option<Settings>,
}

impl Settings {
    /// Load persisted settings; `None` when nothing has been saved yet
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let storage: Storage = serde_json::from_str(&content)?;
        Ok(storage.settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let storage = Storage {
            settings: Some(self.clone()),
        };
        std::fs::write(path, serde_json::to_string_pretty(&storage)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !self.api_key.is_empty() && !self.api_key.starts_with("sk-") {
            return Err(ScanError::ConfigError(
                "Invalid API key format. Should start with \"sk-\"".into(),
            ));
        }
        Ok(())
    }

    /// Get the settings file path
    ///
    /// Supports JOBSCAN_SETTINGS environment variable for test isolation
    pub fn settings_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("JOBSCAN_SETTINGS") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "jobscan")
            .ok_or_else(|| ScanError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("settings.json"))
    }
}

/// Configuration baked in at build time, used when nothing is persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectedConfig {
    pub openai_api_key: String,
    pub enable_ai_analysis: bool,
}

impl InjectedConfig {
    /// Build-time values, falling back to the runtime environment
    pub fn from_env() -> Self {
        let key = option_env!("OPENAI_API_KEY")
            .map(str::to_string)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_default();
        let enable = option_env!("ENABLE_AI_ANALYSIS")
            .map(str::to_string)
            .or_else(|| std::env::var("ENABLE_AI_ANALYSIS").ok())
            .is_some_and(|v| v == "true");

        Self {
            openai_api_key: key,
            enable_ai_analysis: enable,
        }
    }
}

/// Settings as the analysis pipeline sees them
#[derive(Clone, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub api_key: Option<String>,
    pub enable_external_classification: bool,
    pub auto_hide: bool,
    pub show_always: bool,
}

impl EffectiveSettings {
    /// Merge persisted settings over injected config. A persisted key wins;
    /// the injected key is used only when no key was saved.
    pub fn resolve(stored: Option<&Settings>, injected: &InjectedConfig) -> Self {
        let stored_key = stored.map(|s| s.api_key.trim()).filter(|k| !k.is_empty());
        let injected_key = Some(injected.openai_api_key.trim()).filter(|k| !k.is_empty());
        let api_key = stored_key.or(injected_key).map(str::to_string);

        let defaults = Settings::default();
        let settings = stored.unwrap_or(&defaults);

        Self {
            api_key,
            enable_external_classification: stored
                .map(|s| s.enable_ai)
                .unwrap_or(injected.enable_ai_analysis),
            auto_hide: settings.auto_hide,
            show_always: settings.show_always,
        }
    }

    pub fn api_key_present(&self) -> bool {
        self.api_key.is_some()
    }

    /// Whether external classification may be attempted at all
    pub fn can_escalate(&self) -> bool {
        self.enable_external_classification && self.api_key_present()
    }
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self::resolve(None, &InjectedConfig::default())
    }
}

// Never print the key itself
impl std::fmt::Debug for EffectiveSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectiveSettings")
            .field("api_key_present", &self.api_key_present())
            .field("enable_external_classification", &self.enable_external_classification)
            .field("auto_hide", &self.auto_hide)
            .field("show_always", &self.show_always)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"apiKey": "sk-abc"}"#).unwrap();
        assert_eq!(settings.api_key, "sk-abc");
        assert!(settings.enable_ai);
        assert!(settings.auto_hide);
        assert!(settings.show_always);
    }

    #[test]
    fn test_field_names() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert!(json.get("enableAI").is_some());
        assert!(json.get("showAlways").is_some());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        assert_eq!(Settings::load_from(&path).unwrap(), None);

        let settings = Settings {
            api_key: "sk-test".into(),
            enable_ai: false,
            auto_hide: true,
            show_always: false,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), Some(settings));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"settings\""));
    }

    #[test]
    fn test_rejects_malformed_key() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            api_key: "not-a-key".into(),
            ..Settings::default()
        };
        let err = settings.save_to(&dir.path().join("s.json")).unwrap_err();
        assert!(matches!(err, ScanError::ConfigError(_)));
    }

    #[test]
    fn test_persisted_key_beats_injected() {
        let injected = InjectedConfig {
            openai_api_key: "sk-injected".into(),
            enable_ai_analysis: true,
        };
        let stored = Settings {
            api_key: "sk-stored".into(),
            ..Settings::default()
        };
        let effective = EffectiveSettings::resolve(Some(&stored), &injected);
        assert_eq!(effective.api_key.as_deref(), Some("sk-stored"));

        let blank = Settings::default();
        let effective = EffectiveSettings::resolve(Some(&blank), &injected);
        assert_eq!(effective.api_key.as_deref(), Some("sk-injected"));
        assert!(effective.can_escalate());
    }

    #[test]
    fn test_injected_flag_used_without_stored_settings() {
        let injected = InjectedConfig::default();
        let effective = EffectiveSettings::resolve(None, &injected);
        assert!(!effective.enable_external_classification);
        assert!(!effective.can_escalate());
        assert!(effective.show_always);
    }

    #[test]
    fn test_debug_hides_key() {
        let stored = Settings {
            api_key: "sk-secret".into(),
            ..Settings::default()
        };
        let effective = EffectiveSettings::resolve(Some(&stored), &InjectedConfig::default());
        assert!(!format!("{:?}", effective).contains("sk-secret"));
    }
}
