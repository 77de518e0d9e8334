//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::graph::{DEFAULT_THEME_MATE_CAP, DEFAULT_THEME_MATE_WEIGHT, FocusOptions};
use crate::domain::recommend::{DEFAULT_RECOMMENDATION_LIMIT, EdgeWeighting, SignalTable};

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "KALIMA_CONFIG_DIR";

/// Kalima configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphConfig,
    pub recommend: RecommendConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum number of theme mates drawn around a focal word
    pub theme_mate_cap: usize,
    pub theme_mate_weight: f32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            theme_mate_cap: DEFAULT_THEME_MATE_CAP,
            theme_mate_weight: DEFAULT_THEME_MATE_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    pub default_limit: usize,
    pub signals: SignalTable,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_RECOMMENDATION_LIMIT,
            signals: SignalTable::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

const KEYS: [&str; 9] = [
    "graph.theme_mate_cap",
    "graph.theme_mate_weight",
    "recommend.default_limit",
    "recommend.signals.same_root",
    "recommend.signals.relationship",
    "recommend.signals.shared_theme",
    "recommend.signals.similar_difficulty",
    "recommend.signals.difficulty_tolerance",
    "storage.database_path",
];

fn parse_weight(key: &str, value: &str) -> anyhow::Result<f32> {
    let weight: f32 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} value: {}", key, value))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(anyhow!("{} must be a non-negative number", key));
    }
    Ok(weight)
}

fn parse_count(key: &str, value: &str) -> anyhow::Result<usize> {
    let count: usize = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} value: {}", key, value))?;
    if count == 0 {
        return Err(anyhow!("{} must be at least 1", key));
    }
    Ok(count)
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("kalima")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a file, or defaults if it doesn't exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a file, creating its directory
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.graph.theme_mate_cap == 0 {
            return Err(anyhow!("graph.theme_mate_cap must be at least 1"));
        }
        if !self.graph.theme_mate_weight.is_finite() || self.graph.theme_mate_weight < 0.0 {
            return Err(anyhow!("graph.theme_mate_weight must be a non-negative number"));
        }
        if self.recommend.default_limit == 0 {
            return Err(anyhow!("recommend.default_limit must be at least 1"));
        }
        self.recommend.signals.validate().map_err(|e| anyhow!(e))
    }

    /// Options for the word focus view
    pub fn focus_options(&self) -> FocusOptions {
        FocusOptions {
            theme_mate_cap: self.graph.theme_mate_cap,
            theme_mate_weight: self.graph.theme_mate_weight,
        }
    }

    /// Database path: the configured one, or `kalima.db` next to the config
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("kalima.db")),
        }
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        let signals = &self.recommend.signals;
        match key {
            "graph.theme_mate_cap" => Ok(self.graph.theme_mate_cap.to_string()),
            "graph.theme_mate_weight" => Ok(self.graph.theme_mate_weight.to_string()),

            "recommend.default_limit" => Ok(self.recommend.default_limit.to_string()),
            "recommend.signals.same_root" => Ok(signals.same_root.to_string()),
            "recommend.signals.relationship" => Ok(match signals.relationship {
                EdgeWeighting::Stored => "stored".to_string(),
                EdgeWeighting::Fixed(weight) => weight.to_string(),
            }),
            "recommend.signals.shared_theme" => Ok(signals.shared_theme.to_string()),
            "recommend.signals.similar_difficulty" => Ok(signals.similar_difficulty.to_string()),
            "recommend.signals.difficulty_tolerance" => {
                Ok(signals.difficulty_tolerance.to_string())
            }

            "storage.database_path" => Ok(self
                .storage
                .database_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".to_string())),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `kalima config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let signals = &mut self.recommend.signals;
        match key {
            "graph.theme_mate_cap" => {
                self.graph.theme_mate_cap = parse_count(key, value)?;
            }
            "graph.theme_mate_weight" => {
                self.graph.theme_mate_weight = parse_weight(key, value)?;
            }

            "recommend.default_limit" => {
                self.recommend.default_limit = parse_count(key, value)?;
            }
            "recommend.signals.same_root" => {
                signals.same_root = parse_weight(key, value)?;
            }
            "recommend.signals.relationship" => {
                signals.relationship = if value.trim().eq_ignore_ascii_case("stored") {
                    EdgeWeighting::Stored
                } else {
                    EdgeWeighting::Fixed(parse_weight(key, value)?)
                };
            }
            "recommend.signals.shared_theme" => {
                signals.shared_theme = parse_weight(key, value)?;
            }
            "recommend.signals.similar_difficulty" => {
                signals.similar_difficulty = parse_weight(key, value)?;
            }
            "recommend.signals.difficulty_tolerance" => {
                let tolerance: u8 = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid difficulty_tolerance value: {}", value))?;
                if tolerance > 4 {
                    return Err(anyhow!("Difficulty tolerance must be between 0 and 4"));
                }
                signals.difficulty_tolerance = tolerance;
            }

            "storage.database_path" => {
                let value = value.trim();
                self.storage.database_path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `kalima config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        KEYS.into_iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        Self::reset_at(&Self::config_path()?)
    }

    /// Remove the config file at `path`, if any
    pub fn reset_at(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.graph.theme_mate_cap, 20);
        assert_eq!(config.graph.theme_mate_weight, 0.3);
        assert_eq!(config.recommend.default_limit, 10);
        assert_eq!(config.recommend.signals, SignalTable::default());
        assert!(config.storage.database_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("graph.theme_mate_cap", "5").unwrap();
        config.set("recommend.signals.relationship", "0.6").unwrap();
        config.set("storage.database_path", "/tmp/kalima.db").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.recommend.signals.relationship, EdgeWeighting::Fixed(0.6));

        Config::reset_at(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[recommend.signals]\nshared_theme = 0.4\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.recommend.signals.shared_theme, 0.4);
        assert_eq!(config.recommend.signals.same_root, 0.9);
        assert_eq!(config.graph.theme_mate_cap, 20);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[graph]\ntheme_mate_cap = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_set_validates() {
        let mut config = Config::default();
        assert!(config.set("recommend.signals.same_root", "-0.1").is_err());
        assert!(config.set("recommend.signals.same_root", "abc").is_err());
        assert!(config.set("recommend.default_limit", "0").is_err());
        assert!(config.set("recommend.signals.difficulty_tolerance", "9").is_err());
        assert!(config.set("unknown.key", "1").is_err());

        config.set("recommend.signals.relationship", "Stored").unwrap();
        assert_eq!(config.recommend.signals.relationship, EdgeWeighting::Stored);
    }

    #[test]
    fn test_list_covers_every_key() {
        let config = Config::default();
        let entries = config.list().unwrap();
        assert_eq!(entries.len(), KEYS.len());
        assert!(entries.contains(&("recommend.signals.relationship".to_string(), "stored".to_string())));
        assert!(entries.contains(&("storage.database_path".to_string(), "(default)".to_string())));
    }

    #[test]
    fn test_focus_options() {
        let mut config = Config::default();
        config.set("graph.theme_mate_cap", "3").unwrap();
        let options = config.focus_options();
        assert_eq!(options.theme_mate_cap, 3);
        assert_eq!(options.theme_mate_weight, 0.3);
    }
}
