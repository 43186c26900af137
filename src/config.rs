//! Application configuration, loaded from TOML.
//!
//! ```toml
//! [search]
//! budget_ms = 8000
//! sufficiency_threshold = 10
//!
//! [providers.duckduckgo]
//! enabled = true
//!
//! [providers.apollo]
//! enabled = true
//! api_key_env = "APOLLO_API_KEY"
//!
//! [providers.fixtures]
//! path = "people.json"
//!
//! [tables]
//! company_table = "companies.toml"
//! keyword_table = "keywords.toml"
//! ```
//!
//! Every section and field is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use scout_search::{CompanyTable, KeywordTable, SearchConfig, Tables};

use crate::error::{Result, ScoutError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Pipeline budget, thresholds, and request behaviour.
    pub search: SearchConfig,
    /// Which providers to register and how.
    pub providers: ProvidersConfig,
    /// Optional overrides for the built-in data tables.
    pub tables: TablesConfig,
}

/// Provider registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub duckduckgo: DuckDuckGoConfig,
    pub apollo: ApolloConfig,
    pub fixtures: FixturesConfig,
}

/// Free web search over public profile pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuckDuckGoConfig {
    pub enabled: bool,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Metered people-search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApolloConfig {
    pub enabled: bool,
    /// Environment variable holding the API key. The key itself is never
    /// stored in the config file.
    pub api_key_env: String,
    /// Override of the API base URL.
    pub base_url: Option<String>,
}

impl Default for ApolloConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "APOLLO_API_KEY".to_owned(),
            base_url: None,
        }
    }
}

impl ApolloConfig {
    /// Read the API key from the configured environment variable.
    ///
    /// Blank values count as absent.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Offline candidate records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixturesConfig {
    /// JSON array of candidate records. No provider is registered when unset.
    pub path: Option<PathBuf>,
}

/// Data table overrides. Entries extend the built-in tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    pub company_table: Option<PathBuf>,
    pub keyword_table: Option<PathBuf>,
}

impl TablesConfig {
    /// Built-in tables merged with the configured override files.
    ///
    /// # Errors
    ///
    /// Returns an error if an override file cannot be read or parsed.
    pub fn load(&self) -> Result<Tables> {
        let mut tables = Tables::builtin();
        if let Some(path) = &self.company_table {
            let content = read_table(path)?;
            tables.companies.merge(CompanyTable::from_toml_str(&content)?);
        }
        if let Some(path) = &self.keyword_table {
            let content = read_table(path)?;
            tables.keywords.merge(KeywordTable::from_toml_str(&content)?);
        }
        Ok(tables)
    }
}

fn read_table(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ScoutError::Config(format!("cannot read table {}: {e}", path.display())))
}

impl ScoutConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ScoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Checks the search section.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Search`] with the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        if self.providers.apollo.api_key_env.trim().is_empty() {
            return Err(ScoutError::Config(
                "providers.apollo.api_key_env must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path: `~/.config/scout/config.toml`.
    ///
    /// `SCOUT_CONFIG_DIR` overrides the directory.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        if let Some(dir) = std::env::var_os("SCOUT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("scout").join("config.toml")
        } else {
            dirs::config_dir()
                .map(|d| d.join("scout"))
                .unwrap_or_else(|| PathBuf::from("/tmp/scout-config"))
                .join("config.toml")
        }
    }
}
