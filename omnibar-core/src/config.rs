//! Configuration for the Omnibar pipeline.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! environment. On top of that, `restore` overlays the persisted `config`
//! record (runtime customization written by the palette itself); any failure
//! along the way degrades to the layer below, never to an error the user
//! sees.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::classifier::PluginCustomization;
use crate::error::ConfigError;
use crate::storage::{CONFIG_RECORD, Storage, get_record};

/// General palette settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Pre-fill the input with the last used command on startup.
    pub cache_last_cmd: bool,
    /// Plugin whose first keyword command is pre-filled when the last
    /// command is not cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_plugin: Option<String>,
    /// How many list entries a shift-variant enter handler may act on.
    pub max_operands_num: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_last_cmd: true,
            default_plugin: None,
            max_operands_num: 6,
        }
    }
}

/// Top-level configuration: general settings plus per-plugin command
/// overrides keyed by plugin name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OmnibarConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub plugins: HashMap<String, PluginCustomization>,
}

impl OmnibarConfig {
    /// Load configuration from defaults, the user config file, and
    /// `OMNIBAR_`-prefixed environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(OmnibarConfig::default()));

        if let Some(dirs) = directories::ProjectDirs::from("dev", "omnibar", "omnibar") {
            let user_config = dirs.config_dir().join("config.toml");
            if user_config.exists() {
                figment = figment.merge(Toml::file(&user_config));
            }
        }

        figment = figment.merge(Env::prefixed("OMNIBAR_").split("__"));
        Ok(figment.extract()?)
    }

    /// Load configuration with an explicit config file, for tests and
    /// embedders with their own config location.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let figment = Figment::from(Serialized::defaults(OmnibarConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("OMNIBAR_").split("__"));
        Ok(figment.extract()?)
    }

    /// Restore the effective configuration at palette startup: the layered
    /// config overlaid with the persisted `config` record.
    ///
    /// A missing or corrupt record leaves the layered config in place; a
    /// broken layered config falls back to defaults. This is the recoverable
    /// path the classifier depends on and is never fatal.
    pub async fn restore(storage: &dyn Storage) -> Self {
        let base = Self::load().unwrap_or_else(|err| {
            warn!(error = %err, "config load failed, using defaults");
            Self::default()
        });

        match get_record::<OmnibarConfig>(storage, CONFIG_RECORD).await {
            Ok(Some(stored)) => stored,
            Ok(None) => base,
            Err(err) => {
                warn!(error = %err, "persisted config unreadable, using layered config");
                base
            }
        }
    }
}
