//! Plugin configuration loading and validation.
//!
//! Plugins live in `{data_dir}/crankshaft/plugins/{name}/`, each with a
//! `plugin.toml` describing the plugin, its author, per-UI-mode entrypoints,
//! and store metadata. Scanning skips invalid plugins with a warning rather
//! than failing the run.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// UI mode the Steam client is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    Desktop,
    Deck,
}

impl std::fmt::Display for UiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Desktop => write!(f, "desktop"),
            Self::Deck => write!(f, "deck"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthorInfo {
    pub name: String,
    pub link: String,
}

/// Which client surfaces the plugin hooks into for one UI mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Entrypoint {
    pub library: bool,
    pub menu: bool,
    pub quick_access: bool,
    pub app_properties: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Platform {
    pub supported: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Platforms {
    pub linux: Platform,
    pub windows: Platform,
    pub darwin: Platform,
}

/// Store-facing metadata, unused by the patcher itself.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreInfo {
    pub description: String,
    pub platforms: Platforms,
}

/// Parsed `plugin.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub author: AuthorInfo,
    #[serde(default)]
    pub entrypoints: HashMap<UiMode, Entrypoint>,
    #[serde(default)]
    pub store: StoreInfo,
}

impl PluginConfig {
    /// Load and validate `plugin.toml` from a plugin directory.
    pub fn load(plugin_dir: &Path) -> Result<Self, String> {
        let config_path = plugin_dir.join("plugin.toml");

        let data = fs::read_to_string(&config_path).map_err(|e| {
            format!(
                "Failed to read plugin config at \"{}\": {e}",
                config_path.display()
            )
        })?;

        let config: PluginConfig = toml::from_str(&data).map_err(|e| {
            format!(
                "Invalid plugin config at \"{}\": {e}",
                config_path.display()
            )
        })?;

        config.validate().map_err(|e| {
            format!(
                "Invalid plugin config at \"{}\": {e}",
                config_path.display()
            )
        })?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("name is empty".into());
        }
        for mode in [UiMode::Desktop, UiMode::Deck] {
            if !self.entrypoints.contains_key(&mode) {
                return Err(format!("missing entrypoints.{mode}"));
            }
        }
        Ok(())
    }
}

/// Scan a plugins directory and return all valid configs.
/// Invalid plugins are logged and skipped, never cause an error.
pub fn list_plugins(dir: &Path) -> Vec<PluginConfig> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(), // missing dir: no plugins installed yet
    };

    let mut configs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        match PluginConfig::load(&path) {
            Ok(config) => configs.push(config),
            Err(e) => warn!("Skipping plugin in {}: {e}", path.display()),
        }
    }

    configs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
