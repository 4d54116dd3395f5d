//! Preview settings.
//!
//! Settings are read by dotted key (`glTF.defaultV2Engine`,
//! `glTF.Babylon.environment`, ...). Values come from up to three layers:
//! - user-global settings file
//! - workspace settings file
//! - settings pushed by the editor over `workspace/didChangeConfiguration`
//!
//! Later layers win.

pub mod watch;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

/// Namespace all preview settings live under
pub const NAMESPACE: &str = "glTF";

/// Capability to look up a configuration value by dotted key
pub trait ConfigLookup {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigLookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Source of a group of settings, lowest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingsLayer {
    UserGlobal = 0,
    Workspace = 1,
    Editor = 2,
}

/// Layered, flattened settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    layers: BTreeMap<SettingsLayer, BTreeMap<String, String>>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every settings file that exists. Missing files are skipped.
    pub fn load(files: &[(SettingsLayer, PathBuf)]) -> Result<Self> {
        let mut settings = Self::new();
        for (layer, path) in files {
            settings.load_file(*layer, path)?;
        }
        Ok(settings)
    }

    /// Load every settings file that exists. A file that fails to load is
    /// logged and skipped; the other layers are kept.
    pub fn load_available(files: &[(SettingsLayer, PathBuf)]) -> Self {
        let mut settings = Self::new();
        for (layer, path) in files {
            if let Err(e) = settings.load_file(*layer, path) {
                log::warn!("Ignoring {:?} settings: {:#}", layer, e);
            }
        }
        settings
    }

    /// Replace one layer with the contents of a TOML file. A missing file
    /// clears the layer.
    pub fn load_file(&mut self, layer: SettingsLayer, path: &Path) -> Result<()> {
        if !path.exists() {
            self.layers.remove(&layer);
            return Ok(());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        self.apply_toml_str(layer, &content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        log::info!("Loaded {:?} settings from {}", layer, path.display());
        Ok(())
    }

    /// Replace one layer with settings parsed from TOML text
    pub fn apply_toml_str(&mut self, layer: SettingsLayer, content: &str) -> Result<()> {
        let table: toml::Table = toml::from_str(content)?;
        let value = serde_json::to_value(table)?;
        self.apply_json(layer, &value);
        Ok(())
    }

    /// Replace one layer with settings from a JSON value
    pub fn apply_json(&mut self, layer: SettingsLayer, value: &Value) {
        let mut flat = BTreeMap::new();
        flatten_into(value, "", &mut flat);
        self.layers.insert(layer, flat);
    }

    /// Whether any layer holds a value
    pub fn is_empty(&self) -> bool {
        self.layers.values().all(BTreeMap::is_empty)
    }
}

impl ConfigLookup for Settings {
    fn get(&self, key: &str) -> Option<String> {
        self.layers
            .values()
            .rev()
            .find_map(|layer| layer.get(key).cloned())
    }
}

/// Flatten nested objects into dotted keys. Arrays and nulls carry no
/// setting we read and are skipped.
fn flatten_into(value: &Value, prefix: &str, out: &mut BTreeMap<String, String>) {
    let key = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        }
    };

    match value {
        Value::Object(map) => {
            for (name, child) in map {
                flatten_into(child, &key(name), out);
            }
        }
        Value::String(s) if !prefix.is_empty() => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Number(n) if !prefix.is_empty() => {
            out.insert(prefix.to_string(), n.to_string());
        }
        Value::Bool(b) if !prefix.is_empty() => {
            out.insert(prefix.to_string(), b.to_string());
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_toml() {
        let mut settings = Settings::new();
        settings
            .apply_toml_str(
                SettingsLayer::UserGlobal,
                r#"
[glTF]
defaultV2Engine = "Babylon.js"

[glTF.Three]
environment = "env/studio.hdr"
"#,
            )
            .expect("parse toml");

        assert_eq!(
            settings.get("glTF.defaultV2Engine").as_deref(),
            Some("Babylon.js")
        );
        assert_eq!(
            settings.get("glTF.Three.environment").as_deref(),
            Some("env/studio.hdr")
        );
        assert!(settings.get("glTF.defaultV1Engine").is_none());
    }

    #[test]
    fn test_dotted_json_keys() {
        let mut settings = Settings::new();
        settings.apply_json(
            SettingsLayer::Editor,
            &json!({ "glTF": { "Babylon.environment": "a.dds", "maxTextures": 4 } }),
        );

        assert_eq!(
            settings.get("glTF.Babylon.environment").as_deref(),
            Some("a.dds")
        );
        assert_eq!(settings.get("glTF.maxTextures").as_deref(), Some("4"));
    }

    #[test]
    fn test_layer_priority() {
        let mut settings = Settings::new();
        settings.apply_json(
            SettingsLayer::Editor,
            &json!({ "glTF": { "defaultV2Engine": "Three.js" } }),
        );
        settings.apply_json(
            SettingsLayer::UserGlobal,
            &json!({ "glTF": { "defaultV2Engine": "Cesium", "defaultV1Engine": "Babylon.js" } }),
        );

        assert_eq!(
            settings.get("glTF.defaultV2Engine").as_deref(),
            Some("Three.js")
        );
        assert_eq!(
            settings.get("glTF.defaultV1Engine").as_deref(),
            Some("Babylon.js")
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut settings = Settings::new();
        assert!(
            settings
                .apply_toml_str(SettingsLayer::Workspace, "[glTF\n")
                .is_err()
        );
        assert!(settings.is_empty());
    }
}
