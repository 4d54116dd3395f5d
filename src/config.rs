//! Configuration management for the glTF preview server.
//!
//! Handles:
//! - Command-line argument parsing
//! - Extension root and settings file locations

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::settings::SettingsLayer;

/// Workspace settings file, looked up in the working directory
pub const WORKSPACE_SETTINGS_FILE: &str = ".gltf-preview.toml";

/// Command-line arguments for the glTF preview server
#[derive(Debug, Parser)]
#[command(name = "gltf-preview-ls")]
#[command(about = "Live glTF preview server for text editors")]
#[command(version)]
pub struct Args {
    /// Directory holding the preview pages and engine scripts
    #[arg(long, help = "Extension root containing pages/ and engines/")]
    pub extension_root: Option<PathBuf>,

    /// User settings file
    #[arg(long, help = "User settings TOML file")]
    pub settings: Option<PathBuf>,

    /// Log level for the server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute extension root
    pub extension_root: PathBuf,
    /// Settings files, lowest priority first
    pub settings_files: Vec<(SettingsLayer, PathBuf)>,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read working directory")?;
        let absolute = |path: PathBuf| -> PathBuf {
            if path.is_absolute() {
                path
            } else {
                cwd.join(path)
            }
        };

        let extension_root = args
            .extension_root
            .map(absolute)
            .unwrap_or_else(|| cwd.clone());

        let mut settings_files = Vec::new();

        // User-specified file replaces the default user config location
        let user_settings = args
            .settings
            .map(absolute)
            .or_else(|| dirs::config_dir().map(default_user_settings));
        if let Some(path) = user_settings {
            settings_files.push((SettingsLayer::UserGlobal, path));
        }

        settings_files.push((SettingsLayer::Workspace, cwd.join(WORKSPACE_SETTINGS_FILE)));

        Ok(Config {
            extension_root,
            settings_files,
            log_level: args.log_level,
        })
    }
}

fn default_user_settings(config_dir: PathBuf) -> PathBuf {
    config_dir.join("gltf-preview").join("settings.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_paths() {
        let args = Args::parse_from([
            "gltf-preview-ls",
            "--extension-root",
            "/opt/gltf",
            "--settings",
            "/home/u/preview.toml",
            "--log-level",
            "debug",
        ]);
        let config = Config::from_args(args).expect("config");

        assert_eq!(config.extension_root, PathBuf::from("/opt/gltf"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.settings_files[0],
            (
                SettingsLayer::UserGlobal,
                PathBuf::from("/home/u/preview.toml")
            )
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(Args::parse_from(["gltf-preview-ls"])).expect("config");
        let cwd = std::env::current_dir().expect("cwd");

        assert_eq!(config.extension_root, cwd);
        assert_eq!(config.log_level, "info");
        assert_eq!(
            config.settings_files.last(),
            Some(&(SettingsLayer::Workspace, cwd.join(WORKSPACE_SETTINGS_FILE)))
        );
    }
}
