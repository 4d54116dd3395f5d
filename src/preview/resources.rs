//! Local resource roots and resource URLs.
//!
//! A preview surface may only load assets from its resource roots: the
//! extension root and the directory of the previewed document.

use std::path::{Component, Path, PathBuf};

use tower_lsp::lsp_types::Url;

use crate::settings::{ConfigLookup, NAMESPACE};

/// Rendering engines available inside the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    Babylon,
    Cesium,
    Three,
}

impl Engine {
    pub fn name(self) -> &'static str {
        match self {
            Engine::Babylon => "Babylon",
            Engine::Cesium => "Cesium",
            Engine::Three => "Three",
        }
    }

    /// Setting key for the engine's default environment asset
    pub fn environment_key(self) -> String {
        format!("{}.{}.environment", NAMESPACE, self.name())
    }
}

/// Directories a preview surface may load from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoots {
    pub extension_root: PathBuf,
    pub document_dir: PathBuf,
}

impl ResourceRoots {
    pub fn new(extension_root: impl Into<PathBuf>, document_dir: impl Into<PathBuf>) -> Self {
        Self {
            extension_root: extension_root.into(),
            document_dir: document_dir.into(),
        }
    }

    /// Roots in the order handed to the host
    pub fn to_vec(&self) -> Vec<PathBuf> {
        vec![self.extension_root.clone(), self.document_dir.clone()]
    }

    /// Whether a path lies inside one of the roots
    pub fn contains(&self, path: &Path) -> bool {
        let path = normalize(path);
        [&self.extension_root, &self.document_dir]
            .iter()
            .any(|root| path.starts_with(normalize(root)))
    }

    /// Resolve a configured asset path. Relative paths are tried against the
    /// document directory first, then the extension root.
    pub fn resolve(&self, configured: &str) -> Option<PathBuf> {
        let configured = Path::new(configured);
        let candidate = if configured.is_absolute() {
            normalize(configured)
        } else {
            let in_document_dir = normalize(&self.document_dir.join(configured));
            if in_document_dir.exists() {
                in_document_dir
            } else {
                normalize(&self.extension_root.join(configured))
            }
        };

        self.contains(&candidate).then_some(candidate)
    }
}

/// Default environment URLs cached on a surface for its lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultEnvironments {
    pub babylon: String,
    pub three: String,
}

/// Resolve the default environments for both engines that take one
pub fn resolve_default_environments(
    config: &dyn ConfigLookup,
    roots: &ResourceRoots,
) -> DefaultEnvironments {
    DefaultEnvironments {
        babylon: resolve_environment_url(config, Engine::Babylon, roots),
        three: resolve_environment_url(config, Engine::Three, roots),
    }
}

/// Resolve one engine's configured environment to a resource URL. An empty
/// string means the engine uses its built-in default.
pub fn resolve_environment_url(
    config: &dyn ConfigLookup,
    engine: Engine,
    roots: &ResourceRoots,
) -> String {
    let Some(configured) = config
        .get(&engine.environment_key())
        .filter(|value| !value.trim().is_empty())
    else {
        return String::new();
    };

    match roots.resolve(configured.trim()) {
        Some(path) => to_resource_url(&path),
        None => {
            log::warn!(
                "{} environment '{}' is outside the preview resource roots, using the engine default",
                engine.name(),
                configured
            );
            String::new()
        }
    }
}

/// Convert an absolute file path into a resource URL
pub fn to_resource_url(path: &Path) -> String {
    match Url::from_file_path(path) {
        Ok(url) => url.to_string(),
        Err(()) => {
            log::warn!("Cannot build a file URL for {}", path.display());
            path.to_string_lossy().replace('\\', "/")
        }
    }
}

/// Convert a directory path into a resource URL ending in `/`
pub fn to_directory_url(path: &Path) -> String {
    match Url::from_directory_path(path) {
        Ok(url) => url.to_string(),
        Err(()) => {
            log::warn!("Cannot build a file URL for {}", path.display());
            let mut url = path.to_string_lossy().replace('\\', "/");
            if !url.ends_with('/') {
                url.push('/');
            }
            url
        }
    }
}

/// Lexically resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_environment_keys() {
        assert_eq!(Engine::Babylon.environment_key(), "glTF.Babylon.environment");
        assert_eq!(Engine::Three.environment_key(), "glTF.Three.environment");
    }

    #[test]
    fn test_unset_environment_is_empty() {
        let roots = ResourceRoots::new("/ext", "/a/b");
        let envs = resolve_default_environments(&config(&[]), &roots);
        assert_eq!(envs, DefaultEnvironments::default());
    }

    #[test]
    fn test_relative_environment_falls_back_to_extension_root() {
        let roots = ResourceRoots::new("/ext", "/a/b");
        let url = resolve_environment_url(
            &config(&[("glTF.Babylon.environment", "assets/env.dds")]),
            Engine::Babylon,
            &roots,
        );
        assert_eq!(url, "file:///ext/assets/env.dds");
    }

    #[test]
    fn test_environment_outside_roots_is_rejected() {
        let roots = ResourceRoots::new("/ext", "/a/b");
        let cfg = config(&[
            ("glTF.Babylon.environment", "/etc/env.dds"),
            ("glTF.Three.environment", "../../../escape.hdr"),
        ]);
        let envs = resolve_default_environments(&cfg, &roots);
        assert!(envs.babylon.is_empty());
        assert!(envs.three.is_empty());
    }

    #[test]
    fn test_absolute_environment_inside_document_dir() {
        let roots = ResourceRoots::new("/ext", "/a/b");
        let url = resolve_environment_url(
            &config(&[("glTF.Three.environment", "/a/b/./env/room.hdr")]),
            Engine::Three,
            &roots,
        );
        assert_eq!(url, "file:///a/b/env/room.hdr");
    }

    #[test]
    fn test_directory_url_has_trailing_slash() {
        assert_eq!(to_directory_url(Path::new("/a/b")), "file:///a/b/");
        assert_eq!(to_resource_url(Path::new("/a/b c.gltf")), "file:///a/b%20c.gltf");
    }
}
