//! Settings file watching for live reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::SettingsLayer;

/// Events from the settings watcher
#[derive(Debug)]
pub enum SettingsEvent {
    Changed(SettingsLayer, PathBuf),
    WatcherError(notify::Error),
}

/// Watches settings files. Dropping it stops the watch.
pub struct SettingsWatcher {
    _watcher: RecommendedWatcher,
}

impl SettingsWatcher {
    /// Start watching the given files. Parent directories are watched so
    /// files created after startup are picked up too.
    pub fn start(
        files: Vec<(SettingsLayer, PathBuf)>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SettingsEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        // Some platforms report events under the canonical directory
        let watched: Vec<(SettingsLayer, PathBuf, Option<PathBuf>)> = files
            .iter()
            .map(|(layer, file)| (*layer, file.clone(), canonical_location(file)))
            .collect();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                        event.kind
                    {
                        for path in event.paths {
                            if let Some((layer, file, _)) =
                                watched.iter().find(|(_, file, canonical)| {
                                    *file == path || canonical.as_ref() == Some(&path)
                                })
                            {
                                let _ = tx.send(SettingsEvent::Changed(*layer, file.clone()));
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(SettingsEvent::WatcherError(e));
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        for (_, file) in &files {
            if let Some(dir) = file.parent().filter(|dir| dir.exists()) {
                watcher.watch(dir, RecursiveMode::NonRecursive)?;
            }
        }

        Ok((Self { _watcher: watcher }, rx))
    }
}

/// The file's path under its canonicalized parent directory. The file itself
/// may not exist yet.
fn canonical_location(file: &Path) -> Option<PathBuf> {
    let dir = file.parent()?.canonicalize().ok()?;
    Some(dir.join(file.file_name()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_location_of_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("settings.toml");
        let canonical = canonical_location(&file).expect("parent exists");
        assert_eq!(
            canonical,
            dir.path().canonicalize().expect("canonical").join("settings.toml")
        );
        assert!(canonical_location(Path::new("/definitely/not/here/settings.toml")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_canonical_location_resolves_linked_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let real = dir.path().join("real");
        std::fs::create_dir(&real).expect("create dir");
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).expect("symlink");

        assert_eq!(
            canonical_location(&link.join("settings.toml")),
            Some(real.canonicalize().expect("canonical").join("settings.toml"))
        );
    }
}
