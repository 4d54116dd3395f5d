use std::path::PathBuf;

use tower_lsp::lsp_types::Url;

/// State for each open document
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub content: String,
    pub version: i32,
}

impl DocumentState {
    /// Replace the text with a full-content change. Changes that do not
    /// advance the version are stale and leave the state alone.
    pub fn apply_change(&mut self, version: i32, content: String) -> bool {
        if version <= self.version {
            log::debug!(
                "Dropping stale change (version {} after {})",
                version,
                self.version
            );
            return false;
        }
        self.version = version;
        self.content = content;
        true
    }
}

/// Registry key and containing directory of a `file:` document
pub fn document_location(uri: &Url) -> Option<(String, PathBuf)> {
    let path = uri.to_file_path().ok()?;
    let dir = path.parent()?.to_path_buf();
    Some((path.to_string_lossy().into_owned(), dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_change_advances_version() {
        let mut state = DocumentState {
            content: "{}".to_string(),
            version: 1,
        };

        assert!(state.apply_change(2, "{\"a\":1}".to_string()));
        assert_eq!(state.version, 2);
        assert_eq!(state.content, "{\"a\":1}");
    }

    #[test]
    fn test_apply_change_drops_stale_versions() {
        let mut state = DocumentState {
            content: "new".to_string(),
            version: 5,
        };

        assert!(!state.apply_change(5, "same".to_string()));
        assert!(!state.apply_change(3, "old".to_string()));
        assert_eq!(state.version, 5);
        assert_eq!(state.content, "new");
    }

    #[test]
    fn test_document_location() {
        let uri = Url::parse("file:///a/b/model.gltf").expect("url");
        let (key, dir) = document_location(&uri).expect("file document");
        assert_eq!(key, "/a/b/model.gltf");
        assert_eq!(dir, PathBuf::from("/a/b"));

        let remote = Url::parse("https://example.com/model.gltf").expect("url");
        assert!(document_location(&remote).is_none());
    }
}
