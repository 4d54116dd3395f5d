//! Static page assets, read once at startup.

use std::path::Path;

use anyhow::{Context, Result};

/// Marker in the main template replaced by the assembled assets
pub const ASSETS_PLACEHOLDER: &str = "{assets}";

const MAIN_TEMPLATE: &str = "pages/previewModel.html";
const BABYLON_VIEW: &str = "pages/babylonView.html";
const CESIUM_VIEW: &str = "pages/cesiumView.html";
const THREE_VIEW: &str = "pages/threeView.html";

/// Main template plus the engine view fragments. Fragments are stored
/// URI-encoded so they can sit verbatim inside a text slot.
#[derive(Debug, Clone)]
pub struct PreviewAssets {
    main_html: String,
    babylon_html: String,
    cesium_html: String,
    three_html: String,
}

impl PreviewAssets {
    /// Read all pages below the extension root
    pub fn load(extension_root: &Path) -> Result<Self> {
        let read = |relative: &str| {
            let path = extension_root.join(relative);
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preview page: {}", path.display()))
        };

        let assets = Self::from_pages(
            read(MAIN_TEMPLATE)?,
            &read(BABYLON_VIEW)?,
            &read(CESIUM_VIEW)?,
            &read(THREE_VIEW)?,
        );

        if !assets.main_html.contains(ASSETS_PLACEHOLDER) {
            log::warn!(
                "{} has no {} marker, previews will carry no assets",
                MAIN_TEMPLATE,
                ASSETS_PLACEHOLDER
            );
        }

        Ok(assets)
    }

    /// Build from page contents already in memory
    pub fn from_pages(main_html: String, babylon: &str, cesium: &str, three: &str) -> Self {
        Self {
            main_html,
            babylon_html: encode_uri(babylon),
            cesium_html: encode_uri(cesium),
            three_html: encode_uri(three),
        }
    }

    pub fn main_html(&self) -> &str {
        &self.main_html
    }

    pub fn babylon_html(&self) -> &str {
        &self.babylon_html
    }

    pub fn cesium_html(&self) -> &str {
        &self.cesium_html
    }

    pub fn three_html(&self) -> &str {
        &self.three_html
    }
}

/// Percent-encode like JavaScript's `encodeURI`: URI reserved characters,
/// `#`, and the unreserved marks pass through; everything else is encoded
/// as UTF-8 bytes.
pub fn encode_uri(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || ";,/?:@&=+$-_.!~*'()#".contains(ch) {
            out.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uri_keeps_reserved() {
        assert_eq!(
            encode_uri("http://x.com/a?b=c&d=e#f;g,h+$!~*'()"),
            "http://x.com/a?b=c&d=e#f;g,h+$!~*'()"
        );
    }

    #[test]
    fn test_encode_uri_markup() {
        assert_eq!(
            encode_uri("<div id=\"a\">b c</div>\n"),
            "%3Cdiv%20id=%22a%22%3Eb%20c%3C/div%3E%0A"
        );
    }

    #[test]
    fn test_encode_uri_non_ascii() {
        assert_eq!(encode_uri("é€"), "%C3%A9%E2%82%AC");
        assert_eq!(encode_uri("100%"), "100%25");
    }

    #[test]
    fn test_load_missing_pages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = PreviewAssets::load(dir.path()).expect_err("pages are missing");
        assert!(err.to_string().contains("previewModel.html"));
    }
}
