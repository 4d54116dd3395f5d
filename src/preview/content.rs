//! Preview payload assembly.
//!
//! The payload is the main template with its `{assets}` marker replaced by,
//! in order: stylesheet links, inert text slots, and script tags. The
//! in-page scripts find their configuration and content by slot id, so the
//! ids and their order are fixed.

use std::borrow::Cow;
use std::sync::Arc;

use crate::preview::assets::{ASSETS_PLACEHOLDER, PreviewAssets};
use crate::preview::resources::DefaultEnvironments;
use crate::preview::version::Generation;
use crate::settings::{ConfigLookup, NAMESPACE};

/// Stylesheets, relative to the extension root
pub const STYLES: &[&str] = &[
    "pages/babylonView.css",
    "pages/cesiumView.css",
    "pages/threeView.css",
    "pages/previewModel.css",
];

/// Scripts, relative to the extension root. Engine libraries load before
/// their view script; view scripts load before the shared preview script.
pub const SCRIPTS: &[&str] = &[
    "engines/Cesium/Cesium.js",
    "node_modules/babylonjs/babylon.max.js",
    "node_modules/babylonjs/babylon.inspector.min.js",
    "node_modules/babylonjs-loaders/babylonjs.loaders.js",
    "engines/Three/three.min.js",
    "engines/Three/DDSLoader.js",
    "engines/Three/DRACOLoader.js",
    "engines/Three/GLTFLoader.js",
    "engines/Three/OrbitControls.js",
    "pages/babylonView.js",
    "pages/cesiumView.js",
    "pages/threeView.js",
    "pages/previewModel.js",
];

/// Slot ids in payload order
pub const SLOT_IDS: [&str; 11] = [
    "extensionRootPath",
    "defaultEngine",
    "defaultBabylonReflection",
    "defaultThreeReflection",
    "dracoLoaderPath",
    "babylonHtml",
    "cesiumHtml",
    "threeHtml",
    "gltf",
    "gltfRootPath",
    "gltfFileName",
];

const DRACO_DECODER: &str = "engines/Draco/draco_decoder.js";

/// Per-refresh inputs describing one document
#[derive(Debug, Clone, Copy)]
pub struct PreviewDocument<'a> {
    pub generation: Generation,
    /// Raw document text, embedded unchanged
    pub text: &'a str,
    /// URL of the containing directory, ending in `/`
    pub root_url: &'a str,
    pub file_name: &'a str,
}

/// Builds preview payloads from the startup assets
#[derive(Debug, Clone)]
pub struct ContentAssembler {
    assets: Arc<PreviewAssets>,
    extension_root_url: String,
}

impl ContentAssembler {
    /// `extension_root_url` must end in `/`; asset paths are appended to it.
    pub fn new(assets: Arc<PreviewAssets>, extension_root_url: impl Into<String>) -> Self {
        Self {
            assets,
            extension_root_url: extension_root_url.into(),
        }
    }

    /// Assemble the full payload for one document
    pub fn assemble(
        &self,
        config: &dyn ConfigLookup,
        document: &PreviewDocument<'_>,
        defaults: &DefaultEnvironments,
    ) -> String {
        let root = self.extension_root_url.as_str();
        let default_engine = config
            .get(&document.generation.default_engine_key(NAMESPACE))
            .unwrap_or_default();
        let draco_loader_path = format!("{}{}", root, DRACO_DECODER);

        // Same order as SLOT_IDS.
        let values: [&str; 11] = [
            root,
            default_engine.as_str(),
            defaults.babylon.as_str(),
            defaults.three.as_str(),
            draco_loader_path.as_str(),
            self.assets.babylon_html(),
            self.assets.cesium_html(),
            self.assets.three_html(),
            document.text,
            document.root_url,
            document.file_name,
        ];

        let mut assets = String::new();
        for style in STYLES {
            assets.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{}{}\"></link>\n",
                root, style
            ));
        }
        for (id, text) in SLOT_IDS.iter().zip(values) {
            assets.push_str(&format!(
                "<script id=\"{}\" type=\"text/plain\">{}</script>\n",
                id,
                inert_text(text)
            ));
        }
        // The file: protocol needs the charset spelled out.
        for script in SCRIPTS {
            assets.push_str(&format!(
                "<script type=\"text/javascript\" charset=\"UTF-8\" src=\"{}{}\"></script>\n",
                root, script
            ));
        }

        self.assets.main_html().replacen(ASSETS_PLACEHOLDER, &assets, 1)
    }
}

/// Keep slot text inside its element. The tokenizer ends a script element
/// at `</script` and switches to escaped states at `<!--`, so `</script`
/// becomes `<\/script` (ASCII case-insensitive) and `<!--` becomes
/// `<\u0021--`. Both rewrites decode to the same JSON string.
fn inert_text(text: &str) -> Cow<'_, str> {
    const CLOSE: &[u8] = b"</script";
    const COMMENT: &[u8] = b"<!--";

    let bytes = text.as_bytes();
    let starts_with = |i: usize, pattern: &[u8]| {
        bytes
            .get(i..i + pattern.len())
            .is_some_and(|window| window.eq_ignore_ascii_case(pattern))
    };

    let mut escaped: Option<String> = None;
    let mut last = 0;
    for (i, _) in text.match_indices('<') {
        let replacement = if starts_with(i, CLOSE) {
            "<\\/"
        } else if starts_with(i, COMMENT) {
            "<\\u0021"
        } else {
            continue;
        };
        let out = escaped.get_or_insert_with(|| String::with_capacity(text.len() + 16));
        out.push_str(&text[last..i]);
        out.push_str(replacement);
        // Both patterns are rewritten through their second byte
        last = i + 2;
    }

    match escaped {
        Some(mut out) => {
            out.push_str(&text[last..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn assembler() -> ContentAssembler {
        let assets = PreviewAssets::from_pages(
            "<html><head>{assets}</head></html>".to_string(),
            "<div>babylon</div>",
            "<div>cesium</div>",
            "<div>three</div>",
        );
        ContentAssembler::new(Arc::new(assets), "file:///ext/")
    }

    fn document(text: &str) -> PreviewDocument<'_> {
        PreviewDocument {
            generation: Generation::V2,
            text,
            root_url: "file:///a/b/",
            file_name: "model.gltf",
        }
    }

    #[test]
    fn test_inert_text_escapes_closing_tags() {
        assert_eq!(inert_text("plain"), "plain");
        assert_eq!(
            inert_text(r#"{"a":"</script><b>","c":"</SCRIPT"}"#),
            r#"{"a":"<\/script><b>","c":"<\/SCRIPT"}"#
        );
    }

    #[test]
    fn test_inert_text_escapes_comment_openers() {
        assert_eq!(inert_text("a < b <!- c"), "a < b <!- c");
        assert_eq!(
            inert_text(r#"{"note":"<!--<script>"}"#),
            r#"{"note":"<\u0021--<script>"}"#
        );

        let text = r#"{"a":"<!--</script>","b":"x<!--"}"#;
        let escaped = inert_text(text);
        assert!(!escaped.contains("<!--"));
        assert!(!escaped.to_ascii_lowercase().contains("</script"));
        let original: serde_json::Value = serde_json::from_str(text).expect("json");
        let decoded: serde_json::Value = serde_json::from_str(&escaped).expect("escaped json");
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_order_of_sections() {
        let html = assembler().assemble(
            &HashMap::<String, String>::new(),
            &document("{}"),
            &DefaultEnvironments::default(),
        );

        let last_style = html.find("previewModel.css").expect("style");
        let first_slot = html.find("id=\"extensionRootPath\"").expect("slot");
        let last_slot = html.find("id=\"gltfFileName\"").expect("slot");
        let first_script = html.find("Cesium.js").expect("script");
        assert!(last_style < first_slot);
        assert!(last_slot < first_script);
        assert!(html.starts_with("<html><head><link rel=\"stylesheet\""));
        assert!(html.ends_with("</script>\n</head></html>"));
    }

    #[test]
    fn test_slots_follow_fixed_order() {
        let html = assembler().assemble(
            &HashMap::<String, String>::new(),
            &document("{}"),
            &DefaultEnvironments::default(),
        );

        let positions: Vec<usize> = SLOT_IDS
            .iter()
            .map(|id| html.find(&format!("<script id=\"{}\"", id)).expect("slot present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_engine_fragments_are_encoded() {
        let html = assembler().assemble(
            &HashMap::<String, String>::new(),
            &document("{}"),
            &DefaultEnvironments::default(),
        );
        assert!(html.contains(
            "<script id=\"threeHtml\" type=\"text/plain\">%3Cdiv%3Ethree%3C/div%3E</script>"
        ));
    }

    #[test]
    fn test_draco_and_asset_paths() {
        let html = assembler().assemble(
            &HashMap::<String, String>::new(),
            &document("{}"),
            &DefaultEnvironments::default(),
        );
        assert!(html.contains(
            "<script id=\"dracoLoaderPath\" type=\"text/plain\">file:///ext/engines/Draco/draco_decoder.js</script>"
        ));
        assert!(html.contains(
            "<script type=\"text/javascript\" charset=\"UTF-8\" src=\"file:///ext/pages/previewModel.js\"></script>"
        ));
    }
}
