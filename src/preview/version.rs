//! Format Generation Detection
//!
//! Classifies glTF content by its declared `asset.version`.

use serde_json::Value;

/// Coarse glTF format generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Generation {
    #[default]
    V1 = 1,
    V2 = 2,
}

impl Generation {
    /// Major version number as used in setting names
    pub fn major(self) -> u8 {
        self as u8
    }

    /// Setting key holding the preferred engine for this generation
    pub fn default_engine_key(self, namespace: &str) -> String {
        format!("{}.defaultV{}Engine", namespace, self.major())
    }
}

/// Best-effort parse of document text. Malformed input yields `None`.
pub fn parse_document(text: &str) -> Option<Value> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Document is not valid JSON, assuming glTF 1: {}", e);
            None
        }
    }
}

/// Classify parsed content. Anything that is not a version string starting
/// with `2` falls back to generation 1.
pub fn detect_generation(parsed: Option<&Value>) -> Generation {
    let version = parsed
        .and_then(|gltf| gltf.get("asset"))
        .and_then(|asset| asset.get("version"))
        .and_then(Value::as_str);

    match version {
        Some(v) if v.starts_with('2') => Generation::V2,
        _ => Generation::V1,
    }
}

/// Parse and classify in one step
pub fn detect_text_generation(text: &str) -> Generation {
    detect_generation(parse_document(text).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_two() {
        assert_eq!(
            detect_text_generation(r#"{"asset":{"version":"2.0"}}"#),
            Generation::V2
        );
    }

    #[test]
    fn test_version_one() {
        assert_eq!(
            detect_text_generation(r#"{"asset":{"version":"1.1"}}"#),
            Generation::V1
        );
    }

    #[test]
    fn test_missing_or_odd_versions() {
        assert_eq!(detect_text_generation("{}"), Generation::V1);
        assert_eq!(detect_text_generation(r#"{"asset":{}}"#), Generation::V1);
        assert_eq!(
            detect_text_generation(r#"{"asset":{"version":2}}"#),
            Generation::V1
        );
        assert_eq!(
            detect_text_generation(r#"{"asset":{"version":""}}"#),
            Generation::V1
        );
        assert_eq!(
            detect_text_generation(r#"{"asset":{"version":"3.0"}}"#),
            Generation::V1
        );
    }

    #[test]
    fn test_unparseable_text() {
        assert_eq!(
            detect_text_generation(r#"{"asset":{"version":"2.0"}"#),
            Generation::V1
        );
        assert_eq!(detect_text_generation(""), Generation::V1);
    }

    #[test]
    fn test_default_engine_key() {
        assert_eq!(
            Generation::V2.default_engine_key("glTF"),
            "glTF.defaultV2Engine"
        );
        assert_eq!(
            Generation::default().default_engine_key("glTF"),
            "glTF.defaultV1Engine"
        );
    }
}
