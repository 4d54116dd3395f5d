//! Custom `glTF/*` protocol messages.
//!
//! Requests and notifications from the editor drive previews; notifications
//! to the editor drive its display surfaces.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Url;
use tower_lsp::lsp_types::notification::Notification;

use crate::preview::PanelId;

pub const SHOW_PREVIEW: &str = "glTF/showPreview";
pub const PREVIEW_DISPOSED: &str = "glTF/previewDisposed";

/// Editor asks for the preview of an open document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowPreviewParams {
    pub uri: Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPreviewResult {
    pub panel_id: PanelId,
}

/// Editor reports that the user closed a surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDisposedParams {
    pub panel_id: PanelId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreviewParams {
    pub panel_id: PanelId,
    pub view_type: String,
    pub title: String,
    pub local_resource_roots: Vec<PathBuf>,
    pub enable_scripts: bool,
    pub retain_context_when_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPreviewContentParams {
    pub panel_id: PanelId,
    pub title: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealPreviewParams {
    pub panel_id: PanelId,
}

pub enum CreatePreview {}

impl Notification for CreatePreview {
    type Params = CreatePreviewParams;
    const METHOD: &'static str = "glTF/createPreview";
}

pub enum SetPreviewContent {}

impl Notification for SetPreviewContent {
    type Params = SetPreviewContentParams;
    const METHOD: &'static str = "glTF/setPreviewContent";
}

pub enum RevealPreview {}

impl Notification for RevealPreview {
    type Params = RevealPreviewParams;
    const METHOD: &'static str = "glTF/revealPreview";
}
