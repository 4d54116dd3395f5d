use serde_json::Value;
use tower_lsp::jsonrpc::{Error, Result as LspResult};
use tower_lsp::lsp_types::{MessageType, Url};

use crate::lsp::backend::Backend;
use crate::lsp::document::document_location;
use crate::lsp::protocol::{PreviewDisposedParams, ShowPreviewParams, ShowPreviewResult};
use crate::settings::SettingsLayer;

/// Trait for handling preview lifecycle requests
#[tower_lsp::async_trait]
pub trait HandlePreview {
    async fn handle_show_preview(
        &self,
        params: ShowPreviewParams,
    ) -> LspResult<ShowPreviewResult>;
    async fn handle_preview_disposed(&self, params: PreviewDisposedParams);
    async fn refresh_preview(&self, uri: &Url, content: &str);
}

/// Trait for handling settings pushed by the editor
#[tower_lsp::async_trait]
pub trait HandleConfiguration {
    async fn handle_configuration_change(&self, settings: Value);
}

#[tower_lsp::async_trait]
impl HandlePreview for Backend {
    async fn handle_show_preview(
        &self,
        params: ShowPreviewParams,
    ) -> LspResult<ShowPreviewResult> {
        let uri = params.uri;
        let Some((key, dir)) = document_location(&uri) else {
            return Err(Error::invalid_params(format!(
                "Preview needs a file document, got {}",
                uri
            )));
        };

        let content = {
            let docs = self.documents.lock().await;
            match docs.get(&uri) {
                Some(state) => state.content.clone(),
                None => {
                    return Err(Error::invalid_params(format!(
                        "Document is not open: {}",
                        uri
                    )));
                }
            }
        };

        let mut previews = self.previews.lock().await;
        match previews.show(&key, &content, &dir) {
            Ok(entry) => Ok(ShowPreviewResult { panel_id: entry.id }),
            Err(e) => {
                log::error!("Failed to show preview for {}: {:#}", key, e);
                self.client
                    .log_message(
                        MessageType::ERROR,
                        format!("Failed to show glTF preview: {}", e),
                    )
                    .await;
                let mut error = Error::internal_error();
                error.message = e.to_string().into();
                Err(error)
            }
        }
    }

    async fn handle_preview_disposed(&self, params: PreviewDisposedParams) {
        let mut previews = self.previews.lock().await;
        if !previews.host_mut().dispose(params.panel_id) {
            log::debug!("Ignoring disposal of unknown preview {}", params.panel_id);
        }
    }

    async fn refresh_preview(&self, uri: &Url, content: &str) {
        let Some((key, _)) = document_location(uri) else {
            return;
        };

        let mut previews = self.previews.lock().await;
        previews.update(&key, content);
    }
}

#[tower_lsp::async_trait]
impl HandleConfiguration for Backend {
    async fn handle_configuration_change(&self, settings: Value) {
        let mut previews = self.previews.lock().await;
        previews
            .config_mut()
            .apply_json(SettingsLayer::Editor, &settings);
        log::info!("Applied settings from the editor");
    }
}
