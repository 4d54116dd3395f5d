use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::Config;
use crate::lsp::document::DocumentState;
use crate::lsp::handlers::{HandleConfiguration, HandlePreview};
use crate::lsp::host::LspSurfaceHost;
use crate::lsp::protocol::{PreviewDisposedParams, ShowPreviewParams, ShowPreviewResult};
use crate::preview::PanelRegistry;

/// Registry of previews shown in the editor
pub type EditorPreviews = PanelRegistry<LspSurfaceHost>;

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    pub previews: Arc<Mutex<EditorPreviews>>,
    pub config: Config,
}

impl Backend {
    pub fn new(client: Client, config: Config, previews: Arc<Mutex<EditorPreviews>>) -> Self {
        Self {
            client,
            documents: Arc::new(Mutex::new(HashMap::new())),
            previews,
            config,
        }
    }

    /// `glTF/showPreview`
    pub async fn show_preview(
        &self,
        params: ShowPreviewParams,
    ) -> tower_lsp::jsonrpc::Result<ShowPreviewResult> {
        self.handle_show_preview(params).await
    }

    /// `glTF/previewDisposed`
    pub async fn preview_disposed(&self, params: PreviewDisposedParams) {
        self.handle_preview_disposed(params).await
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        _: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(
                MessageType::INFO,
                format!(
                    "gltf-preview-server initialized (extension root {})",
                    self.config.extension_root.display()
                ),
            )
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        Ok(())
    }

    // Remember document text so a preview can be shown on request
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let mut docs = self.documents.lock().await;
        docs.insert(
            doc.uri,
            DocumentState {
                content: doc.text,
                version: doc.version,
            },
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        if let Some(change) = params.content_changes.into_iter().last() {
            let mut docs = self.documents.lock().await;
            let applied = match docs.get_mut(&uri) {
                Some(state) => state.apply_change(version, change.text.clone()),
                None => {
                    docs.insert(
                        uri.clone(),
                        DocumentState {
                            content: change.text.clone(),
                            version,
                        },
                    );
                    true
                }
            };
            drop(docs); // Release the lock before touching the previews

            if applied {
                self.refresh_preview(&uri, &change.text).await;
            }
        }
    }

    // The preview outlives the editor buffer; only the text is dropped
    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let mut docs = self.documents.lock().await;
        docs.remove(&params.text_document.uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.handle_configuration_change(params.settings).await;
    }
}
