//! Display surfaces living in the editor.
//!
//! Surface operations are synchronous for the registry. They are queued as
//! [`SurfaceCommand`]s and forwarded to the editor as notifications by
//! [`forward_surface_commands`].

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;
use tower_lsp::Client;

use crate::lsp::protocol::{
    CreatePreview, CreatePreviewParams, RevealPreview, RevealPreviewParams, SetPreviewContent,
    SetPreviewContentParams,
};
use crate::preview::{DisposeHook, PanelId, Surface, SurfaceHost, SurfaceRequest};

/// Pending surface operation for the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCommand {
    Create(CreatePreviewParams),
    SetContent(SetPreviewContentParams),
    Reveal(RevealPreviewParams),
}

/// Host creating surfaces in the editor
#[derive(Debug)]
pub struct LspSurfaceHost {
    commands: mpsc::UnboundedSender<SurfaceCommand>,
    hooks: HashMap<PanelId, DisposeHook>,
}

impl LspSurfaceHost {
    pub fn new(commands: mpsc::UnboundedSender<SurfaceCommand>) -> Self {
        Self {
            commands,
            hooks: HashMap::new(),
        }
    }

    /// Fire the disposal hook of a surface the editor closed. Returns
    /// `false` for unknown or already disposed panels.
    pub fn dispose(&mut self, id: PanelId) -> bool {
        match self.hooks.remove(&id) {
            Some(hook) => {
                hook.dispose();
                true
            }
            None => false,
        }
    }
}

impl SurfaceHost for LspSurfaceHost {
    type Surface = LspSurface;

    fn create_surface(
        &mut self,
        request: SurfaceRequest,
        on_dispose: DisposeHook,
    ) -> Result<LspSurface> {
        let id = request.id;
        let params = CreatePreviewParams {
            panel_id: id,
            view_type: request.view_type.to_string(),
            title: request.title.clone(),
            local_resource_roots: request.local_resource_roots,
            enable_scripts: request.enable_scripts,
            retain_context_when_hidden: request.retain_context_when_hidden,
        };
        self.commands
            .send(SurfaceCommand::Create(params))
            .map_err(|_| anyhow!("Editor connection is closed, cannot create preview {}", id))?;

        self.hooks.insert(id, on_dispose);
        Ok(LspSurface {
            id,
            title: request.title,
            commands: self.commands.clone(),
        })
    }
}

/// Handle to one surface in the editor
#[derive(Debug)]
pub struct LspSurface {
    id: PanelId,
    title: String,
    commands: mpsc::UnboundedSender<SurfaceCommand>,
}

impl LspSurface {
    fn send(&self, command: SurfaceCommand) {
        if self.commands.send(command).is_err() {
            log::warn!("Editor connection is closed, dropping update for preview {}", self.id);
        }
    }
}

impl Surface for LspSurface {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_html(&mut self, html: String) {
        self.send(SurfaceCommand::SetContent(SetPreviewContentParams {
            panel_id: self.id,
            title: self.title.clone(),
            html,
        }));
    }

    fn reveal(&mut self) {
        self.send(SurfaceCommand::Reveal(RevealPreviewParams { panel_id: self.id }));
    }
}

/// Deliver queued surface commands to the editor until the host is dropped
pub async fn forward_surface_commands(
    client: Client,
    mut commands: mpsc::UnboundedReceiver<SurfaceCommand>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            SurfaceCommand::Create(params) => {
                client.send_notification::<CreatePreview>(params).await;
            }
            SurfaceCommand::SetContent(params) => {
                client.send_notification::<SetPreviewContent>(params).await;
            }
            SurfaceCommand::Reveal(params) => {
                client.send_notification::<RevealPreview>(params).await;
            }
        }
    }
}
