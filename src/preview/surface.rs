//! Display surface capability.
//!
//! The host owns the actual display resource. The registry only asks it to
//! create surfaces and keeps the handles it gets back. When the user closes a
//! surface the host fires the [`DisposeHook`] it was given at creation.

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// View type every preview surface is created with
pub const VIEW_TYPE: &str = "gltf.preview";

/// Title a surface carries until its first refresh
pub const INITIAL_TITLE: &str = "glTF Preview";

/// Identifier of one surface instance. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(pub u64);

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the host needs to create a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRequest {
    pub id: PanelId,
    pub view_type: &'static str,
    pub title: String,
    /// Only these directories may serve local assets to the surface
    pub local_resource_roots: Vec<PathBuf>,
    pub enable_scripts: bool,
    pub retain_context_when_hidden: bool,
}

/// One live display region
pub trait Surface {
    fn set_title(&mut self, title: &str);
    fn set_html(&mut self, html: String);
    /// Bring the surface to the foreground
    fn reveal(&mut self);
}

/// Creates surfaces on behalf of the registry
pub trait SurfaceHost {
    type Surface: Surface;

    fn create_surface(
        &mut self,
        request: SurfaceRequest,
        on_dispose: DisposeHook,
    ) -> Result<Self::Surface>;
}

/// Disposal message sent from a hook back to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Disposed {
    pub key: String,
    pub id: PanelId,
}

/// Fired by the host once a surface is gone
#[derive(Debug)]
pub struct DisposeHook {
    disposed: Disposed,
    tx: mpsc::UnboundedSender<Disposed>,
}

impl DisposeHook {
    pub(crate) fn new(key: String, id: PanelId, tx: mpsc::UnboundedSender<Disposed>) -> Self {
        Self {
            disposed: Disposed { key, id },
            tx,
        }
    }

    /// Document key of the surface this hook belongs to
    pub fn key(&self) -> &str {
        &self.disposed.key
    }

    pub fn panel_id(&self) -> PanelId {
        self.disposed.id
    }

    /// Report the surface as closed
    pub fn dispose(self) {
        if self.tx.send(self.disposed).is_err() {
            log::debug!("Preview registry is gone, dropping disposal");
        }
    }
}
