//! Panel Registry
//!
//! One preview surface per document, keyed by the document's absolute path.
//! Surfaces are created on the first show, refreshed in place afterwards,
//! and forgotten once the host reports them closed.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc;

use crate::preview::content::{ContentAssembler, PreviewDocument};
use crate::preview::resources::{
    DefaultEnvironments, ResourceRoots, resolve_default_environments, to_directory_url,
};
use crate::preview::surface::{
    DisposeHook, Disposed, INITIAL_TITLE, PanelId, Surface, SurfaceHost, SurfaceRequest,
    VIEW_TYPE,
};
use crate::preview::version::detect_text_generation;
use crate::settings::{ConfigLookup, Settings};

/// A registered surface and the values cached for its lifetime
#[derive(Debug)]
pub struct PanelEntry<S> {
    pub id: PanelId,
    pub surface: S,
    /// Resolved once at creation; later settings changes do not touch these
    pub defaults: DefaultEnvironments,
}

pub struct PanelRegistry<H: SurfaceHost, C: ConfigLookup = Settings> {
    host: H,
    config: C,
    assembler: ContentAssembler,
    extension_root: PathBuf,
    panels: HashMap<String, PanelEntry<H::Surface>>,
    next_id: u64,
    disposed_tx: mpsc::UnboundedSender<Disposed>,
    disposed_rx: mpsc::UnboundedReceiver<Disposed>,
}

impl<H: SurfaceHost, C: ConfigLookup> PanelRegistry<H, C> {
    pub fn new(
        host: H,
        config: C,
        assembler: ContentAssembler,
        extension_root: impl Into<PathBuf>,
    ) -> Self {
        let (disposed_tx, disposed_rx) = mpsc::unbounded_channel();
        Self {
            host,
            config,
            assembler,
            extension_root: extension_root.into(),
            panels: HashMap::new(),
            next_id: 1,
            disposed_tx,
            disposed_rx,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Settings changes apply to the preferred engine on the next refresh.
    /// Cached default environments of existing surfaces stay as they are.
    pub fn config_mut(&mut self) -> &mut C {
        &mut self.config
    }

    /// Show the preview for a document, creating its surface if needed
    pub fn show(
        &mut self,
        key: &str,
        text: &str,
        document_dir: &Path,
    ) -> Result<&PanelEntry<H::Surface>> {
        self.reap_disposed();

        let entry = match self.panels.entry(key.to_string()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                let id = PanelId(self.next_id);
                let roots = ResourceRoots::new(self.extension_root.clone(), document_dir);
                let defaults = resolve_default_environments(&self.config, &roots);

                let request = SurfaceRequest {
                    id,
                    view_type: VIEW_TYPE,
                    title: INITIAL_TITLE.to_string(),
                    local_resource_roots: roots.to_vec(),
                    enable_scripts: true,
                    retain_context_when_hidden: true,
                };
                let hook = DisposeHook::new(key.to_string(), id, self.disposed_tx.clone());
                let surface = self.host.create_surface(request, hook)?;

                self.next_id += 1;
                log::info!("Created preview panel {} for {}", id, key);
                vacant.insert(PanelEntry {
                    id,
                    surface,
                    defaults,
                })
            }
        };

        refresh(&self.assembler, &self.config, entry, key, text);
        entry.surface.reveal();
        Ok(&*entry)
    }

    /// Refresh the preview of an already shown document. Returns `false`
    /// when the document has no preview.
    pub fn update(&mut self, key: &str, text: &str) -> bool {
        self.reap_disposed();

        match self.panels.get_mut(key) {
            Some(entry) => {
                refresh(&self.assembler, &self.config, entry, key, text);
                true
            }
            None => false,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&PanelEntry<H::Surface>> {
        self.reap_disposed();
        self.panels.get(key)
    }

    pub fn len(&mut self) -> usize {
        self.reap_disposed();
        self.panels.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Apply disposals reported by the host since the last call
    fn reap_disposed(&mut self) {
        while let Ok(disposed) = self.disposed_rx.try_recv() {
            let current = self.panels.get(&disposed.key).map(|entry| entry.id);
            if current == Some(disposed.id) {
                self.panels.remove(&disposed.key);
                log::info!("Preview panel {} for {} closed", disposed.id, disposed.key);
            }
        }
    }
}

/// Regenerate title and payload of one surface from the document text
fn refresh<S: Surface>(
    assembler: &ContentAssembler,
    config: &dyn ConfigLookup,
    entry: &mut PanelEntry<S>,
    key: &str,
    text: &str,
) {
    let path = Path::new(key);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| key.to_string());
    let root_url = to_directory_url(path.parent().unwrap_or(Path::new("/")));
    let generation = detect_text_generation(text);

    let document = PreviewDocument {
        generation,
        text,
        root_url: &root_url,
        file_name: &file_name,
    };

    entry
        .surface
        .set_title(&format!("{} [{}]", INITIAL_TITLE, file_name));
    entry
        .surface
        .set_html(assembler.assemble(config, &document, &entry.defaults));

    log::debug!(
        "Refreshed preview panel {} for {} (glTF {})",
        entry.id,
        key,
        generation.major()
    );
}
