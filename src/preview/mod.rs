//! glTF Preview Core
//!
//! Surface lifecycle and payload assembly, independent of the editor
//! protocol.

pub mod assets;
pub mod content;
pub mod registry;
pub mod resources;
pub mod surface;
pub mod version;

pub use assets::PreviewAssets;
pub use content::{ContentAssembler, PreviewDocument, SLOT_IDS};
pub use registry::{PanelEntry, PanelRegistry};
pub use resources::{DefaultEnvironments, Engine, ResourceRoots};
pub use surface::{DisposeHook, PanelId, Surface, SurfaceHost, SurfaceRequest};
pub use version::{Generation, detect_generation, detect_text_generation};
