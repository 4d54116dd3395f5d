//! glTF Preview Server
//!
//! Keeps an editor's glTF documents in sync with live, embedded 3D previews.
//!
//! This library provides:
//! - Format generation detection
//! - Preview payload assembly
//! - Per-document preview surface lifecycle
//! - Layered settings with live reload
//! - LSP protocol implementation

pub mod config;
pub mod lsp;
pub mod preview;
pub mod settings;

// Re-exports for clean public API
pub use config::Config;
pub use preview::{ContentAssembler, Generation, PanelRegistry, PreviewAssets};
pub use settings::{ConfigLookup, Settings};
