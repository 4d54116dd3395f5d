//! LSP Protocol Implementation
//!
//! Connects the preview core to an editor over stdio.

pub mod backend;
pub mod document;
pub mod handlers;
pub mod host;
pub mod protocol;
pub mod server;

pub use backend::Backend;
