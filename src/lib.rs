//! yed-go - Go syntax highlighting and gofmt-on-save for the yed editor
//!
//! The [`syntax`] module classifies Go source line by line, carrying
//! block comment, raw string and `#if 0` state across lines. The
//! [`format`] module runs the formatter after a save and reloads the
//! buffer. [`plugin`] wires both to editor events.

pub mod config;
pub mod error;
pub mod format;
pub mod plugin;
pub mod render;
pub mod syntax;

pub use config::Config;
pub use error::{PluginError, Result};
pub use plugin::{BufferId, BufferInfo, BufferKind, Event, FrameInfo, GoPlugin, Host};
