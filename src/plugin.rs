//! Editor host glue
//!
//! The editor owns the event loop, buffers, rendering and subprocess
//! execution. It reaches this crate through [`GoPlugin::handle`], and this
//! crate reaches back through the [`Host`] trait. Only file buffers whose
//! file type matches the configured name (default `"Go"`) are handled.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::format::{FormatReport, FormatTrigger, SubprocessOutput};
use crate::syntax::{go_language, PatternEngine, RegexEngine, Span, SyntaxManager};

/// Host-assigned buffer identity
pub type BufferId = usize;

/// What a buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Backed by a file
    File,
    /// Scratch, log, or other editor-internal buffer
    Special,
}

/// What the host tells us about a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferInfo {
    pub id: BufferId,
    pub kind: BufferKind,
    /// Declared file type, e.g. `"Go"`
    pub filetype: Option<String>,
    /// Path on disk, if any
    pub path: Option<PathBuf>,
}

/// A window onto a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub buffer: Option<BufferInfo>,
    /// First row visible in the frame
    pub top_row: usize,
}

/// Host events the plugin listens to
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// A frame is about to draw its buffer
    FramePreBuffDraw { frame: &'a FrameInfo },
    /// One row is about to be drawn
    LinePreDraw {
        frame: &'a FrameInfo,
        row: usize,
        text: &'a str,
    },
    /// A row is about to change
    BufferPreMod { buffer: &'a BufferInfo, row: usize },
    /// A row has changed
    BufferPostMod { buffer: &'a BufferInfo, row: usize },
    /// A buffer was (re)loaded from disk
    BufferPostLoad { buffer: &'a BufferInfo },
    /// A buffer was written to disk
    BufferPostWrite { buffer: &'a BufferInfo },
}

/// Services the editor provides to the plugin
pub trait Host {
    /// The frame that currently has focus
    fn active_frame(&self) -> Option<FrameInfo>;

    /// Text of one row of a buffer
    fn line(&self, buffer: BufferId, row: usize) -> Option<String>;

    /// Run a program synchronously and capture its status and output
    fn run_subprocess(
        &mut self,
        program: &str,
        args: &[OsString],
        timeout: Option<Duration>,
    ) -> io::Result<SubprocessOutput>;

    /// Discard a buffer's contents and re-read it from disk
    fn reload_buffer(&mut self, buffer: BufferId) -> io::Result<()>;

    /// Show a status message
    fn message(&mut self, text: &str);

    /// Show an error message
    fn error(&mut self, text: &str);
}

/// The Go syntax and gofmt plugin
pub struct GoPlugin {
    syntax: SyntaxManager,
    format: FormatTrigger,
    filetype: String,
}

impl GoPlugin {
    /// Build the plugin with the regex backend
    pub fn new(config: &Config) -> Self {
        Self::with_engine(config, &RegexEngine)
    }

    /// Build the plugin with a specific pattern backend
    pub fn with_engine(config: &Config, engine: &dyn PatternEngine) -> Self {
        let language = go_language(&config.keyword_table(), engine);
        Self {
            syntax: SyntaxManager::new(language),
            format: FormatTrigger::new(config.format.clone()),
            filetype: config.filetype.clone(),
        }
    }

    pub fn syntax(&self) -> &SyntaxManager {
        &self.syntax
    }

    pub fn syntax_mut(&mut self) -> &mut SyntaxManager {
        &mut self.syntax
    }

    pub fn format_trigger(&self) -> &FormatTrigger {
        &self.format
    }

    /// Whether a buffer is ours to handle
    pub fn is_go_buffer(&self, buffer: &BufferInfo) -> bool {
        buffer.kind == BufferKind::File
            && buffer.filetype.as_deref() == Some(self.filetype.as_str())
    }

    fn go_buffer<'a>(&self, frame: &'a FrameInfo) -> Option<&'a BufferInfo> {
        frame.buffer.as_ref().filter(|b| self.is_go_buffer(b))
    }

    /// Dispatch one host event
    ///
    /// Returns the spans to draw for `LinePreDraw`, and nothing for the
    /// other events. Errors are reported through the host, never returned.
    pub fn handle(&mut self, host: &mut dyn Host, event: Event<'_>) -> Vec<Span> {
        match event {
            Event::FramePreBuffDraw { frame } => {
                if let Some(buffer) = self.go_buffer(frame) {
                    let id = buffer.id;
                    let host: &dyn Host = host;
                    self.syntax.state_before(id, frame.top_row, |row| host.line(id, row));
                }
            }
            Event::LinePreDraw { frame, row, text } => {
                if let Some(buffer) = self.go_buffer(frame) {
                    let id = buffer.id;
                    let host: &dyn Host = host;
                    return self.syntax.highlight_line(id, row, text, |r| host.line(id, r));
                }
            }
            Event::BufferPreMod { buffer, row } | Event::BufferPostMod { buffer, row } => {
                if self.is_go_buffer(buffer) {
                    self.syntax.invalidate_from(buffer.id, row);
                }
            }
            Event::BufferPostLoad { buffer } => {
                if self.is_go_buffer(buffer) {
                    self.syntax.reset(buffer.id);
                    if let Err(err) = self.format.on_file_loaded_or_focused(host) {
                        host.error(&err.to_string());
                    }
                }
            }
            Event::BufferPostWrite { buffer } => {
                if self.is_go_buffer(buffer) {
                    if let Some(report) = self.on_saved(host) {
                        debug!(
                            outcome = ?report.outcome,
                            reloaded = report.reloaded,
                            "format on save finished"
                        );
                    }
                    self.syntax.reset(buffer.id);
                }
            }
        }
        Vec::new()
    }

    fn on_saved(&mut self, host: &mut dyn Host) -> Option<FormatReport> {
        match self.format.on_file_saved(host) {
            Ok(report) => Some(report),
            Err(err) => {
                host.error(&err.to_string());
                None
            }
        }
    }

    /// Drop all cached state, as when the plugin is unloaded
    pub fn unload(&mut self) {
        self.syntax.clear();
    }
}
