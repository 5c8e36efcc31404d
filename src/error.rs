//! Error types for yed-go

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// Top-level error type
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Usage(String),
}

/// A pattern the matching backend refused to compile
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PatternError(pub String);

/// Errors raised while building highlighting rules
#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("rule `{rule}` has an invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: PatternError,
    },
}

/// Errors raised by the format-on-save trigger
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("no active frame")]
    NoActiveFrame,

    #[error("active frame has no buffer")]
    NoBuffer,

    #[error("buffer has no path")]
    NoPath,

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to reload buffer: {0}")]
    Reload(#[source] io::Error),
}

/// Errors raised while loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
