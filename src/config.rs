//! Configuration file support
//!
//! Loads settings from ~/.yed-go.toml (or %USERPROFILE%\.yed-go.toml on
//! Windows). Every key is optional; unknown keys are ignored.
//!
//! Example:
//! ```toml
//! filetype = "Go"
//!
//! [format]
//! command = "gofmt"
//! args = ["-s", "-w"]
//! reload-on-failure = false
//! timeout-ms = 5000
//!
//! [keywords]
//! constant = ["ErrNotFound"]
//!
//! [colors]
//! Keyword = "bright-magenta"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use toml::{Table, Value};
use tracing::warn;

use crate::error::ConfigError;
use crate::format::FormatterConfig;
use crate::syntax::{go_keywords, Color, KeywordTable, Style, Theme, TokenType};

/// Formatter timeouts are clamped to this range (milliseconds)
const TIMEOUT_RANGE_MS: (u64, u64) = (100, 600_000);

/// Keyword list names in the `[keywords]` table
const KEYWORD_LISTS: [(&str, TokenType); 5] = [
    ("keyword", TokenType::Keyword),
    ("control-flow", TokenType::ControlFlow),
    ("type", TokenType::Type),
    ("preprocessor", TokenType::Preprocessor),
    ("constant", TokenType::Constant),
];

/// Configuration settings
#[derive(Debug, Clone)]
pub struct Config {
    /// File type name of buffers to handle
    pub filetype: String,
    /// Format-on-save settings
    pub format: FormatterConfig,
    /// Extra keywords appended to the built-in lists
    pub extra_keywords: Vec<(TokenType, String)>,
    /// Foreground color overrides
    pub colors: Vec<(TokenType, Color)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filetype: "Go".to_string(),
            format: FormatterConfig::default(),
            extra_keywords: Vec::new(),
            colors: Vec::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".yed-go.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".yed-go.toml"))
        }
    }

    /// Load configuration from the default location
    ///
    /// A missing file gives the defaults; an unreadable or invalid one is
    /// logged and also gives the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(err) => {
                warn!("Failed to load config at {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let table: Table = contents.parse()?;
        let mut config = Config::default();
        config.apply(&table);
        Ok(config)
    }

    /// Apply settings from a parsed table
    fn apply(&mut self, table: &Table) {
        if let Some(name) = table.get("filetype").and_then(Value::as_str) {
            let name = name.trim();
            if !name.is_empty() {
                self.filetype = name.to_string();
            }
        }

        if let Some(format) = table.get("format").and_then(Value::as_table) {
            self.apply_format(format);
        }

        if let Some(keywords) = table.get("keywords").and_then(Value::as_table) {
            for (key, token_type) in KEYWORD_LISTS {
                for word in string_list(keywords.get(key)) {
                    self.extra_keywords.push((token_type, word));
                }
            }
        }

        if let Some(colors) = table.get("colors").and_then(Value::as_table) {
            for (name, value) in colors {
                let token_type = TokenType::from_name(name);
                let color = value.as_str().and_then(Color::from_name);
                match (token_type, color) {
                    (Some(token_type), Some(color)) => self.colors.push((token_type, color)),
                    _ => warn!("ignoring color setting {} = {}", name, value),
                }
            }
        }
    }

    fn apply_format(&mut self, format: &Table) {
        if let Some(enabled) = format.get("enabled").and_then(Value::as_bool) {
            self.format.enabled = enabled;
        }

        if let Some(command) = format.get("command").and_then(Value::as_str) {
            let command = command.trim();
            if !command.is_empty() {
                self.format.command = command.to_string();
            }
        }

        if format.contains_key("args") {
            self.format.args = string_list(format.get("args"));
        }

        if let Some(reload) = format.get("reload-on-failure").and_then(Value::as_bool) {
            self.format.reload_on_failure = reload;
        }

        if let Some(ms) = format.get("timeout-ms").and_then(Value::as_integer) {
            let (min, max) = TIMEOUT_RANGE_MS;
            let ms = u64::try_from(ms).unwrap_or(0).clamp(min, max);
            self.format.timeout = Some(Duration::from_millis(ms));
        }
    }

    /// Built-in Go keywords plus any configured additions
    pub fn keyword_table(&self) -> KeywordTable {
        let mut table = go_keywords();
        for (token_type, word) in &self.extra_keywords {
            table.add(*token_type, word);
        }
        table
    }

    /// Default token styles with configured color overrides
    pub fn theme(&self) -> Theme {
        let mut theme = Theme::default();
        for &(token_type, color) in &self.colors {
            let style = Style {
                fg: color,
                ..token_type.default_style()
            };
            theme.set(token_type, style);
        }
        theme
    }
}

/// Strings from a TOML array, skipping anything that is not a string
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}
