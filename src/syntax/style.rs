//! Style types for text rendering
//!
//! Spans produced by the classifier carry a [`TokenType`]; a [`Theme`]
//! turns that into a concrete [`Style`] when the line is drawn.

use std::collections::HashMap;

use super::tokens::TokenType;

/// Terminal colors (ANSI 16-color palette for compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Color {
    /// Parse a color name such as `"magenta"` or `"bright-black"`
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.trim().to_lowercase().replace('_', "-").as_str() {
            "default" => Color::Default,
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "bright-black" | "gray" | "grey" => Color::BrightBlack,
            "bright-red" => Color::BrightRed,
            "bright-green" => Color::BrightGreen,
            "bright-yellow" => Color::BrightYellow,
            "bright-blue" => Color::BrightBlue,
            "bright-magenta" => Color::BrightMagenta,
            "bright-cyan" => Color::BrightCyan,
            "bright-white" => Color::BrightWhite,
            _ => return None,
        };
        Some(color)
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A tagged span of text within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset where this span starts (inclusive)
    pub start: usize,
    /// Byte offset where this span ends (exclusive)
    pub end: usize,
    /// Semantic category of the text
    pub token_type: TokenType,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, token_type: TokenType) -> Self {
        Self {
            start,
            end,
            token_type,
        }
    }

    /// Get the length of this span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The text this span covers, clipped to the line
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        let end = self.end.min(line.len());
        line.get(self.start..end).unwrap_or("")
    }
}

/// Token styles, with per-token overrides on top of the defaults
#[derive(Debug, Clone, Default)]
pub struct Theme {
    overrides: HashMap<TokenType, Style>,
}

impl Theme {
    /// Replace the style used for a token type
    pub fn set(&mut self, token_type: TokenType, style: Style) {
        self.overrides.insert(token_type, style);
    }

    /// Style for a token type
    pub fn style_for(&self, token_type: TokenType) -> Style {
        self.overrides
            .get(&token_type)
            .copied()
            .unwrap_or_else(|| token_type.default_style())
    }
}
