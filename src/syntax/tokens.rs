//! Token types for syntax highlighting
//!
//! This module defines the semantic categories the Go classifier
//! assigns to spans, and their default visual styles.

use super::style::{Color, Style};

/// Semantic token types for syntax highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Comments (`//`, `/* */`) and disabled `#if 0` blocks
    Comment,
    /// String literals, including backtick raw strings
    String,
    /// Character (rune) literals
    Char,
    /// Escape sequences nested inside a string
    Escape,
    /// Numeric literals
    Number,
    /// Identifier directly followed by `(`
    Call,
    /// Declaration keywords (func, var, package, ...)
    Keyword,
    /// Control flow keywords (if, for, return, ...)
    ControlFlow,
    /// Builtin type names
    Type,
    /// Pseudo-preprocessor markers (defer, go, __FILE__, ...)
    Preprocessor,
    /// Named constants (nil, true, iota, ...)
    Constant,
    /// Identifier after `.` or `->`
    Field,
    /// Goto/break labels
    Label,
    /// Plain text
    Default,
}

impl TokenType {
    /// Every token type, in declaration order
    pub const ALL: [TokenType; 14] = [
        TokenType::Comment,
        TokenType::String,
        TokenType::Char,
        TokenType::Escape,
        TokenType::Number,
        TokenType::Call,
        TokenType::Keyword,
        TokenType::ControlFlow,
        TokenType::Type,
        TokenType::Preprocessor,
        TokenType::Constant,
        TokenType::Field,
        TokenType::Label,
        TokenType::Default,
    ];

    /// Get the default style for this token type
    pub fn default_style(&self) -> Style {
        match self {
            TokenType::Comment => Style::fg(Color::BrightBlack).with_italic(),
            TokenType::String => Style::fg(Color::Green),
            TokenType::Char => Style::fg(Color::Green),
            TokenType::Escape => Style::fg(Color::BrightYellow),
            TokenType::Number => Style::fg(Color::Cyan),
            TokenType::Call => Style::fg(Color::Blue),
            TokenType::Keyword => Style::fg(Color::Magenta).with_bold(),
            TokenType::ControlFlow => Style::fg(Color::BrightMagenta).with_bold(),
            TokenType::Type => Style::fg(Color::Yellow),
            TokenType::Preprocessor => Style::fg(Color::BrightBlue),
            TokenType::Constant => Style::fg(Color::BrightRed),
            TokenType::Field => Style::fg(Color::BrightCyan),
            TokenType::Label => Style::fg(Color::Yellow).with_underline(),
            TokenType::Default => Style::default(),
        }
    }

    /// Get a human-readable name for this token type
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::Comment => "Comment",
            TokenType::String => "String",
            TokenType::Char => "Char",
            TokenType::Escape => "Escape",
            TokenType::Number => "Number",
            TokenType::Call => "Call",
            TokenType::Keyword => "Keyword",
            TokenType::ControlFlow => "ControlFlow",
            TokenType::Type => "Type",
            TokenType::Preprocessor => "Preprocessor",
            TokenType::Constant => "Constant",
            TokenType::Field => "Field",
            TokenType::Label => "Label",
            TokenType::Default => "Default",
        }
    }

    /// Parse a token type from its name (for TOML loading)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}
