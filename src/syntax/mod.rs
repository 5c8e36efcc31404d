//! Syntax highlighting
//!
//! This module provides the Go lexical classifier:
//! - Pattern rules driven by a pluggable matching backend
//! - Range state carried across lines for block comments, raw strings
//!   and disabled `#if 0` blocks
//! - Per-buffer caching of that state

mod style;
mod tokens;
mod pattern;
mod keywords;
mod rules;
mod language;
mod manager;
mod builtin;

pub use style::{Color, Span, Style, Theme};
pub use tokens::TokenType;
pub use pattern::{
    is_bounded, CompileOptions, CompiledPattern, Hit, Pattern, PatternEngine, RegexEngine,
};
pub use keywords::{KeywordList, KeywordTable};
pub use rules::{HighlightResult, MultilineRule, PatternRule, RangeState};
pub use language::LanguageDefinition;
pub use manager::{HighlightCache, SyntaxManager};
pub use builtin::{go_keywords, go_language, BLOCK_COMMENT, DISABLED_CODE, RAW_STRING};
