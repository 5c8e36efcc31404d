//! Pattern rules for syntax highlighting
//!
//! This module defines the rule types used to match and tokenize
//! source code for syntax highlighting.

use std::collections::HashSet;

use super::pattern::{CompileOptions, Hit, Pattern, PatternEngine};
use super::style::Span;
use super::tokens::TokenType;
use crate::error::SyntaxError;

fn compile(
    engine: &dyn PatternEngine,
    name: &str,
    source: &str,
    options: CompileOptions,
) -> Result<Pattern, SyntaxError> {
    Pattern::compile(engine, source, options).map_err(|source| SyntaxError::InvalidPattern {
        rule: name.to_string(),
        source,
    })
}

/// A rule applied inside another rule's match (escapes inside strings)
pub struct NestedRule {
    pub pattern: Pattern,
    pub token_type: TokenType,
}

/// A single-line pattern rule
///
/// Matches a pattern and assigns a token type to the tagged part of the
/// match. When two rules tag text starting at the same offset, the one
/// with the higher priority wins.
pub struct PatternRule {
    /// Name for debugging
    pub name: String,
    /// Compiled pattern
    pub pattern: Pattern,
    /// Token type to assign to matches
    pub token_type: TokenType,
    /// Priority (higher = preferred)
    pub priority: i32,
    /// Spans to carve out inside each match
    pub nested: Option<NestedRule>,
    /// Tagged texts this rule never claims
    excluded: HashSet<String>,
}

impl PatternRule {
    /// Create a new pattern rule
    pub fn new(
        engine: &dyn PatternEngine,
        name: &str,
        source: &str,
        token_type: TokenType,
        priority: i32,
    ) -> Result<Self, SyntaxError> {
        Ok(Self {
            name: name.to_string(),
            pattern: compile(engine, name, source, CompileOptions::default())?,
            token_type,
            priority,
            nested: None,
            excluded: HashSet::new(),
        })
    }

    /// Require word boundaries around the tagged text
    pub fn with_word_boundary(mut self) -> Self {
        self.pattern.bounded = true;
        self
    }

    /// Tag every match of `source` inside this rule's matches
    pub fn with_nested(
        mut self,
        engine: &dyn PatternEngine,
        source: &str,
        token_type: TokenType,
    ) -> Result<Self, SyntaxError> {
        let pattern = compile(engine, &self.name, source, CompileOptions::default())?;
        self.nested = Some(NestedRule {
            pattern,
            token_type,
        });
        Ok(self)
    }

    /// Never claim these exact texts
    pub fn excluding<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(words.into_iter().map(Into::into));
        self
    }

    /// Find the first claimable match at or after `start`
    pub fn find_at(&self, text: &str, start: usize) -> Option<Hit> {
        let mut from = start;
        loop {
            let hit = self.pattern.find_at(text, from)?;
            if !self.excluded.contains(&text[hit.tag_start..hit.tag_end]) {
                return Some(hit);
            }
            from = hit.tag_end;
        }
    }

    /// Spans for the nested rule within a match
    pub fn nested_spans(&self, text: &str, hit: &Hit) -> Vec<Span> {
        let mut spans = Vec::new();
        let Some(nested) = &self.nested else {
            return spans;
        };

        let mut pos = hit.tag_start;
        while pos < hit.tag_end {
            match nested.pattern.find_at(text, pos) {
                Some(inner) if inner.tag_end <= hit.tag_end => {
                    spans.push(Span::new(inner.tag_start, inner.tag_end, nested.token_type));
                    pos = inner.tag_end;
                }
                _ => break,
            }
        }
        spans
    }
}

/// A multi-line construct rule (block comments, raw strings)
///
/// These rules track state across lines for constructs that
/// can span multiple lines.
pub struct MultilineRule {
    /// Name for debugging
    pub name: String,
    /// Pattern that starts the construct
    pub start: Pattern,
    /// Pattern that ends the construct
    pub end: Pattern,
    /// Token type for this construct
    pub token_type: TokenType,
    /// Priority against single-line rules starting at the same offset
    pub priority: i32,
    /// Unique ID for this multiline state (non-zero)
    pub state_id: u8,
}

impl MultilineRule {
    /// Create a new multiline rule
    pub fn new(
        engine: &dyn PatternEngine,
        name: &str,
        start_pattern: &str,
        end_pattern: &str,
        token_type: TokenType,
        priority: i32,
        state_id: u8,
    ) -> Result<Self, SyntaxError> {
        Self::with_options(
            engine,
            name,
            (start_pattern, end_pattern),
            CompileOptions::default(),
            token_type,
            priority,
            state_id,
        )
    }

    /// Create a multiline rule with explicit compile options
    pub fn with_options(
        engine: &dyn PatternEngine,
        name: &str,
        (start_pattern, end_pattern): (&str, &str),
        options: CompileOptions,
        token_type: TokenType,
        priority: i32,
        state_id: u8,
    ) -> Result<Self, SyntaxError> {
        Ok(Self {
            name: name.to_string(),
            start: compile(engine, name, start_pattern, options)?,
            end: compile(engine, name, end_pattern, options)?,
            token_type,
            priority,
            state_id,
        })
    }

    /// Require word boundaries on both the start and end guards
    pub fn with_word_boundary(mut self) -> Self {
        self.start.bounded = true;
        self.end.bounded = true;
        self
    }

    /// Find start of this construct in text
    pub fn find_start(&self, text: &str, start: usize) -> Option<Hit> {
        self.start.find_at(text, start)
    }

    /// Find end of this construct in text, returning the offset just past it
    pub fn find_end(&self, text: &str, start: usize) -> Option<usize> {
        self.end.find_at(text, start).map(|hit| hit.end)
    }
}

/// Range state carried from one line to the next
///
/// Records whether the end of a line is still inside an unterminated
/// multi-line construct, and which one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangeState {
    /// No construct is open
    #[default]
    Closed,
    /// Inside the multiline rule with this ID
    Open(u8),
}

impl RangeState {
    /// Create state for being inside a multiline construct
    pub fn inside(state_id: u8) -> Self {
        Self::Open(state_id)
    }

    /// Check if we're inside a multiline construct
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

/// Result of classifying a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResult {
    /// Tagged spans, ordered by start offset
    pub spans: Vec<Span>,
    /// State at end of line (for next line)
    pub end_state: RangeState,
}
