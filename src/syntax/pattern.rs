//! Pattern matching backend
//!
//! Highlighting rules are written against the [`PatternEngine`] trait so
//! the classifier does not care which regex implementation runs them.
//! [`RegexEngine`] is the default backend, built on the `regex` crate.
//!
//! Word boundaries are checked here in plain Rust rather than with an
//! engine-specific escape like `\b`, so every backend gets the same
//! semantics: a bounded match may not touch an alphanumeric or `_`
//! character on either side.

use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

/// Options passed to the backend when compiling a pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Match letters regardless of case
    pub case_insensitive: bool,
}

impl CompileOptions {
    /// Case-insensitive matching
    pub fn case_insensitive() -> Self {
        Self {
            case_insensitive: true,
        }
    }
}

/// One match of a compiled pattern
///
/// `start..end` covers the whole match. `tag_start..tag_end` is the part
/// that gets highlighted: the first capture group when the pattern has
/// one, otherwise the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub start: usize,
    pub end: usize,
    pub tag_start: usize,
    pub tag_end: usize,
}

/// A pattern compiled by some backend
pub trait CompiledPattern: Send + Sync {
    /// Find the leftmost match beginning at or after `start`.
    ///
    /// The whole line is visible to the backend, so `^` only matches at
    /// offset 0 even when `start` is further along.
    fn find_at(&self, text: &str, start: usize) -> Option<Hit>;
}

/// A pattern compiler
pub trait PatternEngine {
    fn compile(
        &self,
        source: &str,
        options: CompileOptions,
    ) -> Result<Box<dyn CompiledPattern>, PatternError>;
}

/// Backend using the `regex` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexEngine;

struct RegexPattern(Regex);

impl CompiledPattern for RegexPattern {
    fn find_at(&self, text: &str, start: usize) -> Option<Hit> {
        if start > text.len() {
            return None;
        }
        let caps = self.0.captures_at(text, start)?;
        let whole = caps.get(0)?;
        let tag = caps.get(1).unwrap_or(whole);
        Some(Hit {
            start: whole.start(),
            end: whole.end(),
            tag_start: tag.start(),
            tag_end: tag.end(),
        })
    }
}

impl PatternEngine for RegexEngine {
    fn compile(
        &self,
        source: &str,
        options: CompileOptions,
    ) -> Result<Box<dyn CompiledPattern>, PatternError> {
        RegexBuilder::new(source)
            .case_insensitive(options.case_insensitive)
            .build()
            .map(|regex| Box::new(RegexPattern(regex)) as Box<dyn CompiledPattern>)
            .map_err(|e| PatternError(e.to_string()))
    }
}

/// A compiled pattern plus the word-boundary requirement
pub struct Pattern {
    compiled: Box<dyn CompiledPattern>,
    /// Reject matches whose tagged range touches a word character
    pub bounded: bool,
}

impl Pattern {
    /// Compile `source` with the given backend
    pub fn compile(
        engine: &dyn PatternEngine,
        source: &str,
        options: CompileOptions,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            compiled: engine.compile(source, options)?,
            bounded: false,
        })
    }

    /// Find the first acceptable match at or after `start`
    ///
    /// Matches with an empty tagged range, and bounded matches sitting
    /// against a word character, are skipped; the search resumes one
    /// character after the rejected match began.
    pub fn find_at(&self, text: &str, start: usize) -> Option<Hit> {
        let mut from = start;
        while from <= text.len() {
            let hit = self.compiled.find_at(text, from)?;
            let non_empty = hit.tag_end > hit.tag_start;
            if non_empty && (!self.bounded || is_bounded(text, hit.tag_start, hit.tag_end)) {
                return Some(hit);
            }
            let retry = hit.start.max(from);
            from = retry + text[retry..].chars().next()?.len_utf8();
        }
        None
    }
}

/// Characters that glue onto identifiers
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `text[start..end]` has no word character directly outside it
pub fn is_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> Pattern {
        Pattern::compile(&RegexEngine, source, CompileOptions::default()).unwrap()
    }

    #[test]
    fn test_find_whole_match() {
        let pattern = compile(r"\d+");
        let hit = pattern.find_at("abc 123 def", 0).unwrap();
        assert_eq!((hit.start, hit.end), (4, 7));
        assert_eq!((hit.tag_start, hit.tag_end), (4, 7));
        assert!(pattern.find_at("no numbers", 0).is_none());
    }

    #[test]
    fn test_capture_group_is_tagged() {
        let pattern = compile(r"\.\s*([A-Za-z_]\w*)");
        let hit = pattern.find_at("os.Args", 0).unwrap();
        assert_eq!((hit.start, hit.end), (2, 7));
        assert_eq!((hit.tag_start, hit.tag_end), (3, 7));
    }

    #[test]
    fn test_line_anchor_sees_whole_line() {
        let pattern = compile(r"^x");
        assert!(pattern.find_at("xx", 1).is_none());
        assert!(pattern.find_at("xx", 0).is_some());
    }

    #[test]
    fn test_bounded_skips_embedded_words() {
        let mut pattern = compile("for");
        pattern.bounded = true;
        assert!(pattern.find_at("forever", 0).is_none());
        assert!(pattern.find_at("format", 0).is_none());
        let hit = pattern.find_at("forever for", 0).unwrap();
        assert_eq!((hit.tag_start, hit.tag_end), (8, 11));
    }

    #[test]
    fn test_bounded_retries_inside_rejected_match() {
        let mut pattern = compile(r"-?\d+");
        pattern.bounded = true;
        let hit = pattern.find_at("x-3", 0).unwrap();
        assert_eq!((hit.tag_start, hit.tag_end), (2, 3));
    }

    #[test]
    fn test_case_insensitive_option() {
        let pattern =
            Pattern::compile(&RegexEngine, "if", CompileOptions::case_insensitive()).unwrap();
        assert!(pattern.find_at("IF", 0).is_some());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Pattern::compile(&RegexEngine, "(unclosed", CompileOptions::default()).is_err());
    }

    #[test]
    fn test_is_bounded_unicode() {
        assert!(is_bounded("(x)", 1, 2));
        assert!(!is_bounded("éx", 2, 3));
        assert!(!is_bounded("x_", 0, 1));
    }
}
