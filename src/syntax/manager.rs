//! Syntax highlighting manager
//!
//! This module provides the SyntaxManager that owns the Go language
//! definition and the per-buffer range state caches.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::language::LanguageDefinition;
use super::rules::RangeState;
use super::style::Span;

/// Per-buffer highlighting cache
///
/// `line_states[row]` is the range state at the end of `row`. Only a
/// prefix of the buffer is ever cached; rows past the end are computed
/// on demand.
#[derive(Debug, Clone, Default)]
pub struct HighlightCache {
    line_states: Vec<RangeState>,
}

impl HighlightCache {
    /// Invalidate cache from a specific row onwards
    pub fn invalidate_from(&mut self, row: usize) {
        self.line_states.truncate(row);
    }

    /// Invalidate entire cache
    pub fn invalidate_all(&mut self) {
        self.line_states.clear();
    }

    /// Number of leading rows with a known end state
    pub fn valid_rows(&self) -> usize {
        self.line_states.len()
    }

    /// End state of the last cached row
    fn last_state(&self) -> RangeState {
        self.line_states.last().copied().unwrap_or_default()
    }

    /// Record the end state of `row`
    ///
    /// A changed state makes every later row stale.
    fn record(&mut self, row: usize, state: RangeState) {
        match row.cmp(&self.line_states.len()) {
            std::cmp::Ordering::Equal => self.line_states.push(state),
            std::cmp::Ordering::Less if self.line_states[row] != state => {
                debug!(row, "range state changed, dropping later rows");
                self.line_states[row] = state;
                self.line_states.truncate(row + 1);
            }
            _ => {}
        }
    }
}

/// Main syntax highlighting manager
pub struct SyntaxManager {
    /// The language every managed buffer is highlighted as
    language: LanguageDefinition,
    /// Per-buffer caches (buffer id -> cache)
    caches: HashMap<usize, HighlightCache>,
    /// Whether syntax highlighting is enabled
    pub enabled: bool,
}

impl SyntaxManager {
    /// Create a manager for one language
    pub fn new(language: LanguageDefinition) -> Self {
        Self {
            language,
            caches: HashMap::new(),
            enabled: true,
        }
    }

    /// Whether a file name has one of the language's extensions
    pub fn handles_path(&self, filename: &Path) -> bool {
        filename
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.language.has_extension(ext))
    }

    /// Get or create a cache for a buffer
    pub fn get_cache(&mut self, buffer_id: usize) -> &mut HighlightCache {
        self.caches.entry(buffer_id).or_default()
    }

    /// Remove cache for a buffer (when buffer is closed)
    pub fn remove_cache(&mut self, buffer_id: usize) {
        self.caches.remove(&buffer_id);
    }

    /// Drop every cache
    pub fn clear(&mut self) {
        self.caches.clear();
    }

    /// Forget everything known about a buffer (after a load or reload)
    pub fn reset(&mut self, buffer_id: usize) {
        debug!(buffer_id, "resetting highlight cache");
        self.get_cache(buffer_id).invalidate_all();
    }

    /// Invalidate cache from a row onwards
    pub fn invalidate_from(&mut self, buffer_id: usize, row: usize) {
        if let Some(cache) = self.caches.get_mut(&buffer_id) {
            debug!(buffer_id, row, "invalidating highlight cache");
            cache.invalidate_from(row);
        }
    }

    /// Range state at the start of `row`
    ///
    /// Rows before it that are not cached yet are classified in order,
    /// fetching their text through `line_at`. If the buffer turns out to
    /// be shorter, the state after its last row is returned.
    pub fn state_before<F>(&mut self, buffer_id: usize, row: usize, mut line_at: F) -> RangeState
    where
        F: FnMut(usize) -> Option<String>,
    {
        let language = &self.language;
        let cache = self.caches.entry(buffer_id).or_default();

        while cache.valid_rows() < row {
            let next = cache.valid_rows();
            let Some(text) = line_at(next) else {
                break;
            };
            let state = language.classify(&text, cache.last_state()).end_state;
            cache.record(next, state);
        }

        match row {
            0 => RangeState::Closed,
            _ => cache
                .line_states
                .get(row - 1)
                .copied()
                .unwrap_or_else(|| cache.last_state()),
        }
    }

    /// Highlight a single row
    ///
    /// Returns spans for the row. Empty vec if highlighting is off.
    pub fn highlight_line<F>(
        &mut self,
        buffer_id: usize,
        row: usize,
        text: &str,
        line_at: F,
    ) -> Vec<Span>
    where
        F: FnMut(usize) -> Option<String>,
    {
        if !self.enabled {
            return Vec::new();
        }

        let prev_state = self.state_before(buffer_id, row, line_at);
        let result = self.language.classify(text, prev_state);
        self.get_cache(buffer_id).record(row, result.end_state);
        result.spans
    }

    /// Toggle syntax highlighting on/off
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builtin::{go_keywords, go_language, BLOCK_COMMENT};
    use crate::syntax::pattern::RegexEngine;
    use crate::syntax::tokens::TokenType;

    fn manager() -> SyntaxManager {
        SyntaxManager::new(go_language(&go_keywords(), &RegexEngine))
    }

    fn lines<'a>(rows: &'a [&'a str]) -> impl FnMut(usize) -> Option<String> + 'a {
        move |row| rows.get(row).map(|s| s.to_string())
    }

    #[test]
    fn test_handles_path() {
        let manager = manager();
        assert!(manager.handles_path(Path::new("main.go")));
        assert!(manager.handles_path(Path::new("dir/MAIN.GO")));
        assert!(!manager.handles_path(Path::new("main.rs")));
        assert!(!manager.handles_path(Path::new("go")));
    }

    #[test]
    fn test_state_carried_between_rows() {
        let rows = ["x := 1 /* open", "still comment", "*/ return"];
        let mut manager = manager();

        let spans = manager.highlight_line(0, 2, rows[2], lines(&rows));
        assert_eq!(spans[0], Span::new(0, 2, TokenType::Comment));
        assert_eq!(spans[1], Span::new(3, 9, TokenType::ControlFlow));
        assert_eq!(manager.get_cache(0).valid_rows(), 3);
    }

    #[test]
    fn test_invalidation_after_edit() {
        let mut rows = vec!["x := 1 /* open", "return"];
        let mut manager = manager();

        let spans = manager.highlight_line(0, 1, rows[1], lines(&rows));
        assert_eq!(spans, vec![Span::new(0, 6, TokenType::Comment)]);

        rows[0] = "x := 1";
        manager.invalidate_from(0, 0);
        assert_eq!(manager.get_cache(0).valid_rows(), 0);

        let spans = manager.highlight_line(0, 1, rows[1], lines(&rows));
        assert_eq!(spans, vec![Span::new(0, 6, TokenType::ControlFlow)]);
    }

    #[test]
    fn test_changed_state_drops_later_rows() {
        let rows = ["a", "b", "c"];
        let mut manager = manager();
        manager.state_before(0, 3, lines(&rows));
        assert_eq!(manager.get_cache(0).valid_rows(), 3);

        // Row 0 redrawn with text that opens a comment
        manager.highlight_line(0, 0, "/* open", lines(&rows));
        assert_eq!(manager.get_cache(0).valid_rows(), 1);
        assert_eq!(
            manager.state_before(0, 1, lines(&rows)),
            RangeState::Open(BLOCK_COMMENT)
        );
    }

    #[test]
    fn test_buffers_are_independent() {
        let open = ["/* open"];
        let plain = ["x"];
        let mut manager = manager();

        assert_eq!(manager.state_before(1, 1, lines(&open)), RangeState::Open(BLOCK_COMMENT));
        assert_eq!(manager.state_before(2, 1, lines(&plain)), RangeState::Closed);

        manager.reset(1);
        assert_eq!(manager.get_cache(1).valid_rows(), 0);
        assert_eq!(manager.get_cache(2).valid_rows(), 1);
    }

    #[test]
    fn test_short_buffer_uses_last_state() {
        let rows = ["/* open"];
        let mut manager = manager();
        assert_eq!(manager.state_before(0, 5, lines(&rows)), RangeState::Open(BLOCK_COMMENT));
    }

    #[test]
    fn test_disabled_manager() {
        let rows = ["func f()"];
        let mut manager = manager();
        manager.toggle();
        assert!(manager.highlight_line(0, 0, rows[0], lines(&rows)).is_empty());
    }
}
