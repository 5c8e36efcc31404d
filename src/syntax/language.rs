//! Language definitions for syntax highlighting
//!
//! A [`LanguageDefinition`] combines pattern rules and multiline rules,
//! and classifies one line at a time given the range state left open by
//! the previous line.

use super::pattern::Hit;
use super::rules::{HighlightResult, MultilineRule, PatternRule, RangeState};
use super::style::Span;

/// A complete language definition for syntax highlighting
pub struct LanguageDefinition {
    /// Language name (e.g., "Go")
    pub name: String,
    /// File extensions (e.g., ["go"])
    pub extensions: Vec<String>,
    /// Single-line pattern rules, sorted by priority (highest first)
    pub patterns: Vec<PatternRule>,
    /// Multi-line rules for comments, raw strings, etc.
    pub multiline_rules: Vec<MultilineRule>,
}

/// A rule's next hit on the line being classified
#[derive(Clone, Copy)]
enum Lookup {
    /// Not searched yet
    Pending,
    Found(Hit),
    /// No match anywhere after the last search start
    Exhausted,
}

/// The next construct claimed on a line
enum Candidate<'a> {
    Pattern(&'a PatternRule, Hit),
    Multiline(&'a MultilineRule, Hit),
}

impl Candidate<'_> {
    fn tag_start(&self) -> usize {
        match self {
            Candidate::Pattern(_, hit) | Candidate::Multiline(_, hit) => hit.tag_start,
        }
    }

    fn priority(&self) -> i32 {
        match self {
            Candidate::Pattern(rule, _) => rule.priority,
            Candidate::Multiline(rule, _) => rule.priority,
        }
    }

    /// Leftmost first, then higher priority
    fn beats(&self, other: &Candidate<'_>) -> bool {
        let (a, b) = (self.tag_start(), other.tag_start());
        a < b || (a == b && self.priority() > other.priority())
    }
}

impl LanguageDefinition {
    /// Create a new empty language definition
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            extensions: Vec::new(),
            patterns: Vec::new(),
            multiline_rules: Vec::new(),
        }
    }

    /// Add a file extension
    pub fn add_extension(&mut self, ext: &str) {
        self.extensions.push(ext.to_string());
    }

    /// Whether a file extension belongs to this language
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Add a pattern rule
    pub fn add_pattern(&mut self, rule: PatternRule) {
        self.patterns.push(rule);
        // Keep sorted by priority (highest first)
        self.patterns.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Add a multiline rule
    pub fn add_multiline(&mut self, rule: MultilineRule) {
        self.multiline_rules.push(rule);
    }

    /// Get multiline rule by state ID
    fn get_multiline_rule(&self, state_id: u8) -> Option<&MultilineRule> {
        self.multiline_rules.iter().find(|r| r.state_id == state_id)
    }

    /// Earliest construct at or after `pos`
    ///
    /// `memo` holds one slot per rule, multiline rules first. A slot is
    /// searched again only once `pos` has moved past its cached hit.
    fn next_candidate(
        &self,
        text: &str,
        pos: usize,
        memo: &mut [Lookup],
    ) -> Option<Candidate<'_>> {
        let split = self.multiline_rules.len();
        let mut best: Option<Candidate<'_>> = None;

        for (index, slot) in memo.iter_mut().enumerate() {
            let stale = match slot {
                Lookup::Pending => true,
                Lookup::Found(hit) => hit.start < pos,
                Lookup::Exhausted => false,
            };
            if stale {
                let found = match index.checked_sub(split) {
                    None => self.multiline_rules[index].find_start(text, pos),
                    Some(p) => self.patterns[p].find_at(text, pos),
                };
                *slot = found.map_or(Lookup::Exhausted, Lookup::Found);
            }

            let Lookup::Found(hit) = *slot else {
                continue;
            };
            let candidate = match index.checked_sub(split) {
                None => Candidate::Multiline(&self.multiline_rules[index], hit),
                Some(p) => Candidate::Pattern(&self.patterns[p], hit),
            };
            if best.as_ref().map_or(true, |current| candidate.beats(current)) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Classify a single line of text
    ///
    /// Takes the line text and the state from the previous line.
    /// Returns spans and the state for the next line.
    pub fn classify(&self, text: &str, prev_state: RangeState) -> HighlightResult {
        let mut spans = Vec::new();
        let mut pos = 0;

        // Finish whatever the previous line left open
        if let RangeState::Open(state_id) = prev_state {
            if let Some(rule) = self.get_multiline_rule(state_id) {
                match rule.find_end(text, 0) {
                    Some(end_pos) => {
                        spans.push(Span::new(0, end_pos, rule.token_type));
                        pos = end_pos;
                    }
                    None => {
                        if !text.is_empty() {
                            spans.push(Span::new(0, text.len(), rule.token_type));
                        }
                        return HighlightResult {
                            spans,
                            end_state: prev_state,
                        };
                    }
                }
            }
        }

        let mut memo = vec![Lookup::Pending; self.multiline_rules.len() + self.patterns.len()];
        while pos < text.len() {
            let Some(candidate) = self.next_candidate(text, pos, &mut memo) else {
                break;
            };

            match candidate {
                Candidate::Pattern(rule, hit) => {
                    spans.push(Span::new(hit.tag_start, hit.tag_end, rule.token_type));
                    spans.extend(rule.nested_spans(text, &hit));
                    pos = hit.tag_end;
                }
                Candidate::Multiline(rule, hit) => match rule.find_end(text, hit.end) {
                    Some(close_pos) => {
                        // Complete construct on this line
                        spans.push(Span::new(hit.tag_start, close_pos, rule.token_type));
                        pos = close_pos;
                    }
                    None => {
                        // Multiline continues to next line
                        spans.push(Span::new(hit.tag_start, text.len(), rule.token_type));
                        return HighlightResult {
                            spans,
                            end_state: RangeState::inside(rule.state_id),
                        };
                    }
                },
            }
        }

        HighlightResult {
            spans,
            end_state: RangeState::Closed,
        }
    }
}
