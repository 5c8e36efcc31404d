//! Keyword table
//!
//! Maps literal Go tokens to their highlight category. The table is built
//! once and then shared read-only by the classifier.

use tracing::warn;

use super::pattern::is_word_char;
use super::tokens::TokenType;

/// All the words assigned to one token type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordList {
    pub token_type: TokenType,
    pub words: Vec<String>,
}

/// Ordered keyword lists
///
/// When a word sits in more than one list, the earlier list wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordTable {
    lists: Vec<KeywordList>,
}

impl KeywordTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word to the list for `token_type`, creating the list if needed
    ///
    /// Returns false (and leaves the table alone) for words that are not
    /// identifiers or are already in that list.
    pub fn add(&mut self, token_type: TokenType, word: &str) -> bool {
        if !is_identifier(word) {
            warn!(word, kind = token_type.name(), "ignoring keyword that is not an identifier");
            return false;
        }

        let list = match self.lists.iter().position(|l| l.token_type == token_type) {
            Some(idx) => &mut self.lists[idx],
            None => {
                self.lists.push(KeywordList {
                    token_type,
                    words: Vec::new(),
                });
                let last = self.lists.len() - 1;
                &mut self.lists[last]
            }
        };

        if list.words.iter().any(|w| w == word) {
            return false;
        }
        list.words.push(word.to_string());
        true
    }

    /// Add several words to one list
    pub fn extend<'a>(&mut self, token_type: TokenType, words: impl IntoIterator<Item = &'a str>) {
        for word in words {
            self.add(token_type, word);
        }
    }

    /// Category of a word, if it is in the table
    pub fn lookup(&self, word: &str) -> Option<TokenType> {
        self.lists
            .iter()
            .find(|l| l.words.iter().any(|w| w == word))
            .map(|l| l.token_type)
    }

    /// The lists, in priority order
    pub fn lists(&self) -> &[KeywordList] {
        &self.lists
    }

    /// Every word in the table
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.lists.iter().flat_map(|l| l.words.iter().map(String::as_str))
    }
}

impl KeywordList {
    /// Regex alternation matching exactly one word of this list
    ///
    /// Longer words come first so `int8` is tried before `int`.
    pub fn alternation(&self) -> String {
        let mut words: Vec<&str> = self.words.iter().map(String::as_str).collect();
        words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        format!("(?:{})", words.join("|"))
    }
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => chars.all(is_word_char),
        _ => false,
    }
}
