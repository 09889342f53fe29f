//! Tagged pattern lists and match results.
//!
//! A [`PatternSet`] is an ordered list of regexes, each labelled with a
//! caller-defined tag. Matching reports the tag of the winning pattern, never
//! its position, so reordering a list cannot silently change which branch a
//! flow takes.

use std::collections::HashMap;
use std::fmt::Debug;

use regex::bytes::Regex;

#[derive(Debug, Clone)]
struct Pattern<T> {
    tag: T,
    regex: Regex,
}

/// Ordered list of tagged patterns. Earlier entries take priority.
#[derive(Debug, Clone)]
pub struct PatternSet<T> {
    patterns: Vec<Pattern<T>>,
}

impl<T: Copy + Debug> PatternSet<T> {
    /// Create an empty pattern set.
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Append a pattern compiled from `pattern`.
    pub fn with(mut self, tag: T, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.patterns.push(Pattern { tag, regex });
        Ok(self)
    }

    /// Find the first pattern, in listed order, that matches `haystack`.
    ///
    /// Returns the match and the byte offset where it ends.
    pub fn find(&self, haystack: &[u8]) -> Option<(Match<T>, usize)> {
        self.patterns.iter().find_map(|pattern| {
            pattern.regex.captures(haystack).map(|caps| {
                let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
                let captures = pattern
                    .regex
                    .capture_names()
                    .flatten()
                    .filter_map(|name| {
                        caps.name(name).map(|m| {
                            (
                                name.to_string(),
                                String::from_utf8_lossy(m.as_bytes()).into_owned(),
                            )
                        })
                    })
                    .collect();

                let found = Match {
                    tag: pattern.tag,
                    matched: String::from_utf8_lossy(&haystack[whole.0..whole.1]).into_owned(),
                    captures,
                };
                (found, whole.1)
            })
        })
    }

}

impl<T: Copy + Debug> Default for PatternSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of a successful pattern search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<T> {
    /// Tag of the pattern that matched.
    pub tag: T,

    /// The matched text (lossy UTF-8).
    pub matched: String,

    /// Named capture groups that participated in the match.
    pub captures: HashMap<String, String>,
}

impl<T> Match<T> {
    /// Value of a named capture, if it participated.
    pub fn capture(&self, name: &str) -> Option<&str> {
        self.captures.get(name).map(String::as_str)
    }

    /// Whether a named capture participated in the match.
    pub fn has(&self, name: &str) -> bool {
        self.captures.contains_key(name)
    }
}
