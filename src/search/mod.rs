//! Full-text search over styled content.

mod highlight;

pub use highlight::highlight_matches;

use crate::ansi::strip_with_mapping;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub line: usize,
    pub column: usize,
    pub raw_column: usize,
    pub text: String,
}

// One output char per input char, so folded columns stay valid.
fn fold(ch: char, case_sensitive: bool) -> char {
    if case_sensitive {
        ch
    } else {
        ch.to_lowercase().next().unwrap_or(ch)
    }
}

pub fn find_matches(term: &str, content: &str, case_sensitive: bool) -> Vec<SearchMatch> {
    let needle: Vec<char> = term.chars().map(|c| fold(c, case_sensitive)).collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (line_number, line) in content.split('\n').enumerate() {
        let stripped = strip_with_mapping(line);
        if stripped.len() < needle.len() {
            continue;
        }
        let original: Vec<char> = stripped.plain.chars().collect();
        let haystack: Vec<char> = original
            .iter()
            .map(|&c| fold(c, case_sensitive))
            .collect();

        let mut column = 0;
        while column + needle.len() <= haystack.len() {
            if haystack[column..column + needle.len()] == needle[..] {
                matches.push(SearchMatch {
                    line: line_number,
                    column,
                    raw_column: stripped.positions[column],
                    text: original[column..column + needle.len()].iter().collect(),
                });
                column += needle.len();
            } else {
                column += 1;
            }
        }
    }
    matches
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    term: String,
    matches: Vec<SearchMatch>,
    current: Option<usize>,
    case_sensitive: bool,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.term.clear();
        self.matches.clear();
        self.current = None;
    }

    pub fn set_term(&mut self, term: &str, content: &str) {
        self.term = term.to_string();
        self.matches = find_matches(&self.term, content, self.case_sensitive);
        self.current = None;
        debug!(term = %self.term, matches = self.matches.len(), "search term set");
    }

    pub fn refresh(&mut self, content: &str) {
        if self.term.is_empty() {
            return;
        }
        self.matches = find_matches(&self.term, content, self.case_sensitive);
        self.current = match self.current {
            _ if self.matches.is_empty() => None,
            Some(index) => Some(index.min(self.matches.len() - 1)),
            None => None,
        };
        debug!(term = %self.term, matches = self.matches.len(), "search refreshed");
    }

    pub fn toggle_case_sensitive(&mut self, content: &str) {
        self.case_sensitive = !self.case_sensitive;
        if !self.term.is_empty() {
            let term = self.term.clone();
            self.set_term(&term, content);
        }
    }

    pub fn next_match(&mut self) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(index) => (index + 1) % self.matches.len(),
            None => 0,
        };
        self.current = Some(next);
        self.matches.get(next)
    }

    pub fn prev_match(&mut self) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        let prev = match self.current {
            Some(0) | None => self.matches.len() - 1,
            Some(index) => index - 1,
        };
        self.current = Some(prev);
        self.matches.get(prev)
    }

    pub fn current_match(&self) -> Option<&SearchMatch> {
        self.current.and_then(|index| self.matches.get(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_active(&self) -> bool {
        !self.term.is_empty()
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn status_text(&self) -> String {
        if self.term.is_empty() {
            return String::new();
        }
        let suffix = if self.case_sensitive { " [case]" } else { "" };
        if self.matches.is_empty() {
            return format!("No matches for: {}{suffix}", self.term);
        }
        let position = self.current.map(|index| index + 1).unwrap_or(0);
        format!(
            "Match {} of {}: {}{suffix}",
            position,
            self.matches.len(),
            self.term
        )
    }

    pub fn highlight(&self, content: &str, style_current: &str, style_other: &str) -> String {
        if self.matches.is_empty() {
            return content.to_string();
        }
        highlight_matches(
            content,
            &self.matches,
            self.current_match(),
            style_current,
            style_other,
        )
    }
}
