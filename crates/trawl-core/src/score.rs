//! Relevance scoring between a query and an indexed entry.
//!
//! A query is matched in tiers and the first tier that produces a score wins:
//!
//! 1. The query as a glob (`*`, `?`, `[...]`) against the whole relative path
//! 2. The same glob against the base name
//! 3. Plain substring search, scored by match density and position
//!
//! The match score is then combined with a bonus that favours entries close
//! to their scan root.
//!
//! An entry can only score for a plain query if the query text occurs in its
//! relative path or name, and that containment holds for every prefix of the
//! query too. [`Query::contains_text`] exposes it so the index can keep the
//! entries a longer query may still match, including ones whose own score is
//! not positive.

use crate::error::TrawlError;
use crate::types::{split_extension, PathEntry};
use glob::{MatchOptions, Pattern};
use std::path::is_separator;

/// Score for a case-sensitive glob hit
pub const GLOB_EXACT_SCORE: f64 = 2.0;

/// Score for a glob hit that only matches ignoring case
pub const GLOB_IGNORE_CASE_SCORE: f64 = 1.95;

/// `1 + 1/e`, so a depth-0 entry gets a bonus of exactly 1.0.
const PATH_BONUS_BASE: f64 = 1.367_879_441_17;

const CASE_SENSITIVE: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

const IGNORE_CASE: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A search query prepared for scoring.
#[derive(Debug, Clone)]
pub struct Query {
    /// Lowercased, trimmed query without a trailing separator
    text: String,
    /// Whether the query names an extension (e.g. `report.pdf`)
    has_extension: bool,
    /// The query compiled as a glob, if it is a valid one
    glob: Option<Pattern>,
}

impl Query {
    /// Prepare `input` for scoring.
    pub fn new(input: &str) -> Self {
        let mut text = input.trim().to_lowercase();
        if text.ends_with(is_separator) {
            text.pop();
        }
        let has_extension = !split_extension(&text).1.is_empty();
        let glob = if text.is_empty() {
            None
        } else {
            compile_glob(&text).ok()
        };

        Query {
            text,
            has_extension,
            glob,
        }
    }

    /// The normalized query text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_extension(&self) -> bool {
        self.has_extension
    }

    /// Whether the query uses glob wildcards. Extending a glob can match
    /// entries its prefixes did not, so glob queries never reuse candidates.
    pub fn is_glob(&self) -> bool {
        self.text.contains(['*', '?', '['])
    }

    /// Whether the query text occurs anywhere in the lowercase relative path
    /// or name of `entry`.
    pub fn contains_text(&self, entry: &PathEntry) -> bool {
        !self.text.is_empty()
            && (entry.relpath_lower().contains(&self.text)
                || entry.name_lower().contains(&self.text))
    }

    /// Tiers 1 and 2: glob match against the relative path, then the name.
    pub fn glob_score(&self, entry: &PathEntry) -> f64 {
        let Some(glob) = &self.glob else {
            return 0.0;
        };

        for haystack in [entry.relpath(), entry.name()] {
            if haystack.is_empty() {
                continue;
            }
            if glob.matches_with(haystack, CASE_SENSITIVE) {
                return GLOB_EXACT_SCORE;
            }
            if glob.matches_with(haystack, IGNORE_CASE) {
                return GLOB_IGNORE_CASE_SCORE;
            }
        }
        0.0
    }

    /// Tier 3: best substring score over the relative path and the name.
    ///
    /// Without an extension in the query, extensions are stripped from the
    /// entry as well.
    pub fn substring_score(&self, entry: &PathEntry) -> f64 {
        let (relpath, name) = if self.has_extension {
            (entry.relpath_lower(), entry.name_lower())
        } else {
            (entry.relpath_stem_lower(), entry.stem_lower())
        };

        substring_score(relpath, &self.text, true).max(substring_score(name, &self.text, false))
    }

    /// Score from the first matching tier, `0.0` if none matched.
    pub fn match_score(&self, entry: &PathEntry) -> f64 {
        let score = self.glob_score(entry);
        if score > 0.0 {
            return score;
        }
        self.substring_score(entry).max(0.0)
    }

    /// Final score for `entry`, or `None` if it does not match at all.
    pub fn score(&self, entry: &PathEntry) -> Option<f64> {
        let score = self.match_score(entry);
        (score > 0.0).then(|| final_score(score, entry.relative_depth()))
    }
}

/// Compile a query as a glob pattern.
///
/// Runs of `*` collapse into one, since a query `*` already crosses
/// separators.
pub fn compile_glob(query: &str) -> Result<Pattern, TrawlError> {
    let mut collapsed = String::with_capacity(query.len());
    for c in query.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }

    Pattern::new(&collapsed).map_err(|e| TrawlError::InvalidPattern {
        pattern: query.to_string(),
        reason: e.to_string(),
    })
}

/// Density plus position score of `needle` inside `haystack`.
///
/// `len(needle)/len(haystack) + (len(needle) - index)/len(needle)`, in
/// characters. When `within_segment` is set, a hit followed by a separator
/// scores 0 so a match cannot reach past the final path component.
pub fn substring_score(haystack: &str, needle: &str, within_segment: bool) -> f64 {
    if needle.is_empty() {
        return 0.0;
    }
    let Some(byte_index) = haystack.find(needle) else {
        return 0.0;
    };
    if within_segment && haystack[byte_index + needle.len()..].contains(is_separator) {
        return 0.0;
    }

    let needle_len = needle.chars().count() as f64;
    let haystack_len = haystack.chars().count() as f64;
    let index = haystack[..byte_index].chars().count() as f64;

    needle_len / haystack_len + (needle_len - index) / needle_len
}

/// Bonus for entries near their scan root; decreases with depth.
pub fn path_bonus(relative_depth: usize) -> f64 {
    PATH_BONUS_BASE - (-1.0 + relative_depth as f64 / 6.0).exp()
}

/// Combine a match score with the depth bonus.
pub fn final_score(match_score: f64, relative_depth: usize) -> f64 {
    (match_score + path_bonus(relative_depth)) / 3.0
}
