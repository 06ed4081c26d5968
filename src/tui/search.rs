//! Fuzzy ranking for the selector overlay, using nucleo.
//!
//! - Whitespace splits the query into terms; ALL terms must match
//! - Case-insensitive, with smart unicode normalization
//! - Ties keep the original order

use crate::data::Listable;
use nucleo::{
    pattern::{CaseMatching, Normalization, Pattern},
    Config, Matcher, Utf32Str,
};

/// Fuzzy matcher with multi-term support
pub struct FuzzySearch {
    matcher: Matcher,
}

impl Default for FuzzySearch {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzySearch {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    fn match_term(&mut self, term: &str, haystack: &str) -> Option<u32> {
        if term.is_empty() || haystack.is_empty() {
            return if term.is_empty() { Some(0) } else { None };
        }

        let pattern = Pattern::parse(term, CaseMatching::Ignore, Normalization::Smart);
        let mut haystack_buf = Vec::new();
        let haystack_utf32 = Utf32Str::new(haystack, &mut haystack_buf);

        pattern.score(haystack_utf32, &mut self.matcher)
    }

    /// Sum of term scores if every term matches.
    pub fn multi_term_match(&mut self, query: &str, haystack: &str) -> Option<u32> {
        let terms: Vec<&str> = query.split_whitespace().collect();

        if terms.is_empty() {
            return Some(0);
        }

        let mut total_score = 0u32;
        for term in terms {
            match self.match_term(term, haystack) {
                Some(score) => total_score = total_score.saturating_add(score),
                None => return None,
            }
        }

        Some(total_score)
    }

    /// Indices of `items` matching `query`, best first.
    ///
    /// An empty query keeps every item in its original order.
    pub fn rank<T: Listable>(&mut self, items: &[T], query: &str) -> Vec<usize> {
        if query.trim().is_empty() {
            return (0..items.len()).collect();
        }

        let mut scored: Vec<(usize, u32)> = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                self.multi_term_match(query, &item.filter_key())
                    .map(|score| (i, score))
            })
            .collect();

        // Stable sort keeps the original order among equal scores
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(i, _)| i).collect()
    }
}
