//! Scoring of search results.
//!
//! The weights mirror the ranking the documentation site's own search
//! widget applies, so offline results order the same way the browser
//! would: title hits above body hits, exact hits above partial hits, and
//! object hits adjusted by the priority the generator assigned them.

use serde::{Deserialize, Serialize};

/// How a query word matched a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchKind {
    /// Exact hit in the body term dictionary
    Term,
    /// Substring hit in the body term dictionary
    PartialTerm,
    /// Exact hit in the title term dictionary
    Title,
    /// Substring hit in the title term dictionary
    PartialTitle,
}

/// Configurable weights for scoring factors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Exact body term hit
    pub term: f32,
    /// Partial (substring) body term hit
    pub partial_term: f32,
    /// Exact title term hit
    pub title: f32,
    /// Partial title term hit
    pub partial_title: f32,
    /// Query word equals the object's trailing name component
    pub obj_name_match: f32,
    /// Query word is a substring of the object name
    pub obj_partial_match: f32,
    /// Score adjustment per generator-assigned priority (index = priority)
    pub obj_priority: [f32; 3],
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            term: 5.0,
            partial_term: 2.0,
            title: 15.0,
            partial_title: 7.0,
            obj_name_match: 11.0,
            obj_partial_match: 6.0,
            obj_priority: [15.0, 5.0, -5.0],
        }
    }
}

/// One word's contribution to a document hit
#[derive(Debug, Clone, Serialize)]
pub struct TermMatch {
    /// The word as the user typed it
    pub word: String,
    /// The dictionary term that matched
    pub term: String,
    pub kind: MatchKind,
    /// Boost from ^word syntax (1.0 when unboosted)
    pub boost: f32,
}

/// Scorer calculates relevance scores for search hits
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Create a scorer with default weights
    pub fn with_defaults() -> Self {
        Self::new(ScoringWeights::default())
    }

    /// Weight of a single term match, boost applied
    pub fn match_score(&self, m: &TermMatch) -> f32 {
        let base = match m.kind {
            MatchKind::Term => self.weights.term,
            MatchKind::PartialTerm => self.weights.partial_term,
            MatchKind::Title => self.weights.title,
            MatchKind::PartialTitle => self.weights.partial_title,
        };
        base * m.boost.max(0.0)
    }

    /// Total score of a document from its accumulated matches.
    /// A word matching several ways (body and title, say) contributes its
    /// best kind only, so long posting overlaps don't inflate scores.
    pub fn score_document(&self, matches: &[TermMatch]) -> f32 {
        let mut best_per_word: Vec<(&str, f32)> = Vec::new();

        for m in matches {
            let score = self.match_score(m);
            match best_per_word.iter_mut().find(|(w, _)| *w == m.word) {
                Some((_, existing)) => {
                    if score > *existing {
                        *existing = score;
                    }
                }
                None => best_per_word.push((&m.word, score)),
            }
        }

        best_per_word.iter().map(|(_, s)| s).sum()
    }

    /// Score of an object hit: name match weight plus the priority
    /// adjustment the generator assigned
    pub fn score_object(&self, exact_tail: bool, priority: i64, boost: f32) -> f32 {
        let base = if exact_tail {
            self.weights.obj_name_match
        } else {
            self.weights.obj_partial_match
        };
        let prio = usize::try_from(priority)
            .ok()
            .and_then(|p| self.weights.obj_priority.get(p).copied())
            .unwrap_or(0.0);
        (base + prio) * boost.max(0.0)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(word: &str, term: &str, kind: MatchKind) -> TermMatch {
        TermMatch {
            word: word.to_string(),
            term: term.to_string(),
            kind,
            boost: 1.0,
        }
    }

    #[test]
    fn test_title_outranks_body() {
        let scorer = Scorer::with_defaults();
        let title = scorer.score_document(&[m("gear", "gear", MatchKind::Title)]);
        let body = scorer.score_document(&[m("gear", "gear", MatchKind::Term)]);
        assert!(title > body);
    }

    #[test]
    fn test_exact_outranks_partial() {
        let scorer = Scorer::with_defaults();
        let exact = scorer.score_document(&[m("gear", "gear", MatchKind::Term)]);
        let partial = scorer.score_document(&[m("gear", "wrap_gear", MatchKind::PartialTerm)]);
        assert!(exact > partial);
    }

    #[test]
    fn test_best_kind_per_word() {
        let scorer = Scorer::with_defaults();
        let combined = scorer.score_document(&[
            m("gear", "gear", MatchKind::Term),
            m("gear", "gear", MatchKind::Title),
        ]);
        let title_only = scorer.score_document(&[m("gear", "gear", MatchKind::Title)]);
        assert!((combined - title_only).abs() < f32::EPSILON);
    }

    #[test]
    fn test_two_words_accumulate() {
        let scorer = Scorer::with_defaults();
        let one = scorer.score_document(&[m("gear", "gear", MatchKind::Term)]);
        let two = scorer.score_document(&[
            m("gear", "gear", MatchKind::Term),
            m("echo", "echo", MatchKind::Term),
        ]);
        assert!((two - one * 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_boost_multiplies() {
        let scorer = Scorer::with_defaults();
        let mut boosted = m("gear", "gear", MatchKind::Term);
        boosted.boost = 2.0;
        assert!(
            (scorer.match_score(&boosted) - 2.0 * scorer.weights().term).abs() < f32::EPSILON
        );
    }

    #[test]
    fn test_object_priority_ordering() {
        let scorer = Scorer::with_defaults();
        let important = scorer.score_object(true, 0, 1.0);
        let normal = scorer.score_object(true, 1, 1.0);
        let unimportant = scorer.score_object(true, 2, 1.0);
        assert!(important > normal);
        assert!(normal > unimportant);
    }

    #[test]
    fn test_object_unknown_priority_neutral() {
        let scorer = Scorer::with_defaults();
        let no_adjust = scorer.score_object(true, 99, 1.0);
        assert!((no_adjust - scorer.weights().obj_name_match).abs() < f32::EPSILON);
        let negative = scorer.score_object(true, -1, 1.0);
        assert!((negative - scorer.weights().obj_name_match).abs() < f32::EPSILON);
    }

    #[test]
    fn test_object_exact_tail_outranks_partial() {
        let scorer = Scorer::with_defaults();
        assert!(scorer.score_object(true, 1, 1.0) > scorer.score_object(false, 1, 1.0));
    }
}
