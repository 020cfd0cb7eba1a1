//! Keyword relevance scoring
//!
//! Lexical stand-in for embedding search and cross-encoder reranking, used
//! by the in-memory backend. Scores fall in `[0, 1)`; zero means no query
//! term appears in the document.

use std::collections::HashSet;

use once_cell::sync::Lazy;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "to", "of", "in", "on", "at",
        "for", "with", "and", "or", "but", "if", "do", "does", "did", "can", "could", "would",
        "should", "will", "what", "when", "where", "which", "who", "how", "why", "i", "me", "my",
        "we", "our", "you", "your", "it", "its", "this", "that", "there", "please", "about",
    ]
    .into_iter()
    .collect()
});

/// TF-IDF-like keyword scorer
pub struct KeywordScorer;

impl KeywordScorer {
    /// Lowercased alphanumeric tokens
    fn tokens(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Query terms with stopwords and single characters removed, in order
    pub fn query_terms(query: &str) -> Vec<String> {
        Self::tokens(query)
            .into_iter()
            .filter(|w| w.chars().count() > 1 && !STOPWORDS.contains(w.as_str()))
            .collect()
    }

    /// Score `document` against `query`
    ///
    /// - Term frequency: sqrt(count) for diminishing returns
    /// - IDF approximation: ln(1 + term length) favours specific terms
    /// - Earlier query terms weigh slightly more
    /// - Coverage bonus for matching more distinct query terms
    pub fn score(query: &str, document: &str) -> f32 {
        let query_terms = Self::query_terms(query);
        if query_terms.is_empty() {
            return 0.0;
        }

        let doc_words = Self::tokens(document);
        let doc_len = doc_words.len().max(1) as f32;
        let length_norm = 1.0 / (1.0 + (doc_len / 50.0).sqrt());

        let mut total = 0.0f32;
        let mut matched = 0usize;

        for (pos, term) in query_terms.iter().enumerate() {
            let tf = doc_words.iter().filter(|w| *w == term).count() as f32;
            if tf > 0.0 {
                matched += 1;
                let idf = (1.0 + term.chars().count() as f32).ln();
                let position_weight = 1.0 / (1.0 + pos as f32 * 0.1);
                total += tf.sqrt() * idf * position_weight * length_norm;
            }
        }

        if matched == 0 {
            return 0.0;
        }

        let coverage = matched as f32 / query_terms.len() as f32;
        let raw = total + coverage * 0.3;
        (raw / (raw + 1.0)).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_scores_positive() {
        let score = KeywordScorer::score(
            "clinic opening hours",
            "The clinic opening hours are 9am to 5pm.",
        );
        assert!(score > 0.0 && score < 1.0);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        assert_eq!(KeywordScorer::score("parking", "Dental cleaning prices"), 0.0);
        assert_eq!(KeywordScorer::score("what is the", "what is the answer"), 0.0);
    }

    #[test]
    fn test_more_coverage_scores_higher() {
        let both = KeywordScorer::score("cancel appointment", "How to cancel an appointment");
        let one = KeywordScorer::score("cancel appointment", "How to book an appointment");
        assert!(both > one);
    }

    #[test]
    fn test_punctuation_ignored() {
        assert!(KeywordScorer::score("hours?", "Hours: 9-5") > 0.0);
    }
}
