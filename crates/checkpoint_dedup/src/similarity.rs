use crate::dedup::DedupError;
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Source of a similarity score between two checkpoints.
///
/// [`Deduplicator`](crate::Deduplicator) hands over normalized text (trimmed,
/// whitespace collapsed, lowercased).
///
/// Scores are expected in `[0, 1]`. An error aborts the whole deduplication
/// run; there is no fallback decision for a broken comparator.
pub trait Comparator {
    type Error;

    fn similarity(&self, a: &str, b: &str) -> Result<f64, Self::Error>;
}

impl<F, E> Comparator for F
where
    F: Fn(&str, &str) -> Result<f64, E>,
{
    type Error = E;

    fn similarity(&self, a: &str, b: &str) -> Result<f64, E> {
        self(a, b)
    }
}

/// Built-in similarity measures, both symmetric. [`SimilarityMeasure::score`]
/// normalizes its inputs; as a [`Comparator`] the inputs are taken as already
/// normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMeasure {
    /// `2·M / (|a| + |b|)` with M the longest common character subsequence.
    #[default]
    CharacterRatio,
    /// Shared words over all distinct words.
    TokenJaccard,
}

impl SimilarityMeasure {
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.score_normalized(&normalize(a), &normalize(b))
    }

    fn score_normalized(&self, a: &str, b: &str) -> f64 {
        match self {
            SimilarityMeasure::CharacterRatio => character_ratio(a, b),
            SimilarityMeasure::TokenJaccard => token_jaccard(a, b),
        }
    }
}

impl Comparator for SimilarityMeasure {
    type Error = Infallible;

    fn similarity(&self, a: &str, b: &str) -> Result<f64, Infallible> {
        Ok(self.score_normalized(a, b))
    }
}

impl FromStr for SimilarityMeasure {
    type Err = DedupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ratio" | "character_ratio" | "char" => Ok(SimilarityMeasure::CharacterRatio),
            "jaccard" | "token_jaccard" | "token" => Ok(SimilarityMeasure::TokenJaccard),
            other => Err(DedupError::UnknownMeasure(other.to_string())),
        }
    }
}

impl fmt::Display for SimilarityMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityMeasure::CharacterRatio => write!(f, "ratio"),
            SimilarityMeasure::TokenJaccard => write!(f, "jaccard"),
        }
    }
}

/// Indel ratio of two already-normalized strings. Two empty strings are
/// identical (1.0).
pub fn character_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matches = longest_common_subsequence(&a, &b);
    (2 * matches) as f64 / total as f64
}

/// Jaccard index over whitespace-separated tokens of already-normalized
/// strings.
pub fn token_jaccard(a: &str, b: &str) -> f64 {
    let a: HashSet<&str> = a.split_whitespace().collect();
    let b: HashSet<&str> = b.split_whitespace().collect();

    let union = a.union(&b).count();
    if union == 0 {
        return 1.0;
    }

    let shared = a.intersection(&b).count();
    shared as f64 / union as f64
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    // Keep the DP rows as short as the shorter input
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    let mut prev = vec![0usize; inner.len() + 1];
    let mut curr = vec![0usize; inner.len() + 1];

    for x in outer {
        for (j, y) in inner.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[inner.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_one() {
        assert_eq!(character_ratio("abc", "abc"), 1.0);
        assert_eq!(token_jaccard("a b c", "c b a"), 1.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(character_ratio("", ""), 1.0);
        assert_eq!(character_ratio("abc", ""), 0.0);
        assert_eq!(token_jaccard("", ""), 1.0);
        assert_eq!(token_jaccard("word", ""), 0.0);
    }

    #[test]
    fn test_ratio_counts_common_subsequence() {
        // LCS("abcd", "abxd") = 3 -> 6 / 8
        assert!((character_ratio("abcd", "abxd") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_ignores_word_order() {
        let score = token_jaccard("verify the invoice total", "the invoice total verify");
        assert_eq!(score, 1.0);

        // {verify, total} shared out of {verify, invoice, total, order}
        let partial = token_jaccard("verify invoice total", "verify order total");
        assert!((partial - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_measures_are_symmetric() {
        let pairs = [
            ("The user must be logged in", "A logged in user is required"),
            ("Montant TTC calculé", "montant ht calculé"),
            ("", "something"),
        ];
        for measure in [SimilarityMeasure::CharacterRatio, SimilarityMeasure::TokenJaccard] {
            for (a, b) in pairs {
                assert_eq!(measure.score(a, b), measure.score(b, a), "{measure} on {a:?}/{b:?}");
            }
        }
    }

    #[test]
    fn test_score_normalizes_inputs() {
        let measure = SimilarityMeasure::CharacterRatio;
        assert_eq!(measure.score("  Foo  Bar", "foo bar"), 1.0);
    }

    #[test]
    fn test_parse_measure_names() {
        assert_eq!("ratio".parse::<SimilarityMeasure>().unwrap(), SimilarityMeasure::CharacterRatio);
        assert_eq!("Jaccard".parse::<SimilarityMeasure>().unwrap(), SimilarityMeasure::TokenJaccard);
        assert!(matches!(
            "cosine".parse::<SimilarityMeasure>(),
            Err(DedupError::UnknownMeasure(name)) if name == "cosine"
        ));
    }

    #[test]
    fn test_closure_comparator_propagates_error() {
        let failing = |_: &str, _: &str| -> Result<f64, String> { Err("offline".to_string()) };
        assert_eq!(failing.similarity("a", "b"), Err("offline".to_string()));
    }
}
