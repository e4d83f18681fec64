use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Tokens shorter than this carry no meaning in a requirements document.
const MIN_TOKEN_LENGTH: usize = 3;

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}+").expect("word pattern is valid"));

/// French and English function words that would otherwise dominate the counts.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // French
        "les", "des", "une", "est", "dans", "pour", "par", "sur", "avec", "que", "qui", "pas",
        "plus", "son", "ses", "aux", "sont", "ont", "été", "être", "avoir", "cette", "ces", "leur",
        "leurs", "mais", "comme", "tout", "tous", "toutes", "fait", "sans", "peut", "doit",
        "doivent", "entre", "lors", "afin", "ainsi", "dont", "elle", "elles", "ils", "nous",
        "vous", "votre", "notre", "aussi", "très", "non", "sera", "seront", "selon",
        "chaque", "autre", "autres", "même", "car", "donc", "puis", "alors", "cet",
        // English
        "the", "and", "for", "are", "with", "that", "this", "from", "which", "will", "shall",
        "must", "not", "all", "any", "can", "may", "has", "have", "been", "its", "into", "such",
        "each", "when", "where", "than", "then", "their", "they", "these", "those", "there", "was",
        "were", "should", "would", "could", "also", "but", "our", "you", "your",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Lowercased word tokens with stopwords and very short tokens removed,
/// in document order.
pub fn clean_text(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| token.chars().count() >= MIN_TOKEN_LENGTH)
        .filter(|token| !STOPWORDS.contains(token))
        .map(String::from)
        .collect()
}

/// The `n` most frequent tokens, by count descending; equal counts keep the
/// order in which the words first appeared.
pub fn top_words(tokens: &[String], n: usize) -> Vec<WordCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, token) in tokens.iter().enumerate() {
        counts.entry(token.as_str()).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first_seen))| (word, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(n)
        .map(|(word, count, _)| WordCount {
            word: word.to_string(),
            count,
        })
        .collect()
}

/// `word: count`, one entry per line.
pub fn format_frequency_report(words: &[WordCount]) -> String {
    words
        .iter()
        .map(|w| format!("{}: {}", w.word, w.count))
        .collect::<Vec<_>>()
        .join("\n")
}
