use crate::utils::stemmer::stem;

/// Stopwords the documentation generator drops when building the index.
/// Querying for them can never match, so they are dropped up front.
const STOPWORDS: &[&str] = &[
    "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "near", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Normalize a raw query word: lowercase and strip surrounding
/// punctuation, keeping dots and underscores so dotted object names
/// ("pygears.typing.Uint") survive intact.
pub fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !(c.is_alphanumeric() || c == '.' || c == '_'))
        .to_lowercase()
}

/// A query word in the forms lookup needs: raw (for object and partial
/// matching) and stemmed (for dictionary lookup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWord {
    pub raw: String,
    pub stemmed: String,
}

impl QueryWord {
    pub fn new(raw: &str) -> Self {
        let raw = normalize_word(raw);
        let stemmed = stem(&raw);
        Self { raw, stemmed }
    }
}

/// Split free text into query words, dropping stopwords and empties
pub fn query_words(text: &str) -> Vec<QueryWord> {
    text.split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty() && !is_stopword(w))
        .map(|w| {
            let stemmed = stem(&w);
            QueryWord { raw: w, stemmed }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwords_dropped() {
        let words = query_words("the echo gear");
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].raw, "echo");
        assert_eq!(words[1].raw, "gear");
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_word("(Echo)"), "echo");
        assert_eq!(normalize_word("pygears.typing.Uint"), "pygears.typing.uint");
        assert_eq!(normalize_word("\"quoted\""), "quoted");
    }

    #[test]
    fn test_words_are_stemmed() {
        let words = query_words("arrays");
        assert_eq!(words[0].raw, "arrays");
        assert_eq!(words[0].stemmed, "arrai");
    }

    #[test]
    fn test_empty_input() {
        assert!(query_words("  ").is_empty());
        assert!(query_words("the of and").is_empty());
    }
}
