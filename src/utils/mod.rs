//! Shared utilities: query-word normalization and stemming.

pub mod stemmer;
pub mod tokenizer;

pub use stemmer::stem;
pub use tokenizer::{is_stopword, normalize_word, query_words, QueryWord};
