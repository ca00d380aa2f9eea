//! Text normalization shared by the requirement extractor and the vector space:
//! tokenizing, stopword removal and light stemming.

pub mod stemmer;
pub mod stopwords;
pub mod tokens;

pub use tokens::{bigram, terms, tokenize, word_count, Token};
