use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::stemmer::stem;
use crate::text::stopwords::is_stopword;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)?").expect("word pattern is valid"));

/// A normalized content word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lowercased, stemmed form used for matching.
    pub term: String,
    /// Byte offset of the word in the source text.
    pub offset: usize,
    /// Surface form started with an uppercase letter.
    pub capitalized: bool,
    /// First word of the text or of a sentence/line.
    pub sentence_initial: bool,
    /// Adjacent to the previous kept token: no stopword, punctuation or line break between.
    pub joined_to_previous: bool,
}

/// Case-folds, drops stopwords and bare numbers, and stems.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last_end = 0usize;
    let mut broken = true;
    let mut sentence_start = true;

    for m in WORD_RE.find_iter(text) {
        let gap = &text[last_end..m.start()];
        if gap.chars().any(|c| matches!(c, '.' | '!' | '?' | '\n' | '\x0C')) {
            sentence_start = true;
        }
        if gap.chars().any(|c| !(c == ' ' || c == '\t' || c == '-')) {
            broken = true;
        }
        last_end = m.end();

        let surface = m.as_str();
        let initial = std::mem::replace(&mut sentence_start, false);
        let lower = normalize_word(surface);

        if lower.chars().count() < 2
            || lower.chars().all(|c| c.is_numeric())
            || is_stopword(&lower)
        {
            broken = true;
            continue;
        }

        tokens.push(Token {
            term: stem(&lower),
            offset: m.start(),
            capitalized: surface.chars().next().is_some_and(char::is_uppercase),
            sentence_initial: initial,
            joined_to_previous: !broken,
        });
        broken = false;
    }

    tokens
}

/// Unigram and adjacent-bigram terms, in text order. This is the vocabulary of the
/// vector space and of profile keywords.
pub fn terms(text: &str) -> Vec<String> {
    terms_from_tokens(&tokenize(text))
}

fn terms_from_tokens(tokens: &[Token]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    for (i, token) in tokens.iter().enumerate() {
        out.push(token.term.clone());
        if i > 0 && token.joined_to_previous {
            out.push(bigram(&tokens[i - 1].term, &token.term));
        }
    }
    out
}

pub fn bigram(first: &str, second: &str) -> String {
    format!("{first} {second}")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn normalize_word(surface: &str) -> String {
    let lower = surface.to_lowercase().replace('’', "'");
    match lower.strip_suffix("'s") {
        Some(base) => base.to_string(),
        None => lower.replace('\'', ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term_list(text: &str) -> Vec<String> {
        tokenize(text).into_iter().map(|t| t.term).collect()
    }

    #[test]
    fn test_tokenize_drops_stopwords_and_numbers() {
        assert_eq!(
            term_list("Prepare the 12 vegetarian dishes"),
            vec!["prepar", "vegetarian", "dish"]
        );
    }

    #[test]
    fn test_possessive_is_stripped() {
        assert_eq!(term_list("the chef's menu"), vec!["chef", "menu"]);
    }

    #[test]
    fn test_bigrams_do_not_span_stopwords() {
        let terms = terms("buffet menu for the dinner");
        assert!(terms.contains(&"buffet menu".to_string()));
        assert!(!terms.iter().any(|t| t == "menu dinner"));
    }

    #[test]
    fn test_bigrams_do_not_span_punctuation() {
        let terms = terms("salads, soups");
        assert!(!terms.iter().any(|t| t.contains(' ')));
    }

    #[test]
    fn test_hyphenated_words_stay_joined() {
        let terms = terms("gluten-free");
        assert!(terms.contains(&"gluten free".to_string()));
    }

    #[test]
    fn test_sentence_initial_and_capitalized_flags() {
        let tokens = tokenize("Travel to Paris. Museums open late");
        let paris = tokens.iter().find(|t| t.term == "paris").unwrap();
        assert!(paris.capitalized);
        assert!(!paris.sentence_initial);
        let museums = tokens.iter().find(|t| t.term == "museum").unwrap();
        assert!(museums.sentence_initial);
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t").is_empty());
    }
}
