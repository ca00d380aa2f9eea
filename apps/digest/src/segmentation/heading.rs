//! Heading detection: a fixed-precedence list of line rules.
//!
//! A line is first gated (length, word count, has a letter, no sentence punctuation at
//! the end), then the rules are tried in [`RULE_PRECEDENCE`] order and the first match
//! decides the [`HeadingKind`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::HeadingKind;
use crate::requirements::{heading_keywords, Domain};

const MIN_HEADING_CHARS: usize = 3;
const MAX_HEADING_CHARS: usize = 200;
const MAX_HEADING_WORDS: usize = 12;
const MAX_KEYWORD_HEADING_WORDS: usize = 6;
const MAX_FORMATTED_HEADING_WORDS: usize = 8;
const UPPERCASE_RATIO: f64 = 0.6;

/// Lowercase words allowed inside a Title Case heading.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "of", "on", "or", "the", "to",
    "vs", "with",
];

static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\d+\.(?:\d+\.?)*\s+\S|[IVXLC]+\.\s+\S|[A-Z]\.\s+\S|(?i:chapter|section|part)\s+(?:\d+|(?i:[ivxlc]+))\b)",
    )
    .expect("numbered heading pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingRule {
    /// "1.", "1.2", "IV.", "A.", "Chapter 3", "Section 2", "Part III".
    Numbered,
    /// Most alphabetic tokens fully uppercase.
    Uppercase,
    /// A short line containing a structural keyword as a whole word or phrase.
    Keyword,
    /// A short line with a markdown marker, bold wrapping or Title Case words.
    Formatting,
}

pub const RULE_PRECEDENCE: [HeadingRule; 4] = [
    HeadingRule::Numbered,
    HeadingRule::Uppercase,
    HeadingRule::Keyword,
    HeadingRule::Formatting,
];

impl HeadingRule {
    pub fn kind(&self) -> HeadingKind {
        match self {
            HeadingRule::Numbered => HeadingKind::Numbered,
            HeadingRule::Uppercase => HeadingKind::Uppercase,
            HeadingRule::Keyword => HeadingKind::Keyword,
            HeadingRule::Formatting => HeadingKind::Formatting,
        }
    }
}

/// One line, prepared once and shared by every rule.
struct Candidate<'a> {
    /// Trimmed line as it appears, markers included.
    raw: &'a str,
    /// Markers stripped.
    text: &'a str,
    words: Vec<&'a str>,
}

#[derive(Debug, Clone)]
pub struct HeadingDetector {
    /// Keyword phrases as lowercase word sequences.
    keywords: Vec<Vec<String>>,
}

impl HeadingDetector {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| lower_words(k.as_ref()))
            .filter(|words| !words.is_empty())
            .collect();
        Self { keywords }
    }

    /// Base structural keywords plus the domain's own.
    pub fn for_domain(domain: Domain) -> Self {
        Self::new(heading_keywords(domain))
    }

    /// Returns the kind of the first rule that accepts `line`, or None for body text.
    pub fn classify(&self, line: &str) -> Option<HeadingKind> {
        let candidate = gate(line)?;
        RULE_PRECEDENCE
            .iter()
            .find(|rule| self.matches(**rule, &candidate))
            .map(HeadingRule::kind)
    }

    fn matches(&self, rule: HeadingRule, c: &Candidate<'_>) -> bool {
        match rule {
            HeadingRule::Numbered => NUMBERED_RE.is_match(c.text),
            HeadingRule::Uppercase => is_mostly_uppercase(&c.words),
            HeadingRule::Keyword => {
                c.words.len() <= MAX_KEYWORD_HEADING_WORDS && self.has_keyword(c.text)
            }
            HeadingRule::Formatting => {
                c.words.len() <= MAX_FORMATTED_HEADING_WORDS
                    && (has_markup(c.raw) || is_title_case(&c.words))
            }
        }
    }

    fn has_keyword(&self, text: &str) -> bool {
        let words = lower_words(text);
        self.keywords.iter().any(|phrase| {
            words
                .windows(phrase.len())
                .any(|window| window == phrase.as_slice())
        })
    }
}

fn gate(line: &str) -> Option<Candidate<'_>> {
    let raw = line.trim();
    let text = strip_markup(raw);
    let chars = text.chars().count();
    if !(MIN_HEADING_CHARS..=MAX_HEADING_CHARS).contains(&chars) {
        return None;
    }
    if !text.chars().any(char::is_alphabetic) {
        return None;
    }
    if text.ends_with(|c: char| matches!(c, '.' | ',' | ';' | '!' | '?')) {
        return None;
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > MAX_HEADING_WORDS {
        return None;
    }
    Some(Candidate { raw, text, words })
}

/// Strips a leading markdown `#` run and `**`/`__` wrapping.
pub fn strip_markup(line: &str) -> &str {
    let mut text = line.trim();
    let hashes = text.trim_start_matches('#');
    if hashes.len() != text.len() {
        text = hashes.trim_start();
    }
    for marker in ["**", "__"] {
        if let Some(inner) = text
            .strip_prefix(marker)
            .and_then(|t| t.strip_suffix(marker))
        {
            text = inner.trim();
        }
    }
    text
}

/// Section title for a heading line: markup stripped, trailing colon dropped.
pub fn clean_title(line: &str) -> String {
    strip_markup(line).trim_end_matches(':').trim_end().to_string()
}

fn has_markup(raw: &str) -> bool {
    raw.starts_with('#')
        || (raw.len() > 4 && raw.starts_with("**") && raw.ends_with("**"))
        || (raw.len() > 4 && raw.starts_with("__") && raw.ends_with("__"))
}

fn is_mostly_uppercase(words: &[&str]) -> bool {
    let alphabetic: Vec<&&str> = words
        .iter()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .collect();
    if alphabetic.is_empty() {
        return false;
    }
    let upper = alphabetic
        .iter()
        .filter(|w| w.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase))
        .count();
    upper as f64 / alphabetic.len() as f64 >= UPPERCASE_RATIO
}

fn is_title_case(words: &[&str]) -> bool {
    let mut seen_first = false;
    for word in words {
        let letters: String = word.chars().filter(|c| c.is_alphabetic()).collect();
        let Some(first) = letters.chars().next() else {
            continue;
        };
        if first.is_uppercase() {
            seen_first = true;
            continue;
        }
        if !seen_first || !MINOR_WORDS.contains(&letters.to_lowercase().as_str()) {
            return false;
        }
    }
    seen_first
}

fn lower_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}
