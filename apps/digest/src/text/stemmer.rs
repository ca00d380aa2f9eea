//! Light suffix-stripping stemmer.
//!
//! Not Porter: three passes (plural, verbal/adverbial, trailing `e`/`y`) that are enough
//! to make "starters"/"starter" or "preparing"/"prepare" meet on the same term. The same
//! function runs on profile text and section text, so consistency matters more than
//! linguistic accuracy.

/// Stems a lowercased word.
pub fn stem(word: &str) -> String {
    if word.chars().count() <= 3 || !word.chars().all(char::is_alphabetic) {
        return word.to_string();
    }

    let mut w = strip_plural(word);
    w = strip_verbal(&w);
    normalize_ending(&w)
}

fn strip_plural(word: &str) -> String {
    if let Some(base) = word.strip_suffix("sses") {
        return format!("{base}ss");
    }
    if let Some(base) = word.strip_suffix("ies") {
        if base.len() >= 2 {
            return format!("{base}i");
        }
    }
    for suffix in ["ches", "shes", "xes", "zes"] {
        if let Some(base) = word.strip_suffix(suffix) {
            let kept = &suffix[..suffix.len() - 2];
            return format!("{base}{kept}");
        }
    }
    if word.ends_with('s') && !(word.ends_with("ss") || word.ends_with("us") || word.ends_with("is"))
    {
        let base = &word[..word.len() - 1];
        if base.len() >= 3 {
            return base.to_string();
        }
    }
    word.to_string()
}

fn strip_verbal(word: &str) -> String {
    for suffix in ["ing", "ed"] {
        if let Some(base) = word.strip_suffix(suffix) {
            if base.len() >= 3 && has_vowel(base) {
                return undouble(base);
            }
        }
    }
    if let Some(base) = word.strip_suffix("ly") {
        if base.len() >= 4 {
            return base.to_string();
        }
    }
    word.to_string()
}

fn normalize_ending(word: &str) -> String {
    if word.len() >= 5 {
        if let Some(base) = word.strip_suffix('e') {
            return base.to_string();
        }
    }
    if word.len() >= 4 {
        if let Some(base) = word.strip_suffix('y') {
            if base.chars().last().is_some_and(|c| !is_vowel(c)) {
                return format!("{base}i");
            }
        }
    }
    word.to_string()
}

/// "planned" → "plann" → "plan". Doubled l, s and z are kept ("called", "dressed").
fn undouble(base: &str) -> String {
    let chars: Vec<char> = base.chars().collect();
    if let [.., a, b] = chars.as_slice() {
        if a == b && !is_vowel(*a) && !matches!(a, 'l' | 's' | 'z') {
            return chars[..chars.len() - 1].iter().collect();
        }
    }
    base.to_string()
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(is_vowel)
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
