//! Subsection Refiner: cuts top-ranked sections into paragraph or sentence-window units
//! and ranks the units against the profile within their own pool.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{ScoredSection, SubSection, TextSpan};
use crate::ranking::scorer::{
    by_score_then, score_candidates, ScoringInput, ScoringWeights, UNIT_LENGTH_BAND,
};
use crate::requirements::RequirementProfile;
use crate::text::word_count;

const PAGE_BREAK: char = '\x0C';
/// Paragraphs longer than this are split into sentence windows of at most this many words.
pub const MAX_UNIT_WORDS: usize = 150;
pub const REFINED_TEXT_WORDS: usize = 200;

static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?]+["'’”)\]]*\s+"#).expect("sentence boundary pattern is valid")
});

/// Unit spans covering `body` end to end, in order. Whitespace-only bodies have none.
///
/// Paragraphs start at a content line that follows a blank line, so blank lines stay
/// with the paragraph before them and leading whitespace belongs to the first unit.
pub fn split_units(body: &str) -> Vec<TextSpan> {
    if body.trim().is_empty() {
        return Vec::new();
    }

    let mut units = Vec::new();
    for paragraph in paragraph_spans(body) {
        let text = paragraph.slice(body);
        if word_count(text) <= MAX_UNIT_WORDS {
            units.push(paragraph);
        } else {
            units.extend(sentence_windows(text, paragraph.start));
        }
    }
    units
}

fn paragraph_spans(body: &str) -> Vec<TextSpan> {
    let mut starts = vec![0];
    let mut offset = 0;
    let mut seen_content = false;
    let mut previous_blank = false;

    for line in body.split_inclusive('\n') {
        let blank = line.trim().is_empty();
        if !blank {
            if seen_content && previous_blank {
                starts.push(offset);
            }
            seen_content = true;
        }
        previous_blank = blank;
        offset += line.len();
    }

    let ends = starts.iter().skip(1).copied().chain(std::iter::once(body.len()));
    starts
        .iter()
        .zip(ends)
        .map(|(&start, end)| TextSpan { start, end })
        .collect()
}

/// Greedy grouping of consecutive sentences up to [`MAX_UNIT_WORDS`]. A single longer
/// sentence is its own window.
fn sentence_windows(paragraph: &str, base: usize) -> Vec<TextSpan> {
    let mut sentence_ends: Vec<usize> = SENTENCE_END_RE
        .find_iter(paragraph)
        .map(|m| m.end())
        .filter(|&end| end < paragraph.len())
        .collect();
    sentence_ends.push(paragraph.len());

    let mut windows = Vec::new();
    let mut window_start = 0;
    let mut window_words = 0;
    let mut sentence_start = 0;

    for end in sentence_ends {
        let words = word_count(&paragraph[sentence_start..end]);
        if window_words > 0 && window_words + words > MAX_UNIT_WORDS {
            windows.push(TextSpan {
                start: base + window_start,
                end: base + sentence_start,
            });
            window_start = sentence_start;
            window_words = 0;
        }
        window_words += words;
        sentence_start = end;
    }
    windows.push(TextSpan {
        start: base + window_start,
        end: base + paragraph.len(),
    });
    windows
}

/// Whitespace collapsed to single spaces, capped at [`REFINED_TEXT_WORDS`] words with a
/// trailing ellipsis.
pub fn refine_text(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > REFINED_TEXT_WORDS {
        format!("{}...", words[..REFINED_TEXT_WORDS].join(" "))
    } else {
        words.join(" ")
    }
}

/// Splits the given top sections into units and ranks them 1..M across the combined
/// pool. Ties fall back to parent document order, parent ordinal, then position in
/// the parent.
pub fn refine(
    top_sections: &[ScoredSection],
    profile: &RequirementProfile,
    weights: &ScoringWeights,
) -> Vec<SubSection> {
    let mut units: Vec<SubSection> = Vec::new();
    for scored in top_sections {
        let section = &scored.section;
        for (local_ordinal, span) in split_units(&section.raw_text).into_iter().enumerate() {
            let text = span.slice(&section.raw_text);
            units.push(SubSection {
                parent_section_id: section.id(),
                document_id: section.document_id.clone(),
                parent_title: section.title.clone(),
                span,
                text_span: text.to_string(),
                refined_text: refine_text(text),
                page_number: unit_page(scored, span),
                local_ordinal,
                relevance_score: 0.0,
                rank: 0,
                breakdown: Default::default(),
            });
        }
    }

    if units.is_empty() {
        return units;
    }

    let inputs: Vec<ScoringInput<'_>> = units
        .iter()
        .map(|u| ScoringInput {
            title: &u.parent_title,
            body: &u.text_span,
            word_count: word_count(&u.text_span),
        })
        .collect();
    let scores = score_candidates(&inputs, profile, weights, UNIT_LENGTH_BAND);
    for (unit, (score, breakdown)) in units.iter_mut().zip(scores) {
        unit.relevance_score = score;
        unit.breakdown = breakdown;
    }

    units.sort_by(|a, b| {
        by_score_then(a.relevance_score, b.relevance_score, || {
            a.parent_section_id
                .cmp(&b.parent_section_id)
                .then(a.local_ordinal.cmp(&b.local_ordinal))
        })
    });
    for (i, unit) in units.iter_mut().enumerate() {
        unit.rank = i + 1;
    }

    debug!(
        "Refined {} sections into {} subsections",
        top_sections.len(),
        units.len()
    );
    units
}

/// Parent start page plus the page breaks between the heading line and the unit's
/// first non-blank character.
fn unit_page(scored: &ScoredSection, span: TextSpan) -> u32 {
    let section = &scored.section;
    let heading_line = section
        .heading_text
        .trim_end_matches('\n')
        .rsplit('\n')
        .next()
        .unwrap_or_default();
    let unit = span.slice(&section.raw_text);
    let content_start = span.start + (unit.len() - unit.trim_start().len());
    let breaks = heading_line.matches(PAGE_BREAK).count()
        + section.raw_text[..content_start].matches(PAGE_BREAK).count();
    section.page_range.start + breaks as u32
}
