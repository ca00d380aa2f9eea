//! Relevance Scorer: ranks a section pool against a requirement profile.
//!
//! score = w_sim·cosine + w_title·title_match + w_len·length_fit. Each component is in
//! [0, 1] and the weights sum to 1, so scores are in [0, 1]. A pure function of
//! (pool, profile, weights).

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ConfigError;
use crate::models::{ScoreBreakdown, ScoredSection, Section};
use crate::ranking::vector_space::VectorSpace;
use crate::requirements::{domain_title_matches, RequirementProfile};
use crate::text::terms;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;
/// Part of the title-match gap closed by a domain title word.
pub const DOMAIN_TITLE_SHARE: f64 = 0.15;
const MAX_LISTED_TERMS: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Weights and bands
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub similarity: f64,
    pub title_match: f64,
    pub length_fit: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            title_match: 0.25,
            length_fit: 0.15,
        }
    }
}

impl ScoringWeights {
    /// Rejects negative weights and weights that do not sum to 1.
    pub fn new(similarity: f64, title_match: f64, length_fit: f64) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("similarity", similarity),
            ("title_match", title_match),
            ("length_fit", length_fit),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }
        let sum = similarity + title_match + length_fit;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(Self {
            similarity,
            title_match,
            length_fit,
        })
    }

    fn combine(&self, b: &ScoreBreakdown) -> f64 {
        self.similarity * b.similarity
            + self.title_match * b.title_match
            + self.length_fit * b.length_fit
    }
}

/// Target word-count band; anything inside scores a full length fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBand {
    pub min: usize,
    pub max: usize,
}

pub const SECTION_LENGTH_BAND: LengthBand = LengthBand { min: 50, max: 500 };
pub const UNIT_LENGTH_BAND: LengthBand = LengthBand { min: 30, max: 150 };

impl LengthBand {
    pub fn fit(&self, words: usize) -> f64 {
        if words < self.min {
            words as f64 / self.min as f64
        } else if words > self.max {
            self.max as f64 / words as f64
        } else {
            1.0
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// What the scorer needs from a pool entry.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub word_count: usize,
}

/// Scores each input against the profile with a vector space fitted on this pool.
/// Output is index-aligned with `inputs`.
pub fn score_candidates(
    inputs: &[ScoringInput<'_>],
    profile: &RequirementProfile,
    weights: &ScoringWeights,
    band: LengthBand,
) -> Vec<(f64, ScoreBreakdown)> {
    let space = VectorSpace::fit(inputs.iter().map(|i| i.body));
    let query = space.query_vector(profile);

    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let breakdown = ScoreBreakdown {
                similarity: space.similarity(index, &query),
                title_match: title_match(input.title, profile),
                length_fit: band.fit(input.word_count),
            };
            (weights.combine(&breakdown), breakdown)
        })
        .collect()
}

/// Share of priority weight found among the title's terms, relative to the heaviest
/// priority term, capped at 1. A title carrying one of the detected domain's title words
/// closes `DOMAIN_TITLE_SHARE` of the remaining gap, so the result stays in [0, 1].
pub fn title_match(title: &str, profile: &RequirementProfile) -> f64 {
    let title_terms = title_term_set(title);
    let top = profile.top_weight();
    let keyword_share = if top > 0.0 {
        let matched: f64 = matched_priority_terms(&title_terms, profile)
            .map(|term| profile.weight(term))
            .sum();
        (matched / top).min(1.0)
    } else {
        0.0
    };

    if domain_title_matches(profile.domain, &title_terms).is_empty() {
        keyword_share
    } else {
        keyword_share + (1.0 - keyword_share) * DOMAIN_TITLE_SHARE
    }
}

/// Short readable reasons behind a section's score: title keyword hits, domain title
/// words and how the length sits against the section band. At most one of each.
pub fn relevance_factors(title: &str, word_count: usize, profile: &RequirementProfile) -> Vec<String> {
    let title_terms = title_term_set(title);
    let mut factors = Vec::new();

    let hits: Vec<&str> = matched_priority_terms(&title_terms, profile)
        .take(MAX_LISTED_TERMS)
        .map(String::as_str)
        .collect();
    if !hits.is_empty() {
        factors.push(format!("Title matches: {}", hits.join(", ")));
    }

    let domain_hits = domain_title_matches(profile.domain, &title_terms);
    if !domain_hits.is_empty() {
        factors.push(format!("Domain relevance: {}", domain_hits.join(", ")));
    }

    if word_count > SECTION_LENGTH_BAND.max {
        factors.push("Comprehensive content".to_string());
    } else if word_count >= SECTION_LENGTH_BAND.min {
        factors.push("Optimal length".to_string());
    }
    factors
}

fn title_term_set(title: &str) -> HashSet<String> {
    terms(title).into_iter().collect()
}

fn matched_priority_terms<'a>(
    title_terms: &'a HashSet<String>,
    profile: &'a RequirementProfile,
) -> impl Iterator<Item = &'a String> + 'a {
    profile
        .priority_terms
        .iter()
        .filter(move |term| title_terms.contains(*term))
}

/// Scores and ranks the full pool. Ranks are 1..N; ties fall back to document order,
/// then position in the document.
pub fn rank_sections(
    sections: Vec<Section>,
    profile: &RequirementProfile,
    weights: &ScoringWeights,
) -> Vec<ScoredSection> {
    if sections.is_empty() {
        return Vec::new();
    }

    let inputs: Vec<ScoringInput<'_>> = sections
        .iter()
        .map(|s| ScoringInput {
            title: &s.title,
            body: &s.raw_text,
            word_count: s.word_count,
        })
        .collect();
    let scores = score_candidates(&inputs, profile, weights, SECTION_LENGTH_BAND);

    let mut ranked: Vec<ScoredSection> = sections
        .into_iter()
        .zip(scores)
        .map(|(section, (relevance_score, breakdown))| ScoredSection {
            relevance_factors: relevance_factors(&section.title, section.word_count, profile),
            section,
            relevance_score,
            rank: 0,
            breakdown,
        })
        .collect();

    ranked.sort_by(|a, b| {
        by_score_then(a.relevance_score, b.relevance_score, || {
            a.section.id().cmp(&b.section.id())
        })
    });
    for (i, scored) in ranked.iter_mut().enumerate() {
        scored.rank = i + 1;
    }

    info!(
        "Ranked {} sections (top score {:.3})",
        ranked.len(),
        ranked[0].relevance_score
    );
    ranked
}

/// Descending score, then the given ascending tie-break.
pub(crate) fn by_score_then(a: f64, b: f64, tie: impl FnOnce() -> Ordering) -> Ordering {
    b.total_cmp(&a).then_with(tie)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageRange;
    use crate::requirements::{extract_profile, Domain, ExtractorSettings};
    use crate::text::word_count;

    fn section(document_index: usize, ordinal: usize, title: &str, body: &str) -> Section {
        Section {
            document_id: format!("doc{document_index}.pdf"),
            document_index,
            ordinal,
            title: title.to_string(),
            heading_kind: None,
            heading_text: format!("{title}\n"),
            raw_text: body.to_string(),
            page_range: PageRange::single(1),
            word_count: word_count(body),
        }
    }

    fn food_profile() -> RequirementProfile {
        extract_profile(
            "Food Contractor",
            "prepare vegetarian buffet menu",
            &ExtractorSettings::default(),
        )
    }

    #[test]
    fn test_default_weights_are_documented_values() {
        let w = ScoringWeights::default();
        assert_eq!(w.similarity, 0.6);
        assert_eq!(w.title_match, 0.25);
        assert_eq!(w.length_fit, 0.15);
        assert!(ScoringWeights::new(0.6, 0.25, 0.15).is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        assert!(matches!(
            ScoringWeights::new(0.5, 0.25, 0.15),
            Err(ConfigError::WeightSum { .. })
        ));
        assert!(matches!(
            ScoringWeights::new(1.2, -0.1, -0.1),
            Err(ConfigError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn test_length_fit() {
        let band = SECTION_LENGTH_BAND;
        assert_eq!(band.fit(0), 0.0);
        assert_eq!(band.fit(25), 0.5);
        assert_eq!(band.fit(50), 1.0);
        assert_eq!(band.fit(500), 1.0);
        assert_eq!(band.fit(1000), 0.5);
    }

    #[test]
    fn test_vegetarian_section_outranks_meat_section() {
        let pool = vec![
            section(0, 0, "Meat Dishes", "Beef stew, roast lamb and chicken wings for the carnivores."),
            section(0, 1, "Vegetarian Starters", "Vegetarian falafel, hummus and grilled halloumi for a buffet."),
        ];
        let ranked = rank_sections(pool, &food_profile(), &ScoringWeights::default());
        assert_eq!(ranked[0].section.title, "Vegetarian Starters");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert!(ranked[0].relevance_score > ranked[1].relevance_score);
    }

    #[test]
    fn test_unrelated_introduction_scores_low_but_positive() {
        let body = "word ".repeat(120);
        let pool = vec![section(0, 0, "Introduction", &body)];
        let ranked = rank_sections(pool, &food_profile(), &ScoringWeights::default());
        let s = &ranked[0];
        assert_eq!(s.breakdown.similarity, 0.0);
        assert_eq!(s.breakdown.title_match, 0.0);
        assert!((s.relevance_score - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_empty_pool_gives_empty_ranking() {
        assert!(rank_sections(Vec::new(), &food_profile(), &ScoringWeights::default()).is_empty());
    }

    #[test]
    fn test_all_zero_scores_still_totally_ordered() {
        let pool = vec![
            section(1, 0, "Untitled", ""),
            section(0, 1, "Untitled", ""),
            section(0, 0, "Untitled", ""),
        ];
        let ranked = rank_sections(
            pool,
            &RequirementProfile::generic_empty(),
            &ScoringWeights::default(),
        );
        let ids: Vec<_> = ranked
            .iter()
            .map(|s| (s.section.document_index, s.section.ordinal))
            .collect();
        assert_eq!(ids, vec![(0, 0), (0, 1), (1, 0)]);
        let ranks: Vec<_> = ranked.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let make = || {
            vec![
                section(0, 0, "Salads", "Green salad with vegetarian dressing and herbs."),
                section(0, 1, "Soups", "Tomato soup and vegetarian broth for the buffet menu."),
                section(1, 0, "Desserts", "Chocolate cake and fruit."),
            ]
        };
        let a = rank_sections(make(), &food_profile(), &ScoringWeights::default());
        let b = rank_sections(make(), &food_profile(), &ScoringWeights::default());
        let key = |r: &[ScoredSection]| -> Vec<(usize, usize, f64)> {
            r.iter()
                .map(|s| (s.section.document_index, s.section.ordinal, s.relevance_score))
                .collect()
        };
        assert_eq!(key(&a), key(&b));
    }

    #[test]
    fn test_title_match_is_capped() {
        let profile = food_profile();
        let score = title_match("Vegetarian Buffet Menu", &profile);
        assert!(score > 0.0 && score <= 1.0);
        assert_eq!(title_match("Desserts", &profile), 0.0);
        assert_eq!(title_match("Vegetarian", &RequirementProfile::generic_empty()), 0.0);
    }

    fn analyst_profile() -> RequirementProfile {
        extract_profile(
            "Investment Analyst",
            "analyze revenue trends and market positioning",
            &ExtractorSettings::default(),
        )
    }

    #[test]
    fn test_domain_title_words_lift_title_match() {
        let profile = analyst_profile();
        assert_eq!(profile.domain, Domain::Business);

        let plain = title_match("Company Overview", &profile);
        let boosted = title_match("Financial Performance", &profile);
        assert_eq!(plain, 0.0);
        assert!((boosted - DOMAIN_TITLE_SHARE).abs() < 1e-9);
        assert!(title_match("Revenue Strategy", &profile) <= 1.0);

        // the same title earns nothing extra outside its domain
        assert_eq!(title_match("Financial Performance", &food_profile()), 0.0);
    }

    #[test]
    fn test_domain_title_words_break_otherwise_equal_sections() {
        let body = "quarterly figures were reported for every region in detail ".repeat(6);
        let pool = vec![
            section(0, 0, "Company Overview", &body),
            section(0, 1, "Financial Performance", &body),
        ];
        let ranked = rank_sections(pool, &analyst_profile(), &ScoringWeights::default());
        assert_eq!(ranked[0].section.title, "Financial Performance");
        assert!(ranked[0].relevance_score > ranked[1].relevance_score);
    }

    #[test]
    fn test_relevance_factors_explain_score() {
        let profile = food_profile();
        let body = "vegetarian ".repeat(60);
        let ranked = rank_sections(
            vec![section(0, 0, "Vegetarian Buffet Ideas", &body), section(0, 1, "Desserts", "cake")],
            &profile,
            &ScoringWeights::default(),
        );
        let top = &ranked[0];
        assert_eq!(top.section.title, "Vegetarian Buffet Ideas");
        assert!(top.relevance_factors[0].starts_with("Title matches: "));
        assert!(top.relevance_factors[0].contains("vegetarian"));
        assert_eq!(top.relevance_factors.last().map(String::as_str), Some("Optimal length"));
        assert!(ranked[1].relevance_factors.is_empty());

        let factors = relevance_factors("Market Strategy", 900, &analyst_profile());
        assert!(factors.contains(&"Domain relevance: market, strategy".to_string()));
        assert_eq!(factors.last().map(String::as_str), Some("Comprehensive content"));
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let pool = vec![
            section(0, 0, "Vegetarian Buffet Menu", &"vegetarian buffet menu ".repeat(40)),
            section(0, 1, "Notes", "short"),
        ];
        for s in rank_sections(pool, &food_profile(), &ScoringWeights::default()) {
            assert!((0.0..=1.0 + 1e-9).contains(&s.relevance_score));
        }
    }
}
