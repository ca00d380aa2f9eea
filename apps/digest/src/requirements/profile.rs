//! Requirement profile: turns persona and job-to-be-done text into weighted keywords,
//! a domain label and priority terms.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::requirements::domains::{detect_domain, indicator, Domain};
use crate::requirements::signals::{detect_signals, ProfileSignals};
use crate::text::{bigram, tokenize, Token};

/// Boost for terms present in both persona and job text.
pub const SHARED_TERM_BOOST: f64 = 1.5;
/// Boost for terms found in the domain indicator table.
pub const DOMAIN_TERM_BOOST: f64 = 1.25;
/// Boost for capitalised, non-sentence-initial words (named-entity candidates).
pub const ENTITY_BOOST: f64 = 1.2;
/// Minimum summed indicator weight before a specific domain is chosen.
pub const DEFAULT_DOMAIN_MIN_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorSettings {
    pub shared_term_boost: f64,
    pub domain_term_boost: f64,
    pub entity_boost: f64,
    pub domain_min_confidence: f64,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            shared_term_boost: SHARED_TERM_BOOST,
            domain_term_boost: DOMAIN_TERM_BOOST,
            entity_boost: ENTITY_BOOST,
            domain_min_confidence: DEFAULT_DOMAIN_MIN_CONFIDENCE,
        }
    }
}

/// What the persona needs, as terms the scorer can match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementProfile {
    pub domain: Domain,
    pub domain_confidence: f64,
    /// Stemmed term (unigram or "a b" bigram) → weight > 0.
    pub weighted_keywords: BTreeMap<String, f64>,
    /// Keys of `weighted_keywords`, heaviest first; ties by first occurrence.
    pub priority_terms: Vec<String>,
    pub signals: ProfileSignals,
}

impl RequirementProfile {
    /// The defined fallback for persona/job text with nothing to extract.
    pub fn generic_empty() -> Self {
        Self {
            domain: Domain::Generic,
            domain_confidence: 0.0,
            weighted_keywords: BTreeMap::new(),
            priority_terms: Vec::new(),
            signals: ProfileSignals::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weighted_keywords.is_empty()
    }

    pub fn weight(&self, term: &str) -> f64 {
        self.weighted_keywords.get(term).copied().unwrap_or(0.0)
    }

    /// Weight of the heaviest priority term, 0.0 for an empty profile.
    pub fn top_weight(&self) -> f64 {
        self.priority_terms
            .first()
            .map(|t| self.weight(t))
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Persona,
    Job,
}

#[derive(Debug, Default)]
struct Candidate {
    frequency: u32,
    in_persona: bool,
    in_job: bool,
    entity: bool,
}

/// Builds the profile for one collection.
///
/// weight = frequency × shared boost (persona ∩ job) × domain boost × entity boost.
/// Empty or stopword-only input yields [`RequirementProfile::generic_empty`].
pub fn extract_profile(persona: &str, job: &str, settings: &ExtractorSettings) -> RequirementProfile {
    let persona_tokens = tokenize(persona);
    let job_tokens = tokenize(job);

    if persona_tokens.is_empty() && job_tokens.is_empty() {
        info!("Persona and job text yield no keywords, using generic fallback profile");
        return RequirementProfile::generic_empty();
    }

    let mut order: Vec<String> = Vec::new();
    let mut candidates: HashMap<String, Candidate> = HashMap::new();

    for (source, tokens) in [(Source::Persona, &persona_tokens), (Source::Job, &job_tokens)] {
        for (i, token) in tokens.iter().enumerate() {
            record(&mut candidates, &mut order, &token.term, source, is_entity(token));
            if i > 0 && token.joined_to_previous {
                let pair = bigram(&tokens[i - 1].term, &token.term);
                record(&mut candidates, &mut order, &pair, source, false);
            }
        }
    }

    let domain_match = detect_domain(
        order.iter().flat_map(|t| t.split(' ')),
        settings.domain_min_confidence,
    );

    let mut weighted_keywords = BTreeMap::new();
    for term in &order {
        let c = &candidates[term];
        let mut weight = f64::from(c.frequency);
        if c.in_persona && c.in_job {
            weight *= settings.shared_term_boost;
        }
        if term.split(' ').any(|part| indicator(part).is_some()) {
            weight *= settings.domain_term_boost;
        }
        if c.entity {
            weight *= settings.entity_boost;
        }
        weighted_keywords.insert(term.clone(), weight);
    }

    // `order` is first-occurrence order, so a stable sort keeps ties in that order
    let mut priority_terms = order.clone();
    priority_terms.sort_by(|a, b| weighted_keywords[b].total_cmp(&weighted_keywords[a]));

    debug!(
        "Profile: domain={:?} ({:.2}), {} keywords, top={:?}",
        domain_match.domain,
        domain_match.confidence,
        weighted_keywords.len(),
        priority_terms.iter().take(5).collect::<Vec<_>>()
    );

    RequirementProfile {
        domain: domain_match.domain,
        domain_confidence: domain_match.confidence,
        weighted_keywords,
        priority_terms,
        signals: detect_signals(persona, job),
    }
}

fn is_entity(token: &Token) -> bool {
    token.capitalized && !token.sentence_initial
}

fn record(
    candidates: &mut HashMap<String, Candidate>,
    order: &mut Vec<String>,
    term: &str,
    source: Source,
    entity: bool,
) {
    let candidate = candidates.entry(term.to_string()).or_insert_with(|| {
        order.push(term.to_string());
        Candidate::default()
    });
    candidate.frequency += 1;
    candidate.entity |= entity;
    match source {
        Source::Persona => candidate.in_persona = true,
        Source::Job => candidate.in_job = true,
    }
}
