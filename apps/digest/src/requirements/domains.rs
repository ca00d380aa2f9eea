//! Static domain lookup tables: persona/job indicator terms and per-domain heading
//! keywords. Adding a domain means adding rows here, not branches elsewhere.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::text::stemmer::stem;

/// Closed set of domain labels a profile can carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Recipe,
    Academic,
    Business,
    Education,
    Technical,
    Travel,
    #[default]
    Generic,
}

impl Domain {
    /// Declaration order doubles as the tie-break order during detection.
    pub const SPECIFIC: [Domain; 6] = [
        Domain::Recipe,
        Domain::Academic,
        Domain::Business,
        Domain::Education,
        Domain::Technical,
        Domain::Travel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Domain::Recipe => "recipe",
            Domain::Academic => "academic",
            Domain::Business => "business",
            Domain::Education => "education",
            Domain::Technical => "technical",
            Domain::Travel => "travel",
            Domain::Generic => "generic",
        }
    }
}

/// Indicator word → (domain, evidence weight).
const DOMAIN_INDICATORS: &[(&str, Domain, f64)] = &[
    // recipe / food service
    ("chef", Domain::Recipe, 1.0),
    ("cook", Domain::Recipe, 1.0),
    ("food", Domain::Recipe, 1.0),
    ("recipe", Domain::Recipe, 1.0),
    ("menu", Domain::Recipe, 1.0),
    ("buffet", Domain::Recipe, 1.0),
    ("vegetarian", Domain::Recipe, 1.0),
    ("vegan", Domain::Recipe, 1.0),
    ("gluten", Domain::Recipe, 0.5),
    ("dinner", Domain::Recipe, 0.5),
    ("lunch", Domain::Recipe, 0.5),
    ("breakfast", Domain::Recipe, 0.5),
    ("meal", Domain::Recipe, 0.5),
    ("catering", Domain::Recipe, 1.0),
    ("cuisine", Domain::Recipe, 1.0),
    ("ingredient", Domain::Recipe, 1.0),
    // academic research
    ("researcher", Domain::Academic, 1.0),
    ("research", Domain::Academic, 0.5),
    ("phd", Domain::Academic, 1.0),
    ("literature", Domain::Academic, 1.0),
    ("paper", Domain::Academic, 0.5),
    ("thesis", Domain::Academic, 1.0),
    ("methodology", Domain::Academic, 1.0),
    ("scientist", Domain::Academic, 1.0),
    ("journal", Domain::Academic, 0.5),
    ("benchmark", Domain::Academic, 0.5),
    ("dataset", Domain::Academic, 0.5),
    // business analysis
    ("analyst", Domain::Business, 1.0),
    ("investment", Domain::Business, 1.0),
    ("investor", Domain::Business, 1.0),
    ("revenue", Domain::Business, 1.0),
    ("financial", Domain::Business, 1.0),
    ("finance", Domain::Business, 1.0),
    ("market", Domain::Business, 0.5),
    ("profit", Domain::Business, 1.0),
    ("earnings", Domain::Business, 1.0),
    ("strategy", Domain::Business, 0.5),
    ("sales", Domain::Business, 0.5),
    // education
    ("student", Domain::Education, 1.0),
    ("undergraduate", Domain::Education, 1.0),
    ("teacher", Domain::Education, 1.0),
    ("exam", Domain::Education, 1.0),
    ("course", Domain::Education, 0.5),
    ("textbook", Domain::Education, 1.0),
    ("lesson", Domain::Education, 1.0),
    ("concept", Domain::Education, 0.5),
    ("learn", Domain::Education, 0.5),
    // technical / forms tooling
    ("engineer", Domain::Technical, 1.0),
    ("developer", Domain::Technical, 1.0),
    ("software", Domain::Technical, 1.0),
    ("implementation", Domain::Technical, 0.5),
    ("architecture", Domain::Technical, 0.5),
    ("algorithm", Domain::Technical, 1.0),
    ("documentation", Domain::Technical, 0.5),
    ("form", Domain::Technical, 0.5),
    ("fillable", Domain::Technical, 1.0),
    ("acrobat", Domain::Technical, 1.0),
    ("signature", Domain::Technical, 0.5),
    ("onboarding", Domain::Technical, 0.5),
    ("compliance", Domain::Technical, 0.5),
    // travel
    ("travel", Domain::Travel, 1.0),
    ("trip", Domain::Travel, 1.0),
    ("itinerary", Domain::Travel, 1.0),
    ("hotel", Domain::Travel, 1.0),
    ("tourist", Domain::Travel, 1.0),
    ("vacation", Domain::Travel, 1.0),
    ("holiday", Domain::Travel, 0.5),
    ("destination", Domain::Travel, 1.0),
    ("planner", Domain::Travel, 0.5),
    ("beach", Domain::Travel, 0.5),
    ("nightlife", Domain::Travel, 1.0),
];

/// Structural heading words recognized in every domain.
const BASE_HEADING_KEYWORDS: &[&str] = &[
    "abstract",
    "introduction",
    "overview",
    "background",
    "summary",
    "conclusion",
    "conclusions",
    "methodology",
    "methods",
    "results",
    "discussion",
    "analysis",
    "references",
    "appendix",
    "approach",
    "contents",
];

fn domain_heading_keywords(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Recipe => &[
            "ingredients",
            "instructions",
            "directions",
            "method",
            "preparation",
            "serves",
            "notes",
        ],
        Domain::Academic => &[
            "literature review",
            "related work",
            "experiments",
            "evaluation",
            "limitations",
            "future work",
        ],
        Domain::Business => &[
            "financial highlights",
            "outlook",
            "risk factors",
            "revenue",
            "strategy",
        ],
        Domain::Education => &["objectives", "examples", "exercises", "key terms", "review"],
        Domain::Technical => &[
            "prerequisites",
            "requirements",
            "installation",
            "configuration",
            "troubleshooting",
        ],
        Domain::Travel => &[
            "things to do",
            "where to stay",
            "getting around",
            "tips",
            "restaurants",
            "activities",
        ],
        Domain::Generic => &[],
    }
}

/// Heading keywords for a domain: the base set plus the domain's own.
pub fn heading_keywords(domain: Domain) -> Vec<&'static str> {
    BASE_HEADING_KEYWORDS
        .iter()
        .chain(domain_heading_keywords(domain))
        .copied()
        .collect()
}

/// Title words that mark a section as central to the domain's kind of reading.
fn domain_title_terms(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Academic => &["methodology", "results", "discussion", "analysis", "findings"],
        Domain::Business => &["financial", "revenue", "performance", "market", "strategy"],
        Domain::Education => &["concept", "theory", "principle", "example", "problem"],
        Domain::Recipe | Domain::Technical | Domain::Travel | Domain::Generic => &[],
    }
}

/// Domain title words present among `title_terms` (stemmed), in table order.
pub fn domain_title_matches(domain: Domain, title_terms: &HashSet<String>) -> Vec<&'static str> {
    domain_title_terms(domain)
        .iter()
        .copied()
        .filter(|word| title_terms.contains(&stem(word)))
        .collect()
}

static INDICATOR_INDEX: Lazy<HashMap<String, (Domain, f64)>> = Lazy::new(|| {
    DOMAIN_INDICATORS
        .iter()
        .map(|&(word, domain, weight)| (stem(word), (domain, weight)))
        .collect()
});

/// Looks up a stemmed term in the indicator table.
pub fn indicator(term: &str) -> Option<(Domain, f64)> {
    INDICATOR_INDEX.get(term).copied()
}

/// Result of matching profile terms against the indicator table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainMatch {
    pub domain: Domain,
    pub confidence: f64,
}

/// Sums indicator weights per domain over the distinct terms given and picks the best.
/// Falls back to `Generic` when the best score is below `min_confidence`.
pub fn detect_domain<'a>(
    terms: impl IntoIterator<Item = &'a str>,
    min_confidence: f64,
) -> DomainMatch {
    let mut seen = HashSet::new();
    let mut scores: HashMap<Domain, f64> = HashMap::new();

    for term in terms {
        if !seen.insert(term) {
            continue;
        }
        if let Some((domain, weight)) = indicator(term) {
            *scores.entry(domain).or_insert(0.0) += weight;
        }
    }

    let mut best = DomainMatch {
        domain: Domain::Generic,
        confidence: 0.0,
    };
    for domain in Domain::SPECIFIC {
        let score = scores.get(&domain).copied().unwrap_or(0.0);
        if score > best.confidence {
            best = DomainMatch {
                domain,
                confidence: score,
            };
        }
    }

    if best.confidence < min_confidence {
        DomainMatch {
            domain: Domain::Generic,
            confidence: best.confidence,
        }
    } else {
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::terms;

    fn detect(text: &str) -> DomainMatch {
        let t = terms(text);
        detect_domain(t.iter().map(String::as_str), 1.0)
    }

    #[test]
    fn test_food_contractor_is_recipe_domain() {
        let m = detect("Food Contractor prepare vegetarian buffet menu");
        assert_eq!(m.domain, Domain::Recipe);
        assert!(m.confidence >= 3.0);
    }

    #[test]
    fn test_researcher_is_academic_domain() {
        let m = detect("PhD Researcher in Computational Biology preparing a literature review");
        assert_eq!(m.domain, Domain::Academic);
    }

    #[test]
    fn test_travel_planner_is_travel_domain() {
        let m = detect("Travel Planner: plan a trip of 4 days for a group of friends");
        assert_eq!(m.domain, Domain::Travel);
    }

    #[test]
    fn test_weak_evidence_falls_back_to_generic() {
        // "market" alone carries 0.5, below the 1.0 default threshold
        let m = detect("someone browsing the market");
        assert_eq!(m.domain, Domain::Generic);
        assert!((m.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_terms_count_once() {
        let m = detect("menu menu menu");
        assert!((m.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_resolve_by_declaration_order() {
        // chef (recipe 1.0) vs analyst (business 1.0)
        let m = detect("chef analyst");
        assert_eq!(m.domain, Domain::Recipe);
    }

    #[test]
    fn test_heading_keywords_include_base_and_domain_sets() {
        let kws = heading_keywords(Domain::Recipe);
        assert!(kws.contains(&"introduction"));
        assert!(kws.contains(&"ingredients"));
        assert!(!heading_keywords(Domain::Generic).contains(&"ingredients"));
    }

    #[test]
    fn test_domain_title_matches() {
        let title: HashSet<String> = terms("Results and Discussion").into_iter().collect();
        assert_eq!(
            domain_title_matches(Domain::Academic, &title),
            vec!["results", "discussion"]
        );
        assert!(domain_title_matches(Domain::Business, &title).is_empty());
        assert!(domain_title_matches(Domain::Generic, &title).is_empty());
    }

    #[test]
    fn test_domain_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Domain::Recipe).unwrap(), r#""recipe""#);
        assert_eq!(Domain::default(), Domain::Generic);
    }
}
