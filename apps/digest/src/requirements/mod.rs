//! Requirement extraction: persona + job text → weighted keyword profile.

pub mod domains;
pub mod profile;
pub mod signals;

pub use domains::{domain_title_matches, heading_keywords, Domain};
pub use profile::{extract_profile, ExtractorSettings, RequirementProfile};
pub use signals::ProfileSignals;
