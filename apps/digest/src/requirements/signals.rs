//! Coarse persona/task signals reported alongside the profile.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Expert,
    #[default]
    Intermediate,
    Beginner,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    LiteratureReview,
    Analysis,
    Summarization,
    Preparation,
    InformationExtraction,
    #[default]
    General,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSignals {
    pub experience_level: ExperienceLevel,
    pub task_type: TaskType,
}

const EXPERT_MARKERS: &[&str] = &["phd", "senior", "lead", "principal", "expert", "professor"];
const BEGINNER_MARKERS: &[&str] = &["undergraduate", "junior", "entry", "beginner", "novice"];

/// Checked in order; the first row with a matching cue wins.
const TASK_CUES: &[(TaskType, &[&str])] = &[
    (TaskType::LiteratureReview, &["review", "survey", "overview"]),
    (TaskType::Analysis, &["analyze", "analyse", "analysis", "examine", "compare"]),
    (TaskType::Summarization, &["summarize", "summarise", "summary"]),
    (TaskType::Preparation, &["prepare", "plan", "study", "learn", "create"]),
    (TaskType::InformationExtraction, &["identify", "find", "extract", "list"]),
];

pub fn detect_signals(persona: &str, job: &str) -> ProfileSignals {
    ProfileSignals {
        experience_level: detect_experience(&lower_words(persona)),
        task_type: detect_task(&lower_words(job)),
    }
}

fn lower_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn detect_experience(words: &[String]) -> ExperienceLevel {
    let has = |markers: &[&str]| words.iter().any(|w| markers.contains(&w.as_str()));
    if has(EXPERT_MARKERS) {
        ExperienceLevel::Expert
    } else if has(BEGINNER_MARKERS) {
        ExperienceLevel::Beginner
    } else {
        ExperienceLevel::Intermediate
    }
}

fn detect_task(words: &[String]) -> TaskType {
    TASK_CUES
        .iter()
        .find(|(_, cues)| words.iter().any(|w| cues.contains(&w.as_str())))
        .map(|(task, _)| *task)
        .unwrap_or_default()
}
