//! Homework brief read from request metadata
//!
//! Keys: `grade`, `topic`, `difficulty`, `question_types` (`kind:count,...`).

use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use lectern_domain::{Metadata, UnitDocument, UnitKind};
use std::fmt;

/// Metadata key for the grade label
pub const GRADE_KEY: &str = "grade";
/// Metadata key for the topic
pub const TOPIC_KEY: &str = "topic";
/// Metadata key for the difficulty
pub const DIFFICULTY_KEY: &str = "difficulty";
/// Metadata key for the question mix
pub const QUESTION_TYPES_KEY: &str = "question_types";

/// Supported grade range (inclusive)
const GRADES: std::ops::RangeInclusive<u8> = 3..=12;

/// Exercise difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    /// Basic knowledge points
    Easy,
    /// Integrated application
    Medium,
    /// Extension and challenge
    Hard,
}

impl Difficulty {
    /// Parse from `easy`, `medium` or `hard`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Name as used in metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// What the level means, for prompts
    pub fn description(&self) -> &'static str {
        match self {
            Difficulty::Easy => "basic knowledge points",
            Difficulty::Medium => "integrated application of knowledge",
            Difficulty::Hard => "extension and challenge",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeworkBrief {
    /// Normalised grade label, `Grade 3` to `Grade 12`
    pub grade: String,
    /// Topic of the exercises
    pub topic: String,
    /// Difficulty
    pub difficulty: Difficulty,
    /// Kinds and counts, in output order
    pub question_mix: Vec<(UnitKind, u32)>,
}

impl HomeworkBrief {
    /// Read the brief from metadata
    ///
    /// When `question_types` is absent the mix is derived from `current`
    /// (kinds in order of first appearance with their counts), so a whole
    /// regeneration reproduces the layout of the active version.
    pub fn from_metadata(
        metadata: &Metadata,
        current: &[UnitDocument],
        config: &GeneratorConfig,
    ) -> Result<Self, GeneratorError> {
        let grade = metadata
            .get(GRADE_KEY)
            .ok_or_else(|| GeneratorError::InvalidBrief("missing 'grade'".to_string()))
            .and_then(|g| normalize_grade(g))?;

        let topic = metadata
            .get(TOPIC_KEY)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        if topic.chars().count() < 2 {
            return Err(GeneratorError::InvalidBrief(
                "topic must be at least 2 characters".to_string(),
            ));
        }

        let difficulty_raw = metadata
            .get(DIFFICULTY_KEY)
            .map(String::as_str)
            .unwrap_or(config.default_difficulty.as_str());
        let difficulty = Difficulty::parse(difficulty_raw).ok_or_else(|| {
            GeneratorError::InvalidBrief(format!(
                "difficulty must be easy, medium or hard, got '{}'",
                difficulty_raw
            ))
        })?;

        let question_mix = match metadata.get(QUESTION_TYPES_KEY) {
            Some(raw) => parse_question_types(raw, config.max_count_per_kind)?,
            None => mix_of(current),
        };
        if question_mix.is_empty() {
            return Err(GeneratorError::InvalidBrief(
                "no question types requested".to_string(),
            ));
        }

        Ok(Self {
            grade,
            topic,
            difficulty,
            question_mix,
        })
    }

    /// Total number of units requested
    pub fn total_units(&self) -> u32 {
        self.question_mix.iter().map(|(_, count)| count).sum()
    }
}

/// Accept `Grade 7`, `grade 7` or `7`
fn normalize_grade(raw: &str) -> Result<String, GeneratorError> {
    let trimmed = raw.trim();
    let number = trimmed
        .strip_prefix("Grade")
        .or_else(|| trimmed.strip_prefix("grade"))
        .unwrap_or(trimmed)
        .trim();
    match number.parse::<u8>() {
        Ok(n) if GRADES.contains(&n) => Ok(format!("Grade {}", n)),
        _ => Err(GeneratorError::InvalidBrief(format!(
            "grade must be Grade 3 to Grade 12, got '{}'",
            raw
        ))),
    }
}

/// Parse `choice:5,listening:2`
pub fn parse_question_types(raw: &str, max_count: u32) -> Result<Vec<(UnitKind, u32)>, GeneratorError> {
    let mut mix: Vec<(UnitKind, u32)> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (kind, count) = entry.split_once(':').unwrap_or((entry, "1"));
        let kind = UnitKind::parse(kind).ok_or_else(|| {
            GeneratorError::InvalidBrief(format!("unknown question type '{}'", kind.trim()))
        })?;
        let count: u32 = count.trim().parse().map_err(|_| {
            GeneratorError::InvalidBrief(format!("invalid count in '{}'", entry))
        })?;
        if count == 0 || count > max_count {
            return Err(GeneratorError::InvalidBrief(format!(
                "count for {} must be between 1 and {}, got {}",
                kind, max_count, count
            )));
        }
        if mix.iter().any(|(k, _)| *k == kind) {
            return Err(GeneratorError::InvalidBrief(format!(
                "question type {} listed twice",
                kind
            )));
        }
        mix.push((kind, count));
    }
    Ok(mix)
}

fn mix_of(units: &[UnitDocument]) -> Vec<(UnitKind, u32)> {
    let mut mix: Vec<(UnitKind, u32)> = Vec::new();
    for unit in units {
        let kind = unit.kind();
        match mix.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, count)) => *count += 1,
            None => mix.push((kind, 1)),
        }
    }
    mix
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_domain::{FillBlankQuestion, ListeningQuestion};

    fn metadata(pairs: &[(&str, &str)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_brief() {
        let brief = HomeworkBrief::from_metadata(
            &metadata(&[
                ("grade", "grade 8"),
                ("topic", "Present perfect"),
                ("difficulty", "hard"),
                ("question_types", "choice:5, listening:2"),
            ]),
            &[],
            &GeneratorConfig::default(),
        )
        .unwrap();

        assert_eq!(brief.grade, "Grade 8");
        assert_eq!(brief.difficulty, Difficulty::Hard);
        assert_eq!(
            brief.question_mix,
            vec![(UnitKind::Choice, 5), (UnitKind::Listening, 2)]
        );
        assert_eq!(brief.total_units(), 7);
    }

    #[test]
    fn test_mix_falls_back_to_current_content() {
        let fill = UnitDocument::FillBlank(FillBlankQuestion {
            sentence: "a ___".to_string(),
            answer: "b".to_string(),
            explanation: String::new(),
        });
        let listening = UnitDocument::Listening(ListeningQuestion {
            script: "M: hi".to_string(),
            question: "q".to_string(),
            options: vec!["A. x".to_string(), "B. y".to_string()],
            answer: "A".to_string(),
            explanation: String::new(),
        });
        let brief = HomeworkBrief::from_metadata(
            &metadata(&[("grade", "7"), ("topic", "Food")]),
            &[fill.clone(), listening, fill],
            &GeneratorConfig::default(),
        )
        .unwrap();

        assert_eq!(brief.difficulty, Difficulty::Medium);
        assert_eq!(
            brief.question_mix,
            vec![(UnitKind::FillBlank, 2), (UnitKind::Listening, 1)]
        );
    }

    #[test]
    fn test_invalid_briefs() {
        let config = GeneratorConfig::default();
        let cases = [
            metadata(&[("topic", "Food"), ("question_types", "choice:1")]),
            metadata(&[("grade", "Grade 2"), ("topic", "Food"), ("question_types", "choice:1")]),
            metadata(&[("grade", "Grade 5"), ("topic", "F"), ("question_types", "choice:1")]),
            metadata(&[("grade", "Grade 5"), ("topic", "Food"), ("difficulty", "extreme"), ("question_types", "choice:1")]),
            metadata(&[("grade", "Grade 5"), ("topic", "Food"), ("question_types", "poem:1")]),
            metadata(&[("grade", "Grade 5"), ("topic", "Food"), ("question_types", "choice:21")]),
            metadata(&[("grade", "Grade 5"), ("topic", "Food"), ("question_types", "choice:0")]),
            metadata(&[("grade", "Grade 5"), ("topic", "Food")]),
        ];
        for case in cases {
            let result = HomeworkBrief::from_metadata(&case, &[], &config);
            assert!(
                matches!(result, Err(GeneratorError::InvalidBrief(_))),
                "expected invalid brief for {:?}",
                case
            );
        }
    }

    #[test]
    fn test_parse_question_types() {
        assert_eq!(
            parse_question_types("essay", 20).unwrap(),
            vec![(UnitKind::Essay, 1)]
        );
        assert!(parse_question_types("choice:2,choice:3", 20).is_err());
        assert!(parse_question_types("choice:x", 20).is_err());
        assert!(parse_question_types("", 20).unwrap().is_empty());
    }
}
