//! Unit documents - the independently addressable questions of an artifact
//!
//! Each variant mirrors one question template the generator knows how to ask
//! for. Only listening units carry spoken text and therefore need audio.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a unit document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Multiple choice question
    Choice,
    /// Fill in the blank
    FillBlank,
    /// True / false statement
    TrueFalse,
    /// Reading passage with nested questions
    Reading,
    /// Listening script with a question
    Listening,
    /// Essay writing task
    Essay,
}

impl UnitKind {
    /// All kinds in template order
    pub const ALL: [UnitKind; 6] = [
        UnitKind::Choice,
        UnitKind::FillBlank,
        UnitKind::TrueFalse,
        UnitKind::Reading,
        UnitKind::Listening,
        UnitKind::Essay,
    ];

    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Choice => "choice",
            UnitKind::FillBlank => "fill_blank",
            UnitKind::TrueFalse => "true_false",
            UnitKind::Reading => "reading",
            UnitKind::Listening => "listening",
            UnitKind::Essay => "essay",
        }
    }

    /// Parse a kind from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "choice" => Some(UnitKind::Choice),
            "fill_blank" => Some(UnitKind::FillBlank),
            "true_false" => Some(UnitKind::TrueFalse),
            "reading" => Some(UnitKind::Reading),
            "listening" => Some(UnitKind::Listening),
            "essay" => Some(UnitKind::Essay),
            _ => None,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiple choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceQuestion {
    /// Question stem
    pub question: String,
    /// Options, conventionally prefixed "A. ", "B. ", ...
    pub options: Vec<String>,
    /// Correct option letter
    pub answer: String,
    /// Explanation of the answer
    #[serde(default)]
    pub explanation: String,
}

/// Fill in the blank question (blank written as `___`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillBlankQuestion {
    /// Sentence containing the blank
    pub sentence: String,
    /// Accepted answer(s), alternatives separated by `/`
    pub answer: String,
    /// Explanation of the answer
    #[serde(default)]
    pub explanation: String,
}

/// True / false statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrueFalseQuestion {
    /// Statement to judge
    pub statement: String,
    /// "True" or "False"
    pub answer: String,
    /// Explanation of the answer
    #[serde(default)]
    pub explanation: String,
}

/// Reading comprehension passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingPassage {
    /// Passage title
    #[serde(default)]
    pub title: String,
    /// Passage text
    pub passage: String,
    /// Questions about the passage
    pub questions: Vec<ChoiceQuestion>,
}

/// Listening question with a spoken script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningQuestion {
    /// Dialogue or monologue, one `Speaker: line` per line
    pub script: String,
    /// Question about the script
    pub question: String,
    /// Answer options
    pub options: Vec<String>,
    /// Correct option letter
    pub answer: String,
    /// Explanation of the answer
    #[serde(default)]
    pub explanation: String,
}

/// Essay writing task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssayPrompt {
    /// Essay title
    pub title: String,
    /// Task requirements
    pub requirements: String,
    /// Expected length, e.g. "80-120 words"
    #[serde(default)]
    pub word_count: String,
    /// Sample essay
    #[serde(default)]
    pub sample: String,
    /// Grading criteria
    #[serde(default)]
    pub grading_points: Vec<String>,
}

/// One unit document of an artifact's content
///
/// Serialized with an internal `type` tag matching [`UnitKind::as_str`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnitDocument {
    /// Multiple choice question
    Choice(ChoiceQuestion),
    /// Fill in the blank
    FillBlank(FillBlankQuestion),
    /// True / false statement
    TrueFalse(TrueFalseQuestion),
    /// Reading passage
    Reading(ReadingPassage),
    /// Listening question
    Listening(ListeningQuestion),
    /// Essay task
    Essay(EssayPrompt),
}

impl UnitDocument {
    /// Kind of this unit
    pub fn kind(&self) -> UnitKind {
        match self {
            UnitDocument::Choice(_) => UnitKind::Choice,
            UnitDocument::FillBlank(_) => UnitKind::FillBlank,
            UnitDocument::TrueFalse(_) => UnitKind::TrueFalse,
            UnitDocument::Reading(_) => UnitKind::Reading,
            UnitDocument::Listening(_) => UnitKind::Listening,
            UnitDocument::Essay(_) => UnitKind::Essay,
        }
    }

    /// Spoken text of this unit, if it has any
    pub fn spoken_text(&self) -> Option<&str> {
        match self {
            UnitDocument::Listening(q) if !q.script.trim().is_empty() => Some(&q.script),
            _ => None,
        }
    }

    /// Check required fields are present
    ///
    /// Generated content is validated here before it can be committed.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            UnitDocument::Choice(q) => validate_choice(q),
            UnitDocument::FillBlank(q) => {
                require("sentence", &q.sentence)?;
                require("answer", &q.answer)
            }
            UnitDocument::TrueFalse(q) => {
                require("statement", &q.statement)?;
                match q.answer.trim().to_lowercase().as_str() {
                    "true" | "false" => Ok(()),
                    other => Err(format!("answer must be True or False, got '{}'", other)),
                }
            }
            UnitDocument::Reading(p) => {
                require("passage", &p.passage)?;
                if p.questions.is_empty() {
                    return Err("reading passage has no questions".to_string());
                }
                p.questions.iter().try_for_each(validate_choice)
            }
            UnitDocument::Listening(q) => {
                require("script", &q.script)?;
                require("question", &q.question)?;
                require("answer", &q.answer)?;
                if q.options.len() < 2 {
                    return Err("listening question needs at least 2 options".to_string());
                }
                Ok(())
            }
            UnitDocument::Essay(e) => {
                require("title", &e.title)?;
                require("requirements", &e.requirements)
            }
        }
    }
}

fn validate_choice(q: &ChoiceQuestion) -> Result<(), String> {
    require("question", &q.question)?;
    require("answer", &q.answer)?;
    if q.options.len() < 2 {
        return Err("choice question needs at least 2 options".to_string());
    }
    Ok(())
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("missing '{}'", field))
    } else {
        Ok(())
    }
}

/// Whether any unit of the content carries spoken text
pub fn requires_audio(content: &[UnitDocument]) -> bool {
    content.iter().any(|unit| unit.spoken_text().is_some())
}

/// All spoken text of the content, in unit order, one script per paragraph
pub fn dialogue_text<'a, I>(units: I) -> String
where
    I: IntoIterator<Item = &'a UnitDocument>,
{
    units
        .into_iter()
        .filter_map(UnitDocument::spoken_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}
