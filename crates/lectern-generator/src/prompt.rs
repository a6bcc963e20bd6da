//! LLM prompt engineering for exercise generation

use crate::brief::HomeworkBrief;
use lectern_domain::{UnitDocument, UnitKind};

/// Builds the prompt for one question kind of a whole regeneration
pub struct PromptBuilder<'a> {
    brief: &'a HomeworkBrief,
    kind: UnitKind,
    count: u32,
    context: &'a str,
    custom_prompt: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(brief: &'a HomeworkBrief, kind: UnitKind, count: u32) -> Self {
        Self {
            brief,
            kind,
            count,
            context: "",
            custom_prompt: None,
        }
    }

    /// Add the history digest
    pub fn with_context(mut self, context: &'a str) -> Self {
        self.context = context;
        self
    }

    /// Add the user's instruction
    pub fn with_custom_prompt(mut self, custom_prompt: Option<&'a str>) -> Self {
        self.custom_prompt = custom_prompt;
        self
    }

    /// Build the complete generation prompt
    pub fn build(&self) -> String {
        let template = template_for(self.kind);
        let mut prompt = String::new();

        // 1. Task
        prompt.push_str(&format!(
            "Generate {} English {}.\n\n",
            self.count, template.noun
        ));

        // 2. Brief
        push_brief(&mut prompt, self.brief);

        // 3. Requirements
        prompt.push_str("Requirements:\n");
        for (i, rule) in template.rules.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, rule));
        }
        prompt.push_str(&format!(
            "{}. Match the level of {} students.\n",
            template.rules.len() + 1,
            self.brief.grade
        ));
        prompt.push_str(&format!(
            "{}. Match the {} difficulty ({}).\n\n",
            template.rules.len() + 2,
            self.brief.difficulty,
            self.brief.difficulty.description()
        ));

        // 4. History and instruction
        push_history(&mut prompt, self.context, self.custom_prompt);

        // 5. Output format
        prompt.push_str("Output format (JSON only, no additional text):\n");
        prompt.push_str(template.format);
        prompt
    }
}

/// Build the prompt that rewrites a single unit
///
/// The model sees the current unit as JSON and must answer with exactly one
/// replacement of the same kind.
pub fn unit_rewrite_prompt(
    target: &UnitDocument,
    brief: Option<&HomeworkBrief>,
    context: &str,
    custom_prompt: Option<&str>,
) -> String {
    let template = template_for(target.kind());
    let current = serde_json::to_string_pretty(target).unwrap_or_default();
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Rewrite the following English exercise. Produce exactly one replacement of the same type ({}).\n\n",
        target.kind()
    ));
    if let Some(brief) = brief {
        push_brief(&mut prompt, brief);
    }

    prompt.push_str("Current exercise:\n---\n");
    prompt.push_str(&current);
    prompt.push_str("\n---\n\n");

    prompt.push_str("Requirements:\n");
    for (i, rule) in template.rules.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, rule));
    }
    prompt.push('\n');

    push_history(&mut prompt, context, custom_prompt);

    prompt.push_str("Output format (a single JSON object, no additional text):\n");
    prompt.push_str(template.single);
    prompt
}

/// Example output shape for `kind`, passed as the schema in JSON mode
pub fn output_schema(kind: UnitKind) -> &'static str {
    template_for(kind).format
}

fn push_brief(prompt: &mut String, brief: &HomeworkBrief) {
    prompt.push_str(&format!("Grade: {}\n", brief.grade));
    prompt.push_str(&format!("Topic: {}\n", brief.topic));
    prompt.push_str(&format!("Difficulty: {}\n\n", brief.difficulty));
}

fn push_history(prompt: &mut String, context: &str, custom_prompt: Option<&str>) {
    if !context.trim().is_empty() {
        prompt.push_str("Recent revisions of this homework (oldest first):\n");
        prompt.push_str(context);
        prompt.push_str("\n\n");
    }
    if let Some(instruction) = custom_prompt.map(str::trim).filter(|p| !p.is_empty()) {
        prompt.push_str("Teacher's instruction for this revision:\n");
        prompt.push_str(instruction);
        prompt.push_str("\n\n");
    }
}

struct KindTemplate {
    noun: &'static str,
    rules: &'static [&'static str],
    format: &'static str,
    single: &'static str,
}

fn template_for(kind: UnitKind) -> &'static KindTemplate {
    match kind {
        UnitKind::Choice => &CHOICE,
        UnitKind::FillBlank => &FILL_BLANK,
        UnitKind::TrueFalse => &TRUE_FALSE,
        UnitKind::Reading => &READING,
        UnitKind::Listening => &LISTENING,
        UnitKind::Essay => &ESSAY,
    }
}

const CHOICE: KindTemplate = KindTemplate {
    noun: "multiple choice questions",
    rules: &[
        "Each question has a stem (question), 4 options (options), the correct answer (answer) and an explanation (explanation).",
        "Options are formatted \"A. ...\", \"B. ...\", \"C. ...\", \"D. ...\".",
        "The answer is a single letter (A/B/C/D).",
        "Explanations are short and state the reason.",
    ],
    format: r#"{
  "questions": [
    {
      "question": "She ___ in Beijing since 2010.",
      "options": ["A. lives", "B. lived", "C. has lived", "D. will live"],
      "answer": "C",
      "explanation": "'since 2010' calls for the present perfect."
    }
  ]
}"#,
    single: r#"{
  "question": "...",
  "options": ["A. ...", "B. ...", "C. ...", "D. ..."],
  "answer": "A",
  "explanation": "..."
}"#,
};

const FILL_BLANK: KindTemplate = KindTemplate {
    noun: "fill-in-the-blank questions",
    rules: &[
        "Each question has a sentence (sentence) with the blank written as ___, the answer (answer) and an explanation (explanation).",
        "The blank tests a key point (vocabulary, grammar or phrase).",
        "Several correct answers are separated by /.",
        "The explanation names the tested point.",
    ],
    format: r#"{
  "questions": [
    {
      "sentence": "This is the place ___ I was born.",
      "answer": "where",
      "explanation": "Relative clause: 'place' is an adverbial of place, so use 'where'."
    }
  ]
}"#,
    single: r#"{
  "sentence": "... ___ ...",
  "answer": "...",
  "explanation": "..."
}"#,
};

const TRUE_FALSE: KindTemplate = KindTemplate {
    noun: "true/false questions",
    rules: &[
        "Each question has a statement (statement), the answer (answer, True or False) and an explanation (explanation).",
        "Statements test common grammar rules, word usage or cultural knowledge.",
        "The answer is exactly True or False.",
    ],
    format: r#"{
  "questions": [
    {
      "statement": "The past tense of 'go' is 'goed'.",
      "answer": "False",
      "explanation": "'go' is irregular; its past tense is 'went'."
    }
  ]
}"#,
    single: r#"{
  "statement": "...",
  "answer": "True",
  "explanation": "..."
}"#,
};

const READING: KindTemplate = KindTemplate {
    noun: "reading comprehension passages",
    rules: &[
        "Each passage has a title (title), a text of 150-250 words (passage) and 3-5 questions (questions).",
        "Questions cover detail, inference, word meaning and main idea.",
        "Each question has a stem (question), options (options), the answer letter (answer) and an explanation (explanation).",
        "Content is close to students' lives or interesting cultural knowledge.",
    ],
    format: r#"{
  "passages": [
    {
      "title": "...",
      "passage": "...",
      "questions": [
        {
          "question": "According to the passage, ...?",
          "options": ["A. ...", "B. ...", "C. ...", "D. ..."],
          "answer": "B",
          "explanation": "See paragraph 2."
        }
      ]
    }
  ]
}"#,
    single: r#"{
  "title": "...",
  "passage": "...",
  "questions": [
    {"question": "...", "options": ["A. ...", "B. ...", "C. ...", "D. ..."], "answer": "A", "explanation": "..."}
  ]
}"#,
};

const LISTENING: KindTemplate = KindTemplate {
    noun: "listening questions",
    rules: &[
        "Each question has a script of 50-100 words (script), a question (question), options (options), the answer letter (answer) and an explanation (explanation).",
        "The script is a natural dialogue or monologue, one turn per line written as 'Speaker: text' (M: for a man, W: for a woman).",
        "The question tests listening comprehension (detail, gist or inference).",
    ],
    format: r#"{
  "questions": [
    {
      "script": "M: What would you like to eat?\nW: I'd like a hamburger, please.",
      "question": "What does the woman want to eat?",
      "options": ["A. A sandwich", "B. A hamburger", "C. A pizza", "D. A salad"],
      "answer": "B",
      "explanation": "The woman says 'I'd like a hamburger'."
    }
  ]
}"#,
    single: r#"{
  "script": "M: ...\nW: ...",
  "question": "...",
  "options": ["A. ...", "B. ...", "C. ...", "D. ..."],
  "answer": "A",
  "explanation": "..."
}"#,
};

const ESSAY: KindTemplate = KindTemplate {
    noun: "writing tasks",
    rules: &[
        "Each task has a title (title), requirements (requirements), a length (word_count), a sample essay of 80-120 words (sample) and 3-5 grading points (grading_points).",
        "Topics are close to students' lives or current events.",
        "Requirements state content points, genre and tense.",
    ],
    format: r#"{
  "questions": [
    {
      "title": "My Favorite Season",
      "requirements": "Write about your favorite season: which season, why you like it, what you do.",
      "word_count": "80-120 words",
      "sample": "My favorite season is spring...",
      "grading_points": ["Covers all points", "Correct grammar", "Rich vocabulary", "Clear structure"]
    }
  ]
}"#,
    single: r#"{
  "title": "...",
  "requirements": "...",
  "word_count": "80-120 words",
  "sample": "...",
  "grading_points": ["..."]
}"#,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::Difficulty;
    use lectern_domain::TrueFalseQuestion;

    fn brief() -> HomeworkBrief {
        HomeworkBrief {
            grade: "Grade 8".to_string(),
            topic: "Present perfect".to_string(),
            difficulty: Difficulty::Medium,
            question_mix: vec![(UnitKind::Choice, 3)],
        }
    }

    #[test]
    fn test_build_includes_brief_and_format() {
        let brief = brief();
        let prompt = PromptBuilder::new(&brief, UnitKind::Choice, 3).build();

        assert!(prompt.starts_with("Generate 3 English multiple choice questions."));
        assert!(prompt.contains("Grade: Grade 8"));
        assert!(prompt.contains("Topic: Present perfect"));
        assert!(prompt.contains("\"questions\""));
        assert!(!prompt.contains("Recent revisions"));
        assert!(!prompt.contains("Teacher's instruction"));
    }

    #[test]
    fn test_build_includes_history_and_instruction() {
        let brief = brief();
        let prompt = PromptBuilder::new(&brief, UnitKind::Reading, 1)
            .with_context("### Version 1\nPrompt: make it harder")
            .with_custom_prompt(Some("simplify"))
            .build();

        assert!(prompt.contains("Recent revisions"));
        assert!(prompt.contains("make it harder"));
        assert!(prompt.contains("Teacher's instruction for this revision:\nsimplify"));
        assert!(prompt.contains("\"passages\""));
    }

    #[test]
    fn test_blank_instruction_is_omitted() {
        let brief = brief();
        let prompt = PromptBuilder::new(&brief, UnitKind::Essay, 1)
            .with_custom_prompt(Some("   "))
            .build();
        assert!(!prompt.contains("Teacher's instruction"));
    }

    #[test]
    fn test_unit_rewrite_prompt_shows_target() {
        let target = UnitDocument::TrueFalse(TrueFalseQuestion {
            statement: "Cats can fly.".to_string(),
            answer: "False".to_string(),
            explanation: String::new(),
        });
        let prompt = unit_rewrite_prompt(&target, None, "", Some("make it about dogs"));

        assert!(prompt.contains("same type (true_false)"));
        assert!(prompt.contains("Cats can fly."));
        assert!(prompt.contains("make it about dogs"));
        assert!(!prompt.contains("Grade:"));
    }
}
