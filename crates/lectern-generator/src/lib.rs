//! Lectern Generator
//!
//! Produces exercise content for regenerations by prompting an LLM.
//!
//! # Overview
//!
//! The generator reads a homework brief (grade, topic, difficulty and the
//! mix of question kinds) from the request metadata, builds one prompt per
//! question kind, and parses the JSON the model returns into validated
//! [`UnitDocument`](lectern_domain::UnitDocument)s.
//!
//! # Architecture
//!
//! ```text
//! GenerationRequest → PromptBuilder → LLM → parser → GeneratedContent
//! ```
//!
//! A unit regeneration sends the current unit to the model and asks for one
//! replacement of the same kind. Any malformed item fails the whole call.
//!
//! # Example Usage
//!
//! ```
//! use lectern_domain::{ContentGenerator, GenerationRequest, Metadata, RegenerationScope};
//! use lectern_generator::{GeneratorConfig, LlmContentGenerator};
//! use lectern_llm::MockProvider;
//!
//! let llm = MockProvider::new(r#"{"questions": [{"statement": "Fish swim.", "answer": true}]}"#);
//! let generator = LlmContentGenerator::new(llm, GeneratorConfig::default()).unwrap();
//!
//! let metadata: Metadata = [
//!     ("grade".to_string(), "Grade 5".to_string()),
//!     ("topic".to_string(), "Animals".to_string()),
//!     ("question_types".to_string(), "true_false:1".to_string()),
//! ]
//! .into_iter()
//! .collect();
//!
//! let request = GenerationRequest {
//!     scope: RegenerationScope::WholeArtifact,
//!     custom_prompt: None,
//!     context: "",
//!     current: &[],
//!     metadata: &metadata,
//! };
//! assert!(generator.generate(&request).is_ok());
//! ```

#![warn(missing_docs)]

mod error;
mod config;
pub mod brief;
mod prompt;
mod parser;
mod generator;

#[cfg(test)]
mod tests;

pub use error::GeneratorError;
pub use config::GeneratorConfig;
pub use brief::{Difficulty, HomeworkBrief};
pub use generator::LlmContentGenerator;
