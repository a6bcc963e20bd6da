//! LLM-backed content generator

use crate::brief::HomeworkBrief;
use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use crate::parser::{parse_single_unit, parse_units};
use crate::prompt::{output_schema, unit_rewrite_prompt, PromptBuilder};
use lectern_domain::traits::LlmProvider;
use lectern_domain::{
    ContentGenerator, GeneratedContent, GenerationError, GenerationRequest, RegenerationScope,
    UnitDocument, UnitKind,
};
use std::fmt::Display;
use tracing::{debug, info};

/// Generates unit documents by prompting an LLM
///
/// A whole regeneration issues one LLM call per question kind in the brief
/// and concatenates the results in brief order. A unit regeneration issues a
/// single call that rewrites the target unit.
pub struct LlmContentGenerator<L>
where
    L: LlmProvider,
{
    llm: L,
    config: GeneratorConfig,
}

impl<L> LlmContentGenerator<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a new generator
    pub fn new(llm: L, config: GeneratorConfig) -> Result<Self, GeneratorError> {
        config.validate().map_err(GeneratorError::Config)?;
        Ok(Self { llm, config })
    }

    /// The underlying provider
    pub fn provider(&self) -> &L {
        &self.llm
    }

    /// Generate replacement content for the whole artifact
    pub fn generate_whole(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<Vec<UnitDocument>, GeneratorError> {
        let brief = HomeworkBrief::from_metadata(request.metadata, request.current, &self.config)?;
        info!(
            grade = %brief.grade,
            topic = %brief.topic,
            units = brief.total_units(),
            "Generating whole artifact"
        );

        let mut content = Vec::with_capacity(brief.total_units() as usize);
        for &(kind, count) in &brief.question_mix {
            let prompt = PromptBuilder::new(&brief, kind, count)
                .with_context(request.context)
                .with_custom_prompt(request.custom_prompt)
                .build();
            let response = self.call(&prompt, kind)?;
            let units = parse_units(&response, kind, count as usize)?;
            if units.len() < count as usize {
                debug!(
                    kind = %kind,
                    requested = count,
                    received = units.len(),
                    "LLM returned fewer units than requested"
                );
            }
            content.extend(units);
        }
        Ok(content)
    }

    /// Generate a replacement for the unit at `index`
    pub fn generate_unit(
        &self,
        request: &GenerationRequest<'_>,
        index: usize,
    ) -> Result<UnitDocument, GeneratorError> {
        let target = request.current.get(index).ok_or_else(|| {
            GeneratorError::InvalidFormat(format!(
                "unit index {} out of range (content has {} units)",
                index,
                request.current.len()
            ))
        })?;
        // The brief only adds guidance here; a unit can be rewritten without it
        let brief = HomeworkBrief::from_metadata(request.metadata, request.current, &self.config).ok();
        let kind = target.kind();
        info!(index, kind = %kind, "Generating single unit");

        let prompt = unit_rewrite_prompt(target, brief.as_ref(), request.context, request.custom_prompt);
        let response = self.call(&prompt, kind)?;
        let unit = parse_single_unit(&response, kind)?;
        if unit.kind() != kind {
            return Err(GeneratorError::InvalidFormat(format!(
                "expected a {} unit, got {}",
                kind,
                unit.kind()
            )));
        }
        Ok(unit)
    }

    fn call(&self, prompt: &str, kind: UnitKind) -> Result<String, GeneratorError> {
        debug!(kind = %kind, chars = prompt.len(), "Prompting LLM");
        let response = if self.config.json_mode {
            self.llm.generate_structured(prompt, output_schema(kind))
        } else {
            self.llm.generate(prompt)
        };
        response.map_err(|e| GeneratorError::Llm(e.to_string()))
    }
}

impl<L> ContentGenerator for LlmContentGenerator<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GeneratedContent, GenerationError> {
        let content = match request.scope {
            RegenerationScope::WholeArtifact => GeneratedContent::Whole(self.generate_whole(request)?),
            RegenerationScope::Unit(index) => GeneratedContent::Unit(self.generate_unit(request, index)?),
        };
        Ok(content)
    }
}
