//! Integration tests for the content generator

#[cfg(test)]
mod tests {
    use crate::{GeneratorConfig, LlmContentGenerator};
    use lectern_domain::{
        ChoiceQuestion, ContentGenerator, GeneratedContent, GenerationError, GenerationRequest,
        ListeningQuestion, Metadata, RegenerationScope, UnitDocument, UnitKind,
    };
    use lectern_llm::MockProvider;

    fn brief(question_types: &str) -> Metadata {
        [
            ("grade", "Grade 7"),
            ("topic", "Food and drink"),
            ("question_types", question_types),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn request<'a>(
        scope: RegenerationScope,
        current: &'a [UnitDocument],
        metadata: &'a Metadata,
    ) -> GenerationRequest<'a> {
        GenerationRequest {
            scope,
            custom_prompt: Some("simplify"),
            context: "### Version 1\nPrompt: (none)",
            current,
            metadata,
        }
    }

    fn choice(stem: &str) -> UnitDocument {
        UnitDocument::Choice(ChoiceQuestion {
            question: stem.to_string(),
            options: vec!["A. one".to_string(), "B. two".to_string()],
            answer: "A".to_string(),
            explanation: String::new(),
        })
    }

    fn listening() -> UnitDocument {
        UnitDocument::Listening(ListeningQuestion {
            script: "M: Coffee?\nW: Tea, please.".to_string(),
            question: "What does the woman want?".to_string(),
            options: vec!["A. Coffee".to_string(), "B. Tea".to_string()],
            answer: "B".to_string(),
            explanation: String::new(),
        })
    }

    const CHOICE_RESPONSE: &str = r#"{"questions": [
        {"question": "I ___ rice.", "options": ["A. like", "B. likes"], "answer": "A"},
        {"question": "She ___ tea.", "options": ["A. drink", "B. drinks"], "answer": "B"}
    ]}"#;

    const LISTENING_RESPONSE: &str = r#"{"questions": [
        {"script": "M: Hungry?\nW: Very.", "question": "Is she hungry?",
         "options": ["A. Yes", "B. No"], "answer": "A"}
    ]}"#;

    #[test]
    fn test_whole_artifact_one_call_per_kind() {
        let llm = MockProvider::default();
        llm.push_response(CHOICE_RESPONSE);
        llm.push_response(LISTENING_RESPONSE);
        let generator = LlmContentGenerator::new(llm.clone(), GeneratorConfig::default()).unwrap();

        let metadata = brief("choice:2,listening:1");
        let result = generator
            .generate(&request(RegenerationScope::WholeArtifact, &[], &metadata))
            .unwrap();

        let GeneratedContent::Whole(units) = result else {
            panic!("expected whole content");
        };
        let kinds: Vec<UnitKind> = units.iter().map(UnitDocument::kind).collect();
        assert_eq!(kinds, vec![UnitKind::Choice, UnitKind::Choice, UnitKind::Listening]);

        assert_eq!(llm.call_count(), 2);
        let prompts = llm.prompts();
        assert!(prompts[0].contains("multiple choice"));
        assert!(prompts[0].contains("simplify"));
        assert!(prompts[0].contains("### Version 1"));
        assert!(prompts[1].contains("listening"));
    }

    #[test]
    fn test_whole_artifact_reuses_current_layout() {
        let llm = MockProvider::new(r#"[{"question": "Q", "options": ["A. a", "B. b"], "answer": "A"}]"#);
        let generator = LlmContentGenerator::new(llm.clone(), GeneratorConfig::default()).unwrap();

        let metadata: Metadata = [("grade", "8"), ("topic", "Travel")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let current = vec![choice("old")];
        let result = generator
            .generate(&request(RegenerationScope::WholeArtifact, &current, &metadata))
            .unwrap();

        assert!(matches!(result, GeneratedContent::Whole(ref units) if units.len() == 1));
        assert!(llm.last_prompt().unwrap().starts_with("Generate 1 English"));
    }

    #[test]
    fn test_unit_scope_rewrites_target() {
        let llm = MockProvider::new(
            r#"{"question": "New stem", "options": ["A. x", "B. y"], "answer": "B"}"#,
        );
        let generator = LlmContentGenerator::new(llm.clone(), GeneratorConfig::default()).unwrap();

        let metadata = Metadata::new();
        let current = vec![listening(), choice("Old stem")];
        let result = generator
            .generate(&request(RegenerationScope::Unit(1), &current, &metadata))
            .unwrap();

        match result {
            GeneratedContent::Unit(UnitDocument::Choice(q)) => assert_eq!(q.question, "New stem"),
            other => panic!("expected a choice unit, got {:?}", other),
        }
        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("Old stem"));
        assert!(!prompt.contains("Coffee?"));
    }

    #[test]
    fn test_unit_scope_kind_mismatch_is_invalid() {
        let llm = MockProvider::new(r#"{"statement": "x", "answer": "True"}"#);
        let generator = LlmContentGenerator::new(llm, GeneratorConfig::default()).unwrap();

        let metadata = Metadata::new();
        let current = vec![choice("stem")];
        let result = generator.generate(&request(RegenerationScope::Unit(0), &current, &metadata));
        assert!(matches!(result, Err(GenerationError::InvalidContent(_))));
    }

    #[test]
    fn test_unit_scope_out_of_range() {
        let generator =
            LlmContentGenerator::new(MockProvider::default(), GeneratorConfig::default()).unwrap();
        let metadata = Metadata::new();
        let current = vec![choice("stem")];
        let result = generator.generate(&request(RegenerationScope::Unit(3), &current, &metadata));
        assert!(matches!(result, Err(GenerationError::InvalidContent(_))));
    }

    #[test]
    fn test_llm_failure_maps_to_failed() {
        let llm = MockProvider::default();
        llm.push_error("connection refused");
        let generator = LlmContentGenerator::new(llm, GeneratorConfig::default()).unwrap();

        let metadata = brief("choice:1");
        let result = generator.generate(&request(RegenerationScope::WholeArtifact, &[], &metadata));
        assert!(matches!(result, Err(GenerationError::Failed(m)) if m.contains("connection refused")));
    }

    #[test]
    fn test_garbage_response_is_invalid_content() {
        let llm = MockProvider::new("I cannot help with that.");
        let generator = LlmContentGenerator::new(llm, GeneratorConfig::default()).unwrap();

        let metadata = brief("essay:1");
        let result = generator.generate(&request(RegenerationScope::WholeArtifact, &[], &metadata));
        assert!(matches!(result, Err(GenerationError::InvalidContent(_))));
    }

    #[test]
    fn test_missing_brief_fails() {
        let generator =
            LlmContentGenerator::new(MockProvider::default(), GeneratorConfig::default()).unwrap();
        let metadata = Metadata::new();
        let result = generator.generate(&request(RegenerationScope::WholeArtifact, &[], &metadata));
        assert!(matches!(result, Err(GenerationError::Failed(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig {
            max_count_per_kind: 0,
            ..GeneratorConfig::default()
        };
        assert!(LlmContentGenerator::new(MockProvider::default(), config).is_err());
    }
}
