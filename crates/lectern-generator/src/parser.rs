//! Parse LLM output into unit documents

use crate::error::GeneratorError;
use lectern_domain::{UnitDocument, UnitKind};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Parse an LLM response into at most `count` units of `kind`
///
/// Accepts `{"questions": [...]}`, `{"passages": [...]}`, a bare array or a
/// single object. Any item that fails to deserialize or validate fails the
/// whole response, so no partial content is ever returned.
pub fn parse_units(
    response: &str,
    kind: UnitKind,
    count: usize,
) -> Result<Vec<UnitDocument>, GeneratorError> {
    let json_str = extract_json(response)?;
    let json: Value = serde_json::from_str(&json_str)?;

    let items = match json {
        Value::Array(items) => items,
        Value::Object(mut obj) => match take_list(&mut obj) {
            Some(items) => items,
            None => vec![Value::Object(obj)],
        },
        _ => {
            return Err(GeneratorError::InvalidFormat(
                "expected a JSON object or array".to_string(),
            ))
        }
    };

    if items.is_empty() {
        return Err(GeneratorError::InvalidFormat(format!(
            "response contained no {} units",
            kind
        )));
    }
    if items.len() > count {
        warn!(
            kind = %kind,
            requested = count,
            received = items.len(),
            "LLM returned extra units, truncating"
        );
    }

    let mut units = Vec::with_capacity(count.min(items.len()));
    for (idx, item) in items.into_iter().take(count).enumerate() {
        let unit = parse_unit_value(item, kind)
            .map_err(|e| GeneratorError::InvalidFormat(format!("{} unit {}: {}", kind, idx, e)))?;
        units.push(unit);
    }

    debug!(kind = %kind, units = units.len(), "Parsed LLM response");
    Ok(units)
}

/// Parse a response that must hold exactly one unit of `kind`
pub fn parse_single_unit(response: &str, kind: UnitKind) -> Result<UnitDocument, GeneratorError> {
    let mut units = parse_units(response, kind, 1)?;
    units
        .pop()
        .ok_or_else(|| GeneratorError::InvalidFormat("response contained no unit".to_string()))
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, GeneratorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(GeneratorError::InvalidFormat("Empty code block".to_string()));
        }

        // Skip the opening fence, and the closing one when present
        let end = if lines[lines.len() - 1].trim().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn take_list(obj: &mut Map<String, Value>) -> Option<Vec<Value>> {
    for key in ["questions", "passages", "units"] {
        // A reading passage carries its own "questions"; only unwrap a list
        // when the object is nothing but the wrapper.
        if obj.len() == 1 {
            if let Some(Value::Array(_)) = obj.get(key) {
                if let Some(Value::Array(items)) = obj.remove(key) {
                    return Some(items);
                }
            }
        }
    }
    None
}

fn parse_unit_value(item: Value, kind: UnitKind) -> Result<UnitDocument, String> {
    let Value::Object(mut obj) = item else {
        return Err("unit is not a JSON object".to_string());
    };

    match obj.get("type").and_then(Value::as_str) {
        Some(tag) if UnitKind::parse(tag) != Some(kind) => {
            return Err(format!("expected type {}, got '{}'", kind, tag));
        }
        _ => {}
    }
    obj.insert("type".to_string(), Value::String(kind.as_str().to_string()));
    normalize(&mut obj, kind);

    let unit: UnitDocument = serde_json::from_value(Value::Object(obj)).map_err(|e| e.to_string())?;
    unit.validate()?;
    Ok(unit)
}

/// Coerce the loose shapes models commonly produce
fn normalize(obj: &mut Map<String, Value>, kind: UnitKind) {
    match kind {
        UnitKind::TrueFalse => {
            if let Some(Value::Bool(b)) = obj.get("answer") {
                let answer = if *b { "True" } else { "False" };
                obj.insert("answer".to_string(), Value::String(answer.to_string()));
            }
        }
        UnitKind::Essay => {
            if let Some(Value::Number(n)) = obj.get("word_count") {
                let words = format!("{} words", n);
                obj.insert("word_count".to_string(), Value::String(words));
            }
            if let Some(Value::String(s)) = obj.get("grading_points") {
                let points: Vec<Value> = s
                    .split(['\n', ';'])
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(|p| Value::String(p.to_string()))
                    .collect();
                obj.insert("grading_points".to_string(), Value::Array(points));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrapped_questions() {
        let response = r#"{"questions": [
            {"question": "Q1", "options": ["A. x", "B. y"], "answer": "A", "explanation": "e"},
            {"question": "Q2", "options": ["A. x", "B. y"], "answer": "B"}
        ]}"#;

        let units = parse_units(response, UnitKind::Choice, 5).unwrap();
        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|u| u.kind() == UnitKind::Choice));
    }

    #[test]
    fn test_parse_markdown_wrapped() {
        let response = "```json\n[{\"sentence\": \"I ___ tea.\", \"answer\": \"like\"}]\n```";
        let units = parse_units(response, UnitKind::FillBlank, 1).unwrap();
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn test_single_reading_passage_keeps_nested_questions() {
        let response = r#"{
            "title": "Pandas",
            "passage": "Pandas live in China.",
            "questions": [
                {"question": "Where?", "options": ["A. China", "B. Peru"], "answer": "A"}
            ]
        }"#;
        let unit = parse_single_unit(response, UnitKind::Reading).unwrap();
        match unit {
            UnitDocument::Reading(p) => assert_eq!(p.questions.len(), 1),
            other => panic!("expected reading, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_units_are_truncated() {
        let response = r#"[
            {"statement": "a", "answer": true},
            {"statement": "b", "answer": false},
            {"statement": "c", "answer": "True"}
        ]"#;
        let units = parse_units(response, UnitKind::TrueFalse, 2).unwrap();
        assert_eq!(units.len(), 2);
        match &units[0] {
            UnitDocument::TrueFalse(q) => assert_eq!(q.answer, "True"),
            other => panic!("expected true_false, got {:?}", other),
        }
    }

    #[test]
    fn test_essay_normalisation() {
        let response = r#"{"title": "My Day", "requirements": "Describe your day.",
            "word_count": 100, "grading_points": "Content; Grammar"}"#;
        match parse_single_unit(response, UnitKind::Essay).unwrap() {
            UnitDocument::Essay(e) => {
                assert_eq!(e.word_count, "100 words");
                assert_eq!(e.grading_points, vec!["Content", "Grammar"]);
            }
            other => panic!("expected essay, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_item_fails_whole_response() {
        let response = r#"[
            {"question": "ok", "options": ["A. x", "B. y"], "answer": "A"},
            {"question": "", "options": ["A. x", "B. y"], "answer": "A"}
        ]"#;
        assert!(matches!(
            parse_units(response, UnitKind::Choice, 2),
            Err(GeneratorError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_mismatched_type_tag_is_rejected() {
        let response = r#"{"type": "essay", "statement": "x", "answer": "True"}"#;
        assert!(parse_single_unit(response, UnitKind::TrueFalse).is_err());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_units("not json", UnitKind::Choice, 1),
            Err(GeneratorError::JsonParse(_))
        ));
        assert!(matches!(
            parse_units("[]", UnitKind::Choice, 1),
            Err(GeneratorError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_units("42", UnitKind::Choice, 1),
            Err(GeneratorError::InvalidFormat(_))
        ));
        assert!(extract_json("```").is_err());
    }
}
