//! Dialogue script parsing
//!
//! Scripts are written one turn per line as `Speaker: text`. A line without a
//! speaker label continues the previous turn; text before the first label is
//! attributed to [`NARRATOR`].

use serde::Serialize;

/// Role label for text spoken outside any labelled turn
pub const NARRATOR: &str = "Narrator";

const MAX_LABEL_LEN: usize = 12;

/// One turn of a dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueTurn {
    /// Speaker label as written (`M`, `Woman`, `Tom`, ...)
    pub speaker: String,
    /// Spoken text with continuation lines joined by spaces
    pub text: String,
}

/// Split a script into speaker turns
///
/// # Examples
///
/// ```
/// use lectern_voice::parse_dialogue;
///
/// let turns = parse_dialogue("M: Hi, how are you?\nW: Fine, thanks.\nAnd you?");
/// assert_eq!(turns.len(), 2);
/// assert_eq!(turns[1].speaker, "W");
/// assert_eq!(turns[1].text, "Fine, thanks. And you?");
/// ```
pub fn parse_dialogue(script: &str) -> Vec<DialogueTurn> {
    let mut turns: Vec<DialogueTurn> = Vec::new();

    for line in script.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match split_label(line) {
            Some((speaker, text)) => turns.push(DialogueTurn {
                speaker: speaker.to_string(),
                text: text.to_string(),
            }),
            None => match turns.last_mut() {
                Some(turn) => {
                    turn.text.push(' ');
                    turn.text.push_str(line);
                }
                None => turns.push(DialogueTurn {
                    speaker: NARRATOR.to_string(),
                    text: line.to_string(),
                }),
            },
        }
    }

    turns
}

/// Distinct speakers in order of first appearance
pub fn speakers(turns: &[DialogueTurn]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for turn in turns {
        if !seen.contains(&turn.speaker.as_str()) {
            seen.push(&turn.speaker);
        }
    }
    seen
}

/// `Label: text` where the label is one capitalised word
fn split_label(line: &str) -> Option<(&str, &str)> {
    let (label, text) = line.split_once(':')?;
    let text = text.trim();
    if text.is_empty() || label.is_empty() || label.len() > MAX_LABEL_LEN {
        return None;
    }
    let mut chars = label.chars();
    let first = chars.next()?;
    if !first.is_ascii_uppercase() || !chars.all(|c| c.is_ascii_alphabetic() || c == '.') {
        return None;
    }
    Some((label.trim_end_matches('.'), text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labelled_turns() {
        let turns = parse_dialogue("Man: Where is the library?\nWoman: Next to the bank.");
        assert_eq!(
            turns,
            vec![
                DialogueTurn {
                    speaker: "Man".to_string(),
                    text: "Where is the library?".to_string()
                },
                DialogueTurn {
                    speaker: "Woman".to_string(),
                    text: "Next to the bank.".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_leading_text_is_narrated() {
        let turns = parse_dialogue("Listen to the dialogue.\nA: Hello.\nB: Hi.");
        assert_eq!(turns[0].speaker, NARRATOR);
        assert_eq!(speakers(&turns), vec![NARRATOR, "A", "B"]);
    }

    #[test]
    fn test_colon_inside_sentence_is_not_a_label() {
        let turns = parse_dialogue("M: The time is 10:30 now.\nthe meeting starts at: noon");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].text, "The time is 10:30 now. the meeting starts at: noon");
    }

    #[test]
    fn test_mr_label_keeps_name() {
        let turns = parse_dialogue("Mr.: Sit down, please.");
        assert_eq!(turns[0].speaker, "Mr");
    }

    #[test]
    fn test_empty_script() {
        assert!(parse_dialogue("  \n\n").is_empty());
    }
}
