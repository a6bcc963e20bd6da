//! Turn-by-turn synthesis of dialogue scripts

use lectern_domain::{AudioHandle, AudioSynthesizer, SynthesisError, VoiceMap};
use lectern_voice::{parse_dialogue, DialogueTurn, NARRATOR};
use tracing::debug;

/// Synthesize every turn of `script` with the speaker's voice
///
/// Voice lookup order for a turn: the speaker's own role, then `Narrator`,
/// then the first voice in the map. The first failing turn aborts the whole
/// script and discards the turns already synthesized.
pub fn synthesize_dialogue<A: AudioSynthesizer + ?Sized>(
    synthesizer: &A,
    script: &str,
    voices: &VoiceMap,
) -> Result<Vec<AudioHandle>, SynthesisError> {
    let turns = parse_dialogue(script);
    let mut handles = Vec::with_capacity(turns.len());

    for turn in &turns {
        match synthesize_turn(synthesizer, turn, voices) {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                discard_all(synthesizer, &handles);
                return Err(e);
            }
        }
    }

    Ok(handles)
}

/// Discard every handle, in order
pub fn discard_all<A: AudioSynthesizer + ?Sized>(synthesizer: &A, handles: &[AudioHandle]) {
    for handle in handles {
        synthesizer.discard(handle);
    }
}

fn synthesize_turn<A: AudioSynthesizer + ?Sized>(
    synthesizer: &A,
    turn: &DialogueTurn,
    voices: &VoiceMap,
) -> Result<AudioHandle, SynthesisError> {
    let voice = voices
        .voice_for(&turn.speaker)
        .or_else(|| voices.voice_for(NARRATOR))
        .or_else(|| voices.iter().next().map(|(_, voice)| voice))
        .ok_or_else(|| {
            SynthesisError::UnknownVoice(format!("no voice for speaker {}", turn.speaker))
        })?;

    debug!(speaker = %turn.speaker, voice, "Synthesizing dialogue turn");
    synthesizer.synthesize(&turn.text, voice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockSynthesizer;

    fn voices() -> VoiceMap {
        VoiceMap::new()
            .with("M", "male-voice")
            .with("W", "female-voice")
            .with(NARRATOR, "narrator-voice")
    }

    #[test]
    fn test_each_turn_uses_speaker_voice() {
        let synth = MockSynthesizer::new();
        let handles =
            synthesize_dialogue(&synth, "M: Hello.\nW: Hi!\nHow are you?", &voices()).unwrap();

        assert_eq!(handles.len(), 2);
        let calls = synth.calls();
        assert_eq!(calls[0].voice_id, "male-voice");
        assert_eq!(calls[1].voice_id, "female-voice");
        assert_eq!(calls[1].text, "Hi! How are you?");
    }

    #[test]
    fn test_unknown_speaker_falls_back_to_narrator() {
        let synth = MockSynthesizer::new();
        synthesize_dialogue(&synth, "Tom: Good morning.", &voices()).unwrap();
        assert_eq!(synth.calls()[0].voice_id, "narrator-voice");
    }

    #[test]
    fn test_empty_voice_map() {
        let synth = MockSynthesizer::new();
        let result = synthesize_dialogue(&synth, "M: Hello.", &VoiceMap::new());
        assert!(matches!(result, Err(SynthesisError::UnknownVoice(_))));
        assert_eq!(synth.call_count(), 0);
    }

    #[test]
    fn test_failure_aborts_script() {
        let synth = MockSynthesizer::failing_on("fail");
        let result = synthesize_dialogue(&synth, "M: ok\nW: fail here\nM: never", &voices());
        assert!(result.is_err());
        assert_eq!(synth.call_count(), 2);
    }

    #[test]
    fn test_failure_discards_earlier_turns() {
        let synth = MockSynthesizer::failing_on("third");
        let result = synthesize_dialogue(
            &synth,
            "M: first\nW: second\nM: third\nW: fourth",
            &voices(),
        );

        assert!(matches!(result, Err(SynthesisError::Failed(_))));
        assert_eq!(
            synth.discarded(),
            vec![
                AudioHandle("mock-audio-1".to_string()),
                AudioHandle("mock-audio-2".to_string())
            ]
        );
    }

    #[test]
    fn test_success_discards_nothing() {
        let synth = MockSynthesizer::new();
        synthesize_dialogue(&synth, "M: Hello.\nW: Hi.", &voices()).unwrap();
        assert!(synth.discarded().is_empty());
    }
}
