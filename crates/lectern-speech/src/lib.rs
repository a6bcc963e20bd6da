//! Lectern Speech Layer
//!
//! Implementations of the `AudioSynthesizer` trait from `lectern-domain`.
//!
//! # Synthesizers
//!
//! - `MockSynthesizer`: Deterministic mock for testing
//! - `EdgeTtsSynthesizer`: Runs the `edge-tts` command line tool
//!
//! Dialogue scripts are synthesized one turn at a time with
//! [`synthesize_dialogue`], which picks each speaker's voice from a
//! `VoiceMap`. Audio from a cycle that fails is removed with
//! [`discard_all`].
//!
//! # Examples
//!
//! ```
//! use lectern_speech::MockSynthesizer;
//! use lectern_domain::AudioSynthesizer;
//!
//! let synth = MockSynthesizer::new();
//! let handle = synth.synthesize("Hello there.", "en-US-GuyNeural").unwrap();
//! assert_eq!(handle.as_str(), "mock-audio-1");
//! ```

#![warn(missing_docs)]

pub mod dialogue;
pub mod edge_tts;

use lectern_domain::{AudioHandle, AudioSynthesizer, SynthesisError};
use std::sync::{Arc, Mutex, PoisonError};

pub use dialogue::{discard_all, synthesize_dialogue};
pub use edge_tts::{EdgeTtsSynthesizer, SpeechConfig};

/// One recorded synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisCall {
    /// Text passed in
    pub text: String,
    /// Voice passed in
    pub voice_id: String,
}

/// Mock synthesizer for deterministic testing
///
/// Records every call and returns sequential handles `mock-audio-N`. Can be
/// configured to fail whenever the text contains a marker. Discarded handles
/// are recorded too.
///
/// Clones share their call and discard logs.
#[derive(Debug, Clone, Default)]
pub struct MockSynthesizer {
    calls: Arc<Mutex<Vec<SynthesisCall>>>,
    discarded: Arc<Mutex<Vec<AudioHandle>>>,
    fail_marker: Option<String>,
}

impl MockSynthesizer {
    /// Create a mock that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails for any text containing `marker`
    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self {
            fail_marker: Some(marker.into()),
            ..Self::default()
        }
    }

    /// Create a mock that fails on every call
    pub fn always_failing() -> Self {
        Self::failing_on("")
    }

    /// Calls made so far
    pub fn calls(&self) -> Vec<SynthesisCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Handles discarded so far, in order
    pub fn discarded(&self) -> Vec<AudioHandle> {
        self.discarded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AudioSynthesizer for MockSynthesizer {
    fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioHandle, SynthesisError> {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls.push(SynthesisCall {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
        });

        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(SynthesisError::Failed(format!(
                    "mock failure for voice {}",
                    voice_id
                )));
            }
        }

        Ok(AudioHandle(format!("mock-audio-{}", calls.len())))
    }

    fn discard(&self, handle: &AudioHandle) {
        self.discarded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let synth = MockSynthesizer::new();
        synth.synthesize("one", "v1").unwrap();
        let handle = synth.synthesize("two", "v2").unwrap();

        assert_eq!(handle, AudioHandle("mock-audio-2".to_string()));
        assert_eq!(synth.call_count(), 2);
        assert_eq!(
            synth.calls()[1],
            SynthesisCall {
                text: "two".to_string(),
                voice_id: "v2".to_string()
            }
        );
    }

    #[test]
    fn test_mock_failure_marker() {
        let synth = MockSynthesizer::failing_on("BOOM");
        assert!(synth.synthesize("fine", "v").is_ok());
        assert!(matches!(
            synth.synthesize("this goes BOOM", "v"),
            Err(SynthesisError::Failed(_))
        ));
    }

    #[test]
    fn test_clones_share_log() {
        let synth = MockSynthesizer::new();
        let clone = synth.clone();
        let handle = clone.synthesize("x", "v").unwrap();
        clone.discard(&handle);
        assert_eq!(synth.call_count(), 1);
        assert_eq!(synth.discarded(), vec![handle]);
    }
}
