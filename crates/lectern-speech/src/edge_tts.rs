//! edge-tts command line synthesizer
//!
//! Each call runs `edge-tts --voice V --text T --write-media FILE` and
//! returns the written file path as the audio handle. Discarding a handle
//! deletes the file.

use lectern_domain::{AudioHandle, AudioSynthesizer, SynthesisError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default edge-tts executable name
pub const DEFAULT_BINARY: &str = "edge-tts";

/// Speech synthesis configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Directory audio files are written to
    pub output_dir: PathBuf,
    /// edge-tts executable
    pub binary: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("audio"),
            binary: DEFAULT_BINARY.to_string(),
        }
    }
}

/// Synthesizer backed by the `edge-tts` tool
///
/// Timeouts are left to the tool itself.
#[derive(Debug, Clone)]
pub struct EdgeTtsSynthesizer {
    config: SpeechConfig,
}

impl EdgeTtsSynthesizer {
    /// Create a synthesizer
    pub fn new(config: SpeechConfig) -> Self {
        Self { config }
    }

    /// Directory audio files are written to
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    fn next_path(&self) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}.mp3", Uuid::now_v7()))
    }
}

impl AudioSynthesizer for EdgeTtsSynthesizer {
    fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioHandle, SynthesisError> {
        if voice_id.trim().is_empty() {
            return Err(SynthesisError::UnknownVoice("empty voice id".to_string()));
        }
        fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            SynthesisError::Failed(format!(
                "cannot create {}: {}",
                self.config.output_dir.display(),
                e
            ))
        })?;

        let path = self.next_path();
        debug!(voice = voice_id, path = %path.display(), "Running edge-tts");

        let output = Command::new(&self.config.binary)
            .arg("--voice")
            .arg(voice_id)
            .arg("--text")
            .arg(text)
            .arg("--write-media")
            .arg(&path)
            .output()
            .map_err(|e| {
                SynthesisError::Failed(format!("failed to run {}: {}", self.config.binary, e))
            })?;

        let written = fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);
        if !output.status.success() || !written {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(voice = voice_id, status = %output.status, "edge-tts failed");
            self.discard(&AudioHandle(path.to_string_lossy().into_owned()));
            if stderr.contains("No audio was received") || stderr.contains("Invalid voice") {
                return Err(SynthesisError::UnknownVoice(voice_id.to_string()));
            }
            return Err(SynthesisError::Failed(format!(
                "edge-tts exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(AudioHandle(path.to_string_lossy().into_owned()))
    }

    fn discard(&self, handle: &AudioHandle) {
        match fs::remove_file(handle.as_str()) {
            Ok(()) => debug!(path = handle.as_str(), "Removed audio file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = handle.as_str(), error = %e, "Failed to remove audio file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpeechConfig::default();
        assert_eq!(config.binary, "edge-tts");
        assert_eq!(config.output_dir, PathBuf::from("audio"));
    }

    #[test]
    fn test_empty_voice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let synth = EdgeTtsSynthesizer::new(SpeechConfig {
            output_dir: dir.path().to_path_buf(),
            binary: DEFAULT_BINARY.to_string(),
        });
        assert!(matches!(
            synth.synthesize("hello", "  "),
            Err(SynthesisError::UnknownVoice(_))
        ));
    }

    #[test]
    fn test_missing_binary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let synth = EdgeTtsSynthesizer::new(SpeechConfig {
            output_dir: dir.path().join("out"),
            binary: "lectern-no-such-binary".to_string(),
        });
        let err = synth.synthesize("hello", "en-US-GuyNeural").unwrap_err();
        assert!(matches!(err, SynthesisError::Failed(_)));
        assert!(dir.path().join("out").is_dir());
    }

    #[test]
    fn test_discard_removes_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turn.mp3");
        fs::write(&path, b"ID3").unwrap();
        let handle = AudioHandle(path.to_string_lossy().into_owned());
        let synth = EdgeTtsSynthesizer::new(SpeechConfig {
            output_dir: dir.path().to_path_buf(),
            binary: DEFAULT_BINARY.to_string(),
        });

        synth.discard(&handle);
        assert!(!path.exists());
        synth.discard(&handle);
    }

    #[cfg(unix)]
    mod fake_binary {
        use super::*;
        use crate::synthesize_dialogue;
        use lectern_domain::VoiceMap;
        use std::os::unix::fs::PermissionsExt;

        /// Stand-in for edge-tts that writes a small file, or fails when the
        /// text contains `refuse`
        fn fake_edge_tts(dir: &Path, refuse: &str) -> PathBuf {
            let path = dir.join("fake-edge-tts");
            let script = format!(
                "#!/bin/sh\ncase \"$4\" in *{}*) echo 'refused' >&2; exit 1;; esac\nprintf 'ID3' > \"$6\"\n",
                refuse
            );
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn audio_files(dir: &Path) -> usize {
            match fs::read_dir(dir) {
                Ok(entries) => entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("mp3"))
                    .count(),
                Err(_) => 0,
            }
        }

        fn synthesizer(root: &Path, refuse: &str) -> EdgeTtsSynthesizer {
            EdgeTtsSynthesizer::new(SpeechConfig {
                output_dir: root.join("audio"),
                binary: fake_edge_tts(root, refuse).to_string_lossy().into_owned(),
            })
        }

        #[test]
        fn test_writes_one_file_per_call() {
            let root = tempfile::tempdir().unwrap();
            let synth = synthesizer(root.path(), "never-matches");

            let handle = synth.synthesize("Hello there.", "en-US-GuyNeural").unwrap();

            assert!(Path::new(handle.as_str()).is_file());
            assert_eq!(audio_files(synth.output_dir()), 1);
        }

        #[test]
        fn test_failed_dialogue_leaves_no_files() {
            let root = tempfile::tempdir().unwrap();
            let synth = synthesizer(root.path(), "examine");
            let voices = VoiceMap::new().with("M", "en-US-GuyNeural").with("W", "en-US-JennyNeural");

            let result = synthesize_dialogue(
                &synth,
                "M: Doctor, I have a terrible headache.\nW: Let me examine you.",
                &voices,
            );

            assert!(matches!(result, Err(SynthesisError::Failed(_))));
            assert_eq!(audio_files(synth.output_dir()), 0);
        }
    }

    #[test]
    fn test_paths_are_unique_mp3_files() {
        let synth = EdgeTtsSynthesizer::new(SpeechConfig::default());
        let a = synth.next_path();
        let b = synth.next_path();
        assert_ne!(a, b);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("mp3"));
    }
}
