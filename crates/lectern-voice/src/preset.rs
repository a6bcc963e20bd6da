//! Scenario presets
//!
//! Ordered table: earlier presets win ties. The last entry is the fallback
//! and is never matched by keyword.

/// A dialogue scenario with its keywords and voices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioPreset {
    /// Preset name
    pub name: &'static str,
    /// Lowercase keywords, matched as substrings
    pub keywords: &'static [&'static str],
    /// Voice for male speakers
    pub male_voice: &'static str,
    /// Voice for female speakers
    pub female_voice: &'static str,
    /// Voice for narration
    pub neutral_voice: &'static str,
}

/// Name of the fallback preset
pub const DEFAULT_PRESET: &str = "default";

/// All presets, in priority order
pub const PRESETS: &[ScenarioPreset] = &[
    ScenarioPreset {
        name: "school",
        keywords: &[
            "class", "teacher", "student", "homework", "school", "exam", "lesson", "mr.", "ms.",
            "professor", "learn",
        ],
        male_voice: "en-US-EricNeural",
        female_voice: "en-US-MichelleNeural",
        neutral_voice: "en-US-AriaNeural",
    },
    ScenarioPreset {
        name: "medical",
        keywords: &[
            "doctor", "patient", "medicine", "hospital", "pain", "symptom", "fever", "headache",
            "examine", "nurse",
        ],
        male_voice: "en-US-BrianNeural",
        female_voice: "en-US-JennyNeural",
        neutral_voice: "en-US-ChristopherNeural",
    },
    ScenarioPreset {
        name: "shopping",
        keywords: &[
            "buy", "sell", "price", "shop", "store", "how much", "dollars", "cashier",
        ],
        male_voice: "en-US-GuyNeural",
        female_voice: "en-US-JennyNeural",
        neutral_voice: "en-US-AriaNeural",
    },
    ScenarioPreset {
        name: "family",
        keywords: &["mom", "dad", "parent", "child", "son", "daughter", "home"],
        male_voice: "en-US-ChristopherNeural",
        female_voice: "en-US-JennyNeural",
        neutral_voice: "en-US-AriaNeural",
    },
    ScenarioPreset {
        name: "restaurant",
        keywords: &["order", "menu", "waiter", "waitress", "food", "drink", "table"],
        male_voice: "en-US-GuyNeural",
        female_voice: "en-US-JennyNeural",
        neutral_voice: "en-US-AriaNeural",
    },
    ScenarioPreset {
        name: "business",
        keywords: &[
            "meeting", "office", "manager", "client", "report", "deadline", "contract",
            "interview",
        ],
        male_voice: "en-US-BrianNeural",
        female_voice: "en-US-MichelleNeural",
        neutral_voice: "en-US-AriaNeural",
    },
    ScenarioPreset {
        name: DEFAULT_PRESET,
        keywords: &[],
        male_voice: "en-US-ChristopherNeural",
        female_voice: "en-US-JennyNeural",
        neutral_voice: "en-US-AriaNeural",
    },
];

/// Look up a preset by name
pub fn preset(name: &str) -> Option<&'static ScenarioPreset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// The fallback preset
pub fn default_preset() -> &'static ScenarioPreset {
    &PRESETS[PRESETS.len() - 1]
}

/// Speaker gender inferred from its label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerRole {
    /// Male label (`M`, `Man`, `Boy`, ...)
    Male,
    /// Female label (`W`, `Woman`, `Girl`, ...)
    Female,
    /// Narration
    Narrator,
    /// Anything else (`A`, `B`, names)
    Unknown,
}

const MALE_LABELS: &[&str] = &[
    "m", "man", "boy", "father", "dad", "son", "husband", "mr", "he", "grandpa", "brother",
];
const FEMALE_LABELS: &[&str] = &[
    "w", "f", "woman", "girl", "mother", "mom", "daughter", "wife", "ms", "mrs", "she", "grandma",
    "sister",
];

/// Classify a speaker label
pub fn classify_speaker(label: &str) -> SpeakerRole {
    let lower = label.trim().trim_end_matches('.').to_lowercase();
    if lower == crate::dialogue::NARRATOR.to_lowercase() {
        SpeakerRole::Narrator
    } else if MALE_LABELS.contains(&lower.as_str()) {
        SpeakerRole::Male
    } else if FEMALE_LABELS.contains(&lower.as_str()) {
        SpeakerRole::Female
    } else {
        SpeakerRole::Unknown
    }
}

impl ScenarioPreset {
    /// Whether this is the fallback preset
    pub fn is_fallback(&self) -> bool {
        self.name == DEFAULT_PRESET
    }

    /// Keywords present in already-lowercased text
    pub fn matched_keywords(&self, lowercase_text: &str) -> Vec<&'static str> {
        self.keywords
            .iter()
            .copied()
            .filter(|kw| lowercase_text.contains(kw))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_last() {
        assert!(default_preset().is_fallback());
        assert!(default_preset().keywords.is_empty());
        assert_eq!(PRESETS.iter().filter(|p| p.is_fallback()).count(), 1);
    }

    #[test]
    fn test_every_preset_has_distinct_gendered_voices() {
        for p in PRESETS {
            assert_ne!(p.male_voice, p.female_voice, "preset {}", p.name);
        }
    }

    #[test]
    fn test_classify_speaker() {
        assert_eq!(classify_speaker("M"), SpeakerRole::Male);
        assert_eq!(classify_speaker("Woman"), SpeakerRole::Female);
        assert_eq!(classify_speaker("Mrs."), SpeakerRole::Female);
        assert_eq!(classify_speaker("Narrator"), SpeakerRole::Narrator);
        assert_eq!(classify_speaker("Tom"), SpeakerRole::Unknown);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(preset("medical").map(|p| p.name), Some("medical"));
        assert!(preset("opera").is_none());
    }
}
