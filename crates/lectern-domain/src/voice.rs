//! Voice map - speaker role label to text-to-speech voice identifier

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from speaker role label (e.g. `M`, `W`, `Narrator`) to voice id
///
/// Ordered by role so that rendering and serialization are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceMap(BTreeMap<String, String>);

impl VoiceMap {
    /// Create an empty voice map
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a voice to a role, replacing any previous assignment
    pub fn insert(&mut self, role: impl Into<String>, voice_id: impl Into<String>) {
        self.0.insert(role.into(), voice_id.into());
    }

    /// Builder-style [`VoiceMap::insert`]
    pub fn with(mut self, role: impl Into<String>, voice_id: impl Into<String>) -> Self {
        self.insert(role, voice_id);
        self
    }

    /// Voice assigned to a role
    pub fn voice_for(&self, role: &str) -> Option<&str> {
        self.0.get(role).map(String::as_str)
    }

    /// Whether the role has a voice
    pub fn contains_role(&self, role: &str) -> bool {
        self.0.contains_key(role)
    }

    /// Iterate over `(role, voice)` pairs in role order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(r, v)| (r.as_str(), v.as_str()))
    }

    /// Number of roles
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a `ROLE=VOICE` pair
    ///
    /// # Examples
    ///
    /// ```
    /// use lectern_domain::VoiceMap;
    ///
    /// let (role, voice) = VoiceMap::parse_pair("M=en-US-GuyNeural").unwrap();
    /// assert_eq!(role, "M");
    /// assert_eq!(voice, "en-US-GuyNeural");
    /// ```
    pub fn parse_pair(pair: &str) -> Result<(String, String), String> {
        let (role, voice) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected ROLE=VOICE, got '{}'", pair))?;
        let (role, voice) = (role.trim(), voice.trim());
        if role.is_empty() || voice.is_empty() {
            return Err(format!("Empty role or voice in '{}'", pair));
        }
        Ok((role.to_string(), voice.to_string()))
    }
}

impl FromIterator<(String, String)> for VoiceMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for VoiceMap {
    /// Renders as `M=voice, W=voice`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (role, voice) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", role, voice)?;
            first = false;
        }
        Ok(())
    }
}
