//! Scope of a regeneration request

use std::fmt;

/// What part of an artifact a regeneration replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegenerationScope {
    /// Replace the whole content
    WholeArtifact,

    /// Replace only the unit at this position (0-based)
    Unit(usize),
}

impl RegenerationScope {
    /// Targeted unit index, if this is a unit scope
    pub fn unit_index(&self) -> Option<usize> {
        match self {
            RegenerationScope::WholeArtifact => None,
            RegenerationScope::Unit(index) => Some(*index),
        }
    }
}

impl fmt::Display for RegenerationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegenerationScope::WholeArtifact => f.write_str("whole artifact"),
            RegenerationScope::Unit(index) => write!(f, "unit {}", index),
        }
    }
}
