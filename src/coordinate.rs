//! Dependency coordinates
//!
//! A coordinate names one build-time dependency in
//! `group:artifact:version` form, e.g.
//! `com.android.tools:desugar_jdk_libs:2.0.3`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A parsed `group:artifact:version` coordinate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    /// Group identifier (e.g., "com.android.tools")
    pub group: String,

    /// Artifact name (e.g., "desugar_jdk_libs")
    pub artifact: String,

    /// Version string (e.g., "2.0.3")
    pub version: String,
}

/// Error for malformed coordinate strings
#[derive(Debug, thiserror::Error)]
#[error("Invalid coordinate '{0}': expected 'group:artifact:version' with three non-empty segments")]
pub struct InvalidCoordinate(pub String);

impl Coordinate {
    /// The artifact that core-library desugaring requires on the
    /// dependency list
    pub const DESUGAR_ARTIFACT: &'static str = "desugar_jdk_libs";

    /// Whether this coordinate provides the desugaring runtime
    pub fn is_desugar_runtime(&self) -> bool {
        self.artifact == Self::DESUGAR_ARTIFACT
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = InvalidCoordinate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(InvalidCoordinate(s.to_string()));
        }
        Ok(Coordinate {
            group: parts[0].to_string(),
            artifact: parts[1].to_string(),
            version: parts[2].to_string(),
        })
    }
}

// Coordinates serialize in their string form so resolved output stays
// readable as "group:artifact:version".
impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
