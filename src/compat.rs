//! Java/Kotlin language compatibility levels
//!
//! The descriptor pins Java source/target compatibility and the Kotlin
//! JVM target to one of the language version constants the Android
//! toolchain accepts.

use serde::{Deserialize, Serialize};

/// Java language version constant
///
/// Variants are ordered, so `target <= source` style checks can use the
/// derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JavaVersion {
    /// Java 8 (written "8" or "1.8")
    #[serde(rename = "8", alias = "1.8")]
    Java8,
    /// Java 11
    #[serde(rename = "11")]
    Java11,
    /// Java 17
    #[serde(rename = "17")]
    Java17,
    /// Java 21
    #[serde(rename = "21")]
    Java21,
}

impl JavaVersion {
    /// Returns the string form used in descriptors and output
    pub fn as_str(&self) -> &'static str {
        match self {
            JavaVersion::Java8 => "8",
            JavaVersion::Java11 => "11",
            JavaVersion::Java17 => "17",
            JavaVersion::Java21 => "21",
        }
    }
}

impl std::fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JavaVersion {
    type Err = UnknownJavaVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "8" | "1.8" => Ok(JavaVersion::Java8),
            "11" => Ok(JavaVersion::Java11),
            "17" => Ok(JavaVersion::Java17),
            "21" => Ok(JavaVersion::Java21),
            _ => Err(UnknownJavaVersion(s.to_string())),
        }
    }
}

/// Error for unrecognized language version strings
#[derive(Debug, thiserror::Error)]
#[error("Unknown Java language version: '{0}' (expected 8, 11, 17, or 21)")]
pub struct UnknownJavaVersion(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ordering() {
        assert!(JavaVersion::Java8 < JavaVersion::Java11);
        assert!(JavaVersion::Java11 < JavaVersion::Java17);
        assert!(JavaVersion::Java17 < JavaVersion::Java21);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(JavaVersion::from_str("11").unwrap(), JavaVersion::Java11);
        assert_eq!(JavaVersion::from_str("1.8").unwrap(), JavaVersion::Java8);
        assert!(JavaVersion::from_str("12").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for v in [
            JavaVersion::Java8,
            JavaVersion::Java11,
            JavaVersion::Java17,
            JavaVersion::Java21,
        ] {
            assert_eq!(JavaVersion::from_str(v.as_str()).unwrap(), v);
        }
    }

    #[test]
    fn test_serde_string_form() {
        let json = serde_json::to_string(&JavaVersion::Java11).unwrap();
        assert_eq!(json, r#""11""#);

        let parsed: JavaVersion = serde_json::from_str(r#""1.8""#).unwrap();
        assert_eq!(parsed, JavaVersion::Java8);
    }
}
