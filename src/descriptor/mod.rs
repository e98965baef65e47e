//! Raw packaging descriptor (pack.toml)
//!
//! Defines the declarative descriptor for the Android packaging target.
//! Fields that are omitted are deferred to the framework context, which
//! supplies the scaffolding's current values during resolution.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::compat::JavaVersion;
use crate::coordinate::Coordinate;

/// Default descriptor location relative to the project root
pub const DEFAULT_DESCRIPTOR_PATH: &str = "pack.toml";

/// Plugin every packaging descriptor must declare
pub const ANDROID_APPLICATION_PLUGIN: &str = "com.android.application";

/// Error types for descriptor operations
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Failed to read descriptor file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Raw packaging descriptor as written in pack.toml
///
/// Every `Option` field is deferred to the framework context when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDescriptor {
    /// Build plugins to apply (must include the Android application plugin)
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Application identifier in reverse-domain form (e.g., "com.daryan.prayer")
    pub application_id: Option<String>,

    /// Resource namespace; falls back to the application identifier
    pub namespace: Option<String>,

    /// Minimum supported SDK version
    pub min_sdk: Option<u32>,

    /// Target SDK version
    pub target_sdk: Option<u32>,

    /// SDK version to compile against
    pub compile_sdk: Option<u32>,

    /// NDK version pin (optional even after resolution)
    pub ndk_version: Option<String>,

    /// Monotonic version code
    pub version_code: Option<u32>,

    /// Human-readable version name
    pub version_name: Option<String>,

    /// Java source compatibility level
    pub source_compatibility: Option<JavaVersion>,

    /// Java target compatibility level
    pub target_compatibility: Option<JavaVersion>,

    /// Kotlin JVM bytecode target
    pub kotlin_jvm_target: Option<JavaVersion>,

    /// Core-library desugaring toggle
    #[serde(default)]
    pub desugaring: bool,

    /// Name of the signing configuration used for release builds
    pub release_signing: Option<String>,

    /// Build-time dependency coordinates
    #[serde(default)]
    pub dependencies: Vec<Coordinate>,

    /// Path to the application source root, relative to the descriptor
    pub source_root: Option<PathBuf>,
}

impl RawDescriptor {
    /// Load and parse a descriptor from a TOML file
    ///
    /// Returns the descriptor together with the SHA-256 hex digest of the
    /// raw file bytes for provenance tracking.
    pub fn from_file(path: &Path) -> Result<(Self, String), DescriptorError> {
        let bytes = fs::read(path)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| DescriptorError::Validation(format!("Invalid UTF-8: {}", e)))?;

        let descriptor = Self::from_toml(&contents)?;
        Ok((descriptor, digest))
    }

    /// Parse a descriptor from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, DescriptorError> {
        let descriptor: RawDescriptor = toml::from_str(s)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Validate the descriptor
    ///
    /// These rules apply to whatever the descriptor states literally;
    /// deferred fields are not checked here.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        // Rule: the Android application plugin must be declared
        if self.plugins.is_empty() {
            return Err(DescriptorError::Validation(
                "At least one plugin must be declared in 'plugins'".to_string(),
            ));
        }
        if !self.plugins.iter().any(|p| p == ANDROID_APPLICATION_PLUGIN) {
            return Err(DescriptorError::Validation(format!(
                "'plugins' must include '{}'",
                ANDROID_APPLICATION_PLUGIN
            )));
        }

        // Rule: application id and namespace are reverse-domain identifiers
        if let Some(ref id) = self.application_id {
            validate_application_id("application_id", id)?;
        }
        if let Some(ref ns) = self.namespace {
            validate_application_id("namespace", ns)?;
        }

        // Rule: version code is positive
        if self.version_code == Some(0) {
            return Err(DescriptorError::Validation(
                "'version_code' must be a positive integer".to_string(),
            ));
        }

        // Rule: version name is non-empty when stated
        if self.version_name.as_deref() == Some("") {
            return Err(DescriptorError::Validation(
                "'version_name' must not be empty".to_string(),
            ));
        }

        // Rule: NDK pin is non-empty when stated
        if self.ndk_version.as_deref() == Some("") {
            return Err(DescriptorError::Validation(
                "'ndk_version' must not be empty".to_string(),
            ));
        }

        // Rule: signing reference is non-empty when stated
        if self.release_signing.as_deref() == Some("") {
            return Err(DescriptorError::Validation(
                "'release_signing' must not be empty".to_string(),
            ));
        }

        // Rule: source root stays relative to the descriptor
        if let Some(ref root) = self.source_root {
            if root.is_absolute() {
                return Err(DescriptorError::Validation(format!(
                    "'source_root' must be a relative path, got '{}'",
                    root.display()
                )));
            }
        }

        Ok(())
    }
}

/// Check reverse-domain format: two or more dot-separated segments, each
/// starting with a letter and continuing with letters, digits, or
/// underscores.
fn validate_application_id(field: &str, value: &str) -> Result<(), DescriptorError> {
    // Unwrap is safe: the pattern is a compile-time constant.
    let re = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap();
    if !re.is_match(value) {
        return Err(DescriptorError::Validation(format!(
            "'{}' must be a reverse-domain identifier (e.g., \"com.example.app\"), got '{}'",
            field, value
        )));
    }
    Ok(())
}
