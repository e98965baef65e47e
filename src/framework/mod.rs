//! Framework defaults context
//!
//! The external defaults provider the descriptor defers to. The
//! scaffolding ships a set of stock pins (SDK levels, version defaults,
//! source root); an optional context file overlays them field-wise, last
//! value wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::compat::JavaVersion;

/// Errors that can occur when loading a framework context file
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Failed to read framework context: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Framework context file not found: {0}")]
    NotFound(PathBuf),
}

/// Current values of the framework defaults provider
///
/// Every field is optional: a `None` here means the provider has no
/// value for that field, and a descriptor deferring to it fails
/// resolution with `MissingConfiguration`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameworkContext {
    /// Application identifier (normally unset; only the descriptor knows it)
    pub application_id: Option<String>,

    /// Resource namespace
    pub namespace: Option<String>,

    /// Minimum supported SDK version
    pub min_sdk: Option<u32>,

    /// Target SDK version
    pub target_sdk: Option<u32>,

    /// SDK version to compile against
    pub compile_sdk: Option<u32>,

    /// NDK version pin
    pub ndk_version: Option<String>,

    /// Version code default
    pub version_code: Option<u32>,

    /// Version name default
    pub version_name: Option<String>,

    /// Java source compatibility level
    pub source_compatibility: Option<JavaVersion>,

    /// Java target compatibility level
    pub target_compatibility: Option<JavaVersion>,

    /// Kotlin JVM bytecode target
    pub kotlin_jvm_target: Option<JavaVersion>,

    /// Signing configuration the scaffolding wires release builds to
    pub release_signing: Option<String>,

    /// Application source root relative to the descriptor
    pub source_root: Option<PathBuf>,
}

impl FrameworkContext {
    /// Stock pins the scaffolding ships with
    pub fn scaffold() -> Self {
        Self {
            application_id: None,
            namespace: None,
            min_sdk: Some(21),
            target_sdk: Some(34),
            compile_sdk: Some(34),
            ndk_version: Some("26.3.11579264".to_string()),
            version_code: Some(1),
            version_name: Some("1.0.0".to_string()),
            source_compatibility: Some(JavaVersion::Java11),
            target_compatibility: Some(JavaVersion::Java11),
            kotlin_jvm_target: Some(JavaVersion::Java11),
            release_signing: Some("debug".to_string()),
            source_root: Some(PathBuf::from("../..")),
        }
    }

    /// A provider with no values at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a context file
    ///
    /// Returns the context together with the SHA-256 hex digest of the
    /// raw file bytes for provenance tracking.
    pub fn from_file(path: &Path) -> Result<(Self, String), FrameworkError> {
        if !path.exists() {
            return Err(FrameworkError::NotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes).map_err(|e| {
            FrameworkError::Io(io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
        })?;

        let context: FrameworkContext = toml::from_str(&contents)?;
        Ok((context, digest))
    }

    /// Overlay another context on top of this one
    ///
    /// Field-wise: a value set in `over` wins, an unset field keeps the
    /// base value.
    pub fn overlay(self, over: FrameworkContext) -> FrameworkContext {
        FrameworkContext {
            application_id: over.application_id.or(self.application_id),
            namespace: over.namespace.or(self.namespace),
            min_sdk: over.min_sdk.or(self.min_sdk),
            target_sdk: over.target_sdk.or(self.target_sdk),
            compile_sdk: over.compile_sdk.or(self.compile_sdk),
            ndk_version: over.ndk_version.or(self.ndk_version),
            version_code: over.version_code.or(self.version_code),
            version_name: over.version_name.or(self.version_name),
            source_compatibility: over.source_compatibility.or(self.source_compatibility),
            target_compatibility: over.target_compatibility.or(self.target_compatibility),
            kotlin_jvm_target: over.kotlin_jvm_target.or(self.kotlin_jvm_target),
            release_signing: over.release_signing.or(self.release_signing),
            source_root: over.source_root.or(self.source_root),
        }
    }

    /// Overlay multiple contexts in order (first is base, last wins)
    pub fn layered(layers: Vec<FrameworkContext>) -> FrameworkContext {
        layers
            .into_iter()
            .fold(FrameworkContext::empty(), FrameworkContext::overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffold_pins() {
        let ctx = FrameworkContext::scaffold();
        assert_eq!(ctx.min_sdk, Some(21));
        assert_eq!(ctx.target_sdk, Some(34));
        assert_eq!(ctx.compile_sdk, Some(34));
        assert_eq!(ctx.version_code, Some(1));
        assert_eq!(ctx.version_name.as_deref(), Some("1.0.0"));
        assert_eq!(ctx.release_signing.as_deref(), Some("debug"));
        assert_eq!(ctx.source_root, Some(PathBuf::from("../..")));
        // The framework cannot know the application identity
        assert!(ctx.application_id.is_none());
        assert!(ctx.namespace.is_none());
    }

    #[test]
    fn test_overlay_set_field_wins() {
        let over = FrameworkContext {
            target_sdk: Some(35),
            ..FrameworkContext::empty()
        };

        let merged = FrameworkContext::scaffold().overlay(over);
        assert_eq!(merged.target_sdk, Some(35));
        // Unset fields keep the base value
        assert_eq!(merged.min_sdk, Some(21));
        assert_eq!(merged.compile_sdk, Some(34));
    }

    #[test]
    fn test_layered_last_wins() {
        let a = FrameworkContext {
            min_sdk: Some(21),
            target_sdk: Some(33),
            ..FrameworkContext::empty()
        };
        let b = FrameworkContext {
            target_sdk: Some(34),
            ..FrameworkContext::empty()
        };

        let merged = FrameworkContext::layered(vec![a, b]);
        assert_eq!(merged.min_sdk, Some(21));
        assert_eq!(merged.target_sdk, Some(34));
    }

    #[test]
    fn test_from_file_overlay() {
        use std::io::Write;
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        writeln!(temp, "target_sdk = 35").unwrap();
        writeln!(temp, "ndk_version = \"27.0.12077973\"").unwrap();

        let (file_ctx, digest) = FrameworkContext::from_file(temp.path()).unwrap();
        assert_eq!(digest.len(), 64);

        let ctx = FrameworkContext::scaffold().overlay(file_ctx);
        assert_eq!(ctx.target_sdk, Some(35));
        assert_eq!(ctx.ndk_version.as_deref(), Some("27.0.12077973"));
        assert_eq!(ctx.min_sdk, Some(21));
    }

    #[test]
    fn test_from_file_missing() {
        let result = FrameworkContext::from_file(Path::new("/nonexistent/framework.toml"));
        assert!(matches!(result, Err(FrameworkError::NotFound(_))));
    }

    #[test]
    fn test_empty_has_no_values() {
        let ctx = FrameworkContext::empty();
        assert_eq!(ctx, FrameworkContext::default());
        assert!(ctx.min_sdk.is_none());
    }
}
