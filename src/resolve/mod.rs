//! Configuration resolution
//!
//! The single pure pass that turns a raw descriptor plus the framework
//! context into a fully-resolved build descriptor. Literal descriptor
//! values take precedence; unset fields pull from the framework context;
//! a field neither side supplies fails resolution. The pass performs no
//! I/O: all file loading happens in the descriptor, framework, and
//! signing layers before it runs.

mod build_key;

pub use build_key::{compute_build_key, BuildKeyError};

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compat::JavaVersion;
use crate::coordinate::Coordinate;
use crate::descriptor::RawDescriptor;
use crate::framework::FrameworkContext;
use crate::signing::{SigningConfig, SigningRegistry};

/// Schema version for resolution output
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier for resolution output
pub const SCHEMA_ID: &str = "droidpack/resolution@1";

/// Resolution errors
///
/// All three kinds are fatal to the pass: no partial results, no retries.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A required field is unset and the framework context has no value for it
    #[error("Missing configuration: '{field}' is unset and the framework context provides no value")]
    MissingConfiguration { field: &'static str },

    /// The signing reference does not name a registered config
    #[error("Invalid reference: signing config '{name}' is not registered")]
    InvalidReference { name: String },

    /// SDK versions violate min <= target <= compile
    #[error("Invalid version ordering: require minSdk <= targetSdk <= compileSdk, got min={min_sdk}, target={target_sdk}, compile={compile_sdk}")]
    InvalidVersionOrdering {
        min_sdk: u32,
        target_sdk: u32,
        compile_sdk: u32,
    },
}

/// Which side supplied a resolved field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrigin {
    /// Stated literally in the descriptor
    Descriptor,
    /// Pulled from the framework context
    Framework,
}

/// Fully-resolved build descriptor
///
/// Immutable after resolution; consumed by the external packaging
/// pipeline. Serializes deterministically for build key computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDescriptor {
    /// Application identifier in reverse-domain form
    pub application_id: String,

    /// Resource namespace
    pub namespace: String,

    /// Minimum supported SDK version
    pub min_sdk: u32,

    /// Target SDK version
    pub target_sdk: u32,

    /// SDK version to compile against
    pub compile_sdk: u32,

    /// NDK version pin, when either side supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<String>,

    /// Monotonic version code
    pub version_code: u32,

    /// Human-readable version name
    pub version_name: String,

    /// Java source compatibility level
    pub source_compatibility: JavaVersion,

    /// Java target compatibility level
    pub target_compatibility: JavaVersion,

    /// Kotlin JVM bytecode target
    pub kotlin_jvm_target: JavaVersion,

    /// Core-library desugaring toggle
    pub desugaring: bool,

    /// Build plugins to apply
    pub plugins: Vec<String>,

    /// Name of the signing configuration for release builds
    pub release_signing: String,

    /// Build-time dependency coordinates, deduplicated and ordered
    pub dependencies: BTreeSet<Coordinate>,

    /// Application source root relative to the descriptor
    pub source_root: PathBuf,
}

/// Output of the resolution pass
#[derive(Debug, Clone)]
pub struct ResolvedBuild {
    /// The resolved descriptor
    pub descriptor: BuildDescriptor,

    /// The resolved signing entry, credentials redacted
    pub signing: SigningConfig,

    /// Origin of each deferral-capable field
    pub origins: BTreeMap<String, FieldOrigin>,

    /// Non-fatal findings
    pub warnings: Vec<String>,
}

/// Resolve a raw descriptor against the framework context and registry
///
/// Resolution order per field: explicit literal value, else the framework
/// context's value, else `MissingConfiguration` naming the field. Runs to
/// completion or fails; a second invocation over the same inputs yields
/// an identical result.
pub fn resolve(
    raw: &RawDescriptor,
    framework: &FrameworkContext,
    registry: &SigningRegistry,
) -> Result<ResolvedBuild, ResolveError> {
    let mut origins = BTreeMap::new();
    let mut warnings = Vec::new();

    let application_id = field(
        "application_id",
        &raw.application_id,
        &framework.application_id,
        &mut origins,
    )?;

    // The namespace falls back to the application identifier when neither
    // side states one, matching the scaffolding's layout.
    let namespace = match (&raw.namespace, &framework.namespace) {
        (Some(ns), _) => {
            origins.insert("namespace".to_string(), FieldOrigin::Descriptor);
            ns.clone()
        }
        (None, Some(ns)) => {
            origins.insert("namespace".to_string(), FieldOrigin::Framework);
            ns.clone()
        }
        (None, None) => {
            let app_id_origin = origins["application_id"];
            origins.insert("namespace".to_string(), app_id_origin);
            application_id.clone()
        }
    };

    let min_sdk = field("min_sdk", &raw.min_sdk, &framework.min_sdk, &mut origins)?;
    let target_sdk = field(
        "target_sdk",
        &raw.target_sdk,
        &framework.target_sdk,
        &mut origins,
    )?;
    let compile_sdk = field(
        "compile_sdk",
        &raw.compile_sdk,
        &framework.compile_sdk,
        &mut origins,
    )?;

    if min_sdk > target_sdk || target_sdk > compile_sdk {
        return Err(ResolveError::InvalidVersionOrdering {
            min_sdk,
            target_sdk,
            compile_sdk,
        });
    }

    // Optional: resolves to nothing without error when neither side pins it
    let ndk_version = optional_field(
        "ndk_version",
        &raw.ndk_version,
        &framework.ndk_version,
        &mut origins,
    );

    let version_code = field(
        "version_code",
        &raw.version_code,
        &framework.version_code,
        &mut origins,
    )?;
    let version_name = field(
        "version_name",
        &raw.version_name,
        &framework.version_name,
        &mut origins,
    )?;

    let source_compatibility = field(
        "source_compatibility",
        &raw.source_compatibility,
        &framework.source_compatibility,
        &mut origins,
    )?;
    let target_compatibility = field(
        "target_compatibility",
        &raw.target_compatibility,
        &framework.target_compatibility,
        &mut origins,
    )?;
    let kotlin_jvm_target = field(
        "kotlin_jvm_target",
        &raw.kotlin_jvm_target,
        &framework.kotlin_jvm_target,
        &mut origins,
    )?;

    if kotlin_jvm_target != target_compatibility {
        warnings.push(format!(
            "Kotlin JVM target {} differs from Java target compatibility {}",
            kotlin_jvm_target, target_compatibility
        ));
    }

    let release_signing = field(
        "release_signing",
        &raw.release_signing,
        &framework.release_signing,
        &mut origins,
    )?;

    let signing = registry
        .get(&release_signing)
        .ok_or_else(|| ResolveError::InvalidReference {
            name: release_signing.clone(),
        })?;

    if signing.name == "debug" {
        warnings.push(
            "Release builds are signed with the debug configuration; artifacts will not be shippable"
                .to_string(),
        );
    }

    let source_root = field(
        "source_root",
        &raw.source_root,
        &framework.source_root,
        &mut origins,
    )?;

    let dependencies: BTreeSet<Coordinate> = raw.dependencies.iter().cloned().collect();

    if raw.desugaring && !dependencies.iter().any(Coordinate::is_desugar_runtime) {
        warnings.push(format!(
            "Desugaring is enabled but no '{}' coordinate is on the dependency list",
            Coordinate::DESUGAR_ARTIFACT
        ));
    }

    let descriptor = BuildDescriptor {
        application_id,
        namespace,
        min_sdk,
        target_sdk,
        compile_sdk,
        ndk_version,
        version_code,
        version_name,
        source_compatibility,
        target_compatibility,
        kotlin_jvm_target,
        desugaring: raw.desugaring,
        plugins: raw.plugins.clone(),
        release_signing,
        dependencies,
        source_root,
    };

    Ok(ResolvedBuild {
        descriptor,
        signing: signing.redacted(),
        origins,
        warnings,
    })
}

/// Resolve one required field: literal wins, else framework, else fail
fn field<T: Clone>(
    name: &'static str,
    literal: &Option<T>,
    fallback: &Option<T>,
    origins: &mut BTreeMap<String, FieldOrigin>,
) -> Result<T, ResolveError> {
    match (literal, fallback) {
        (Some(v), _) => {
            origins.insert(name.to_string(), FieldOrigin::Descriptor);
            Ok(v.clone())
        }
        (None, Some(v)) => {
            origins.insert(name.to_string(), FieldOrigin::Framework);
            Ok(v.clone())
        }
        (None, None) => Err(ResolveError::MissingConfiguration { field: name }),
    }
}

/// Resolve one optional field: absent on both sides is not an error
fn optional_field<T: Clone>(
    name: &'static str,
    literal: &Option<T>,
    fallback: &Option<T>,
    origins: &mut BTreeMap<String, FieldOrigin>,
) -> Option<T> {
    match (literal, fallback) {
        (Some(v), _) => {
            origins.insert(name.to_string(), FieldOrigin::Descriptor);
            Some(v.clone())
        }
        (None, Some(v)) => {
            origins.insert(name.to_string(), FieldOrigin::Framework);
            Some(v.clone())
        }
        (None, None) => None,
    }
}

/// Origin of a contributing resolution source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    Descriptor,
    Framework,
    Builtin,
    SigningRegistry,
}

/// A contributing source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionSource {
    /// Origin of this source
    pub origin: SourceOrigin,

    /// File path (None for builtin)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ResolutionSource {
    /// A file-backed source
    pub fn file(origin: SourceOrigin, path: &Path, digest: String) -> Self {
        Self {
            origin,
            path: Some(path.to_string_lossy().to_string()),
            digest: Some(digest),
        }
    }

    /// The built-in scaffolding pins
    pub fn builtin() -> Self {
        Self {
            origin: SourceOrigin::Builtin,
            path: None,
            digest: None,
        }
    }
}

/// Resolution output envelope written for the packaging pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this resolution was computed
    pub created_at: DateTime<Utc>,

    /// The resolved descriptor
    pub descriptor: BuildDescriptor,

    /// Canonical key of the resolved descriptor
    pub build_key: String,

    /// The resolved signing entry, credentials redacted
    pub signing: SigningConfig,

    /// Origin of each deferral-capable field
    pub origins: BTreeMap<String, FieldOrigin>,

    /// Contributing sources in precedence order
    pub sources: Vec<ResolutionSource>,

    /// Non-fatal findings
    pub warnings: Vec<String>,
}

impl Resolution {
    /// Build the output envelope from a resolution pass result
    pub fn from_resolved(resolved: ResolvedBuild) -> Result<Self, BuildKeyError> {
        let build_key = compute_build_key(&resolved.descriptor)?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            descriptor: resolved.descriptor,
            build_key,
            signing: resolved.signing,
            origins: resolved.origins,
            sources: Vec::new(),
            warnings: resolved.warnings,
        })
    }

    /// Attach the contributing sources
    pub fn with_sources(mut self, sources: Vec<ResolutionSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Serialize to JSON (pretty printed)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e))
        })?;
        fs::write(path, json)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A resolved descriptor matching the scaffolded prayer app
    pub(crate) fn sample_descriptor() -> BuildDescriptor {
        BuildDescriptor {
            application_id: "com.daryan.prayer".to_string(),
            namespace: "com.daryan.prayer".to_string(),
            min_sdk: 21,
            target_sdk: 34,
            compile_sdk: 34,
            ndk_version: Some("26.3.11579264".to_string()),
            version_code: 1,
            version_name: "1.0.0".to_string(),
            source_compatibility: JavaVersion::Java11,
            target_compatibility: JavaVersion::Java11,
            kotlin_jvm_target: JavaVersion::Java11,
            desugaring: true,
            plugins: vec![
                "com.android.application".to_string(),
                "kotlin-android".to_string(),
            ],
            release_signing: "debug".to_string(),
            dependencies: ["com.android.tools:desugar_jdk_libs:2.0.3"]
                .iter()
                .map(|s| s.parse().unwrap())
                .collect(),
            source_root: PathBuf::from("../.."),
        }
    }
}
