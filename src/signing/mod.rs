//! Signing configuration registry
//!
//! Parses and validates the named signing configurations the descriptor
//! can reference. Each entry is a named bundle of keystore credentials;
//! the scaffolding always registers a `debug` entry backed by the shared
//! debug keystore.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Placeholder written over credential fields in any displayed output
pub const REDACTED: &str = "[REDACTED]";

/// Signing configuration registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningRegistry {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Registered signing configurations
    #[serde(default, rename = "signing")]
    pub configs: Vec<SigningConfig>,
}

fn default_schema_version() -> u32 {
    1
}

/// A single named signing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Unique name the descriptor references (must be unique across the registry)
    pub name: String,

    /// Path to the keystore file
    pub store_file: Option<PathBuf>,

    /// Keystore password
    pub store_password: Option<String>,

    /// Alias of the signing key inside the keystore
    pub key_alias: Option<String>,

    /// Password of the signing key
    pub key_password: Option<String>,
}

/// Errors that can occur when loading or validating the signing registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to read signing registry: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate signing config name: '{0}'")]
    DuplicateName(String),

    #[error("Signing config '{name}': invalid value for '{field}': {reason}")]
    InvalidValue {
        name: String,
        field: String,
        reason: String,
    },

    #[error("Signing registry file not found: {0}")]
    NotFound(PathBuf),
}

impl SigningRegistry {
    /// Load the registry from the default location
    /// (~/.config/droidpack/signing.toml)
    pub fn load_default() -> Result<Self, RegistryError> {
        let path = Self::default_path()?;
        if !path.exists() {
            // No registry file means only the implicit debug entry exists
            return Ok(SigningRegistry::default().with_debug_default());
        }
        Self::load(&path)
    }

    /// Get the default registry file path
    pub fn default_path() -> Result<PathBuf, RegistryError> {
        let home = std::env::var("HOME").map_err(|_| {
            RegistryError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "HOME environment variable not set",
            ))
        })?;
        Ok(PathBuf::from(home).join(".config/droidpack/signing.toml"))
    }

    /// Load the registry from a specific path
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        if !path.exists() {
            return Err(RegistryError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse the registry from a TOML string
    pub fn parse(content: &str) -> Result<Self, RegistryError> {
        let registry: SigningRegistry = toml::from_str(content)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Validate the registry
    fn validate(&self) -> Result<(), RegistryError> {
        // Check for duplicate names
        let mut seen_names = HashSet::new();
        for config in &self.configs {
            if !seen_names.insert(&config.name) {
                return Err(RegistryError::DuplicateName(config.name.clone()));
            }
        }

        for config in &self.configs {
            config.validate()?;
        }

        Ok(())
    }

    /// Register the scaffolding's implicit `debug` entry unless the
    /// registry already defines one
    pub fn with_debug_default(mut self) -> Self {
        if self.get("debug").is_none() {
            self.configs.push(SigningConfig::debug_default());
        }
        self
    }

    /// Get a signing config by name
    pub fn get(&self, name: &str) -> Option<&SigningConfig> {
        self.configs.iter().find(|c| c.name == name)
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Number of registered configs
    pub fn len(&self) -> usize {
        self.configs.len()
    }
}

impl Default for SigningRegistry {
    fn default() -> Self {
        Self {
            schema_version: 1,
            configs: Vec::new(),
        }
    }
}

impl SigningConfig {
    /// The shared debug keystore entry every scaffolded project gets
    pub fn debug_default() -> Self {
        Self {
            name: "debug".to_string(),
            store_file: Some(PathBuf::from("~/.android/debug.keystore")),
            store_password: Some("android".to_string()),
            key_alias: Some("androiddebugkey".to_string()),
            key_password: Some("android".to_string()),
        }
    }

    /// Validate the entry
    fn validate(&self) -> Result<(), RegistryError> {
        if self.name.is_empty() {
            return Err(RegistryError::InvalidValue {
                name: "(unnamed)".to_string(),
                field: "name".to_string(),
                reason: "name cannot be empty".to_string(),
            });
        }

        // Name should be a valid identifier (alphanumeric, dash, underscore)
        if !self
            .name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(RegistryError::InvalidValue {
                name: self.name.clone(),
                field: "name".to_string(),
                reason: "name must contain only alphanumeric characters, dashes, and underscores"
                    .to_string(),
            });
        }

        if let Some(ref alias) = self.key_alias {
            if alias.is_empty() {
                return Err(RegistryError::InvalidValue {
                    name: self.name.clone(),
                    field: "key_alias".to_string(),
                    reason: "key_alias cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Copy of this entry with credential fields redacted
    ///
    /// Used wherever the entry is displayed or serialized.
    pub fn redacted(&self) -> SigningConfig {
        SigningConfig {
            name: self.name.clone(),
            store_file: self.store_file.clone(),
            store_password: self.store_password.as_ref().map(|_| REDACTED.to_string()),
            key_alias: self.key_alias.clone(),
            key_password: self.key_password.as_ref().map(|_| REDACTED.to_string()),
        }
    }

    /// Get the expanded keystore path (resolves ~ to the home directory)
    pub fn expanded_store_file(&self) -> Option<PathBuf> {
        self.store_file.as_ref().map(|p| {
            let s = p.to_string_lossy();
            if let Some(rest) = s.strip_prefix("~/") {
                if let Ok(home) = std::env::var("HOME") {
                    return PathBuf::from(home).join(rest);
                }
            }
            p.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_registry() {
        let content = r#"
            schema_version = 1

            [[signing]]
            name = "upload"
            store_file = "keys/upload.jks"
            store_password = "hunter2"
            key_alias = "upload"
            key_password = "hunter2"
        "#;

        let registry = SigningRegistry::parse(content).unwrap();
        assert_eq!(registry.schema_version, 1);
        assert_eq!(registry.len(), 1);

        let config = registry.get("upload").unwrap();
        assert_eq!(config.store_file, Some(PathBuf::from("keys/upload.jks")));
        assert_eq!(config.key_alias.as_deref(), Some("upload"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let content = r#"
            [[signing]]
            name = "release"

            [[signing]]
            name = "release"
        "#;

        let result = SigningRegistry::parse(content);
        assert!(matches!(result, Err(RegistryError::DuplicateName(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let content = r#"
            [[signing]]
            name = ""
        "#;

        let result = SigningRegistry::parse(content);
        assert!(matches!(result, Err(RegistryError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let content = r#"
            [[signing]]
            name = "release config"
        "#;

        let result = SigningRegistry::parse(content);
        assert!(matches!(result, Err(RegistryError::InvalidValue { .. })));
    }

    #[test]
    fn test_debug_default_registered() {
        let registry = SigningRegistry::default().with_debug_default();
        let debug = registry.get("debug").unwrap();
        assert_eq!(debug.key_alias.as_deref(), Some("androiddebugkey"));
    }

    #[test]
    fn test_debug_default_does_not_shadow_explicit_entry() {
        let content = r#"
            [[signing]]
            name = "debug"
            store_file = "custom/debug.keystore"
        "#;

        let registry = SigningRegistry::parse(content).unwrap().with_debug_default();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("debug").unwrap().store_file,
            Some(PathBuf::from("custom/debug.keystore"))
        );
    }

    #[test]
    fn test_redaction() {
        let config = SigningConfig::debug_default();
        let redacted = config.redacted();

        assert_eq!(redacted.store_password.as_deref(), Some(REDACTED));
        assert_eq!(redacted.key_password.as_deref(), Some(REDACTED));
        // Non-credential fields survive
        assert_eq!(redacted.name, "debug");
        assert_eq!(redacted.key_alias.as_deref(), Some("androiddebugkey"));
    }

    #[test]
    fn test_redaction_preserves_unset_credentials() {
        let config = SigningConfig {
            name: "bare".to_string(),
            store_file: None,
            store_password: None,
            key_alias: None,
            key_password: None,
        };
        let redacted = config.redacted();
        assert!(redacted.store_password.is_none());
        assert!(redacted.key_password.is_none());
    }

    #[test]
    fn test_expanded_store_file() {
        let config = SigningConfig::debug_default();
        let expanded = config.expanded_store_file().unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_lookup_missing_name() {
        let registry = SigningRegistry::default().with_debug_default();
        assert!(registry.get("upload").is_none());
    }
}
