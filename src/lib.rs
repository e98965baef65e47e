//! droidpack - Android packaging descriptor resolver
//!
//! This crate reads a declarative Android packaging descriptor
//! (`pack.toml`), merges it with the defaults supplied by a
//! cross-platform framework context, resolves the signing configuration
//! reference against a named registry, and emits a fully-resolved,
//! deterministic build descriptor for an external packaging pipeline.

pub mod compat;
pub mod coordinate;
pub mod descriptor;
pub mod framework;
pub mod resolve;
pub mod signing;

pub use compat::JavaVersion;
pub use coordinate::Coordinate;
pub use descriptor::{DescriptorError, RawDescriptor};
pub use framework::{FrameworkContext, FrameworkError};
pub use resolve::{
    resolve, BuildDescriptor, FieldOrigin, Resolution, ResolutionSource, ResolveError,
    ResolvedBuild, SourceOrigin,
};
pub use signing::{RegistryError, SigningConfig, SigningRegistry};
