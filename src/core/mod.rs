//! Core data structures for nativepack.
//!
//! This module contains the configuration tree and everything it is validated
//! against:
//! - Target capabilities (OS, edition, toolchain version)
//! - The project context shared by every section
//! - Configuration sections (runtime, profiles, installer, service, ...)
//! - Error and warning types

pub mod capabilities;
pub mod error;
pub mod installer;
pub mod manifest;
pub mod package_file;
pub mod profiles;
pub mod project;
pub mod runtime;
pub mod service;
pub mod tokens;

pub use capabilities::{Capabilities, Edition, Feature, TargetOs, TargetSelection};
pub use error::{ConfigError, ConfigWarning, TracingSink, WarningSink};
pub use installer::InstallerConfig;
pub use manifest::{ProjectConfig, MANIFEST_NAME};
pub use package_file::PackageFile;
pub use profiles::ExecProfiles;
pub use project::{ApplicationKind, ContextRequests, ProjectContext};
pub use runtime::RuntimeConfig;
pub use service::ServiceConfig;
