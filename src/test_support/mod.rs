//! Test utilities for nativepack unit tests.
//!
//! Capability presets for the targets the tests care about, plus scratch
//! projects on disk for validators that touch the filesystem.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::{enterprise_caps, scratch_project};
//!
//! #[test]
//! fn test_example() {
//!     let scratch = scratch_project("demo");
//!     let mut config = ProjectConfig::default();
//!     config.validate_resources(&scratch.context, &enterprise_caps(), &mut Vec::new())?;
//! }
//! ```

pub mod fixtures;

use semver::Version;

use crate::core::capabilities::{Capabilities, Edition, TargetOs, TargetSelection};
use crate::core::project::ProjectContext;

// Re-export fixtures for convenience
pub use fixtures::*;

/// A context rooted at a fixed, non-existent directory.
///
/// Good for validators that never look at the disk.
pub fn test_context(name: &str) -> ProjectContext {
    ProjectContext::new(name, format!("/work/{}", name))
}

/// Capabilities of a native build for the given target.
pub fn caps_for(os: TargetOs, edition: Edition, version: (u64, u64)) -> Capabilities {
    Capabilities::detect(TargetSelection::new(
        os,
        edition,
        Version::new(version.0, version.1, 0),
    ))
}

/// Windows, Enterprise edition, 15.3 - the most capable target.
pub fn enterprise_caps() -> Capabilities {
    caps_for(TargetOs::Windows, Edition::Enterprise, (15, 3))
}

/// Linux, Standard edition, 15.3.
pub fn standard_caps() -> Capabilities {
    caps_for(TargetOs::Linux, Edition::Standard, (15, 3))
}

/// Linux, Enterprise edition, 15.3, cross-compiled.
pub fn cross_caps() -> Capabilities {
    Capabilities::detect(
        TargetSelection::new(TargetOs::Linux, Edition::Enterprise, Version::new(15, 3, 0))
            .cross(true),
    )
}
