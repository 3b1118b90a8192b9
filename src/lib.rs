//! nativepack - configuration defaulting and validation for native application packaging
//!
//! A packaging configuration is a sparse tree (runtime, execution profiles,
//! installer, Windows service, ...). This crate fills in every default and
//! checks the result against what the selected target can do, in one ordered
//! pass. Fatal problems abort the pass with a [`ConfigError`]; recoverable ones
//! are reset to a safe value and reported through a [`WarningSink`].

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for nativepack unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides capability presets and scratch projects.
#[cfg(test)]
pub mod test_support;

pub use core::{
    capabilities::Capabilities, error::ConfigError, error::ConfigWarning, error::WarningSink,
    manifest::ProjectConfig, project::ProjectContext,
};

pub use ops::normalize::{normalize, NormalizeOptions, NormalizedProject};
