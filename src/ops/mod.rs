//! High-level operations.
//!
//! This module contains the implementation of nativepack commands.

pub mod init;
pub mod normalize;
pub mod report;

pub use init::{generate_manifest, init_project, InitOptions};
pub use normalize::{normalize, NormalizeOptions, NormalizedProject};
pub use report::{CapabilityReport, CheckReport};
