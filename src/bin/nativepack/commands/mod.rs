//! Command implementations

pub mod capabilities;
pub mod check;
pub mod init;

use std::path::Path;

use anyhow::Result;

use crate::cli::TargetArgs;
use nativepack::core::Capabilities;
use nativepack::util::config::{self, Config};

/// Load the layered tool config for `project_root` with the command line on top.
pub fn resolve_config(project_root: &Path, target: &TargetArgs) -> Config {
    let mut config = config::load_for_project(project_root);
    config.target.merge(target.to_target_config());
    config
}

/// Capabilities of the target selected by config files and flags.
pub fn resolve_capabilities(project_root: &Path, target: &TargetArgs) -> Result<Capabilities> {
    resolve_config(project_root, target).to_capabilities()
}
