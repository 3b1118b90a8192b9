//! Configuration file support for nativepack.
//!
//! nativepack supports two configuration file locations:
//! - Global: `~/.nativepack/config.toml` - User-wide defaults
//! - Project: `.nativepack/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command line flags take
//! precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::capabilities::{Capabilities, Edition, Feature, TargetOs, TargetSelection};
use crate::core::tokens::parse_token;

/// Toolchain version assumed when none is configured.
pub const DEFAULT_TOOLCHAIN_VERSION: &str = "15.3";

/// Edition assumed when none is configured.
pub const DEFAULT_EDITION: Edition = Edition::Enterprise;

/// nativepack tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default target selection
    pub target: TargetConfig,

    /// Capability overrides
    pub features: FeatureConfig,

    /// Profiling settings
    pub profiling: ProfilingConfig,
}

/// Target selection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TargetConfig {
    /// Target OS (windows, linux, osx; default: host)
    pub os: Option<String>,

    /// Toolchain edition (default: enterprise)
    pub edition: Option<String>,

    /// Toolchain version, e.g. `15.3` (default: 15.3)
    pub version: Option<String>,

    /// Target differs from the build host
    pub cross_compile: Option<bool>,
}

/// Explicit capability overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Features to force on
    pub enable: Vec<String>,

    /// Features to force off (wins over `enable`)
    pub disable: Vec<String>,
}

/// Profiling-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProfilingConfig {
    /// Never profile on this machine
    pub no_local_profiling: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.target.merge(other.target);

        if !other.features.enable.is_empty() {
            self.features.enable = other.features.enable;
        }
        if !other.features.disable.is_empty() {
            self.features.disable = other.features.disable;
        }

        if other.profiling.no_local_profiling {
            self.profiling.no_local_profiling = true;
        }
    }

    /// Build the capability descriptor for the configured target.
    pub fn to_capabilities(&self) -> Result<Capabilities> {
        let os = match &self.target.os {
            Some(token) => parse_token(token)?,
            None => TargetOs::host().unwrap_or(TargetOs::Linux),
        };
        let edition = match &self.target.edition {
            Some(token) => parse_token(token)?,
            None => DEFAULT_EDITION,
        };
        let version = parse_toolchain_version(
            self.target
                .version
                .as_deref()
                .unwrap_or(DEFAULT_TOOLCHAIN_VERSION),
        )?;
        let cross = self.target.cross_compile.unwrap_or(false);

        let enable = parse_features(&self.features.enable)?;
        let disable = parse_features(&self.features.disable)?;

        let selection = TargetSelection::new(os, edition, version).cross(cross);
        Ok(Capabilities::detect(selection).with_overrides(&enable, &disable))
    }
}

impl TargetConfig {
    /// Merge another target selection into this one (other takes precedence).
    pub fn merge(&mut self, other: TargetConfig) {
        if other.os.is_some() {
            self.os = other.os;
        }
        if other.edition.is_some() {
            self.edition = other.edition;
        }
        if other.version.is_some() {
            self.version = other.version;
        }
        if other.cross_compile.is_some() {
            self.cross_compile = other.cross_compile;
        }
    }
}

fn parse_features(tokens: &[String]) -> Result<Vec<Feature>> {
    tokens
        .iter()
        .map(|token| parse_token::<Feature>(token).map_err(Into::into))
        .collect()
}

/// Parse a toolchain version that may omit the minor or patch part.
pub fn parse_toolchain_version(version: &str) -> Result<Version> {
    let trimmed = version.trim();
    let padded = match trimmed.matches('.').count() {
        0 => format!("{}.0.0", trimmed),
        1 => format!("{}.0", trimmed),
        _ => trimmed.to_string(),
    };
    Version::parse(&padded).with_context(|| format!("invalid toolchain version `{}`", version))
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.nativepack/config.toml)
/// 2. Global config (~/.nativepack/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    // Project config overrides global
    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global nativepack config directory (~/.nativepack).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".nativepack"))
}

/// Get the global config path (~/.nativepack/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.nativepack/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".nativepack").join("config.toml")
}

/// Load the configuration that applies to a project.
pub fn load_for_project(project_root: &Path) -> Config {
    let project = project_config_path(project_root);
    match global_config_path() {
        Some(global) => load_config(&global, &project),
        None => load_config(Path::new(""), &project),
    }
}
