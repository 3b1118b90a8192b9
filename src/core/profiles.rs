//! Execution profile locations.
//!
//! Profiles are collected by test runs and fed back into the native build. Their
//! file names are always derived from the output directory and base name; users
//! can move them but never name them directly.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::core::capabilities::Capabilities;
use crate::core::error::{ConfigWarning, WarningSink};
use crate::core::project::ProjectContext;

/// Extension of the usage profile.
pub const USAGE_EXTENSION: &str = "usg";
/// Extension of the startup profile.
pub const STARTUP_EXTENSION: &str = "startup";
/// Extension of the execution profile.
pub const EXECUTION_EXTENSION: &str = "jprof";

/// Sub-directory of the build directory profiling runs happen in.
pub const PROFILE_DIR_NAME: &str = "profiling";

/// Default staleness threshold, in days.
pub const DEFAULT_OUTDATED_DAYS: u32 = 30;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Where execution profiles live and how they are collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExecProfiles {
    /// Directory holding the profiles (default: project resource directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Base name of the profile files (default: project name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,

    /// Collect profiles on this machine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_locally: Option<bool>,

    /// Directory the profiling image is assembled in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_dir: Option<PathBuf>,

    /// Warn when a profile is older than this many days (0 disables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_warn_about_outdated_profiles: Option<u32>,

    /// Usage profile, derived
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub usg: Option<PathBuf>,

    /// Startup profile, derived
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub startup: Option<PathBuf>,

    /// Execution profile, derived
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub jprofile: Option<PathBuf>,
}

impl ExecProfiles {
    /// Fill in defaults and derive the profile paths.
    ///
    /// Not re-entrant: the derived paths are recomputed from whatever
    /// `output_dir`/`output_name` hold at the time of the call, so a second call
    /// after changing them moves the profiles. Call it once per configuration.
    ///
    /// `no_local_profiling` is the external override that forbids local profiling.
    pub fn fill_defaults(
        &mut self,
        ctx: &ProjectContext,
        caps: &Capabilities,
        no_local_profiling: bool,
        sink: &mut dyn WarningSink,
    ) {
        let output_dir = self
            .output_dir
            .get_or_insert_with(|| ctx.resource_dir.clone())
            .clone();
        let output_name = self
            .output_name
            .get_or_insert_with(|| ctx.name.clone())
            .clone();

        let profile_locally = if caps.is_cross_compilation() {
            if self.profile_locally == Some(true) {
                sink.warn(ConfigWarning::ProfileLocallyOverridden { requested: true });
            }
            false
        } else if no_local_profiling {
            false
        } else {
            self.profile_locally.unwrap_or(true)
        };
        self.profile_locally = Some(profile_locally);

        if self.profile_dir.is_none() {
            self.profile_dir = Some(ctx.build_dir.join(PROFILE_DIR_NAME));
        }
        if self.days_to_warn_about_outdated_profiles.is_none() {
            self.days_to_warn_about_outdated_profiles = Some(DEFAULT_OUTDATED_DAYS);
        }

        let derive = |ext: &str| output_dir.join(format!("{}.{}", output_name, ext));
        self.usg = Some(derive(USAGE_EXTENSION));
        self.startup = Some(derive(STARTUP_EXTENSION));
        self.jprofile = Some(derive(EXECUTION_EXTENSION));
    }

    /// The derived profile paths that have been computed so far.
    pub fn derived_paths(&self) -> Vec<&PathBuf> {
        [&self.usg, &self.startup, &self.jprofile]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Existing profile files older than the staleness threshold at `now`.
    ///
    /// Files that are missing or whose timestamp cannot be read are skipped.
    pub fn outdated_profiles(&self, now: SystemTime) -> Vec<PathBuf> {
        let days = self
            .days_to_warn_about_outdated_profiles
            .unwrap_or(DEFAULT_OUTDATED_DAYS);
        if days == 0 {
            return Vec::new();
        }
        let threshold = Duration::from_secs(u64::from(days) * SECONDS_PER_DAY);

        self.derived_paths()
            .into_iter()
            .filter(|path| {
                std::fs::metadata(path)
                    .and_then(|metadata| metadata.modified())
                    .ok()
                    .and_then(|modified| now.duration_since(modified).ok())
                    .is_some_and(|age| age > threshold)
            })
            .cloned()
            .collect()
    }

    /// Report every outdated profile to the sink.
    pub fn warn_if_outdated(&self, now: SystemTime, sink: &mut dyn WarningSink) {
        let days = self
            .days_to_warn_about_outdated_profiles
            .unwrap_or(DEFAULT_OUTDATED_DAYS);
        for path in self.outdated_profiles(now) {
            sink.warn(ConfigWarning::OutdatedProfile { path, days });
        }
    }
}
