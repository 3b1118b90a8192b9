//! Target capability descriptor - hard facts about what a target can do.
//!
//! Capabilities are derived once per target selection (OS, product edition,
//! toolchain version, cross-compilation) and are read-only afterwards.
//! Validators only ever query them.

use std::collections::BTreeSet;

use semver::Version;

use crate::core::runtime::RuntimeFlavor;
use crate::core::tokens::{token_enum, try_parse_token, TokenEnum};

token_enum! {
    /// Operating system the packaged application runs on.
    pub enum TargetOs: "target.os" {
        Windows => "windows",
        Linux => "linux",
        Osx => "osx",
    }
}

impl TargetOs {
    /// The OS this tool is running on, if it is a supported target.
    pub fn host() -> Option<TargetOs> {
        if cfg!(target_os = "windows") {
            Some(TargetOs::Windows)
        } else if cfg!(target_os = "linux") {
            Some(TargetOs::Linux)
        } else if cfg!(target_os = "macos") {
            Some(TargetOs::Osx)
        } else {
            None
        }
    }
}

token_enum! {
    /// Product edition of the native toolchain.
    pub enum Edition: "target.edition" {
        Evaluation => "evaluation",
        Standard => "standard",
        Professional => "professional",
        Enterprise => "enterprise",
        Embedded => "embedded",
        EmbeddedEvaluation => "embedded-evaluation",
    }
}

impl Edition {
    /// Check if this is a time-limited evaluation edition.
    pub fn is_evaluation(&self) -> bool {
        matches!(self, Edition::Evaluation | Edition::EmbeddedEvaluation)
    }

    /// Check if this is an embedded edition.
    pub fn is_embedded(&self) -> bool {
        matches!(self, Edition::Embedded | Edition::EmbeddedEvaluation)
    }
}

token_enum! {
    /// A capability a target may or may not have.
    pub enum Feature: "feature" {
        RuntimeFlavorDesktop => "runtime-flavor-desktop",
        RuntimeFlavorServer => "runtime-flavor-server",
        RuntimeFlavorClassic => "runtime-flavor-classic",
        ChangeRtLocation => "change-rt-location",
        CompactProfiles => "compact-profiles",
        SlimDown => "slim-down",
        DiskFootprintReduction => "disk-footprint-reduction",
        WindowsServices => "windows-services",
        ExcelsiorInstaller => "excelsior-installer",
        AdvancedInstallerFeatures => "advanced-installer-features",
        InstallerCompression => "installer-compression",
        Tomcat => "tomcat",
        SpringBoot => "spring-boot",
        DynamicLibrary => "dynamic-library",
        OsxAppBundle => "osx-app-bundle",
        TrialVersion => "trial-version",
        StackTraceFull => "stack-trace-full",
    }
}

impl Feature {
    /// The feature that gates a runtime flavor.
    pub fn for_flavor(flavor: RuntimeFlavor) -> Feature {
        match flavor {
            RuntimeFlavor::Desktop => Feature::RuntimeFlavorDesktop,
            RuntimeFlavor::Server => Feature::RuntimeFlavorServer,
            RuntimeFlavor::Classic => Feature::RuntimeFlavorClassic,
        }
    }
}

/// The target a build is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSelection {
    /// Target operating system
    pub os: TargetOs,

    /// Toolchain product edition
    pub edition: Edition,

    /// Toolchain version
    pub version: Version,

    /// Target differs from the host the toolchain runs on
    pub cross_compilation: bool,
}

impl TargetSelection {
    /// Create a native (non-cross) selection.
    pub fn new(os: TargetOs, edition: Edition, version: Version) -> Self {
        TargetSelection {
            os,
            edition,
            version,
            cross_compilation: false,
        }
    }

    /// Mark the selection as a cross-compilation.
    pub fn cross(mut self, cross_compilation: bool) -> Self {
        self.cross_compilation = cross_compilation;
        self
    }
}

/// Complete capability descriptor for one target selection.
#[derive(Debug, Clone)]
pub struct Capabilities {
    selection: TargetSelection,
    features: BTreeSet<Feature>,
}

impl Capabilities {
    /// Derive capabilities from the edition/OS/version table.
    pub fn detect(selection: TargetSelection) -> Self {
        let os = selection.os;
        let edition = selection.edition;
        let cross = selection.cross_compilation;
        let version = selection.version.clone();
        let at_least = |major: u64, minor: u64| version >= Version::new(major, minor, 0);

        let standard = edition == Edition::Standard;
        let full_edition = matches!(edition, Edition::Enterprise | Edition::Evaluation);
        let installer = os != TargetOs::Osx && !edition.is_embedded();

        let table = [
            (Feature::RuntimeFlavorDesktop, true),
            (Feature::RuntimeFlavorServer, !standard),
            (
                Feature::RuntimeFlavorClassic,
                matches!(
                    edition,
                    Edition::Evaluation | Edition::Professional | Edition::Enterprise
                ) && !at_least(15, 0),
            ),
            (Feature::ChangeRtLocation, full_edition && !cross),
            (Feature::CompactProfiles, at_least(11, 0) && !standard),
            (
                Feature::SlimDown,
                full_edition && !cross && os != TargetOs::Osx,
            ),
            (
                Feature::DiskFootprintReduction,
                os != TargetOs::Osx && !standard,
            ),
            (
                Feature::WindowsServices,
                os == TargetOs::Windows && !standard && !edition.is_embedded(),
            ),
            (Feature::ExcelsiorInstaller, installer),
            (Feature::AdvancedInstallerFeatures, installer && at_least(11, 3)),
            (Feature::InstallerCompression, installer && at_least(15, 0)),
            (
                Feature::Tomcat,
                !standard && !edition.is_embedded() && at_least(11, 0),
            ),
            (
                Feature::SpringBoot,
                !standard && !edition.is_embedded() && at_least(15, 3),
            ),
            (
                Feature::DynamicLibrary,
                edition != Edition::EmbeddedEvaluation,
            ),
            (Feature::OsxAppBundle, os == TargetOs::Osx),
            (Feature::TrialVersion, !edition.is_evaluation()),
            (Feature::StackTraceFull, at_least(15, 0)),
        ];

        let features = table
            .into_iter()
            .filter(|(_, supported)| *supported)
            .map(|(feature, _)| feature)
            .collect();

        tracing::debug!(
            "capabilities for {} {} {}{}",
            selection.os,
            selection.edition,
            selection.version,
            if cross { " (cross)" } else { "" }
        );

        Capabilities {
            selection,
            features,
        }
    }

    /// Apply explicit feature overrides. Disabling wins over enabling.
    pub fn with_overrides(mut self, enable: &[Feature], disable: &[Feature]) -> Self {
        self.features.extend(enable.iter().copied());
        for feature in disable {
            self.features.remove(feature);
        }
        self
    }

    /// Check if a feature is supported.
    pub fn supports(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Check a feature by its token name. Unknown names are unsupported.
    pub fn supports_feature(&self, name: &str) -> bool {
        try_parse_token::<Feature>(name).is_some_and(|feature| self.supports(feature))
    }

    /// Check if a runtime flavor is supported.
    pub fn supports_flavor(&self, flavor: RuntimeFlavor) -> bool {
        self.supports(Feature::for_flavor(flavor))
    }

    /// Runtime flavors the target supports, in declaration order.
    pub fn supported_flavors(&self) -> Vec<RuntimeFlavor> {
        RuntimeFlavor::ALL
            .iter()
            .copied()
            .filter(|flavor| self.supports_flavor(*flavor))
            .collect()
    }

    /// The target operating system.
    pub fn target_os(&self) -> TargetOs {
        self.selection.os
    }

    /// The toolchain edition.
    pub fn edition(&self) -> Edition {
        self.selection.edition
    }

    /// The toolchain version.
    pub fn version(&self) -> &Version {
        &self.selection.version
    }

    /// Check if the target is cross-compiled.
    pub fn is_cross_compilation(&self) -> bool {
        self.selection.cross_compilation
    }

    /// Check if the toolchain version is at least `marker`.
    pub fn version_at_least(&self, marker: &Version) -> bool {
        self.selection.version >= *marker
    }

    /// Every feature with its support flag, in declaration order.
    pub fn feature_table(&self) -> Vec<(Feature, bool)> {
        Feature::ALL
            .iter()
            .map(|feature| (*feature, self.supports(*feature)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(os: TargetOs, edition: Edition, version: (u64, u64)) -> Capabilities {
        Capabilities::detect(TargetSelection::new(
            os,
            edition,
            Version::new(version.0, version.1, 0),
        ))
    }

    #[test]
    fn test_enterprise_windows_has_everything_gated_on_windows() {
        let caps = caps(TargetOs::Windows, Edition::Enterprise, (15, 3));
        assert!(caps.supports(Feature::WindowsServices));
        assert!(caps.supports(Feature::SlimDown));
        assert!(caps.supports(Feature::AdvancedInstallerFeatures));
        assert!(caps.supports(Feature::InstallerCompression));
        assert!(caps.supports(Feature::SpringBoot));
        assert!(!caps.supports(Feature::OsxAppBundle));
        assert!(!caps.supports(Feature::RuntimeFlavorClassic));
    }

    #[test]
    fn test_standard_edition_is_restricted() {
        let caps = caps(TargetOs::Linux, Edition::Standard, (15, 3));
        assert!(!caps.supports(Feature::CompactProfiles));
        assert!(!caps.supports(Feature::DiskFootprintReduction));
        assert!(!caps.supports(Feature::RuntimeFlavorServer));
        assert_eq!(caps.supported_flavors(), vec![RuntimeFlavor::Desktop]);
    }

    #[test]
    fn test_cross_compilation_disables_slim_down() {
        let selection = TargetSelection::new(
            TargetOs::Linux,
            Edition::Enterprise,
            Version::new(15, 0, 0),
        )
        .cross(true);
        let caps = Capabilities::detect(selection);
        assert!(caps.is_cross_compilation());
        assert!(!caps.supports(Feature::SlimDown));
        assert!(!caps.supports(Feature::ChangeRtLocation));
    }

    #[test]
    fn test_version_gates() {
        let old = caps(TargetOs::Windows, Edition::Enterprise, (11, 0));
        assert!(!old.supports(Feature::AdvancedInstallerFeatures));
        assert!(old.supports(Feature::RuntimeFlavorClassic));
        assert!(old.version_at_least(&Version::new(10, 5, 0)));
        assert!(!old.version_at_least(&Version::new(11, 3, 0)));
    }

    #[test]
    fn test_supports_feature_by_name() {
        let caps = caps(TargetOs::Osx, Edition::Professional, (15, 0));
        assert!(caps.supports_feature("osx-app-bundle"));
        assert!(caps.supports_feature("OSX_APP_BUNDLE"));
        assert!(!caps.supports_feature("excelsior-installer"));
        assert!(!caps.supports_feature("teleportation"));
        assert!(!caps.supports_feature("startup-profile"));
    }

    #[test]
    fn test_overrides() {
        let caps = caps(TargetOs::Linux, Edition::Standard, (15, 0))
            .with_overrides(&[Feature::CompactProfiles, Feature::SlimDown], &[Feature::SlimDown]);
        assert!(caps.supports(Feature::CompactProfiles));
        assert!(!caps.supports(Feature::SlimDown));
    }
}
