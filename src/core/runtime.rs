//! Runtime selection: flavor, location, compact profile, slim-down and
//! disk footprint reduction.

use serde::{Deserialize, Serialize};

use crate::core::capabilities::{Capabilities, Feature};
use crate::core::error::{ConfigError, ConfigWarning, WarningSink};
use crate::core::project::{ContextRequests, ProjectContext};
use crate::core::tokens::{parse_token, token_enum, try_parse_token, TokenEnum};

token_enum! {
    /// Runtime flavor linked into the executable.
    pub enum RuntimeFlavor: "runtime.flavor" {
        Desktop => "desktop",
        Server => "server",
        Classic => "classic",
    }
}

token_enum! {
    /// Subset of the platform API the runtime carries.
    pub enum CompactProfile: "runtime.profile" {
        Auto => "auto",
        Compact1 => "compact1",
        Compact2 => "compact2",
        Compact3 => "compact3",
        Full => "full",
    }
}

impl CompactProfile {
    /// Check if this is one of the restricted compact profiles.
    pub fn is_restrictive(&self) -> bool {
        matches!(
            self,
            CompactProfile::Compact1 | CompactProfile::Compact2 | CompactProfile::Compact3
        )
    }
}

token_enum! {
    /// How aggressively the on-disk size of the runtime is reduced.
    pub enum DiskFootprintReduction: "runtime.disk-footprint-reduction" {
        None => "none",
        Medium => "medium",
        HighMemory => "high-memory",
        HighDisk => "high-disk",
    }
}

/// Extension of the detached slim-down package.
pub const DETACHED_PACKAGE_EXTENSION: &str = "pkl";

/// Runtime slim-down: parts of the runtime moved to a package downloaded on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SlimDown {
    /// URL the detached package is fetched from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detached_base_url: Option<String>,

    /// File name of the detached package (default: `{artifact}.pkl`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detached_package: Option<String>,

    /// Runtime components to detach
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detach_components: Vec<String>,

    /// Detach everything that is not needed at startup
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub detach_all: bool,
}

impl SlimDown {
    /// Check if any sub-setting is given.
    pub fn is_defined(&self) -> bool {
        self.detached_base_url.is_some()
            || self.detached_package.is_some()
            || !self.detach_components.is_empty()
            || self.detach_all
    }

    fn fill_defaults(&mut self, ctx: &ProjectContext) -> Result<(), ConfigError> {
        let base_url = match self.detached_base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => return Err(ConfigError::DetachedBaseUrlNotSet),
        };
        url::Url::parse(&base_url).map_err(|e| ConfigError::InvalidDetachedBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        self.detached_base_url = Some(base_url);

        if self.detached_package.is_none() {
            self.detached_package = Some(format!(
                "{}.{}",
                ctx.artifact_name, DETACHED_PACKAGE_EXTENSION
            ));
        }

        dedup_ignore_case(&mut self.detach_components);
        Ok(())
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// `desktop`, `server` or `classic`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,

    /// Where the runtime is placed relative to the executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Optional runtime components to include
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,

    /// Locales to include
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locales: Option<Vec<String>>,

    /// Compact profile (default `auto`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Disk footprint reduction mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_footprint_reduction: Option<String>,

    /// Runtime slim-down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slim_down: Option<SlimDown>,
}

impl RuntimeConfig {
    /// Fill in defaults and check the runtime against the target.
    ///
    /// Returns the context changes slim-down needs. The disk footprint check
    /// already accounts for them, so callers must apply the returned requests
    /// before defaulting anything else that reads the global optimizer flag.
    pub fn fill_defaults(
        &mut self,
        ctx: &ProjectContext,
        caps: &Capabilities,
        sink: &mut dyn WarningSink,
    ) -> Result<ContextRequests, ConfigError> {
        if let Some(token) = &self.flavor {
            let flavor: RuntimeFlavor = parse_token(token)?;
            if !caps.supports_flavor(flavor) {
                return Err(ConfigError::UnsupportedRuntimeFlavor {
                    flavor: flavor.to_string(),
                });
            }
            self.flavor = Some(flavor.token().to_string());
        }

        if let Some(location) = &self.location {
            if !caps.supports(Feature::ChangeRtLocation) {
                return Err(ConfigError::RtLocationUnavailable {
                    location: location.clone(),
                });
            }
        }

        let profile = match &self.profile {
            Some(token) => {
                let profile: CompactProfile = parse_token(token)?;
                if profile.is_restrictive() && !caps.supports(Feature::CompactProfiles) {
                    return Err(ConfigError::CompactProfilesNotSupported {
                        profile: profile.to_string(),
                    });
                }
                profile
            }
            None => CompactProfile::Auto,
        };
        self.profile = Some(profile.token().to_string());

        if let Some(components) = &mut self.components {
            dedup_ignore_case(components);
        }
        if let Some(locales) = &mut self.locales {
            dedup_ignore_case(locales);
        }

        let requests = self.resolve_slim_down(ctx, caps, sink)?;

        let global_optimization =
            ctx.global_optimization() || requests.enable_global_optimization;
        self.resolve_disk_footprint(global_optimization, caps, sink)?;

        Ok(requests)
    }

    fn resolve_slim_down(
        &mut self,
        ctx: &ProjectContext,
        caps: &Capabilities,
        sink: &mut dyn WarningSink,
    ) -> Result<ContextRequests, ConfigError> {
        if self.slim_down.as_ref().is_some_and(|slim| !slim.is_defined()) {
            self.slim_down = None;
        }

        let Some(slim_down) = self.slim_down.as_mut() else {
            return Ok(ContextRequests::none());
        };

        if !caps.supports(Feature::SlimDown) {
            sink.warn(ConfigWarning::SlimDownUnsupported);
            self.slim_down = None;
            return Ok(ContextRequests::none());
        }

        slim_down.fill_defaults(ctx)?;
        Ok(ContextRequests {
            enable_global_optimization: true,
        })
    }

    /// Check disk footprint reduction against the target and the already
    /// resolved global optimizer flag. Unusable modes are cleared with a warning.
    pub fn resolve_disk_footprint(
        &mut self,
        global_optimization: bool,
        caps: &Capabilities,
        sink: &mut dyn WarningSink,
    ) -> Result<(), ConfigError> {
        let Some(token) = &self.disk_footprint_reduction else {
            return Ok(());
        };
        let mode: DiskFootprintReduction = parse_token(token)?;

        if !caps.supports(Feature::DiskFootprintReduction) {
            sink.warn(ConfigWarning::DiskFootprintReductionUnsupported {
                mode: mode.to_string(),
            });
            self.disk_footprint_reduction = None;
        } else if !global_optimization {
            sink.warn(ConfigWarning::DiskFootprintReductionRequiresGlobalOptimizer {
                mode: mode.to_string(),
            });
            self.disk_footprint_reduction = None;
        } else {
            self.disk_footprint_reduction = Some(mode.token().to_string());
        }

        Ok(())
    }

    /// The compact profile, if recognizable.
    pub fn compact_profile(&self) -> Option<CompactProfile> {
        self.profile.as_deref().and_then(try_parse_token)
    }
}

/// Remove case-insensitive duplicates, keeping the first spelling.
fn dedup_ignore_case(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.to_lowercase()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{enterprise_caps, standard_caps, test_context};

    #[test]
    fn test_defaults_profile_to_auto() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig::default();
        let requests = runtime
            .fill_defaults(&ctx, &standard_caps(), &mut Vec::new())
            .unwrap();
        assert_eq!(runtime.profile.as_deref(), Some("auto"));
        assert!(requests.is_empty());
    }

    #[test]
    fn test_unsupported_flavor_fails() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            flavor: Some("server".to_string()),
            ..Default::default()
        };
        let err = runtime
            .fill_defaults(&ctx, &standard_caps(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.key(), "UnsupportedRuntimeFlavor");
    }

    #[test]
    fn test_unknown_flavor_fails() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            flavor: Some("turbo".to_string()),
            ..Default::default()
        };
        let err = runtime
            .fill_defaults(&ctx, &enterprise_caps(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.key(), "UnknownEnumToken");
        assert_eq!(err.params()[0], "turbo");
    }

    #[test]
    fn test_location_requires_capability() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            location: Some("rt".to_string()),
            ..Default::default()
        };
        let err = runtime
            .fill_defaults(&ctx, &standard_caps(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.key(), "ChangeRtLocationUnavailable");

        let mut runtime = RuntimeConfig {
            location: Some("rt".to_string()),
            ..Default::default()
        };
        runtime
            .fill_defaults(&ctx, &enterprise_caps(), &mut Vec::new())
            .unwrap();
    }

    #[test]
    fn test_compact_profile_requires_capability() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            profile: Some("compact1".to_string()),
            ..Default::default()
        };
        let err = runtime
            .fill_defaults(&ctx, &standard_caps(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.key(), "CompactProfilesNotSupported");
        assert!(err.to_string().contains("compact1"));
    }

    #[test]
    fn test_auto_and_full_always_accepted() {
        let ctx = test_context("demo");
        for token in ["auto", "FULL"] {
            let mut runtime = RuntimeConfig {
                profile: Some(token.to_string()),
                ..Default::default()
            };
            runtime
                .fill_defaults(&ctx, &standard_caps(), &mut Vec::new())
                .unwrap();
        }
    }

    #[test]
    fn test_empty_slim_down_is_dropped() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            slim_down: Some(SlimDown::default()),
            ..Default::default()
        };
        let requests = runtime
            .fill_defaults(&ctx, &enterprise_caps(), &mut Vec::new())
            .unwrap();
        assert_eq!(runtime.slim_down, None);
        assert!(!requests.enable_global_optimization);
    }

    #[test]
    fn test_slim_down_enables_global_optimization() {
        let mut ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            slim_down: Some(SlimDown {
                detached_base_url: Some("https://cdn.example.com/demo/".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let requests = runtime
            .fill_defaults(&ctx, &enterprise_caps(), &mut Vec::new())
            .unwrap();
        assert!(requests.enable_global_optimization);

        ctx.apply(requests);
        assert!(ctx.global_optimization());

        let slim = runtime.slim_down.unwrap();
        assert_eq!(slim.detached_package.as_deref(), Some("demo.pkl"));
    }

    #[test]
    fn test_slim_down_requires_base_url() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            slim_down: Some(SlimDown {
                detach_all: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = runtime
            .fill_defaults(&ctx, &enterprise_caps(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.key(), "DetachedBaseUrlNotSet");
    }

    #[test]
    fn test_slim_down_rejects_malformed_url() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            slim_down: Some(SlimDown {
                detached_base_url: Some("not a url".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = runtime
            .fill_defaults(&ctx, &enterprise_caps(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.key(), "InvalidDetachedBaseUrl");
    }

    #[test]
    fn test_unsupported_slim_down_is_dropped_with_warning() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            slim_down: Some(SlimDown {
                detached_base_url: Some("https://cdn.example.com/".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut warnings = Vec::new();
        let requests = runtime
            .fill_defaults(&ctx, &standard_caps(), &mut warnings)
            .unwrap();
        assert_eq!(runtime.slim_down, None);
        assert!(requests.is_empty());
        assert_eq!(warnings, vec![ConfigWarning::SlimDownUnsupported]);
    }

    #[test]
    fn test_disk_footprint_cleared_without_global_optimization() {
        let ctx = test_context("demo");
        for mode in ["none", "medium", "high-memory", "high-disk"] {
            let mut runtime = RuntimeConfig {
                disk_footprint_reduction: Some(mode.to_string()),
                ..Default::default()
            };
            let mut warnings = Vec::new();
            runtime
                .fill_defaults(&ctx, &enterprise_caps(), &mut warnings)
                .unwrap();
            assert_eq!(runtime.disk_footprint_reduction, None);
            assert_eq!(
                warnings,
                vec![ConfigWarning::DiskFootprintReductionRequiresGlobalOptimizer {
                    mode: mode.to_string()
                }]
            );
        }
    }

    #[test]
    fn test_disk_footprint_kept_with_global_optimization() {
        let ctx = test_context("demo").with_global_optimization(true);
        let mut runtime = RuntimeConfig {
            disk_footprint_reduction: Some("HIGH_MEMORY".to_string()),
            ..Default::default()
        };
        let mut warnings = Vec::new();
        runtime
            .fill_defaults(&ctx, &enterprise_caps(), &mut warnings)
            .unwrap();
        assert_eq!(runtime.disk_footprint_reduction.as_deref(), Some("high-memory"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_slim_down_in_same_pass_unlocks_disk_footprint() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            disk_footprint_reduction: Some("high-disk".to_string()),
            slim_down: Some(SlimDown {
                detached_base_url: Some("https://cdn.example.com/".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut warnings = Vec::new();
        runtime
            .fill_defaults(&ctx, &enterprise_caps(), &mut warnings)
            .unwrap();
        assert_eq!(runtime.disk_footprint_reduction.as_deref(), Some("high-disk"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_disk_footprint_unsupported_warns() {
        let ctx = test_context("demo").with_global_optimization(true);
        let mut runtime = RuntimeConfig {
            disk_footprint_reduction: Some("medium".to_string()),
            ..Default::default()
        };
        let mut warnings = Vec::new();
        runtime
            .fill_defaults(&ctx, &standard_caps(), &mut warnings)
            .unwrap();
        assert_eq!(runtime.disk_footprint_reduction, None);
        assert_eq!(warnings[0].key(), "DiskFootprintReductionUnsupported");
    }

    #[test]
    fn test_unknown_disk_footprint_fails() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            disk_footprint_reduction: Some("extreme".to_string()),
            ..Default::default()
        };
        let err = runtime
            .fill_defaults(&ctx, &enterprise_caps(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.key(), "UnknownEnumToken");
    }

    #[test]
    fn test_components_deduplicated() {
        let ctx = test_context("demo");
        let mut runtime = RuntimeConfig {
            components: Some(vec!["jce".into(), "JCE".into(), "jdbc".into()]),
            locales: Some(vec!["en".into(), "de".into(), "EN".into()]),
            ..Default::default()
        };
        runtime
            .fill_defaults(&ctx, &enterprise_caps(), &mut Vec::new())
            .unwrap();
        assert_eq!(runtime.components, Some(vec!["jce".to_string(), "jdbc".to_string()]));
        assert_eq!(runtime.locales, Some(vec!["en".to_string(), "de".to_string()]));
        assert_eq!(runtime.compact_profile(), Some(CompactProfile::Auto));
    }
}
