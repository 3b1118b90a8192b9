//! Nativepack.toml schema - the whole packaging configuration tree.
//!
//! Every field is optional as written by the user. The tree is completed in place
//! by [`crate::ops::normalize`]; the per-section routines here are the steps it
//! runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::capabilities::{Capabilities, Feature, TargetOs};
use crate::core::error::{ConfigError, ConfigWarning, WarningSink};
use crate::core::installer::InstallerConfig;
use crate::core::package_file::{PackageFile, PackageFileKind};
use crate::core::profiles::ExecProfiles;
use crate::core::project::{default_build_dir, default_resource_dir, ApplicationKind, ProjectContext};
use crate::core::runtime::RuntimeConfig;
use crate::core::service::ServiceConfig;
use crate::core::tokens::{parse_token, token_enum, TokenEnum};

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Nativepack.toml";

token_enum! {
    /// How the finished application is delivered.
    pub enum PackagingType: "packaging" {
        None => "none",
        Zip => "zip",
        TarGz => "tar-gz",
        ExcelsiorInstaller => "excelsior-installer",
        OsxAppBundle => "osx-app-bundle",
        /// The platform's own bundle format, resolved per OS
        NativeBundle => "native-bundle",
    }
}

token_enum! {
    /// How much stack trace information the executable keeps.
    pub enum StackTraceSupport: "stack-trace-support" {
        Minimal => "minimal",
        Full => "full",
        None => "none",
    }
}

token_enum! {
    /// Inlining policy of the native compiler.
    pub enum InlineExpansion: "inline-expansion" {
        Aggressive => "aggressive",
        VeryAggressive => "very-aggressive",
        Medium => "medium",
        Low => "low",
        TinyMethodsOnly => "tiny-methods-only",
    }
}

/// Identity and layout from the `[project]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectSection {
    /// Project name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Organization identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Project version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Application kind (default `plain`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Executable base name (default: name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,

    /// Artifact base name (default: name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_name: Option<String>,

    /// Build directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<PathBuf>,

    /// Resource directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_dir: Option<PathBuf>,

    /// Package assembly directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_dir: Option<PathBuf>,
}

/// Time-limited build settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TrialConfig {
    /// Days after build until expiry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_in_days: Option<u32>,

    /// Fixed expiry date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<String>,

    /// Message shown once expired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_message: Option<String>,
}

impl TrialConfig {
    /// Check the trial settings against the target.
    pub fn validate(&self, caps: &Capabilities) -> Result<(), ConfigError> {
        if !caps.supports(Feature::TrialVersion) {
            return Err(ConfigError::TrialVersionUnsupported);
        }
        match (self.expire_in_days, &self.expire_date) {
            (Some(_), Some(_)) => return Err(ConfigError::TrialExpiryAmbiguous),
            (None, None) => return Err(ConfigError::TrialExpiryNotSet),
            _ => {}
        }
        if self.expire_message.as_deref().map_or(true, |m| m.trim().is_empty()) {
            return Err(ConfigError::MissingField {
                field: "trial.expire-message".to_string(),
            });
        }
        Ok(())
    }
}

/// Version resource embedded into the executable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct VersionInfo {
    /// Company name (default: group id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    /// Product name (default: project name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    /// Four-part numeric version (default: derived from the project version)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Copyright notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    /// File description (default: product)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VersionInfo {
    /// Fill in defaults from the project identity.
    pub fn fill_defaults(&mut self, ctx: &ProjectContext) {
        let company = self
            .company
            .get_or_insert_with(|| ctx.group_id.clone())
            .clone();
        let product = self.product.get_or_insert_with(|| ctx.name.clone()).clone();
        if self.version.is_none() {
            self.version = Some(four_part_version(&ctx.version));
        }
        if self.copyright.is_none() {
            self.copyright = Some(format!("Copyright \u{a9} {}", company));
        }
        if self.description.is_none() {
            self.description = Some(product);
        }
    }
}

/// A trimmed value, or `None` when unset or blank.
fn non_blank(value: &Option<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => None,
    }
}

/// Derive an `a.b.c.d` version: the first run of digits of each dot-separated
/// component, missing components are `0`, extra ones are dropped.
pub fn four_part_version(version: &str) -> String {
    let mut parts: Vec<String> = version
        .split('.')
        .take(4)
        .map(|component| {
            let digits: String = component
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit())
                .collect();
            let trimmed = digits.trim_start_matches('0');
            if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        })
        .collect();
    parts.resize(4, "0".to_string());
    parts.join(".")
}

/// The parsed Nativepack.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Identity and layout
    pub project: ProjectSection,

    /// Packaging type (default `zip`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,

    /// Compile the application and runtime together
    pub global_optimizer: bool,

    /// Stack trace support (default `minimal`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace_support: Option<String>,

    /// Inline expansion policy (default `aggressive`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_expansion: Option<String>,

    /// Executable icon (Windows only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<PackageFile>,

    /// Splash screen image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splash: Option<PackageFile>,

    /// Extra files added to the package
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub package_files: Vec<PackageFile>,

    /// Runtime selection
    pub runtime: RuntimeConfig,

    /// Execution profiles
    pub profiles: ExecProfiles,

    /// Windows service settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceConfig>,

    /// Installer settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer: Option<InstallerConfig>,

    /// Trial version settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial: Option<TrialConfig>,

    /// Version resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_info: Option<VersionInfo>,
}

impl ProjectConfig {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        Self::from_str(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse a manifest from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self> {
        let config: ProjectConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize configuration")
    }

    /// Resolve the `[project]` section into a context and write the defaults back.
    pub fn resolve_context(&mut self, base_dir: &Path) -> Result<ProjectContext, ConfigError> {
        let section = &mut self.project;

        let name = match section.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(ConfigError::MissingField {
                    field: "project.name".to_string(),
                })
            }
        };
        let version = match section.version.as_deref().map(str::trim) {
            Some(version) if !version.is_empty() => version.to_string(),
            _ => {
                return Err(ConfigError::MissingField {
                    field: "project.version".to_string(),
                })
            }
        };

        let kind: ApplicationKind = match &section.kind {
            Some(token) => parse_token(token)?,
            None => ApplicationKind::Plain,
        };
        section.kind = Some(kind.token().to_string());

        let absolute = |path: &PathBuf| {
            if path.is_relative() {
                base_dir.join(path)
            } else {
                path.clone()
            }
        };

        let build_dir = section
            .build_dir
            .as_ref()
            .map(absolute)
            .unwrap_or_else(|| default_build_dir(base_dir));
        let resource_dir = section
            .resource_dir
            .as_ref()
            .map(absolute)
            .unwrap_or_else(|| default_resource_dir(base_dir));
        let package_dir = section
            .package_dir
            .as_ref()
            .map(absolute)
            .unwrap_or_else(|| build_dir.join("app"));

        let mut ctx = ProjectContext::new(name.clone(), base_dir)
            .with_kind(kind)
            .with_global_optimization(self.global_optimizer);
        ctx.group_id = section.group_id.clone().unwrap_or_default();
        ctx.version = version.clone();
        ctx.output_name = non_blank(&section.output_name).unwrap_or_else(|| name.clone());
        ctx.artifact_name = non_blank(&section.artifact_name).unwrap_or_else(|| name.clone());
        ctx.build_dir = build_dir.clone();
        ctx.resource_dir = resource_dir.clone();
        ctx.package_dir = package_dir.clone();

        section.name = Some(name);
        section.version = Some(version);
        section.output_name = Some(ctx.output_name.clone());
        section.artifact_name = Some(ctx.artifact_name.clone());
        section.build_dir = Some(build_dir);
        section.resource_dir = Some(resource_dir);
        section.package_dir = Some(package_dir);

        Ok(ctx)
    }

    /// Check that the target can build this kind of application.
    pub fn check_application_kind(
        &self,
        ctx: &ProjectContext,
        caps: &Capabilities,
    ) -> Result<(), ConfigError> {
        let required = match ctx.kind {
            ApplicationKind::Plain => return Ok(()),
            ApplicationKind::WindowsService => {
                if caps.target_os() != TargetOs::Windows {
                    return Err(ConfigError::WindowsServiceRequiresWindows {
                        os: caps.target_os().to_string(),
                    });
                }
                Feature::WindowsServices
            }
            ApplicationKind::Tomcat => Feature::Tomcat,
            ApplicationKind::SpringBoot => Feature::SpringBoot,
            ApplicationKind::DynamicLibrary => Feature::DynamicLibrary,
        };

        if !caps.supports(required) {
            return Err(ConfigError::UnsupportedApplicationKind {
                kind: ctx.kind.to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the packaging type for the target OS.
    pub fn resolve_packaging(&mut self, caps: &Capabilities) -> Result<PackagingType, ConfigError> {
        let requested: PackagingType = match &self.packaging {
            Some(token) => parse_token(token)?,
            None => PackagingType::Zip,
        };
        let os = caps.target_os();

        let packaging = match requested {
            PackagingType::NativeBundle if os == TargetOs::Osx => PackagingType::OsxAppBundle,
            PackagingType::NativeBundle if caps.supports(Feature::ExcelsiorInstaller) => {
                PackagingType::ExcelsiorInstaller
            }
            PackagingType::NativeBundle => {
                return Err(ConfigError::NativeBundleUnsupported { os: os.to_string() })
            }
            other => other,
        };

        let supported = match packaging {
            PackagingType::ExcelsiorInstaller => caps.supports(Feature::ExcelsiorInstaller),
            PackagingType::OsxAppBundle => caps.supports(Feature::OsxAppBundle),
            _ => true,
        };
        if !supported {
            return Err(ConfigError::UnsupportedPackaging {
                packaging: packaging.to_string(),
                os: os.to_string(),
            });
        }

        self.packaging = Some(packaging.token().to_string());
        Ok(packaging)
    }

    /// Resolve stack trace and inlining options.
    pub fn resolve_code_options(&mut self, caps: &Capabilities) -> Result<(), ConfigError> {
        let stack_trace: StackTraceSupport = match &self.stack_trace_support {
            Some(token) => parse_token(token)?,
            None => StackTraceSupport::Minimal,
        };
        if stack_trace == StackTraceSupport::Full && !caps.supports(Feature::StackTraceFull) {
            return Err(ConfigError::StackTraceFullUnsupported);
        }
        self.stack_trace_support = Some(stack_trace.token().to_string());

        let inline: InlineExpansion = match &self.inline_expansion {
            Some(token) => parse_token(token)?,
            None => InlineExpansion::Aggressive,
        };
        self.inline_expansion = Some(inline.token().to_string());
        Ok(())
    }

    /// Validate icon, splash and extra package files, in that order.
    pub fn validate_resources(
        &mut self,
        ctx: &ProjectContext,
        caps: &Capabilities,
        sink: &mut dyn WarningSink,
    ) -> Result<(), ConfigError> {
        if self.icon.as_ref().is_some_and(PackageFile::is_defined)
            && caps.target_os() != TargetOs::Windows
        {
            sink.warn(ConfigWarning::IconIgnored {
                os: caps.target_os().to_string(),
            });
            self.icon = None;
        }
        if let Some(icon) = &mut self.icon {
            if icon.kind.is_none() {
                icon.kind = Some(PackageFileKind::File.token().to_string());
            }
            icon.resolve_against(&ctx.base_dir);
            icon.validate("IconFileDoesNotExist", "icon")?;
        }

        if self.splash.as_ref().is_some_and(PackageFile::is_defined)
            && ctx.kind != ApplicationKind::Plain
        {
            sink.warn(ConfigWarning::SplashIgnored {
                kind: ctx.kind.to_string(),
            });
            self.splash = None;
        }
        if let Some(splash) = &mut self.splash {
            if splash.kind.is_none() {
                splash.kind = Some(PackageFileKind::File.token().to_string());
            }
            splash.resolve_against(&ctx.base_dir);
            splash.validate("SplashFileDoesNotExist", "splash")?;
        }

        for (i, file) in self.package_files.iter_mut().enumerate() {
            file.resolve_against(&ctx.base_dir);
            file.validate("PackageFileDoesNotExist", &format!("package-files[{}]", i))?;
        }

        Ok(())
    }
}
