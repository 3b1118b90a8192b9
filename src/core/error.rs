//! Configuration errors and warnings.
//!
//! Two classes of problems come out of normalization:
//! - [`ConfigError`] is fatal. It aborts the whole pass at the node that found it.
//! - [`ConfigWarning`] is a soft violation. The offending field has already been
//!   reset to a safe value and the pass keeps going.
//!
//! Both carry a stable message key plus positional parameters so a host can render
//! them through its own message catalog (see [`crate::util::diagnostic::MessageCatalog`]).
//! `Display` is only the English fallback.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// A fatal configuration error.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigError {
    #[error("unknown value `{token}` for `{field}`, expected one of: {expected}")]
    #[diagnostic(code(nativepack::config::unknown_token))]
    UnknownEnumToken {
        field: &'static str,
        token: String,
        expected: String,
    },

    #[error("unsupported installer compression level `{token}`")]
    #[diagnostic(code(nativepack::config::compression_level))]
    UnsupportedCompressionLevel { token: String },

    #[error("`{field}` must be set")]
    #[diagnostic(code(nativepack::config::missing_field))]
    MissingField { field: String },

    #[error("{label}: `{}` does not exist", .path.display())]
    #[diagnostic(code(nativepack::config::file_not_found))]
    FileDoesNotExist {
        key: &'static str,
        path: PathBuf,
        label: String,
    },

    #[error("{label}: cannot access `{}`: {source}", .path.display())]
    #[diagnostic(code(nativepack::config::file_access))]
    FileAccess {
        path: PathBuf,
        label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{label}: `{}` is not a file", .path.display())]
    #[diagnostic(code(nativepack::config::not_a_file))]
    NotAFile { path: PathBuf, label: String },

    #[error("{label}: `{}` is not a folder", .path.display())]
    #[diagnostic(code(nativepack::config::not_a_folder))]
    NotAFolder { path: PathBuf, label: String },

    #[error("runtime flavor `{flavor}` is not supported by the selected target")]
    #[diagnostic(code(nativepack::runtime::flavor))]
    UnsupportedRuntimeFlavor { flavor: String },

    #[error("changing the runtime location (`{location}`) is not available for the selected target")]
    #[diagnostic(code(nativepack::runtime::location))]
    RtLocationUnavailable { location: String },

    #[error("compact profiles are not supported by the selected target, cannot use `{profile}`")]
    #[diagnostic(code(nativepack::runtime::compact_profile))]
    CompactProfilesNotSupported { profile: String },

    #[error("slim-down requires `runtime.slim-down.detached-base-url`")]
    #[diagnostic(
        code(nativepack::runtime::detached_base_url),
        help("Set the URL the detached package will be downloaded from")
    )]
    DetachedBaseUrlNotSet,

    #[error("invalid detached base URL `{url}`: {reason}")]
    #[diagnostic(code(nativepack::runtime::detached_base_url))]
    InvalidDetachedBaseUrl { url: String, reason: String },

    #[error("a service may interact with the desktop only under the local system account, not `{log_on_type}`")]
    #[diagnostic(code(nativepack::service::desktop_interaction))]
    DesktopInteractionNotAllowed { log_on_type: String },

    #[error("service dependency #{index} is blank")]
    #[diagnostic(code(nativepack::service::dependency))]
    BlankServiceDependency { index: usize },

    #[error("application kind `{kind}` is not supported by the selected target")]
    #[diagnostic(code(nativepack::project::application_kind))]
    UnsupportedApplicationKind { kind: String },

    #[error("Windows services can only be built for Windows, the target is `{os}`")]
    #[diagnostic(code(nativepack::project::service_os))]
    WindowsServiceRequiresWindows { os: String },

    #[error("packaging `{packaging}` is not supported for `{os}`")]
    #[diagnostic(code(nativepack::project::packaging))]
    UnsupportedPackaging { packaging: String, os: String },

    #[error("`native-bundle` packaging has no counterpart on `{os}`")]
    #[diagnostic(code(nativepack::project::native_bundle))]
    NativeBundleUnsupported { os: String },

    #[error("installer option `{item}` requires advanced installer features, which the selected target lacks")]
    #[diagnostic(code(nativepack::installer::advanced))]
    AdvancedInstallerFeaturesUnsupported { item: String },

    #[error("installer compression level `{level}` is not available for the selected target")]
    #[diagnostic(code(nativepack::installer::compression))]
    InstallerCompressionUnsupported { level: String },

    #[error("installation directory type `absolute-path` requires `installer.installation-directory.path`")]
    #[diagnostic(code(nativepack::installer::installation_directory))]
    InstallationDirectoryPathNotSet,

    #[error("full stack trace support is not available for the selected target")]
    #[diagnostic(code(nativepack::project::stack_trace))]
    StackTraceFullUnsupported,

    #[error("trial versions are not available for the selected target")]
    #[diagnostic(code(nativepack::trial::unsupported))]
    TrialVersionUnsupported,

    #[error("trial version needs exactly one of `expire-in-days` and `expire-date`")]
    #[diagnostic(code(nativepack::trial::expiry))]
    TrialExpiryAmbiguous,

    #[error("trial version needs `expire-in-days` or `expire-date`")]
    #[diagnostic(code(nativepack::trial::expiry))]
    TrialExpiryNotSet,
}

impl ConfigError {
    /// Stable message key identifying this error.
    pub fn key(&self) -> &'static str {
        match self {
            ConfigError::UnknownEnumToken { .. } => "UnknownEnumToken",
            ConfigError::UnsupportedCompressionLevel { .. } => "UnsupportedCompressionLevel",
            ConfigError::MissingField { .. } => "MissingField",
            ConfigError::FileDoesNotExist { key, .. } => *key,
            ConfigError::FileAccess { .. } => "FileAccessFailed",
            ConfigError::NotAFile { .. } => "NotAFile",
            ConfigError::NotAFolder { .. } => "NotAFolder",
            ConfigError::UnsupportedRuntimeFlavor { .. } => "UnsupportedRuntimeFlavor",
            ConfigError::RtLocationUnavailable { .. } => "ChangeRtLocationUnavailable",
            ConfigError::CompactProfilesNotSupported { .. } => "CompactProfilesNotSupported",
            ConfigError::DetachedBaseUrlNotSet => "DetachedBaseUrlNotSet",
            ConfigError::InvalidDetachedBaseUrl { .. } => "InvalidDetachedBaseUrl",
            ConfigError::DesktopInteractionNotAllowed { .. } => "DesktopInteractionNotAllowed",
            ConfigError::BlankServiceDependency { .. } => "BlankServiceDependency",
            ConfigError::UnsupportedApplicationKind { .. } => "UnsupportedApplicationKind",
            ConfigError::WindowsServiceRequiresWindows { .. } => "WindowsServiceRequiresWindows",
            ConfigError::UnsupportedPackaging { .. } => "UnsupportedPackaging",
            ConfigError::NativeBundleUnsupported { .. } => "NativeBundleUnsupported",
            ConfigError::AdvancedInstallerFeaturesUnsupported { .. } => {
                "AdvancedInstallerFeaturesUnsupported"
            }
            ConfigError::InstallerCompressionUnsupported { .. } => "InstallerCompressionUnsupported",
            ConfigError::InstallationDirectoryPathNotSet => "InstallationDirectoryPathNotSet",
            ConfigError::StackTraceFullUnsupported => "StackTraceFullUnsupported",
            ConfigError::TrialVersionUnsupported => "TrialVersionUnsupported",
            ConfigError::TrialExpiryAmbiguous => "TrialExpiryAmbiguous",
            ConfigError::TrialExpiryNotSet => "TrialExpiryNotSet",
        }
    }

    /// Positional parameters for the message key, in catalog order.
    pub fn params(&self) -> Vec<String> {
        match self {
            ConfigError::UnknownEnumToken {
                field,
                token,
                expected,
            } => vec![token.clone(), field.to_string(), expected.clone()],
            ConfigError::UnsupportedCompressionLevel { token } => vec![token.clone()],
            ConfigError::MissingField { field } => vec![field.clone()],
            ConfigError::FileDoesNotExist { path, label, .. }
            | ConfigError::NotAFile { path, label }
            | ConfigError::NotAFolder { path, label } => {
                vec![path.display().to_string(), label.clone()]
            }
            ConfigError::FileAccess {
                path,
                label,
                source,
            } => vec![path.display().to_string(), label.clone(), source.to_string()],
            ConfigError::UnsupportedRuntimeFlavor { flavor } => vec![flavor.clone()],
            ConfigError::RtLocationUnavailable { location } => vec![location.clone()],
            ConfigError::CompactProfilesNotSupported { profile } => vec![profile.clone()],
            ConfigError::InvalidDetachedBaseUrl { url, reason } => {
                vec![url.clone(), reason.clone()]
            }
            ConfigError::DesktopInteractionNotAllowed { log_on_type } => {
                vec![log_on_type.clone()]
            }
            ConfigError::BlankServiceDependency { index } => vec![index.to_string()],
            ConfigError::UnsupportedApplicationKind { kind } => vec![kind.clone()],
            ConfigError::WindowsServiceRequiresWindows { os } => vec![os.clone()],
            ConfigError::UnsupportedPackaging { packaging, os } => {
                vec![packaging.clone(), os.clone()]
            }
            ConfigError::NativeBundleUnsupported { os } => vec![os.clone()],
            ConfigError::AdvancedInstallerFeaturesUnsupported { item } => vec![item.clone()],
            ConfigError::InstallerCompressionUnsupported { level } => vec![level.clone()],
            ConfigError::DetachedBaseUrlNotSet
            | ConfigError::InstallationDirectoryPathNotSet
            | ConfigError::StackTraceFullUnsupported
            | ConfigError::TrialVersionUnsupported
            | ConfigError::TrialExpiryAmbiguous
            | ConfigError::TrialExpiryNotSet => Vec::new(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string()).with_context(format!("key: {}", self.key()));

        match self {
            ConfigError::UnknownEnumToken { field, .. } => {
                diag.with_suggestion(format!("Use one of the listed values for `{}`", field))
            }
            ConfigError::FileDoesNotExist { path, .. }
            | ConfigError::NotAFile { path, .. }
            | ConfigError::NotAFolder { path, .. }
            | ConfigError::FileAccess { path, .. } => diag.with_location(path),
            ConfigError::CompactProfilesNotSupported { .. } => {
                diag.with_suggestion("Use `profile = \"auto\"` or `profile = \"full\"`")
            }
            ConfigError::DesktopInteractionNotAllowed { .. } => diag
                .with_suggestion("Set `service.log-on-type = \"local-system-account\"`")
                .with_suggestion("Or disable `service.allow-desktop-interaction`"),
            ConfigError::TrialExpiryAmbiguous | ConfigError::TrialExpiryNotSet => diag
                .with_suggestion("Set either `trial.expire-in-days` or `trial.expire-date`"),
            _ => diag,
        }
    }
}

/// A soft violation: the field was reset to a safe value and normalization went on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Local profiling was forced off because the target is cross-compiled.
    ProfileLocallyOverridden { requested: bool },
    /// Slim-down was dropped because the target cannot do it.
    SlimDownUnsupported,
    /// Disk footprint reduction was cleared because the target cannot do it.
    DiskFootprintReductionUnsupported { mode: String },
    /// Disk footprint reduction was cleared because the global optimizer is off.
    DiskFootprintReductionRequiresGlobalOptimizer { mode: String },
    /// A derived execution profile is older than the staleness threshold.
    OutdatedProfile { path: PathBuf, days: u32 },
    /// The executable icon is only applied on Windows.
    IconIgnored { os: String },
    /// Splash screens are only applied to plain applications.
    SplashIgnored { kind: String },
    /// An installer section is present but the packaging does not use it.
    InstallerSectionIgnored { packaging: String },
    /// A service section is present but the application is not a service.
    ServiceSectionIgnored { kind: String },
}

impl ConfigWarning {
    /// Stable message key identifying this warning.
    pub fn key(&self) -> &'static str {
        match self {
            ConfigWarning::ProfileLocallyOverridden { .. } => "ProfileLocallyOverridden",
            ConfigWarning::SlimDownUnsupported => "SlimDownUnsupported",
            ConfigWarning::DiskFootprintReductionUnsupported { .. } => {
                "DiskFootprintReductionUnsupported"
            }
            ConfigWarning::DiskFootprintReductionRequiresGlobalOptimizer { .. } => {
                "DiskFootprintReductionRequiresGlobalOptimizer"
            }
            ConfigWarning::OutdatedProfile { .. } => "OutdatedProfile",
            ConfigWarning::IconIgnored { .. } => "IconIgnored",
            ConfigWarning::SplashIgnored { .. } => "SplashIgnored",
            ConfigWarning::InstallerSectionIgnored { .. } => "InstallerSectionIgnored",
            ConfigWarning::ServiceSectionIgnored { .. } => "ServiceSectionIgnored",
        }
    }

    /// Positional parameters for the message key.
    pub fn params(&self) -> Vec<String> {
        match self {
            ConfigWarning::ProfileLocallyOverridden { requested } => vec![requested.to_string()],
            ConfigWarning::SlimDownUnsupported => Vec::new(),
            ConfigWarning::DiskFootprintReductionUnsupported { mode }
            | ConfigWarning::DiskFootprintReductionRequiresGlobalOptimizer { mode } => {
                vec![mode.clone()]
            }
            ConfigWarning::OutdatedProfile { path, days } => {
                vec![path.display().to_string(), days.to_string()]
            }
            ConfigWarning::IconIgnored { os } => vec![os.clone()],
            ConfigWarning::SplashIgnored { kind } => vec![kind.clone()],
            ConfigWarning::InstallerSectionIgnored { packaging } => vec![packaging.clone()],
            ConfigWarning::ServiceSectionIgnored { kind } => vec![kind.clone()],
        }
    }

    /// Convert to a warning diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::warning(self.to_string()).with_context(format!("key: {}", self.key()))
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::ProfileLocallyOverridden { requested } => write!(
                f,
                "`profiles.profile-locally = {}` ignored: profiling cannot run locally when cross-compiling",
                requested
            ),
            ConfigWarning::SlimDownUnsupported => write!(
                f,
                "runtime slim-down is not supported by the selected target, ignoring it"
            ),
            ConfigWarning::DiskFootprintReductionUnsupported { mode } => write!(
                f,
                "disk footprint reduction `{}` is not supported by the selected target, ignoring it",
                mode
            ),
            ConfigWarning::DiskFootprintReductionRequiresGlobalOptimizer { mode } => write!(
                f,
                "disk footprint reduction `{}` only applies with the global optimizer enabled, ignoring it",
                mode
            ),
            ConfigWarning::OutdatedProfile { path, days } => write!(
                f,
                "execution profile `{}` is older than {} days, consider re-profiling",
                path.display(),
                days
            ),
            ConfigWarning::IconIgnored { os } => {
                write!(f, "executable icons are not supported on `{}`, ignoring `icon`", os)
            }
            ConfigWarning::SplashIgnored { kind } => write!(
                f,
                "splash screens are not supported for `{}` applications, ignoring `splash`",
                kind
            ),
            ConfigWarning::InstallerSectionIgnored { packaging } => write!(
                f,
                "`[installer]` is ignored because packaging is `{}`",
                packaging
            ),
            ConfigWarning::ServiceSectionIgnored { kind } => write!(
                f,
                "`[service]` is ignored because the application kind is `{}`",
                kind
            ),
        }
    }
}

/// Receiver for soft violations.
pub trait WarningSink {
    /// Report a warning. The field it names has already been reset.
    fn warn(&mut self, warning: ConfigWarning);
}

impl WarningSink for Vec<ConfigWarning> {
    fn warn(&mut self, warning: ConfigWarning) {
        self.push(warning);
    }
}

/// Sink that logs every warning through `tracing` and keeps a copy.
#[derive(Debug, Default)]
pub struct TracingSink {
    recorded: Vec<ConfigWarning>,
}

impl TracingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        TracingSink::default()
    }

    /// Warnings seen so far.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.recorded
    }

    /// Consume the sink, returning its warnings.
    pub fn into_warnings(self) -> Vec<ConfigWarning> {
        self.recorded
    }
}

impl WarningSink for TracingSink {
    fn warn(&mut self, warning: ConfigWarning) {
        tracing::warn!(key = warning.key(), "{}", warning);
        self.recorded.push(warning);
    }
}
