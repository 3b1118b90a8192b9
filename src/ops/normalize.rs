//! The single defaulting and validation pass over a project configuration.
//!
//! Sections are visited in a fixed order. Later sections may read what earlier
//! ones resolved (most notably the global optimizer flag that slim-down turns
//! on), so the order is part of the contract:
//!
//! 1. project identity, producing the [`ProjectContext`]
//! 2. application kind, packaging, stack trace and inlining gates
//! 3. runtime, whose context requests are applied right away
//! 4. execution profiles
//! 5. outdated profile warnings
//! 6. icon, splash and package files
//! 7. installer
//! 8. Windows service
//! 9. trial and version info
//!
//! The first fatal error ends the pass. The configuration is taken by value, so
//! a half-normalized tree is never handed back.

use std::path::Path;
use std::time::SystemTime;

use crate::core::capabilities::Capabilities;
use crate::core::error::{ConfigError, ConfigWarning, WarningSink};
use crate::core::manifest::{PackagingType, ProjectConfig, VersionInfo};
use crate::core::project::{ApplicationKind, ProjectContext};
use crate::core::service::ServiceConfig;

/// Options for a normalization pass.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Forbid profiling on this machine regardless of the configuration
    pub no_local_profiling: bool,

    /// Reference time for profile staleness checks
    pub now: SystemTime,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            no_local_profiling: false,
            now: SystemTime::now(),
        }
    }
}

/// A fully defaulted and validated project.
#[derive(Debug, Clone)]
pub struct NormalizedProject {
    /// The completed configuration tree
    pub config: ProjectConfig,

    /// The final project context
    pub context: ProjectContext,

    /// The resolved packaging type
    pub packaging: PackagingType,
}

/// Default and validate `config` for the target described by `caps`.
///
/// Relative paths in the configuration are resolved against `base_dir`.
pub fn normalize(
    mut config: ProjectConfig,
    base_dir: &Path,
    caps: &Capabilities,
    options: &NormalizeOptions,
    sink: &mut dyn WarningSink,
) -> Result<NormalizedProject, ConfigError> {
    let mut ctx = config.resolve_context(base_dir)?;
    tracing::debug!("normalizing `{}` ({})", ctx.name, ctx.kind);

    config.check_application_kind(&ctx, caps)?;
    let packaging = config.resolve_packaging(caps)?;
    config.resolve_code_options(caps)?;

    let requests = config.runtime.fill_defaults(&ctx, caps, sink)?;
    ctx.apply(requests);

    config
        .profiles
        .fill_defaults(&ctx, caps, options.no_local_profiling, sink);
    config.profiles.warn_if_outdated(options.now, sink);

    config.validate_resources(&ctx, caps, sink)?;

    if packaging == PackagingType::ExcelsiorInstaller {
        let installer = config.installer.get_or_insert_with(Default::default);
        installer.fill_defaults(&ctx, caps)?;
    } else if config.installer.is_some() {
        sink.warn(ConfigWarning::InstallerSectionIgnored {
            packaging: packaging.to_string(),
        });
        config.installer = None;
    }

    if ctx.kind == ApplicationKind::WindowsService {
        let service = config.service.get_or_insert_with(ServiceConfig::default);
        service.fill_defaults(&ctx)?;
    } else if config.service.is_some() {
        sink.warn(ConfigWarning::ServiceSectionIgnored {
            kind: ctx.kind.to_string(),
        });
        config.service = None;
    }

    if let Some(trial) = &config.trial {
        trial.validate(caps)?;
    }
    config
        .version_info
        .get_or_insert_with(VersionInfo::default)
        .fill_defaults(&ctx);

    config.global_optimizer = ctx.global_optimization();

    tracing::info!(
        "configuration for `{}` is valid ({} packaging)",
        ctx.name,
        packaging
    );

    Ok(NormalizedProject {
        config,
        context: ctx,
        packaging,
    })
}
