//! Implementation of `nativepack init`.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::manifest::MANIFEST_NAME;
use crate::core::project::ApplicationKind;

/// Options for initializing a project.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Project name
    pub name: String,

    /// Application kind
    pub kind: ApplicationKind,
}

/// Generate the contents of a fresh manifest.
pub fn generate_manifest(opts: &InitOptions) -> String {
    let mut manifest = format!(
        r#"[project]
name = "{name}"
version = "0.1.0"
kind = "{kind}"

[runtime]
profile = "auto"

[profiles]
profile-locally = true
"#,
        name = opts.name,
        kind = opts.kind,
    );

    if opts.kind == ApplicationKind::WindowsService {
        manifest.push_str(&format!(
            r#"
[service]
display-name = "{name}"
startup-type = "automatic"
"#,
            name = opts.name
        ));
    }

    manifest
}

/// Write a new manifest into `path`, creating the directory if needed.
pub fn init_project(path: &Path, opts: &InitOptions) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }

    let manifest_path = path.join(MANIFEST_NAME);
    if manifest_path.exists() {
        bail!("`{}` already exists in `{}`", MANIFEST_NAME, path.display());
    }

    fs::write(&manifest_path, generate_manifest(opts))
        .with_context(|| format!("failed to write {}", MANIFEST_NAME))?;

    tracing::info!("created {}", manifest_path.display());
    Ok(())
}
