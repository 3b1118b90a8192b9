//! `nativepack check` command

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::{CheckArgs, OutputFormat};
use crate::commands::resolve_config;
use nativepack::core::{ProjectConfig, TracingSink, MANIFEST_NAME};
use nativepack::ops::{normalize, CheckReport, NormalizeOptions};
use nativepack::util::diagnostic;

/// Split the `PATH` argument into the manifest file and the project root.
pub fn locate_manifest(path: Option<PathBuf>) -> (PathBuf, PathBuf) {
    let path = path.unwrap_or_else(|| PathBuf::from("."));
    if path.is_file() {
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        (path, root)
    } else {
        (path.join(MANIFEST_NAME), path)
    }
}

pub fn execute(args: CheckArgs, color: bool) -> Result<()> {
    let (manifest_path, root) = locate_manifest(args.path);
    let root = root.canonicalize().unwrap_or(root);

    let project = ProjectConfig::load(&manifest_path)?;
    let config = resolve_config(&root, &args.target);
    let caps = config.to_capabilities()?;

    let options = NormalizeOptions {
        no_local_profiling: args.no_local_profiling || config.profiling.no_local_profiling,
        ..Default::default()
    };

    let mut sink = TracingSink::new();
    let normalized = match normalize(project, &root, &caps, &options, &mut sink) {
        Ok(normalized) => normalized,
        Err(e) => {
            let mut diag = e.to_diagnostic();
            if diag.location.is_none() {
                diag = diag.with_location(&manifest_path);
            }
            diagnostic::emit(&diag, color);
            std::process::exit(1);
        }
    };

    let report = CheckReport::new(&normalized, &caps, sink.warnings());
    match args.format {
        OutputFormat::Text => print!("{}", report.to_text()?),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_manifest_from_directory() {
        let tmp = TempDir::new().unwrap();
        let (manifest, root) = locate_manifest(Some(tmp.path().to_path_buf()));
        assert_eq!(manifest, tmp.path().join(MANIFEST_NAME));
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn test_locate_manifest_from_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("custom.toml");
        std::fs::write(&file, "").unwrap();
        let (manifest, root) = locate_manifest(Some(file.clone()));
        assert_eq!(manifest, file);
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn test_locate_manifest_default() {
        let (manifest, root) = locate_manifest(None);
        assert_eq!(manifest, PathBuf::from(".").join(MANIFEST_NAME));
        assert_eq!(root, PathBuf::from("."));
    }
}
