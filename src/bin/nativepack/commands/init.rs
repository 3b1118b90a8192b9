//! `nativepack init` command

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::InitArgs;
use nativepack::core::ApplicationKind;
use nativepack::ops::{init_project, InitOptions};

/// Determines the project name from the arguments or directory.
pub fn determine_project_name(name: &Option<String>, path: &Path) -> String {
    name.clone().unwrap_or_else(|| {
        let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        absolute
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string()
    })
}

pub fn execute(args: InitArgs) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    let name = determine_project_name(&args.name, &path);
    let kind: ApplicationKind = args.kind.parse()?;

    let opts = InitOptions {
        name: name.clone(),
        kind,
    };
    init_project(&path, &opts)?;

    eprintln!("     Initialized {} project `{}`", kind, name);

    Ok(())
}
