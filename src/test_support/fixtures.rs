//! On-disk fixtures for validators that check host paths.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::core::project::ProjectContext;

/// A temporary project directory and the context rooted at it.
///
/// Holds `icon.ico` and `readme.txt` files and an `assets/` folder. The
/// directory is removed when the fixture is dropped.
pub struct ScratchProject {
    /// Keeps the directory alive
    pub dir: TempDir,

    /// Context with `base_dir` set to the directory
    pub context: ProjectContext,
}

impl ScratchProject {
    /// The project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

/// Create a scratch project named `name`.
pub fn scratch_project(name: &str) -> ScratchProject {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("icon.ico"), b"\0\0\x01\0").unwrap();
    fs::write(dir.path().join("readme.txt"), "read me").unwrap();
    fs::create_dir(dir.path().join("assets")).unwrap();

    let context = ProjectContext::new(name, dir.path());
    ScratchProject { dir, context }
}

/// A minimal manifest for `name` at version 1.0.0.
pub fn minimal_manifest(name: &str) -> String {
    format!(
        r#"[project]
name = "{name}"
version = "1.0.0"
"#
    )
}
