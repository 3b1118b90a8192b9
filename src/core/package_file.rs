//! References to host files placed into the application package.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::core::tokens::{parse_token, token_enum, TokenEnum};

token_enum! {
    /// What a package file reference must point at.
    pub enum PackageFileKind: "kind" {
        /// Either a file or a folder
        Auto => "auto",
        /// A regular file
        File => "file",
        /// A directory
        Folder => "folder",
    }
}

/// Package path used when none is given.
pub const PACKAGE_ROOT: &str = "/";

/// A host file or folder and where it lands in the package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PackageFile {
    /// `auto`, `file` or `folder` (default `auto`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Path on the build host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Directory inside the package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_path: Option<String>,
}

impl PackageFile {
    /// Reference a host path of the given kind.
    pub fn new(kind: PackageFileKind, path: impl Into<PathBuf>) -> Self {
        PackageFile {
            kind: Some(kind.token().to_string()),
            path: Some(path.into()),
            package_path: None,
        }
    }

    /// Reference a regular file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        PackageFile::new(PackageFileKind::File, path)
    }

    /// Reference a folder.
    pub fn folder(path: impl Into<PathBuf>) -> Self {
        PackageFile::new(PackageFileKind::Folder, path)
    }

    /// Set the location inside the package.
    pub fn with_package_path(mut self, package_path: impl Into<String>) -> Self {
        self.package_path = Some(package_path.into());
        self
    }

    /// Check if either the host path or the package path is set.
    pub fn is_defined(&self) -> bool {
        self.path.is_some() || self.package_path.is_some()
    }

    /// The resolved kind. Unknown tokens fail.
    pub fn file_kind(&self) -> Result<PackageFileKind, ConfigError> {
        match &self.kind {
            Some(token) => parse_token(token),
            None => Ok(PackageFileKind::Auto),
        }
    }

    /// Make a relative host path relative to `base_dir`.
    pub fn resolve_against(&mut self, base_dir: &Path) {
        if let Some(path) = &self.path {
            if path.is_relative() {
                self.path = Some(base_dir.join(path));
            }
        }
    }

    /// Check the host path and default the package path.
    ///
    /// Does nothing for an undefined reference. `not_exist_key` is the message key
    /// reported when the host path is missing, `label` names the referencing field.
    pub fn validate(&mut self, not_exist_key: &'static str, label: &str) -> Result<(), ConfigError> {
        if !self.is_defined() {
            return Ok(());
        }

        let kind = self.file_kind()?;
        self.kind = Some(kind.token().to_string());

        if let Some(path) = &self.path {
            let absolute = absolute(path);
            let metadata = match fs::metadata(&absolute) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(ConfigError::FileDoesNotExist {
                        key: not_exist_key,
                        path: absolute,
                        label: label.to_string(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::FileAccess {
                        path: absolute,
                        label: label.to_string(),
                        source: e,
                    });
                }
            };

            match kind {
                PackageFileKind::File if !metadata.is_file() => {
                    return Err(ConfigError::NotAFile {
                        path: absolute,
                        label: label.to_string(),
                    });
                }
                PackageFileKind::Folder if !metadata.is_dir() => {
                    return Err(ConfigError::NotAFolder {
                        path: absolute,
                        label: label.to_string(),
                    });
                }
                _ => {}
            }
        }

        if self.package_path.is_none() {
            self.package_path = Some(PACKAGE_ROOT.to_string());
        }

        Ok(())
    }

    /// Where the reference ends up inside the package.
    ///
    /// Empty for an undefined reference. Meant to be called after [`validate`],
    /// which guarantees the package path is set.
    ///
    /// [`validate`]: PackageFile::validate
    pub fn location_in_package(&self) -> String {
        if !self.is_defined() {
            return String::new();
        }

        let package_path = self.package_path.as_deref().unwrap_or(PACKAGE_ROOT);
        match &self.path {
            Some(path) => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if package_path.ends_with('/') {
                    format!("{}{}", package_path, file_name)
                } else {
                    format!("{}/{}", package_path, file_name)
                }
            }
            None => package_path.to_string(),
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("readme.txt");
        fs::write(&file, "hello").unwrap();
        let folder = tmp.path().join("assets");
        fs::create_dir(&folder).unwrap();
        (tmp, file, folder)
    }

    #[test]
    fn test_undefined_is_noop() {
        let mut pf = PackageFile::default();
        pf.validate("PackageFileDoesNotExist", "package-files[0]")
            .unwrap();
        assert_eq!(pf, PackageFile::default());
        assert_eq!(pf.location_in_package(), "");
    }

    #[test]
    fn test_file_kind_accepts_regular_file() {
        let (_tmp, file, _) = scratch();
        let mut pf = PackageFile::file(&file);
        pf.validate("PackageFileDoesNotExist", "package-files[0]")
            .unwrap();
        assert_eq!(pf.package_path.as_deref(), Some("/"));
        assert_eq!(pf.location_in_package(), "/readme.txt");
    }

    #[test]
    fn test_file_kind_rejects_directory() {
        let (_tmp, _, folder) = scratch();
        let mut pf = PackageFile::file(&folder);
        let err = pf
            .validate("PackageFileDoesNotExist", "package-files[0]")
            .unwrap_err();
        assert_eq!(err.key(), "NotAFile");
        assert!(err.to_string().contains(&folder.display().to_string()));
    }

    #[test]
    fn test_folder_kind_rejects_regular_file() {
        let (_tmp, file, _) = scratch();
        let mut pf = PackageFile::folder(&file);
        let err = pf
            .validate("PackageFileDoesNotExist", "package-files[0]")
            .unwrap_err();
        assert_eq!(err.key(), "NotAFolder");
        assert!(err.to_string().contains(&file.display().to_string()));
    }

    #[test]
    fn test_auto_kind_accepts_both() {
        let (_tmp, file, folder) = scratch();
        for path in [file, folder] {
            let mut pf = PackageFile::new(PackageFileKind::Auto, path);
            pf.validate("PackageFileDoesNotExist", "package-files[0]")
                .unwrap();
        }
    }

    #[test]
    fn test_missing_path_uses_caller_key() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("gone.dll");
        let mut pf = PackageFile::file(&missing);
        let err = pf.validate("IconFileDoesNotExist", "icon").unwrap_err();
        assert_eq!(err.key(), "IconFileDoesNotExist");
        assert_eq!(err.params(), vec![missing.display().to_string(), "icon".to_string()]);
        assert_eq!(pf.package_path, None);
    }

    #[test]
    fn test_unknown_kind_fails() {
        let mut pf = PackageFile {
            kind: Some("symlink".to_string()),
            path: None,
            package_path: Some("/lib".to_string()),
        };
        let err = pf.validate("PackageFileDoesNotExist", "package-files[0]").unwrap_err();
        assert_eq!(err.key(), "UnknownEnumToken");
    }

    #[test]
    fn test_location_never_doubles_slash() {
        let (_tmp, file, _) = scratch();
        for package_path in ["/docs", "/docs/"] {
            let mut pf = PackageFile::file(&file).with_package_path(package_path);
            pf.validate("PackageFileDoesNotExist", "package-files[0]")
                .unwrap();
            assert_eq!(pf.location_in_package(), "/docs/readme.txt");
        }
    }

    #[test]
    fn test_package_path_only() {
        let mut pf = PackageFile {
            kind: None,
            path: None,
            package_path: Some("/lib/ext".to_string()),
        };
        pf.validate("PackageFileDoesNotExist", "package-files[0]")
            .unwrap();
        assert_eq!(pf.location_in_package(), "/lib/ext");
    }

    #[test]
    fn test_resolve_against_base_dir() {
        let (tmp, _, _) = scratch();
        let mut pf = PackageFile::file("readme.txt");
        pf.resolve_against(tmp.path());
        pf.validate("PackageFileDoesNotExist", "package-files[0]")
            .unwrap();
        assert_eq!(pf.path, Some(tmp.path().join("readme.txt")));
    }
}
