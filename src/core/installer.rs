//! Installer descriptor and its items.
//!
//! Most installer items are "advanced" features that older toolchains cannot
//! produce. Their presence is checked as a whole category before any single item
//! is looked at, so the error names the category rather than some nested field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::capabilities::{Capabilities, Feature};
use crate::core::error::ConfigError;
use crate::core::package_file::{PackageFile, PackageFileKind};
use crate::core::project::ProjectContext;
use crate::core::tokens::{parse_token, token_enum, try_parse_token, TokenEnum};

token_enum! {
    /// Installer user interface language.
    pub enum InstallerLanguage: "installer.language" {
        Autodetect => "autodetect",
        English => "english",
        French => "french",
        German => "german",
        Japanese => "japanese",
        Russian => "russian",
        Polish => "polish",
        Spanish => "spanish",
        Italian => "italian",
        Brazilian => "brazilian",
    }
}

token_enum! {
    /// Installer payload compression.
    pub enum CompressionLevel: "installer.compression-level" {
        Fast => "fast",
        Medium => "medium",
        High => "high",
    }
}

token_enum! {
    /// Where a shortcut is created.
    pub enum ShortcutLocation: "installer.shortcuts.location" {
        ProgramFolder => "program-folder",
        Desktop => "desktop",
        StartMenu => "start-menu",
        Startup => "startup",
    }
}

token_enum! {
    /// How the default installation directory is chosen.
    pub enum InstallationDirectoryType: "installer.installation-directory.type" {
        ProgramFiles => "program-files",
        SystemDrive => "system-drive",
        AbsolutePath => "absolute-path",
        CurrentDirectory => "current-directory",
        UserHome => "user-home",
    }
}

token_enum! {
    /// What a post-install checkbox does.
    pub enum PostInstallActionType: "installer.post-install-checkboxes.type" {
        Run => "run",
        Open => "open",
        Restart => "restart",
    }
}

/// Program started once installation finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AfterInstallRunnable {
    /// Executable inside the package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Command line arguments
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

/// Default installation directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InstallationDirectory {
    /// How the directory is chosen
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Directory path (absolute for `absolute-path`, relative otherwise)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Let the user change the directory (default true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changeable: Option<bool>,
}

/// Shortcut created by the installer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Shortcut {
    /// Where the shortcut goes (default `program-folder`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Shortcut caption
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Target inside the package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Icon file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<PackageFile>,

    /// Working directory inside the package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,

    /// Command line arguments
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

/// Checkbox on the final installer page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PostInstallCheckbox {
    /// `run`, `open` or `restart` (default `run`)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Target inside the package (not used by `restart`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Working directory inside the package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,

    /// Command line arguments
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,

    /// Initially checked (default true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

/// File extension registered by the installer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileAssociation {
    /// Extension without the leading dot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Program opening the files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// File type description (default `{extension} file`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Icon for the file type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<PackageFile>,

    /// Command line arguments placed before the file name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,

    /// Association checkbox initially checked (default true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

/// Installer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InstallerConfig {
    /// Installer language (default `autodetect`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Remove files created at runtime on uninstall (default true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_after_uninstall: Option<bool>,

    /// Program run after installation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_install_runnable: Option<AfterInstallRunnable>,

    /// Payload compression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<String>,

    /// Default installation directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_directory: Option<InstallationDirectory>,

    /// Registry key (default `{group}/{name}/{version}`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_key: Option<String>,

    /// Shortcuts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shortcuts: Vec<Shortcut>,

    /// Suppress the built-in post-install actions
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_default_post_install_actions: bool,

    /// Post-install checkboxes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_install_checkboxes: Vec<PostInstallCheckbox>,

    /// File associations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_associations: Vec<FileAssociation>,

    /// Library called during installation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_callback: Option<PackageFile>,

    /// Library called during uninstallation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uninstall_callback: Option<PackageFile>,

    /// Image on the welcome page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_image: Option<PackageFile>,

    /// Image on the installer pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_image: Option<PackageFile>,

    /// Image on the uninstaller pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uninstaller_image: Option<PackageFile>,

    /// License agreement shown before installation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eula: Option<PackageFile>,
}

fn missing(field: String) -> ConfigError {
    ConfigError::MissingField { field }
}

fn require(value: &Option<String>, field: impl FnOnce() -> String) -> Result<(), ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(missing(field())),
    }
}

fn defined(file: &Option<PackageFile>) -> bool {
    file.as_ref().is_some_and(PackageFile::is_defined)
}

/// Resolve, type and validate an optional file reference.
fn validate_file(
    file: &mut Option<PackageFile>,
    base_dir: &Path,
    not_exist_key: &'static str,
    label: &str,
) -> Result<(), ConfigError> {
    if let Some(file) = file {
        if file.kind.is_none() {
            file.kind = Some(PackageFileKind::File.token().to_string());
        }
        file.resolve_against(base_dir);
        file.validate(not_exist_key, label)?;
    }
    Ok(())
}

impl InstallerConfig {
    /// The first advanced item present, by its configuration name.
    pub fn first_advanced_item(&self) -> Option<&'static str> {
        let dir_type = self
            .installation_directory
            .as_ref()
            .is_some_and(|dir| dir.kind.is_some());

        let items = [
            ("installer.shortcuts", !self.shortcuts.is_empty()),
            (
                "installer.no-default-post-install-actions",
                self.no_default_post_install_actions,
            ),
            (
                "installer.post-install-checkboxes",
                !self.post_install_checkboxes.is_empty(),
            ),
            (
                "installer.file-associations",
                !self.file_associations.is_empty(),
            ),
            ("installer.installation-directory.type", dir_type),
            ("installer.install-callback", defined(&self.install_callback)),
            (
                "installer.uninstall-callback",
                defined(&self.uninstall_callback),
            ),
            ("installer.welcome-image", defined(&self.welcome_image)),
            ("installer.installer-image", defined(&self.installer_image)),
            ("installer.uninstaller-image", defined(&self.uninstaller_image)),
        ];

        items
            .into_iter()
            .find(|(_, present)| *present)
            .map(|(item, _)| item)
    }

    /// Fill in defaults and check every item against the target.
    pub fn fill_defaults(
        &mut self,
        ctx: &ProjectContext,
        caps: &Capabilities,
    ) -> Result<(), ConfigError> {
        if let Some(item) = self.first_advanced_item() {
            if !caps.supports(Feature::AdvancedInstallerFeatures) {
                return Err(ConfigError::AdvancedInstallerFeaturesUnsupported {
                    item: item.to_string(),
                });
            }
        }

        let language: InstallerLanguage = match &self.language {
            Some(token) => parse_token(token)?,
            None => InstallerLanguage::Autodetect,
        };
        self.language = Some(language.token().to_string());

        if self.cleanup_after_uninstall.is_none() {
            self.cleanup_after_uninstall = Some(true);
        }

        if let Some(runnable) = &self.after_install_runnable {
            require(&runnable.target, || {
                "installer.after-install-runnable.target".to_string()
            })?;
        }

        if let Some(token) = &self.compression_level {
            let level: CompressionLevel = try_parse_token(token).ok_or_else(|| {
                ConfigError::UnsupportedCompressionLevel {
                    token: token.clone(),
                }
            })?;
            if !caps.supports(Feature::InstallerCompression) {
                return Err(ConfigError::InstallerCompressionUnsupported {
                    level: level.to_string(),
                });
            }
            self.compression_level = Some(level.token().to_string());
        }

        if let Some(dir) = &mut self.installation_directory {
            if let Some(token) = &dir.kind {
                let kind: InstallationDirectoryType = parse_token(token)?;
                if kind == InstallationDirectoryType::AbsolutePath && dir.path.is_none() {
                    return Err(ConfigError::InstallationDirectoryPathNotSet);
                }
                dir.kind = Some(kind.token().to_string());
            }
            if dir.changeable.is_none() {
                dir.changeable = Some(true);
            }
        }

        if self.registry_key.is_none() {
            let parts = [ctx.group_id.as_str(), ctx.name.as_str(), ctx.version.as_str()];
            self.registry_key = Some(
                parts
                    .iter()
                    .filter(|part| !part.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join("/"),
            );
        }

        for (i, shortcut) in self.shortcuts.iter_mut().enumerate() {
            let field = |name: &str| format!("installer.shortcuts[{}].{}", i, name);
            require(&shortcut.name, || field("name"))?;
            require(&shortcut.target, || field("target"))?;

            let location: ShortcutLocation = match &shortcut.location {
                Some(token) => parse_token(token)?,
                None => ShortcutLocation::ProgramFolder,
            };
            shortcut.location = Some(location.token().to_string());

            validate_file(
                &mut shortcut.icon,
                &ctx.base_dir,
                "ShortcutIconDoesNotExist",
                &field("icon"),
            )?;
        }

        for (i, checkbox) in self.post_install_checkboxes.iter_mut().enumerate() {
            let kind: PostInstallActionType = match &checkbox.kind {
                Some(token) => parse_token(token)?,
                None => PostInstallActionType::Run,
            };
            checkbox.kind = Some(kind.token().to_string());

            if kind != PostInstallActionType::Restart {
                require(&checkbox.target, || {
                    format!("installer.post-install-checkboxes[{}].target", i)
                })?;
            }
            if checkbox.checked.is_none() {
                checkbox.checked = Some(true);
            }
        }

        for (i, association) in self.file_associations.iter_mut().enumerate() {
            let field = |name: &str| format!("installer.file-associations[{}].{}", i, name);
            require(&association.extension, || field("extension"))?;
            require(&association.target, || field("target"))?;

            let extension = association
                .extension
                .as_deref()
                .unwrap_or_default()
                .trim()
                .trim_start_matches('.')
                .to_string();
            if extension.is_empty() {
                return Err(missing(field("extension")));
            }
            if association.description.is_none() {
                association.description = Some(format!("{} file", extension));
            }
            association.extension = Some(extension);
            if association.checked.is_none() {
                association.checked = Some(true);
            }

            validate_file(
                &mut association.icon,
                &ctx.base_dir,
                "FileAssociationIconDoesNotExist",
                &field("icon"),
            )?;
        }

        let base_dir = ctx.base_dir.as_path();
        validate_file(
            &mut self.install_callback,
            base_dir,
            "InstallCallbackDoesNotExist",
            "installer.install-callback",
        )?;
        validate_file(
            &mut self.uninstall_callback,
            base_dir,
            "UninstallCallbackDoesNotExist",
            "installer.uninstall-callback",
        )?;
        validate_file(
            &mut self.welcome_image,
            base_dir,
            "InstallerImageDoesNotExist",
            "installer.welcome-image",
        )?;
        validate_file(
            &mut self.installer_image,
            base_dir,
            "InstallerImageDoesNotExist",
            "installer.installer-image",
        )?;
        validate_file(
            &mut self.uninstaller_image,
            base_dir,
            "InstallerImageDoesNotExist",
            "installer.uninstaller-image",
        )?;
        validate_file(&mut self.eula, base_dir, "EulaDoesNotExist", "installer.eula")?;

        Ok(())
    }
}
