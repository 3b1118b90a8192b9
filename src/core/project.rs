//! Project context - the already-resolved facts every node defaults against.

use std::path::{Path, PathBuf};

use crate::core::tokens::token_enum;

token_enum! {
    /// What kind of application is being packaged.
    pub enum ApplicationKind: "project.kind" {
        /// Ordinary executable
        Plain => "plain",
        /// Windows service executable
        WindowsService => "windows-service",
        /// Tomcat servlet container with deployed web applications
        Tomcat => "tomcat",
        /// Spring Boot application
        SpringBoot => "spring-boot",
        /// Shared library instead of an executable
        DynamicLibrary => "dynamic-library",
    }
}

impl Default for ApplicationKind {
    fn default() -> Self {
        ApplicationKind::Plain
    }
}

/// Changes a node asks the orchestrator to make to the project context.
///
/// Nodes never write the context themselves. The orchestrator applies the
/// requests before the next sibling is defaulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextRequests {
    /// Turn on the global optimizer for the whole project.
    pub enable_global_optimization: bool,
}

impl ContextRequests {
    /// No changes requested.
    pub fn none() -> Self {
        ContextRequests::default()
    }

    /// Check if nothing is requested.
    pub fn is_empty(&self) -> bool {
        !self.enable_global_optimization
    }
}

/// Identity and layout of the project being packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Project name
    pub name: String,

    /// Organization/group identifier
    pub group_id: String,

    /// Project version as written by the user
    pub version: String,

    /// Base name of the produced executable
    pub output_name: String,

    /// Base name of produced artifacts (packages, detached runtime parts)
    pub artifact_name: String,

    /// Application kind
    pub kind: ApplicationKind,

    /// Directory the configuration was read from
    pub base_dir: PathBuf,

    /// Build output directory
    pub build_dir: PathBuf,

    /// Directory holding user resources (profiles, icons, ...)
    pub resource_dir: PathBuf,

    /// Directory the application package is assembled in
    pub package_dir: PathBuf,

    global_optimization: bool,
}

impl ProjectContext {
    /// Create a context with every name derived from `name` and the default layout
    /// under `base_dir`.
    pub fn new(name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let base_dir = base_dir.into();
        let build_dir = default_build_dir(&base_dir);
        ProjectContext {
            group_id: String::new(),
            version: String::new(),
            output_name: name.clone(),
            artifact_name: name.clone(),
            kind: ApplicationKind::Plain,
            resource_dir: default_resource_dir(&base_dir),
            package_dir: build_dir.join("app"),
            build_dir,
            base_dir,
            name,
            global_optimization: false,
        }
    }

    /// Set the application kind.
    pub fn with_kind(mut self, kind: ApplicationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the initial global optimization flag.
    pub fn with_global_optimization(mut self, enabled: bool) -> Self {
        self.global_optimization = enabled;
        self
    }

    /// Check if the global optimizer is enabled.
    pub fn global_optimization(&self) -> bool {
        self.global_optimization
    }

    /// Apply changes requested by a node's defaulting routine.
    pub fn apply(&mut self, requests: ContextRequests) {
        if requests.enable_global_optimization && !self.global_optimization {
            tracing::debug!("enabling global optimizer for `{}`", self.name);
            self.global_optimization = true;
        }
    }
}

/// Default build directory for a project rooted at `base_dir`.
pub fn default_build_dir(base_dir: &Path) -> PathBuf {
    base_dir.join("target").join("nativepack")
}

/// Default resource directory for a project rooted at `base_dir`.
pub fn default_resource_dir(base_dir: &Path) -> PathBuf {
    base_dir.join("src").join("main").join("nativepack")
}
