//! Windows service descriptor.

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::core::project::{ApplicationKind, ProjectContext};
use crate::core::tokens::{parse_token, token_enum, TokenEnum};

token_enum! {
    /// Account the service runs under.
    pub enum LogOnType: "service.log-on-type" {
        LocalSystemAccount => "local-system-account",
        UserAccount => "user-account",
    }
}

token_enum! {
    /// When the service starts.
    pub enum StartupType: "service.startup-type" {
        Automatic => "automatic",
        Manual => "manual",
        Disabled => "disabled",
    }
}

/// Display name used for Tomcat services.
pub const TOMCAT_DISPLAY_NAME: &str = "Apache Tomcat";

/// Description used for Tomcat services.
pub const TOMCAT_DESCRIPTION: &str = "Apache Tomcat Server - http://tomcat.apache.org/";

/// How the application is registered as a Windows service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServiceConfig {
    /// System name of the service (default: project output name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Name shown in the service manager
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Description shown in the service manager
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Arguments passed to the service on start
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,

    /// `local-system-account` or `user-account`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_on_type: Option<String>,

    /// Let the service interact with the desktop
    pub allow_desktop_interaction: bool,

    /// `automatic`, `manual` or `disabled`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_type: Option<String>,

    /// Start the service right after installation
    pub start_service_after_install: bool,

    /// Services that must run before this one
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            name: None,
            display_name: None,
            description: None,
            arguments: Vec::new(),
            log_on_type: None,
            allow_desktop_interaction: false,
            startup_type: None,
            start_service_after_install: true,
            dependencies: Vec::new(),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl ServiceConfig {
    /// Fill in names, log-on and startup defaults and check their combination.
    pub fn fill_defaults(&mut self, ctx: &ProjectContext) -> Result<(), ConfigError> {
        if is_blank(&self.name) {
            self.name = Some(ctx.output_name.clone());
        }
        let name = self.name.clone().unwrap_or_default();

        if is_blank(&self.display_name) {
            self.display_name = Some(match ctx.kind {
                ApplicationKind::Tomcat => TOMCAT_DISPLAY_NAME.to_string(),
                _ => name,
            });
        }

        if is_blank(&self.description) {
            self.description = Some(match ctx.kind {
                ApplicationKind::Tomcat => TOMCAT_DESCRIPTION.to_string(),
                _ => self.display_name.clone().unwrap_or_default(),
            });
        }

        let log_on_type = match &self.log_on_type {
            Some(token) => parse_token(token)?,
            None => LogOnType::LocalSystemAccount,
        };
        self.log_on_type = Some(log_on_type.token().to_string());

        let startup_type: StartupType = match &self.startup_type {
            Some(token) => parse_token(token)?,
            None => StartupType::Automatic,
        };
        self.startup_type = Some(startup_type.token().to_string());

        for (index, dependency) in self.dependencies.iter_mut().enumerate() {
            let trimmed = dependency.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::BlankServiceDependency { index });
            }
            *dependency = trimmed.to_string();
        }

        if self.allow_desktop_interaction && log_on_type != LogOnType::LocalSystemAccount {
            return Err(ConfigError::DesktopInteractionNotAllowed {
                log_on_type: log_on_type.to_string(),
            });
        }

        Ok(())
    }
}
