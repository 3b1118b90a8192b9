//! Rendering of check results and capability tables.

use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::capabilities::Capabilities;
use crate::core::error::ConfigWarning;
use crate::core::manifest::ProjectConfig;
use crate::ops::normalize::NormalizedProject;

/// A warning in machine-readable form.
#[derive(Debug, Clone, Serialize)]
pub struct WarningEntry {
    /// Stable message key
    pub key: &'static str,
    /// Positional message parameters
    pub params: Vec<String>,
    /// English message
    pub message: String,
}

impl From<&ConfigWarning> for WarningEntry {
    fn from(warning: &ConfigWarning) -> Self {
        WarningEntry {
            key: warning.key(),
            params: warning.params(),
            message: warning.to_string(),
        }
    }
}

/// Result of `nativepack check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Project name
    pub project: String,
    /// Target description, e.g. `windows enterprise 15.3.0`
    pub target: String,
    /// Resolved packaging type
    pub packaging: String,
    /// Whether the global optimizer ended up enabled
    pub global_optimization: bool,
    /// Soft violations, in the order they were raised
    pub warnings: Vec<WarningEntry>,
    /// The normalized configuration
    pub config: ProjectConfig,
}

impl CheckReport {
    /// Build a report from a normalized project.
    pub fn new(
        normalized: &NormalizedProject,
        caps: &Capabilities,
        warnings: &[ConfigWarning],
    ) -> Self {
        CheckReport {
            project: normalized.context.name.clone(),
            target: describe_target(caps),
            packaging: normalized.packaging.to_string(),
            global_optimization: normalized.context.global_optimization(),
            warnings: warnings.iter().map(WarningEntry::from).collect(),
            config: normalized.config.clone(),
        }
    }

    /// Render as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize check report")
    }

    /// Render as a short summary followed by the normalized TOML.
    pub fn to_text(&self) -> Result<String> {
        let mut output = format!(
            "Project:   {}\nTarget:    {}\nPackaging: {}\nGlobal optimizer: {}\n",
            self.project,
            self.target,
            self.packaging,
            if self.global_optimization { "on" } else { "off" }
        );
        if !self.warnings.is_empty() {
            output.push_str(&format!("Warnings:  {}\n", self.warnings.len()));
        }
        output.push('\n');
        output.push_str(&self.config.to_toml()?);
        Ok(output)
    }
}

/// One-line description of the target.
pub fn describe_target(caps: &Capabilities) -> String {
    format!(
        "{} {} {}{}",
        caps.target_os(),
        caps.edition(),
        caps.version(),
        if caps.is_cross_compilation() {
            " (cross)"
        } else {
            ""
        }
    )
}

/// The feature table of a target.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityReport {
    /// Target description
    pub target: String,
    /// Feature name and support flag, in declaration order
    pub features: Vec<FeatureEntry>,
}

/// One row of the feature table.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureEntry {
    /// Feature name
    pub name: &'static str,
    /// Whether the target supports it
    pub supported: bool,
}

impl CapabilityReport {
    /// Build the table for `caps`.
    pub fn new(caps: &Capabilities) -> Self {
        CapabilityReport {
            target: describe_target(caps),
            features: caps
                .feature_table()
                .into_iter()
                .map(|(feature, supported)| FeatureEntry {
                    name: feature.as_str(),
                    supported,
                })
                .collect(),
        }
    }

    /// Render as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize capability report")
    }
}

impl fmt::Display for CapabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Target: {}", self.target)?;
        writeln!(f)?;
        for feature in &self.features {
            let status = if feature.supported { "[OK]" } else { "[--]" };
            writeln!(f, "  {} {}", status, feature.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::normalize::{normalize, NormalizeOptions};
    use crate::test_support::{cross_caps, enterprise_caps, minimal_manifest, scratch_project};

    #[test]
    fn test_check_report_text_and_json() {
        let scratch = scratch_project("demo");
        let config = ProjectConfig::from_str(&minimal_manifest("demo")).unwrap();
        let caps = enterprise_caps();
        let normalized = normalize(
            config,
            scratch.root(),
            &caps,
            &NormalizeOptions::default(),
            &mut Vec::new(),
        )
        .unwrap();

        let warnings = vec![ConfigWarning::SlimDownUnsupported];
        let report = CheckReport::new(&normalized, &caps, &warnings);

        let text = report.to_text().unwrap();
        assert!(text.contains("Project:   demo"));
        assert!(text.contains("Packaging: zip"));
        assert!(text.contains("Warnings:  1"));
        assert!(text.contains("[project]"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["project"], "demo");
        assert_eq!(json["warnings"][0]["key"], "SlimDownUnsupported");
        assert_eq!(json["config"]["packaging"], "zip");
        assert_eq!(json["config"]["profiles"]["profile-locally"], true);
    }

    #[test]
    fn test_capability_report() {
        let report = CapabilityReport::new(&cross_caps());
        assert_eq!(report.target, "linux enterprise 15.3.0 (cross)");

        let text = report.to_string();
        assert!(text.contains("[--] slim-down"));
        assert!(text.contains("[OK] runtime-flavor-desktop"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["features"][0]["name"], "runtime-flavor-desktop");
    }
}
