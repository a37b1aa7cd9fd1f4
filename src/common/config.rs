use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use super::collections::HashSet;
use crate::model::container::Layout;
use crate::sys::geometry::Size;

pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("spire")
        .join("config.toml")
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub gaps: GapSettings,
    #[serde(default)]
    pub outputs: Vec<OutputConfig>,
    /// Ordered; the first entry naming a workspace decides its output.
    #[serde(default)]
    pub workspace_outputs: Vec<WorkspaceOutput>,
    #[serde(default)]
    pub default_layout: Layout,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    /// Spacing around each view.
    #[serde(default)]
    pub inner: i32,
    /// Spacing around the content of each output.
    #[serde(default)]
    pub outer: i32,
}

/// Static placement and sizing for an output, matched by name.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub name: String,
    #[serde(default = "yes")]
    pub enabled: bool,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub x: Option<i32>,
    pub y: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceOutput {
    pub workspace: String,
    pub output: String,
}

fn yes() -> bool { true }

impl OutputConfig {
    pub fn named(name: impl Into<String>) -> OutputConfig {
        OutputConfig {
            name: name.into(),
            enabled: true,
            width: None,
            height: None,
            x: None,
            y: None,
        }
    }

    /// Configured size; only applies when both dimensions are given.
    pub fn size(&self) -> Option<Size> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Size::new(w, h)),
            _ => None,
        }
    }

    /// Configured position; only applies when both coordinates are given.
    pub fn position(&self) -> Option<(i32, i32)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push("outputs: name must not be empty".to_string());
        }

        for (field, value) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = value
                && v <= 0
            {
                issues.push(format!(
                    "outputs[{}].{field} must be positive, got {v}",
                    self.name
                ));
            }
        }

        if self.width.is_some() != self.height.is_some() {
            issues.push(format!(
                "outputs[{}]: width and height must be set together",
                self.name
            ));
        }

        if self.x.is_some() != self.y.is_some() {
            issues.push(format!(
                "outputs[{}]: x and y must be set together",
                self.name
            ));
        }

        issues
    }
}

impl GapSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.inner < 0 {
            issues.push(format!("gaps.inner must be non-negative, got {}", self.inner));
        }

        if self.outer < 0 {
            issues.push(format!("gaps.outer must be non-negative, got {}", self.outer));
        }

        issues
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// Reads `path`, or falls back to the defaults when it does not exist.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        match toml::from_str::<Config>(buf) {
            Ok(c) => Ok(c),
            Err(e) => bail!("{e}"),
        }
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.gaps.validate());

        let mut seen = HashSet::default();
        for output in &self.outputs {
            issues.extend(output.validate());
            if !seen.insert(output.name.to_lowercase()) {
                issues.push(format!("outputs: duplicate entry for {}", output.name));
            }
        }

        for mapping in &self.workspace_outputs {
            if mapping.workspace.trim().is_empty() || mapping.output.trim().is_empty() {
                issues.push("workspace_outputs: workspace and output must not be empty".into());
            }
        }

        issues
    }

    /// Static configuration for the output called `name`, compared case-insensitively.
    pub fn output_config(&self, name: &str) -> Option<&OutputConfig> {
        self.outputs.iter().find(|o| o.name.eq_ignore_ascii_case(name))
    }

    /// Workspaces mapped to the output called `name`, in configuration order.
    pub fn workspaces_for_output<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.workspace_outputs
            .iter()
            .filter(move |m| m.output.eq_ignore_ascii_case(name))
            .map(|m| m.workspace.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
        default_layout = "vertical"

        [gaps]
        inner = 10
        outer = 4

        [[outputs]]
        name = "HDMI-A-1"
        width = 1920
        height = 1080

        [[outputs]]
        name = "eDP-1"
        enabled = false

        [[workspace_outputs]]
        workspace = "web"
        output = "hdmi-a-1"

        [[workspace_outputs]]
        workspace = "web"
        output = "DP-2"
    "#;

    #[test]
    fn parses_full_config() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(GapSettings { inner: 10, outer: 4 }, config.gaps);
        assert_eq!(Layout::Vertical, config.default_layout);
        assert_eq!(2, config.outputs.len());
        assert!(config.outputs[0].enabled);
        assert!(!config.outputs[1].enabled);
        assert_eq!(Some(Size::new(1920, 1080)), config.outputs[0].size());
        assert_eq!(None, config.outputs[0].position());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn output_lookup_is_case_insensitive() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(
            Some("HDMI-A-1"),
            config.output_config("hdmi-a-1").map(|o| o.name.as_str())
        );
        assert_eq!(vec!["web"], config.workspaces_for_output("HDMI-A-1").collect::<Vec<_>>());
        assert_eq!(None, config.output_config("DP-3"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::parse("[gaps]\nsides = 3\n").unwrap_err();
        assert!(err.to_string().contains("sides"));
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::default(), Config::parse("").unwrap());
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn half_specified_geometry_is_ignored_and_reported() {
        let mut output = OutputConfig::named("DP-1");
        output.width = Some(1024);
        output.x = Some(0);
        assert_eq!(None, output.size());
        assert_eq!(None, output.position());
        assert_eq!(2, output.validate().len());
    }

    #[test]
    fn validation_reports_bad_values() {
        let mut config = Config::default();
        config.gaps.inner = -1;
        config.gaps.outer = -2;
        let mut output = OutputConfig::named("DP-1");
        output.width = Some(0);
        output.height = Some(100);
        config.outputs.push(output);
        config.outputs.push(OutputConfig::named("dp-1"));
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("gaps.inner")));
        assert!(issues.iter().any(|i| i.contains("gaps.outer")));
        assert!(issues.iter().any(|i| i.contains("width must be positive")));
        assert!(issues.iter().any(|i| i.contains("duplicate")));
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::read_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(Config::default(), config);
    }
}
