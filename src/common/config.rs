use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::collections::{BTreeMap, HashSet};
use crate::layout_engine::{ConfiguredLayout, DefaultOrientation};

pub fn data_dir() -> PathBuf { dirs::home_dir().unwrap_or_default().join(".ddwm") }
pub fn restore_file() -> PathBuf { data_dir().join("layout.ron") }
pub fn config_file() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".config").join("ddwm").join("config.toml")
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_root_container_layout")]
    pub default_root_container_layout: ConfiguredLayout,
    #[serde(default)]
    pub default_root_container_orientation: DefaultOrientation,
    /// Workspaces that exist even when empty, in the order they are listed.
    #[serde(default)]
    pub persistent_workspaces: Vec<String>,
    /// Switching to the focused workspace by name goes back to the previous one.
    #[serde(default = "no")]
    pub workspace_auto_back_and_forth: bool,
    #[serde(default)]
    pub workspace_to_monitor_force_assignment: BTreeMap<String, Vec<MonitorDescription>>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_root_container_layout: default_root_container_layout(),
            default_root_container_orientation: DefaultOrientation::default(),
            persistent_workspaces: Vec::new(),
            workspace_auto_back_and_forth: no(),
            workspace_to_monitor_force_assignment: BTreeMap::new(),
        }
    }
}

/// Picks a monitor for a workspace.
///
/// Strings `main` and `secondary` name the main monitor and, with exactly two
/// monitors, the other one. Integers are 1-based positions in left-to-right
/// order. Any other string is a case-insensitive regex over the monitor name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MonitorDescription {
    Index(usize),
    Pattern(String),
}

impl MonitorDescription {
    pub fn regex(pattern: &str) -> Result<regex::Regex, regex::Error> {
        regex::RegexBuilder::new(pattern).case_insensitive(true).build()
    }

    fn validate(&self) -> Option<String> {
        match self {
            MonitorDescription::Index(0) => {
                Some("monitor index is 1-based, got 0".to_string())
            }
            MonitorDescription::Index(_) => None,
            MonitorDescription::Pattern(p) if p == "main" || p == "secondary" => None,
            MonitorDescription::Pattern(p) if p.is_empty() => {
                Some("monitor pattern must not be empty".to_string())
            }
            MonitorDescription::Pattern(p) => {
                Self::regex(p).err().map(|e| format!("invalid monitor pattern {p:?}: {e}"))
            }
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let mut seen = HashSet::default();
        for name in &self.persistent_workspaces {
            if name.trim().is_empty() {
                issues.push("persistent_workspaces contains an empty name".to_string());
            } else if !seen.insert(name.as_str()) {
                issues.push(format!("persistent_workspaces lists {name:?} more than once"));
            }
        }

        for (workspace, monitors) in &self.workspace_to_monitor_force_assignment {
            if workspace.trim().is_empty() {
                issues.push(
                    "workspace_to_monitor_force_assignment has an empty workspace name"
                        .to_string(),
                );
            }
            if monitors.is_empty() {
                issues.push(format!(
                    "workspace_to_monitor_force_assignment[{workspace}] lists no monitors"
                ));
            }
            for issue in monitors.iter().filter_map(MonitorDescription::validate) {
                issues.push(format!("workspace_to_monitor_force_assignment[{workspace}] {issue}"));
            }
        }

        issues
    }
}

fn default_root_container_layout() -> ConfiguredLayout { ConfiguredLayout::Tiles }

fn no() -> bool { false }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&buf)
    }

    /// Reads the config at `path`, or the defaults if the file does not exist.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        Ok(config)
    }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.settings.default_root_container_layout, ConfiguredLayout::Tiles);
        assert_eq!(
            cfg.settings.default_root_container_orientation,
            DefaultOrientation::Auto
        );
        assert!(!cfg.settings.workspace_auto_back_and_forth);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn parses_settings() {
        let toml = r#"
            [settings]
            default_root_container_layout = "monocle"
            default_root_container_orientation = "vertical"
            persistent_workspaces = ["1", "2", "web"]
            workspace_auto_back_and_forth = true

            [settings.workspace_to_monitor_force_assignment]
            web = ["secondary", "main"]
            chat = [2, "^dell.*"]
        "#;
        let cfg = Config::parse(toml).unwrap();
        let s = &cfg.settings;
        assert_eq!(s.default_root_container_layout, ConfiguredLayout::Monocle);
        assert_eq!(s.default_root_container_orientation, DefaultOrientation::Vertical);
        assert_eq!(s.persistent_workspaces, ["1", "2", "web"]);
        assert!(s.workspace_auto_back_and_forth);
        assert_eq!(
            s.workspace_to_monitor_force_assignment["chat"],
            [
                MonitorDescription::Index(2),
                MonitorDescription::Pattern("^dell.*".into())
            ]
        );
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn rejects_unknown_fields() {
        let toml = r#"
            [settings]
            default_root_container_layuot = "tile"
        "#;
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn rejects_unknown_layout() {
        let toml = r#"
            [settings]
            default_root_container_layout = "dwindle"
        "#;
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn validate_reports_issues() {
        let toml = r#"
            [settings]
            persistent_workspaces = ["1", "", "1"]

            [settings.workspace_to_monitor_force_assignment]
            a = [0]
            b = ["(unclosed"]
            c = []
        "#;
        let issues = Config::parse(toml).unwrap().validate();
        assert_eq!(issues.len(), 5, "{issues:#?}");
        assert!(issues.iter().any(|i| i.contains("empty name")));
        assert!(issues.iter().any(|i| i.contains("more than once")));
        assert!(issues.iter().any(|i| i.contains("[a] monitor index is 1-based")));
        assert!(issues.iter().any(|i| i.contains("[b] invalid monitor pattern")));
        assert!(issues.iter().any(|i| i.contains("[c] lists no monitors")));
    }

    #[test]
    fn save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.settings.persistent_workspaces = vec!["1".into(), "mail".into()];
        cfg.settings
            .workspace_to_monitor_force_assignment
            .insert("mail".into(), vec![MonitorDescription::Pattern("main".into())]);
        cfg.save(&path).unwrap();
        assert_eq!(Config::read(&path).unwrap(), cfg);
    }

    #[test]
    fn missing_file_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::read_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
