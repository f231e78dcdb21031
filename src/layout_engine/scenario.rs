//! Declarative starting states, used by `ddwm replay` and the tests.
//!
//! ```toml
//! [[monitors]]
//! id = 1
//! name = "Built-in"
//! frame = [0, 0, 1920, 1080]
//!
//! [[workspaces]]
//! name = "1"
//! monitor = 1
//! tiling = [1, 2, 3]
//! floating = [4]
//!
//! [focus]
//! workspace = "1"
//! window = 1
//! ```

use anyhow::bail;
use serde::{Deserialize, Serialize};

use super::{Layout, LayoutEngine, LiveFocus, Orientation, WindowPlacement};
use crate::common::collections::HashSet;
use crate::common::config::Settings;
use crate::common::geometry::Rect;
use crate::model::{Monitor, MonitorId, SystemContainerKind, WindowId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub monitors: Vec<ScenarioMonitor>,
    #[serde(default)]
    pub workspaces: Vec<ScenarioWorkspace>,
    #[serde(default)]
    pub focus: Option<ScenarioFocus>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioMonitor {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// x, y, width, height
    pub frame: [f64; 4],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioWorkspace {
    pub name: String,
    /// Show the workspace on this monitor.
    #[serde(default)]
    pub monitor: Option<u32>,
    #[serde(default)]
    pub layout: Option<Layout>,
    #[serde(default)]
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub tiling: Vec<u32>,
    #[serde(default)]
    pub floating: Vec<u32>,
    #[serde(default)]
    pub minimized: Vec<u32>,
    #[serde(default)]
    pub fullscreen: Vec<u32>,
    #[serde(default)]
    pub hidden: Vec<u32>,
    #[serde(default)]
    pub popups: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFocus {
    pub workspace: String,
    #[serde(default)]
    pub window: Option<u32>,
}

impl Scenario {
    /// Parses and checks a scenario. Anything [`Scenario::build`] could not
    /// turn into a consistent engine is an error here.
    pub fn parse(buf: &str) -> anyhow::Result<Scenario> {
        let scenario: Scenario = toml::from_str(buf)?;
        if scenario.monitors.is_empty() {
            bail!("a scenario needs at least one monitor");
        }
        let mut monitors = HashSet::default();
        for monitor in &scenario.monitors {
            if !monitors.insert(monitor.id) {
                bail!("monitor {} is listed twice", monitor.id);
            }
        }
        let mut windows = HashSet::default();
        for ws in &scenario.workspaces {
            if let Some(monitor) = ws.monitor.filter(|m| !monitors.contains(m)) {
                bail!("workspace '{}' is shown on unknown monitor {monitor}", ws.name);
            }
            for &id in ws.window_ids() {
                if !windows.insert(id) {
                    bail!("window {id} is listed twice");
                }
            }
        }
        if let Some(ScenarioFocus { workspace, window: Some(id) }) = &scenario.focus {
            let on_workspace = scenario
                .workspaces
                .iter()
                .any(|ws| ws.name == *workspace && ws.window_ids().any(|w| w == id));
            if !on_workspace {
                bail!("focused window {id} is not on workspace '{workspace}'");
            }
        }
        Ok(scenario)
    }

    pub fn build(&self, settings: Settings) -> LayoutEngine {
        let monitors = self
            .monitors
            .iter()
            .map(|m| {
                let [x, y, width, height] = m.frame;
                Monitor {
                    id: MonitorId(m.id),
                    name: m.name.clone(),
                    rect: Rect::new(x, y, width, height),
                }
            })
            .collect();
        let mut engine = LayoutEngine::new(settings, monitors);

        for ws in &self.workspaces {
            let node = engine.workspace_node(&ws.name);
            if let Some(monitor) = ws.monitor {
                engine.show_workspace(MonitorId(monitor), &ws.name);
            }
            let root = engine.root_tiling_container(node);
            if let Some(data) = engine.graph.tiling_data_mut(root) {
                data.layout = ws.layout.unwrap_or(data.layout);
                data.orientation = ws.orientation.unwrap_or(data.orientation);
            }
            let groups = [
                (&ws.tiling, WindowPlacement::Tiling),
                (&ws.floating, WindowPlacement::Floating),
                (&ws.minimized, WindowPlacement::System(SystemContainerKind::Minimized)),
                (&ws.fullscreen, WindowPlacement::System(SystemContainerKind::Fullscreen)),
                (&ws.hidden, WindowPlacement::System(SystemContainerKind::HiddenApps)),
                (&ws.popups, WindowPlacement::System(SystemContainerKind::Popups)),
            ];
            for (ids, placement) in groups {
                for &id in ids {
                    engine.add_window(WindowId(id), &ws.name, placement);
                }
            }
        }

        let target = match &self.focus {
            Some(focus) => LiveFocus {
                window: focus.window.map(WindowId),
                workspace: focus.workspace.clone(),
            },
            None => engine.focus(),
        };
        engine.apply_focus(&target);
        // A starting state has no history.
        engine.focus.prev_workspace = None;
        engine.gc_workspaces();
        engine
    }
}

impl ScenarioWorkspace {
    fn window_ids(&self) -> impl Iterator<Item = &u32> + '_ {
        [
            &self.tiling,
            &self.floating,
            &self.minimized,
            &self.fullscreen,
            &self.hidden,
            &self.popups,
        ]
        .into_iter()
        .flatten()
    }
}
