use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span};

use crate::command::{CmdIo, WmCommand};
use crate::common::collections::BTreeMap;
use crate::common::config::Settings;
use crate::model::{
    BindIndex, FocusState, Monitor, MonitorId, NodeGraph, NodeId, ParentKind, SystemContainerKind,
    WindowId,
};
use crate::sys::native::NativeWindows;

/// Where a newly managed window goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPlacement {
    Tiling,
    Floating,
    System(SystemContainerKind),
}

/// A window (if any) and the workspace it is on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveFocus {
    pub window: Option<WindowId>,
    pub workspace: String,
}

/// The tiling core's state: every workspace tree, the ambient focus and
/// which workspace each monitor shows.
#[derive(Serialize, Deserialize)]
pub struct LayoutEngine {
    pub(crate) graph: NodeGraph,
    pub(crate) focus: FocusState,
    pub(crate) monitors: Vec<Monitor>,
    pub(crate) active_workspaces: BTreeMap<MonitorId, String>,
    #[serde(skip)]
    pub(crate) settings: Settings,
}

impl LayoutEngine {
    /// `monitors` are in the order the native layer reports them; the first
    /// one is the main monitor.
    #[track_caller]
    pub fn new(settings: Settings, monitors: Vec<Monitor>) -> Self {
        let mut engine = LayoutEngine {
            graph: NodeGraph::new(),
            focus: FocusState::default(),
            monitors: Vec::new(),
            active_workspaces: BTreeMap::new(),
            settings,
        };
        for name in engine.settings.persistent_workspaces.clone() {
            engine.workspace_node(&name);
        }
        engine.set_monitors(monitors);
        let main = engine.main_monitor();
        engine.focus = FocusState::new(engine.active_workspaces[&main].clone());
        engine
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn set_settings(&mut self, settings: Settings) { self.settings = settings; }

    pub fn graph(&self) -> &NodeGraph { &self.graph }

    pub fn monitors(&self) -> &[Monitor] { &self.monitors }

    /// Replaces the monitor list. Every monitor ends up showing exactly one
    /// workspace; monitors that lost theirs get a fresh one.
    #[track_caller]
    pub fn set_monitors(&mut self, monitors: Vec<Monitor>) {
        assert!(!monitors.is_empty(), "at least one monitor is required");
        debug!(?monitors, "monitors changed");
        self.active_workspaces.retain(|id, _| monitors.iter().any(|m| m.id == *id));
        self.monitors = monitors;
        for id in self.monitors.iter().map(|m| m.id).collect::<Vec<_>>() {
            if !self.active_workspaces.contains_key(&id) {
                let name = self.fresh_workspace_name(id);
                self.show_workspace(id, &name);
            }
        }
        // Focus may not stay on a workspace that lost its monitor.
        let focused = self.focus.focused_workspace.clone();
        if !focused.is_empty() && !self.is_visible(&focused) {
            let main = self.main_monitor();
            if let Some(workspace) = self.active_workspaces.get(&main).cloned() {
                debug!(%focused, %workspace, "focused workspace lost its monitor");
                self.apply_focus(&LiveFocus { window: None, workspace });
            }
        }
    }

    pub fn main_monitor(&self) -> MonitorId { self.monitors[0].id }

    pub fn monitor(&self, id: MonitorId) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.id == id)
    }

    /// Makes `monitor` show `name`. A monitor that was showing `name` before
    /// gets a fresh workspace instead.
    pub fn show_workspace(&mut self, monitor: MonitorId, name: &str) {
        let ws = self.workspace_node(name);
        let previous = self
            .active_workspaces
            .iter()
            .find(|(m, n)| **m != monitor && n.as_str() == name)
            .map(|(m, _)| *m);
        self.active_workspaces.insert(monitor, name.to_string());
        if let Some(data) = self.graph.workspace_data_mut(ws) {
            data.assigned_monitor = Some(monitor);
        }
        if let Some(previous) = previous {
            self.active_workspaces.remove(&previous);
            let fresh = self.fresh_workspace_name(previous);
            self.show_workspace(previous, &fresh);
        }
    }

    /// First free persistent workspace, else the lowest free number.
    fn fresh_workspace_name(&self, monitor: MonitorId) -> String {
        let is_free = |name: &str| {
            !self.is_visible(name)
                && self.forced_monitor(name).is_none_or(|m| m == monitor)
                && self.graph.workspace(name).is_none_or(|ws| self.is_effectively_empty(ws))
        };
        if let Some(name) = self.settings.persistent_workspaces.iter().find(|n| is_free(n)) {
            return name.clone();
        }
        (1..)
            .map(|i: u64| i.to_string())
            .find(|n| !self.settings.persistent_workspaces.contains(n) && is_free(n))
            .unwrap_or_default()
    }

    /// The workspace with this name, created if needed.
    pub fn workspace_node(&mut self, name: &str) -> NodeId {
        match self.graph.workspace(name) {
            Some(ws) => ws,
            None => {
                debug!(name, "creating workspace");
                self.graph.create_workspace(name)
            }
        }
    }

    /// Starts managing a window.
    #[track_caller]
    pub fn add_window(&mut self, wid: WindowId, workspace: &str, placement: WindowPlacement) {
        let ws = self.workspace_node(workspace);
        let parent = match placement {
            WindowPlacement::Tiling => self.root_tiling_container(ws),
            WindowPlacement::Floating => ws,
            WindowPlacement::System(kind) => self.system_container(ws, kind),
        };
        let node = self.graph.create_window(wid);
        self.graph.bind(node, parent, BindIndex::Last);
        debug!(%wid, workspace, ?placement, "window added");
    }

    /// Stops managing a window. Focus moves to another window of the same
    /// workspace if the removed one had it.
    pub fn remove_window(&mut self, wid: WindowId) -> bool {
        let Some(node) = self.graph.window(wid) else {
            return false;
        };
        let ws = self.graph.node_workspace(node);
        self.graph.remove(node);
        debug!(%wid, "window removed");
        if let Some(data) = ws.and_then(|ws| self.graph.workspace_data_mut(ws)) {
            if data.last_focused_window == Some(wid) {
                data.last_focused_window = None;
            }
        }
        if self.focus.last_native_focused == Some(wid) {
            self.focus.last_native_focused = None;
        }
        if self.focus.focused_window == Some(wid) {
            self.focus.focused_window = ws.and_then(|ws| self.fallback_window(ws));
        }
        self.normalize_all();
        true
    }

    /// First tiling window, else first floating window.
    fn fallback_window(&self, ws: NodeId) -> Option<WindowId> {
        self.tiling_clients(ws)
            .into_iter()
            .chain(self.floating_windows(ws))
            .find_map(|n| self.graph.window_id(n))
    }

    pub fn focus(&self) -> LiveFocus {
        LiveFocus {
            window: self.focus.focused_window,
            workspace: self.focus.focused_workspace.clone(),
        }
    }

    pub fn focus_state(&self) -> &FocusState { &self.focus }

    /// Moves ambient focus without talking to the native layer. Returns the
    /// window that ends up focused.
    pub fn apply_focus(&mut self, target: &LiveFocus) -> Option<WindowId> {
        let ws = self.workspace_node(&target.workspace);
        if !self.is_visible(&target.workspace) {
            let monitor = self
                .forced_monitor(&target.workspace)
                .unwrap_or_else(|| self.focused_monitor());
            self.show_workspace(monitor, &target.workspace);
        }
        let remembered = self
            .graph
            .workspace_data(ws)
            .and_then(|d| d.last_focused_window)
            .filter(|&w| self.graph.window(w).and_then(|n| self.graph.node_workspace(n)) == Some(ws));
        let window = target.window.or(remembered).or_else(|| self.fallback_window(ws));
        self.focus.focus(&target.workspace, window);
        if let (Some(w), Some(data)) = (window, self.graph.workspace_data_mut(ws)) {
            data.last_focused_window = Some(w);
        }
        debug!(workspace = %target.workspace, ?window, "focus changed");
        window
    }

    /// Moves ambient focus and asks the native layer to follow.
    pub fn set_focus<N: NativeWindows>(&mut self, target: &LiveFocus, native: &N) -> bool {
        match self.apply_focus(target) {
            Some(wid) => native.focus_window(wid),
            None => true,
        }
    }

    /// Focuses a window on whatever workspace it is on.
    pub fn focus_window<N: NativeWindows>(&mut self, wid: WindowId, native: &N) -> bool {
        let Some(workspace) = self.window_workspace_name(wid) else {
            return false;
        };
        self.set_focus(&LiveFocus { window: Some(wid), workspace }, native)
    }

    pub fn window_workspace_name(&self, wid: WindowId) -> Option<String> {
        let node = self.graph.window(wid)?;
        let ws = self.graph.node_workspace(node)?;
        self.graph.workspace_data(ws).map(|d| d.name.clone())
    }

    /// Pulls a focus change made outside of ddwm into ambient focus.
    ///
    /// Popups and windows on hidden workspaces are ignored, as are repeated
    /// reports of the same window.
    pub fn sync_native_focus(&mut self, native_focused: Option<WindowId>) -> bool {
        if let Some(wid) = native_focused {
            let Some(node) = self.graph.window(wid) else {
                return false;
            };
            if self.graph.parent_kind(node) == Some(ParentKind::System(SystemContainerKind::Popups))
            {
                return false;
            }
            let Some(workspace) = self.window_workspace_name(wid) else {
                return false;
            };
            if !self.is_visible(&workspace) {
                return false;
            }
        }
        if native_focused == self.focus.last_native_focused {
            return false;
        }
        self.focus.last_native_focused = native_focused;
        if let Some(wid) = native_focused {
            if let Some(workspace) = self.window_workspace_name(wid) {
                self.apply_focus(&LiveFocus { window: Some(wid), workspace });
            }
        }
        true
    }

    /// Runs a command, then restores the canonical tree shape.
    pub async fn execute<N: NativeWindows>(
        &mut self,
        cmd: &WmCommand,
        native: &N,
        io: &mut CmdIo,
    ) -> bool {
        let span = info_span!("command", ?cmd);
        async {
            info!("executing");
            let ok = cmd.run(self, native, io).await;
            self.normalize_all();
            self.gc_workspaces();
            debug!(ok, "Tree:\n{}", self.draw_tree().trim());
            ok
        }
        .instrument(span)
        .await
    }

    pub fn draw_tree(&self) -> String {
        let mut out = String::new();
        for (_, ws) in self.graph.workspaces() {
            out.push_str(&self.graph.draw_tree(ws));
        }
        out
    }

    pub fn load(path: &Path, settings: Settings) -> anyhow::Result<Self> {
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let mut engine: LayoutEngine = ron::from_str(&buf)?;
        engine.settings = settings;
        Ok(engine)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        File::create(path)?.write_all(self.serialize_to_string()?.as_bytes())?;
        Ok(())
    }

    pub fn serialize_to_string(&self) -> Result<String, ron::Error> { ron::ser::to_string(&self) }
}
