use super::{CmdIo, CommandError, NextPrev, TargetArgs, WorkspaceArgs, WorkspaceTarget};
use crate::layout_engine::{LayoutEngine, LiveFocus, natural_cmp};
use crate::sys::native::NativeWindows;

pub(super) fn run<N: NativeWindows>(
    args: &WorkspaceArgs,
    engine: &mut LayoutEngine,
    native: &N,
    io: &mut CmdIo,
) -> bool {
    let Some(target) = TargetArgs::default().resolve_target_or_report_error(engine, io) else {
        return false;
    };
    let focused_ws = target.workspace.clone();
    let name = match &args.target {
        WorkspaceTarget::Relative(next_prev) => {
            let stdin = args.use_stdin.then(|| io.read_stdin().to_string());
            let next = get_next_prev_workspace(
                engine,
                *next_prev == NextPrev::Next,
                args.wrap_around,
                stdin.as_deref(),
                &target,
            );
            match next {
                Some(name) => name,
                None => return false,
            }
        }
        WorkspaceTarget::Direct(name) => {
            let auto_back_and_forth = args
                .auto_back_and_forth
                .unwrap_or(engine.settings().workspace_auto_back_and_forth);
            if auto_back_and_forth && focused_ws == *name {
                return back_and_forth(engine, native, io);
            }
            name.clone()
        }
    };

    let focused_monitor = engine.workspace_monitor(&focused_ws);
    if focused_ws == name || engine.active_workspace(focused_monitor) == Some(name.as_str()) {
        if args.fail_if_noop {
            return io.fail(CommandError::AlreadyFocused(name));
        }
        return true;
    }
    engine.set_focus(&LiveFocus { window: None, workspace: name }, native)
}

/// Returns to the previously focused workspace.
pub(super) fn back_and_forth<N: NativeWindows>(
    engine: &mut LayoutEngine,
    native: &N,
    io: &mut CmdIo,
) -> bool {
    let Some(prev) = engine.focus_state().prev_workspace.clone() else {
        return io.fail(CommandError::NoPreviousWorkspace);
    };
    engine.set_focus(&LiveFocus { window: None, workspace: prev }, native)
}

/// The workspace after (or before) the target's one.
///
/// Candidates come from `stdin` when given, one name per line. Otherwise
/// they are the workspaces sharing the current monitor's position, in
/// natural order.
pub(crate) fn get_next_prev_workspace(
    engine: &mut LayoutEngine,
    is_next: bool,
    wrap_around: bool,
    stdin: Option<&str>,
    target: &LiveFocus,
) -> Option<String> {
    let workspaces: Vec<String> = match stdin {
        Some(stdin) => stdin
            .split('\n')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                engine.workspace_node(name);
                name.to_string()
            })
            .collect(),
        None => {
            let engine = &*engine;
            let corner = |engine: &LayoutEngine, name: &str| {
                engine
                    .monitor_rect(engine.workspace_monitor(name))
                    .map(|r| r.top_left_corner())
            };
            let current = corner(engine, &target.workspace);
            let mut names: Vec<String> = engine
                .sorted_workspace_names()
                .into_iter()
                .filter(|name| corner(engine, name) == current)
                .collect();
            if !names.contains(&target.workspace) {
                names.push(target.workspace.clone());
            }
            names.sort_by(|a, b| natural_cmp(a, b));
            names
        }
    };

    let index = workspaces.iter().position(|w| *w == target.workspace).unwrap_or(0) as isize;
    let next = if is_next { index + 1 } else { index - 1 };
    if wrap_around {
        if workspaces.is_empty() {
            return None;
        }
        let len = workspaces.len() as isize;
        workspaces.get(next.rem_euclid(len) as usize).cloned()
    } else {
        usize::try_from(next).ok().and_then(|i| workspaces.get(i)).cloned()
    }
}
