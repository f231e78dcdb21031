use tracing::warn;

use super::{CmdIo, CommandError, LayoutArgs};
use crate::layout_engine::{
    Layout, LayoutChange, LayoutEngine, LiveFocus, Orientation, Placement,
};
use crate::model::{BindIndex, NodeId, ParentKind, SystemContainerKind, WindowId};
use crate::sys::native::NativeWindows;

pub(super) async fn run<N: NativeWindows>(
    args: &LayoutArgs,
    engine: &mut LayoutEngine,
    native: &N,
    io: &mut CmdIo,
) -> bool {
    let Some(target) = args.window.resolve_target_or_report_error(engine, io) else {
        return false;
    };
    let Some((wid, node)) = target.window_or_report(engine, io) else {
        return false;
    };
    let Some(&first) = args.toggle_between.first() else {
        return io.fail(CommandError::EmptyToggleList);
    };

    let placement = placement(engine, node);
    let description = args
        .toggle_between
        .iter()
        .copied()
        .find(|d| !d.matches(&placement))
        .unwrap_or(first);
    if description.matches(&placement) {
        return false;
    }

    match description.change() {
        LayoutChange::Tiling { layout, orientation } => {
            change_tiling_layout(engine, io, node, layout, orientation)
        }
        LayoutChange::MakeTiling => make_tiling(engine, native, io, wid, node).await,
        LayoutChange::MakeFloating => make_floating(engine, native, &target, wid, node),
    }
}

fn placement(engine: &LayoutEngine, node: NodeId) -> Placement {
    let graph = engine.graph();
    let root = graph
        .node_workspace(node)
        .and_then(|ws| engine.existing_root_tiling_container(ws))
        .and_then(|root| graph.tiling_data(root).copied());
    Placement { root, parent: graph.parent_kind(node) }
}

fn change_tiling_layout(
    engine: &mut LayoutEngine,
    io: &mut CmdIo,
    node: NodeId,
    layout: Option<Layout>,
    orientation: Option<Orientation>,
) -> bool {
    let Some(ws) = engine.graph().node_workspace(node) else {
        return false;
    };
    match engine.graph().parent_kind(node) {
        Some(ParentKind::TilingContainer) => {
            let root = engine.root_tiling_container(ws);
            if let Some(data) = engine.graph.tiling_data_mut(root) {
                data.layout = layout.unwrap_or(data.layout);
                data.change_orientation(orientation.unwrap_or(data.orientation));
            }
            true
        }
        Some(ParentKind::Workspace | ParentKind::System(_)) => io.fail(CommandError::NonTiling),
        None => false,
    }
}

async fn make_tiling<N: NativeWindows>(
    engine: &mut LayoutEngine,
    native: &N,
    io: &mut CmdIo,
    wid: WindowId,
    node: NodeId,
) -> bool {
    match engine.graph().parent_kind(node) {
        None | Some(ParentKind::System(SystemContainerKind::Popups)) => false,
        Some(ParentKind::System(_)) => io.fail(CommandError::SystemContainerLayout),
        Some(ParentKind::TilingContainer) => true,
        Some(ParentKind::Workspace) => {
            // Read the size before touching the tree.
            let size = match native.window_size(wid).await {
                Ok(size) => size,
                Err(err) => {
                    warn!(%wid, %err, "Could not read window size, keeping the remembered one");
                    None
                }
            };
            let Some(ws) = engine.graph().node_workspace(node) else {
                return false;
            };
            if let (Some(size), Some(data)) = (size, engine.graph.window_data_mut(node)) {
                data.last_floating_size = Some(size);
            }
            let root = engine.root_tiling_container(ws);
            engine.graph.bind(node, root, BindIndex::Last);
            true
        }
    }
}

fn make_floating<N: NativeWindows>(
    engine: &mut LayoutEngine,
    native: &N,
    target: &LiveFocus,
    wid: WindowId,
    node: NodeId,
) -> bool {
    let ws = engine.workspace_node(&target.workspace);
    engine.graph.bind(node, ws, BindIndex::Last);
    if let Some(size) = engine.graph().window_data(node).and_then(|w| w.last_floating_size) {
        native.set_window_size(wid, size);
    }
    true
}
