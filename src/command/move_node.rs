use super::{Boundaries, BoundariesAction, CmdIo, CommandError, MoveArgs};
use crate::layout_engine::{LayoutEngine, LiveFocus};
use crate::model::{NodeId, ParentKind, SystemContainerKind, WindowId};
use crate::sys::native::NativeWindows;

pub(super) fn run<N: NativeWindows>(
    args: &MoveArgs,
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
    match engine.graph().parent_kind(node) {
        None => false,
        Some(ParentKind::Workspace) => io.fail(CommandError::MoveFloatingUnsupported),
        Some(ParentKind::System(SystemContainerKind::Popups)) => false,
        Some(ParentKind::System(_)) => io.fail(CommandError::MoveSystemUnsupported),
        Some(ParentKind::TilingContainer) => {
            move_in_stack(args, engine, native, &target, wid, node)
        }
    }
}

fn move_in_stack<N: NativeWindows>(
    args: &MoveArgs,
    engine: &mut LayoutEngine,
    native: &N,
    target: &LiveFocus,
    wid: WindowId,
    node: NodeId,
) -> bool {
    let ws = engine.workspace_node(&target.workspace);
    let mut clients = engine.tiling_clients(ws);
    let Some(index) = clients.iter().position(|&c| c == node) else {
        return false;
    };

    let swap_index =
        index.checked_add_signed(args.direction.offset()).filter(|&i| i < clients.len());
    if let Some(swap_index) = swap_index {
        clients.swap(index, swap_index);
        engine.rebind_tiling_clients(ws, &clients);
        return true;
    }

    match (args.boundaries, args.boundaries_action) {
        (Boundaries::Workspace, BoundariesAction::Stop) => true,
        (Boundaries::Workspace, BoundariesAction::Fail) => false,
        (Boundaries::Workspace, BoundariesAction::CreateImplicitContainer) => true,
        (Boundaries::AllMonitorsOuterFrame, _) => {
            let focus_follows_window = engine.focus().window == Some(wid);
            native.move_node_to_monitor(wid, args.direction, focus_follows_window)
        }
    }
}
