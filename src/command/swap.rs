use super::{CmdIo, SwapArgs, SwapTarget};
use crate::layout_engine::LayoutEngine;
use crate::sys::native::NativeWindows;

pub(super) fn run<N: NativeWindows>(
    args: &SwapArgs,
    engine: &mut LayoutEngine,
    native: &N,
    io: &mut CmdIo,
) -> bool {
    let Some(target) = args.window.resolve_target_or_report_error(engine, io) else {
        return false;
    };
    let Some((_, current)) = target.window_or_report(engine, io) else {
        return false;
    };

    let ws = engine.workspace_node(&target.workspace);
    let clients = engine.tiling_clients(ws);
    let Some(index) = clients.iter().position(|&c| c == current) else {
        return false;
    };
    let target_index = match args.target {
        SwapTarget::Master => Some(0),
        SwapTarget::Direction(direction) => {
            step(index, direction.offset(), clients.len(), args.wrap_around)
        }
        SwapTarget::DfsRelative(next_prev) => {
            step(index, next_prev.offset(), clients.len(), args.wrap_around)
        }
    };
    let Some(other) = target_index.and_then(|i| clients.get(i).copied()) else {
        return false;
    };

    engine.graph.swap_windows(current, other);

    if args.swap_focus {
        let Some(other_id) = engine.graph().window_id(other) else {
            return false;
        };
        return engine.focus_window(other_id, native);
    }
    true
}

/// Moves `offset` places through a stack of `len`, wrapping around the ends
/// if allowed.
fn step(index: usize, offset: isize, len: usize, wrap_around: bool) -> Option<usize> {
    let next = index as isize + offset;
    if (0..len as isize).contains(&next) {
        Some(next as usize)
    } else if wrap_around && len > 0 {
        Some(next.rem_euclid(len as isize) as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::step;

    #[test]
    fn stepping() {
        assert_eq!(step(0, 1, 3, false), Some(1));
        assert_eq!(step(2, 1, 3, false), None);
        assert_eq!(step(2, 1, 3, true), Some(0));
        assert_eq!(step(0, -1, 3, false), None);
        assert_eq!(step(0, -1, 3, true), Some(2));
        assert_eq!(step(0, 1, 1, true), Some(0));
    }
}
