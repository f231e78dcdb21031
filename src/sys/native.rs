//! The native windowing layer, as seen by the tiling core.

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::common::collections::HashMap;
use crate::common::geometry::Size;
use crate::layout_engine::Direction;
use crate::model::WindowId;

#[derive(Debug, Error, PartialEq)]
pub enum NativeError {
    #[error("Window {0} is gone")]
    WindowGone(WindowId),
    #[error("Native request failed: {0}")]
    RequestFailed(String),
}

/// Effects the core asks the native layer to realize.
///
/// Everything except reading a window's size is fire-and-forget.
#[allow(async_fn_in_trait)]
pub trait NativeWindows {
    /// The size the window is currently displayed at.
    async fn window_size(&self, wid: WindowId) -> Result<Option<Size>, NativeError>;

    fn set_window_size(&self, wid: WindowId, size: Size);

    /// Returns false if the window could not be focused.
    fn focus_window(&self, wid: WindowId) -> bool;

    /// Moves a window to the neighbouring monitor in `direction`.
    fn move_node_to_monitor(
        &self,
        wid: WindowId,
        direction: Direction,
        focus_follows_window: bool,
    ) -> bool;
}

#[derive(Clone, Debug, PartialEq)]
pub enum NativeRequest {
    Focus(WindowId),
    SetSize(WindowId, Size),
    MoveToMonitor {
        wid: WindowId,
        direction: Direction,
        focus_follows_window: bool,
    },
}

/// A native layer without a screen. It answers from a table of window sizes
/// and records every request it receives.
#[derive(Default)]
pub struct HeadlessNative {
    state: Mutex<HeadlessState>,
}

#[derive(Default)]
struct HeadlessState {
    sizes: HashMap<WindowId, Size>,
    unreadable: Vec<WindowId>,
    closed: Vec<WindowId>,
    requests: Vec<NativeRequest>,
}

impl HeadlessNative {
    pub fn new() -> Self { Self::default() }

    pub fn set_size(&self, wid: WindowId, size: Size) {
        self.state.lock().sizes.insert(wid, size);
    }

    /// Makes size reads for `wid` fail.
    pub fn make_unreadable(&self, wid: WindowId) { self.state.lock().unreadable.push(wid); }

    /// Simulates the window disappearing behind the core's back.
    pub fn close_window(&self, wid: WindowId) {
        let mut state = self.state.lock();
        state.sizes.remove(&wid);
        state.closed.push(wid);
    }

    pub fn requests(&self) -> Vec<NativeRequest> { self.state.lock().requests.clone() }

    pub fn take_requests(&self) -> Vec<NativeRequest> {
        std::mem::take(&mut self.state.lock().requests)
    }
}

impl NativeWindows for HeadlessNative {
    async fn window_size(&self, wid: WindowId) -> Result<Option<Size>, NativeError> {
        let state = self.state.lock();
        if state.closed.contains(&wid) {
            return Err(NativeError::WindowGone(wid));
        }
        if state.unreadable.contains(&wid) {
            return Err(NativeError::RequestFailed(format!("size of window {wid}")));
        }
        Ok(state.sizes.get(&wid).copied())
    }

    fn set_window_size(&self, wid: WindowId, size: Size) {
        debug!(%wid, ?size, "set window size");
        let mut state = self.state.lock();
        state.sizes.insert(wid, size);
        state.requests.push(NativeRequest::SetSize(wid, size));
    }

    fn focus_window(&self, wid: WindowId) -> bool {
        debug!(%wid, "focus window");
        let mut state = self.state.lock();
        if state.closed.contains(&wid) {
            return false;
        }
        state.requests.push(NativeRequest::Focus(wid));
        true
    }

    fn move_node_to_monitor(
        &self,
        wid: WindowId,
        direction: Direction,
        focus_follows_window: bool,
    ) -> bool {
        debug!(%wid, ?direction, focus_follows_window, "move window to monitor");
        self.state.lock().requests.push(NativeRequest::MoveToMonitor {
            wid,
            direction,
            focus_follows_window,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn headless_answers_and_records() {
        let native = HeadlessNative::new();
        let wid = WindowId(7);
        assert_eq!(native.window_size(wid).await, Ok(None));
        native.set_size(wid, Size::new(800., 600.));
        assert_eq!(native.window_size(wid).await, Ok(Some(Size::new(800., 600.))));

        assert!(native.focus_window(wid));
        native.set_window_size(wid, Size::new(10., 10.));
        assert_eq!(
            native.take_requests(),
            [
                NativeRequest::Focus(wid),
                NativeRequest::SetSize(wid, Size::new(10., 10.))
            ]
        );
        assert!(native.requests().is_empty());

        native.make_unreadable(wid);
        assert!(native.window_size(wid).await.is_err());
    }

    #[tokio::test]
    async fn closed_window_is_gone() {
        let native = HeadlessNative::new();
        let wid = WindowId(3);
        native.set_size(wid, Size::new(800., 600.));
        native.close_window(wid);
        assert_eq!(native.window_size(wid).await, Err(NativeError::WindowGone(wid)));
        assert!(!native.focus_window(wid));
        assert!(native.requests().is_empty());
    }
}
