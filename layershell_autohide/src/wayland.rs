//! [`AutohideSurface`] on a wlr layer surface.

use wayland_client::{
    Dispatch, QueueHandle,
    protocol::{wl_compositor::WlCompositor, wl_output::WlOutput, wl_surface::WlSurface},
};
use wayland_protocols_wlr::layer_shell::v1::client::{
    zwlr_layer_shell_v1::{Layer, ZwlrLayerShellV1},
    zwlr_layer_surface_v1::{Anchor, KeyboardInteractivity, ZwlrLayerSurfaceV1},
};

use crate::surface::{AutohideSurface, margins_with};

/// A layer surface bound to one output, stretched over the full width of it.
///
/// The compositor owns the size: feed every configure through
/// [`LayerShellSurface::configure`] and then let the window know with
/// [`crate::AutohideWindow::on_size_allocate`].
///
/// Anchor, margin and exclusive zone changes are double-buffered: they only
/// take effect with the next commit, so a position change lands as a whole.
/// Call [`LayerShellSurface::flush`] once per loop iteration.
#[derive(Debug)]
pub struct LayerShellSurface {
    wl_surface: WlSurface,
    layer_surface: ZwlrLayerSurfaceV1,
    state: PendingState,
    size: (u32, u32),
    redraw_requested: bool,
}

/// Layer surface state as last sent, and whether it still needs a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingState {
    anchor: Anchor,
    margin: (i32, i32, i32, i32),
    dirty: bool,
}

impl PendingState {
    fn new(anchor: Anchor) -> Self {
        Self {
            anchor,
            margin: (0, 0, 0, 0),
            dirty: false,
        }
    }

    /// The new anchor set, or `None` when nothing changed.
    fn set_anchor(&mut self, edge: Anchor, anchored: bool) -> Option<Anchor> {
        let anchor = if anchored {
            self.anchor | edge
        } else {
            self.anchor - edge
        };
        if anchor == self.anchor {
            return None;
        }
        self.anchor = anchor;
        self.dirty = true;
        Some(anchor)
    }

    fn set_margin(&mut self, edge: Anchor, margin: i32) -> (i32, i32, i32, i32) {
        self.margin = margins_with(self.margin, edge, margin);
        self.dirty = true;
        self.margin
    }

    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl LayerShellSurface {
    /// Create the surface on `output` with the requested height. The caller
    /// still has to commit and wait for the first configure.
    pub fn new<D>(
        compositor: &WlCompositor,
        layer_shell: &ZwlrLayerShellV1,
        output: &WlOutput,
        namespace: &str,
        height: u32,
        qh: &QueueHandle<D>,
    ) -> Self
    where
        D: Dispatch<WlSurface, ()> + Dispatch<ZwlrLayerSurfaceV1, ()> + 'static,
    {
        let wl_surface = compositor.create_surface(qh, ());
        let layer_surface = layer_shell.get_layer_surface(
            &wl_surface,
            Some(output),
            Layer::Top,
            namespace.to_owned(),
            qh,
            (),
        );
        let anchor = Anchor::Left | Anchor::Right;
        layer_surface.set_anchor(anchor);
        layer_surface.set_size(0, height);
        layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
        Self {
            wl_surface,
            layer_surface,
            state: PendingState::new(anchor),
            size: (0, height),
            redraw_requested: false,
        }
    }

    pub fn wl_surface(&self) -> &WlSurface {
        &self.wl_surface
    }

    pub fn layer_surface(&self) -> &ZwlrLayerSurfaceV1 {
        &self.layer_surface
    }

    pub fn anchor(&self) -> Anchor {
        self.state.anchor
    }

    pub fn margin(&self) -> (i32, i32, i32, i32) {
        self.state.margin
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Ack a configure and store the new size. Returns whether the size changed.
    pub fn configure(&mut self, serial: u32, width: u32, height: u32) -> bool {
        self.layer_surface.ack_configure(serial);
        let changed = self.size != (width, height);
        self.size = (width, height);
        changed
    }

    /// Take the redraw request of the last [`AutohideSurface::queue_redraw`].
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Commit unconditionally, e.g. after attaching a buffer.
    pub fn commit(&mut self) {
        self.state.dirty = false;
        self.wl_surface.commit();
    }

    /// Commit pending anchor, margin or exclusive zone changes, if any.
    /// Returns whether a commit was sent.
    pub fn flush(&mut self) -> bool {
        if !self.state.take_dirty() {
            return false;
        }
        self.wl_surface.commit();
        true
    }
}

impl AutohideSurface for LayerShellSurface {
    fn set_anchor(&mut self, edge: Anchor, anchored: bool) {
        if let Some(anchor) = self.state.set_anchor(edge, anchored) {
            self.layer_surface.set_anchor(anchor);
        }
    }

    fn set_margin(&mut self, edge: Anchor, margin: i32) {
        let (top, right, bottom, left) = self.state.set_margin(edge, margin);
        self.layer_surface.set_margin(top, right, bottom, left);
    }

    fn set_exclusive_zone(&mut self, zone: i32) {
        self.layer_surface.set_exclusive_zone(zone);
        self.state.dirty = true;
    }

    fn allocated_height(&self) -> i32 {
        self.size.1 as i32
    }

    fn queue_redraw(&mut self) {
        self.redraw_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_change_needs_one_commit() {
        let mut state = PendingState::new(Anchor::Left | Anchor::Right);
        assert_eq!(
            state.set_anchor(Anchor::Top, true),
            Some(Anchor::Left | Anchor::Right | Anchor::Top)
        );
        assert_eq!(state.set_anchor(Anchor::Bottom, false), None);
        state.set_anchor(Anchor::Top, false);
        state.set_anchor(Anchor::Bottom, true);
        assert_eq!(state.set_margin(Anchor::Bottom, -40), (0, 0, -40, 0));

        assert!(state.take_dirty());
        assert!(!state.take_dirty());
        assert_eq!(state.anchor, Anchor::Left | Anchor::Right | Anchor::Bottom);
    }

    #[test]
    fn unchanged_anchor_stays_clean() {
        let mut state = PendingState::new(Anchor::Left | Anchor::Right | Anchor::Top);
        assert_eq!(state.set_anchor(Anchor::Top, true), None);
        assert_eq!(state.set_anchor(Anchor::Bottom, false), None);
        assert!(!state.take_dirty());
    }
}
