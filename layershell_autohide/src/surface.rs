use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_surface_v1::Anchor;

/// The toolkit window an [`crate::AutohideWindow`] drives.
///
/// Edges are given as single-edge [`Anchor`] values. Implementations are
/// expected to be bound to their output and undecorated already.
pub trait AutohideSurface {
    /// Add or remove `edge` from the anchor set.
    fn set_anchor(&mut self, edge: Anchor, anchored: bool);

    fn set_margin(&mut self, edge: Anchor, margin: i32);

    fn set_exclusive_zone(&mut self, zone: i32);

    /// The height the compositor allocated for the surface.
    fn allocated_height(&self) -> i32;

    /// Ask for another redraw tick.
    fn queue_redraw(&mut self);
}

/// Margins `(top, right, bottom, left)` with the one on `edge` replaced.
pub fn margins_with(
    (top, right, bottom, left): (i32, i32, i32, i32),
    edge: Anchor,
    margin: i32,
) -> (i32, i32, i32, i32) {
    (
        if edge.contains(Anchor::Top) { margin } else { top },
        if edge.contains(Anchor::Right) { margin } else { right },
        if edge.contains(Anchor::Bottom) { margin } else { bottom },
        if edge.contains(Anchor::Left) { margin } else { left },
    )
}
