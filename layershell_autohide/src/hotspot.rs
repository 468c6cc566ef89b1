//! The two pointer hotspots of an autohide window.
//!
//! An autohide window needs 2 hotspots. The edge hotspot is a tiny strip on the
//! edge of the output which reveals the window. The panel hotspot covers the
//! whole window and tells us when the pointer leaves it, so it can be hidden
//! again.

use std::time::Duration;

use crate::config::AutohideSettings;
use crate::position::Position;

/// Output edge of a hotspot, valued as the wayfire-shell `hotspot_edge` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum HotspotEdge {
    Top = 1,
    Bottom = 2,
}

impl HotspotEdge {
    pub fn protocol_value(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotspotKind {
    /// Thin strip at the screen border.
    Edge,
    /// The whole window footprint.
    Panel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotEvent {
    Enter,
    Leave,
}

/// What to ask the output for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotspotSpec {
    pub kind: HotspotKind,
    pub edge: HotspotEdge,
    /// Distance from the output edge, in pixels.
    pub threshold: u32,
    /// How long the pointer must stay before `enter` is sent.
    pub timeout: Duration,
    /// Bumped on every recreation, events from older hotspots carry the old value.
    pub generation: u64,
}

/// An output-scoped hotspot factory.
pub trait HotspotFactory {
    type Handle;

    /// False while there is no output object to create hotspots on.
    fn is_ready(&self) -> bool;

    /// `None` when the hotspot could not be created.
    fn create_hotspot(&mut self, spec: HotspotSpec) -> Option<Self::Handle>;

    fn destroy_hotspot(&mut self, handle: Self::Handle);
}

#[derive(Debug)]
struct Hotspots<H> {
    edge: H,
    panel: H,
}

/// Owns the factory and the current pair of hotspots. Both are destroyed when
/// the pair is dropped.
#[derive(Debug)]
pub struct HotspotPair<F: HotspotFactory> {
    factory: F,
    hotspots: Option<Hotspots<F::Handle>>,
    geometry: Option<(Position, i32)>,
    generation: u64,
}

impl<F: HotspotFactory> HotspotPair<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            hotspots: None,
            geometry: None,
            generation: 0,
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_created(&self) -> bool {
        self.hotspots.is_some()
    }

    /// Recreate both hotspots for the given geometry.
    ///
    /// Nothing happens when the output is not ready, or when position and
    /// height are the ones the current hotspots were created with. Returns
    /// whether the hotspots were recreated.
    pub fn update(&mut self, position: Position, height: i32, settings: &AutohideSettings) -> bool {
        if !self.factory.is_ready() {
            return false;
        }
        if self.geometry == Some((position, height)) {
            return false;
        }
        self.geometry = Some((position, height));
        self.destroy();
        self.generation += 1;

        let edge = position.hotspot_edge();
        let edge_hotspot = self.factory.create_hotspot(HotspotSpec {
            kind: HotspotKind::Edge,
            edge,
            threshold: settings.edge_threshold,
            timeout: settings.edge_show_delay,
            generation: self.generation,
        });
        let panel_hotspot = self.factory.create_hotspot(HotspotSpec {
            kind: HotspotKind::Panel,
            edge,
            threshold: height.max(0) as u32,
            // immediate
            timeout: Duration::ZERO,
            generation: self.generation,
        });
        match (edge_hotspot, panel_hotspot) {
            (Some(edge), Some(panel)) => {
                self.hotspots = Some(Hotspots { edge, panel });
                log::debug!(
                    "created {position} hotspots for height {height} (generation {})",
                    self.generation
                );
                true
            }
            (edge, panel) => {
                log::warn!("cannot create {position} hotspots");
                for hotspot in [edge, panel].into_iter().flatten() {
                    self.factory.destroy_hotspot(hotspot);
                }
                // retry on the next update
                self.geometry = None;
                false
            }
        }
    }

    fn destroy(&mut self) {
        if let Some(Hotspots { edge, panel }) = self.hotspots.take() {
            self.factory.destroy_hotspot(edge);
            self.factory.destroy_hotspot(panel);
        }
    }
}

impl<F: HotspotFactory> Drop for HotspotPair<F> {
    fn drop(&mut self) {
        self.destroy();
    }
}
