//! # Auto-hiding edge panel for layer_shell
//!
//! An [`AutohideWindow`] anchors a layer surface to the top or bottom edge of an
//! output and slides it in and out of view by animating the margin on that edge.
//! Pointer proximity is tracked with two wayfire-shell hotspots: a thin strip on
//! the screen edge which reveals the panel, and one covering the whole panel
//! which hides it again once the pointer leaves.
//!
//! The window itself only decides *when* to start an animation and *where* to.
//! Everything it talks to is behind a trait so it can run against the real
//! protocol objects or against test doubles:
//!
//! - [`AutohideSurface`]: the layer surface (anchor, margin, exclusive zone)
//! - [`HotspotFactory`]: the output hotspot factory
//! - [`TimerQueue`]: one-shot timers, see [`timer::LoopTimers`] for calloop
//! - [`Clock`]: the time source of the margin transition
//!
//! Minimal wiring on a calloop event loop:
//!
//! ```rust, ignore
//! let timers = LoopTimers::new(event_loop.handle(), |state: &mut State, fired| {
//!     state.panel.on_timer(fired)
//! });
//! let mut panel = AutohideWindow::new(surface, wayfire_output, timers, SystemClock);
//! panel.set_position(&ConfigOption::new_static("bottom"));
//! panel.set_auto_exclusive_zone(true);
//! panel.increase_autohide();
//! ```
//!
pub mod config;
mod counter;
pub mod hotspot;
pub mod position;
mod scheduler;
pub mod surface;
pub mod timer;
pub mod transition;
pub mod wayfire;
pub mod wayland;
mod window;

pub use config::{AutohideSettings, ConfigOption, HandlerId};
pub use counter::AutohideCounter;
pub use hotspot::{HotspotEdge, HotspotEvent, HotspotFactory, HotspotKind, HotspotSpec};
pub use position::Position;
pub use scheduler::{Direction, TimerFired, TimerQueue};
pub use surface::AutohideSurface;
pub use transition::{Clock, SystemClock, Transition};
pub use window::AutohideWindow;

pub use calloop;

use wayland_client::{
    ConnectError, DispatchError,
    globals::{BindError, GlobalError},
};

#[derive(Debug, thiserror::Error)]
pub enum AutohideError {
    #[error("invalid position `{0}`, expected `top` or `bottom`")]
    InvalidPosition(String),
    #[error("invalid animation duration `{0}`")]
    InvalidDuration(String),
    #[error("connect error")]
    ConnectError(#[from] ConnectError),
    #[error("Global Error")]
    GlobalError(#[from] GlobalError),
    #[error("Bind Error")]
    BindError(#[from] BindError),
    #[error("Error during queue")]
    DispatchError(#[from] DispatchError),
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("Event Loop Error")]
    EventLoop(#[from] calloop::Error),
}

pub mod reexport {
    pub use wayland_protocols_wlr::layer_shell::v1::client::{
        zwlr_layer_shell_v1::{Layer, ZwlrLayerShellV1},
        zwlr_layer_surface_v1::{self, Anchor, KeyboardInteractivity, ZwlrLayerSurfaceV1},
    };
}
