//! Client-side implementation of the wayfire shell protocol (zwf_shell_manager_v2)
//!
//! This protocol gives panels and docks per-output hotspots, which is how an
//! autohide window learns about the pointer while it is off-screen, and tells
//! them when a window goes fullscreen on the output.

use wayland_client::{Connection, Dispatch, QueueHandle};

// Re-export generated types
pub use generated::{zwf_hotspot_v2, zwf_output_v2, zwf_shell_manager_v2, zwf_surface_v2};

use crate::hotspot::{HotspotEvent, HotspotFactory, HotspotKind, HotspotSpec};

#[allow(
    non_snake_case,
    non_upper_case_globals,
    non_camel_case_types,
    dead_code,
    unused_imports
)]
mod generated {
    use wayland_client;
    use wayland_client::protocol::*;

    pub mod __interfaces {
        use wayland_backend;
        use wayland_client::protocol::__interfaces::*;
        wayland_scanner::generate_interfaces!("protocols/wayfire-shell-unstable-v2.xml");
    }
    use self::__interfaces::*;

    wayland_scanner::generate_client_code!("protocols/wayfire-shell-unstable-v2.xml");
}

/// User data for hotspot objects - which hotspot of which generation it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotspotData {
    pub kind: HotspotKind,
    pub generation: u64,
}

/// Events of a wayfire output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WayfireOutputEvent {
    EnterFullscreen,
    LeaveFullscreen,
    ToggleMenu,
}

/// Trait for handling hotspot enter/leave
pub trait HotspotHandler {
    fn hotspot_event(&mut self, data: HotspotData, event: HotspotEvent);
}

/// Trait for handling output events
pub trait WayfireOutputHandler {
    fn wayfire_output_event(&mut self, event: WayfireOutputEvent);
}

/// Hotspot factory of one output.
///
/// The output object is usually created after the window, once the wl_output
/// is known, so it starts out empty.
#[derive(Debug)]
pub struct WayfireOutput<D> {
    output: Option<zwf_output_v2::ZwfOutputV2>,
    qh: QueueHandle<D>,
}

impl<D> WayfireOutput<D> {
    pub fn new(qh: QueueHandle<D>) -> Self {
        Self { output: None, qh }
    }

    pub fn with_output(mut self, output: zwf_output_v2::ZwfOutputV2) -> Self {
        self.output = Some(output);
        self
    }

    pub fn set_output(&mut self, output: zwf_output_v2::ZwfOutputV2) {
        self.output = Some(output);
    }

    pub fn output(&self) -> Option<&zwf_output_v2::ZwfOutputV2> {
        self.output.as_ref()
    }
}

impl<D> HotspotFactory for WayfireOutput<D>
where
    D: Dispatch<zwf_hotspot_v2::ZwfHotspotV2, HotspotData> + 'static,
{
    type Handle = zwf_hotspot_v2::ZwfHotspotV2;

    fn is_ready(&self) -> bool {
        self.output.is_some()
    }

    fn create_hotspot(&mut self, spec: HotspotSpec) -> Option<zwf_hotspot_v2::ZwfHotspotV2> {
        let data = HotspotData {
            kind: spec.kind,
            generation: spec.generation,
        };
        let output = self.output.as_ref()?;
        Some(output.create_hotspot(
            spec.edge.protocol_value(),
            spec.threshold,
            spec.timeout.as_millis() as u32,
            &self.qh,
            data,
        ))
    }

    fn destroy_hotspot(&mut self, handle: zwf_hotspot_v2::ZwfHotspotV2) {
        handle.destroy();
    }
}

/// Blanket implementation for shell manager dispatch
impl<D> Dispatch<zwf_shell_manager_v2::ZwfShellManagerV2, (), D> for ()
where
    D: Dispatch<zwf_shell_manager_v2::ZwfShellManagerV2, ()>,
{
    fn event(
        _state: &mut D,
        _proxy: &zwf_shell_manager_v2::ZwfShellManagerV2,
        _event: zwf_shell_manager_v2::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<D>,
    ) {
        // No events defined for the manager
    }
}

/// Blanket implementation for wayfire output dispatch
impl<D> Dispatch<zwf_output_v2::ZwfOutputV2, (), D> for ()
where
    D: Dispatch<zwf_output_v2::ZwfOutputV2, ()> + WayfireOutputHandler,
{
    fn event(
        state: &mut D,
        _proxy: &zwf_output_v2::ZwfOutputV2,
        event: zwf_output_v2::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<D>,
    ) {
        let event = match event {
            zwf_output_v2::Event::EnterFullscreen => WayfireOutputEvent::EnterFullscreen,
            zwf_output_v2::Event::LeaveFullscreen => WayfireOutputEvent::LeaveFullscreen,
            zwf_output_v2::Event::ToggleMenu => WayfireOutputEvent::ToggleMenu,
        };
        log::debug!("wayfire output event: {event:?}");
        state.wayfire_output_event(event);
    }
}

/// Blanket implementation for hotspot dispatch
impl<D> Dispatch<zwf_hotspot_v2::ZwfHotspotV2, HotspotData, D> for ()
where
    D: Dispatch<zwf_hotspot_v2::ZwfHotspotV2, HotspotData> + HotspotHandler,
{
    fn event(
        state: &mut D,
        _proxy: &zwf_hotspot_v2::ZwfHotspotV2,
        event: zwf_hotspot_v2::Event,
        data: &HotspotData,
        _conn: &Connection,
        _qhandle: &QueueHandle<D>,
    ) {
        let event = match event {
            zwf_hotspot_v2::Event::Enter => HotspotEvent::Enter,
            zwf_hotspot_v2::Event::Leave => HotspotEvent::Leave,
        };
        state.hotspot_event(*data, event);
    }
}

/// Blanket implementation for wayfire surface dispatch
impl<D> Dispatch<zwf_surface_v2::ZwfSurfaceV2, (), D> for ()
where
    D: Dispatch<zwf_surface_v2::ZwfSurfaceV2, ()>,
{
    fn event(
        _state: &mut D,
        _proxy: &zwf_surface_v2::ZwfSurfaceV2,
        _event: zwf_surface_v2::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<D>,
    ) {
        // No events for surface objects
    }
}
