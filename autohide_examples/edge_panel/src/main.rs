use std::fs::File;
use std::io::{BufWriter, Write};
use std::os::fd::AsFd;
use std::time::Duration;

use calloop_wayland_source::WaylandSource;
use layershell_autohide::calloop::{EventLoop, ping::make_ping};
use layershell_autohide::reexport::{ZwlrLayerShellV1, ZwlrLayerSurfaceV1, zwlr_layer_surface_v1};
use layershell_autohide::timer::LoopTimers;
use layershell_autohide::wayfire::{
    HotspotData, HotspotHandler, WayfireOutput, WayfireOutputEvent, WayfireOutputHandler,
    zwf_hotspot_v2::ZwfHotspotV2, zwf_output_v2::ZwfOutputV2,
    zwf_shell_manager_v2::ZwfShellManagerV2,
};
use layershell_autohide::wayland::LayerShellSurface;
use layershell_autohide::{
    AutohideError, AutohideWindow, ConfigOption, HotspotEvent, SystemClock,
};
use tracing_subscriber::EnvFilter;
use wayland_client::{
    Connection, Dispatch, QueueHandle, delegate_dispatch, delegate_noop,
    globals::{GlobalListContents, registry_queue_init},
    protocol::{
        wl_buffer::WlBuffer,
        wl_compositor::WlCompositor,
        wl_output::WlOutput,
        wl_registry::{self, WlRegistry},
        wl_shm::{self, WlShm},
        wl_shm_pool::WlShmPool,
        wl_surface::WlSurface,
    },
};

const DEFAULT_HEIGHT: u32 = 40;
const PANEL_COLOR: u32 = 0xee_28_2a_36;

type Panel = AutohideWindow<
    LayerShellSurface,
    WayfireOutput<PanelState>,
    LoopTimers<PanelState>,
    SystemClock,
>;

/// Settings read from the environment once, at startup.
#[derive(Debug)]
struct PanelConfig {
    position: String,
    duration: String,
    height: u32,
    autohide: bool,
}

impl PanelConfig {
    fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        let height = match var("EDGE_PANEL_HEIGHT").map(|height| height.parse::<u32>()) {
            Some(Ok(height)) if height > 0 => height,
            Some(_) => {
                tracing::warn!("EDGE_PANEL_HEIGHT is not a positive number, using {DEFAULT_HEIGHT}");
                DEFAULT_HEIGHT
            }
            None => DEFAULT_HEIGHT,
        };
        Self {
            position: var("EDGE_PANEL_POSITION").unwrap_or_else(|| "top".to_owned()),
            duration: var("EDGE_PANEL_DURATION").unwrap_or_else(|| "300".to_owned()),
            height,
            autohide: var("EDGE_PANEL_AUTOHIDE").is_none_or(|value| value != "0"),
        }
    }
}

struct PanelState {
    panel: Panel,
    shm: WlShm,
    qh: QueueHandle<PanelState>,
    buffer: Option<WlBuffer>,
    exit: bool,
}

impl PanelState {
    fn attach_buffer(&mut self, width: u32, height: u32) -> Result<(), AutohideError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let mut file = tempfile::tempfile()?;
        draw(&mut file, (width, height))?;
        let pool = self
            .shm
            .create_pool(file.as_fd(), (width * height * 4) as i32, &self.qh, ());
        let buffer = pool.create_buffer(
            0,
            width as i32,
            height as i32,
            (width * 4) as i32,
            wl_shm::Format::Argb8888,
            &self.qh,
            (),
        );
        pool.destroy();

        let surface = self.panel.surface().wl_surface();
        surface.attach(Some(&buffer), 0, 0);
        surface.damage_buffer(0, 0, width as i32, height as i32);
        if let Some(old) = self.buffer.replace(buffer) {
            old.destroy();
        }
        Ok(())
    }
}

fn draw(tmp: &mut File, (width, height): (u32, u32)) -> std::io::Result<()> {
    let mut buf = BufWriter::new(tmp);
    for _ in 0..width * height {
        buf.write_all(&PANEL_COLOR.to_ne_bytes())?;
    }
    buf.flush()
}

impl Dispatch<WlRegistry, GlobalListContents> for PanelState {
    fn event(
        _state: &mut Self,
        _proxy: &WlRegistry,
        _event: wl_registry::Event,
        _data: &GlobalListContents,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<ZwlrLayerSurfaceV1, ()> for PanelState {
    fn event(
        state: &mut Self,
        _proxy: &ZwlrLayerSurfaceV1,
        event: zwlr_layer_surface_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_layer_surface_v1::Event::Configure {
                serial,
                width,
                height,
            } => {
                let resized = state.panel.surface_mut().configure(serial, width, height);
                if (resized || state.buffer.is_none())
                    && let Err(err) = state.attach_buffer(width, height)
                {
                    tracing::error!("cannot draw the panel: {err}");
                }
                state.panel.on_size_allocate();
                state.panel.update_margin();
                state.panel.surface_mut().commit();
            }
            zwlr_layer_surface_v1::Event::Closed => {
                tracing::info!("layer surface closed");
                state.exit = true;
            }
            _ => {}
        }
    }
}

impl HotspotHandler for PanelState {
    fn hotspot_event(&mut self, data: HotspotData, event: HotspotEvent) {
        tracing::debug!("{:?} hotspot: {event:?}", data.kind);
        self.panel.on_hotspot(data.generation, data.kind, event);
    }
}

impl WayfireOutputHandler for PanelState {
    fn wayfire_output_event(&mut self, event: WayfireOutputEvent) {
        match event {
            WayfireOutputEvent::EnterFullscreen => self.panel.set_fullscreen(true),
            WayfireOutputEvent::LeaveFullscreen => self.panel.set_fullscreen(false),
            WayfireOutputEvent::ToggleMenu => {}
        }
    }
}

delegate_noop!(PanelState: ignore WlCompositor);
delegate_noop!(PanelState: ignore WlShmPool);
delegate_noop!(PanelState: ignore ZwlrLayerShellV1);
delegate_noop!(PanelState: ignore WlSurface);
delegate_noop!(PanelState: ignore WlShm);
delegate_noop!(PanelState: ignore WlBuffer);
delegate_noop!(PanelState: ignore WlOutput);

delegate_dispatch!(PanelState: [ZwfShellManagerV2: ()] => ());
delegate_dispatch!(PanelState: [ZwfOutputV2: ()] => ());
delegate_dispatch!(PanelState: [ZwfHotspotV2: HotspotData] => ());

fn main() -> Result<(), AutohideError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = PanelConfig::from_env();
    tracing::info!("starting edge panel with {config:?}");

    let connection = Connection::connect_to_env()?;
    let (globals, event_queue) = registry_queue_init::<PanelState>(&connection)?;
    let qh = event_queue.handle();

    let compositor: WlCompositor = globals.bind(&qh, 4..=6, ())?;
    let shm: WlShm = globals.bind(&qh, 1..=1, ())?;
    let layer_shell: ZwlrLayerShellV1 = globals.bind(&qh, 3..=4, ())?;
    let output: WlOutput = globals.bind(&qh, 1..=4, ())?;
    let wayfire_shell: Option<ZwfShellManagerV2> = globals.bind(&qh, 1..=2, ()).ok();

    let mut event_loop: EventLoop<'static, PanelState> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    let surface = LayerShellSurface::new(
        &compositor,
        &layer_shell,
        &output,
        "edge_panel",
        config.height,
        &qh,
    );
    let mut hotspots = WayfireOutput::new(qh.clone());
    match &wayfire_shell {
        Some(shell) => hotspots.set_output(shell.get_wf_output(&output, &qh, ())),
        None => tracing::warn!("zwf_shell_manager_v2 is not available, the panel will not autohide"),
    }
    let timers = LoopTimers::new(handle.clone(), |state: &mut PanelState, fired| {
        state.panel.on_timer(fired)
    });
    let mut panel = AutohideWindow::new(surface, hotspots, timers, SystemClock);

    let (ping, ping_source) = make_ping()?;
    handle
        .insert_source(ping_source, |_, _, state: &mut PanelState| {
            state.panel.dispatch_option_updates()
        })
        .map_err(|err| AutohideError::EventLoop(err.error))?;
    panel.set_update_waker(ping);

    let position = ConfigOption::new(config.position);
    let duration = ConfigOption::new(config.duration);
    panel.set_position(&position);
    panel.set_animation_duration(&duration);
    panel.set_auto_exclusive_zone(!config.autohide);
    if config.autohide {
        panel.increase_autohide();
    }
    panel.surface_mut().commit();

    WaylandSource::new(connection, event_queue)
        .insert(handle)
        .map_err(|err| AutohideError::EventLoop(err.error))?;

    let mut state = PanelState {
        panel,
        shm,
        qh,
        buffer: None,
        exit: false,
    };
    let signal = event_loop.get_signal();
    event_loop.run(Duration::from_millis(16), &mut state, |state| {
        if state.panel.surface_mut().take_redraw_request() {
            state.panel.update_margin();
        }
        // timers and hotspots only stage surface state
        state.panel.surface_mut().flush();
        if state.exit {
            signal.stop();
        }
    })?;
    Ok(())
}
