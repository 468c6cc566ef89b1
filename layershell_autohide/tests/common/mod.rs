#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use layershell_autohide::reexport::Anchor;
use layershell_autohide::{
    AutohideError, AutohideSurface, AutohideWindow, Clock, Direction, HotspotFactory, HotspotSpec,
    TimerFired, TimerQueue,
};

#[derive(Debug)]
pub struct RecordingSurface {
    pub height: i32,
    pub anchor: Anchor,
    pub margins: Vec<(Anchor, i32)>,
    pub exclusive_zones: Vec<i32>,
    pub redraws: usize,
}

impl RecordingSurface {
    pub fn new(height: i32) -> Self {
        Self {
            height,
            anchor: Anchor::Left | Anchor::Right,
            margins: Vec::new(),
            exclusive_zones: Vec::new(),
            redraws: 0,
        }
    }

    pub fn last_margin(&self) -> Option<(Anchor, i32)> {
        self.margins.last().copied()
    }
}

impl AutohideSurface for RecordingSurface {
    fn set_anchor(&mut self, edge: Anchor, anchored: bool) {
        if anchored {
            self.anchor |= edge;
        } else {
            self.anchor -= edge;
        }
    }

    fn set_margin(&mut self, edge: Anchor, margin: i32) {
        self.margins.push((edge, margin));
    }

    fn set_exclusive_zone(&mut self, zone: i32) {
        self.exclusive_zones.push(zone);
    }

    fn allocated_height(&self) -> i32 {
        self.height
    }

    fn queue_redraw(&mut self) {
        self.redraws += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub ready: bool,
    next: u32,
    pub created: Vec<HotspotSpec>,
    pub destroyed: Vec<u32>,
}

impl RecordingOutput {
    pub fn ready() -> Self {
        Self {
            ready: true,
            ..Default::default()
        }
    }
}

impl HotspotFactory for RecordingOutput {
    type Handle = u32;

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn create_hotspot(&mut self, spec: HotspotSpec) -> Option<u32> {
        self.next += 1;
        self.created.push(spec);
        Some(self.next)
    }

    fn destroy_hotspot(&mut self, handle: u32) {
        self.destroyed.push(handle);
    }
}

/// Lets a test keep the recording once the window is gone.
impl HotspotFactory for &mut RecordingOutput {
    type Handle = u32;

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn create_hotspot(&mut self, spec: HotspotSpec) -> Option<u32> {
        (**self).create_hotspot(spec)
    }

    fn destroy_hotspot(&mut self, handle: u32) {
        (**self).destroy_hotspot(handle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Armed {
    pub token: u64,
    pub delay: Duration,
    pub fired: TimerFired,
}

/// Timers which only fire when a test says so.
#[derive(Debug, Default)]
pub struct ManualTimers {
    next: u64,
    pub armed: Vec<Armed>,
    pub cancelled: usize,
}

impl ManualTimers {
    pub fn find(&self, direction: Direction) -> Option<Armed> {
        self.armed
            .iter()
            .find(|armed| armed.fired.direction == direction)
            .copied()
    }

    pub fn take(&mut self, direction: Direction) -> Option<Armed> {
        let index = self
            .armed
            .iter()
            .position(|armed| armed.fired.direction == direction)?;
        Some(self.armed.remove(index))
    }
}

impl TimerQueue for ManualTimers {
    type Token = u64;

    fn schedule_once(&mut self, delay: Duration, fired: TimerFired) -> Result<u64, AutohideError> {
        self.next += 1;
        self.armed.push(Armed {
            token: self.next,
            delay,
            fired,
        });
        Ok(self.next)
    }

    fn cancel(&mut self, token: u64) {
        self.cancelled += 1;
        self.armed.retain(|armed| armed.token != token);
    }
}

impl TimerQueue for &mut ManualTimers {
    type Token = u64;

    fn schedule_once(&mut self, delay: Duration, fired: TimerFired) -> Result<u64, AutohideError> {
        (**self).schedule_once(delay, fired)
    }

    fn cancel(&mut self, token: u64) {
        (**self).cancel(token)
    }
}

#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

pub type TestWindow = AutohideWindow<RecordingSurface, RecordingOutput, ManualTimers, ManualClock>;

pub fn window(height: i32) -> (TestWindow, ManualClock) {
    let clock = ManualClock::new();
    let window = AutohideWindow::new(
        RecordingSurface::new(height),
        RecordingOutput::ready(),
        ManualTimers::default(),
        clock.clone(),
    );
    (window, clock)
}

/// Fire the armed timer of `direction`, if any. Returns whether one fired.
pub fn fire(window: &mut TestWindow, direction: Direction) -> bool {
    match window.timers_mut().take(direction) {
        Some(armed) => {
            window.on_timer(armed.fired);
            true
        }
        None => false,
    }
}

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

pub fn assert_single_pending(window: &TestWindow) {
    assert!(
        !(window.is_pending(Direction::Hide) && window.is_pending(Direction::Show)),
        "both a hide and a show are pending"
    );
    assert!(window.timers().armed.len() <= 1, "{:?}", window.timers().armed);
}
