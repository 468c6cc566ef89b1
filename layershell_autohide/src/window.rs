use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use calloop::ping::Ping;
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_surface_v1::Anchor;

use crate::config::{
    AutohideSettings, ConfigOption, DEFAULT_ANIMATION_DURATION, DEFAULT_POSITION, HandlerId,
};
use crate::counter::AutohideCounter;
use crate::hotspot::{HotspotEvent, HotspotFactory, HotspotKind, HotspotPair};
use crate::position::Position;
use crate::scheduler::{Direction, Scheduler, TimerFired, TimerQueue};
use crate::surface::AutohideSurface;
use crate::transition::{Clock, SystemClock, Transition};

/// Option changes seen by the handlers, applied by
/// [`AutohideWindow::dispatch_option_updates`].
#[derive(Default)]
struct OptionUpdates {
    position: Cell<bool>,
    duration: Cell<bool>,
    waker: RefCell<Option<Ping>>,
}

impl OptionUpdates {
    fn handler(updates: Weak<Self>, select: fn(&Self) -> &Cell<bool>) -> impl Fn() + 'static {
        move || {
            let Some(updates) = updates.upgrade() else {
                return;
            };
            select(&updates).set(true);
            if let Some(waker) = updates.waker.borrow().as_ref() {
                waker.ping();
            }
        }
    }
}

/// An edge-anchored window which slides out of view in autohide mode.
///
/// The host feeds it events from its main loop:
/// - [`AutohideWindow::update_margin`] on every redraw tick
/// - [`AutohideWindow::on_size_allocate`] whenever the surface was (re)configured
/// - [`AutohideWindow::on_hotspot`] for hotspot enter/leave
/// - [`AutohideWindow::on_timer`] when a timer armed through `Q` expires
/// - [`AutohideWindow::dispatch_option_updates`] after an option changed
pub struct AutohideWindow<S, F, Q, C = SystemClock>
where
    S: AutohideSurface,
    F: HotspotFactory,
    Q: TimerQueue,
    C: Clock,
{
    surface: S,
    hotspots: HotspotPair<F>,
    scheduler: Scheduler<Q>,
    clock: C,
    settings: AutohideSettings,

    transition: Transition,
    position: Position,
    position_option: ConfigOption,
    position_handler: Option<HandlerId>,
    duration_option: ConfigOption,
    duration_handler: Option<HandlerId>,
    updates: Rc<OptionUpdates>,

    autohide: AutohideCounter,
    fullscreen: bool,
    has_auto_exclusive_zone: bool,
    last_zone: Option<i32>,
    last_margin: Option<i32>,
}

impl<S, F, Q, C> AutohideWindow<S, F, Q, C>
where
    S: AutohideSurface,
    F: HotspotFactory,
    Q: TimerQueue,
    C: Clock,
{
    pub fn new(surface: S, output: F, timers: Q, clock: C) -> Self {
        Self::new_with_settings(surface, output, timers, clock, AutohideSettings::default())
    }

    pub fn new_with_settings(
        surface: S,
        output: F,
        timers: Q,
        clock: C,
        settings: AutohideSettings,
    ) -> Self {
        let now = clock.now();
        let mut window = Self {
            surface,
            hotspots: HotspotPair::new(output),
            scheduler: Scheduler::new(timers),
            clock,
            settings,
            transition: Transition::new(DEFAULT_ANIMATION_DURATION, now),
            position: Position::default(),
            position_option: ConfigOption::new_static(DEFAULT_POSITION),
            position_handler: None,
            duration_option: ConfigOption::new_static(""),
            duration_handler: None,
            updates: Rc::default(),
            autohide: AutohideCounter::default(),
            fullscreen: false,
            has_auto_exclusive_zone: false,
            last_zone: None,
            last_margin: None,
        };
        window.apply_anchor();
        window.set_animation_duration(&ConfigOption::new_static(
            DEFAULT_ANIMATION_DURATION.as_millis().to_string(),
        ));
        window
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn hotspot_factory(&self) -> &F {
        self.hotspots.factory()
    }

    pub fn hotspot_factory_mut(&mut self) -> &mut F {
        self.hotspots.factory_mut()
    }

    /// Generation of the current hotspots, see [`AutohideWindow::on_hotspot`].
    pub fn hotspot_generation(&self) -> u64 {
        self.hotspots.generation()
    }

    pub fn timers(&self) -> &Q {
        self.scheduler.queue()
    }

    pub fn timers_mut(&mut self) -> &mut Q {
        self.scheduler.queue_mut()
    }

    pub fn settings(&self) -> &AutohideSettings {
        &self.settings
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    /// The current, unrounded margin value.
    pub fn progress(&self) -> f64 {
        self.transition.progress(self.clock.now())
    }

    pub fn is_pending(&self, direction: Direction) -> bool {
        self.scheduler.is_pending(direction)
    }

    /// Ping `waker` whenever a subscribed option changes, so the host loop
    /// knows to call [`AutohideWindow::dispatch_option_updates`].
    pub fn set_update_waker(&mut self, waker: Ping) {
        *self.updates.waker.borrow_mut() = Some(waker);
    }

    fn height(&self) -> i32 {
        self.surface.allocated_height()
    }

    /// Follow `option` for the anchor edge and re-enter from it.
    pub fn set_position(&mut self, option: &ConfigOption) {
        if let Some(handler) = self.position_handler.take() {
            self.position_option.rem_updated_handler(handler);
        }
        self.position_option = option.clone();
        self.position_handler = Some(option.add_updated_handler(OptionUpdates::handler(
            Rc::downgrade(&self.updates),
            |updates| &updates.position,
        )));
        self.update_position();
    }

    fn apply_anchor(&mut self) {
        self.surface.set_anchor(Anchor::Top, false);
        self.surface.set_anchor(Anchor::Bottom, false);
        self.surface.set_anchor(self.position.anchor(), true);
    }

    fn update_position(&mut self) {
        self.position = Position::from_config(&self.position_option.as_string());
        log::info!("autohide window anchored to {}", self.position);
        self.apply_anchor();

        // re-enter from the new edge instead of jumping
        self.transition.reset(-f64::from(self.height()));
        self.last_margin = None;
        self.setup_hotspot();
        self.show_uncertain();
    }

    /// Show once the resize settled. In autohide mode, hide again after a while
    /// so the panel does not stay around.
    fn show_uncertain(&mut self) {
        let then_hide = self.is_autohide().then(|| {
            self.settings
                .position_fallback_hide
                .saturating_sub(self.settings.position_settle_delay)
        });
        self.scheduler.arm(
            Direction::Show,
            self.settings.position_settle_delay,
            then_hide,
        );
    }

    /// Follow `option` for the animation duration, in milliseconds.
    pub fn set_animation_duration(&mut self, option: &ConfigOption) {
        if let Some(handler) = self.duration_handler.take() {
            self.duration_option.rem_updated_handler(handler);
        }
        self.duration_option = option.clone();
        self.duration_handler = Some(option.add_updated_handler(OptionUpdates::handler(
            Rc::downgrade(&self.updates),
            |updates| &updates.duration,
        )));
        self.apply_animation_duration();
    }

    fn apply_animation_duration(&mut self) {
        let duration = self.duration_option.as_duration().unwrap_or_else(|err| {
            log::warn!(
                "{err}, using {}ms",
                DEFAULT_ANIMATION_DURATION.as_millis()
            );
            DEFAULT_ANIMATION_DURATION
        });

        // keep the progress of an animation in flight
        let now = self.clock.now();
        let current = self.transition.progress(now);
        let end = self.transition.end_value;
        self.transition = Transition::new(duration, now);
        self.transition.start(current, end, now);
    }

    /// Apply option changes noticed by the subscribed handlers.
    pub fn dispatch_option_updates(&mut self) {
        if self.updates.position.replace(false) {
            self.update_position();
        }
        if self.updates.duration.replace(false) {
            self.apply_animation_duration();
        }
    }

    /// Reserve the window height as exclusive zone, or nothing.
    pub fn set_auto_exclusive_zone(&mut self, has_zone: bool) {
        self.has_auto_exclusive_zone = has_zone;
        let target_zone = if has_zone { self.height() } else { 0 };

        if self.last_zone != Some(target_zone) {
            self.surface.set_exclusive_zone(target_zone);
            self.last_zone = Some(target_zone);
        }
    }

    pub fn has_auto_exclusive_zone(&self) -> bool {
        self.has_auto_exclusive_zone
    }

    pub fn increase_autohide(&mut self) {
        if self.autohide.increase() {
            log::debug!("autohide enabled");
            self.schedule_hide(Duration::ZERO);
        }
    }

    pub fn decrease_autohide(&mut self) {
        if self.autohide.decrease() {
            log::debug!("autohide disabled");
            self.schedule_show(Duration::ZERO);
        }
    }

    pub fn is_autohide(&self) -> bool {
        self.autohide.is_active()
    }

    pub fn autohide_count(&self) -> u32 {
        self.autohide.count()
    }

    /// A fullscreen window on the output counts as one autohide request.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        if self.fullscreen == fullscreen {
            return;
        }
        self.fullscreen = fullscreen;
        if fullscreen {
            self.increase_autohide();
        } else {
            self.decrease_autohide();
        }
    }

    /// Slide out after `delay`, or right now for a zero delay.
    pub fn schedule_hide(&mut self, delay: Duration) {
        self.scheduler.cancel(Direction::Show);
        if delay.is_zero() {
            self.do_hide();
            return;
        }
        self.scheduler.arm(Direction::Hide, delay, None);
    }

    /// Slide in after `delay`, or right now for a zero delay.
    pub fn schedule_show(&mut self, delay: Duration) {
        self.scheduler.cancel(Direction::Hide);
        if delay.is_zero() {
            self.do_show();
            return;
        }
        self.scheduler.arm(Direction::Show, delay, None);
    }

    fn do_hide(&mut self) {
        self.animate_to(-f64::from(self.height()));
    }

    fn do_show(&mut self) {
        self.animate_to(0.);
    }

    fn animate_to(&mut self, target: f64) {
        let now = self.clock.now();
        let start = self.transition.progress(now);
        self.transition.start(start, target, now);
        self.update_margin();
    }

    pub fn on_timer(&mut self, fired: TimerFired) {
        let Some(expired) = self.scheduler.expire(fired) else {
            return;
        };
        match expired.direction {
            Direction::Hide => self.do_hide(),
            Direction::Show => {
                self.do_show();
                if let Some(delay) = expired.then_hide
                    && self.is_autohide()
                {
                    self.schedule_hide(delay);
                }
            }
        }
    }

    /// Route an enter/leave of one of our hotspots. Events of hotspots from an
    /// older generation are dropped.
    pub fn on_hotspot(&mut self, generation: u64, kind: HotspotKind, event: HotspotEvent) {
        if generation != self.hotspots.generation() {
            log::debug!("ignoring {kind:?} {event:?} from hotspot generation {generation}");
            return;
        }
        log::debug!("{kind:?} hotspot {event:?}");
        match (kind, event) {
            (HotspotKind::Edge, HotspotEvent::Enter) => self.schedule_show(Duration::ZERO),
            // the panel hotspot decides about hiding
            (HotspotKind::Edge, HotspotEvent::Leave) => {}
            (HotspotKind::Panel, HotspotEvent::Enter) => self.scheduler.cancel(Direction::Hide),
            (HotspotKind::Panel, HotspotEvent::Leave) => {
                if self.is_autohide() {
                    self.schedule_hide(self.settings.leave_hide_delay);
                }
            }
        }
    }

    /// The surface got a new size.
    pub fn on_size_allocate(&mut self) {
        self.set_auto_exclusive_zone(self.has_auto_exclusive_zone);
        self.setup_hotspot();
    }

    fn setup_hotspot(&mut self) {
        let height = self.height();
        self.hotspots.update(self.position, height, &self.settings);
    }

    fn apply_margin(&mut self, margin: i32) {
        if self.last_margin != Some(margin) {
            self.surface.set_margin(self.position.anchor(), margin);
            self.last_margin = Some(margin);
        }
    }

    /// Sample the transition into the margin of the anchored edge. Returns
    /// whether it is still running, in which case another redraw was queued.
    pub fn update_margin(&mut self) -> bool {
        let now = self.clock.now();
        if self.transition.running(now) {
            let target = self.transition.progress(now).round() as i32;
            self.apply_margin(target);
            self.surface.queue_redraw();
            return true;
        }

        // the last tick may have been before the end
        self.apply_margin(self.transition.end_value.round() as i32);
        false
    }
}

impl<S, F, Q, C> Drop for AutohideWindow<S, F, Q, C>
where
    S: AutohideSurface,
    F: HotspotFactory,
    Q: TimerQueue,
    C: Clock,
{
    fn drop(&mut self) {
        if let Some(handler) = self.position_handler.take() {
            self.position_option.rem_updated_handler(handler);
        }
        if let Some(handler) = self.duration_handler.take() {
            self.duration_option.rem_updated_handler(handler);
        }
        self.scheduler.cancel_all();
    }
}
