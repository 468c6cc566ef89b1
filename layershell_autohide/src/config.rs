//! Reactive option values and the window tunables.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::AutohideError;

/// Identifies a handler registered on a [`ConfigOption`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type UpdatedHandler = Rc<dyn Fn()>;

struct OptionInner {
    value: RefCell<String>,
    handlers: RefCell<Vec<(HandlerId, UpdatedHandler)>>,
    next_handler: Cell<u64>,
}

/// A string-valued option shared between whoever owns the configuration and
/// the windows reading it.
///
/// Cloning is cheap and the clones share the value and the handler list.
/// Handlers run on every [`ConfigOption::set`], in registration order.
#[derive(Clone)]
pub struct ConfigOption {
    inner: Rc<OptionInner>,
}

impl fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOption")
            .field("value", &*self.inner.value.borrow())
            .field("handlers", &self.inner.handlers.borrow().len())
            .finish()
    }
}

impl ConfigOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(OptionInner {
                value: RefCell::new(value.into()),
                handlers: RefCell::new(Vec::new()),
                next_handler: Cell::new(0),
            }),
        }
    }

    /// An option which nobody else holds, so it never changes.
    pub fn new_static(value: impl Into<String>) -> Self {
        Self::new(value)
    }

    pub fn as_string(&self) -> String {
        self.inner.value.borrow().clone()
    }

    /// Store a new value and notify every handler, even if the value is the same.
    pub fn set(&self, value: impl Into<String>) {
        *self.inner.value.borrow_mut() = value.into();
        // handlers may (un)subscribe while running
        let handlers: Vec<UpdatedHandler> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler();
        }
    }

    pub fn add_updated_handler(&self, handler: impl Fn() + 'static) -> HandlerId {
        let id = HandlerId(self.inner.next_handler.get());
        self.inner.next_handler.set(id.0 + 1);
        self.inner
            .handlers
            .borrow_mut()
            .push((id, Rc::new(handler)));
        id
    }

    /// Remove a handler. Unknown ids are ignored.
    pub fn rem_updated_handler(&self, id: HandlerId) {
        self.inner
            .handlers
            .borrow_mut()
            .retain(|(handler_id, _)| *handler_id != id);
    }

    pub fn handler_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }

    /// Whether both values are the same shared option.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Parse the value as a duration in milliseconds.
    pub fn as_duration(&self) -> Result<Duration, AutohideError> {
        let value = self.as_string();
        value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| AutohideError::InvalidDuration(value))
    }
}

pub const DEFAULT_POSITION: &str = "top";
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(300);

/// Timing and geometry of the autohide behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutohideSettings {
    /// Distance from the screen edge covered by the edge hotspot, in pixels.
    pub edge_threshold: u32,
    /// How long the pointer has to stay in the edge hotspot before it reveals
    /// the panel. The compositor enforces this.
    pub edge_show_delay: Duration,
    /// Grace period after the pointer leaves the panel before it hides.
    pub leave_hide_delay: Duration,
    /// Delay of the show after a position change, lets the resize settle.
    pub position_settle_delay: Duration,
    /// After a position change with autohide on, hide again this long after
    /// the change.
    pub position_fallback_hide: Duration,
}

impl Default for AutohideSettings {
    fn default() -> Self {
        Self {
            edge_threshold: 20,
            edge_show_delay: Duration::from_millis(300),
            leave_hide_delay: Duration::from_millis(300),
            position_settle_delay: Duration::from_millis(16),
            position_fallback_hide: Duration::from_millis(1000),
        }
    }
}

impl AutohideSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edge_threshold(mut self, edge_threshold: u32) -> Self {
        self.edge_threshold = edge_threshold;
        self
    }

    pub fn with_edge_show_delay(mut self, delay: Duration) -> Self {
        self.edge_show_delay = delay;
        self
    }

    pub fn with_leave_hide_delay(mut self, delay: Duration) -> Self {
        self.leave_hide_delay = delay;
        self
    }

    pub fn with_position_settle_delay(mut self, delay: Duration) -> Self {
        self.position_settle_delay = delay;
        self
    }

    pub fn with_position_fallback_hide(mut self, delay: Duration) -> Self {
        self.position_fallback_hide = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handlers_fire_on_set() {
        let option = ConfigOption::new("top");
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        option.add_updated_handler(move || counter.set(counter.get() + 1));

        option.set("bottom");
        option.set("bottom");
        assert_eq!(hits.get(), 2);
        assert_eq!(option.as_string(), "bottom");
    }

    #[test]
    fn removed_handler_does_not_fire() {
        let option = ConfigOption::new("top");
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = option.add_updated_handler(move || counter.set(counter.get() + 1));
        option.rem_updated_handler(id);
        option.rem_updated_handler(id);

        option.set("bottom");
        assert_eq!(hits.get(), 0);
        assert_eq!(option.handler_count(), 0);
    }

    #[test]
    fn clones_share_state() {
        let option = ConfigOption::new("300");
        let other = option.clone();
        other.set("150");
        assert!(option.ptr_eq(&other));
        assert_eq!(option.as_duration().unwrap(), Duration::from_millis(150));
        assert!(!option.ptr_eq(&ConfigOption::new("150")));
    }

    #[test]
    fn bad_duration_is_an_error() {
        let option = ConfigOption::new("fast");
        assert!(matches!(
            option.as_duration(),
            Err(AutohideError::InvalidDuration(value)) if value == "fast"
        ));
    }

    #[test]
    fn settings_builder() {
        let settings = AutohideSettings::new()
            .with_edge_threshold(8)
            .with_leave_hide_delay(Duration::from_millis(500));
        assert_eq!(settings.edge_threshold, 8);
        assert_eq!(settings.leave_hide_delay, Duration::from_millis(500));
        assert_eq!(settings.edge_show_delay, Duration::from_millis(300));
    }
}
