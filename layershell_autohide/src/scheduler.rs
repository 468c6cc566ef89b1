//! The pending hide/show timer slots.

use std::time::Duration;

use crate::AutohideError;

/// Which way a pending timer moves the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Hide,
    Show,
}

impl Direction {
    fn opposite(self) -> Self {
        match self {
            Self::Hide => Self::Show,
            Self::Show => Self::Hide,
        }
    }
}

/// Delivered back to the window when a timer armed through a [`TimerQueue`]
/// expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub direction: Direction,
    pub serial: u64,
}

/// One-shot timers on the host event loop.
///
/// The queue must hand `fired` back to [`crate::AutohideWindow::on_timer`] once
/// `delay` has passed, unless the token was cancelled before.
pub trait TimerQueue {
    type Token;

    fn schedule_once(
        &mut self,
        delay: Duration,
        fired: TimerFired,
    ) -> Result<Self::Token, AutohideError>;

    fn cancel(&mut self, token: Self::Token);
}

#[derive(Debug)]
struct Pending<T> {
    serial: u64,
    token: T,
    /// Hide again this long after the show fires.
    then_hide: Option<Duration>,
}

/// A fired timer which matched its armed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Expired {
    pub direction: Direction,
    pub then_hide: Option<Duration>,
}

/// Holds at most one pending timer, either a hide or a show.
#[derive(Debug)]
pub(crate) struct Scheduler<Q: TimerQueue> {
    queue: Q,
    pending_hide: Option<Pending<Q::Token>>,
    pending_show: Option<Pending<Q::Token>>,
    next_serial: u64,
}

impl<Q: TimerQueue> Scheduler<Q> {
    pub fn new(queue: Q) -> Self {
        Self {
            queue,
            pending_hide: None,
            pending_show: None,
            next_serial: 0,
        }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    fn slot(&mut self, direction: Direction) -> &mut Option<Pending<Q::Token>> {
        match direction {
            Direction::Hide => &mut self.pending_hide,
            Direction::Show => &mut self.pending_show,
        }
    }

    pub fn is_pending(&self, direction: Direction) -> bool {
        match direction {
            Direction::Hide => self.pending_hide.is_some(),
            Direction::Show => self.pending_show.is_some(),
        }
    }

    /// Disarm the timer of `direction`, if any.
    pub fn cancel(&mut self, direction: Direction) {
        if let Some(pending) = self.slot(direction).take() {
            log::trace!("cancelled pending {direction:?}");
            self.queue.cancel(pending.token);
        }
    }

    /// Arm a timer for `direction` unless one is armed already. The opposite
    /// direction is always cancelled first.
    ///
    /// An already armed timer keeps its delay but takes over a given
    /// `then_hide`.
    pub fn arm(&mut self, direction: Direction, delay: Duration, then_hide: Option<Duration>) {
        self.cancel(direction.opposite());
        if let Some(pending) = self.slot(direction) {
            if then_hide.is_some() {
                pending.then_hide = then_hide;
            }
            return;
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        match self
            .queue
            .schedule_once(delay, TimerFired { direction, serial })
        {
            Ok(token) => {
                *self.slot(direction) = Some(Pending {
                    serial,
                    token,
                    then_hide,
                });
            }
            Err(err) => log::error!("cannot arm {direction:?} timer: {err}"),
        }
    }

    /// Clear the slot a fired timer belongs to. Fires of timers which were
    /// cancelled or replaced meanwhile are stale and yield `None`.
    pub fn expire(&mut self, fired: TimerFired) -> Option<Expired> {
        let slot = self.slot(fired.direction);
        if !slot
            .as_ref()
            .is_some_and(|pending| pending.serial == fired.serial)
        {
            log::debug!("ignoring stale {:?} timer {}", fired.direction, fired.serial);
            return None;
        }
        let then_hide = slot.take().and_then(|pending| pending.then_hide);
        Some(Expired {
            direction: fired.direction,
            then_hide,
        })
    }

    pub fn cancel_all(&mut self) {
        self.cancel(Direction::Hide);
        self.cancel(Direction::Show);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Queue {
        armed: Vec<(Duration, TimerFired)>,
        cancelled: Vec<u64>,
    }

    impl TimerQueue for Queue {
        type Token = u64;

        fn schedule_once(
            &mut self,
            delay: Duration,
            fired: TimerFired,
        ) -> Result<u64, AutohideError> {
            self.armed.push((delay, fired));
            Ok(fired.serial)
        }

        fn cancel(&mut self, token: u64) {
            self.cancelled.push(token);
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn arming_cancels_the_opposite_slot() {
        let mut scheduler = Scheduler::new(Queue::default());
        scheduler.arm(Direction::Hide, ms(300), None);
        assert!(scheduler.is_pending(Direction::Hide));

        scheduler.arm(Direction::Show, ms(16), None);
        assert!(scheduler.is_pending(Direction::Show));
        assert!(!scheduler.is_pending(Direction::Hide));
        assert_eq!(scheduler.queue().cancelled, vec![0]);
    }

    #[test]
    fn same_direction_is_not_rearmed() {
        let mut scheduler = Scheduler::new(Queue::default());
        scheduler.arm(Direction::Hide, ms(300), None);
        scheduler.arm(Direction::Hide, ms(100), None);
        assert_eq!(scheduler.queue().armed.len(), 1);
        assert_eq!(scheduler.queue().armed[0].0, ms(300));
    }

    #[test]
    fn pending_timer_takes_over_follow_up() {
        let mut scheduler = Scheduler::new(Queue::default());
        scheduler.arm(Direction::Show, ms(50), None);
        scheduler.arm(Direction::Show, ms(16), Some(ms(984)));
        scheduler.arm(Direction::Show, ms(16), None);
        assert_eq!(scheduler.queue().armed.len(), 1);

        let fired = scheduler.queue().armed[0].1;
        assert_eq!(
            scheduler.expire(fired),
            Some(Expired {
                direction: Direction::Show,
                then_hide: Some(ms(984))
            })
        );
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut scheduler = Scheduler::new(Queue::default());
        scheduler.cancel(Direction::Show);
        scheduler.arm(Direction::Show, ms(16), None);
        scheduler.cancel(Direction::Show);
        scheduler.cancel(Direction::Show);
        assert_eq!(scheduler.queue().cancelled, vec![0]);
    }

    #[test]
    fn stale_fire_is_ignored() {
        let mut scheduler = Scheduler::new(Queue::default());
        scheduler.arm(Direction::Hide, ms(300), None);
        let first = scheduler.queue().armed[0].1;
        scheduler.cancel(Direction::Hide);
        scheduler.arm(Direction::Hide, ms(300), None);
        let second = scheduler.queue().armed[1].1;

        assert_eq!(scheduler.expire(first), None);
        assert!(scheduler.is_pending(Direction::Hide));
        assert_eq!(
            scheduler.expire(second),
            Some(Expired {
                direction: Direction::Hide,
                then_hide: None
            })
        );
        assert!(!scheduler.is_pending(Direction::Hide));
        assert_eq!(scheduler.expire(second), None);
    }

    #[test]
    fn failed_registration_leaves_slot_empty() {
        struct Broken;
        impl TimerQueue for Broken {
            type Token = ();
            fn schedule_once(&mut self, _: Duration, _: TimerFired) -> Result<(), AutohideError> {
                Err(AutohideError::Io(std::io::Error::other("no loop")))
            }
            fn cancel(&mut self, _: ()) {}
        }

        let mut scheduler = Scheduler::new(Broken);
        scheduler.arm(Direction::Show, ms(16), None);
        assert!(!scheduler.is_pending(Direction::Show));
    }
}
