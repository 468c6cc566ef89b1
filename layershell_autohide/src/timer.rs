//! [`TimerQueue`] on a calloop event loop.

use std::rc::Rc;
use std::time::Duration;

use calloop::{
    LoopHandle, RegistrationToken,
    timer::{TimeoutAction, Timer},
};

use crate::AutohideError;
use crate::scheduler::{TimerFired, TimerQueue};

/// Inserts a one-shot [`Timer`] source per armed timer. The `on_fire` callback
/// gets the loop data and has to route the [`TimerFired`] to the window, which
/// usually lives inside that same data.
pub struct LoopTimers<D: 'static> {
    handle: LoopHandle<'static, D>,
    on_fire: Rc<dyn Fn(&mut D, TimerFired)>,
}

impl<D: 'static> LoopTimers<D> {
    pub fn new(handle: LoopHandle<'static, D>, on_fire: impl Fn(&mut D, TimerFired) + 'static) -> Self {
        Self {
            handle,
            on_fire: Rc::new(on_fire),
        }
    }
}

impl<D: 'static> TimerQueue for LoopTimers<D> {
    type Token = RegistrationToken;

    fn schedule_once(
        &mut self,
        delay: Duration,
        fired: TimerFired,
    ) -> Result<RegistrationToken, AutohideError> {
        let on_fire = self.on_fire.clone();
        self.handle
            .insert_source(Timer::from_duration(delay), move |_, _, data| {
                on_fire(data, fired);
                TimeoutAction::Drop
            })
            .map_err(|err| AutohideError::EventLoop(err.error))
    }

    fn cancel(&mut self, token: RegistrationToken) {
        self.handle.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Direction;
    use calloop::EventLoop;

    #[derive(Default)]
    struct Data {
        fired: Vec<TimerFired>,
    }

    fn fired(serial: u64) -> TimerFired {
        TimerFired {
            direction: Direction::Hide,
            serial,
        }
    }

    #[test]
    fn delivers_fired_timer_to_loop_data() {
        let mut event_loop: EventLoop<'static, Data> = EventLoop::try_new().unwrap();
        let mut timers = LoopTimers::new(event_loop.handle(), |data: &mut Data, fired| {
            data.fired.push(fired)
        });
        timers
            .schedule_once(Duration::from_millis(1), fired(7))
            .unwrap();

        let mut data = Data::default();
        for _ in 0..50 {
            event_loop
                .dispatch(Some(Duration::from_millis(10)), &mut data)
                .unwrap();
            if !data.fired.is_empty() {
                break;
            }
        }
        assert_eq!(data.fired, vec![fired(7)]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut event_loop: EventLoop<'static, Data> = EventLoop::try_new().unwrap();
        let mut timers = LoopTimers::new(event_loop.handle(), |data: &mut Data, fired| {
            data.fired.push(fired)
        });
        let token = timers
            .schedule_once(Duration::from_millis(1), fired(1))
            .unwrap();
        timers.cancel(token);
        timers
            .schedule_once(Duration::from_millis(5), fired(2))
            .unwrap();

        let mut data = Data::default();
        for _ in 0..50 {
            event_loop
                .dispatch(Some(Duration::from_millis(10)), &mut data)
                .unwrap();
            if !data.fired.is_empty() {
                break;
            }
        }
        event_loop
            .dispatch(Some(Duration::from_millis(10)), &mut data)
            .unwrap();
        assert_eq!(data.fired, vec![fired(2)]);
    }
}
