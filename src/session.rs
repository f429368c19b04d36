use gloo::timers::callback::Interval;

pub(crate) const CLOCK_TICK_MS: u32 = 1_000;

/// Owns the recurring clock timer for one UI session. Stopping (or dropping)
/// the session cancels the timer, so none leak across sessions.
pub(crate) struct ClockSession {
    interval: Option<Interval>,
}

impl ClockSession {
    pub(crate) fn start<F: FnMut() + 'static>(on_tick: F) -> Self {
        Self {
            interval: Some(Interval::new(CLOCK_TICK_MS, on_tick)),
        }
    }

    pub(crate) fn stop(&mut self) {
        if let Some(interval) = self.interval.take() {
            interval.cancel();
        }
    }
}

impl Drop for ClockSession {
    fn drop(&mut self) {
        self.stop();
    }
}
