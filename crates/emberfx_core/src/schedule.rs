//! Frame scheduling and resize debouncing.
//!
//! The host drives both: it calls into the loop once per display refresh and
//! feeds resize notifications with its own clock. Nothing here sleeps or
//! spawns, so tests step it by hand.

use std::time::Duration;

use tracing::warn;

/// Whether the host should ask for another display refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// Schedule the next frame.
    Continue,
    /// Do not schedule anything.
    Halt,
}

/// Lifecycle of a frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Never started.
    #[default]
    Idle,
    /// Frames are being requested.
    Running,
    /// Stopped explicitly.
    Stopped,
}

/// Statistics for the frame loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames rendered.
    pub frames: u64,
    /// Frames slower than the budget.
    pub frames_over_budget: u32,
    /// Duration of the last frame (microseconds).
    pub last_frame_time_us: u32,
    /// Worst frame duration (microseconds).
    pub worst_frame_time_us: u32,
}

/// An explicit running/stopped flag around display-refresh callbacks.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: LoopState,
    frame_budget_us: u32,
    stats: LoopStats,
}

impl FrameLoop {
    /// Creates an idle loop.
    #[must_use]
    pub fn new(frame_budget_us: u32) -> Self {
        Self {
            state: LoopState::Idle,
            frame_budget_us,
            stats: LoopStats::default(),
        }
    }

    /// Starts (or restarts) the loop.
    ///
    /// Returns true if the caller should request the first frame.
    pub fn start(&mut self) -> bool {
        if self.state == LoopState::Running {
            return false;
        }
        self.state = LoopState::Running;
        true
    }

    /// Stops the loop. Returns true if it was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.state == LoopState::Running;
        self.state = LoopState::Stopped;
        was_running
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Returns true while frames are being requested.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Records a finished frame and decides whether another is wanted.
    pub fn record_frame(&mut self, elapsed: Duration) -> FrameRequest {
        let elapsed_us = u32::try_from(elapsed.as_micros()).unwrap_or(u32::MAX);
        self.stats.frames += 1;
        self.stats.last_frame_time_us = elapsed_us;
        self.stats.worst_frame_time_us = self.stats.worst_frame_time_us.max(elapsed_us);
        if elapsed_us > self.frame_budget_us {
            self.stats.frames_over_budget += 1;
            warn!(
                elapsed_us,
                budget_us = self.frame_budget_us,
                "ember frame over budget"
            );
        }

        if self.is_running() {
            FrameRequest::Continue
        } else {
            FrameRequest::Halt
        }
    }

    /// Statistics.
    #[must_use]
    pub fn stats(&self) -> LoopStats {
        self.stats
    }
}

/// Collapses bursts of resize notifications into a single rebuild.
///
/// Every [`signal`](Self::signal) pushes the deadline out by the delay; the
/// rebuild happens once the host observes a quiet period.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    deadline: Option<Duration>,
    signals: u64,
    fired: u64,
}

impl ResizeDebouncer {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            signals: 0,
            fired: 0,
        }
    }

    /// Quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Notes a resize at host time `now`, restarting the quiet period.
    pub fn signal(&mut self, now: Duration) {
        self.deadline = Some(now + self.delay);
        self.signals += 1;
    }

    /// Returns true exactly once per burst, when the quiet period has elapsed.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.fired += 1;
                true
            }
            _ => false,
        }
    }

    /// Fires a pending burst regardless of the clock.
    ///
    /// For hosts whose own timer already enforced the delay.
    pub fn flush(&mut self) -> bool {
        if self.deadline.take().is_some() {
            self.fired += 1;
            true
        } else {
            false
        }
    }

    /// Drops a pending burst. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Returns true while a burst is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending burst fires.
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_sub(now))
    }

    /// Signals received.
    #[must_use]
    pub fn signals(&self) -> u64 {
        self.signals
    }

    /// Bursts fired.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_loop_start_stop() {
        let mut frame_loop = FrameLoop::new(16_666);
        assert_eq!(frame_loop.state(), LoopState::Idle);
        assert!(frame_loop.start());
        assert!(!frame_loop.start());
        assert_eq!(frame_loop.record_frame(ms(1)), FrameRequest::Continue);
        assert!(frame_loop.stop());
        assert_eq!(frame_loop.record_frame(ms(1)), FrameRequest::Halt);
        assert!(!frame_loop.stop());
        assert!(frame_loop.start());
    }

    #[test]
    fn test_over_budget_counted() {
        let mut frame_loop = FrameLoop::new(16_666);
        frame_loop.start();
        frame_loop.record_frame(ms(2));
        frame_loop.record_frame(ms(40));
        let stats = frame_loop.stats();
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.frames_over_budget, 1);
        assert_eq!(stats.worst_frame_time_us, 40_000);
        assert_eq!(stats.last_frame_time_us, 40_000);
    }

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let mut debouncer = ResizeDebouncer::new(ms(120));
        debouncer.signal(ms(0));
        assert!(!debouncer.poll(ms(119)));
        assert!(debouncer.poll(ms(120)));
        assert!(!debouncer.poll(ms(500)));
    }

    #[test]
    fn test_each_signal_restarts_window() {
        let mut debouncer = ResizeDebouncer::new(ms(120));
        debouncer.signal(ms(0));
        debouncer.signal(ms(100));
        assert!(!debouncer.poll(ms(150)));
        assert_eq!(debouncer.remaining(ms(150)), Some(ms(70)));
        assert!(debouncer.poll(ms(220)));
        assert_eq!(debouncer.fired(), 1);
        assert_eq!(debouncer.signals(), 2);
    }

    #[test]
    fn test_cancel_and_flush() {
        let mut debouncer = ResizeDebouncer::new(ms(120));
        debouncer.signal(ms(0));
        assert!(debouncer.cancel());
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(ms(1000)));

        debouncer.signal(ms(0));
        assert!(debouncer.flush());
        assert!(!debouncer.flush());
        assert_eq!(debouncer.fired(), 1);
    }
}
