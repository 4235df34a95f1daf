use foundation::time::Time;
use tracing::debug;

use crate::frame::Frame;

/// Opaque id of one scheduled tick, as returned by the platform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TickHandle(pub i32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The loop was cancelled and cannot be restarted.
    Cancelled,
    /// The platform refused to schedule the next tick.
    Platform(String),
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::Cancelled => write!(f, "frame loop was cancelled"),
            ScheduleError::Platform(msg) => write!(f, "failed to schedule frame: {msg}"),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Something that can call back once on the next display refresh.
///
/// In the browser this is `requestAnimationFrame`; tests use a counter.
pub trait TickScheduler {
    fn schedule(&mut self) -> Result<TickHandle, ScheduleError>;
    fn cancel(&mut self, handle: TickHandle);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Paused,
    Cancelled,
}

/// A single owned task that reschedules itself every display refresh.
///
/// At most one tick is pending at any time. Pausing or cancelling withdraws the
/// pending tick, so a stopped loop never runs another step.
#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    pending: Option<TickHandle>,
    last: Option<Frame>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            pending: None,
            last: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.last
    }

    /// Starts (or resumes) the loop. Idempotent while running.
    pub fn start<S: TickScheduler>(&mut self, scheduler: &mut S) -> Result<(), ScheduleError> {
        if self.state == LoopState::Cancelled {
            return Err(ScheduleError::Cancelled);
        }
        self.state = LoopState::Running;
        if self.pending.is_none() {
            self.pending = Some(scheduler.schedule()?);
        }
        Ok(())
    }

    /// Consumes the pending tick and, while running, schedules the next one.
    ///
    /// Returns the frame to step, or `None` when the loop is not running.
    pub fn tick<S: TickScheduler>(
        &mut self,
        scheduler: &mut S,
        time: Time,
        wall_clock_s: f64,
    ) -> Result<Option<Frame>, ScheduleError> {
        self.pending = None;
        if self.state != LoopState::Running {
            return Ok(None);
        }

        self.pending = Some(scheduler.schedule()?);
        let frame = match self.last {
            Some(prev) => prev.next(time, wall_clock_s),
            None => Frame::first(time, wall_clock_s),
        };
        self.last = Some(frame);
        Ok(Some(frame))
    }

    pub fn pause<S: TickScheduler>(&mut self, scheduler: &mut S) {
        if self.state != LoopState::Running {
            return;
        }
        self.withdraw(scheduler);
        self.state = LoopState::Paused;
        debug!("frame loop paused");
    }

    pub fn cancel<S: TickScheduler>(&mut self, scheduler: &mut S) {
        self.withdraw(scheduler);
        self.state = LoopState::Cancelled;
        debug!("frame loop cancelled");
    }

    fn withdraw<S: TickScheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct CountingScheduler {
        next: i32,
        scheduled: Vec<TickHandle>,
        cancelled: Vec<TickHandle>,
    }

    impl TickScheduler for CountingScheduler {
        fn schedule(&mut self) -> Result<TickHandle, ScheduleError> {
            self.next += 1;
            let h = TickHandle(self.next);
            self.scheduled.push(h);
            Ok(h)
        }

        fn cancel(&mut self, handle: TickHandle) {
            self.cancelled.push(handle);
        }
    }

    #[test]
    fn start_schedules_exactly_one_tick() {
        let mut sched = CountingScheduler::default();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched).unwrap();
        lp.start(&mut sched).unwrap();
        assert_eq!(sched.scheduled.len(), 1);
        assert!(lp.has_pending_tick());
    }

    #[test]
    fn each_tick_reschedules_and_counts_frames() {
        let mut sched = CountingScheduler::default();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched).unwrap();

        let f0 = lp.tick(&mut sched, Time(1.0), 0.0).unwrap().unwrap();
        let f1 = lp.tick(&mut sched, Time(1.25), 0.0).unwrap().unwrap();
        assert_eq!(f0.index, 0);
        assert_eq!(f1.index, 1);
        assert_eq!(f1.dt_s, 0.25);
        assert_eq!(sched.scheduled.len(), 3);
    }

    #[test]
    fn pause_withdraws_pending_tick_and_stops_stepping() {
        let mut sched = CountingScheduler::default();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched).unwrap();
        lp.pause(&mut sched);

        assert_eq!(lp.state(), LoopState::Paused);
        assert_eq!(sched.cancelled, vec![TickHandle(1)]);
        // A stray callback after pausing does nothing and schedules nothing.
        assert_eq!(lp.tick(&mut sched, Time(2.0), 0.0).unwrap(), None);
        assert_eq!(sched.scheduled.len(), 1);
    }

    #[test]
    fn resume_continues_frame_numbering() {
        let mut sched = CountingScheduler::default();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched).unwrap();
        lp.tick(&mut sched, Time(0.0), 0.0).unwrap();
        lp.pause(&mut sched);
        lp.start(&mut sched).unwrap();
        let f = lp.tick(&mut sched, Time(1.0), 0.0).unwrap().unwrap();
        assert_eq!(f.index, 1);
    }

    #[test]
    fn cancelled_loop_cannot_restart() {
        let mut sched = CountingScheduler::default();
        let mut lp = FrameLoop::new();
        lp.start(&mut sched).unwrap();
        lp.cancel(&mut sched);
        assert_eq!(lp.start(&mut sched), Err(ScheduleError::Cancelled));
        assert!(!lp.has_pending_tick());
    }
}
