use foundation::time::Time;

/// Metadata for one display-refresh step.
///
/// `time` shares its timebase with the browser's `performance.now()` so that
/// events handled between frames can be stamped on the same clock.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index since the loop was started.
    pub index: u64,
    /// Seconds since the previous frame (0 for the first frame).
    pub dt_s: f64,
    /// Monotonic time at the start of the frame.
    pub time: Time,
    /// Wall-clock seconds since the Unix epoch.
    pub wall_clock_s: f64,
}

impl Frame {
    pub fn first(time: Time, wall_clock_s: f64) -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time,
            wall_clock_s,
        }
    }

    pub fn next(self, time: Time, wall_clock_s: f64) -> Self {
        Self {
            index: self.index + 1,
            dt_s: (time.0 - self.time.0).max(0.0),
            time,
            wall_clock_s,
        }
    }
}
