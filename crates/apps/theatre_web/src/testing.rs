//! In-memory stand-ins for the page, transport and clock.

use std::cell::Cell;
use std::rc::Rc;

use foundation::time::Time;
use runtime::{LogEntry, ScheduleError, TickHandle, TickScheduler};
use scene::Viewport;

use crate::clock::Clock;
use crate::connection::Transport;
use crate::error::ClientError;
use crate::page::{Badge, ConnectionIndicator, EyeImage, Page};

#[derive(Debug, Default)]
pub struct FakeTransport {
    pub sent: Vec<String>,
    pub closed: usize,
}

impl Transport for FakeTransport {
    fn send(&mut self, frame: &str) -> Result<(), ClientError> {
        self.sent.push(frame.to_string());
        Ok(())
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

#[derive(Debug)]
pub struct FakePage {
    pub status: Option<ConnectionIndicator>,
    pub images: Vec<EyeImage>,
    /// `(css class, text)` of each visible debug line.
    pub log_lines: Vec<(String, String)>,
    pub processor: Option<Badge>,
    pub monitoring: Option<Badge>,
    pub keyboard: Option<Badge>,
    pub viewport: Viewport,
}

impl Default for FakePage {
    fn default() -> Self {
        Self {
            status: None,
            images: Vec::new(),
            log_lines: Vec::new(),
            processor: None,
            monitoring: None,
            keyboard: None,
            viewport: Viewport::new(800.0, 600.0),
        }
    }
}

impl FakePage {
    pub fn log_texts(&self) -> Vec<&str> {
        self.log_lines.iter().map(|(_, text)| text.as_str()).collect()
    }
}

impl Page for FakePage {
    fn set_connection_status(&mut self, status: ConnectionIndicator) {
        self.status = Some(status);
    }

    fn append_eye_image(&mut self, image: &EyeImage) -> Result<(), ClientError> {
        self.images.push(image.clone());
        Ok(())
    }

    fn append_log_line(&mut self, entry: &LogEntry) -> Result<(), ClientError> {
        self.log_lines.push((entry.level.css_class().to_string(), entry.line()));
        Ok(())
    }

    fn remove_oldest_log_lines(&mut self, count: usize) {
        let count = count.min(self.log_lines.len());
        self.log_lines.drain(..count);
    }

    fn set_system_status(&mut self, processor: Badge, monitoring: Badge) {
        self.processor = Some(processor);
        self.monitoring = Some(monitoring);
    }

    fn set_keyboard_status(&mut self, badge: Badge) {
        self.keyboard = Some(badge);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// Manually advanced clock; clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    now_s: Rc<Cell<f64>>,
}

impl FakeClock {
    pub fn advance(&self, seconds: f64) {
        self.now_s.set(self.now_s.get() + seconds);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Time {
        Time(self.now_s.get())
    }

    fn wall_clock_s(&self) -> f64 {
        1_700_000_000.0 + self.now_s.get()
    }

    fn timestamp(&self) -> String {
        "12:00:00".to_string()
    }
}

#[derive(Debug, Default)]
pub struct FakeScheduler {
    next: i32,
    pub scheduled: Vec<TickHandle>,
    pub cancelled: Vec<TickHandle>,
}

impl TickScheduler for FakeScheduler {
    fn schedule(&mut self) -> Result<TickHandle, ScheduleError> {
        self.next += 1;
        let handle = TickHandle(self.next);
        self.scheduled.push(handle);
        Ok(handle)
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.cancelled.push(handle);
    }
}
