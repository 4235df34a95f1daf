use foundation::time::Time;

/// Time sources the client reads from.
pub trait Clock {
    /// Monotonic time on the same base as `requestAnimationFrame` timestamps.
    fn now(&self) -> Time;
    /// Seconds since the Unix epoch.
    fn wall_clock_s(&self) -> f64;
    /// Local time of day as `HH:MM:SS`.
    fn timestamp(&self) -> String;
}

pub fn format_time_of_day(hours: u32, minutes: u32, seconds: u32) -> String {
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[derive(Debug, Clone, Default)]
pub struct BrowserClock {
    performance: Option<web_sys::Performance>,
}

impl BrowserClock {
    pub fn new(window: &web_sys::Window) -> Self {
        Self {
            performance: window.performance(),
        }
    }
}

impl Clock for BrowserClock {
    fn now(&self) -> Time {
        match &self.performance {
            Some(p) => Time::from_millis(p.now()),
            None => Time::from_millis(js_sys::Date::now()),
        }
    }

    fn wall_clock_s(&self) -> f64 {
        js_sys::Date::now() / 1000.0
    }

    fn timestamp(&self) -> String {
        let date = js_sys::Date::new_0();
        format_time_of_day(date.get_hours(), date.get_minutes(), date.get_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::format_time_of_day;

    #[test]
    fn pads_each_field() {
        assert_eq!(format_time_of_day(9, 5, 0), "09:05:00");
        assert_eq!(format_time_of_day(23, 59, 59), "23:59:59");
    }
}
