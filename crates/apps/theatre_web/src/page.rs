//! What the client needs from the host page, independent of the DOM.

use channel::events::{KeyboardStatus, SystemStatus, display_value};
use runtime::LogEntry;
use scene::Viewport;

use crate::config::EyeImageConfig;
use crate::error::ClientError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConnectionIndicator {
    Connected,
    Disconnected,
}

impl ConnectionIndicator {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionIndicator::Connected => "Connected",
            ConnectionIndicator::Disconnected => "Disconnected",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ConnectionIndicator::Connected => "connected",
            ConnectionIndicator::Disconnected => "disconnected",
        }
    }
}

/// Text and class of a status badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub class: &'static str,
}

impl Badge {
    fn new(text: impl Into<String>, class: &'static str) -> Self {
        Self {
            text: text.into(),
            class,
        }
    }

    pub fn processor(status: &SystemStatus) -> Self {
        if status.image_processor_ready {
            Badge::new("Ready", "status-ready")
        } else {
            Badge::new("Error", "status-error")
        }
    }

    pub fn monitoring(status: &SystemStatus) -> Self {
        if status.monitoring_active {
            Badge::new("Active", "status-ready")
        } else {
            Badge::new("Inactive", "status-error")
        }
    }

    pub fn keyboard(status: &KeyboardStatus) -> Self {
        match (status.active, &status.hotkey) {
            (true, Some(hotkey)) => {
                Badge::new(format!("Active ({})", display_value(hotkey)), "status-connected")
            }
            (true, None) => Badge::new("Active", "status-connected"),
            (false, _) => Badge::new("Inactive", "status-error"),
        }
    }
}

/// An `<img>` to be appended to the eye gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EyeImage {
    pub src: String,
    pub class: String,
    pub alt: String,
}

impl EyeImage {
    pub fn for_filename(config: &EyeImageConfig, filename: &str) -> Self {
        Self {
            src: format!("{}{filename}", config.path_prefix),
            class: config.class.clone(),
            alt: config.alt.clone(),
        }
    }
}

pub trait Page {
    fn set_connection_status(&mut self, status: ConnectionIndicator);

    /// Appends the image; it fades in once loaded.
    fn append_eye_image(&mut self, image: &EyeImage) -> Result<(), ClientError>;

    /// Appends one debug line and scrolls it into view.
    fn append_log_line(&mut self, entry: &LogEntry) -> Result<(), ClientError>;

    fn remove_oldest_log_lines(&mut self, count: usize);

    /// Updates whichever status badges the page has.
    fn set_system_status(&mut self, processor: Badge, monitoring: Badge);

    fn set_keyboard_status(&mut self, badge: Badge);

    /// Current size of the 3D container.
    fn viewport(&self) -> Viewport;
}
