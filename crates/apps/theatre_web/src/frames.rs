use std::cell::RefCell;
use std::rc::Rc;

use runtime::{ScheduleError, TickHandle, TickScheduler};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use tracing::warn;
use web_sys::Window;

/// The per-frame callback, installed once the shared state it needs exists.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` as a [`TickScheduler`].
pub struct AnimationFrames {
    window: Window,
    callback: FrameCallback,
}

impl AnimationFrames {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: Rc::new(RefCell::new(None)),
        }
    }

    pub fn callback(&self) -> FrameCallback {
        self.callback.clone()
    }
}

impl TickScheduler for AnimationFrames {
    fn schedule(&mut self) -> Result<TickHandle, ScheduleError> {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Err(ScheduleError::Platform("frame callback not installed".into()));
        };
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map(TickHandle)
            .map_err(|err| ScheduleError::Platform(format!("{err:?}")))
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            warn!(err = ?err, "could not cancel animation frame");
        }
    }
}
