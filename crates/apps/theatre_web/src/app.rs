use channel::events::{self, TestMessage};
use channel::{ChannelError, Subscriptions};
use foundation::time::Time;
use gpu::{RenderFrame, Renderer};
use rand::rngs::StdRng;
use runtime::{FrameLoop, Journal, LogLevel, TickScheduler};
use scene::{Stage, Viewport};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::bridge;
use crate::clock::Clock;
use crate::config::ClientConfig;
use crate::connection::{Connection, Transport};
use crate::error::ClientError;
use crate::page::{EyeImage, Page};

/// One installation client: stage, connection and page glue.
///
/// Everything platform-specific comes in through `P`, `T` and `C`, so the
/// whole object runs on the host in tests.
pub struct TheatreClient<P, T, C> {
    config: ClientConfig,
    page: P,
    connection: Connection<T>,
    clock: C,
    stage: Stage,
    journal: Journal,
    frame_loop: FrameLoop,
    subscriptions: Subscriptions<TheatreClient<P, T, C>, ClientError>,
    rng: StdRng,
}

impl<P: Page, T: Transport, C: Clock> TheatreClient<P, T, C> {
    pub fn new(config: ClientConfig, page: P, transport: T, clock: C, mut rng: StdRng) -> Self {
        let stage = Stage::new(config.scene.clone(), page.viewport(), &mut rng);
        let connection = Connection::new(&config.channel, transport);
        Self {
            journal: Journal::new(config.log_capacity),
            frame_loop: FrameLoop::new(),
            subscriptions: bridge::subscriptions(),
            config,
            page,
            connection,
            clock,
            stage,
            rng,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn connection(&self) -> &Connection<T> {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut Connection<T> {
        &mut self.connection
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Appends a timestamped line to the on-page debug log.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        debug!(level = level.css_class(), "{message}");
        let evicted = self.journal.push(self.clock.timestamp(), level, message);
        if let Some(entry) = self.journal.latest() {
            if let Err(err) = self.page.append_log_line(entry) {
                warn!(%err, "debug line not shown");
            }
        }
        if evicted > 0 {
            self.page.remove_oldest_log_lines(evicted);
        }
    }

    fn now_ms(&self) -> f64 {
        self.clock.now().seconds() * 1000.0
    }

    // Channel.

    pub fn emit(&mut self, name: &str, payload: Option<Value>) -> Result<(), ClientError> {
        self.connection.emit(name, payload)
    }

    pub fn handle_transport_open(&mut self) {
        let now = self.now_ms();
        self.connection.on_open(now);
    }

    pub fn handle_frame(&mut self, frame: &str) {
        let now = self.now_ms();
        for inbound in self.connection.on_text(frame, now) {
            self.dispatch(&inbound.name, &inbound.payload);
        }
    }

    /// Handles a lost transport and returns the delay before reconnecting.
    pub fn handle_transport_close(&mut self) -> u64 {
        for inbound in self.connection.on_close() {
            self.dispatch(&inbound.name, &inbound.payload);
        }
        self.connection.next_reconnect_delay_ms(&mut self.rng)
    }

    pub fn check_heartbeat(&mut self) {
        let now = self.now_ms();
        for inbound in self.connection.check_heartbeat(now) {
            self.dispatch(&inbound.name, &inbound.payload);
        }
    }

    /// Runs the subscribed handler. Unknown events and handler failures are
    /// logged and dropped.
    pub fn dispatch(&mut self, event: &str, payload: &Value) {
        let Some(handler) = self.subscriptions.get(event) else {
            debug!(event, "unhandled event");
            return;
        };
        if let Err(err) = handler(self, payload) {
            warn!(event, %err, "event dropped");
        }
    }

    pub fn send_test_message(&mut self) -> Result<(), ClientError> {
        let message = TestMessage {
            message: self.config.test_message.clone(),
        };
        let payload = serde_json::to_value(message).map_err(ChannelError::from)?;
        self.emit(events::TEST_MESSAGE, Some(payload))?;
        self.log(LogLevel::Info, "Sent test message to server");
        Ok(())
    }

    pub fn request_status(&mut self) -> Result<(), ClientError> {
        self.emit(events::REQUEST_STATUS, None)
    }

    pub fn request_keyboard_status(&mut self) -> Result<(), ClientError> {
        self.emit(events::REQUEST_KEYBOARD_STATUS, None)
    }

    /// The periodic poll: system status, then the hotkey listener.
    pub fn request_status_update(&mut self) -> Result<(), ClientError> {
        self.request_status()?;
        self.request_keyboard_status()
    }

    pub fn request_existing_eyes(&mut self) -> Result<(), ClientError> {
        self.emit(events::REQUEST_EXISTING_EYES, None)
    }

    // Page.

    pub fn show_eye_image(&mut self, filename: &str) -> Result<(), ClientError> {
        let image = EyeImage::for_filename(&self.config.eye_images, filename);
        self.page.append_eye_image(&image)
    }

    // Scene.

    pub fn trigger_final_animation(&mut self) {
        let now = self.clock.now();
        self.stage.trigger_final_animation(now);
        self.log(
            LogLevel::Info,
            "Final animation triggered - convergence animation started",
        );
    }

    pub fn reset_final_animation(&mut self) {
        self.stage.reset_final_animation();
        self.log(LogLevel::Info, "Animation reset");
    }

    /// Re-reads the container size. The loop and mesh state are untouched.
    pub fn resize(&mut self) -> Viewport {
        let viewport = self.page.viewport();
        self.stage.resize(viewport);
        viewport
    }

    // Frame loop.

    pub fn start_loop<S: TickScheduler>(&mut self, scheduler: &mut S) -> Result<(), ClientError> {
        self.frame_loop.start(scheduler)?;
        info!("animation loop running");
        Ok(())
    }

    pub fn pause_loop<S: TickScheduler>(&mut self, scheduler: &mut S) {
        self.frame_loop.pause(scheduler);
    }

    pub fn cancel_loop<S: TickScheduler>(&mut self, scheduler: &mut S) {
        self.frame_loop.cancel(scheduler);
    }

    /// One display refresh: advances the stage and snapshots it for drawing.
    ///
    /// Returns `None` when the loop is not running.
    pub fn tick<S: TickScheduler>(
        &mut self,
        scheduler: &mut S,
        time: Time,
    ) -> Result<Option<RenderFrame>, ClientError> {
        let wall = self.clock.wall_clock_s();
        let Some(frame) = self.frame_loop.tick(scheduler, time, wall)? else {
            return Ok(None);
        };
        self.stage.update(&frame);
        Ok(Some(Renderer::collect(&self.stage)))
    }
}
