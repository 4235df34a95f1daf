use console_error_panic_hook::set_once;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlCanvasElement, Window};

use foundation::time::Time;

pub mod app;
mod bridge;
pub mod clock;
pub mod config;
pub mod connection;
pub mod dom;
pub mod error;
mod frames;
pub mod logging;
pub mod page;
mod socket;
#[cfg(test)]
mod testing;
mod wgpu;

pub use app::TheatreClient;
pub use clock::{BrowserClock, Clock};
pub use config::ClientConfig;
pub use connection::{Connection, Inbound, Transport};
pub use error::ClientError;
pub use page::{Badge, ConnectionIndicator, EyeImage, Page};

use dom::{Controls, DomPage};
use frames::AnimationFrames;
use socket::SocketTransport;
use wgpu::{WgpuContext, init_wgpu, render_frame, resize_wgpu};

type BrowserClient = TheatreClient<DomPage, SocketTransport, BrowserClock>;

/// Everything the page callbacks touch.
pub(crate) struct Runtime {
    pub(crate) client: BrowserClient,
    scheduler: AnimationFrames,
    canvas: HtmlCanvasElement,
    gpu: Option<WgpuContext>,
}

pub(crate) type Shared = Rc<RefCell<Runtime>>;

thread_local! {
    static APP: RefCell<Option<Shared>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Boots the client with the default configuration.
#[wasm_bindgen]
pub fn boot() -> Result<(), JsValue> {
    boot_inner(ClientConfig::default()).map_err(JsValue::from)
}

/// Boots the client with a JSON override of the defaults.
#[wasm_bindgen]
pub fn boot_with_config(json: &str) -> Result<(), JsValue> {
    let config = ClientConfig::from_json(json)?;
    boot_inner(config).map_err(JsValue::from)
}

#[wasm_bindgen]
pub fn trigger_final_animation() {
    with_app(|rt| rt.client.trigger_final_animation());
}

#[wasm_bindgen]
pub fn reset_final_animation() {
    with_app(|rt| rt.client.reset_final_animation());
}

#[wasm_bindgen]
pub fn pause_animation() {
    with_app(|rt| rt.client.pause_loop(&mut rt.scheduler));
}

#[wasm_bindgen]
pub fn resume_animation() -> Result<(), JsValue> {
    with_app(|rt| rt.client.start_loop(&mut rt.scheduler))
        .unwrap_or(Ok(()))
        .map_err(JsValue::from)
}

fn with_app<R>(f: impl FnOnce(&mut Runtime) -> R) -> Option<R> {
    let shared = APP.with(|app| app.borrow().clone())?;
    let mut rt = shared.borrow_mut();
    Some(f(&mut rt))
}

fn boot_inner(config: ClientConfig) -> Result<(), ClientError> {
    if APP.with(|app| app.borrow().is_some()) {
        return Err(ClientError::Config("client already booted".into()));
    }
    if let Err(err) = logging::init(&config.log_filter) {
        web_sys::console::warn_1(&JsValue::from_str(&err.to_string()));
    }

    let window = web_sys::window().ok_or_else(|| ClientError::Dom("window missing".into()))?;
    let page = DomPage::bind(window.clone(), &config)?;
    let canvas = page.create_canvas()?;
    let clock = BrowserClock::new(&window);
    let scheduler = AnimationFrames::new(window.clone());
    let frame_callback = scheduler.callback();

    let client = TheatreClient::new(
        config,
        page,
        SocketTransport::default(),
        clock,
        StdRng::from_entropy(),
    );
    let shared: Shared = Rc::new(RefCell::new(Runtime {
        client,
        scheduler,
        canvas: canvas.clone(),
        gpu: None,
    }));

    {
        let shared = shared.clone();
        let on_frame = Closure::<dyn FnMut(f64)>::new(move |timestamp_ms: f64| {
            on_animation_frame(&shared, timestamp_ms);
        });
        *frame_callback.borrow_mut() = Some(on_frame);
    }
    {
        let mut guard = shared.borrow_mut();
        let rt = &mut *guard;
        rt.client.start_loop(&mut rt.scheduler)?;
    }

    socket::connect(&shared)?;
    install_listeners(&window, &shared)?;
    install_timers(&window, &shared)?;

    APP.with(|app| *app.borrow_mut() = Some(shared.clone()));

    spawn_local(async move {
        match init_wgpu(canvas).await {
            Ok(ctx) => {
                shared.borrow_mut().gpu = Some(ctx);
                info!("renderer ready");
            }
            Err(err) => error!(%err, "renderer unavailable"),
        }
    });

    info!("theatre client booted");
    Ok(())
}

fn on_animation_frame(shared: &Shared, timestamp_ms: f64) {
    let mut guard = shared.borrow_mut();
    let rt = &mut *guard;
    match rt.client.tick(&mut rt.scheduler, Time::from_millis(timestamp_ms)) {
        Ok(Some(frame)) => {
            if let Some(gpu) = rt.gpu.as_mut() {
                if let Err(err) = render_frame(gpu, &frame) {
                    warn!(%err, "frame dropped");
                }
            }
        }
        Ok(None) => {}
        Err(err) => error!(%err, "animation loop stopped"),
    }
}

fn on_resize(shared: &Shared) {
    let mut guard = shared.borrow_mut();
    let rt = &mut *guard;
    let viewport = rt.client.resize();
    let (width, height) = rt.client.page().size_canvas(&rt.canvas, viewport);
    if let Some(gpu) = rt.gpu.as_mut() {
        resize_wgpu(gpu, width, height);
    }
}

fn listen(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut() + 'static,
) -> Result<(), ClientError> {
    let mut handler = handler;
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| handler());
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(error::dom_err)?;
    // Listeners stay for the life of the page.
    closure.forget();
    Ok(())
}

fn install_listeners(window: &Window, shared: &Shared) -> Result<(), ClientError> {
    {
        let shared = shared.clone();
        listen(window, "resize", move || on_resize(&shared))?;
    }
    if let Some(document) = window.document() {
        let shared = shared.clone();
        listen(&document, "fullscreenchange", move || on_resize(&shared))?;
    }

    let Controls {
        test_connection,
        test_animation,
        reset_animation,
    } = shared.borrow().client.page().controls().clone();

    {
        let shared = shared.clone();
        listen(&test_connection, "click", move || {
            if let Err(err) = shared.borrow_mut().client.send_test_message() {
                warn!(%err, "test message not sent");
            }
        })?;
    }
    {
        let shared = shared.clone();
        listen(&test_animation, "click", move || {
            shared.borrow_mut().client.trigger_final_animation();
        })?;
    }
    if let Some(reset) = reset_animation {
        let shared = shared.clone();
        listen(&reset, "click", move || {
            shared.borrow_mut().client.reset_final_animation();
        })?;
    }
    Ok(())
}

fn every(window: &Window, period_ms: i32, tick: impl FnMut() + 'static) -> Result<(), ClientError> {
    let closure = Closure::<dyn FnMut()>::new(tick);
    window
        .set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period_ms.max(1),
        )
        .map_err(error::dom_err)?;
    closure.forget();
    Ok(())
}

fn install_timers(window: &Window, shared: &Shared) -> Result<(), ClientError> {
    let (status_poll_ms, heartbeat_check_ms) = {
        let rt = shared.borrow();
        let config = rt.client.config();
        (config.status_poll_ms, config.heartbeat_check_ms)
    };

    {
        let shared = shared.clone();
        every(window, status_poll_ms, move || {
            let mut rt = shared.borrow_mut();
            if rt.client.connection().is_connected() {
                if let Err(err) = rt.client.request_status_update() {
                    warn!(%err, "status poll failed");
                }
            }
        })?;
    }
    {
        let shared = shared.clone();
        every(window, heartbeat_check_ms, move || {
            shared.borrow_mut().client.check_heartbeat();
        })?;
    }
    Ok(())
}
