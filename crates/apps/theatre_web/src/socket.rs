//! WebSocket transport and the reconnect timer.

use channel::Endpoint;
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::Shared;
use crate::connection::Transport;
use crate::error::{ClientError, dom_err};

/// Keeps the socket's event closures alive for as long as the socket is.
struct Handlers {
    _open: Closure<dyn FnMut(Event)>,
    _message: Closure<dyn FnMut(MessageEvent)>,
    _close: Closure<dyn FnMut(CloseEvent)>,
    _error: Closure<dyn FnMut(Event)>,
}

#[derive(Default)]
pub struct SocketTransport {
    socket: Option<WebSocket>,
    handlers: Option<Handlers>,
}

impl SocketTransport {
    /// Swaps in a fresh socket. The old one is detached first so none of its
    /// late events reach the client.
    fn replace(&mut self, socket: WebSocket, handlers: Handlers) {
        if let Some(old) = self.socket.take() {
            old.set_onopen(None);
            old.set_onmessage(None);
            old.set_onclose(None);
            old.set_onerror(None);
            if let Err(err) = old.close() {
                warn!(err = ?err, "stale socket close failed");
            }
        }
        self.socket = Some(socket);
        self.handlers = Some(handlers);
    }
}

impl Transport for SocketTransport {
    fn send(&mut self, frame: &str) -> Result<(), ClientError> {
        match &self.socket {
            Some(socket) if socket.ready_state() == WebSocket::OPEN => {
                socket.send_with_str(frame).map_err(dom_err)
            }
            _ => Err(ClientError::Dom("socket is not open".into())),
        }
    }

    fn close(&mut self) {
        if let Some(socket) = &self.socket {
            if let Err(err) = socket.close() {
                warn!(err = ?err, "socket close failed");
            }
        }
    }
}

/// Opens a socket to the page's own origin and routes its events into the
/// client.
pub fn connect(shared: &Shared) -> Result<(), ClientError> {
    let window = web_sys::window().ok_or_else(|| ClientError::Dom("window missing".into()))?;
    let location = window.location();
    let protocol = location.protocol().map_err(dom_err)?;
    let host = location.host().map_err(dom_err)?;
    let url = {
        let rt = shared.borrow();
        Endpoint::from_location(&protocol, &host, &rt.client.config().channel.path).url()
    };
    info!(%url, "connecting");
    let socket = WebSocket::new(&url).map_err(dom_err)?;

    let open = {
        let shared = shared.clone();
        Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            shared.borrow_mut().client.handle_transport_open();
        })
    };
    let message = {
        let shared = shared.clone();
        Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
            match ev.data().as_string() {
                Some(text) => shared.borrow_mut().client.handle_frame(&text),
                None => debug!("ignoring binary frame"),
            }
        })
    };
    let close = {
        let shared = shared.clone();
        Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
            let delay_ms = shared.borrow_mut().client.handle_transport_close();
            info!(code = ev.code(), delay_ms, "socket closed");
            schedule_reconnect(&shared, delay_ms);
        })
    };
    let error = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
        warn!("socket error");
    });

    socket.set_onopen(Some(open.as_ref().unchecked_ref()));
    socket.set_onmessage(Some(message.as_ref().unchecked_ref()));
    socket.set_onclose(Some(close.as_ref().unchecked_ref()));
    socket.set_onerror(Some(error.as_ref().unchecked_ref()));

    shared
        .borrow_mut()
        .client
        .connection_mut()
        .transport_mut()
        .replace(
            socket,
            Handlers {
                _open: open,
                _message: message,
                _close: close,
                _error: error,
            },
        );
    Ok(())
}

/// Reconnects after `delay_ms`. A socket that cannot even be constructed
/// counts as another failed attempt.
fn schedule_reconnect(shared: &Shared, delay_ms: u64) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let retry = shared.clone();
    let callback = Closure::once_into_js(move || {
        if let Err(err) = connect(&retry) {
            warn!(%err, "reconnect failed");
            let delay_ms = retry.borrow_mut().client.handle_transport_close();
            schedule_reconnect(&retry, delay_ms);
        }
    });
    let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);
    if let Err(err) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), timeout)
    {
        warn!(err = ?err, "could not schedule reconnect");
    }
}
