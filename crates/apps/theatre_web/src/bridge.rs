//! Server event handlers.
//!
//! Handlers validate their payload into the typed event first; a payload that
//! does not fit is reported as [`ClientError::Payload`] and the client state is
//! left untouched. The animation trigger is the exception: it always fires, and
//! its payload only feeds the log line.

use channel::Subscriptions;
use channel::events::{
    self, EyeImageAvailable, FinalAnimationTrigger, KeyboardStatus, SystemStatus, TextMessage,
};
use runtime::LogLevel;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::app::TheatreClient;
use crate::clock::Clock;
use crate::connection::Transport;
use crate::error::ClientError;
use crate::page::{Badge, ConnectionIndicator, Page};

type Client<P, T, C> = TheatreClient<P, T, C>;

pub(crate) fn subscriptions<P: Page, T: Transport, C: Clock>()
-> Subscriptions<Client<P, T, C>, ClientError> {
    let mut subs = Subscriptions::new();
    subs.on(events::CONNECT, on_connect::<P, T, C>);
    subs.on(events::DISCONNECT, on_disconnect::<P, T, C>);
    subs.on(events::SERVER_MESSAGE, on_server_message::<P, T, C>);
    subs.on(events::TEST_RESPONSE, on_test_response::<P, T, C>);
    subs.on(events::NEW_EYE_IMAGE_AVAILABLE, on_new_eye_image::<P, T, C>);
    subs.on(events::TRIGGER_FINAL_ANIMATION, on_trigger_final_animation::<P, T, C>);
    subs.on(events::CONNECTION_STATUS, on_connection_status::<P, T, C>);
    subs.on(events::KEYBOARD_STATUS, on_keyboard_status::<P, T, C>);
    subs
}

fn parse<D: DeserializeOwned>(event: &str, payload: &Value) -> Result<D, ClientError> {
    D::deserialize(payload).map_err(|err| ClientError::Payload {
        event: event.to_string(),
        reason: err.to_string(),
    })
}

fn on_connect<P: Page, T: Transport, C: Clock>(
    app: &mut Client<P, T, C>,
    _payload: &Value,
) -> Result<(), ClientError> {
    app.page_mut().set_connection_status(ConnectionIndicator::Connected);
    app.log(LogLevel::Info, "Connected to server");
    app.request_existing_eyes()?;
    app.request_status_update()
}

fn on_disconnect<P: Page, T: Transport, C: Clock>(
    app: &mut Client<P, T, C>,
    _reason: &Value,
) -> Result<(), ClientError> {
    app.page_mut().set_connection_status(ConnectionIndicator::Disconnected);
    app.log(LogLevel::Info, "Disconnected from server");
    Ok(())
}

fn on_server_message<P: Page, T: Transport, C: Clock>(
    app: &mut Client<P, T, C>,
    payload: &Value,
) -> Result<(), ClientError> {
    let msg: TextMessage = parse(events::SERVER_MESSAGE, payload)?;
    app.log(LogLevel::Info, format!("Server: {}", msg.text()));
    Ok(())
}

fn on_test_response<P: Page, T: Transport, C: Clock>(
    app: &mut Client<P, T, C>,
    payload: &Value,
) -> Result<(), ClientError> {
    let msg: TextMessage = parse(events::TEST_RESPONSE, payload)?;
    app.log(LogLevel::Info, format!("Test response: {}", msg.text()));
    Ok(())
}

fn on_new_eye_image<P: Page, T: Transport, C: Clock>(
    app: &mut Client<P, T, C>,
    payload: &Value,
) -> Result<(), ClientError> {
    let eye: EyeImageAvailable = parse(events::NEW_EYE_IMAGE_AVAILABLE, payload)?;
    app.show_eye_image(&eye.filename)?;
    let kind = if eye.existing { "Loaded existing" } else { "New" };
    app.log(LogLevel::Info, format!("{kind} eye image: {}", eye.filename));
    Ok(())
}

/// Fires unconditionally. A missing or unreadable payload is logged as a
/// trigger from an unknown source.
fn on_trigger_final_animation<P: Page, T: Transport, C: Clock>(
    app: &mut Client<P, T, C>,
    payload: &Value,
) -> Result<(), ClientError> {
    app.trigger_final_animation();
    let trigger = if payload.is_null() {
        FinalAnimationTrigger::default()
    } else {
        FinalAnimationTrigger::deserialize(payload).unwrap_or_else(|err| {
            warn!(%err, "unreadable trigger payload");
            FinalAnimationTrigger::default()
        })
    };
    app.log(
        LogLevel::Info,
        format!("Animation triggered from {}", trigger.source_text()),
    );
    Ok(())
}

fn on_connection_status<P: Page, T: Transport, C: Clock>(
    app: &mut Client<P, T, C>,
    payload: &Value,
) -> Result<(), ClientError> {
    let status: SystemStatus = parse(events::CONNECTION_STATUS, payload)?;
    let processor = Badge::processor(&status);
    let monitoring = Badge::monitoring(&status);
    let summary = format!(
        "System status: processor {}, monitoring {}",
        processor.text, monitoring.text
    );
    app.page_mut().set_system_status(processor, monitoring);
    app.log(LogLevel::Info, summary);
    if let Some(err) = &status.error {
        app.log(LogLevel::Error, format!("Image Processor Error: {err}"));
    }
    Ok(())
}

fn on_keyboard_status<P: Page, T: Transport, C: Clock>(
    app: &mut Client<P, T, C>,
    payload: &Value,
) -> Result<(), ClientError> {
    let status: KeyboardStatus = parse(events::KEYBOARD_STATUS, payload)?;
    debug!(active = status.active, "keyboard trigger status");
    app.page_mut().set_keyboard_status(Badge::keyboard(&status));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse, subscriptions};
    use crate::app::TheatreClient;
    use crate::error::ClientError;
    use crate::testing::{FakeClock, FakePage, FakeTransport};
    use channel::events::{self, SystemStatus};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn every_server_event_has_a_handler() {
        let subs = subscriptions::<FakePage, FakeTransport, FakeClock>();
        for event in [
            events::CONNECT,
            events::DISCONNECT,
            events::SERVER_MESSAGE,
            events::TEST_RESPONSE,
            events::NEW_EYE_IMAGE_AVAILABLE,
            events::TRIGGER_FINAL_ANIMATION,
            events::CONNECTION_STATUS,
            events::KEYBOARD_STATUS,
        ] {
            assert!(subs.contains(event), "no handler for {event}");
        }
        assert_eq!(subs.len(), 8);
    }

    #[test]
    fn parse_reports_event_name() {
        let err = parse::<SystemStatus>(events::CONNECTION_STATUS, &json!("nope")).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Payload { ref event, .. } if event == "connection_status"
        ));
    }

    fn client() -> TheatreClient<FakePage, FakeTransport, FakeClock> {
        TheatreClient::new(
            Default::default(),
            FakePage::default(),
            FakeTransport::default(),
            FakeClock::default(),
            rand::SeedableRng::seed_from_u64(3),
        )
    }

    #[test]
    fn handler_failure_leaves_state_untouched() {
        let mut app = client();
        let handler = subscriptions::<FakePage, FakeTransport, FakeClock>()
            .get(events::CONNECTION_STATUS)
            .unwrap();
        assert!(handler(&mut app, &json!({"image_processor_ready": "yes"})).is_err());
        assert_eq!(app.page().processor, None);
        assert!(app.page().log_lines.is_empty());
    }

    #[test]
    fn trigger_fires_whatever_the_payload() {
        let handler = subscriptions::<FakePage, FakeTransport, FakeClock>()
            .get(events::TRIGGER_FINAL_ANIMATION)
            .unwrap();
        for (payload, source) in [
            (json!("go"), "unknown"),
            (json!({"source": 5}), "unknown"),
            (json!({"source": "keyboard", "hotkey": 7}), "keyboard (7)"),
            (json!(null), "unknown"),
        ] {
            let mut app = client();
            assert!(handler(&mut app, &payload).is_ok());
            assert!(app.stage().is_final_animation_active(), "not triggered by {payload}");
            assert_eq!(
                app.page().log_texts().last().copied(),
                Some(format!("[12:00:00] Animation triggered from {source}").as_str())
            );
        }
    }

    #[test]
    fn keyboard_status_sets_badge() {
        let mut app = client();
        let handler = subscriptions::<FakePage, FakeTransport, FakeClock>()
            .get(events::KEYBOARD_STATUS)
            .unwrap();
        handler(&mut app, &json!({"active": true, "hotkey": "ctrl+shift+f"})).unwrap();
        assert_eq!(
            app.page().keyboard.as_ref().map(|b| b.text.as_str()),
            Some("Active (ctrl+shift+f)")
        );
        assert!(app.page().log_lines.is_empty());
    }
}
