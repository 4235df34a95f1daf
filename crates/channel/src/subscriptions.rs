use std::collections::BTreeMap;

use serde_json::Value;

/// Event handler invoked with the receiving context and the raw payload.
///
/// Plain function pointers keep the table `Copy`-able out of its owner, so a
/// handler can take `&mut` of the struct that holds the table.
pub type Handler<C, E> = fn(&mut C, &Value) -> Result<(), E>;

/// Event name to handler map. One handler per name; re-registering replaces.
pub struct Subscriptions<C, E> {
    handlers: BTreeMap<String, Handler<C, E>>,
}

impl<C, E> Default for Subscriptions<C, E> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<C, E> std::fmt::Debug for Subscriptions<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl<C, E> Subscriptions<C, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event`, returning the handler it replaced.
    pub fn on(&mut self, event: &str, handler: Handler<C, E>) -> Option<Handler<C, E>> {
        self.handlers.insert(event.to_string(), handler)
    }

    pub fn get(&self, event: &str) -> Option<Handler<C, E>> {
        self.handlers.get(event).copied()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::Subscriptions;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[derive(Default)]
    struct Seen(Vec<String>);

    fn record(ctx: &mut Seen, payload: &Value) -> Result<(), String> {
        ctx.0.push(payload.to_string());
        Ok(())
    }

    fn fail(_: &mut Seen, _: &Value) -> Result<(), String> {
        Err("nope".into())
    }

    #[test]
    fn looks_up_registered_handler() {
        let mut subs: Subscriptions<Seen, String> = Subscriptions::new();
        subs.on("server_message", record);
        let handler = subs.get("server_message").unwrap();
        let mut seen = Seen::default();
        assert_eq!(handler(&mut seen, &json!({"data": 1})), Ok(()));
        assert_eq!(seen.0, vec![r#"{"data":1}"#.to_string()]);
        assert_eq!(subs.events().collect::<Vec<_>>(), vec!["server_message"]);
    }

    #[test]
    fn unknown_events_have_no_handler() {
        let subs: Subscriptions<Seen, String> = Subscriptions::new();
        assert!(subs.get("sd_card_detected").is_none());
        assert!(!subs.contains("sd_card_detected"));
        assert!(subs.is_empty());
    }

    #[test]
    fn re_registering_replaces_handler() {
        let mut subs: Subscriptions<Seen, String> = Subscriptions::new();
        assert!(subs.on("x", record).is_none());
        assert!(subs.on("x", fail).is_some());
        assert_eq!(subs.len(), 1);
        let mut seen = Seen::default();
        assert_eq!(subs.get("x").unwrap()(&mut seen, &Value::Null), Err("nope".into()));
        assert!(seen.0.is_empty());
    }
}
