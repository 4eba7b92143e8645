//! Message envelope and outgoing change notifications

use relay_props::{Value, ValueMap};
use serde::{Deserialize, Serialize};

/// The request part of an envelope, for messages arriving over HTTP-shaped
/// transports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Request {
    /// Query parameters
    #[serde(default)]
    pub query: ValueMap,
}

/// An incoming message envelope
///
/// The engine reads only the `event` field of the request query (when a
/// request is present) or of the payload; the remainder of that sub-map is
/// the event's parameter payload. `meta` carries pass-through fields copied
/// onto every emitted change message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Envelope {
    #[serde(default)]
    pub req: Option<Request>,
    #[serde(default)]
    pub payload: ValueMap,
    #[serde(default)]
    pub meta: ValueMap,
}

impl Envelope {
    /// Create an empty envelope
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an envelope carrying an event in its payload
    pub fn event(name: impl Into<String>) -> Self {
        Self::new().with_payload("event", name.into())
    }

    /// Create an envelope carrying an event in its request query
    pub fn http_event(name: impl Into<String>) -> Self {
        Self::new().with_query("event", name.into())
    }

    /// Add a request query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.req
            .get_or_insert_with(Request::default)
            .query
            .insert(key.into(), value.into());
        self
    }

    /// Add a payload field
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Add a pass-through field
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Resolve the event name and parameter payload carried by this
    /// envelope: the request query when a request is present, the payload
    /// otherwise
    pub fn event_params(&self) -> Option<(String, ValueMap)> {
        match &self.req {
            Some(req) => event_params_from(&req.query),
            None => event_params_from(&self.payload),
        }
    }

    /// Resolve the event strictly from the request query
    pub fn http_event_params(&self) -> Option<(String, ValueMap)> {
        self.req.as_ref().and_then(|req| event_params_from(&req.query))
    }
}

/// Split a sub-map into its `event` name and the remaining parameters
fn event_params_from(map: &ValueMap) -> Option<(String, ValueMap)> {
    let name = map.get("event")?.as_str()?.to_string();
    let mut params = map.clone();
    params.shift_remove("event");
    Some((name, params))
}

/// Payload of an outgoing change notification
///
/// Serialized field names are the wire contract downstream consumers key
/// off (`trigger`, `triggerWithValue`, `oldValue`, `newValue`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePayload {
    /// The state key that changed
    pub trigger: String,
    /// Key and new value joined for quick matching, e.g. "lightsKitchenOn_false"
    pub trigger_with_value: String,
    /// The key's value in the prior snapshot (`Null` when it was absent)
    pub old_value: Value,
    /// The key's value in the committed snapshot
    pub new_value: Value,
}

impl ChangePayload {
    /// Build a payload for `trigger` transitioning from `old_value` to
    /// `new_value`
    pub fn new(trigger: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        let trigger = trigger.into();
        let trigger_with_value = format!("{}_{}", trigger, plain(&new_value));
        Self {
            trigger,
            trigger_with_value,
            old_value,
            new_value,
        }
    }
}

/// Outgoing change message: the triggering envelope with its payload
/// replaced by the change notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMsg {
    #[serde(default)]
    pub req: Option<Request>,
    #[serde(default)]
    pub meta: ValueMap,
    pub payload: ChangePayload,
}

/// Render a value the way it appears in `triggerWithValue`: strings bare,
/// everything else via Display
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
