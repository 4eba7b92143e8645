//! The reactive state/diff engine
//!
//! A [`Thing`] owns one state snapshot and a rules function. Each incoming
//! event resolves through its bound handler to a partial-state update, the
//! rules derive state from the updated candidate, and one change message is
//! emitted per state key whose committed value differs from the prior
//! snapshot - excluding keys the event itself set directly, so only
//! rule-caused transitions are reported.

use crate::{BoundProp, ChangeMsg, ChangePayload, Envelope, EventBinding};
use indexmap::IndexMap;
use relay_props::{Validator, Value, ValueMap};

/// Typed read helpers over a state snapshot, for rules functions
pub trait StateRead {
    /// Get a raw value
    fn value(&self, key: &str) -> Option<&Value>;

    /// Read a bool key; false when absent or not a bool
    fn bool(&self, key: &str) -> bool {
        self.value(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Read an integer key; 0 when absent or not numeric
    fn int(&self, key: &str) -> i64 {
        self.value(key).and_then(Value::as_int).unwrap_or(0)
    }

    /// Read a numeric key as f64; 0.0 when absent or not numeric
    fn float(&self, key: &str) -> f64 {
        self.value(key).and_then(Value::as_float).unwrap_or(0.0)
    }

    /// Read a string key
    fn str(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(Value::as_str)
    }
}

impl StateRead for ValueMap {
    fn value(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// A pure function computing derived state from a candidate state
///
/// Receives the candidate snapshot (current state merged with the event's
/// direct update) and returns a mapping of derived key to value. Must not
/// inspect anything but its argument and must not fail for a well-typed
/// candidate; a panic aborts the handling cycle before commit.
pub type Rules = Box<dyn Fn(&ValueMap) -> ValueMap + Send + Sync>;

/// A state key declaration: a plain validator or one with event bindings
#[derive(Debug, Clone)]
pub enum StateProp {
    /// A key only rules (or nothing) can change
    Plain(Validator),
    /// A key with event bindings that can set it directly
    Bound(BoundProp),
}

impl StateProp {
    fn validator(&self) -> &Validator {
        match self {
            StateProp::Plain(validator) => validator,
            StateProp::Bound(bound) => &bound.validator,
        }
    }
}

impl From<Validator> for StateProp {
    fn from(validator: Validator) -> Self {
        StateProp::Plain(validator)
    }
}

impl From<BoundProp> for StateProp {
    fn from(bound: BoundProp) -> Self {
        StateProp::Bound(bound)
    }
}

/// Installed handler record: which state key an event updates, and how
#[derive(Debug, Clone)]
struct Handler {
    key: String,
    binding: EventBinding,
}

/// One instance of the reactive engine: a state snapshot, a handler table,
/// and a rules function
pub struct Thing {
    state: ValueMap,
    handlers: IndexMap<String, Handler>,
    rules: Rules,
}

/// Builder for [`Thing`]
#[derive(Default)]
pub struct ThingBuilder {
    props: IndexMap<String, StateProp>,
    rules: Option<Rules>,
}

impl ThingBuilder {
    /// Declare a state key
    ///
    /// Accepts a plain `Validator` or a `BoundProp`. Key declaration order
    /// is snapshot iteration order, and therefore emission order. When two
    /// bound properties register the same event name, the last registered
    /// binding handles the event.
    pub fn prop(mut self, key: impl Into<String>, prop: impl Into<StateProp>) -> Self {
        self.props.insert(key.into(), prop.into());
        self
    }

    /// Supply the rules function
    ///
    /// A thing without rules applies event updates but derives nothing.
    pub fn rules(mut self, f: impl Fn(&ValueMap) -> ValueMap + Send + Sync + 'static) -> Self {
        self.rules = Some(Box::new(f));
        self
    }

    /// Seed the initial snapshot and install event handlers
    pub fn build(self) -> Thing {
        let mut state = ValueMap::new();
        let mut handlers = IndexMap::new();

        for (key, prop) in self.props {
            if let Some(seed) = prop.validator().value_or_default(None) {
                state.insert(key.clone(), seed);
            }
            if let StateProp::Bound(bound) = prop {
                for binding in bound.bindings {
                    let event = binding.event.clone();
                    handlers.insert(
                        event,
                        Handler {
                            key: key.clone(),
                            binding,
                        },
                    );
                }
            }
        }

        Thing {
            state,
            handlers,
            rules: self.rules.unwrap_or_else(|| Box::new(|_| ValueMap::new())),
        }
    }
}

impl Thing {
    /// Start declaring a thing
    pub fn builder() -> ThingBuilder {
        ThingBuilder::default()
    }

    /// The last-committed state snapshot
    pub fn state(&self) -> &ValueMap {
        &self.state
    }

    /// Get one state key's current value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Handle an incoming envelope
    ///
    /// The event name and parameters are resolved from the request query
    /// when a request is present, from the payload otherwise. An envelope
    /// carrying no recognizable event yields no messages and no state
    /// change.
    pub fn handle(&mut self, envelope: &Envelope) -> Vec<ChangeMsg> {
        match envelope.event_params() {
            Some((event, params)) => self.dispatch(envelope, &event, &params),
            None => Vec::new(),
        }
    }

    /// Handle an envelope whose event arrives in the request query
    pub fn handle_http(&mut self, envelope: &Envelope) -> Vec<ChangeMsg> {
        match envelope.http_event_params() {
            Some((event, params)) => self.dispatch(envelope, &event, &params),
            None => Vec::new(),
        }
    }

    /// Handle an explicitly named event with an explicit parameter payload
    ///
    /// Explicit arguments take precedence over anything the envelope
    /// carries; the envelope only contributes its pass-through fields to
    /// emitted messages.
    pub fn handle_event(
        &mut self,
        envelope: &Envelope,
        event: &str,
        params: &ValueMap,
    ) -> Vec<ChangeMsg> {
        self.dispatch(envelope, event, params)
    }

    fn dispatch(&mut self, envelope: &Envelope, event: &str, params: &ValueMap) -> Vec<ChangeMsg> {
        // unrecognized event: no error, no state change
        let Some(handler) = self.handlers.get(event) else {
            return Vec::new();
        };

        // the event diff: zero or one key set directly by the event
        let mut event_diff = ValueMap::new();
        if let Some(value) = handler.binding.resolve(params) {
            event_diff.insert(handler.key.clone(), value);
        }

        // candidate = snapshot + event diff; what the rules see
        let mut candidate = self.state.clone();
        for (key, value) in &event_diff {
            candidate.insert(key.clone(), value.clone());
        }

        let derived = (self.rules)(&candidate);

        // final = snapshot + derived + event diff; the event is
        // authoritative for the keys it set directly
        let mut next = self.state.clone();
        for (key, value) in derived {
            next.insert(key, value);
        }
        for (key, value) in &event_diff {
            next.insert(key.clone(), value.clone());
        }

        // one message per rule-caused transition, in snapshot key order
        let mut out = Vec::new();
        for (key, value) in &next {
            if event_diff.contains_key(key) {
                continue;
            }
            if self.state.get(key) != Some(value) {
                out.push(ChangeMsg {
                    req: envelope.req.clone(),
                    meta: envelope.meta.clone(),
                    payload: ChangePayload::new(
                        key.clone(),
                        self.state.get(key).cloned().unwrap_or(Value::Null),
                        value.clone(),
                    ),
                });
            }
        }

        self.state = next;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind_event;

    fn home_thing() -> Thing {
        Thing::builder()
            .prop(
                "currentTime",
                bind_event(
                    Validator::number().with_default(0),
                    [EventBinding::from_param("timerEvent", "value")
                        .map(|v| Value::Int(v.as_int().unwrap_or(0) + 10))],
                ),
            )
            .prop(
                "sunIsShining",
                bind_event(
                    Validator::bool().with_default(true),
                    [
                        EventBinding::literal("sunrise", true),
                        EventBinding::literal("sunset", false),
                    ],
                ),
            )
            .prop(
                "somebodyAtHome",
                bind_event(
                    Validator::bool().with_default(false),
                    [
                        EventBinding::literal("arriveAtHome", true),
                        EventBinding::literal("leaveHome", false),
                    ],
                ),
            )
            .prop("lightsWindowOn", Validator::bool().with_default(false))
            .prop("lightsKitchenOn", Validator::bool().with_default(false))
            .prop("lightsBedroomOn", Validator::bool().with_default(false))
            .rules(|state| {
                let sun = state.bool("sunIsShining");
                let home = state.bool("somebodyAtHome");
                let time = state.int("currentTime");

                let mut out = ValueMap::new();
                out.insert(
                    "lightsWindowOn".into(),
                    (!sun && (home || time < 2359)).into(),
                );
                out.insert(
                    "lightsKitchenOn".into(),
                    (!sun && home && time < 2000).into(),
                );
                out.insert("lightsBedroomOn".into(), (!sun && home).into());
                out
            })
            .build()
    }

    #[test]
    fn test_initial_state_seeding() {
        let thing = home_thing();
        assert_eq!(thing.get("currentTime"), Some(&Value::Int(0)));
        assert_eq!(thing.get("sunIsShining"), Some(&Value::Bool(true)));
        assert_eq!(thing.get("somebodyAtHome"), Some(&Value::Bool(false)));
        assert_eq!(thing.get("lightsWindowOn"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_no_default_key_starts_absent() {
        let thing = Thing::builder()
            .prop("label", Validator::string())
            .prop("count", Validator::number().with_default(1))
            .build();

        assert!(thing.get("label").is_none());
        assert_eq!(thing.get("count"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_home_scenario() {
        let mut thing = home_thing();

        // somebody arrives while the sun still shines: the arrival is
        // event-set and no light rule flips, so nothing is emitted
        let arrive = Envelope::event("arriveAtHome").with_meta("foo", "bar");
        let result = thing.handle(&arrive);
        assert!(result.is_empty());
        assert_eq!(thing.get("somebodyAtHome"), Some(&Value::Bool(true)));

        // sunset flips all three lights on; the sun key itself was
        // event-set and must not be reported
        let sunset = Envelope::http_event("sunset").with_meta("foo", "bar");
        let result = thing.handle_http(&sunset);
        assert_eq!(result.len(), 3);
        let triggers: Vec<&str> = result.iter().map(|m| m.payload.trigger.as_str()).collect();
        assert_eq!(
            triggers,
            ["lightsWindowOn", "lightsKitchenOn", "lightsBedroomOn"]
        );
        // pass-through fields survive onto the emitted messages
        assert_eq!(
            result[0].meta.get("foo").and_then(|v| v.as_str()),
            Some("bar")
        );

        // the timer pushes currentTime past the kitchen cutoff: exactly one
        // rule-caused change
        let mut params = ValueMap::new();
        params.insert("value".into(), Value::Int(1995));
        let result = thing.handle_event(&Envelope::new(), "timerEvent", &params);

        assert_eq!(result.len(), 1);
        let change = &result[0].payload;
        assert_eq!(change.trigger, "lightsKitchenOn");
        assert_eq!(change.trigger_with_value, "lightsKitchenOn_false");
        assert_eq!(change.old_value, Value::Bool(true));
        assert_eq!(change.new_value, Value::Bool(false));
        assert_eq!(thing.get("currentTime"), Some(&Value::Int(2005)));
    }

    #[test]
    fn test_event_set_key_never_notifies() {
        let mut thing = Thing::builder()
            .prop(
                "door",
                bind_event(
                    Validator::bool().with_default(false),
                    [EventBinding::literal("open", true)],
                ),
            )
            .build();

        // the door value changes, but the event set it directly
        let result = thing.handle(&Envelope::event("open"));
        assert!(result.is_empty());
        assert_eq!(thing.get("door"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_unrecognized_event() {
        let mut thing = home_thing();
        let before = thing.state().clone();

        let result = thing.handle(&Envelope::event("doesNotExist"));
        assert!(result.is_empty());
        assert_eq!(thing.state(), &before);

        // an envelope with no event field at all behaves the same
        let result = thing.handle(&Envelope::new());
        assert!(result.is_empty());
    }

    #[test]
    fn test_duplicate_event_binding_last_wins() {
        let mut thing = Thing::builder()
            .prop(
                "first",
                bind_event(
                    Validator::bool().with_default(false),
                    [EventBinding::literal("toggle", true)],
                ),
            )
            .prop(
                "second",
                bind_event(
                    Validator::bool().with_default(false),
                    [EventBinding::literal("toggle", true)],
                ),
            )
            .build();

        thing.handle(&Envelope::event("toggle"));
        assert_eq!(thing.get("first"), Some(&Value::Bool(false)));
        assert_eq!(thing.get("second"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_missing_param_still_runs_rules() {
        let mut thing = Thing::builder()
            .prop(
                "level",
                bind_event(
                    Validator::number().with_default(0),
                    [EventBinding::from_param("setLevel", "value")],
                ),
            )
            .prop("ticks", Validator::number().with_default(0))
            .rules(|state| {
                let mut out = ValueMap::new();
                out.insert("ticks".into(), Value::Int(state.int("ticks") + 1));
                out
            })
            .build();

        // the param is absent, so the event applies no direct update, but
        // the rules still run against the unchanged candidate
        let result = thing.handle(&Envelope::event("setLevel"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].payload.trigger, "ticks");
        assert_eq!(thing.get("level"), Some(&Value::Int(0)));
        assert_eq!(thing.get("ticks"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_rule_key_event_precedence() {
        // when the rules and the event both write the same key, the event
        // wins and the key is not reported
        let mut thing = Thing::builder()
            .prop(
                "mode",
                bind_event(
                    Validator::string().with_default("idle"),
                    [EventBinding::literal("boost", "boost")],
                ),
            )
            .rules(|_| {
                let mut out = ValueMap::new();
                out.insert("mode".into(), "calm".into());
                out
            })
            .build();

        let result = thing.handle(&Envelope::event("boost"));
        assert!(result.is_empty());
        assert_eq!(thing.get("mode"), Some(&Value::String("boost".into())));
    }

    #[test]
    fn test_rule_created_key_reports_null_old_value() {
        let mut thing = Thing::builder()
            .prop(
                "armed",
                bind_event(
                    Validator::bool().with_default(false),
                    [EventBinding::literal("arm", true)],
                ),
            )
            .prop("since", Validator::number())
            .rules(|state| {
                let mut out = ValueMap::new();
                if state.bool("armed") {
                    out.insert("since".into(), Value::Int(100));
                }
                out
            })
            .build();

        // "since" has no default, so it is absent from the prior snapshot
        let result = thing.handle(&Envelope::event("arm"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].payload.trigger, "since");
        assert_eq!(result[0].payload.old_value, Value::Null);
        assert_eq!(result[0].payload.new_value, Value::Int(100));
    }
}
