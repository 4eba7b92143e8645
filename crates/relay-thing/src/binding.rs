//! Event bindings: recipes that turn a named event into a state update

use relay_props::{Validator, Value, ValueMap};
use std::fmt;
use std::sync::Arc;

/// Where a binding takes its update value from
#[derive(Debug, Clone)]
pub enum Source {
    /// A fixed value applied whenever the event fires
    Literal(Value),
    /// A value read from the event's parameter payload under this key
    Param(String),
}

/// A value transformation applied after extraction
#[derive(Clone)]
pub struct Transform(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl Transform {
    /// Wrap a transformation function
    pub fn new(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Apply the transformation
    pub fn apply(&self, value: Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// Associates one named event with a state-key update recipe
#[derive(Debug, Clone)]
pub struct EventBinding {
    /// The event name this binding responds to
    pub event: String,
    /// Where the update value comes from
    pub source: Source,
    /// Optional transformation of the extracted value
    pub transform: Option<Transform>,
}

impl EventBinding {
    /// Bind an event to a fixed update value
    pub fn literal(event: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            event: event.into(),
            source: Source::Literal(value.into()),
            transform: None,
        }
    }

    /// Bind an event to a value read from its parameter payload
    pub fn from_param(event: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            source: Source::Param(key.into()),
            transform: None,
        }
    }

    /// Apply `f` to the extracted value before it reaches the state
    pub fn map(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.transform = Some(Transform::new(f));
        self
    }

    /// Resolve this binding against an event's parameter payload
    ///
    /// Returns `None` when the named parameter is absent; the event then
    /// applies no direct update.
    pub fn resolve(&self, params: &ValueMap) -> Option<Value> {
        let value = match &self.source {
            Source::Literal(value) => value.clone(),
            Source::Param(key) => params.get(key)?.clone(),
        };
        Some(match &self.transform {
            Some(transform) => transform.apply(value),
            None => value,
        })
    }
}

/// A property validator together with its event bindings
#[derive(Debug, Clone)]
pub struct BoundProp {
    /// The validator for the bound state key
    pub validator: Validator,
    /// Bindings in registration order
    pub bindings: Vec<EventBinding>,
}

impl BoundProp {
    /// Wrap a validator with no bindings yet
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            bindings: Vec::new(),
        }
    }

    /// Add a binding
    pub fn on(mut self, binding: EventBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Add a fixed-value binding
    pub fn on_literal(self, event: impl Into<String>, value: impl Into<Value>) -> Self {
        self.on(EventBinding::literal(event, value))
    }

    /// Add a parameter-extracting binding
    pub fn on_param(self, event: impl Into<String>, key: impl Into<String>) -> Self {
        self.on(EventBinding::from_param(event, key))
    }
}

/// Wrap a property validator with an ordered list of event bindings
pub fn bind_event(
    validator: Validator,
    bindings: impl IntoIterator<Item = EventBinding>,
) -> BoundProp {
    BoundProp {
        validator,
        bindings: bindings.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_binding() {
        let binding = EventBinding::literal("sunset", false);
        assert_eq!(binding.resolve(&ValueMap::new()), Some(Value::Bool(false)));
    }

    #[test]
    fn test_param_binding_with_transform() {
        let binding = EventBinding::from_param("timerEvent", "value")
            .map(|v| Value::Int(v.as_int().unwrap_or(0) + 10));

        let mut params = ValueMap::new();
        params.insert("value".into(), Value::Int(1995));
        assert_eq!(binding.resolve(&params), Some(Value::Int(2005)));
    }

    #[test]
    fn test_param_binding_missing_param() {
        let binding = EventBinding::from_param("timerEvent", "value");
        assert_eq!(binding.resolve(&ValueMap::new()), None);
    }

    #[test]
    fn test_bound_prop_builder() {
        let prop = BoundProp::new(Validator::bool().with_default(true))
            .on_literal("sunrise", true)
            .on_literal("sunset", false);

        assert_eq!(prop.bindings.len(), 2);
        assert_eq!(prop.bindings[0].event, "sunrise");
        assert_eq!(prop.bindings[1].event, "sunset");
    }

    #[test]
    fn test_bind_event() {
        let prop = bind_event(
            Validator::number().with_default(0),
            [EventBinding::from_param("timerEvent", "value")],
        );
        assert_eq!(prop.bindings.len(), 1);
        assert!(prop.validator.default_value().is_some());
    }
}
