//! Validator core and composition
//!
//! A [`Validator`] is an immutable, shareable description of a type
//! constraint: leaf checks (string/number/bool/func), unions, enumerations,
//! arrays, and object schemas. Checking a value never fails and never has
//! side effects; the erroring entry points live in the schema-resolution
//! layer.

use crate::{Value, ValueMap};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A user-supplied check over a single value
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    /// Wrap a predicate function
    pub fn new(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Run the predicate
    pub fn check(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// What a validator checks
///
/// One explicit variant per constraint; keyed and homogeneous object
/// schemas are separate variants rather than one overloaded constructor.
#[derive(Debug, Clone)]
pub(crate) enum Kind {
    /// Textual values
    String,
    /// Numeric values (int or float)
    Number,
    /// Exactly `true` or `false`
    Bool,
    /// Invocable values
    Func,
    /// Union: valid iff at least one child accepts, first match wins
    AnyOf(Vec<Validator>),
    /// Custom predicate
    Custom(Predicate),
    /// Sequential collection, optionally with a per-element validator
    Array(Option<Box<Validator>>),
    /// Enumeration: valid iff strictly equal to one of the listed values
    OneOf(Vec<Value>),
    /// Keyed object schema: fixed field names, each with its own validator
    Keyed(IndexMap<String, Validator>),
    /// Homogeneous object schema: one validator for every value,
    /// independent of key names
    Uniform(Box<Validator>),
}

/// A checkable type constraint with optionality and default metadata
#[derive(Debug, Clone)]
pub struct Validator {
    pub(crate) kind: Kind,
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
}

impl Validator {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            default: None,
        }
    }

    /// Accept textual values
    pub fn string() -> Self {
        Self::new(Kind::String)
    }

    /// Accept numeric values (int or float)
    pub fn number() -> Self {
        Self::new(Kind::Number)
    }

    /// Accept exactly `true` or `false`
    pub fn bool() -> Self {
        Self::new(Kind::Bool)
    }

    /// Accept invocable values
    pub fn func() -> Self {
        Self::new(Kind::Func)
    }

    /// Accept values that satisfy at least one of the given validators
    pub fn any_of(validators: impl IntoIterator<Item = Validator>) -> Self {
        Self::new(Kind::AnyOf(validators.into_iter().collect()))
    }

    /// Accept values for which the predicate returns true
    pub fn custom(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::new(Kind::Custom(Predicate::new(f)))
    }

    /// Accept any list value
    pub fn array() -> Self {
        Self::new(Kind::Array(None))
    }

    /// Accept list values whose every element satisfies `element`
    pub fn array_of(element: Validator) -> Self {
        Self::new(Kind::Array(Some(Box::new(element))))
    }

    /// Accept values strictly equal to one of the enumerated values
    ///
    /// Values may be heterogeneous; membership uses `Value`'s `PartialEq`.
    pub fn one_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::new(Kind::OneOf(values.into_iter().map(Into::into).collect()))
    }

    /// Accept maps with the given fixed fields (keyed schema)
    ///
    /// Missing non-optional fields fail; keys not declared in the schema
    /// are ignored.
    pub fn object<S: Into<String>>(fields: impl IntoIterator<Item = (S, Validator)>) -> Self {
        Self::new(Kind::Keyed(
            fields
                .into_iter()
                .map(|(name, validator)| (name.into(), validator))
                .collect(),
        ))
    }

    /// Accept maps whose every value satisfies `inner`, whatever the keys
    /// (homogeneous schema)
    pub fn map_of(inner: Validator) -> Self {
        Self::new(Kind::Uniform(Box::new(inner)))
    }

    /// Mark this validator as optional: an *absent* value at the containing
    /// field is accepted regardless of the base check
    ///
    /// Absence means "key not present"; a present `Null` still goes through
    /// the base check.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Record a fallback used by default resolution when the field is absent
    ///
    /// Does not relax the check itself: a present value of the wrong type
    /// still fails.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Whether absence satisfies this validator
    ///
    /// A recorded default makes a field satisfiable by absence even without
    /// an explicit `optional()`.
    pub fn is_optional(&self) -> bool {
        self.optional || self.default.is_some()
    }

    /// The recorded default value, if any
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Check a value against this validator
    ///
    /// Total and pure: returns false rather than erroring, recursing
    /// through nested validators.
    pub fn validate_value(&self, value: &Value) -> bool {
        match &self.kind {
            Kind::String => matches!(value, Value::String(_)),
            Kind::Number => matches!(value, Value::Int(_) | Value::Float(_)),
            Kind::Bool => matches!(value, Value::Bool(_)),
            Kind::Func => matches!(value, Value::Func(_)),
            Kind::AnyOf(validators) => validators.iter().any(|v| v.validate_value(value)),
            Kind::Custom(predicate) => predicate.check(value),
            Kind::Array(element) => match value {
                Value::List(items) => match element {
                    Some(element) => items.iter().all(|item| element.validate_value(item)),
                    None => true,
                },
                _ => false,
            },
            Kind::OneOf(values) => values.contains(value),
            Kind::Keyed(fields) => match value {
                Value::Map(map) => fields.iter().all(|(name, field)| match map.get(name) {
                    Some(present) => field.validate_value(present),
                    None => field.is_optional(),
                }),
                _ => false,
            },
            Kind::Uniform(inner) => match value {
                Value::Map(map) => map.values().all(|v| inner.validate_value(v)),
                _ => false,
            },
        }
    }

    /// Short description of what this validator expects, for error messages
    pub(crate) fn expected(&self) -> String {
        match &self.kind {
            Kind::String => "string".to_string(),
            Kind::Number => "number".to_string(),
            Kind::Bool => "bool".to_string(),
            Kind::Func => "function".to_string(),
            Kind::AnyOf(validators) => {
                let parts: Vec<String> = validators.iter().map(|v| v.expected()).collect();
                format!("any of [{}]", parts.join(", "))
            }
            Kind::Custom(_) => "value matching predicate".to_string(),
            Kind::Array(Some(element)) => format!("list of {}", element.expected()),
            Kind::Array(None) => "list".to_string(),
            Kind::OneOf(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("one of [{}]", parts.join(", "))
            }
            Kind::Keyed(_) => "object".to_string(),
            Kind::Uniform(inner) => format!("map of {}", inner.expected()),
        }
    }
}
