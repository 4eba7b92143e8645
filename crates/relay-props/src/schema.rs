//! Schema resolution: labelled validation and default-filling
//!
//! `validate_value` answers a data-shape query; the entry points here are
//! for contexts where a non-conforming value is an integration error
//! (`validate`, `validate_and_default`) or where absent fields should be
//! filled from recorded defaults (`value_or_default`). Default-filling
//! never overrides a present value, including a present `Null`; only true
//! absence triggers substitution.

use crate::validator::Kind;
use crate::{Error, Result, Validator, Value, ValueMap};

impl Validator {
    /// Check a value, failing with a labelled error on mismatch
    ///
    /// `label` names the value being checked; nested failures extend it
    /// with `.field` and `[index]` segments.
    pub fn validate(&self, value: &Value, label: &str) -> Result<()> {
        match &self.kind {
            Kind::Keyed(fields) => {
                let Value::Map(map) = value else {
                    return Err(self.invalid(label, value));
                };
                for (name, field) in fields {
                    let path = format!("{}.{}", label, name);
                    match map.get(name) {
                        Some(present) => field.validate(present, &path)?,
                        None if field.is_optional() => {}
                        None => return Err(Error::MissingField(path)),
                    }
                }
                Ok(())
            }
            Kind::Uniform(inner) => {
                let Value::Map(map) = value else {
                    return Err(self.invalid(label, value));
                };
                for (key, entry) in map {
                    inner.validate(entry, &format!("{}.{}", label, key))?;
                }
                Ok(())
            }
            Kind::Array(Some(element)) => {
                let Value::List(items) = value else {
                    return Err(self.invalid(label, value));
                };
                for (index, item) in items.iter().enumerate() {
                    element.validate(item, &format!("{}[{}]", label, index))?;
                }
                Ok(())
            }
            _ => {
                if self.validate_value(value) {
                    Ok(())
                } else {
                    Err(self.invalid(label, value))
                }
            }
        }
    }

    /// Resolve a possibly-absent input against recorded defaults
    ///
    /// A present input wins unchanged (even `Null`). An absent input falls
    /// back to the recorded default, or `None` when there is none. Keyed
    /// schemas merge per declared field and recurse into nested object
    /// validators; called with no input they produce the all-defaults (or
    /// empty) map, which is how a thing's initial state is seeded.
    pub fn value_or_default(&self, input: Option<&Value>) -> Option<Value> {
        match &self.kind {
            Kind::Keyed(fields) => {
                let input_map = match input {
                    Some(Value::Map(map)) => Some(map),
                    // a present non-map stays as provided; validation will
                    // report it, substitution must not mask it
                    Some(other) => return Some(other.clone()),
                    None => match &self.default {
                        Some(default) => return Some(default.clone()),
                        None => None,
                    },
                };

                let mut out = ValueMap::new();
                for (name, field) in fields {
                    let field_input = input_map.and_then(|map| map.get(name));
                    if let Some(resolved) = field.value_or_default(field_input) {
                        out.insert(name.clone(), resolved);
                    }
                }
                Some(Value::Map(out))
            }
            Kind::Uniform(inner) => match input {
                Some(Value::Map(map)) => {
                    let mut out = ValueMap::new();
                    for (key, entry) in map {
                        if let Some(resolved) = inner.value_or_default(Some(entry)) {
                            out.insert(key.clone(), resolved);
                        }
                    }
                    Some(Value::Map(out))
                }
                Some(other) => Some(other.clone()),
                None => self.default.clone(),
            },
            _ => input.cloned().or_else(|| self.default.clone()),
        }
    }

    /// Fill defaults, then validate the resolved value
    ///
    /// Fails when the resolved value still does not satisfy the schema: a
    /// required field with no default remains missing, or a present field
    /// has the wrong type.
    pub fn validate_and_default(&self, value: &Value) -> Result<Value> {
        let resolved = self
            .value_or_default(Some(value))
            .unwrap_or_else(|| value.clone());
        self.validate(&resolved, "value")?;
        Ok(resolved)
    }

    fn invalid(&self, label: &str, value: &Value) -> Error {
        Error::Invalid {
            label: label.to_string(),
            expected: self.expected(),
            got: value.type_name().to_string(),
        }
    }
}
