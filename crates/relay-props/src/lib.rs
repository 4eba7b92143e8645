//! Relay Props - composable value validators and schema resolution
//!
//! This crate provides the validation half of the relay engine:
//! - Dynamic value types (`Value`, `ValueMap`, `NativeFn`)
//! - Leaf validators (string/number/bool/func) with `optional` and
//!   `with_default` modifiers
//! - Composition: unions (`any_of`), predicates (`custom`), arrays,
//!   enumerations (`one_of`), keyed object schemas (`object`) and
//!   homogeneous value-shape schemas (`map_of`)
//! - Schema resolution: `validate` with labelled errors,
//!   `value_or_default` default-filling, `validate_and_default`
//!
//! Validators are immutable after construction and may be freely shared
//! between things.

mod error;
mod schema;
mod validator;
mod value;

pub use error::{Error, Result};
pub use validator::{Predicate, Validator};
pub use value::{NativeFn, Value, ValueMap};
