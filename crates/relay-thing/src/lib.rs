//! Relay Thing - reactive state/diff engine
//!
//! This crate provides the reactive half of the relay engine:
//! - Message envelopes and outgoing change notifications (`Envelope`,
//!   `ChangeMsg`)
//! - Event bindings mapping named events onto state updates
//!   (`EventBinding`, `BoundProp`, `bind_event`)
//! - The `Thing` engine: one owned state snapshot, a handler table built
//!   at construction, and a pure rules function deriving state from each
//!   event's candidate snapshot
//!
//! A thing emits exactly one change message per state key whose committed
//! value differs from the prior snapshot, excluding keys the triggering
//! event set directly. Handling is synchronous and single-threaded; a
//! `Thing` is exclusively owned by its caller and calls to `handle` are
//! serialized by `&mut self`.

mod binding;
mod envelope;
mod thing;

pub use binding::{bind_event, BoundProp, EventBinding, Source, Transform};
pub use envelope::{ChangeMsg, ChangePayload, Envelope, Request};
pub use thing::{Rules, StateProp, StateRead, Thing, ThingBuilder};

/// The validator crate, re-exported for callers declaring schemas
pub use relay_props as props;
