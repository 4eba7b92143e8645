//! Home Lights Demo
//!
//! Demonstrates relay with a small home-automation thing: three lights
//! derived from the sun, presence, and a wall-clock timer. Only
//! rule-caused changes are reported; the fields each event sets directly
//! never are.

use relay_props::{Validator, Value, ValueMap};
use relay_thing::{bind_event, ChangeMsg, Envelope, EventBinding, StateRead, Thing};

fn main() {
    println!("=== Relay Home Lights Demo ===\n");

    let mut thing = Thing::builder()
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
        .build();

    println!("Initial state:");
    print_state(&thing);

    // somebody arrives while the sun is still up
    report(
        "arriveAtHome (payload event)",
        thing.handle(&Envelope::event("arriveAtHome")),
    );

    // sunset arrives over HTTP
    report(
        "sunset (request query event)",
        thing.handle_http(&Envelope::http_event("sunset")),
    );

    // the wall clock passes the kitchen cutoff
    let mut params = ValueMap::new();
    params.insert("value".into(), Value::Int(1995));
    report(
        "timerEvent value=1995 (explicit event)",
        thing.handle_event(&Envelope::new(), "timerEvent", &params),
    );

    println!("Final state:");
    print_state(&thing);
}

fn report(label: &str, messages: Vec<ChangeMsg>) {
    println!("--> {}: {} change(s)", label, messages.len());
    for msg in &messages {
        println!(
            "    {} ({} -> {})",
            msg.payload.trigger_with_value, msg.payload.old_value, msg.payload.new_value
        );
    }
    println!();
}

fn print_state(thing: &Thing) {
    for (key, value) in thing.state() {
        println!("    {} = {}", key, value);
    }
    println!();
}
