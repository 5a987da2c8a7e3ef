#![no_main]

use libfuzzer_sys::fuzz_target;
use tagunion_core::{SchemaDef, Value};

// Accepts arbitrary bytes shaped as `{"schema": <definition>, "data": <json>}`,
// builds the schema and validates the data with it.
// Goal: no panics; construction and validation failures are plain errors.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Some(definition) = input.get("schema").cloned() else {
        return;
    };
    let Ok(schema) = SchemaDef::from_json(definition).and_then(|def| def.build()) else {
        return;
    };
    let value = Value::from(input.get("data").cloned().unwrap_or_default());
    if let Err(err) = schema.parse(&value) {
        let _ = err.to_json();
    }
});
