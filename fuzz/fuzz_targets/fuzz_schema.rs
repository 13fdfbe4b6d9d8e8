//! Fuzz target for schema document parsing.
//!
//! Tests that schema parsing and tree reconstruction handle arbitrary
//! input without panicking.

#![no_main]

use ct_core::{Node, NodeSchema};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing and reconstruction should never panic, only return errors.
    if let Ok(schema) = serde_json::from_slice::<NodeSchema>(data) {
        let _ = Node::from_schema(schema);
    }
});
