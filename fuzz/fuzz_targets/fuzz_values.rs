//! Fuzz target for value document loading.
//!
//! Feeds arbitrary JSON documents to a fixed tree and checks that
//! loading rejects bad shapes with errors instead of panicking.

#![no_main]

use ct_core::{Field, FieldType, Group, MultiGroup};
use libfuzzer_sys::fuzz_target;
use serde_json::Value as Json;

fn build_tree() -> Group {
    let mut tracker = MultiGroup::new("tracker", "Trackers");
    tracker
        .add_child(
            Field::builder("id", FieldType::Text)
                .required(true)
                .build()
                .unwrap(),
        )
        .unwrap();

    let mut conf = Group::new("conf", "Configuration");
    conf.add_child(Field::builder("server", FieldType::Text).build().unwrap())
        .unwrap();
    conf.add_child(Field::builder("port", FieldType::Number).build().unwrap())
        .unwrap();
    conf.add_child(Field::builder("mail", FieldType::Email).build().unwrap())
        .unwrap();
    conf.add_child(tracker).unwrap();
    conf
}

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = serde_json::from_slice::<Json>(data) {
        let mut tree = build_tree();
        if tree.load_values(&doc).is_ok() {
            // A loaded tree must still project cleanly.
            let _ = tree.values(true);
        }
    }
});
