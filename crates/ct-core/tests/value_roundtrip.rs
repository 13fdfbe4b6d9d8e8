//! Value projection round-trip: feeding `values(false)` back through
//! `load_values` on a schema-reconstructed clone reproduces the values.

use ct_core::{Field, FieldType, Group, MultiGroup};
use serde_json::{json, Map, Value as Json};

fn build_conf() -> Group {
    let mut tracker = MultiGroup::new("tracker", "Torrent providers");
    tracker
        .add_child(
            Field::builder("id", FieldType::Text)
                .required(true)
                .choice("t411", "T411")
                .choice("kickass", "KickAss")
                .build()
                .unwrap(),
        )
        .unwrap();
    tracker
        .add_child(Field::builder("user", FieldType::Text).build().unwrap())
        .unwrap();
    tracker
        .add_child(Field::builder("password", FieldType::Password).build().unwrap())
        .unwrap();

    let mut conf = Group::new("conf", "Configuration");
    conf.add_child(
        Field::builder("version", FieldType::Text)
            .default_value("2.0")
            .build()
            .unwrap(),
    )
    .unwrap();
    conf.add_child(
        Field::builder("watchdirs", FieldType::Text).build().unwrap(),
    )
    .unwrap();
    conf.add_child(tracker).unwrap();
    conf
}

fn wrap(id: &str, content: Json) -> Json {
    let mut doc = Map::new();
    doc.insert(id.to_string(), content);
    Json::Object(doc)
}

#[test]
fn populated_tree_round_trips() {
    let mut original = build_conf();
    original
        .load_values(&json!({"conf": {
            "watchdirs": ["/downloads", "/seed"],
            "tracker": [
                {"id": "t411", "user": "niorf", "password": "hunter2"},
                {"id": "kickass"}
            ]
        }}))
        .unwrap();

    let projection = original.values(false);
    let mut clone = Group::from_schema(original.to_schema()).unwrap();
    clone.load_values(&wrap("conf", projection.clone())).unwrap();

    assert_eq!(clone.values(false), projection);
    assert_eq!(
        projection["tracker"],
        json!([
            {"id": "t411", "user": "niorf", "password": "hunter2"},
            {"id": "kickass", "user": null, "password": null}
        ])
    );
}

#[test]
fn masked_projection_must_not_be_fed_back() {
    let mut original = build_conf();
    original
        .load_values(&json!({"conf": {
            "tracker": {"id": "t411", "password": "hunter2"}
        }}))
        .unwrap();

    let masked = original.values(true);
    assert_eq!(masked["tracker"][0]["password"], json!("****"));

    // Masking is one-way: reloading the masked projection stores the
    // mask token itself, not the secret.
    let mut clone = Group::from_schema(original.to_schema()).unwrap();
    clone.load_values(&wrap("conf", masked)).unwrap();
    assert_eq!(clone.values(false)["tracker"][0]["password"], json!("****"));
}

#[test]
fn null_values_survive_the_trip() {
    let mut original = build_conf();
    original
        .load_values(&json!({"conf": {"tracker": {"id": "t411"}}}))
        .unwrap();

    let projection = original.values(false);
    assert_eq!(projection["version"], json!("2.0"));
    assert_eq!(projection["watchdirs"], Json::Null);

    let mut clone = Group::from_schema(original.to_schema()).unwrap();
    clone.load_values(&wrap("conf", projection.clone())).unwrap();
    assert_eq!(clone.values(false), projection);
}
