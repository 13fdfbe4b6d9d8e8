//! Editing-session flows driven by the scripted prompter.

use ct_core::{
    edit_group, edit_multi, CrossRule, Field, FieldType, Group, MultiGroup, Node,
    ScriptedPrompter, TriggerMap,
};
use serde_json::json;

fn tracker_multi() -> MultiGroup {
    let mut tracker = MultiGroup::new("tracker", "Torrent providers");
    tracker
        .add_child(
            Field::builder("id", FieldType::Text)
                .required(true)
                .build()
                .unwrap(),
        )
        .unwrap();
    tracker
        .add_child(Field::builder("user", FieldType::Text).build().unwrap())
        .unwrap();
    tracker
}

#[test]
fn two_records_with_independent_values() {
    let mut tracker = tracker_multi();
    // Record 1: id=t411, user=niorf, another? yes.
    // Record 2: id=kickass, user blank, another? no.
    let mut prompter = ScriptedPrompter::new(&["t411", "niorf", "y", "kickass", "", "n"]);
    edit_multi(&mut tracker, &mut prompter).unwrap();

    assert_eq!(tracker.records().len(), 2);
    assert_eq!(
        tracker.values(false),
        json!([
            {"id": "t411", "user": "niorf"},
            {"id": "kickass", "user": null}
        ])
    );

    // Mutating one record leaves the other and the prototype untouched.
    if let Some(Node::Field(user)) = tracker.records_mut()[1].child_mut("user") {
        user.set_json(&json!("someone")).unwrap();
    }
    assert_eq!(tracker.values(false)[0]["user"], json!("niorf"));
    assert!(tracker.prototype().children().iter().all(Node::is_empty));
}

#[test]
fn empty_record_stops_the_loop() {
    let mut tracker = tracker_multi();
    // Both fields blank: the record is empty, the loop stops without a
    // yes/no question.
    let mut prompter = ScriptedPrompter::new(&["", ""]);
    edit_multi(&mut tracker, &mut prompter).unwrap();
    assert!(tracker.records().is_empty());
}

#[test]
fn disabled_children_are_skipped() {
    let mut group = Group::new("conf", "Configuration");
    group
        .add_child(
            Field::builder("mode", FieldType::Text)
                .trigger_map(TriggerMap::new().rule("simple", "Simple"))
                .build()
                .unwrap(),
        )
        .unwrap();
    group
        .add_child(Field::builder("detail", FieldType::Text).build().unwrap())
        .unwrap();
    group
        .set_rules(vec![CrossRule::new("mode", "Simple", "detail", "disabled")])
        .unwrap();

    // One answer for mode; detail is disabled by then and never asked.
    let mut prompter = ScriptedPrompter::new(&["simple"]);
    edit_group(&mut group, &mut prompter).unwrap();
    assert_eq!(group.values(false), json!({"mode": "simple", "detail": null}));
}

#[test]
fn choice_field_resolves_through_the_menu() {
    let mut group = Group::new("conf", "Configuration");
    group
        .add_child(
            Field::builder("provider", FieldType::Text)
                .required(true)
                .choice("t411", "T411")
                .choice("kickass", "KickAss")
                .build()
                .unwrap(),
        )
        .unwrap();

    let mut prompter = ScriptedPrompter::new(&["kickass"]);
    edit_group(&mut group, &mut prompter).unwrap();
    assert_eq!(group.values(false), json!({"provider": "kickass"}));
}

#[test]
fn invalid_then_valid_number() {
    let mut group = Group::new("conf", "Configuration");
    group
        .add_child(
            Field::builder("port", FieldType::Number)
                .required(true)
                .build()
                .unwrap(),
        )
        .unwrap();

    let mut prompter = ScriptedPrompter::new(&["-1", "0", "51413"]);
    edit_group(&mut group, &mut prompter).unwrap();
    assert_eq!(group.values(false), json!({"port": 51413}));
    assert_eq!(prompter.warnings.len(), 2);
}
