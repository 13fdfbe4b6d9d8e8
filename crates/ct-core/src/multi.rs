//! Repeatable groups: a prototype child list plus independently cloned
//! value records.
//!
//! The prototype declares the shape; each record is a deep clone of it,
//! populated with its own values. Records never share state with the
//! prototype or with each other.

use ct_common::{Error, Result};
use serde_json::Value as Json;
use tracing::warn;

use crate::group::{Group, Node};
use crate::trigger::CrossRule;

/// A group whose values are an ordered list of records.
#[derive(Debug, Clone)]
pub struct MultiGroup {
    proto: Group,
    records: Vec<Group>,
}

impl MultiGroup {
    pub fn new(id: &str, label: &str) -> MultiGroup {
        MultiGroup {
            proto: Group::new(id, label),
            records: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        self.proto.id()
    }

    pub fn label(&self) -> &str {
        self.proto.label()
    }

    /// The prototype group declaring the record shape.
    pub fn prototype(&self) -> &Group {
        &self.proto
    }

    pub fn records(&self) -> &[Group] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Group] {
        &mut self.records
    }

    /// Adds a prototype child. Existing records no longer match the
    /// prototype shape, so they are dropped with a warning.
    pub fn add_child(&mut self, item: impl Into<Node>) -> Result<()> {
        if !self.records.is_empty() {
            warn!(
                group = %self.proto.id(),
                dropped = self.records.len(),
                "records reset: prototype changed after records existed"
            );
            self.records.clear();
        }
        self.proto.add_child(item)
    }

    /// Attaches cross rules to the prototype (cloned into every record).
    pub fn set_rules(&mut self, rules: Vec<CrossRule>) -> Result<()> {
        self.proto.set_rules(rules)
    }

    /// Clones the prototype into a fresh, default-valued record.
    pub fn fresh_record(&self) -> Group {
        let mut record = self.proto.clone();
        record.reset_value();
        record
    }

    /// Appends a populated record.
    pub fn push_record(&mut self, record: Group) {
        self.records.push(record);
    }

    pub fn status_self(&self) -> String {
        self.proto.status_self()
    }

    /// A repeatable group is empty when it has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Applies a value document of the form `{id: mapping}` or
    /// `{id: [mapping, ...]}`; a single mapping is a one-record list.
    /// On success the record list is replaced wholesale.
    pub fn load_values(&mut self, doc: &Json) -> Result<()> {
        let obj = doc.as_object().ok_or_else(|| Error::InvalidValue {
            field: self.proto.id().to_string(),
            message: format!("value document must be an object, got {doc}"),
        })?;
        let inner = obj.get(self.proto.id()).ok_or_else(|| Error::MissingKey {
            id: self.proto.id().to_string(),
        })?;
        self.apply_value(inner)
    }

    pub(crate) fn apply_value(&mut self, value: &Json) -> Result<()> {
        let elements: Vec<&Json> = match value {
            Json::Object(_) => vec![value],
            Json::Array(items) => items.iter().collect(),
            other => {
                return Err(Error::InvalidValue {
                    field: self.proto.id().to_string(),
                    message: format!("{other} not valid for repeatable group {}", self.proto.id()),
                })
            }
        };
        let mut loaded = Vec::with_capacity(elements.len());
        for element in elements {
            let mut record = self.fresh_record();
            record.apply_value(element)?;
            loaded.push(record);
        }
        self.records = loaded;
        Ok(())
    }

    /// Value projection: one mapping per record, in record order.
    pub fn values(&self, hide_password: bool) -> Json {
        Json::Array(self.records.iter().map(|r| r.values(hide_password)).collect())
    }

    /// Drops all records. The prototype and its defaults are untouched.
    pub fn reset_value(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldType};
    use serde_json::json;

    fn tracker() -> MultiGroup {
        let mut m = MultiGroup::new("tracker", "Torrent providers");
        m.add_child(
            Field::builder("id", FieldType::Text)
                .required(true)
                .build()
                .unwrap(),
        )
        .unwrap();
        m.add_child(Field::builder("user", FieldType::Text).build().unwrap())
            .unwrap();
        m
    }

    #[test]
    fn single_mapping_is_a_one_record_list() {
        let mut m = tracker();
        m.load_values(&json!({"tracker": {"id": "t411", "user": "niorf"}}))
            .unwrap();
        assert_eq!(m.records().len(), 1);
        assert_eq!(m.values(false), json!([{"id": "t411", "user": "niorf"}]));
    }

    #[test]
    fn load_replaces_records_wholesale() {
        let mut m = tracker();
        m.load_values(&json!({"tracker": [{"id": "a"}, {"id": "b"}]}))
            .unwrap();
        assert_eq!(m.records().len(), 2);
        m.load_values(&json!({"tracker": [{"id": "c"}]})).unwrap();
        assert_eq!(m.records().len(), 1);
        assert_eq!(m.values(false), json!([{"id": "c", "user": null}]));
    }

    #[test]
    fn unknown_key_in_record_fails() {
        let mut m = tracker();
        let err = m
            .load_values(&json!({"tracker": [{"id": "a", "bogus": 1}]}))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownKey { .. }));
    }

    #[test]
    fn records_are_independent_of_prototype_and_each_other() {
        let mut m = tracker();
        m.load_values(&json!({"tracker": [{"id": "a"}, {"id": "b"}]}))
            .unwrap();

        if let Some(Node::Field(f)) = m.records_mut()[0].child_mut("user") {
            f.set_json(&json!("mutated")).unwrap();
        }
        assert_eq!(
            m.values(false),
            json!([{"id": "a", "user": "mutated"}, {"id": "b", "user": null}])
        );
        // The prototype never picks up record values.
        assert!(m
            .prototype()
            .children()
            .iter()
            .all(|child| child.is_empty()));
    }

    #[test]
    fn adding_prototype_child_drops_records() {
        let mut m = tracker();
        m.load_values(&json!({"tracker": {"id": "a"}})).unwrap();
        assert_eq!(m.records().len(), 1);
        m.add_child(Field::builder("password", FieldType::Password).build().unwrap())
            .unwrap();
        assert!(m.records().is_empty());
        assert_eq!(m.prototype().children().len(), 3);
    }

    #[test]
    fn reset_clears_records_only() {
        let mut m = tracker();
        m.load_values(&json!({"tracker": {"id": "a"}})).unwrap();
        m.reset_value();
        assert!(m.is_empty());
        assert_eq!(m.prototype().children().len(), 2);
    }
}
