//! Schema documents: the structural projection of a configuration tree.
//!
//! Independent of the value channel: a schema document carries ids,
//! types, labels, choices, defaults, and trigger rules, never current
//! values. Reconstructing from a schema yields a tree whose fields sit at
//! their own defaults.

use ct_common::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::field::{Field, FieldType};
use crate::group::{Group, Node};
use crate::multi::MultiGroup;
use crate::trigger::{CrossRule, TriggerMap};

/// A schema document node, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeSchema {
    Leaf(LeafSchema),
    Group(GroupSchema),
    RepeatableGroup(GroupSchema),
}

/// Schema of a leaf field. The node kind lives under `type`, so the data
/// type travels under `field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafSchema {
    pub id: String,
    pub field: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub choices: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Json>,
    #[serde(default, skip_serializing_if = "TriggerMap::is_empty")]
    pub trigger: TriggerMap,
}

/// Schema of a group or repeatable group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSchema {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub items: Vec<NodeSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trigger: Vec<CrossRule>,
}

impl Field {
    pub fn to_schema(&self) -> LeafSchema {
        LeafSchema {
            id: self.id().to_string(),
            field: self.field_type(),
            label: Some(self.label().to_string()),
            placeholder: Some(self.placeholder().to_string()),
            required: self.required(),
            choices: self.choices().clone(),
            default: self.default_value().map(|s| s.to_json()),
            trigger: self.trigger().clone(),
        }
    }

    /// Reconstructs a field from its schema; the value starts at the
    /// declared default.
    pub fn from_schema(schema: LeafSchema) -> Result<Field> {
        let mut builder = Field::builder(&schema.id, schema.field)
            .required(schema.required)
            .choices(schema.choices)
            .trigger_map(schema.trigger);
        if let Some(label) = &schema.label {
            builder = builder.label(label);
        }
        if let Some(placeholder) = &schema.placeholder {
            builder = builder.placeholder(placeholder);
        }
        if let Some(default) = schema.default {
            builder = builder.default_value(default);
        }
        builder.build()
    }
}

impl Group {
    pub fn to_schema(&self) -> GroupSchema {
        GroupSchema {
            id: self.id().to_string(),
            label: Some(self.label().to_string()),
            items: self.children().iter().map(Node::to_schema).collect(),
            trigger: self.rules().to_vec(),
        }
    }

    pub fn from_schema(schema: GroupSchema) -> Result<Group> {
        let label = schema.label.unwrap_or_else(|| schema.id.clone());
        let mut group = Group::new(&schema.id, &label);
        for item in schema.items {
            group.add_child(Node::from_schema(item)?)?;
        }
        group.set_rules(schema.trigger)?;
        Ok(group)
    }
}

impl MultiGroup {
    pub fn to_schema(&self) -> GroupSchema {
        GroupSchema {
            id: self.id().to_string(),
            label: Some(self.label().to_string()),
            items: self
                .prototype()
                .children()
                .iter()
                .map(Node::to_schema)
                .collect(),
            trigger: self.prototype().rules().to_vec(),
        }
    }

    pub fn from_schema(schema: GroupSchema) -> Result<MultiGroup> {
        let label = schema.label.unwrap_or_else(|| schema.id.clone());
        let mut multi = MultiGroup::new(&schema.id, &label);
        for item in schema.items {
            multi.add_child(Node::from_schema(item)?)?;
        }
        multi.set_rules(schema.trigger)?;
        Ok(multi)
    }
}

impl Node {
    /// Reconstructs a tree from a schema document node.
    pub fn from_schema(schema: NodeSchema) -> Result<Node> {
        Ok(match schema {
            NodeSchema::Leaf(leaf) => Node::Field(Field::from_schema(leaf)?),
            NodeSchema::Group(group) => Node::Group(Group::from_schema(group)?),
            NodeSchema::RepeatableGroup(group) => Node::Multi(MultiGroup::from_schema(group)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leaf_schema_parses_with_field_key() {
        let doc = json!({
            "type": "Leaf",
            "id": "port",
            "field": "number",
            "required": true,
            "default": 51413
        });
        let schema: NodeSchema = serde_json::from_value(doc).unwrap();
        let node = Node::from_schema(schema).unwrap();
        let Node::Field(field) = node else {
            panic!("expected a leaf");
        };
        assert_eq!(field.field_type(), FieldType::Number);
        assert_eq!(field.values(false), json!(51413));
    }

    #[test]
    fn group_schema_round_trips() {
        let doc = json!({
            "type": "Group",
            "id": "transmission",
            "label": "Transmission",
            "items": [
                {"type": "Leaf", "id": "server", "field": "text", "required": true},
                {"type": "Leaf", "id": "port", "field": "number", "default": 51413},
                {"type": "RepeatableGroup", "id": "tracker", "items": [
                    {"type": "Leaf", "id": "id", "field": "text",
                     "choices": {"t411": "T411", "kickass": "KickAss"},
                     "required": true,
                     "trigger": {"kickass": "NoLogin", "null": "NoLogin"}}
                ]}
            ],
            "trigger": [
                {"src_id": "server", "src_status": "Off", "dst_id": "port", "dst_status": "disabled"}
            ]
        });
        let schema: NodeSchema = serde_json::from_value(doc).unwrap();
        // The emitted schema fills in derived labels/placeholders, so the
        // canonical form is the fixed point.
        let canonical = Node::from_schema(schema).unwrap().to_schema();
        let rebuilt = Node::from_schema(canonical.clone()).unwrap();
        assert_eq!(rebuilt.to_schema(), canonical);
    }

    #[test]
    fn bad_declaration_in_schema_is_rejected() {
        let doc = json!({
            "type": "Leaf",
            "id": "secret",
            "field": "password",
            "choices": {"a": "A"}
        });
        let schema: NodeSchema = serde_json::from_value(doc).unwrap();
        assert!(Node::from_schema(schema).is_err());
    }
}
