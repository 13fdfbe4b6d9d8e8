//! Groups: ordered, named collections of fields and nested groups, with
//! group-scoped status propagation rules.
//!
//! The tree is a closed variant over three node kinds ([`Node`]); every
//! projection and the editing pass dispatch exhaustively on the tag.
//!
//! Status for a child is a chained fallback: the child's own non-empty
//! status wins, then the first cross rule whose source currently matches,
//! then the empty status.

use ct_common::{Error, Result};
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::field::Field;
use crate::multi::MultiGroup;
use crate::schema::NodeSchema;
use crate::trigger::{CrossRule, DISABLED, SELF_ID};

/// One node of the configuration tree.
#[derive(Debug, Clone)]
pub enum Node {
    Field(Field),
    Group(Group),
    Multi(MultiGroup),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Field(f) => f.id(),
            Node::Group(g) => g.id(),
            Node::Multi(m) => m.id(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Node::Field(f) => f.label(),
            Node::Group(g) => g.label(),
            Node::Multi(m) => m.label(),
        }
    }

    /// The node's own status: a field consults its trigger map, a group
    /// evaluates its self-referential cross rules.
    pub fn status(&self) -> String {
        match self {
            Node::Field(f) => f.status(),
            Node::Group(g) => g.status_self(),
            Node::Multi(m) => m.status_self(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Node::Field(f) => f.is_empty(),
            Node::Group(g) => g.is_empty(),
            Node::Multi(m) => m.is_empty(),
        }
    }

    pub fn reset_value(&mut self) {
        match self {
            Node::Field(f) => f.reset_value(),
            Node::Group(g) => g.reset_value(),
            Node::Multi(m) => m.reset_value(),
        }
    }

    /// Value projection of this node.
    pub fn values(&self, hide_password: bool) -> Json {
        match self {
            Node::Field(f) => f.values(hide_password),
            Node::Group(g) => g.values(hide_password),
            Node::Multi(m) => m.values(hide_password),
        }
    }

    /// Applies a value document keyed by this node's id. Only group-shaped
    /// nodes accept a document at the root.
    pub fn load_values(&mut self, doc: &Json) -> Result<()> {
        match self {
            Node::Group(g) => g.load_values(doc),
            Node::Multi(m) => m.load_values(doc),
            Node::Field(f) => Err(Error::InvalidValue {
                field: f.id().to_string(),
                message: "the root of a value document must be a group".to_string(),
            }),
        }
    }

    /// Schema projection of this node (values excluded).
    pub fn to_schema(&self) -> NodeSchema {
        match self {
            Node::Field(f) => NodeSchema::Leaf(f.to_schema()),
            Node::Group(g) => NodeSchema::Group(g.to_schema()),
            Node::Multi(m) => NodeSchema::RepeatableGroup(m.to_schema()),
        }
    }
}

impl From<Field> for Node {
    fn from(f: Field) -> Node {
        Node::Field(f)
    }
}

impl From<Group> for Node {
    fn from(g: Group) -> Node {
        Node::Group(g)
    }
}

impl From<MultiGroup> for Node {
    fn from(m: MultiGroup) -> Node {
        Node::Multi(m)
    }
}

/// An ordered, named collection of child nodes with sibling-unique ids.
#[derive(Debug, Clone)]
pub struct Group {
    id: String,
    label: String,
    items: Vec<Node>,
    rules: Vec<CrossRule>,
}

impl Group {
    pub fn new(id: &str, label: &str) -> Group {
        Group {
            id: id.to_string(),
            label: label.to_string(),
            items: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn children(&self) -> &[Node] {
        &self.items
    }

    pub fn rules(&self) -> &[CrossRule] {
        &self.rules
    }

    pub fn child(&self, id: &str) -> Option<&Node> {
        self.items.iter().find(|it| it.id() == id)
    }

    pub fn child_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.items.iter_mut().find(|it| it.id() == id)
    }

    /// Appends a child. The group takes ownership, so no external alias
    /// can mutate the stored node afterwards.
    pub fn add_child(&mut self, item: impl Into<Node>) -> Result<()> {
        let item = item.into();
        if self.child(item.id()).is_some() {
            return Err(Error::DuplicateId {
                id: item.id().to_string(),
                group: self.id.clone(),
            });
        }
        debug!(group = %self.id, child = %item.id(), "child added");
        self.items.push(item);
        Ok(())
    }

    /// Attaches the group's cross rules. Endpoints must be `self` or an
    /// already-declared child id.
    pub fn set_rules(&mut self, rules: Vec<CrossRule>) -> Result<()> {
        for rule in &rules {
            for endpoint in [&rule.src_id, &rule.dst_id] {
                if endpoint != SELF_ID && self.child(endpoint).is_none() {
                    return Err(Error::IncompatibleDeclaration {
                        id: self.id.clone(),
                        message: format!("trigger rule references unknown child {endpoint}"),
                    });
                }
            }
        }
        self.rules = rules;
        Ok(())
    }

    /// Status of the group itself: the first cross rule whose destination
    /// is `self` and whose (non-self) source currently matches.
    pub fn status_self(&self) -> String {
        for rule in &self.rules {
            if rule.src_id == SELF_ID || rule.dst_id != SELF_ID {
                continue;
            }
            if let Some(src) = self.child(&rule.src_id) {
                if src.status() == rule.src_status {
                    return rule.dst_status.clone();
                }
            }
        }
        String::new()
    }

    /// Status of a direct child: its own non-empty status, else the first
    /// matching cross rule targeting it, else empty.
    pub fn status_of(&self, child_id: &str) -> String {
        let Some(child) = self.child(child_id) else {
            return String::new();
        };
        let own = child.status();
        if !own.is_empty() {
            return own;
        }
        for rule in &self.rules {
            if rule.dst_id != child_id {
                continue;
            }
            let src_status = if rule.src_id == SELF_ID {
                self.status_self()
            } else {
                match self.child(&rule.src_id) {
                    Some(src) => src.status(),
                    None => continue,
                }
            };
            if src_status == rule.src_status {
                return rule.dst_status.clone();
            }
        }
        String::new()
    }

    /// Applies a value document of the form `{group_id: {child_id: ...}}`.
    ///
    /// Every key in the mapping must name a declared child; an unknown key
    /// fails the whole call.
    pub fn load_values(&mut self, doc: &Json) -> Result<()> {
        let obj = doc.as_object().ok_or_else(|| Error::InvalidValue {
            field: self.id.clone(),
            message: format!("value document must be an object, got {doc}"),
        })?;
        let inner = obj
            .get(&self.id)
            .ok_or_else(|| Error::MissingKey { id: self.id.clone() })?;
        self.apply_value(inner)
    }

    /// Applies the mapping for this group (the part under its id).
    pub(crate) fn apply_value(&mut self, value: &Json) -> Result<()> {
        let entries = value.as_object().ok_or_else(|| Error::InvalidValue {
            field: self.id.clone(),
            message: format!("{value} not valid for group {}", self.id),
        })?;
        debug!(group = %self.id, keys = entries.len(), "loading values");
        for (key, item) in entries {
            match self.child_mut(key) {
                Some(Node::Field(f)) => f.set_json(item)?,
                Some(Node::Group(g)) => g.apply_value(item)?,
                Some(Node::Multi(m)) => m.apply_value(item)?,
                None => {
                    return Err(Error::UnknownKey {
                        key: key.clone(),
                        group: self.id.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Value projection: child id → child projection, in declaration order.
    pub fn values(&self, hide_password: bool) -> Json {
        let mut out = Map::new();
        for item in &self.items {
            out.insert(item.id().to_string(), item.values(hide_password));
        }
        Json::Object(out)
    }

    /// Recursively restores every child to its default.
    pub fn reset_value(&mut self) {
        for item in &mut self.items {
            item.reset_value();
        }
    }

    /// True when every child is empty or currently disabled. Lets an
    /// editing session detect that an optional group was declined.
    pub fn is_empty(&self) -> bool {
        self.items
            .iter()
            .all(|it| it.is_empty() || self.status_of(it.id()) == DISABLED)
    }
}
