//! Leaf configuration fields: typed value holders with validation,
//! conversion, defaults, and per-field trigger rules.
//!
//! A [`Field`] is declared once through [`FieldBuilder`] (or a schema
//! document) and then mutated only through [`Field::set_json`] /
//! [`Field::reset_value`]. All declaration-time contradictions are raised
//! at `build()`, never deferred.

use std::sync::OnceLock;

use ct_common::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

use crate::prompt::MASK;
use crate::trigger::TriggerMap;

/// The closed set of leaf field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Password,
    File,
    Number,
    Email,
    Boolean,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Password => write!(f, "password"),
            FieldType::File => write!(f, "file"),
            FieldType::Number => write!(f, "number"),
            FieldType::Email => write!(f, "email"),
            FieldType::Boolean => write!(f, "boolean"),
        }
    }
}

/// A canonicalized stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Text(String),
    Number(i64),
    Bool(bool),
}

impl Scalar {
    /// Canonical string form, used as the trigger lookup key and for
    /// choice membership.
    pub fn key(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(true) => "true".to_string(),
            Scalar::Bool(false) => "false".to_string(),
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Scalar::Text(s) => Json::String(s.clone()),
            Scalar::Number(n) => Json::from(*n),
            Scalar::Bool(b) => Json::Bool(*b),
        }
    }
}

/// A field's stored value: a single scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(Scalar),
    Many(Vec<Scalar>),
}

impl FieldValue {
    /// Trigger lookup key. A list has no exact key; its serialized form
    /// lets it fall through to the wildcard like any other present value.
    pub fn key(&self) -> String {
        match self {
            FieldValue::Single(s) => s.key(),
            FieldValue::Many(items) => {
                Json::Array(items.iter().map(Scalar::to_json).collect()).to_string()
            }
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            FieldValue::Single(s) => s.to_json(),
            FieldValue::Many(items) => Json::Array(items.iter().map(Scalar::to_json).collect()),
        }
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("email pattern is valid"))
}

/// A typed configuration leaf.
#[derive(Debug, Clone)]
pub struct Field {
    id: String,
    field_type: FieldType,
    label: String,
    placeholder: String,
    required: bool,
    choices: IndexMap<String, String>,
    default: Option<Scalar>,
    value: Option<FieldValue>,
    trigger: TriggerMap,
}

impl Field {
    /// Starts a declaration for a field with the given id and type.
    pub fn builder(id: &str, field_type: FieldType) -> FieldBuilder {
        FieldBuilder {
            id: id.to_string(),
            field_type,
            label: None,
            placeholder: None,
            required: false,
            choices: IndexMap::new(),
            default: None,
            value: None,
            trigger: TriggerMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn choices(&self) -> &IndexMap<String, String> {
        &self.choices
    }

    pub fn default_value(&self) -> Option<&Scalar> {
        self.default.as_ref()
    }

    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }

    pub fn trigger(&self) -> &TriggerMap {
        &self.trigger
    }

    /// Validates a raw document value against this field's declaration.
    /// Lists validate element-wise.
    pub fn validate(&self, value: &Json, empty_allowed: bool) -> bool {
        match value {
            Json::Array(items) => items.iter().all(|it| self.validate_single(it, empty_allowed)),
            other => self.validate_single(other, empty_allowed),
        }
    }

    /// Validates one raw scalar: type representability, emptiness unless
    /// `empty_allowed`, and choice membership when choices are declared.
    pub fn validate_single(&self, value: &Json, empty_allowed: bool) -> bool {
        let typed_ok = match self.field_type {
            FieldType::Text | FieldType::Password | FieldType::File => match value.as_str() {
                Some(s) => empty_allowed || !s.is_empty(),
                None => false,
            },
            FieldType::Number => match as_count(value) {
                Some(n) => empty_allowed || n != 0,
                None => false,
            },
            FieldType::Email => match value.as_str() {
                // An allowed-empty email skips both the pattern and the
                // choice check.
                Some(s) if s.is_empty() => return empty_allowed,
                Some(s) => email_pattern().is_match(s),
                None => false,
            },
            FieldType::Boolean => value.is_boolean(),
        };
        if !typed_ok {
            return false;
        }
        if self.choices.is_empty() {
            return true;
        }
        match self.canonical_key(value) {
            Some(key) => self.choices.contains_key(&key),
            None => false,
        }
    }

    /// Canonicalizes a validated raw value to its stored representation.
    /// `null` converts to `None`; lists convert element-wise, dropping
    /// `null` elements.
    pub fn convert(&self, value: &Json) -> Option<FieldValue> {
        match value {
            Json::Null => None,
            Json::Array(items) => Some(FieldValue::Many(
                items
                    .iter()
                    .filter(|it| !it.is_null())
                    .map(|it| self.convert_single(it))
                    .collect(),
            )),
            other => Some(FieldValue::Single(self.convert_single(other))),
        }
    }

    fn convert_single(&self, value: &Json) -> Scalar {
        match self.field_type {
            FieldType::Text | FieldType::Password | FieldType::File | FieldType::Email => {
                Scalar::Text(match value.as_str() {
                    Some(s) => s.to_string(),
                    None => value.to_string(),
                })
            }
            FieldType::Number => Scalar::Number(as_count(value).unwrap_or(0)),
            FieldType::Boolean => Scalar::Bool(value.as_bool().unwrap_or(false)),
        }
    }

    fn canonical_key(&self, value: &Json) -> Option<String> {
        match self.field_type {
            FieldType::Text | FieldType::Password | FieldType::File | FieldType::Email => {
                value.as_str().map(str::to_string)
            }
            FieldType::Number => as_count(value).map(|n| n.to_string()),
            FieldType::Boolean => value.as_bool().map(|b| Scalar::Bool(b).key()),
        }
    }

    /// Sets the value from a raw document scalar or list. `null` clears.
    pub fn set_json(&mut self, value: &Json) -> Result<()> {
        if value.is_null() {
            self.value = None;
            return Ok(());
        }
        if !self.validate(value, true) {
            return Err(Error::InvalidValue {
                field: self.id.clone(),
                message: format!("{value} not valid for {}", self.field_type),
            });
        }
        self.value = self.convert(value);
        debug!(field = %self.id, "value set");
        Ok(())
    }

    /// Restores the value to the declared default.
    ///
    /// No validation: the default was validated at construction.
    pub fn reset_value(&mut self) {
        self.value = self.default.clone().map(FieldValue::Single);
    }

    /// Computes the current status from the field's trigger rules.
    pub fn status(&self) -> String {
        match &self.value {
            None => self.trigger.lookup(None).to_string(),
            Some(v) => self.trigger.lookup(Some(&v.key())).to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Value projection. A password value renders as the mask token when
    /// `hide_password` is set; masking is display-only and one-way.
    pub fn values(&self, hide_password: bool) -> Json {
        match &self.value {
            None => Json::Null,
            Some(v) if hide_password && self.field_type == FieldType::Password => match v {
                FieldValue::Single(_) => Json::String(MASK.to_string()),
                FieldValue::Many(items) => {
                    Json::Array(items.iter().map(|_| Json::String(MASK.to_string())).collect())
                }
            },
            Some(v) => v.to_json(),
        }
    }

    /// Whether a trigger or choice key string denotes a valid value for
    /// this field.
    fn key_is_valid(&self, key: &str, empty_allowed: bool) -> bool {
        match self.key_to_json(key) {
            Some(json) => self.validate_single(&json, empty_allowed),
            None => false,
        }
    }

    fn key_to_json(&self, key: &str) -> Option<Json> {
        match self.field_type {
            FieldType::Boolean => match key {
                "true" => Some(Json::Bool(true)),
                "false" => Some(Json::Bool(false)),
                _ => None,
            },
            _ => Some(Json::String(key.to_string())),
        }
    }
}

fn as_count(value: &Json) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return (n >= 0).then_some(n);
    }
    let s = value.as_str()?;
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

/// Declaration-time builder for [`Field`].
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    id: String,
    field_type: FieldType,
    label: Option<String>,
    placeholder: Option<String>,
    required: bool,
    choices: IndexMap<String, String>,
    default: Option<Json>,
    value: Option<Json>,
    trigger: TriggerMap,
}

impl FieldBuilder {
    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Adds one choice (raw value → display label). Declaration order is
    /// preserved.
    pub fn choice(mut self, key: &str, label: &str) -> Self {
        self.choices.insert(key.to_string(), label.to_string());
        self
    }

    pub fn choices(mut self, choices: IndexMap<String, String>) -> Self {
        self.choices = choices;
        self
    }

    pub fn default_value(mut self, default: impl Into<Json>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn value(mut self, value: impl Into<Json>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Adds one trigger rule; `*` and `null` are the reserved wildcard
    /// and absent keys.
    pub fn trigger(mut self, key: &str, status: &str) -> Self {
        self.trigger = self.trigger.rule(key, status);
        self
    }

    pub fn trigger_map(mut self, trigger: TriggerMap) -> Self {
        self.trigger = trigger;
        self
    }

    /// Runs all declaration checks and produces the field.
    pub fn build(self) -> Result<Field> {
        let label = self.label.unwrap_or_else(|| self.id.clone());
        let placeholder = self
            .placeholder
            .unwrap_or_else(|| format!("Enter {label} here"));

        let mut field = Field {
            id: self.id,
            field_type: self.field_type,
            label,
            placeholder,
            required: self.required,
            choices: IndexMap::new(),
            default: None,
            value: None,
            trigger: TriggerMap::new(),
        };

        if !self.choices.is_empty() {
            if field.field_type == FieldType::Password {
                return Err(Error::IncompatibleDeclaration {
                    id: field.id,
                    message: "password not compatible with choices".to_string(),
                });
            }
            for key in self.choices.keys() {
                if !field.key_is_valid(key, !field.required) {
                    return Err(Error::IncompatibleDeclaration {
                        id: field.id,
                        message: format!("choice {key} not valid for {}", field.field_type),
                    });
                }
            }
            field.choices = self.choices;
        }

        for (key, _) in self.trigger.exact_rules() {
            if !field.key_is_valid(key, true) {
                return Err(Error::IncompatibleDeclaration {
                    id: field.id,
                    message: format!("trigger key {key} not valid for {}", field.field_type),
                });
            }
        }
        field.trigger = self.trigger;

        if let Some(default) = self.default {
            if !field.required && !field.choices.is_empty() {
                return Err(Error::IncompatibleDeclaration {
                    id: field.id,
                    message: "default value for optional choices not compatible".to_string(),
                });
            }
            if !field.validate_single(&default, true) {
                return Err(Error::IncompatibleDeclaration {
                    id: field.id,
                    message: format!("default {default} not valid for {}", field.field_type),
                });
            }
            field.default = Some(field.convert_single(&default));
        }

        field.reset_value();
        if let Some(value) = self.value {
            field.set_json(&value)?;
        }
        Ok(field)
    }
}
