//! Trigger rules: immutable value → status lookup tables.
//!
//! A leaf field carries a [`TriggerMap`] mapping its current value to a
//! status label. Groups carry [`CrossRule`]s that propagate a status from
//! one child (or the group itself) to another. Status is never stored;
//! callers compute it on demand.
//!
//! Lookup order for a present value: exact match, then the `*` wildcard,
//! then the empty status. The absent value is a distinct lookup key: it
//! matches only an explicit absent rule and never the wildcard.

use ct_common::{Error, Result};
use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;

/// Status label that suppresses a field or group during an editing pass
/// and counts as "no value present" for group emptiness.
pub const DISABLED: &str = "disabled";

/// Cross-rule endpoint naming the enclosing group itself.
pub const SELF_ID: &str = "self";

/// Reserved trigger key matching any present value with no exact rule.
pub const WILDCARD_KEY: &str = "*";

/// Reserved trigger key for the absent value. A JSON object cannot carry
/// a null key, so the absent rule travels under this string in schema
/// documents.
pub const ABSENT_KEY: &str = "null";

/// An immutable mapping from a field's value to a status label.
///
/// Built once at declaration time and never mutated afterwards. Exact
/// rules keep their declaration order so the schema projection round-trips
/// byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerMap {
    rules: IndexMap<String, String>,
    wildcard: Option<String>,
    absent: Option<String>,
}

impl TriggerMap {
    /// An empty map: every lookup yields the empty status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for an exact value (consuming builder style).
    ///
    /// The reserved keys `*` and `null` route to the wildcard and absent
    /// slots, matching their meaning in schema documents.
    pub fn rule(mut self, value: &str, status: &str) -> Self {
        self.insert_key(value, status.to_string());
        self
    }

    /// Sets the status for the absent value.
    pub fn on_absent(mut self, status: &str) -> Self {
        self.absent = Some(status.to_string());
        self
    }

    /// Sets the wildcard status for any present value not listed exactly.
    pub fn otherwise(mut self, status: &str) -> Self {
        self.wildcard = Some(status.to_string());
        self
    }

    fn insert_key(&mut self, key: &str, status: String) {
        match key {
            WILDCARD_KEY => self.wildcard = Some(status),
            ABSENT_KEY => self.absent = Some(status),
            _ => {
                self.rules.insert(key.to_string(), status);
            }
        }
    }

    /// Builds a map from a JSON object of value → status.
    ///
    /// `owner` names the declaring field for error reporting. Fails if the
    /// document is not an object or any status is not a string.
    pub fn from_json(owner: &str, value: &Json) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::IncompatibleDeclaration {
                id: owner.to_string(),
                message: format!("trigger must be an object, got {value}"),
            })?;
        let mut map = TriggerMap::new();
        for (key, status) in obj {
            let status = status
                .as_str()
                .ok_or_else(|| Error::IncompatibleDeclaration {
                    id: owner.to_string(),
                    message: format!("trigger status for {key} must be a string, got {status}"),
                })?;
            map.insert_key(key, status.to_string());
        }
        Ok(map)
    }

    /// True when no rule is declared at all.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.wildcard.is_none() && self.absent.is_none()
    }

    /// Looks up the status for a value; `None` is the absent value.
    ///
    /// Returns the empty string when nothing matches.
    pub fn lookup(&self, value: Option<&str>) -> &str {
        match value {
            None => self.absent.as_deref().unwrap_or(""),
            Some(key) => self
                .rules
                .get(key)
                .or(self.wildcard.as_ref())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    /// Exact-value rules in declaration order (wildcard and absent excluded).
    pub fn exact_rules(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for TriggerMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let extra = usize::from(self.absent.is_some()) + usize::from(self.wildcard.is_some());
        let mut map = serializer.serialize_map(Some(self.rules.len() + extra))?;
        for (key, status) in &self.rules {
            map.serialize_entry(key, status)?;
        }
        if let Some(status) = &self.absent {
            map.serialize_entry(ABSENT_KEY, status)?;
        }
        if let Some(status) = &self.wildcard {
            map.serialize_entry(WILDCARD_KEY, status)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TriggerMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TriggerVisitor;

        impl<'de> Visitor<'de> for TriggerVisitor {
            type Value = TriggerMap;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of value to status string")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<TriggerMap, A::Error> {
                let mut map = TriggerMap::new();
                while let Some((key, status)) = access.next_entry::<String, String>()? {
                    map.insert_key(&key, status);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(TriggerVisitor)
    }
}

/// A group-level status propagation rule.
///
/// When the source endpoint (`self` or a direct child id) currently has
/// `src_status`, the destination endpoint is assigned `dst_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRule {
    pub src_id: String,
    pub src_status: String,
    pub dst_id: String,
    pub dst_status: String,
}

impl CrossRule {
    pub fn new(src_id: &str, src_status: &str, dst_id: &str, dst_status: &str) -> Self {
        CrossRule {
            src_id: src_id.to_string(),
            src_status: src_status.to_string(),
            dst_id: dst_id.to_string(),
            dst_status: dst_status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exact_match_beats_wildcard() {
        let map = TriggerMap::new().rule("a", "X").otherwise("Y");
        assert_eq!(map.lookup(Some("a")), "X");
        assert_eq!(map.lookup(Some("b")), "Y");
    }

    #[test]
    fn wildcard_only_matches_everything_present() {
        let map = TriggerMap::new().otherwise("Y");
        assert_eq!(map.lookup(Some("a")), "Y");
        assert_eq!(map.lookup(Some("anything")), "Y");
    }

    #[test]
    fn no_match_is_empty_status() {
        let map = TriggerMap::new().rule("a", "X");
        assert_eq!(map.lookup(Some("b")), "");
        assert_eq!(TriggerMap::new().lookup(Some("a")), "");
    }

    #[test]
    fn absent_is_not_wildcard() {
        // The wildcard covers any *present* value; absence matches only an
        // explicit absent rule.
        let wildcard_only = TriggerMap::new().otherwise("Y");
        assert_eq!(wildcard_only.lookup(None), "");

        let with_absent = TriggerMap::new().otherwise("Y").on_absent("Z");
        assert_eq!(with_absent.lookup(None), "Z");
        assert_eq!(with_absent.lookup(Some("a")), "Y");
    }

    #[test]
    fn from_json_routes_reserved_keys() {
        let map = TriggerMap::from_json(
            "id",
            &json!({"kickass": "NoLogin", "null": "NoLogin", "*": "Known"}),
        )
        .unwrap();
        assert_eq!(map.lookup(Some("kickass")), "NoLogin");
        assert_eq!(map.lookup(None), "NoLogin");
        assert_eq!(map.lookup(Some("t411")), "Known");
    }

    #[test]
    fn from_json_rejects_non_string_status() {
        let err = TriggerMap::from_json("id", &json!({"a": 1})).unwrap_err();
        assert_eq!(err.code(), 20);
    }

    #[test]
    fn serde_round_trip_keeps_reserved_keys() {
        let map = TriggerMap::new()
            .rule("t411", "UserRequired")
            .on_absent("NoLogin")
            .otherwise("Known");
        let text = serde_json::to_string(&map).unwrap();
        let back: TriggerMap = serde_json::from_str(&text).unwrap();
        assert_eq!(back, map);
    }
}
