//! File IO for schema and value documents.
//!
//! Value files hold the projection under the root id, not the wrapper:
//! saving writes `values(hide_password = false)` verbatim (secrets are
//! persisted in clear form; the mask is display-only), loading re-wraps
//! the content as `{root_id: content}` before applying it.

use std::fs;
use std::path::Path;

use ct_common::Result;
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::group::Node;
use crate::schema::NodeSchema;

/// Reads a value document and applies it to the tree.
pub fn load_values_path(root: &mut Node, path: &Path) -> Result<()> {
    debug!(path = %path.display(), "loading value document");
    let text = fs::read_to_string(path)?;
    let content: Json = serde_json::from_str(&text)?;
    let mut wrapper = Map::new();
    wrapper.insert(root.id().to_string(), content);
    root.load_values(&Json::Object(wrapper))
}

/// Writes the tree's value projection, secrets unmasked.
pub fn save_values_path(root: &Node, path: &Path) -> Result<()> {
    debug!(path = %path.display(), "saving value document");
    let doc = root.values(false);
    fs::write(path, serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}

/// Reads and parses a schema document.
pub fn load_schema_path(path: &Path) -> Result<NodeSchema> {
    debug!(path = %path.display(), "loading schema document");
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Writes a schema document as pretty JSON.
pub fn save_schema_path(schema: &NodeSchema, path: &Path) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(schema)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldType};
    use crate::group::Group;
    use serde_json::json;

    fn demo_tree() -> Node {
        let mut conf = Group::new("conf", "Configuration");
        conf.add_child(Field::builder("server", FieldType::Text).build().unwrap())
            .unwrap();
        conf.add_child(Field::builder("secret", FieldType::Password).build().unwrap())
            .unwrap();
        Node::Group(conf)
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.json");

        let mut tree = demo_tree();
        tree.load_values(&json!({"conf": {"server": "x", "secret": "hunter2"}}))
            .unwrap();
        save_values_path(&tree, &path).unwrap();

        // Secrets are persisted in clear form.
        let raw: Json = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["secret"], json!("hunter2"));

        let mut fresh = demo_tree();
        load_values_path(&mut fresh, &path).unwrap();
        assert_eq!(fresh.values(false), tree.values(false));
    }

    #[test]
    fn schema_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");

        let schema = demo_tree().to_schema();
        save_schema_path(&schema, &path).unwrap();
        assert_eq!(load_schema_path(&path).unwrap(), schema);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_schema_path(Path::new("/nonexistent/schema.json")).unwrap_err();
        assert_eq!(err.category(), ct_common::ErrorCategory::Io);
    }
}
