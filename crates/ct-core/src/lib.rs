//! Conftree: a hierarchical configuration-schema engine.
//!
//! Models a tree of named, typed configuration fields and groups,
//! validates and stores values for them, and decides whether a field is
//! active or disabled through trigger rules. Repeatable groups clone a
//! prototype subtree into independent value records. The tree projects
//! two independent document channels: the *schema* (structure, defaults,
//! rules) and the *values* (current values, optionally masked).
//!
//! Interactive editing runs through the narrow [`prompt::Prompter`] seam;
//! the engine never touches the terminal itself.

pub mod field;
pub mod group;
pub mod logging;
pub mod multi;
pub mod prompt;
pub mod schema;
pub mod session;
pub mod store;
pub mod trigger;

pub use ct_common::{Error, ErrorCategory, Result};

pub use field::{Field, FieldBuilder, FieldType, FieldValue, Scalar};
pub use group::{Group, Node};
pub use multi::MultiGroup;
pub use prompt::{ConsolePrompter, Prompter, ScriptedPrompter, MASK};
pub use schema::{GroupSchema, LeafSchema, NodeSchema};
pub use session::{edit_field, edit_group, edit_multi, edit_node};
pub use trigger::{CrossRule, TriggerMap, DISABLED, SELF_ID};
