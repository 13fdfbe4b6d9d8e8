//! The interactive editing session.
//!
//! Walks the tree in declaration order, skipping children whose computed
//! status is `disabled`, and resolves every visited field through the
//! prompt contract: a blank answer resets to the default, an invalid
//! answer re-asks with a warning. An interrupt from the prompter aborts
//! the whole session; a field's value only changes once an answer has
//! validated, so an abort never leaves a half-updated field.

use ct_common::{Error, Result};
use serde_json::{json, Value as Json};
use tracing::debug;

use crate::field::{Field, FieldType, Scalar};
use crate::group::{Group, Node};
use crate::multi::MultiGroup;
use crate::prompt::Prompter;
use crate::trigger::DISABLED;

/// Runs the editing contract for any node.
pub fn edit_node(node: &mut Node, prompter: &mut dyn Prompter) -> Result<()> {
    match node {
        Node::Field(field) => edit_field(field, prompter),
        Node::Group(group) => edit_group(group, prompter),
        Node::Multi(multi) => edit_multi(multi, prompter),
    }
}

/// Asks for the field until the answer is blank (reset to default) or
/// validates with `empty_allowed = !required`.
pub fn edit_field(field: &mut Field, prompter: &mut dyn Prompter) -> Result<()> {
    loop {
        let answer: Option<Json> = match field.field_type() {
            FieldType::Boolean => {
                let default = match field.default_value() {
                    Some(Scalar::Bool(b)) => Some(*b),
                    _ => None,
                };
                Some(json!(prompter.ask_yes_no(field.placeholder(), default)?))
            }
            _ if !field.choices().is_empty() => {
                let default = field.default_value().map(Scalar::key);
                let picked = prompter.ask_choice(
                    field.placeholder(),
                    field.choices(),
                    default.as_deref(),
                    false,
                )?;
                picked.into_iter().next().map(|key| json!(key))
            }
            _ => {
                let default = field.default_value().map(Scalar::key);
                let mask = field.field_type() == FieldType::Password;
                let text = prompter.ask_text(field.placeholder(), default.as_deref(), mask)?;
                (!text.is_empty()).then(|| json!(text))
            }
        };
        match answer {
            None => {
                field.reset_value();
                return Ok(());
            }
            Some(raw) => {
                if field.validate(&raw, !field.required()) {
                    field.set_json(&raw)?;
                    return Ok(());
                }
                prompter.warn("Incorrect answer");
            }
        }
    }
}

/// Edits every child of the group in order, skipping disabled ones.
pub fn edit_group(group: &mut Group, prompter: &mut dyn Prompter) -> Result<()> {
    if group.children().is_empty() {
        return Err(Error::EmptyGroup {
            id: group.id().to_string(),
        });
    }
    let ids: Vec<String> = group.children().iter().map(|c| c.id().to_string()).collect();
    for id in ids {
        if group.status_of(&id) == DISABLED {
            debug!(group = %group.id(), child = %id, "skipping disabled child");
            continue;
        }
        if let Some(child) = group.child_mut(&id) {
            edit_node(child, prompter)?;
        }
    }
    Ok(())
}

/// Collects records for a repeatable group: clone the prototype, edit the
/// record, keep it unless the user left it entirely empty, then offer
/// another round.
pub fn edit_multi(multi: &mut MultiGroup, prompter: &mut dyn Prompter) -> Result<()> {
    if multi.prototype().children().is_empty() {
        return Err(Error::EmptyGroup {
            id: multi.id().to_string(),
        });
    }
    loop {
        let mut record = multi.fresh_record();
        edit_group(&mut record, prompter)?;
        if record.is_empty() {
            break;
        }
        let question = format!("Another {}?", multi.label());
        multi.push_record(record);
        if !prompter.ask_yes_no(&question, Some(false))? {
            break;
        }
    }
    debug!(group = %multi.id(), records = multi.records().len(), "records collected");
    Ok(())
}
