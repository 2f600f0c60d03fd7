//! Field evaluators: pure functions from resolved node attributes, an operator
//! and a value to a boolean. Each context dispatcher resolves the attributes
//! its nodes have and calls into these.

mod form;
mod path;
mod search;
mod version;

pub(crate) use form::form_field;
pub(crate) use path::{PathScope, container_in_scope, folder_in_scope};
pub(crate) use search::search;
pub(crate) use version::version;

use crate::{Operator, Value};

/// Compare a resource extension with `value`. No resource never matches.
pub(crate) fn extension(extension: Option<&str>, op: Operator, value: &Value) -> bool {
    extension.is_some_and(|ext| op.test_equality(ext == value.literal()))
}

/// Compare the enabled state with the boolean reading of `value`.
pub(crate) fn enabled(enabled: bool, op: Operator, value: &Value) -> bool {
    op.test_equality(enabled == value.as_bool())
}
