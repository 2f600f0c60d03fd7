use std::collections::BTreeSet;

use crate::history::{HistoryError, VersionHistory};
use crate::{CommitRef, Operator, Value};

/// Compare a resource path with the change history around the commit named
/// by `value`.
///
/// `Equal` asks whether the commit touched the path, `More` whether anything
/// after it did, `Less` whether anything before it did. History failures
/// are logged and read as false.
pub(crate) fn version(
    history: Option<&dyn VersionHistory>,
    path: Option<&str>,
    op: Operator,
    value: &Value,
) -> bool {
    let (Some(history), Some(commit), Some(path)) = (history, value.commit(), path) else {
        return false;
    };
    match changed(history, commit, path, op) {
        Ok(hit) => hit,
        Err(err) => {
            tracing::warn!(%err, commit = commit.id(), path, "version lookup failed");
            false
        }
    }
}

fn changed(
    history: &dyn VersionHistory,
    commit: &CommitRef,
    path: &str,
    op: Operator,
) -> Result<bool, HistoryError> {
    let touched = |set: BTreeSet<String>| set.contains(path);
    Ok(match op {
        Operator::Equal => touched(history.changed_by(commit)?),
        Operator::NotEqual => !touched(history.changed_by(commit)?),
        Operator::More => touched(history.changed_since(commit)?),
        Operator::Less => touched(history.changed_before(commit)?),
        Operator::MoreEqual => {
            touched(history.changed_by(commit)?) || touched(history.changed_since(commit)?)
        }
        Operator::LessEqual => {
            touched(history.changed_by(commit)?) || touched(history.changed_before(commit)?)
        }
    })
}
