use regex::RegexBuilder;

use crate::{FieldKind, Operator, Value};

/// Full-text and whole-word search.
///
/// `Equal` asks whether the needle is present, every other operator asks
/// whether it is absent. An empty needle is always present. A kind that is
/// not a search, or a word pattern that cannot be built, fails the
/// comparison whatever the operator.
pub(crate) fn search(haystack: &str, kind: FieldKind, op: Operator, value: &Value) -> bool {
    let needle = value.literal();
    let found = if needle.is_empty() {
        kind.is_search().then_some(true)
    } else {
        contains(haystack, needle, kind)
    };
    found.is_some_and(|found| (op == Operator::Equal) == found)
}

fn contains(haystack: &str, needle: &str, kind: FieldKind) -> Option<bool> {
    match kind {
        FieldKind::Text => Some(haystack.to_lowercase().contains(&needle.to_lowercase())),
        FieldKind::CaseText => Some(haystack.contains(needle)),
        FieldKind::Word => word(haystack, needle, false),
        FieldKind::CaseWord => word(haystack, needle, true),
        _ => None,
    }
}

fn word(haystack: &str, needle: &str, case_sensitive: bool) -> Option<bool> {
    let pattern = format!(r"(?:^|\W){}(?:\W|$)", regex::escape(needle));
    match RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(re) => Some(re.is_match(haystack)),
        Err(err) => {
            tracing::warn!(%err, len = needle.len(), "word pattern rejected");
            None
        }
    }
}
