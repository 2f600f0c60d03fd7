use std::fmt;

/// An opaque, already-resolved version-control commit reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitRef(String);

impl CommitRef {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The right-hand side of a comparison.
///
/// Always a literal string; may parse to an integer, and may carry a commit
/// reference resolved by the scanner for `version` comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    literal: String,
    commit: Option<CommitRef>,
}

impl Value {
    #[must_use]
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            commit: None,
        }
    }

    /// Attach a resolved commit reference.
    #[must_use]
    pub fn with_commit(mut self, commit: CommitRef) -> Self {
        self.commit = Some(commit);
        self
    }

    #[must_use]
    pub fn literal(&self) -> &str {
        &self.literal
    }

    #[must_use]
    pub fn commit(&self) -> Option<&CommitRef> {
        self.commit.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literal.is_empty()
    }

    /// The literal parsed as a decimal integer, ignoring surrounding whitespace.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        self.literal.trim().parse().ok()
    }

    /// `true` iff the literal is `"true"`, ignoring case. Anything else is `false`.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        self.literal.trim().eq_ignore_ascii_case("true")
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::new(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::new(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::new(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::new(v.to_string())
    }
}

impl From<CommitRef> for Value {
    fn from(commit: CommitRef) -> Self {
        Value::new(commit.id()).with_commit(commit)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literal)
    }
}
