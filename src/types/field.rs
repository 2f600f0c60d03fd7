use std::fmt;

use super::token::{Operator, Token};
use super::value::Value;

/// The semantic category of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Extension,
    Path,
    Enabled,
    /// A sub-field of a document form, named `"<extension>.<subfield>"`.
    FormField,
    Text,
    CaseText,
    Word,
    CaseWord,
    Version,
}

impl FieldKind {
    /// Keyword used for the built-in field names.
    #[must_use]
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            FieldKind::Extension => Some("ext"),
            FieldKind::Path => Some("path"),
            FieldKind::Enabled => Some("enabled"),
            FieldKind::FormField => None,
            FieldKind::Text => Some("text"),
            FieldKind::CaseText => Some("case_text"),
            FieldKind::Word => Some("word"),
            FieldKind::CaseWord => Some("case_word"),
            FieldKind::Version => Some("version"),
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "ext" => Some(FieldKind::Extension),
            "path" => Some(FieldKind::Path),
            "enabled" => Some(FieldKind::Enabled),
            "text" => Some(FieldKind::Text),
            "case_text" => Some(FieldKind::CaseText),
            "word" => Some(FieldKind::Word),
            "case_word" => Some(FieldKind::CaseWord),
            "version" => Some(FieldKind::Version),
            _ => None,
        }
    }

    /// Text and word searches over rendered content.
    #[must_use]
    pub fn is_search(self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::CaseText | FieldKind::Word | FieldKind::CaseWord
        )
    }
}

/// A named, typed comparison target.
///
/// Built-in fields have fixed names (`ext`, `path`, `enabled`, ...). Form fields
/// are addressed as `"<extension>.<subfield>"`. The comparison methods produce
/// ready-to-use [`Token::Comparison`] values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    kind: FieldKind,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Resolve a field by name: built-in keywords first, anything else is a form field.
    #[must_use]
    pub fn named(name: &str) -> Self {
        let kind = FieldKind::from_keyword(name).unwrap_or(FieldKind::FormField);
        Self::new(name, kind)
    }

    fn builtin(kind: FieldKind) -> Self {
        Self::new(kind.keyword().unwrap_or_default(), kind)
    }

    #[must_use]
    pub fn extension() -> Self {
        Self::builtin(FieldKind::Extension)
    }

    #[must_use]
    pub fn path() -> Self {
        Self::builtin(FieldKind::Path)
    }

    #[must_use]
    pub fn enabled() -> Self {
        Self::builtin(FieldKind::Enabled)
    }

    #[must_use]
    pub fn text() -> Self {
        Self::builtin(FieldKind::Text)
    }

    #[must_use]
    pub fn case_text() -> Self {
        Self::builtin(FieldKind::CaseText)
    }

    #[must_use]
    pub fn word() -> Self {
        Self::builtin(FieldKind::Word)
    }

    #[must_use]
    pub fn case_word() -> Self {
        Self::builtin(FieldKind::CaseWord)
    }

    #[must_use]
    pub fn version() -> Self {
        Self::builtin(FieldKind::Version)
    }

    /// A form sub-field of documents with the given extension.
    #[must_use]
    pub fn form(extension: &str, subfield: &str) -> Self {
        Self::new(format!("{extension}.{subfield}"), FieldKind::FormField)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Split a form field name into `(extension, subfield)`.
    /// Returns `None` unless both halves are non-empty.
    #[must_use]
    pub fn form_parts(&self) -> Option<(&str, &str)> {
        let (extension, subfield) = self.name.split_once('.')?;
        if extension.is_empty() || subfield.is_empty() {
            return None;
        }
        Some((extension, subfield))
    }

    /// This field re-addressed as a sub-field of `extension` documents.
    #[must_use]
    pub(crate) fn scoped(&self, extension: &str) -> Self {
        Self::new(format!("{extension}.{}", self.name), FieldKind::FormField)
    }

    fn compare(self, op: Operator, value: impl Into<Value>) -> Token {
        Token::Comparison {
            field: self,
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Token {
        self.compare(Operator::Equal, value)
    }

    #[must_use]
    pub fn neq(self, value: impl Into<Value>) -> Token {
        self.compare(Operator::NotEqual, value)
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Token {
        self.compare(Operator::Less, value)
    }

    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Token {
        self.compare(Operator::LessEqual, value)
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Token {
        self.compare(Operator::More, value)
    }

    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Token {
        self.compare(Operator::MoreEqual, value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
