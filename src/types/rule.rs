use super::token::Condition;

/// A rule as loaded from a report definition, before rewriting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRule {
    pub condition: Condition,
    /// Document extension whose form fields the condition's plain field names address.
    pub extension_scope: Option<String>,
    /// Folder the rule is restricted to; falls back to the owning entry's bounds.
    pub bounds: Option<String>,
}

/// A report rule.
///
/// Rewriting ([`Rule::rewrite`]) moves a rule from `Raw` to `Rewritten`
/// exactly once; the rewritten condition is self-contained and rewriting it
/// again returns it unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Raw(RawRule),
    Rewritten(Condition),
}

impl Rule {
    #[must_use]
    pub fn new(condition: impl Into<Condition>) -> Self {
        Rule::Raw(RawRule {
            condition: condition.into(),
            ..RawRule::default()
        })
    }

    /// Scope plain field names to the form of `extension` documents.
    /// Has no effect on an already rewritten rule.
    #[must_use]
    pub fn with_extension_scope(mut self, extension: &str) -> Self {
        if let Rule::Raw(raw) = &mut self {
            raw.extension_scope = Some(extension.to_owned());
        }
        self
    }

    /// Restrict the rule to a folder. Has no effect on an already rewritten rule.
    #[must_use]
    pub fn with_bounds(mut self, path: &str) -> Self {
        if let Rule::Raw(raw) = &mut self {
            raw.bounds = Some(path.to_owned());
        }
        self
    }

    /// The current condition: the raw one before rewriting, the rewritten one after.
    #[must_use]
    pub fn condition(&self) -> &Condition {
        match self {
            Rule::Raw(raw) => &raw.condition,
            Rule::Rewritten(condition) => condition,
        }
    }

    #[must_use]
    pub fn is_rewritten(&self) -> bool {
        matches!(self, Rule::Rewritten(_))
    }
}

impl From<Condition> for Rule {
    fn from(condition: Condition) -> Self {
        Rule::new(condition)
    }
}

/// An ordered group of rules defining one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportEntry {
    pub(crate) name: String,
    pub(crate) bounds: Option<String>,
    pub(crate) rules: Vec<Rule>,
}

impl ReportEntry {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Bounds applied to every rule that has none of its own.
    #[must_use]
    pub fn with_bounds(mut self, path: &str) -> Self {
        self.bounds = Some(path.to_owned());
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: impl Into<Rule>) -> Self {
        self.rules.push(rule.into());
        self
    }

    pub fn push(&mut self, rule: impl Into<Rule>) {
        self.rules.push(rule.into());
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn bounds(&self) -> Option<&str> {
        self.bounds.as_deref()
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[cfg(feature = "binary-cache")]
impl ReportEntry {
    /// Serialize this entry, raw or rewritten, to the binary cache format.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and embedded in the
    /// payload metadata; see [`is_fresh`](crate::serial::is_fresh).
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding fails.
    pub fn to_bytes(
        &self,
        source_text: Option<&str>,
    ) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self, source_text)
    }

    /// Deserialize an entry previously produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes)
    }

    /// Serialize this entry and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the entry it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
