//! One-time rewriting of raw report rules into self-contained conditions.

use std::mem;

use crate::{Condition, Field, RawRule, ReportEntry, Rule, Token, and, close, open};

impl Rule {
    /// Rewrite the rule in place and return its final condition.
    ///
    /// An extension scope turns every field name into a form field of that
    /// extension. Bounds (the rule's own, else `owning_bounds`) wrap the
    /// condition as `path == bounds AND ( ... )`; an empty condition becomes
    /// just `path == bounds`. A rule that is already rewritten is returned
    /// unchanged.
    pub fn rewrite(&mut self, owning_bounds: Option<&str>) -> &Condition {
        if let Rule::Raw(raw) = self {
            let condition = rewrite_raw(mem::take(raw), owning_bounds);
            *self = Rule::Rewritten(condition);
        }
        self.condition()
    }
}

fn rewrite_raw(raw: RawRule, owning_bounds: Option<&str>) -> Condition {
    let RawRule {
        mut condition,
        extension_scope,
        bounds,
    } = raw;

    if let Some(scope) = extension_scope.as_deref() {
        for token in condition.tokens_mut() {
            if let Token::Comparison { field, .. } = token {
                *field = field.scoped(scope);
            }
        }
    }

    let Some(bounds) = bounds.as_deref().or(owning_bounds) else {
        return condition;
    };
    let within = Field::path().eq(bounds);
    if condition.is_empty() {
        return Condition::from(vec![within]);
    }

    let mut tokens = Vec::with_capacity(condition.len() + 4);
    tokens.extend([within, and(), open()]);
    tokens.extend(condition.into_tokens());
    tokens.push(close());
    Condition::from(tokens)
}

impl ReportEntry {
    /// Rewrite every rule, using this entry's bounds for rules without their own.
    pub fn rewrite_all(&mut self) {
        let bounds = self.bounds.as_deref();
        for rule in &mut self.rules {
            rule.rewrite(bounds);
        }
    }
}
