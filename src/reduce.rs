//! Reduction of flat token sequences to a single boolean.
//!
//! Each pass scans left to right, unwrapping `( v )` and folding `a OP b`
//! into a literal. Operators have no precedence. Adjacent pairs fold within
//! one pass, so `a OR b AND c` reads as `(a OR b) AND c` while a four-operand
//! chain folds as `(a OP b) OP (c OP d)`. A pass that does not shrink the
//! sequence means the expression is malformed, and the result is `false`.

use crate::{Field, LogicalOp, Operator, Token, Value};

/// Compact, `Copy` view of a token used during reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Bool(bool),
    Op(LogicalOp),
    Open,
    Close,
    /// An unevaluated comparison or an error token. Never reducible.
    Opaque,
}

impl Term {
    fn from_token(token: &Token) -> Self {
        match token {
            Token::Bool(v) => Term::Bool(*v),
            Token::Logical(op) => Term::Op(*op),
            Token::GroupOpen => Term::Open,
            Token::GroupClose => Term::Close,
            Token::Comparison { .. } | Token::Error(_) => Term::Opaque,
        }
    }
}

/// Reduce a token sequence whose comparisons have already been replaced by
/// [`Token::Bool`] literals.
///
/// Never panics and never loops: malformed input, leftover comparisons and
/// the empty sequence all yield `false`.
#[must_use]
pub fn reduce(tokens: &[Token]) -> bool {
    reduce_terms(tokens.iter().map(Term::from_token).collect())
}

/// Reduce a token sequence, resolving each comparison through `compare`.
pub(crate) fn reduce_with<F>(tokens: &[Token], mut compare: F) -> bool
where
    F: FnMut(&Field, Operator, &Value) -> bool,
{
    let terms = tokens
        .iter()
        .map(|token| match token {
            Token::Comparison { field, op, value } => Term::Bool(compare(field, *op, value)),
            other => Term::from_token(other),
        })
        .collect();
    reduce_terms(terms)
}

fn reduce_terms(mut current: Vec<Term>) -> bool {
    if current.is_empty() {
        return false;
    }

    while current.len() > 1 {
        let next = reduce_pass(&current);
        if next.len() >= current.len() {
            tracing::debug!(remaining = current.len(), "condition reduction stalled");
            return false;
        }
        current = next;
    }

    matches!(current.as_slice(), [Term::Bool(true)])
}

fn reduce_pass(terms: &[Term]) -> Vec<Term> {
    let mut next = Vec::with_capacity(terms.len());
    let mut rest = terms;
    while !rest.is_empty() {
        match rest {
            [Term::Open, Term::Bool(v), Term::Close, tail @ ..] => {
                next.push(Term::Bool(*v));
                rest = tail;
            }
            [Term::Bool(a), Term::Op(op), Term::Bool(b), tail @ ..] => {
                next.push(Term::Bool(op.apply(*a, *b)));
                rest = tail;
            }
            [term, tail @ ..] => {
                next.push(*term);
                rest = tail;
            }
            [] => break,
        }
    }
    next
}
