use std::cmp::Ordering;
use std::fmt;
use std::slice;

use super::field::Field;
use super::value::Value;

/// Comparison operators supported in conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    More,
    MoreEqual,
}

impl Operator {
    /// `EQUAL` and `NOT_EQUAL` only.
    #[must_use]
    pub fn may_equal(self) -> bool {
        matches!(self, Operator::Equal | Operator::NotEqual)
    }

    /// Every operator may compare ordered values.
    #[must_use]
    pub fn may_compare(self) -> bool {
        true
    }

    /// Apply this operator to the ordering of the left operand relative to the right.
    #[must_use]
    pub fn test(self, ord: Ordering) -> bool {
        match self {
            Operator::Equal => ord == Ordering::Equal,
            Operator::NotEqual => ord != Ordering::Equal,
            Operator::Less => ord == Ordering::Less,
            Operator::LessEqual => ord != Ordering::Greater,
            Operator::More => ord == Ordering::Greater,
            Operator::MoreEqual => ord != Ordering::Less,
        }
    }

    /// Apply an equality-only operator to the outcome of an equality test.
    /// Ordering operators always yield `false`.
    #[must_use]
    pub fn test_equality(self, equal: bool) -> bool {
        match self {
            Operator::Equal => equal,
            Operator::NotEqual => !equal,
            _ => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Equal => write!(f, "=="),
            Operator::NotEqual => write!(f, "!="),
            Operator::Less => write!(f, "<"),
            Operator::LessEqual => write!(f, "<="),
            Operator::More => write!(f, ">"),
            Operator::MoreEqual => write!(f, ">="),
        }
    }
}

/// Boolean connective between two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    #[must_use]
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            LogicalOp::And => a && b,
            LogicalOp::Or => a || b,
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "AND"),
            LogicalOp::Or => write!(f, "OR"),
        }
    }
}

/// One element of a flat, explicitly bracketed boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Comparison {
        field: Field,
        op: Operator,
        value: Value,
    },
    Logical(LogicalOp),
    GroupOpen,
    GroupClose,
    Bool(bool),
    /// Emitted by the scanner for rule text it could not understand.
    Error(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Comparison { field, op, value } => write!(f, "{field} {op} \"{value}\""),
            Token::Logical(op) => write!(f, "{op}"),
            Token::GroupOpen => write!(f, "("),
            Token::GroupClose => write!(f, ")"),
            Token::Bool(v) => write!(f, "{v}"),
            Token::Error(message) => write!(f, "<error: {message}>"),
        }
    }
}

/// `AND` token.
#[must_use]
pub fn and() -> Token {
    Token::Logical(LogicalOp::And)
}

/// `OR` token.
#[must_use]
pub fn or() -> Token {
    Token::Logical(LogicalOp::Or)
}

/// Opening bracket token.
#[must_use]
pub fn open() -> Token {
    Token::GroupOpen
}

/// Closing bracket token.
#[must_use]
pub fn close() -> Token {
    Token::GroupClose
}

/// An ordered token sequence. The empty condition matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    tokens: Vec<Token>,
}

impl Condition {
    /// The empty, match-everything condition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Whether the scanner flagged any part of the rule text.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.tokens.iter().any(|t| matches!(t, Token::Error(_)))
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut Vec<Token> {
        &mut self.tokens
    }
}

impl From<Vec<Token>> for Condition {
    fn from(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

impl FromIterator<Token> for Condition {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Condition {
    type Item = &'a Token;
    type IntoIter = slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}
