use thiserror::Error;

use super::node::NodeId;
use super::token::Operator;

/// Why a condition was rejected before traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rule text could not be scanned: {message}")]
    ErrorToken { message: String },

    #[error("unbalanced brackets")]
    UnbalancedGroups,

    #[error("empty brackets at token {position}")]
    EmptyGroup { position: usize },

    #[error("unexpected token at {position}: expected {expected}")]
    UnexpectedToken {
        position: usize,
        expected: &'static str,
    },

    #[error("operator at token {position} is missing an operand")]
    DanglingOperator { position: usize },

    #[error("form field '{name}' must be written as '<extension>.<subfield>'")]
    MalformedFormField { name: String },

    #[error("form field '{name}' refers to unknown document type '{extension}'")]
    UnknownExtension { name: String, extension: String },

    #[error("operator '{op}' cannot be used with field '{field}'")]
    IllegalOperator { field: String, op: Operator },

    #[error("version '{value}' does not name a known commit")]
    UnresolvedCommit { value: String },
}

/// Failures surfaced by report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("malformed rule #{index} in report '{report}': {source}")]
    MalformedRule {
        report: String,
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("node {0} does not belong to this project")]
    UnknownNode(NodeId),
}

/// Failures while building a project tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} does not belong to this project")]
    UnknownNode(NodeId),

    #[error("cannot add '{child}' under '{parent}': not a folder")]
    NotAContainer { parent: String, child: String },
}
