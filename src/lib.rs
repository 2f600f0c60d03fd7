//! Rule evaluation for document trees.
//!
//! Report rules are flat token sequences of field comparisons, logical
//! operators and brackets. A [`ReportRunner`] rewrites and validates the rules
//! of a [`ReportEntry`], walks a [`Project`] tree and collects the nodes each
//! rule matches, in report order.

mod config;
mod dispatch;
mod error;
mod evaluate;
mod history;
mod project;
mod reduce;
mod report;
mod rewrite;
#[cfg(feature = "binary-cache")]
pub mod serial;
mod types;
mod validate;

pub use config::{ConfigError, DEFAULT_MAX_TEXT_BYTES, EngineConfig};
pub use dispatch::{EvalContext, Evaluator, FsEvaluator};
pub use error::DocqueryError;
pub use history::{CachedHistory, CommitLog, HistoryError, VersionHistory};
pub use project::Project;
pub use reduce::reduce;
pub use report::{ReportRunner, run, run_configured};
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    Choice, CommitRef, Condition, Field, FieldKind, FormFieldValue, FormValues, LogicalOp,
    MultiCheck, Node, NodeId, NodeKind, Operator, RawRule, ReportEntry, ReportError, ReportOutcome,
    Rule, Token, TreeError, ValidationError, Value, and, close, open, or,
};
pub use validate::{DefaultValidator, ValidationContext, Validator};
