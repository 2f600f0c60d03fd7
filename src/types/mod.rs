mod error;
mod field;
mod form;
mod node;
mod outcome;
mod rule;
mod token;
mod value;

pub use error::{ReportError, TreeError, ValidationError};
pub use field::{Field, FieldKind};
pub use form::{Choice, FormFieldValue, FormValues, MultiCheck};
pub use node::{Node, NodeId, NodeKind};
pub use outcome::ReportOutcome;
pub use rule::{RawRule, ReportEntry, Rule};
pub use token::{Condition, LogicalOp, Operator, Token, and, close, open, or};
pub use value::{CommitRef, Value};
