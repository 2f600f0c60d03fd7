use std::collections::BTreeSet;

use crate::{Condition, Field, FieldKind, Operator, Project, Token, ValidationError, Value};

/// What a validator knows about the project a condition will run against.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    schema: &'a BTreeSet<String>,
    history_bound: bool,
}

impl<'a> ValidationContext<'a> {
    #[must_use]
    pub fn new(schema: &'a BTreeSet<String>, history_bound: bool) -> Self {
        Self {
            schema,
            history_bound,
        }
    }

    #[must_use]
    pub fn for_project(project: &'a Project) -> Self {
        Self::new(project.schema(), project.history().is_some())
    }

    #[must_use]
    pub fn schema(&self) -> &'a BTreeSet<String> {
        self.schema
    }

    #[must_use]
    pub fn history_bound(&self) -> bool {
        self.history_bound
    }
}

/// Checks a rewritten condition before any node is evaluated.
pub trait Validator {
    /// # Errors
    ///
    /// Returns the first problem found in `condition`.
    fn validate(
        &self,
        condition: &Condition,
        context: &ValidationContext<'_>,
    ) -> Result<(), ValidationError>;
}

/// Structural and field-level checks every report rule must pass.
///
/// Rejects scanner error tokens, unbalanced or empty brackets, operands or
/// operators out of turn, malformed or unknown form fields, ordering
/// operators on equality-only fields and unresolved version commits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValidator;

impl Validator for DefaultValidator {
    fn validate(
        &self,
        condition: &Condition,
        context: &ValidationContext<'_>,
    ) -> Result<(), ValidationError> {
        if let Some(Token::Error(message)) = condition.iter().find(|t| matches!(t, Token::Error(_))) {
            return Err(ValidationError::ErrorToken {
                message: message.clone(),
            });
        }
        check_structure(condition.tokens())?;
        for token in condition {
            if let Token::Comparison { field, op, value } = token {
                check_comparison(field, *op, value, context)?;
            }
        }
        Ok(())
    }
}

fn check_structure(tokens: &[Token]) -> Result<(), ValidationError> {
    let mut expect_operand = true;
    let mut depth = 0usize;
    let mut previous: Option<&Token> = None;

    for (position, token) in tokens.iter().enumerate() {
        match token {
            Token::Comparison { .. } | Token::Bool(_) | Token::Error(_) => {
                if !expect_operand {
                    return Err(ValidationError::UnexpectedToken {
                        position,
                        expected: "an operator or ')'",
                    });
                }
                expect_operand = false;
            }
            Token::Logical(_) => {
                if expect_operand {
                    return Err(ValidationError::DanglingOperator { position });
                }
                expect_operand = true;
            }
            Token::GroupOpen => {
                if !expect_operand {
                    return Err(ValidationError::UnexpectedToken {
                        position,
                        expected: "an operator or ')'",
                    });
                }
                depth += 1;
            }
            Token::GroupClose => {
                if depth == 0 {
                    return Err(ValidationError::UnbalancedGroups);
                }
                if matches!(previous, Some(Token::GroupOpen)) {
                    return Err(ValidationError::EmptyGroup { position });
                }
                if expect_operand {
                    return Err(ValidationError::DanglingOperator {
                        position: position - 1,
                    });
                }
                depth -= 1;
            }
        }
        previous = Some(token);
    }

    if depth != 0 {
        return Err(ValidationError::UnbalancedGroups);
    }
    if expect_operand && !tokens.is_empty() {
        return Err(ValidationError::DanglingOperator {
            position: tokens.len() - 1,
        });
    }
    Ok(())
}

fn check_comparison(
    field: &Field,
    op: Operator,
    value: &Value,
    context: &ValidationContext<'_>,
) -> Result<(), ValidationError> {
    match field.kind() {
        FieldKind::FormField => {
            let (extension, _) =
                field
                    .form_parts()
                    .ok_or_else(|| ValidationError::MalformedFormField {
                        name: field.name().to_owned(),
                    })?;
            if !context.schema.is_empty() && !context.schema.contains(extension) {
                return Err(ValidationError::UnknownExtension {
                    name: field.name().to_owned(),
                    extension: extension.to_owned(),
                });
            }
        }
        FieldKind::Version => {
            if context.history_bound && value.commit().is_none() {
                return Err(ValidationError::UnresolvedCommit {
                    value: value.literal().to_owned(),
                });
            }
        }
        FieldKind::Extension
        | FieldKind::Path
        | FieldKind::Enabled
        | FieldKind::Text
        | FieldKind::CaseText
        | FieldKind::Word
        | FieldKind::CaseWord => {
            if !op.may_equal() {
                return Err(ValidationError::IllegalOperator {
                    field: field.name().to_owned(),
                    op,
                });
            }
        }
    }
    Ok(())
}
