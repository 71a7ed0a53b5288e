//! Load-time rule validation.
//!
//! The runtime degrades gracefully when live state is missing, but authored
//! data that can never work should not reach it. This pass cross-checks a
//! rule against the type and operation registries and rejects:
//!
//! - query value sources whose scope can resolve to more than one entity
//!   (the runtime would silently use the first, so the ambiguity is an
//!   authoring bug)
//! - references to unregistered actions or queries
//! - more arguments than an action has designer-editable parameters
//! - arguments whose declared type cannot convert to the parameter type
//! - comparison operators the check operand's type does not allow

use tracing::warn;

use rules_core::error::{ErrorSeverity, RuleError};
use rules_core::{
    ActionId, CompareOp, OpArity, OperationRegistry, QueryId, Rule, TypeKey, TypeRegistry,
    ValueSource,
};

/// One authoring defect found in a rule.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "rule `{rule}`: query `{query}` uses a multi-target scope; collapse it with use_first or use_first_link"
    )]
    MultiTargetQuery { rule: String, query: QueryId },

    #[error("rule `{rule}` references unregistered action `{action}`")]
    UnknownAction { rule: String, action: ActionId },

    #[error("rule `{rule}` references unregistered query `{query}`")]
    UnknownQuery { rule: String, query: QueryId },

    #[error(
        "rule `{rule}`: action `{action}` takes {accepted} editable arguments, {given} given"
    )]
    TooManyArguments {
        rule: String,
        action: ActionId,
        given: usize,
        accepted: usize,
    },

    #[error(
        "rule `{rule}`: argument `{param}` of `{action}` declares {found}, which does not convert to {expected}"
    )]
    ArgumentType {
        rule: String,
        action: ActionId,
        param: String,
        expected: TypeKey,
        found: TypeKey,
    },

    #[error("rule `{rule}`: operator {op} is not allowed for {ty} values")]
    OperatorNotAllowed {
        rule: String,
        op: CompareOp,
        ty: TypeKey,
    },

    #[error("rule `{rule}`: operator {op} needs a reference operand")]
    MissingReference { rule: String, op: CompareOp },
}

impl RuleError for ValidationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MultiTargetQuery { .. } => "VALIDATE_MULTI_TARGET_QUERY",
            Self::UnknownAction { .. } => "VALIDATE_UNKNOWN_ACTION",
            Self::UnknownQuery { .. } => "VALIDATE_UNKNOWN_QUERY",
            Self::TooManyArguments { .. } => "VALIDATE_TOO_MANY_ARGUMENTS",
            Self::ArgumentType { .. } => "VALIDATE_ARGUMENT_TYPE",
            Self::OperatorNotAllowed { .. } => "VALIDATE_OPERATOR_NOT_ALLOWED",
            Self::MissingReference { .. } => "VALIDATE_MISSING_REFERENCE",
        }
    }
}

/// Validates one rule against the registries, returning every defect found.
///
/// An empty result means the rule is safe to hand to the runtime. Each
/// defect is also logged so content authors see them without plumbing the
/// return value.
pub fn validate_rule(
    rule: &Rule,
    types: &TypeRegistry,
    ops: &OperationRegistry,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for condition in &rule.conditions {
        check_source(rule, &condition.check, ops, &mut errors);
        if let Some(reference) = &condition.reference {
            check_source(rule, reference, ops, &mut errors);
        } else if condition.op.arity() == OpArity::Binary {
            errors.push(ValidationError::MissingReference {
                rule: rule.name.clone(),
                op: condition.op,
            });
        }

        // Static operator allow-listing; register and argument operands are
        // untyped at load time and get checked at evaluation instead.
        let check_type = condition.check.type_key(None, ops);
        if check_type != TypeKey::Any
            && let Ok(descriptor) = types.lookup(&check_type)
            && !descriptor.operators.allows(condition.op)
        {
            errors.push(ValidationError::OperatorNotAllowed {
                rule: rule.name.clone(),
                op: condition.op,
                ty: check_type,
            });
        }
    }

    for step in &rule.actions {
        let Some(registered) = ops.action(&step.action) else {
            errors.push(ValidationError::UnknownAction {
                rule: rule.name.clone(),
                action: step.action.clone(),
            });
            continue;
        };

        let params = &registered.descriptor.params;
        let editable = &params[registered.binding.editable_from.min(params.len())..];
        if step.args.len() > editable.len() {
            errors.push(ValidationError::TooManyArguments {
                rule: rule.name.clone(),
                action: step.action.clone(),
                given: step.args.len(),
                accepted: editable.len(),
            });
        }

        for (source, param) in step.args.iter().zip(editable) {
            check_source(rule, source, ops, &mut errors);
            let found = source.type_key(None, ops);
            if found != TypeKey::Any && !types.can_convert(&found, &param.ty) {
                errors.push(ValidationError::ArgumentType {
                    rule: rule.name.clone(),
                    action: step.action.clone(),
                    param: param.name.clone(),
                    expected: param.ty.clone(),
                    found,
                });
            }
        }
    }

    for error in &errors {
        warn!(rule = %rule.name, %error, "rule validation failed");
    }
    errors
}

fn check_source(
    rule: &Rule,
    source: &ValueSource,
    ops: &OperationRegistry,
    errors: &mut Vec<ValidationError>,
) {
    let ValueSource::Query { scope, query } = source else {
        return;
    };
    if ops.query(query).is_none() {
        errors.push(ValidationError::UnknownQuery {
            rule: rule.name.clone(),
            query: query.clone(),
        });
    }
    if scope.is_multi_target() {
        errors.push(ValidationError::MultiTargetQuery {
            rule: rule.name.clone(),
            query: query.clone(),
        });
    }
}
