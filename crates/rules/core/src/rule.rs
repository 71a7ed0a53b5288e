//! Single-rule condition evaluation and action dispatch.
//!
//! A [`Rule`] is the authored unit the trigger layer hands to the engine:
//! when its trigger fires, the conditions are evaluated in order and, if all
//! hold, each action runs once per entity its scope resolves to. When a rule
//! fires, how often it re-fires, and what happens to the reported outcomes
//! are the trigger layer's business, not this module's.

use tracing::error;

use crate::compare::{self, CompareError, CompareOp, OpArity};
use crate::context::ExecutionContext;
use crate::error::{ErrorSeverity, RuleError};
use crate::invoke::{ActionResult, InvokeError, action};
use crate::scope::EntityScope;
use crate::types::{ActionId, TriggerId, TypeError, TypeKey, TypedValue};
use crate::value::{ValueError, ValueSource, resolve};

// ============================================================================
// Rule Data
// ============================================================================

/// One authored condition: a check operand, an operator, and (for binary
/// operators) a reference operand.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleCondition {
    pub check: ValueSource,
    pub op: CompareOp,

    /// Absent for unary operators.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reference: Option<ValueSource>,
}

impl RuleCondition {
    /// A binary condition.
    pub fn binary(check: ValueSource, op: CompareOp, reference: ValueSource) -> Self {
        Self {
            check,
            op,
            reference: Some(reference),
        }
    }

    /// A unary condition.
    pub fn unary(check: ValueSource, op: CompareOp) -> Self {
        Self {
            check,
            op,
            reference: None,
        }
    }
}

/// One authored action step: which action, on which entities, with which
/// arguments.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleAction {
    pub action: ActionId,
    pub scope: EntityScope,

    #[cfg_attr(feature = "serde", serde(default))]
    pub args: Vec<ValueSource>,
}

impl RuleAction {
    pub fn new(action: impl Into<ActionId>, scope: EntityScope) -> Self {
        Self {
            action: action.into(),
            scope,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: ValueSource) -> Self {
        self.args.push(arg);
        self
    }
}

/// A declarative rule: trigger, conditions, actions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub name: String,
    pub trigger: TriggerId,

    #[cfg_attr(feature = "serde", serde(default))]
    pub conditions: Vec<RuleCondition>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub actions: Vec<RuleAction>,
}

// ============================================================================
// Outcomes
// ============================================================================

/// Per-action-step outcomes of one rule run.
#[derive(Debug)]
pub struct ActionReport {
    pub action: ActionId,

    /// One entry per invocation (one per resolved target entity).
    pub outcomes: Vec<Result<ActionResult, InvokeError>>,
}

/// What one rule run did.
#[derive(Debug)]
pub struct RuleOutcome {
    /// False when a condition did not hold; no actions ran.
    pub fired: bool,

    pub reports: Vec<ActionReport>,
}

/// Errors raised while evaluating a rule's conditions.
///
/// These are data-integrity errors, surfaced to the caller rather than
/// swallowed: they mean the authored rule and the registries disagree.
#[derive(Debug, thiserror::Error)]
pub enum RuleEvalError {
    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Compare(#[from] CompareError),

    /// The registry does not allow this operator for the check value's type.
    #[error("operator {op} is not allowed for {ty} values")]
    OperatorNotAllowed { op: CompareOp, ty: TypeKey },

    /// A binary operator was authored without a reference operand.
    #[error("operator {op} needs a reference operand")]
    MissingReference { op: CompareOp },
}

impl RuleError for RuleEvalError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Value(_) => "RULE_VALUE",
            Self::Type(_) => "RULE_TYPE",
            Self::Compare(_) => "RULE_COMPARE",
            Self::OperatorNotAllowed { .. } => "RULE_OPERATOR_NOT_ALLOWED",
            Self::MissingReference { .. } => "RULE_MISSING_REFERENCE",
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Evaluates one condition against the execution context.
///
/// The check operand's type must allow the operator per the type registry;
/// the reference operand is converted to the check's kind (or, failing that,
/// the check to the reference's kind) before the evaluator runs.
pub fn evaluate_condition(
    condition: &RuleCondition,
    ctx: &mut ExecutionContext<'_>,
) -> Result<bool, RuleEvalError> {
    let check = resolve(&condition.check, ctx)?;
    let check_type = check.type_key();

    let descriptor = ctx.types.lookup(&check_type)?;
    if !descriptor.operators.allows(condition.op) {
        return Err(RuleEvalError::OperatorNotAllowed {
            op: condition.op,
            ty: check_type,
        });
    }

    match condition.op.arity() {
        OpArity::Unary => Ok(compare::evaluate(condition.op, &check, &TypedValue::Void)?),
        OpArity::Binary => {
            let source = condition
                .reference
                .as_ref()
                .ok_or(RuleEvalError::MissingReference { op: condition.op })?;
            let reference = resolve(source, ctx)?;
            match reference.convert_to(&check_type, ctx.types) {
                Ok(reference) => Ok(compare::evaluate(condition.op, &check, &reference)?),
                Err(_) => {
                    let check = check.convert_to(&reference.type_key(), ctx.types)?;
                    Ok(compare::evaluate(condition.op, &check, &reference)?)
                }
            }
        }
    }
}

/// Evaluates all of a rule's conditions; true when every one holds.
pub fn evaluate_conditions(
    rule: &Rule,
    ctx: &mut ExecutionContext<'_>,
) -> Result<bool, RuleEvalError> {
    for condition in &rule.conditions {
        if !evaluate_condition(condition, ctx)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Runs one rule: conditions first, then each action once per resolved
/// target.
///
/// Zero resolved targets is a normal outcome (the step reports no
/// invocations). An action whose binding needs no entity runs exactly once,
/// against the scope's first target if it yields one. Per-invocation
/// failures land in the report; they do not abort the remaining steps.
///
/// # Errors
///
/// Returns a `RuleEvalError` when condition evaluation hits a
/// data-integrity error.
pub fn run_rule(rule: &Rule, ctx: &mut ExecutionContext<'_>) -> Result<RuleOutcome, RuleEvalError> {
    if !evaluate_conditions(rule, ctx)? {
        return Ok(RuleOutcome {
            fired: false,
            reports: Vec::new(),
        });
    }

    let ops = ctx.ops;
    let mut reports = Vec::new();
    for step in &rule.actions {
        let Some(registered) = ops.action(&step.action) else {
            error!(rule = %rule.name, action = %step.action, "rule references an unregistered action");
            reports.push(ActionReport {
                action: step.action.clone(),
                outcomes: vec![Err(InvokeError::UnknownAction(step.action.clone()))],
            });
            continue;
        };

        let mut outcomes = Vec::new();
        if registered.binding.requires_entity() {
            let mut targets = step.scope.resolve(ctx);
            while let Some(entity) = targets.next() {
                outcomes.push(action::invoke(registered, Some(entity), &step.args, ctx));
            }
        } else {
            let target = step.scope.resolve(ctx).next();
            outcomes.push(action::invoke(registered, target, &step.args, ctx));
        }
        reports.push(ActionReport {
            action: step.action.clone(),
            outcomes,
        });
    }

    Ok(RuleOutcome {
        fired: true,
        reports,
    })
}
