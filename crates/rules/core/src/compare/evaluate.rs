//! Pure comparison evaluation over typed values.

use std::cmp::Ordering;

use super::{CompareError, CompareOp, OpArity};
use crate::types::TypedValue;

/// Evaluates a comparison operator against a check value and a reference
/// value of matching kind.
///
/// The reference operand is ignored for unary operators. Mixed numeric
/// operands (int against float) are promoted to float; enum instances
/// compare by their numeric value. Every other kind mismatch, and every
/// operator applied to a kind it has no meaning for, fails with
/// `InvalidComparison` carrying the offending operator.
pub fn evaluate(
    op: CompareOp,
    check: &TypedValue,
    reference: &TypedValue,
) -> Result<bool, CompareError> {
    let result = match op.arity() {
        OpArity::Unary => eval_unary(op, check),
        OpArity::Binary => eval_binary(op, check, reference),
    };
    result.ok_or_else(|| CompareError::InvalidComparison {
        op,
        kind: check.type_key(),
    })
}

fn eval_unary(op: CompareOp, value: &TypedValue) -> Option<bool> {
    match value {
        TypedValue::Int(x) => match op {
            CompareOp::IsTrue => Some(*x > 0),
            CompareOp::IsFalse => Some(*x <= 0),
            _ => None,
        },
        TypedValue::Float(x) => match op {
            CompareOp::IsTrue => Some(*x > 0.0),
            CompareOp::IsFalse => Some(*x <= 0.0),
            _ => None,
        },
        TypedValue::Bool(x) => match op {
            CompareOp::IsTrue => Some(*x),
            CompareOp::IsFalse => Some(!*x),
            _ => None,
        },
        TypedValue::Str(x) => match op {
            CompareOp::IsTrue | CompareOp::IsNotEmpty => Some(!x.is_empty()),
            CompareOp::IsFalse | CompareOp::IsEmpty => Some(x.is_empty()),
            _ => None,
        },
        _ => None,
    }
}

fn eval_binary(op: CompareOp, check: &TypedValue, reference: &TypedValue) -> Option<bool> {
    use TypedValue as V;
    match (check, reference) {
        (V::Int(x), V::Int(y)) => ordering_op(op, x.cmp(y)),
        (V::Float(x), V::Float(y)) => float_op(op, *x, *y),
        (V::Int(x), V::Float(y)) => float_op(op, *x as f32, *y),
        (V::Float(x), V::Int(y)) => float_op(op, *x, *y as f32),
        (V::Bool(x), V::Bool(y)) => equality_op(op, x == y),
        (V::Str(x), V::Str(y)) => string_op(op, x, y),
        (V::Enum { value: x, .. }, V::Enum { value: y, .. }) => ordering_op(op, x.cmp(y)),
        (V::Enum { value: x, .. }, V::Int(y)) => ordering_op(op, x.cmp(y)),
        (V::Int(x), V::Enum { value: y, .. }) => ordering_op(op, x.cmp(y)),
        (V::Entity(x), V::Entity(y)) => equality_op(op, x == y),
        (V::Component(x), V::Component(y)) => equality_op(op, x == y),
        (V::Group(x), V::Group(y)) => equality_op(op, x == y),
        (V::Trigger(x), V::Trigger(y)) => equality_op(op, x == y),
        (V::Color(x), V::Color(y)) => equality_op(op, x == y),
        (V::Vec2(x), V::Vec2(y)) => equality_op(op, x == y),
        (V::Vec3(x), V::Vec3(y)) => equality_op(op, x == y),
        (V::Vec4(x), V::Vec4(y)) => equality_op(op, x == y),
        (V::Void, V::Void) => equality_op(op, true),
        _ => None,
    }
}

/// Reduces a three-way comparison to the six ordering operators.
fn ordering_op(op: CompareOp, ord: Ordering) -> Option<bool> {
    match op {
        CompareOp::LessOrEqual => Some(ord != Ordering::Greater),
        CompareOp::Less => Some(ord == Ordering::Less),
        CompareOp::Equal => Some(ord == Ordering::Equal),
        CompareOp::NotEqual => Some(ord != Ordering::Equal),
        CompareOp::Greater => Some(ord == Ordering::Greater),
        CompareOp::GreaterOrEqual => Some(ord != Ordering::Less),
        _ => None,
    }
}

// IEEE semantics: NaN compares false to everything except NotEqual.
fn float_op(op: CompareOp, x: f32, y: f32) -> Option<bool> {
    match op {
        CompareOp::LessOrEqual => Some(x <= y),
        CompareOp::Less => Some(x < y),
        CompareOp::Equal => Some(x == y),
        CompareOp::NotEqual => Some(x != y),
        CompareOp::Greater => Some(x > y),
        CompareOp::GreaterOrEqual => Some(x >= y),
        _ => None,
    }
}

fn equality_op(op: CompareOp, eq: bool) -> Option<bool> {
    match op {
        CompareOp::Equal => Some(eq),
        CompareOp::NotEqual => Some(!eq),
        _ => None,
    }
}

fn string_op(op: CompareOp, x: &str, y: &str) -> Option<bool> {
    match op {
        CompareOp::Equal => Some(x == y),
        CompareOp::NotEqual => Some(x != y),
        CompareOp::Contains => Some(x.contains(y)),
        CompareOp::NotContains => Some(!x.contains(y)),
        CompareOp::StartsWith => Some(x.starts_with(y)),
        CompareOp::NotStartsWith => Some(!x.starts_with(y)),
        CompareOp::EndsWith => Some(x.ends_with(y)),
        CompareOp::NotEndsWith => Some(!x.ends_with(y)),
        CompareOp::Matches => Some(wildcard_match(x, y)),
        CompareOp::NotMatches => Some(!wildcard_match(x, y)),
        _ => None,
    }
}

/// Matches `text` against a pattern with a single leading or trailing `*`.
///
/// A bare `*` matches everything, including the empty string. Patterns
/// without a wildcard require exact equality.
pub fn wildcard_match(text: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return text.ends_with(suffix);
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return text.starts_with(prefix);
    }
    text == pattern
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::types::{EntityId, TypeKey};

    #[test]
    fn equality_is_reflexive_for_every_kind() {
        let values = [
            TypedValue::Void,
            TypedValue::Int(-4),
            TypedValue::Float(2.5),
            TypedValue::Bool(true),
            TypedValue::Str("torch".into()),
            TypedValue::Enum {
                key: TypeKey::enum_type("DamageKind"),
                value: 3,
            },
            TypedValue::Entity(EntityId(9)),
        ];
        for value in values {
            assert_eq!(evaluate(CompareOp::Equal, &value, &value), Ok(true));
            assert_eq!(evaluate(CompareOp::NotEqual, &value, &value), Ok(false));
        }
    }

    #[test]
    fn ordering_on_ints_and_floats() {
        let two = TypedValue::Int(2);
        let three = TypedValue::Int(3);
        assert_eq!(evaluate(CompareOp::Less, &two, &three), Ok(true));
        assert_eq!(evaluate(CompareOp::GreaterOrEqual, &two, &three), Ok(false));

        // Mixed numeric operands promote to float.
        let half = TypedValue::Float(0.5);
        assert_eq!(evaluate(CompareOp::Greater, &two, &half), Ok(true));
        assert_eq!(evaluate(CompareOp::LessOrEqual, &half, &TypedValue::Int(1)), Ok(true));
    }

    #[test]
    fn truthiness() {
        assert_eq!(evaluate(CompareOp::IsTrue, &TypedValue::Int(1), &TypedValue::Void), Ok(true));
        assert_eq!(evaluate(CompareOp::IsTrue, &TypedValue::Int(0), &TypedValue::Void), Ok(false));
        assert_eq!(
            evaluate(CompareOp::IsFalse, &TypedValue::Float(-0.5), &TypedValue::Void),
            Ok(true)
        );
        assert_eq!(
            evaluate(CompareOp::IsTrue, &TypedValue::Str("x".into()), &TypedValue::Void),
            Ok(true)
        );
        assert_eq!(
            evaluate(CompareOp::IsFalse, &TypedValue::Str(String::new()), &TypedValue::Void),
            Ok(true)
        );
    }

    #[test]
    fn string_predicates() {
        let name = TypedValue::Str("Goblin_01".into());
        let prefix = TypedValue::Str("Goblin".into());
        assert_eq!(evaluate(CompareOp::StartsWith, &name, &prefix), Ok(true));
        assert_eq!(evaluate(CompareOp::Contains, &name, &TypedValue::Str("lin_".into())), Ok(true));
        assert_eq!(evaluate(CompareOp::NotEndsWith, &name, &TypedValue::Str("_02".into())), Ok(true));
    }

    #[test]
    fn wildcard_cases() {
        assert!(wildcard_match("Goblin_01", "Goblin_*"));
        assert!(!wildcard_match("Skeleton", "Goblin_*"));
        assert!(wildcard_match("", "*"));
        assert!(wildcard_match("Old_Gate", "*Gate"));
        assert!(!wildcard_match("Gate_Old", "*Gate"));
        assert!(wildcard_match("exact", "exact"));
    }

    #[test]
    fn invalid_comparison_carries_the_operator() {
        let result = evaluate(
            CompareOp::Contains,
            &TypedValue::Int(1),
            &TypedValue::Int(2),
        );
        assert_eq!(
            result,
            Err(CompareError::InvalidComparison {
                op: CompareOp::Contains,
                kind: TypeKey::Int
            })
        );

        // Ordering has no meaning for entity handles.
        let a = TypedValue::Entity(EntityId(1));
        assert!(evaluate(CompareOp::Less, &a, &a).is_err());
    }

    #[test]
    fn kind_mismatch_is_invalid_for_every_binary_operator() {
        let text = TypedValue::Str("a".into());
        let flag = TypedValue::Bool(true);
        for op in CompareOp::iter().filter(|op| op.arity() == OpArity::Binary) {
            assert!(evaluate(op, &text, &flag).is_err(), "{op} accepted a kind mismatch");
        }
    }
}
