//! Execution context for one rule-evaluation run.
//!
//! The context bundles everything resolution and invocation need: the
//! evaluating entity, the live trigger (if any), the register bank, and
//! shared references to the type registry, entity oracle, and operation
//! registry. One context instance serves exactly one evaluation run; the
//! shared registries behind it are read-only after load and safe to share
//! across runs.

use tracing::warn;

use crate::env::EntityOracle;
use crate::invoke::OperationRegistry;
use crate::types::{EntityId, TriggerId, TypeKey, TypeRegistry, TypedValue};

// ============================================================================
// Registers
// ============================================================================

/// One of the eight scratch value slots, plus an invalid sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegisterIndex {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    Invalid,
}

impl RegisterIndex {
    /// Returns the slot number, or None for the invalid sentinel.
    #[inline]
    pub const fn slot(self) -> Option<usize> {
        match self {
            Self::Invalid => None,
            _ => Some(self as usize),
        }
    }
}

static VOID: TypedValue = TypedValue::Void;

/// Scratch variable space scoped to a single rule-evaluation run.
///
/// Written by prior conditions/actions in the run and read by later ones.
/// Contents are untyped at the data level ("any"); a live slot always holds
/// a concrete value, initially void.
#[derive(Clone, Debug)]
pub struct RegisterBank {
    slots: [TypedValue; Self::SLOTS],
}

impl RegisterBank {
    pub const SLOTS: usize = 8;

    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| TypedValue::Void),
        }
    }

    /// Reads a register. The invalid sentinel reads as void.
    pub fn get(&self, index: RegisterIndex) -> &TypedValue {
        match index.slot() {
            Some(slot) => &self.slots[slot],
            None => &VOID,
        }
    }

    /// Writes a register. Writes through the invalid sentinel are dropped.
    pub fn set(&mut self, index: RegisterIndex, value: TypedValue) {
        match index.slot() {
            Some(slot) => self.slots[slot] = value,
            None => warn!("write to the invalid register slot dropped"),
        }
    }

    /// Resets every slot to void.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = TypedValue::Void;
        }
    }
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Trigger Context
// ============================================================================

/// The trigger that started this evaluation run, with its optional argument.
#[derive(Clone, Debug)]
pub struct TriggerContext {
    pub trigger: TriggerId,

    /// The trigger's declared parameter type, if it declares one.
    pub param_type: Option<TypeKey>,

    /// The live argument carried by this firing, if any.
    pub argument: Option<TypedValue>,
}

impl TriggerContext {
    pub fn new(trigger: TriggerId) -> Self {
        Self {
            trigger,
            param_type: None,
            argument: None,
        }
    }

    #[must_use]
    pub fn with_argument(mut self, param_type: TypeKey, argument: TypedValue) -> Self {
        self.param_type = Some(param_type);
        self.argument = Some(argument);
        self
    }
}

// ============================================================================
// Execution Context
// ============================================================================

/// Context for one rule-evaluation run.
pub struct ExecutionContext<'w> {
    /// The entity the rule is evaluating on ("self" scope target).
    pub evaluator: EntityId,

    pub types: &'w TypeRegistry,
    pub world: &'w dyn EntityOracle,
    pub ops: &'w OperationRegistry,

    /// The trigger that started the run, if the run was trigger-driven.
    pub trigger: Option<TriggerContext>,

    pub registers: RegisterBank,
}

impl<'w> ExecutionContext<'w> {
    pub fn new(
        evaluator: EntityId,
        types: &'w TypeRegistry,
        world: &'w dyn EntityOracle,
        ops: &'w OperationRegistry,
    ) -> Self {
        Self {
            evaluator,
            types,
            world,
            ops,
            trigger: None,
            registers: RegisterBank::new(),
        }
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerContext) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// The live trigger argument, if one is active.
    pub fn trigger_argument(&self) -> Option<&TypedValue> {
        self.trigger.as_ref()?.argument.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_slots() {
        assert_eq!(RegisterIndex::R0.slot(), Some(0));
        assert_eq!(RegisterIndex::R7.slot(), Some(7));
        assert_eq!(RegisterIndex::Invalid.slot(), None);
        assert_eq!(RegisterIndex::from_repr(3), Some(RegisterIndex::R3));
    }

    #[test]
    fn invalid_register_reads_void_and_drops_writes() {
        let mut bank = RegisterBank::new();
        bank.set(RegisterIndex::R2, TypedValue::Int(42));
        bank.set(RegisterIndex::Invalid, TypedValue::Int(7));

        assert_eq!(bank.get(RegisterIndex::R2), &TypedValue::Int(42));
        assert_eq!(bank.get(RegisterIndex::Invalid), &TypedValue::Void);

        bank.clear();
        assert_eq!(bank.get(RegisterIndex::R2), &TypedValue::Void);
    }
}
