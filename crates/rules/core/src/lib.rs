//! Metadata-driven rule resolution and dispatch engine.
//!
//! `rules-core` turns declarative rule data ("when trigger X, if conditions
//! hold, perform actions") into validated invocations against live game
//! entities. The host registers its types, actions, and queries once at
//! startup; rules reference them by identity and are resolved fresh on every
//! evaluation run. All registries are read-only after load; per-run mutable
//! state lives in [`ExecutionContext`].
//!
//! Everything discoverable at registration time fails fast with a
//! [`bind::ConfigError`]; anything depending on live game state (missing
//! entity, inactive entity, absent component) degrades to an empty scope or
//! a default value and the run continues.

pub mod bind;
pub mod compare;
pub mod context;
pub mod env;
pub mod error;
pub mod invoke;
pub mod rule;
pub mod scope;
pub mod types;
pub mod value;

pub use bind::{
    BindFailure, BindingTarget, CallableShape, ConfigError, MemberBinding, ParamSpec, configure,
};
pub use compare::{CompareCaps, CompareError, CompareOp, OpArity, evaluate, wildcard_match};
pub use context::{ExecutionContext, RegisterBank, RegisterIndex, TriggerContext};
pub use env::EntityOracle;
pub use error::{ErrorSeverity, RuleError};
pub use invoke::{
    ActionDescriptor, ActionResult, Call, InvokeError, OperationRegistry, QueryDescriptor,
};
pub use rule::{
    ActionReport, Rule, RuleAction, RuleCondition, RuleEvalError, RuleOutcome, evaluate_conditions,
    run_rule,
};
pub use scope::{EntityScope, ScopeKind};
pub use types::{
    ActionId, Color, ComponentHandle, EntityId, GroupId, QueryId, TriggerId, TypeDescriptor,
    TypeError, TypeFlags, TypeKey, TypeRegistry, TypedValue, Vec2, Vec3, Vec4,
};
pub use value::{ValueError, ValueSource};
