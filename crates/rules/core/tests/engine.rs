//! End-to-end engine tests: host registration, scope resolution, binding,
//! and full rule dispatch against a mock world.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rules_core::env::mock::MockWorld;
use rules_core::invoke::action;
use rules_core::rule::{Rule, RuleAction, RuleCondition, run_rule};
use rules_core::{
    ActionDescriptor, ActionResult, CallableShape, CompareOp, ComponentHandle, EntityId,
    EntityScope, ExecutionContext, OperationRegistry, ParamSpec, QueryDescriptor, RegisterIndex,
    TriggerContext, TriggerId, TypeDescriptor, TypeFlags, TypeKey, TypeRegistry, TypedValue,
    ValueSource,
};

/// Shared mutable host state the registered callables close over.
#[derive(Default)]
struct HostState {
    health: HashMap<EntityId, i32>,
    damage_log: Vec<(EntityId, i32)>,
}

struct Fixture {
    types: TypeRegistry,
    ops: OperationRegistry,
    world: MockWorld,
    state: Arc<Mutex<HostState>>,
}

fn health_type() -> TypeKey {
    TypeKey::host("Health")
}

/// Registers the Health component type, a `health` extension query bound to
/// it, and a `deal_damage` action bound to the entity.
fn fixture() -> Fixture {
    let mut types = TypeRegistry::with_builtins();
    types
        .register(
            TypeDescriptor::new(
                health_type(),
                "Health",
                TypedValue::Component(ComponentHandle::NONE),
            )
            .with_flags(TypeFlags::IS_COMPONENT),
        )
        .unwrap();

    let state = Arc::new(Mutex::new(HostState::default()));
    let mut ops = OperationRegistry::new();

    // Static extension query: health(entity's Health component) -> int.
    let health = state.clone();
    ops.register_query(
        &types,
        QueryDescriptor::new(
            "health",
            CallableShape::Extension,
            TypeKey::Int,
            TypedValue::Int(0),
        )
        .with_param(ParamSpec::new("health", health_type())),
        move |call| {
            let entity = call.entity.expect("component binding implies an entity");
            TypedValue::Int(*health.lock().unwrap().health.get(&entity).unwrap_or(&0))
        },
    )
    .unwrap();

    // Static extension action: deal_damage(entity, amount).
    let damage = state.clone();
    ops.register_action(
        &types,
        ActionDescriptor::new("deal_damage", CallableShape::Extension)
            .with_param(ParamSpec::new("target", TypeKey::Entity))
            .with_param(ParamSpec::new("amount", TypeKey::Int))
            .requiring_active_entity(),
        move |call| {
            let entity = call.entity.expect("entity binding");
            let amount = call.args[0].as_int().expect("marshaled to int");
            let mut state = damage.lock().unwrap();
            *state.health.entry(entity).or_insert(0) -= amount;
            state.damage_log.push((entity, amount));
            TypedValue::Void
        },
    )
    .unwrap();

    // Free-function action writing the trigger argument into a register.
    ops.register_action(
        &types,
        ActionDescriptor::new("remember_argument", CallableShape::FreeFunction)
            .with_param(ParamSpec::new("ctx", TypeKey::Context)),
        |call| {
            let remembered = call
                .ctx
                .trigger_argument()
                .cloned()
                .unwrap_or(TypedValue::Void);
            call.ctx.registers.set(RegisterIndex::R0, remembered);
            TypedValue::Void
        },
    )
    .unwrap();

    Fixture {
        types,
        ops,
        world: MockWorld::new(),
        state,
    }
}

fn give_health(fixture: &Fixture, entity: EntityId, amount: i32) {
    fixture
        .world
        .attach(entity, health_type(), ComponentHandle(entity.0 as u64 + 1));
    fixture.state.lock().unwrap().health.insert(entity, amount);
}

#[test]
fn extension_query_reads_component_and_defaults_when_absent() {
    let fixture = fixture();
    let goblin = fixture.world.spawn("Goblin_01", "goblin");
    let crate_prop = fixture.world.spawn("Crate", "prop");
    give_health(&fixture, goblin, 30);

    let mut ctx = ExecutionContext::new(goblin, &fixture.types, &fixture.world, &fixture.ops);

    let health_of_self = ValueSource::query(EntityScope::self_entity(), "health");
    assert_eq!(
        rules_core::value::resolve(&health_of_self, &mut ctx).unwrap(),
        TypedValue::Int(30)
    );

    // The crate has no Health component: declared default, not a failure.
    let health_of_crate = ValueSource::query(EntityScope::by_id(crate_prop), "health");
    assert_eq!(
        rules_core::value::resolve(&health_of_crate, &mut ctx).unwrap(),
        TypedValue::Int(0)
    );

    // A vanished entity degrades the same way.
    let health_of_ghost = ValueSource::query(EntityScope::by_id(EntityId(404)), "health");
    assert_eq!(
        rules_core::value::resolve(&health_of_ghost, &mut ctx).unwrap(),
        TypedValue::Int(0)
    );
}

#[test]
fn action_failure_kinds() {
    let fixture = fixture();
    let goblin = fixture.world.spawn("Goblin_01", "goblin");
    give_health(&fixture, goblin, 30);
    let mut ctx = ExecutionContext::new(goblin, &fixture.types, &fixture.world, &fixture.ops);

    let registered = fixture.ops.action(&"deal_damage".into()).unwrap();
    let args = [ValueSource::literal(5)];

    // NoEntity takes precedence: the active check never runs on a null
    // target.
    let outcome = action::invoke(registered, None, &args, &mut ctx).unwrap();
    assert_eq!(outcome, ActionResult::NoEntity);

    // Inactive short-circuits before the host callable runs.
    fixture.world.set_active(goblin, false);
    let outcome = action::invoke(registered, Some(goblin), &args, &mut ctx).unwrap();
    assert_eq!(outcome, ActionResult::Inactive);
    assert!(fixture.state.lock().unwrap().damage_log.is_empty());

    // Active again: the invocation reaches the host.
    fixture.world.set_active(goblin, true);
    let outcome = action::invoke(registered, Some(goblin), &args, &mut ctx).unwrap();
    assert_eq!(outcome, ActionResult::Success(TypedValue::Void));
    assert_eq!(fixture.state.lock().unwrap().health[&goblin], 25);
}

#[test]
fn component_bound_action_reports_no_component() {
    let fixture = fixture();
    let types = fixture.types;
    let mut ops = fixture.ops;

    // An action bound to the Health component itself.
    ops.register_action(
        &types,
        ActionDescriptor::new("purge", CallableShape::Extension)
            .with_param(ParamSpec::new("health", health_type())),
        |_| TypedValue::Void,
    )
    .unwrap();

    let bare = fixture.world.spawn("Crate", "prop");
    let mut ctx = ExecutionContext::new(bare, &types, &fixture.world, &ops);

    let registered = ops.action(&"purge".into()).unwrap();
    let outcome = action::invoke(registered, Some(bare), &[], &mut ctx).unwrap();
    assert_eq!(outcome, ActionResult::NoComponent(health_type()));
}

#[test]
fn full_rule_run_damages_every_matching_entity() {
    let fixture = fixture();
    let sentry = fixture.world.spawn("Sentry", "sentry");
    let goblin_a = fixture.world.spawn("Goblin_01", "goblin");
    let goblin_b = fixture.world.spawn("Goblin_02", "goblin");
    give_health(&fixture, goblin_a, 30);
    give_health(&fixture, goblin_b, 10);

    // When the alarm trigger fires with a loudness above 2, every goblin
    // takes damage equal to the loudness.
    let rule = Rule {
        name: "alarm_damages_goblins".into(),
        trigger: TriggerId(7),
        conditions: vec![RuleCondition::binary(
            ValueSource::Argument,
            CompareOp::Greater,
            ValueSource::literal(2),
        )],
        actions: vec![
            RuleAction::new("remember_argument", EntityScope::null()),
            RuleAction::new("deal_damage", EntityScope::with_name("Goblin_*", false))
                .with_arg(ValueSource::Argument),
        ],
    };

    let mut ctx = ExecutionContext::new(sentry, &fixture.types, &fixture.world, &fixture.ops)
        .with_trigger(
            TriggerContext::new(TriggerId(7)).with_argument(TypeKey::Int, TypedValue::Int(4)),
        );

    let outcome = run_rule(&rule, &mut ctx).unwrap();
    assert!(outcome.fired);
    assert_eq!(outcome.reports.len(), 2);
    assert_eq!(outcome.reports[1].outcomes.len(), 2);
    assert!(outcome.reports[1].outcomes.iter().all(|o| matches!(
        o,
        Ok(ActionResult::Success(TypedValue::Void))
    )));

    let state = fixture.state.lock().unwrap();
    assert_eq!(state.health[&goblin_a], 26);
    assert_eq!(state.health[&goblin_b], 6);
    drop(state);

    // The free-function step ran once and captured the argument.
    assert_eq!(ctx.registers.get(RegisterIndex::R0), &TypedValue::Int(4));

    // A quieter alarm does not fire the rule.
    let mut quiet = ExecutionContext::new(sentry, &fixture.types, &fixture.world, &fixture.ops)
        .with_trigger(
            TriggerContext::new(TriggerId(7)).with_argument(TypeKey::Int, TypedValue::Int(1)),
        );
    let outcome = run_rule(&rule, &mut quiet).unwrap();
    assert!(!outcome.fired);
}

#[test]
fn conditions_can_compare_nested_queries_across_scopes() {
    let fixture = fixture();
    let hero = fixture.world.spawn("Hero", "hero");
    let rival = fixture.world.spawn("Rival", "hero");
    give_health(&fixture, hero, 40);
    give_health(&fixture, rival, 55);

    let mut ctx = ExecutionContext::new(hero, &fixture.types, &fixture.world, &fixture.ops);

    let condition = RuleCondition::binary(
        ValueSource::query(EntityScope::self_entity(), "health"),
        CompareOp::Less,
        ValueSource::query(EntityScope::by_id(rival), "health"),
    );
    assert!(rules_core::rule::evaluate_condition(&condition, &mut ctx).unwrap());
}

#[test]
fn link_traversal_feeds_action_targets() {
    let fixture = fixture();
    let lever = fixture.world.spawn("Lever", "lever");
    let gate_a = fixture.world.spawn("Gate_01", "gate");
    let gate_b = fixture.world.spawn("Gate_02", "gate");
    fixture.world.link(lever, "controls", gate_a);
    fixture.world.link(lever, "controls", gate_b);
    give_health(&fixture, gate_a, 100);
    give_health(&fixture, gate_b, 100);

    let rule = Rule {
        name: "batter_linked_gates".into(),
        trigger: TriggerId(1),
        conditions: Vec::new(),
        actions: vec![
            RuleAction::new(
                "deal_damage",
                EntityScope::self_entity().with_links("controls", false),
            )
            .with_arg(ValueSource::literal(10)),
        ],
    };

    let mut ctx = ExecutionContext::new(lever, &fixture.types, &fixture.world, &fixture.ops);
    let outcome = run_rule(&rule, &mut ctx).unwrap();
    assert_eq!(outcome.reports[0].outcomes.len(), 2);

    let state = fixture.state.lock().unwrap();
    assert_eq!(state.health[&gate_a], 90);
    assert_eq!(state.health[&gate_b], 90);
}

#[test]
fn marshal_conversion_failure_is_fatal_to_the_invocation() {
    let fixture = fixture();
    let goblin = fixture.world.spawn("Goblin_01", "goblin");
    give_health(&fixture, goblin, 30);
    let mut ctx = ExecutionContext::new(goblin, &fixture.types, &fixture.world, &fixture.ops);

    let registered = fixture.ops.action(&"deal_damage".into()).unwrap();
    // A bool literal does not convert to the declared int parameter.
    let args = [ValueSource::literal(true)];
    let result = action::invoke(registered, Some(goblin), &args, &mut ctx);
    assert!(result.is_err());
    assert!(fixture.state.lock().unwrap().damage_log.is_empty());
}
