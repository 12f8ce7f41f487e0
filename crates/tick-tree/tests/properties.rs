use std::sync::Arc;

use tick_tree::builder::*;
use tick_tree::{
    BehaviorTree, BtError, Clock, ErrorKind, Node, NodeDef, Outcome, Registry, Result, RunEnv,
    Status, TreeDef, TreeInstance, Value,
};

/// Host context: a clock plus a trace of invoked leaf ids.
#[derive(Debug, Default)]
struct Agent {
    time: f64,
    trace: Vec<u32>,
}

impl Clock for Agent {
    fn now(&self) -> f64 {
        self.time
    }
}

/// Returns the status named by its `status` argument.
fn fixed(node: &Node<Agent>, env: &mut RunEnv<Agent>, _: &[Value]) -> Result<Outcome> {
    env.ctx_mut().trace.push(node.id());
    let status = match node.require_str("status")? {
        "success" => Status::Success,
        "failure" => Status::Failure,
        _ => Status::Running,
    };
    Ok(status.into())
}

/// Outputs the sum of its inputs.
fn add(node: &Node<Agent>, env: &mut RunEnv<Agent>, inputs: &[Value]) -> Result<Outcome> {
    env.ctx_mut().trace.push(node.id());
    let sum: f64 = inputs.iter().filter_map(Value::as_number).sum();
    Ok(Outcome::new(Status::Success).with_output(sum))
}

/// Returns two outputs regardless of what it declares.
fn chatty(_: &Node<Agent>, _: &mut RunEnv<Agent>, _: &[Value]) -> Result<Outcome> {
    Ok(Outcome::new(Status::Success).with_output(1).with_output(2))
}

fn registry() -> Registry<Agent> {
    let mut registry = Registry::<Agent>::new().with_standard_leaves();
    registry.register("Fixed", fixed).unwrap();
    registry.register("Add", add).unwrap();
    registry.register("Chatty", chatty).unwrap();
    registry
}

fn outcome(id: u32, status: &str) -> NodeDef {
    leaf(id, "Fixed").with_arg("status", status)
}

fn instance(root: NodeDef) -> TreeInstance<Agent> {
    let tree = BehaviorTree::compile(&TreeDef::new("props", root), &registry()).unwrap();
    TreeInstance::new(Arc::new(tree), Agent::default())
}

#[test]
fn sequence_stops_at_first_failure_for_every_position() {
    for n in 1..=5u32 {
        for k in 1..=n {
            let children = (1..=n)
                .map(|i| outcome(i + 1, if i == k { "failure" } else { "success" }))
                .collect();
            let mut bt = instance(sequence(100, children));

            assert_eq!(bt.tick().unwrap(), Status::Failure);
            let expected: Vec<u32> = (2..=k + 1).collect();
            assert_eq!(bt.ctx().trace, expected, "n={n} k={k}");
        }
    }
}

#[test]
fn selector_stops_at_first_success_for_every_position() {
    for n in 1..=5u32 {
        for k in 1..=n {
            let children = (1..=n)
                .map(|i| outcome(i + 1, if i == k { "success" } else { "failure" }))
                .collect();
            let mut bt = instance(selector(100, children));

            assert_eq!(bt.tick().unwrap(), Status::Success);
            let expected: Vec<u32> = (2..=k + 1).collect();
            assert_eq!(bt.ctx().trace, expected, "n={n} k={k}");
        }
    }
}

#[test]
fn resumed_wait_reports_what_a_synchronous_leaf_would() {
    let root = selector(
        1,
        vec![
            sequence(2, vec![outcome(3, "success"), wait(4, 3.0), outcome(5, "failure")]),
            outcome(6, "success"),
        ],
    );
    let mut bt = instance(root);

    assert_eq!(bt.tick().unwrap(), Status::Running);
    for time in [1.0, 2.0] {
        bt.ctx_mut().time = time;
        assert_eq!(bt.tick().unwrap(), Status::Running);
    }
    bt.ctx_mut().time = 3.0;
    assert_eq!(bt.tick().unwrap(), Status::Success);

    // Leaf 3 ran once; 5 fails the sequence so the selector falls through to 6.
    assert_eq!(bt.ctx().trace, vec![3, 5, 6]);
}

#[test]
fn outputs_feed_later_inputs_in_the_same_tick() {
    let mut bt = instance(sequence(
        1,
        vec![
            leaf(2, "Add").with_input("a").with_input("b").with_output("x"),
            leaf(3, "Add").with_input("x").with_input("x").with_output("y"),
        ],
    ));
    bt.blackboard_mut().set("a", 3);
    bt.blackboard_mut().set("b", 4);

    assert_eq!(bt.tick().unwrap(), Status::Success);
    assert_eq!(bt.blackboard().read("x"), Value::Number(7.0));
    assert_eq!(bt.blackboard().read("y"), Value::Number(14.0));
}

#[test]
fn fewer_outputs_leave_extra_variables_untouched() {
    let mut bt = instance(leaf(1, "Add").with_output("sum").with_output("untouched"));
    bt.blackboard_mut().set("untouched", "still here");

    assert_eq!(bt.tick().unwrap(), Status::Success);
    assert_eq!(bt.blackboard().read("sum"), Value::Number(0.0));
    assert_eq!(bt.blackboard().read("untouched"), Value::from("still here"));
}

#[test]
fn interrupt_is_idempotent() {
    let mut bt = instance(sequence(1, vec![outcome(2, "success"), outcome(3, "running")]));

    bt.interrupt();
    assert!(!bt.is_running());

    assert_eq!(bt.tick().unwrap(), Status::Running);
    bt.interrupt();
    bt.interrupt();
    assert!(!bt.is_running());
    assert!(bt.env().stack().is_empty());

    assert_eq!(bt.tick().unwrap(), Status::Running);
    assert_eq!(bt.ctx().trace, vec![2, 3, 2, 3]);
}

#[test]
fn failure_is_a_status_not_an_error() {
    let mut bt = instance(not(1, outcome(2, "failure")));
    assert_eq!(bt.tick(), Ok(Status::Success));
}

#[test]
fn protocol_error_aborts_tick() {
    let mut bt = instance(sequence(
        1,
        vec![outcome(2, "success"), leaf(3, "Chatty").with_output("only")],
    ));

    let err = bt.tick().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.node_id(), Some(3));
    assert_eq!(bt.blackboard().get("only"), None);
}

#[test]
fn configuration_errors_surface_at_compile_time() {
    let registry = registry();
    let compile = |root: NodeDef| BehaviorTree::compile(&TreeDef::new("bad", root), &registry);

    let cases: Vec<(NodeDef, u32)> = vec![
        (sequence(1, vec![leaf(2, "Fly")]), 2),
        (NodeDef::new(1, "IfElse").with_children(vec![outcome(2, "success")]), 1),
        (NodeDef::new(1, "Cmp").with_input("hp"), 1),
        (NodeDef::new(1, "ForEach").with_output("x"), 1),
        (leaf(1, "Log"), 1),
    ];
    for (root, id) in cases {
        let err = compile(root).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration, "{err}");
        assert_eq!(err.node_id(), Some(id), "{err}");
    }
}

#[test]
fn builtin_kinds_cannot_be_overridden() {
    let mut registry = registry();
    assert_eq!(
        registry.register("Selector", fixed),
        Err(BtError::ReservedKind("Selector".into()))
    );
}
