//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    BehaviorTree, Clock, Node, NodeDef, Outcome, Registry, Result, RunEnv, Status, TreeDef,
    TreeInstance, Value,
};

/// Host context used by the unit tests.
#[derive(Debug, Default)]
pub(crate) struct TestCtx {
    pub time: f64,
    /// Ids of the test leaves invoked, in order.
    pub log: Vec<u32>,
    /// Values handed to `Record` leaves.
    pub seen: Vec<Value>,
    released: HashMap<u32, Status>,
}

impl TestCtx {
    /// Makes the suspended `Pending` leaf `id` finish with `status` the next
    /// time it is resumed.
    pub fn release(&mut self, id: u32, status: Status) {
        self.released.insert(id, status);
    }
}

impl Clock for TestCtx {
    fn now(&self) -> f64 {
        self.time
    }
}

fn succeed(node: &Node<TestCtx>, env: &mut RunEnv<TestCtx>, _: &[Value]) -> Result<Outcome> {
    env.ctx_mut().log.push(node.id());
    Ok(Status::Success.into())
}

fn fail(node: &Node<TestCtx>, env: &mut RunEnv<TestCtx>, _: &[Value]) -> Result<Outcome> {
    env.ctx_mut().log.push(node.id());
    Ok(Status::Failure.into())
}

/// Runs until released through [`TestCtx::release`].
fn pending(node: &Node<TestCtx>, env: &mut RunEnv<TestCtx>, _: &[Value]) -> Result<Outcome> {
    let resumed = env.resume(node).is_some();
    let ctx = env.ctx_mut();
    ctx.log.push(node.id());
    let status = if resumed {
        ctx.released.remove(&node.id()).unwrap_or(Status::Running)
    } else {
        Status::Running
    };
    Ok(status.into())
}

/// Succeeds, returning its `value` argument as the first output.
fn emit(node: &Node<TestCtx>, _: &mut RunEnv<TestCtx>, _: &[Value]) -> Result<Outcome> {
    let value = node.arg("value").cloned().unwrap_or_default();
    Ok(Outcome::new(Status::Success).with_output(value))
}

/// Succeeds, recording its first input.
fn record(_: &Node<TestCtx>, env: &mut RunEnv<TestCtx>, inputs: &[Value]) -> Result<Outcome> {
    let value = inputs.first().cloned().unwrap_or_default();
    env.ctx_mut().seen.push(value);
    Ok(Status::Success.into())
}

pub(crate) fn registry() -> Registry<TestCtx> {
    let mut registry = Registry::<TestCtx>::new().with_standard_leaves();
    registry.register("Succeed", succeed).unwrap();
    registry.register("Fail", fail).unwrap();
    registry.register("Pending", pending).unwrap();
    registry.register("Emit", emit).unwrap();
    registry.register("Record", record).unwrap();
    registry
}

/// Compiles `root` as tree "test" and creates a fresh instance of it.
pub(crate) fn instance(root: NodeDef) -> TreeInstance<TestCtx> {
    let tree = BehaviorTree::compile(&TreeDef::new("test", root), &registry()).unwrap();
    TreeInstance::new(Arc::new(tree), TestCtx::default())
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .with_test_writer()
        .try_init();
}
