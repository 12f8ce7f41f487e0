//! Node invocation and the tick/resume loop.
//!
//! Every node runs through [`invoke`], which maintains the suspended-node
//! stack: a node entered fresh is pushed, a node that finishes is popped and
//! loses its continuation. [`tick`] either walks the tree from the root or,
//! while nodes are suspended, re-invokes the stack top and bubbles each
//! finished child's status up to its parent until something is `Running`
//! again or the stack is empty.

use crate::env::continuation_mismatch;
use crate::tree::NodeKind;
use crate::{BehaviorTree, BtError, Continuation, Node, NodeIdx, Outcome, Result, RunEnv, Status, Value};

/// Invokes the node at `idx`.
///
/// `resumed` carries the status of the child that just finished when the
/// node is re-entered by the resume loop; it is `None` on fresh entry and
/// when a suspended leaf is re-invoked.
///
/// On error the stack is unwound to the depth it had before this call, so
/// nodes entered fresh during the failed invocation never stay suspended.
pub(crate) fn invoke<C>(
    tree: &BehaviorTree<C>,
    idx: NodeIdx,
    env: &mut RunEnv<C>,
    resumed: Option<Status>,
) -> Result<Status> {
    let depth = env.stack().len();
    let result = run_node(tree, idx, env, resumed);
    if result.is_err() {
        env.unwind(depth);
    }
    result
}

fn run_node<C>(
    tree: &BehaviorTree<C>,
    idx: NodeIdx,
    env: &mut RunEnv<C>,
    resumed: Option<Status>,
) -> Result<Status> {
    let node = tree.node(idx);
    let fresh = env.continuation(idx).is_none();
    if fresh {
        env.push(idx);
    }
    if node.debug() {
        tracing::debug!(
            target: "tick_tree::trace",
            tree = tree.name(),
            id = node.id(),
            kind = node.name(),
            fresh,
            resumed = ?resumed,
            "enter"
        );
    }

    let inputs: Vec<Value> = node
        .inputs()
        .iter()
        .map(|var| env.blackboard().read(var))
        .collect();

    let Outcome { status, outputs } = match &node.kind {
        NodeKind::Composite(kind) => kind.run(tree, node, env, &inputs, resumed)?.into(),
        NodeKind::Decorator(kind) => kind.run(tree, node, env, resumed)?.into(),
        NodeKind::Condition(cmp) => cmp.run(node, &inputs)?.into(),
        NodeKind::Leaf(behavior) => behavior.run(node, env, &inputs)?,
    };

    if outputs.len() > node.outputs().len() {
        return Err(BtError::UnexpectedOutputs {
            id: node.id(),
            name: node.name().to_owned(),
            returned: outputs.len(),
            declared: node.outputs().len(),
        });
    }

    if status.is_running() {
        // A node suspending without a payload still needs a slot, otherwise
        // the next entry would push it a second time.
        if env.continuation(idx).is_none() {
            env.suspend(node, Continuation::Yielded);
        }
    } else {
        env.clear_continuation(idx);
        env.pop(idx);
    }

    for (var, value) in node.outputs().iter().zip(outputs) {
        env.blackboard_mut().set(var.as_str(), value);
    }
    env.finish(status);

    if node.debug() {
        tracing::debug!(
            target: "tick_tree::trace",
            tree = tree.name(),
            id = node.id(),
            kind = node.name(),
            %status,
            "exit"
        );
    }
    Ok(status)
}

/// Runs one tick of `tree` against `env` and returns the last status
/// produced: `Running` if the tree is suspended, otherwise the root's result.
pub(crate) fn tick<C>(tree: &BehaviorTree<C>, env: &mut RunEnv<C>) -> Result<Status> {
    let tick = env.begin_tick();

    let Some(mut top) = env.top() else {
        tracing::trace!(tree = tree.name(), tick, "fresh walk");
        return invoke(tree, NodeIdx::ROOT, env, None);
    };

    tracing::trace!(tree = tree.name(), tick, depth = env.stack().len(), "resuming");
    let mut resumed = None;
    loop {
        let status = invoke(tree, top, env, resumed)?;
        if status.is_running() {
            return Ok(status);
        }
        match env.top() {
            Some(parent) => {
                top = parent;
                resumed = Some(status);
            }
            None => return Ok(status),
        }
    }
}

/// Takes the child status handed to a re-entered node, together with the
/// continuation the node recorded. Returns `None` on fresh entry.
pub(crate) fn reentry<C>(
    node: &Node<C>,
    env: &RunEnv<C>,
    resumed: Option<Status>,
) -> Result<Option<(Continuation, Status)>> {
    match (env.resume(node), resumed) {
        (None, _) => Ok(None),
        (Some(continuation), Some(status)) => Ok(Some((continuation.clone(), status))),
        (found, None) => Err(continuation_mismatch(node, found)),
    }
}
