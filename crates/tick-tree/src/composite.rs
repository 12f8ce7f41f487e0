//! Composite behavior nodes.
//!
//! Composite nodes control the execution flow of multiple children, always
//! left to right. When a child returns `Running` the composite records where
//! it stopped and suspends; when that child later finishes, the resume loop
//! re-enters the composite with the child's status instead of re-running it.

use crate::engine::{invoke, reentry};
use crate::env::continuation_mismatch;
use crate::tree::{require_children, require_declared};
use crate::{BehaviorTree, BtError, Continuation, Branch, Node, NodeDef, Result, RunEnv, Status, Value};

/// Built-in composite kinds, named as in tree definitions.
///
/// Every kind evaluates its children from left to right. A child returning
/// `Running` suspends the composite as well; on the next tick only the
/// running child is re-invoked, and once it finishes the composite picks up
/// right after it with that child's result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr)]
pub enum Composite {
    /// Executes children in order until one fails.
    ///
    /// # Semantics
    ///
    /// - If a child returns `Failure`, the sequence **stops immediately** and returns `Failure`
    /// - If a child returns `Success`, the sequence **continues** to the next child
    /// - If a child returns `Running`, the sequence suspends at that child and
    ///   continues from it once it finishes
    /// - If all children return `Success` (or there are none), the sequence returns `Success`
    ///
    /// This is analogous to a short-circuited logical AND (&&) operation.
    Sequence,

    /// Executes children in order until one succeeds.
    ///
    /// # Semantics
    ///
    /// - If a child returns `Success`, the selector **stops immediately** and returns `Success`
    /// - If a child returns `Failure`, the selector **continues** to the next child
    /// - If a child returns `Running`, the selector suspends at that child and
    ///   continues from it once it finishes
    /// - If all children return `Failure` (or there are none), the selector returns `Failure`
    ///
    /// This is analogous to a short-circuited logical OR (||) operation.
    Selector,

    /// Executes every child once, ignoring their results.
    ///
    /// # Semantics
    ///
    /// - `Success` and `Failure` of a child both move on to the next child
    /// - If a child returns `Running`, the node pauses there; later children do
    ///   not run until the paused one finishes
    /// - Once every child has finished, returns `Success`
    Parallel,

    /// Branches on the result of its first child.
    ///
    /// # Semantics
    ///
    /// - Child 0 is the condition. While it is `Running`, so is the node
    /// - If the condition succeeds, child 1 runs and its result is returned
    /// - If the condition fails, child 2 runs and its result is returned, or
    ///   `Failure` when there is no child 2
    /// - A running branch is resumed directly; the condition is not re-evaluated
    ///
    /// Requires at least two children.
    IfElse,

    /// Executes all children once per element of a list.
    ///
    /// # Semantics
    ///
    /// - The first input must hold a list; the first output names the variable
    ///   that receives the current element before its children run
    /// - Child results are ignored; a `Running` child pauses the iteration at
    ///   that element and child
    /// - Returns `Success` after the last element (immediately for an empty list)
    ForEach,

    /// Executes all children a fixed number of times.
    ///
    /// # Semantics
    ///
    /// - The count is the first input when it holds a number, else the `count`
    ///   argument, truncated toward zero; negative counts run nothing
    /// - Child results are ignored; a `Running` child pauses the loop at that
    ///   iteration and child
    /// - Returns `Success` after the last iteration
    Loop,
}

impl Composite {
    pub(crate) fn validate(self, def: &NodeDef) -> Result<()> {
        match self {
            Composite::Sequence | Composite::Selector | Composite::Parallel => Ok(()),
            Composite::IfElse => require_children(def, 2),
            Composite::ForEach => {
                require_declared(def, &def.inputs, "input")?;
                require_declared(def, &def.outputs, "output")
            }
            Composite::Loop => match def.args.get("count") {
                Some(value) if value.as_number().is_none() => Err(BtError::InvalidArgument {
                    id: def.id,
                    name: def.name.clone(),
                    arg: "count".into(),
                    expected: "number",
                }),
                None if def.inputs.is_empty() => Err(BtError::MissingArgument {
                    id: def.id,
                    name: def.name.clone(),
                    arg: "count",
                }),
                _ => Ok(()),
            },
        }
    }

    pub(crate) fn run<C>(
        self,
        tree: &BehaviorTree<C>,
        node: &Node<C>,
        env: &mut RunEnv<C>,
        inputs: &[Value],
        resumed: Option<Status>,
    ) -> Result<Status> {
        match self {
            Composite::Sequence => sequence(tree, node, env, resumed),
            Composite::Selector => selector(tree, node, env, resumed),
            Composite::Parallel => parallel(tree, node, env, resumed),
            Composite::IfElse => if_else(tree, node, env, resumed),
            Composite::ForEach => for_each(tree, node, env, inputs, resumed),
            Composite::Loop => repeat(tree, node, env, inputs, resumed),
        }
    }
}

/// Child index to continue from after the child at a stored index finished
/// with `status`, or the status to return right away.
enum Next {
    From(usize),
    Return(Status),
}

fn resume_index<C>(
    node: &Node<C>,
    env: &RunEnv<C>,
    resumed: Option<Status>,
    on_finished: impl FnOnce(usize, Status) -> Next,
) -> Result<Next> {
    match reentry(node, env, resumed)? {
        None => Ok(Next::From(0)),
        Some((_, Status::Running)) => Ok(Next::Return(Status::Running)),
        Some((Continuation::Index(i), status)) => Ok(on_finished(i as usize, status)),
        Some((continuation, _)) => Err(continuation_mismatch(node, Some(&continuation))),
    }
}

fn sequence<C>(
    tree: &BehaviorTree<C>,
    node: &Node<C>,
    env: &mut RunEnv<C>,
    resumed: Option<Status>,
) -> Result<Status> {
    let start = match resume_index(node, env, resumed, |i, status| match status {
        Status::Success => Next::From(i + 1),
        other => Next::Return(other),
    })? {
        Next::From(start) => start,
        Next::Return(status) => return Ok(status),
    };

    for (i, &child) in node.children().iter().enumerate().skip(start) {
        match invoke(tree, child, env, None)? {
            Status::Success => continue,
            Status::Failure => return Ok(Status::Failure),
            Status::Running => return Ok(env.suspend(node, Continuation::Index(i as u32))),
        }
    }
    Ok(Status::Success)
}

fn selector<C>(
    tree: &BehaviorTree<C>,
    node: &Node<C>,
    env: &mut RunEnv<C>,
    resumed: Option<Status>,
) -> Result<Status> {
    let start = match resume_index(node, env, resumed, |i, status| match status {
        Status::Failure => Next::From(i + 1),
        other => Next::Return(other),
    })? {
        Next::From(start) => start,
        Next::Return(status) => return Ok(status),
    };

    for (i, &child) in node.children().iter().enumerate().skip(start) {
        match invoke(tree, child, env, None)? {
            Status::Failure => continue,
            Status::Success => return Ok(Status::Success),
            Status::Running => return Ok(env.suspend(node, Continuation::Index(i as u32))),
        }
    }
    Ok(Status::Failure)
}

fn parallel<C>(
    tree: &BehaviorTree<C>,
    node: &Node<C>,
    env: &mut RunEnv<C>,
    resumed: Option<Status>,
) -> Result<Status> {
    let start = match resume_index(node, env, resumed, |i, _| Next::From(i + 1))? {
        Next::From(start) => start,
        Next::Return(status) => return Ok(status),
    };

    for (i, &child) in node.children().iter().enumerate().skip(start) {
        if invoke(tree, child, env, None)?.is_running() {
            return Ok(env.suspend(node, Continuation::Index(i as u32)));
        }
    }
    Ok(Status::Success)
}

fn if_else<C>(
    tree: &BehaviorTree<C>,
    node: &Node<C>,
    env: &mut RunEnv<C>,
    resumed: Option<Status>,
) -> Result<Status> {
    let condition = match reentry(node, env, resumed)? {
        None => invoke(tree, node.children()[0], env, None)?,
        Some((_, Status::Running)) => return Ok(Status::Running),
        Some((Continuation::Branch(Branch::Condition), status)) => status,
        // A branch finished; its result is ours.
        Some((Continuation::Branch(Branch::Then | Branch::Else), status)) => return Ok(status),
        Some((continuation, _)) => return Err(continuation_mismatch(node, Some(&continuation))),
    };

    let branch = match condition {
        Status::Running => return Ok(env.suspend(node, Continuation::Branch(Branch::Condition))),
        Status::Success => Branch::Then,
        Status::Failure => Branch::Else,
    };
    let child = match branch {
        Branch::Then => node.children()[1],
        _ => match node.children().get(2) {
            Some(&child) => child,
            None => return Ok(Status::Failure),
        },
    };

    match invoke(tree, child, env, None)? {
        Status::Running => Ok(env.suspend(node, Continuation::Branch(branch))),
        status => Ok(status),
    }
}

/// Position to continue a nested (outer, inner) iteration from.
fn resume_pair<C>(
    node: &Node<C>,
    env: &RunEnv<C>,
    resumed: Option<Status>,
) -> Result<Option<(usize, usize)>> {
    match reentry(node, env, resumed)? {
        None => Ok(Some((0, 0))),
        Some((_, Status::Running)) => Ok(None),
        // The child at `inner` finished; its result does not matter.
        Some((Continuation::IndexPair(outer, inner), _)) => {
            Ok(Some((outer as usize, inner as usize + 1)))
        }
        Some((continuation, _)) => Err(continuation_mismatch(node, Some(&continuation))),
    }
}

fn for_each<C>(
    tree: &BehaviorTree<C>,
    node: &Node<C>,
    env: &mut RunEnv<C>,
    inputs: &[Value],
    resumed: Option<Status>,
) -> Result<Status> {
    let var = &node.inputs()[0];
    let items = match &inputs[0] {
        Value::List(items) => items,
        Value::Nil => {
            return Err(BtError::MissingInput {
                id: node.id(),
                name: node.name().to_owned(),
                var: var.clone(),
            });
        }
        other => {
            return Err(BtError::InvalidInput {
                id: node.id(),
                name: node.name().to_owned(),
                var: var.clone(),
                expected: "list",
                found: other.type_name(),
            });
        }
    };
    let item_var = node.outputs()[0].as_str();

    let Some((start_item, mut start_child)) = resume_pair(node, env, resumed)? else {
        return Ok(Status::Running);
    };

    for (i, item) in items.iter().enumerate().skip(start_item) {
        env.blackboard_mut().set(item_var, item.clone());
        for (j, &child) in node.children().iter().enumerate().skip(start_child) {
            if invoke(tree, child, env, None)?.is_running() {
                return Ok(env.suspend(node, Continuation::IndexPair(i as u32, j as u32)));
            }
        }
        start_child = 0;
    }
    Ok(Status::Success)
}

/// `Loop`; named `repeat` since `loop` is a keyword.
fn repeat<C>(
    tree: &BehaviorTree<C>,
    node: &Node<C>,
    env: &mut RunEnv<C>,
    inputs: &[Value],
    resumed: Option<Status>,
) -> Result<Status> {
    let count = match inputs.first().and_then(Value::as_number) {
        Some(count) => count,
        None => node.require_number("count")?,
    };
    // Truncates toward zero; NaN and negatives become zero.
    let count = count.max(0.0) as usize;

    let Some((start_iter, mut start_child)) = resume_pair(node, env, resumed)? else {
        return Ok(Status::Running);
    };

    for i in start_iter..count {
        for (j, &child) in node.children().iter().enumerate().skip(start_child) {
            if invoke(tree, child, env, None)?.is_running() {
                return Ok(env.suspend(node, Continuation::IndexPair(i as u32, j as u32)));
            }
        }
        start_child = 0;
    }
    Ok(Status::Success)
}
