//! Per-instance runtime state.
//!
//! The [`RunEnv`] holds everything that changes while a tree runs: the
//! blackboard, one continuation slot per node, the stack of suspended nodes
//! and the host context. The compiled tree it runs against stays immutable.

use crate::{Blackboard, BtError, Node, NodeIdx, Status, Value};

/// Which child of an `IfElse` node is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Branch {
    Condition,
    Then,
    Else,
}

/// State a node records before returning `Running`, handed back to it when
/// it is re-entered on a later tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Continuation {
    /// Suspended without payload.
    Yielded,
    /// Index of the running child (Sequence, Selector, Parallel).
    Index(u32),
    /// Outer and inner position (ForEach element/child, Loop iteration/child).
    IndexPair(u32, u32),
    /// Pending branch of an `IfElse`.
    Branch(Branch),
    /// Leaf-defined payload, e.g. the deadline of a `Wait`.
    Payload(Value),
}

/// Mutable state of one tree instance.
#[derive(Debug)]
pub struct RunEnv<C> {
    blackboard: Blackboard,
    continuations: Vec<Option<Continuation>>,
    stack: Vec<NodeIdx>,
    last_status: Option<Status>,
    ticks: u64,
    ctx: C,
}

impl<C> RunEnv<C> {
    /// Creates an environment for a tree of `node_count` nodes.
    pub fn new(node_count: usize, ctx: C) -> Self {
        Self {
            blackboard: Blackboard::new(),
            continuations: vec![None; node_count],
            stack: Vec::new(),
            last_status: None,
            ticks: 0,
            ctx,
        }
    }

    #[inline]
    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    #[inline]
    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// Host context (world/time handle, owner entity).
    #[inline]
    pub fn ctx(&self) -> &C {
        &self.ctx
    }

    #[inline]
    pub fn ctx_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    pub fn set_ctx(&mut self, ctx: C) {
        self.ctx = ctx;
    }

    /// Returns the continuation `node` recorded before it last returned
    /// `Running`, or `None` if it is being entered fresh.
    pub fn resume(&self, node: &Node<C>) -> Option<&Continuation> {
        self.continuation(node.idx())
    }

    /// Records `continuation` for `node` and returns `Status::Running`.
    ///
    /// The continuation is kept until the node returns `Success` or
    /// `Failure`, or the instance is interrupted.
    pub fn suspend(&mut self, node: &Node<C>, continuation: Continuation) -> Status {
        if let Some(slot) = self.continuations.get_mut(node.idx().index()) {
            *slot = Some(continuation);
        }
        Status::Running
    }

    /// Suspended nodes, root first. Non-empty while the tree is mid-execution.
    #[inline]
    pub fn stack(&self) -> &[NodeIdx] {
        &self.stack
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Status produced by the most recent node invocation.
    #[inline]
    pub fn last_status(&self) -> Option<Status> {
        self.last_status
    }

    /// Number of ticks started on this environment.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Drops every continuation and the suspended stack. The blackboard and
    /// host context are kept.
    pub fn interrupt(&mut self) {
        self.stack.clear();
        self.continuations.fill(None);
    }

    pub(crate) fn continuation(&self, idx: NodeIdx) -> Option<&Continuation> {
        self.continuations.get(idx.index()).and_then(Option::as_ref)
    }

    pub(crate) fn clear_continuation(&mut self, idx: NodeIdx) {
        if let Some(slot) = self.continuations.get_mut(idx.index()) {
            *slot = None;
        }
    }

    pub(crate) fn push(&mut self, idx: NodeIdx) {
        self.stack.push(idx);
    }

    pub(crate) fn pop(&mut self, idx: NodeIdx) {
        let top = self.stack.pop();
        debug_assert_eq!(top, Some(idx), "finished node must be the stack top");
    }

    /// Pops every node above `depth`, dropping their continuations.
    pub(crate) fn unwind(&mut self, depth: usize) {
        while self.stack.len() > depth {
            if let Some(idx) = self.stack.pop() {
                self.clear_continuation(idx);
            }
        }
    }

    pub(crate) fn top(&self) -> Option<NodeIdx> {
        self.stack.last().copied()
    }

    pub(crate) fn finish(&mut self, status: Status) {
        self.last_status = Some(status);
    }

    pub(crate) fn begin_tick(&mut self) -> u64 {
        self.ticks += 1;
        self.ticks
    }
}

/// Error for a node re-entered with a continuation it never records.
pub(crate) fn continuation_mismatch<C>(node: &Node<C>, found: Option<&Continuation>) -> BtError {
    BtError::ContinuationMismatch {
        id: node.id(),
        name: node.name().to_owned(),
        found: match found {
            Some(continuation) => format!("{continuation:?}"),
            None => "none".to_owned(),
        },
    }
}
