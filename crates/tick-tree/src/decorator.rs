//! Decorator nodes.
//!
//! Decorators wrap a single child and rewrite its result. They keep no state
//! of their own: while the child is running the decorator is suspended with
//! [`Continuation::Yielded`](crate::Continuation::Yielded) and is re-entered
//! with the child's final status.

use crate::engine::{invoke, reentry};
use crate::tree::require_children;
use crate::{BehaviorTree, Node, NodeDef, Result, RunEnv, Status};

/// Built-in decorator kinds, named as in tree definitions.
///
/// Only `children[0]` is run. While it is `Running` the decorator returns
/// `Running` too, and it maps the child's result once the child finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr)]
pub enum Decorator {
    /// Inverts the result of its child.
    ///
    /// # Semantics
    ///
    /// - If the child returns `Success`, returns `Failure`
    /// - If the child returns `Failure`, returns `Success`
    ///
    /// This is analogous to a logical NOT (!) operation.
    Not,

    /// Runs its child and fails regardless of the result.
    ///
    /// # Semantics
    ///
    /// - If the child returns `Success` or `Failure`, returns `Failure`
    AlwaysFail,

    /// Runs its child and succeeds regardless of the result.
    ///
    /// # Semantics
    ///
    /// - If the child returns `Success` or `Failure`, returns `Success`
    ///
    /// Useful for optional actions that should not fail their parent.
    AlwaysSuccess,
}

impl Decorator {
    pub(crate) fn validate(self, def: &NodeDef) -> Result<()> {
        require_children(def, 1)
    }

    pub(crate) fn run<C>(
        self,
        tree: &BehaviorTree<C>,
        node: &Node<C>,
        env: &mut RunEnv<C>,
        resumed: Option<Status>,
    ) -> Result<Status> {
        let status = match reentry(node, env, resumed)? {
            Some((_, status)) => status,
            None => invoke(tree, node.children()[0], env, None)?,
        };
        Ok(self.apply(status))
    }

    /// Maps the child's status; `Running` always passes through.
    pub fn apply(self, status: Status) -> Status {
        match (self, status) {
            (_, Status::Running) => Status::Running,
            (Decorator::Not, status) => status.invert(),
            (Decorator::AlwaysFail, _) => Status::Failure,
            (Decorator::AlwaysSuccess, _) => Status::Success,
        }
    }
}
