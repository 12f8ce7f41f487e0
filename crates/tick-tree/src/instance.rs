//! Running tree instances and the compiled-tree cache.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{BehaviorTree, Blackboard, NodeDef, Registry, Result, RunEnv, Status, TreeDef, engine};

/// One agent's run of a compiled tree.
///
/// Instances share the immutable [`BehaviorTree`]; everything that changes
/// while ticking lives in the instance's own [`RunEnv`].
#[derive(Debug)]
pub struct TreeInstance<C> {
    tree: Arc<BehaviorTree<C>>,
    env: RunEnv<C>,
}

impl<C> TreeInstance<C> {
    pub fn new(tree: Arc<BehaviorTree<C>>, ctx: C) -> Self {
        let env = RunEnv::new(tree.len(), ctx);
        Self { tree, env }
    }

    /// Advances the tree by one tick.
    ///
    /// Walks from the root when idle; otherwise resumes the suspended nodes
    /// and bubbles results upward. Returns `Running` while the tree is
    /// mid-execution, else the root's result.
    ///
    /// # Errors
    ///
    /// Any configuration or protocol error raised by a node aborts the tick.
    /// Continuation state is left as it was, so [`interrupt`](Self::interrupt)
    /// before ticking again.
    pub fn tick(&mut self) -> Result<Status> {
        match engine::tick(&self.tree, &mut self.env) {
            Ok(status) => Ok(status),
            Err(err) => {
                tracing::warn!(
                    tree = self.tree.name(),
                    node = err.node_id(),
                    kind = %err.kind(),
                    "tick aborted: {err}"
                );
                Err(err)
            }
        }
    }

    /// Abandons any in-progress execution; the next tick starts from the
    /// root. The blackboard and host context are kept. No-op when idle.
    pub fn interrupt(&mut self) {
        if self.env.is_running() {
            tracing::debug!(tree = self.tree.name(), depth = self.env.stack().len(), "interrupted");
        }
        self.env.interrupt();
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.env.is_running()
    }

    /// Replaces the host context (world/time handle, owner).
    pub fn set_ctx(&mut self, ctx: C) {
        self.env.set_ctx(ctx);
    }

    #[inline]
    pub fn ctx(&self) -> &C {
        self.env.ctx()
    }

    #[inline]
    pub fn ctx_mut(&mut self) -> &mut C {
        self.env.ctx_mut()
    }

    #[inline]
    pub fn blackboard(&self) -> &Blackboard {
        self.env.blackboard()
    }

    #[inline]
    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        self.env.blackboard_mut()
    }

    /// Status produced by the most recent node invocation.
    pub fn last_status(&self) -> Option<Status> {
        self.env.last_status()
    }

    pub fn tick_count(&self) -> u64 {
        self.env.tick_count()
    }

    pub fn tree(&self) -> &Arc<BehaviorTree<C>> {
        &self.tree
    }

    pub fn env(&self) -> &RunEnv<C> {
        &self.env
    }
}

/// A registry plus the name-keyed cache of trees compiled against it.
///
/// A tree is compiled the first time its name is requested; later requests
/// for the same name return the cached tree, even if the definition passed
/// differs. Use [`evict`](Self::evict) to force recompilation.
#[derive(Debug)]
pub struct TreeLibrary<C> {
    registry: Registry<C>,
    trees: HashMap<String, Arc<BehaviorTree<C>>>,
}

impl<C> TreeLibrary<C> {
    pub fn new(registry: Registry<C>) -> Self {
        Self {
            registry,
            trees: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    /// Returns the tree cached under `def.name`, compiling it first if needed.
    pub fn compile(&mut self, def: &TreeDef) -> Result<Arc<BehaviorTree<C>>> {
        if let Some(tree) = self.trees.get(&def.name) {
            return Ok(Arc::clone(tree));
        }

        let tree = Arc::new(BehaviorTree::compile(def, &self.registry)?);
        tracing::debug!(tree = %def.name, nodes = tree.len(), "compiled tree");
        self.trees.insert(def.name.clone(), Arc::clone(&tree));
        Ok(tree)
    }

    /// Creates a fresh instance of `def` bound to `ctx`.
    pub fn create(&mut self, def: &TreeDef, ctx: C) -> Result<TreeInstance<C>> {
        Ok(TreeInstance::new(self.compile(def)?, ctx))
    }

    /// Shorthand for [`create`](Self::create) with an anonymous root.
    pub fn create_from_root(&mut self, name: &str, root: NodeDef, ctx: C) -> Result<TreeInstance<C>> {
        self.create(&TreeDef::new(name, root), ctx)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<BehaviorTree<C>>> {
        self.trees.get(name)
    }

    /// Drops the cached tree `name`. Running instances keep their copy.
    pub fn evict(&mut self, name: &str) -> Option<Arc<BehaviorTree<C>>> {
        self.trees.remove(name)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;
    use crate::testing::{TestCtx, registry};

    #[test]
    fn compiled_trees_are_cached_by_name() {
        let mut library = TreeLibrary::new(registry());
        let first = TreeDef::new("guard", leaf(1, "Succeed"));
        let second = TreeDef::new("guard", leaf(1, "Fail"));

        let a = library.compile(&first).unwrap();
        let b = library.compile(&second).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(library.len(), 1);

        // The first definition wins until evicted.
        let mut bt = library.create(&second, TestCtx::default()).unwrap();
        assert_eq!(bt.tick().unwrap(), Status::Success);

        library.evict("guard");
        let mut bt = library.create(&second, TestCtx::default()).unwrap();
        assert_eq!(bt.tick().unwrap(), Status::Failure);
    }

    #[test]
    fn failed_compilation_is_not_cached() {
        let mut library = TreeLibrary::new(registry());
        assert!(library.compile(&TreeDef::new("bad", leaf(1, "Teleport"))).is_err());
        assert!(library.is_empty());
        assert!(library.get("bad").is_none());
    }

    #[test]
    fn instances_share_tree_but_not_state() {
        let mut library = TreeLibrary::new(registry());
        let def = TreeDef::new(
            "t",
            sequence(
                1,
                vec![leaf(2, "Emit").with_arg("value", 1).with_output("x"), leaf(3, "Pending")],
            ),
        );
        let mut a = library.create(&def, TestCtx::default()).unwrap();
        let b = library.create(&def, TestCtx::default()).unwrap();

        assert_eq!(a.tick().unwrap(), Status::Running);
        assert!(a.is_running());
        assert!(!b.is_running());
        assert!(b.blackboard().is_empty());
        assert!(Arc::ptr_eq(a.tree(), b.tree()));
    }

    #[test]
    fn set_ctx_replaces_host_context() {
        let mut library = TreeLibrary::new(registry());
        let mut bt = library.create_from_root("wait", wait(1, 5.0), TestCtx::default()).unwrap();
        assert_eq!(bt.tick().unwrap(), Status::Running);

        let mut later = TestCtx::default();
        later.time = 5.0;
        bt.set_ctx(later);
        assert_eq!(bt.tick().unwrap(), Status::Success);
        assert_eq!(bt.last_status(), Some(Status::Success));
        assert_eq!(bt.tick_count(), 2);
    }
}
