//! Registry of host-supplied leaf kinds.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::action::{Clock, Log, Wait};
use crate::{Behavior, BtError, Composite, Decorator, Result, condition};

/// Maps type names to host leaf kinds.
///
/// Built-in composite, decorator and condition kinds are always available and
/// their names are reserved; the registry only holds the host's additions.
pub struct Registry<C> {
    leaves: HashMap<String, Arc<dyn Behavior<C>>>,
}

impl<C> Registry<C> {
    pub fn new() -> Self {
        Self {
            leaves: HashMap::new(),
        }
    }

    /// Registers `behavior` under `name`, replacing any previous host kind of
    /// the same name.
    ///
    /// # Errors
    ///
    /// Returns [`BtError::ReservedKind`] if `name` belongs to a built-in kind.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        behavior: impl Behavior<C> + 'static,
    ) -> Result<()> {
        let name = name.into();
        if is_reserved(&name) {
            return Err(BtError::ReservedKind(name));
        }
        self.insert(name, Arc::new(behavior));
        Ok(())
    }

    /// Adds the standard `Log` leaf, which needs nothing from the host context.
    #[must_use]
    pub fn with_log(mut self) -> Self {
        self.insert("Log".to_owned(), Arc::new(Log));
        self
    }

    /// Registers `behavior` under `name` (builder pattern).
    pub fn with(mut self, name: impl Into<String>, behavior: impl Behavior<C> + 'static) -> Result<Self> {
        self.register(name, behavior)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Behavior<C>>> {
        self.leaves.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.leaves.contains_key(name)
    }

    /// Names of all registered host kinds, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.leaves.keys().map(String::as_str)
    }

    fn insert(&mut self, name: String, behavior: Arc<dyn Behavior<C>>) {
        if self.leaves.insert(name.clone(), behavior).is_some() {
            tracing::debug!(kind = %name, "replaced registered node kind");
        }
    }
}

impl<C: Clock> Registry<C> {
    /// Adds the standard `Log` and `Wait` leaves.
    #[must_use]
    pub fn with_standard_leaves(self) -> Self {
        let mut registry = self.with_log();
        registry.insert("Wait".to_owned(), Arc::new(Wait));
        registry
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("leaves", &names).finish()
    }
}

/// Returns `true` if `name` is a built-in node kind.
pub fn is_reserved(name: &str) -> bool {
    Composite::from_str(name).is_ok() || Decorator::from_str(name).is_ok() || name == condition::NAME
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestCtx;
    use crate::{BehaviorTree, Node, NodeDef, Outcome, RunEnv, Status, TreeDef, TreeInstance, Value};

    fn succeed(_: &Node<TestCtx>, _: &mut RunEnv<TestCtx>, _: &[Value]) -> Result<Outcome> {
        Ok(Status::Success.into())
    }

    #[test]
    fn builtin_names_are_reserved() {
        let mut registry = Registry::<TestCtx>::new();
        for name in ["Sequence", "IfElse", "ForEach", "Not", "AlwaysFail", "Cmp"] {
            assert_eq!(
                registry.register(name, succeed),
                Err(BtError::ReservedKind(name.to_owned()))
            );
        }
        assert!(registry.names().next().is_none());
    }

    #[test]
    fn standard_leaves_are_registered() {
        let registry = Registry::<TestCtx>::new().with_standard_leaves();
        assert!(registry.contains("Log"));
        assert!(registry.contains("Wait"));
        assert!(!is_reserved("Log"));
    }

    #[test]
    fn log_is_available_without_a_clock() {
        let registry = Registry::<()>::new().with_log();
        assert!(registry.contains("Log"));
        assert!(!registry.contains("Wait"));

        let def = TreeDef::new("t", crate::builder::log(1, "no clock needed"));
        let tree = BehaviorTree::compile(&def, &registry).unwrap();
        let mut bt = TreeInstance::new(Arc::new(tree), ());
        assert_eq!(bt.tick().unwrap(), Status::Success);
    }

    #[test]
    fn standard_leaves_replace_host_kinds_of_the_same_name() {
        let mut registry = Registry::<TestCtx>::new();
        registry.register("Wait", succeed).unwrap();
        let registry = registry.with_standard_leaves();
        assert_eq!(registry.names().count(), 2);

        // `Wait` now validates its duration, which the host leaf did not.
        let def = TreeDef::new("t", NodeDef::new(1, "Wait"));
        assert!(matches!(
            BehaviorTree::compile(&def, &registry),
            Err(BtError::MissingArgument { id: 1, arg: "duration", .. })
        ));
    }

    #[test]
    fn reregistering_replaces_kind() {
        let mut registry = Registry::<TestCtx>::new();
        registry.register("Attack", succeed).unwrap();
        registry.register("Attack", succeed).unwrap();
        assert_eq!(registry.names().count(), 1);
    }
}
