//! Host-supplied leaf kinds.
//!
//! This module defines the [`Behavior`] trait, the extension point through
//! which a host adds domain actions and conditions (move, attack, query the
//! world) to the closed set of built-in control-flow kinds. The trait is
//! generic over the host context type `C`, allowing leaves to read the
//! world/time handle and the owner entity.

use crate::{NodeDef, Result, RunEnv, Status, Value, tree::Node};

/// The result of running a leaf: a status plus positional output values.
///
/// Output values are written to the node's declared `output` variables in
/// order. Returning more values than declared outputs is a protocol error;
/// returning fewer leaves the remaining variables untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: Status,
    pub outputs: Vec<Value>,
}

impl Outcome {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            outputs: Vec::new(),
        }
    }

    /// Appends an output value (builder pattern).
    #[must_use]
    pub fn with_output(mut self, value: impl Into<Value>) -> Self {
        self.outputs.push(value.into());
        self
    }
}

impl From<Status> for Outcome {
    #[inline]
    fn from(status: Status) -> Self {
        Self::new(status)
    }
}

/// A leaf node kind registered by the host.
pub trait Behavior<C>: Send + Sync {
    /// Run this leaf for `node`.
    ///
    /// # Arguments
    ///
    /// * `node` - The compiled node being invoked (id, args, declared variables).
    /// * `env` - The instance environment. Use [`RunEnv::resume`] to detect a
    ///   re-entry after `Running` and [`RunEnv::suspend`] to record
    ///   continuation state before returning `Running`.
    /// * `inputs` - Values of the node's declared `input` variables, in order.
    ///   Unset variables read as [`Value::Nil`].
    fn run(&self, node: &Node<C>, env: &mut RunEnv<C>, inputs: &[Value]) -> Result<Outcome>;

    /// Check a node definition when the tree is compiled.
    ///
    /// Errors returned here abort compilation, so authoring mistakes such as
    /// missing arguments surface before the first tick.
    fn validate(&self, _def: &NodeDef) -> Result<()> {
        Ok(())
    }
}

/// Plain functions and closures can be registered directly.
impl<C, F> Behavior<C> for F
where
    F: Fn(&Node<C>, &mut RunEnv<C>, &[Value]) -> Result<Outcome> + Send + Sync,
{
    #[inline]
    fn run(&self, node: &Node<C>, env: &mut RunEnv<C>, inputs: &[Value]) -> Result<Outcome> {
        self(node, env, inputs)
    }
}
