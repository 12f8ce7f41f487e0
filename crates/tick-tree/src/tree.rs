//! Compiled, immutable behavior trees.
//!
//! A [`BehaviorTree`] is compiled once per tree name from a [`TreeDef`] and
//! shared read-only (behind an `Arc`) by every instance running it. Nodes
//! live in a pre-order arena addressed by [`NodeIdx`]; per-instance state
//! such as continuations is kept in [`RunEnv`](crate::RunEnv) arenas indexed
//! the same way, so the tree itself is never mutated after compilation.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::condition::{self, Comparison};
use crate::{Args, Behavior, BtError, Composite, Decorator, NodeDef, Registry, Result, TreeDef, Value};

/// Index of a node inside its compiled tree. The root is always index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(u32);

impl NodeIdx {
    pub const ROOT: NodeIdx = NodeIdx(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a node is executed. Built-in control-flow kinds are matched
/// exhaustively; host leaves go through [`Behavior`].
pub(crate) enum NodeKind<C> {
    Composite(Composite),
    Decorator(Decorator),
    Condition(Comparison),
    Leaf(Arc<dyn Behavior<C>>),
}

impl<C> fmt::Debug for NodeKind<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Composite(kind) => f.debug_tuple("Composite").field(kind).finish(),
            NodeKind::Decorator(kind) => f.debug_tuple("Decorator").field(kind).finish(),
            NodeKind::Condition(cmp) => f.debug_tuple("Condition").field(cmp).finish(),
            NodeKind::Leaf(_) => f.write_str("Leaf"),
        }
    }
}

/// A compiled node.
#[derive(Debug)]
pub struct Node<C> {
    idx: NodeIdx,
    id: u32,
    name: String,
    args: Args,
    inputs: Vec<String>,
    outputs: Vec<String>,
    children: Vec<NodeIdx>,
    debug: bool,
    pub(crate) kind: NodeKind<C>,
}

impl<C> Node<C> {
    /// Position of this node in the tree arena.
    #[inline]
    pub fn idx(&self) -> NodeIdx {
        self.idx
    }

    /// Id from the tree definition.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Kind name from the tree definition.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    /// Returns the numeric argument `arg`, failing if it is absent or not a number.
    pub fn require_number(&self, arg: &'static str) -> Result<f64> {
        crate::def::require_number(self.id, &self.name, &self.args, arg)
    }

    /// Returns the string argument `arg`, failing if it is absent or not a string.
    pub fn require_str(&self, arg: &'static str) -> Result<&str> {
        crate::def::require_str(self.id, &self.name, &self.args, arg)
    }

    #[inline]
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    #[inline]
    pub fn children(&self) -> &[NodeIdx] {
        &self.children
    }

    #[inline]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Returns `true` for host-registered leaf kinds.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }
}

/// An immutable compiled tree.
#[derive(Debug)]
pub struct BehaviorTree<C> {
    name: String,
    desc: Option<String>,
    nodes: Vec<Node<C>>,
}

impl<C> BehaviorTree<C> {
    /// Compiles `def`, resolving every node kind against the built-ins and
    /// `registry`.
    ///
    /// # Errors
    ///
    /// Fails on the first configuration error found in pre-order: unknown
    /// kind, duplicate node id, child-count contract, missing declarations
    /// or arguments, or a leaf's own [`Behavior::validate`] check.
    pub fn compile(def: &TreeDef, registry: &Registry<C>) -> Result<Self> {
        let mut compiler = Compiler {
            tree: &def.name,
            registry,
            nodes: Vec::with_capacity(def.root.count()),
            seen: HashSet::new(),
        };
        compiler.node(&def.root)?;

        Ok(Self {
            name: def.name.clone(),
            desc: def.desc.clone(),
            nodes: compiler.nodes,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    #[inline]
    pub fn root(&self) -> &Node<C> {
        &self.nodes[NodeIdx::ROOT.index()]
    }

    /// Returns the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this tree.
    #[inline]
    pub fn node(&self, idx: NodeIdx) -> &Node<C> {
        &self.nodes[idx.index()]
    }

    /// Looks a node up by its definition id.
    pub fn find(&self, id: u32) -> Option<&Node<C>> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn nodes(&self) -> &[Node<C>] {
        &self.nodes
    }

    /// Number of nodes in the tree. Never zero.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

struct Compiler<'a, C> {
    tree: &'a str,
    registry: &'a Registry<C>,
    nodes: Vec<Node<C>>,
    seen: HashSet<u32>,
}

impl<C> Compiler<'_, C> {
    fn node(&mut self, def: &NodeDef) -> Result<NodeIdx> {
        if !self.seen.insert(def.id) {
            return Err(BtError::DuplicateNodeId {
                tree: self.tree.to_owned(),
                id: def.id,
            });
        }

        let kind = self.resolve(def)?;
        let idx = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(Node {
            idx,
            id: def.id,
            name: def.name.clone(),
            args: def.args.clone(),
            inputs: def.inputs.clone(),
            outputs: def.outputs.clone(),
            children: Vec::new(),
            debug: def.debug,
            kind,
        });

        let children = def
            .children
            .iter()
            .map(|child| self.node(child))
            .collect::<Result<Vec<_>>>()?;
        self.nodes[idx.index()].children = children;

        Ok(idx)
    }

    fn resolve(&self, def: &NodeDef) -> Result<NodeKind<C>> {
        if let Ok(kind) = Composite::from_str(&def.name) {
            kind.validate(def)?;
            return Ok(NodeKind::Composite(kind));
        }
        if let Ok(kind) = Decorator::from_str(&def.name) {
            kind.validate(def)?;
            return Ok(NodeKind::Decorator(kind));
        }
        if def.name == condition::NAME {
            reject_children(def)?;
            return Comparison::from_def(def).map(NodeKind::Condition);
        }

        let behavior = self
            .registry
            .get(&def.name)
            .ok_or_else(|| BtError::UnknownKind {
                id: def.id,
                name: def.name.clone(),
            })?;
        reject_children(def)?;
        behavior.validate(def)?;
        Ok(NodeKind::Leaf(Arc::clone(behavior)))
    }
}

fn reject_children(def: &NodeDef) -> Result<()> {
    if def.children.is_empty() {
        Ok(())
    } else {
        Err(BtError::UnexpectedChildren {
            id: def.id,
            name: def.name.clone(),
        })
    }
}

/// Fails unless `def` has at least `min` children.
pub(crate) fn require_children(def: &NodeDef, min: usize) -> Result<()> {
    if def.children.len() >= min {
        Ok(())
    } else {
        Err(BtError::MissingChildren {
            id: def.id,
            name: def.name.clone(),
            min,
            found: def.children.len(),
        })
    }
}

/// Fails unless `def` declares at least one variable in `vars`.
pub(crate) fn require_declared(def: &NodeDef, vars: &[String], what: &'static str) -> Result<()> {
    if vars.is_empty() {
        Err(BtError::MissingDeclaration {
            id: def.id,
            name: def.name.clone(),
            what,
        })
    } else {
        Ok(())
    }
}
