//! Builder utilities for ergonomic tree definitions.
//!
//! This module provides helper functions to reduce boilerplate when writing
//! tree definitions in Rust. Instead of writing
//! `NodeDef::new(1, "Sequence").with_children(vec![...])`, you can use
//! shorter functions like `sequence(1, vec![...])`.

use crate::NodeDef;

/// Creates a sequence node.
#[inline]
pub fn sequence(id: u32, children: Vec<NodeDef>) -> NodeDef {
    NodeDef::new(id, "Sequence").with_children(children)
}

/// Creates a selector node.
#[inline]
pub fn selector(id: u32, children: Vec<NodeDef>) -> NodeDef {
    NodeDef::new(id, "Selector").with_children(children)
}

/// Creates a parallel node.
#[inline]
pub fn parallel(id: u32, children: Vec<NodeDef>) -> NodeDef {
    NodeDef::new(id, "Parallel").with_children(children)
}

/// Creates an if-else node. `otherwise` becomes the optional third child.
pub fn if_else(id: u32, condition: NodeDef, then: NodeDef, otherwise: Option<NodeDef>) -> NodeDef {
    let mut children = vec![condition, then];
    children.extend(otherwise);
    NodeDef::new(id, "IfElse").with_children(children)
}

/// Creates a for-each node iterating the list in `list_var`, exposing each
/// element to the children as `item_var`.
pub fn for_each(id: u32, list_var: &str, item_var: &str, children: Vec<NodeDef>) -> NodeDef {
    NodeDef::new(id, "ForEach")
        .with_input(list_var)
        .with_output(item_var)
        .with_children(children)
}

/// Creates a loop node running its children `count` times.
///
/// Named `repeat` since `loop` is a keyword.
pub fn repeat(id: u32, count: u32, children: Vec<NodeDef>) -> NodeDef {
    NodeDef::new(id, "Loop")
        .with_arg("count", count)
        .with_children(children)
}

/// Creates an inverter node.
#[inline]
pub fn not(id: u32, child: NodeDef) -> NodeDef {
    NodeDef::new(id, "Not").with_children(vec![child])
}

/// Creates an always-fail node.
#[inline]
pub fn always_fail(id: u32, child: NodeDef) -> NodeDef {
    NodeDef::new(id, "AlwaysFail").with_children(vec![child])
}

/// Creates an always-success node.
#[inline]
pub fn always_success(id: u32, child: NodeDef) -> NodeDef {
    NodeDef::new(id, "AlwaysSuccess").with_children(vec![child])
}

/// Creates a comparison node reading `var`. `op` is one of `gt`, `ge`, `eq`,
/// `le`, `lt`.
pub fn cmp(id: u32, var: &str, op: &str, rhs: f64) -> NodeDef {
    NodeDef::new(id, "Cmp").with_input(var).with_arg(op, rhs)
}

/// Creates a host leaf node of kind `name`.
#[inline]
pub fn leaf(id: u32, name: &str) -> NodeDef {
    NodeDef::new(id, name)
}

/// Creates a `Log` node.
#[inline]
pub fn log(id: u32, message: &str) -> NodeDef {
    NodeDef::new(id, "Log").with_arg("str", message)
}

/// Creates a `Wait` node.
#[inline]
pub fn wait(id: u32, duration: f64) -> NodeDef {
    NodeDef::new(id, "Wait").with_arg("duration", duration)
}
