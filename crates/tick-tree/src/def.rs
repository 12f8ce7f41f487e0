//! Tree definition format.
//!
//! These types mirror the serialized tree shape consumed by the engine:
//!
//! ```json
//! { "name": "guard", "desc": "optional", "root": {
//!     "id": 1, "name": "Sequence", "args": {}, "input": [], "output": [],
//!     "children": [ ... ], "debug": false } }
//! ```
//!
//! Decoding from text is left to the host (with the `serde` feature any serde
//! format works). Definitions are plain data; they are compiled into an
//! immutable [`BehaviorTree`](crate::BehaviorTree) before use.

use std::collections::BTreeMap;

use crate::{BtError, Result, Value};

/// Literal arguments of a node, keyed by parameter name.
pub type Args = BTreeMap<String, Value>;

/// A named tree definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeDef {
    /// Tree name; compiled trees are cached under this key.
    pub name: String,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub desc: Option<String>,

    pub root: NodeDef,
}

impl TreeDef {
    pub fn new(name: impl Into<String>, root: NodeDef) -> Self {
        Self {
            name: name.into(),
            desc: None,
            root,
        }
    }

    #[must_use]
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }
}

/// One node of a tree definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeDef {
    /// Unique within one tree and stable across loads; continuation state
    /// is keyed by it.
    pub id: u32,

    /// Node kind name, resolved against built-ins and the registry.
    pub name: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub args: Args,

    /// Blackboard variables read before invocation, in positional order.
    #[cfg_attr(feature = "serde", serde(default, rename = "input"))]
    pub inputs: Vec<String>,

    /// Blackboard variables written from the node's extra return values.
    #[cfg_attr(feature = "serde", serde(default, rename = "output"))]
    pub outputs: Vec<String>,

    /// Ordered children; order is significant for every composite.
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<NodeDef>,

    /// Enables diagnostic tracing for this node only.
    #[cfg_attr(feature = "serde", serde(default))]
    pub debug: bool,
}

impl NodeDef {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            args: Args::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            children: Vec::new(),
            debug: false,
        }
    }

    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_input(mut self, var: impl Into<String>) -> Self {
        self.inputs.push(var.into());
        self
    }

    #[must_use]
    pub fn with_output(mut self, var: impl Into<String>) -> Self {
        self.outputs.push(var.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<NodeDef>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Visits this node and all descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a NodeDef)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        let mut n = 0;
        self.walk(&mut |_| n += 1);
        n
    }

    /// Returns the numeric argument `arg`, failing if it is absent or not a number.
    pub fn require_number(&self, arg: &'static str) -> Result<f64> {
        require_number(self.id, &self.name, &self.args, arg)
    }

    /// Returns the string argument `arg`, failing if it is absent or not a string.
    pub fn require_str(&self, arg: &'static str) -> Result<&str> {
        require_str(self.id, &self.name, &self.args, arg)
    }
}

pub(crate) fn require_number(id: u32, name: &str, args: &Args, arg: &'static str) -> Result<f64> {
    match args.get(arg) {
        None | Some(Value::Nil) => Err(BtError::MissingArgument {
            id,
            name: name.to_owned(),
            arg,
        }),
        Some(value) => value.as_number().ok_or_else(|| BtError::InvalidArgument {
            id,
            name: name.to_owned(),
            arg: arg.to_owned(),
            expected: "number",
        }),
    }
}

pub(crate) fn require_str<'a>(
    id: u32,
    name: &str,
    args: &'a Args,
    arg: &'static str,
) -> Result<&'a str> {
    match args.get(arg) {
        None | Some(Value::Nil) => Err(BtError::MissingArgument {
            id,
            name: name.to_owned(),
            arg,
        }),
        Some(value) => value.as_str().ok_or_else(|| BtError::InvalidArgument {
            id,
            name: name.to_owned(),
            arg: arg.to_owned(),
            expected: "string",
        }),
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn decodes_tree_json_with_optional_fields() {
        let json = r#"{
            "name": "patrol",
            "root": {
                "id": 1,
                "name": "Sequence",
                "children": [
                    { "id": 2, "name": "GetHp", "output": ["hp"] },
                    { "id": 3, "name": "Cmp", "args": { "lt": 50 }, "input": ["hp"] },
                    { "id": 4, "name": "Log", "args": { "str": "low hp" }, "debug": true }
                ]
            }
        }"#;

        let def: TreeDef = serde_json::from_str(json).unwrap();
        assert_eq!(def.name, "patrol");
        assert_eq!(def.desc, None);
        assert_eq!(def.root.count(), 4);

        let cmp = &def.root.children[1];
        assert_eq!(cmp.inputs, vec!["hp".to_string()]);
        assert_eq!(cmp.args.get("lt"), Some(&Value::Number(50.0)));

        let log = &def.root.children[2];
        assert!(log.debug);
        assert_eq!(log.args.get("str"), Some(&Value::from("low hp")));
    }

    #[test]
    fn required_arguments_are_typed() {
        let def = NodeDef::new(7, "Wait").with_arg("duration", "soon");
        assert_eq!(
            def.require_number("duration"),
            Err(BtError::InvalidArgument {
                id: 7,
                name: "Wait".into(),
                arg: "duration".into(),
                expected: "number",
            })
        );
        assert!(matches!(
            def.require_str("str"),
            Err(BtError::MissingArgument { id: 7, arg: "str", .. })
        ));
    }

    #[test]
    fn walk_is_pre_order() {
        let def = NodeDef::new(1, "Selector").with_children(vec![
            NodeDef::new(2, "Sequence").with_children(vec![NodeDef::new(3, "A")]),
            NodeDef::new(4, "B"),
        ]);

        let mut ids = Vec::new();
        def.walk(&mut |node| ids.push(node.id));
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
