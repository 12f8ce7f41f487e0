//! The built-in `Cmp` condition.
//!
//! `Cmp` compares its first input against a literal threshold. The operator
//! is chosen by which argument key is present, checked in the order
//! `gt`, `ge`, `eq`, `le`, `lt`; the first one found wins.

use std::fmt;

use strum::IntoEnumIterator;

use crate::tree::require_declared;
use crate::{BtError, Node, NodeDef, Result, Status, Value};

/// Kind name of the comparison node.
pub const NAME: &str = "Cmp";

/// Comparison operator, keyed by its argument name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum CmpOp {
    Gt,
    Ge,
    Eq,
    Le,
    Lt,
}

impl CmpOp {
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Lt => lhs < rhs,
        }
    }
}

/// A resolved `Cmp` node: `input op rhs`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Comparison {
    pub op: CmpOp,
    pub rhs: f64,
}

impl Comparison {
    /// Resolves the operator and threshold from a `Cmp` definition.
    pub fn from_def(def: &NodeDef) -> Result<Self> {
        require_declared(def, &def.inputs, "input")?;

        let (op, value) = CmpOp::iter()
            .find_map(|op| def.args.get(op.as_ref()).map(|value| (op, value)))
            .ok_or(BtError::NoComparison { id: def.id })?;

        let rhs = value.as_number().ok_or_else(|| BtError::InvalidArgument {
            id: def.id,
            name: def.name.clone(),
            arg: op.to_string(),
            expected: "number",
        })?;
        Ok(Self { op, rhs })
    }

    pub(crate) fn run<C>(&self, node: &Node<C>, inputs: &[Value]) -> Result<Status> {
        let var = &node.inputs()[0];
        let lhs = match &inputs[0] {
            Value::Number(n) => *n,
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
                    expected: "number",
                    found: other.type_name(),
                });
            }
        };
        Ok(self.op.apply(lhs, self.rhs).into())
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.rhs)
    }
}
