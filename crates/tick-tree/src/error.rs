//! Error types for tree compilation and ticking.
//!
//! Errors are reserved for authoring and programming mistakes. A node that
//! simply does not succeed reports [`Status::Failure`](crate::Status::Failure)
//! and never produces a [`BtError`].
//!
//! # Propagation
//!
//! Any error aborts the current `tick()` as-is. Continuation state is left
//! exactly as it was before the failing invocation, so callers should
//! `interrupt()` the instance before ticking it again.

/// Classification of [`BtError`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The tree definition or registry is wrong: unknown kind, missing
    /// argument, bad child count, wrongly typed input.
    Configuration,

    /// A node kind broke the invocation contract, e.g. returned more output
    /// values than it declares or was resumed with a foreign continuation.
    Protocol,
}

/// Errors surfaced while compiling or ticking a behavior tree.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BtError {
    #[error("node {id}: unknown node kind '{name}'")]
    UnknownKind { id: u32, name: String },

    #[error("node kind '{0}' is reserved for a built-in node")]
    ReservedKind(String),

    #[error("tree '{tree}': duplicate node id {id}")]
    DuplicateNodeId { tree: String, id: u32 },

    #[error("node {id} ({name}): requires at least {min} children, found {found}")]
    MissingChildren {
        id: u32,
        name: String,
        min: usize,
        found: usize,
    },

    #[error("node {id} ({name}): leaf nodes cannot have children")]
    UnexpectedChildren { id: u32, name: String },

    #[error("node {id} ({name}): must declare at least one {what} variable")]
    MissingDeclaration {
        id: u32,
        name: String,
        what: &'static str,
    },

    #[error("node {id} ({name}): missing argument '{arg}'")]
    MissingArgument {
        id: u32,
        name: String,
        arg: &'static str,
    },

    #[error("node {id} ({name}): argument '{arg}' must be a {expected}")]
    InvalidArgument {
        id: u32,
        name: String,
        arg: String,
        expected: &'static str,
    },

    #[error("node {id} (Cmp): no comparison configured (expected one of gt, ge, eq, le, lt)")]
    NoComparison { id: u32 },

    #[error("node {id} ({name}): input '{var}' is not set")]
    MissingInput { id: u32, name: String, var: String },

    #[error("node {id} ({name}): input '{var}' must be a {expected}, found {found}")]
    InvalidInput {
        id: u32,
        name: String,
        var: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("node {id} ({name}): returned {returned} output values but declares {declared}")]
    UnexpectedOutputs {
        id: u32,
        name: String,
        returned: usize,
        declared: usize,
    },

    #[error("node {id} ({name}): resumed with unexpected continuation {found}")]
    ContinuationMismatch {
        id: u32,
        name: String,
        found: String,
    },
}

impl BtError {
    /// Returns which part of the error taxonomy this error belongs to.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedOutputs { .. } | Self::ContinuationMismatch { .. } => {
                ErrorKind::Protocol
            }
            _ => ErrorKind::Configuration,
        }
    }

    /// Returns the id of the node that caused the error, if any.
    pub const fn node_id(&self) -> Option<u32> {
        match self {
            Self::UnknownKind { id, .. }
            | Self::DuplicateNodeId { id, .. }
            | Self::MissingChildren { id, .. }
            | Self::UnexpectedChildren { id, .. }
            | Self::MissingDeclaration { id, .. }
            | Self::MissingArgument { id, .. }
            | Self::InvalidArgument { id, .. }
            | Self::NoComparison { id }
            | Self::MissingInput { id, .. }
            | Self::InvalidInput { id, .. }
            | Self::UnexpectedOutputs { id, .. }
            | Self::ContinuationMismatch { id, .. } => Some(*id),
            Self::ReservedKind(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_are_classified() {
        let err = BtError::UnexpectedOutputs {
            id: 3,
            name: "FindEnemy".into(),
            returned: 2,
            declared: 1,
        };
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.node_id(), Some(3));
    }

    #[test]
    fn configuration_errors_are_classified() {
        let err = BtError::NoComparison { id: 9 };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.kind().as_ref(), "configuration");
        assert!(err.to_string().contains("no comparison configured"));
    }
}
