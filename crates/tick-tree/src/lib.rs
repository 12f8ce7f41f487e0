//! Tick-driven, resumable behavior tree interpreter for game agents.
//!
//! Trees are loaded as plain data ([`TreeDef`]), compiled once per name into
//! an immutable [`BehaviorTree`], and shared by any number of
//! [`TreeInstance`]s, one per agent.
//!
//! - **Resumable**: a node returning `Running` records a [`Continuation`];
//!   the next tick resumes the suspended node instead of re-walking the tree
//! - **Explicit hand-off**: a finished child's status is passed to its parent
//!   on re-entry, never read back from shared state
//! - **Blackboard wiring**: nodes read declared `input` variables and write
//!   `output` variables on their instance's [`Blackboard`]
//! - **Closed built-ins, open leaves**: control flow is a fixed set of kinds;
//!   actions and conditions come from the host through [`Registry`]
//!
//! # Architecture
//!
//! - [`Status`]: Success, Failure or Running
//! - [`Behavior`]: Trait for host leaf kinds, plus the standard [`Log`] and [`Wait`]
//! - Composite nodes: [`Composite`] (`Sequence`, `Selector`, `Parallel`,
//!   `IfElse`, `ForEach`, `Loop`)
//! - Decorator nodes: [`Decorator`] (`Not`, `AlwaysFail`, `AlwaysSuccess`)
//! - Condition node: `Cmp`, see [`Comparison`]
//! - [`TreeLibrary`]: Registry plus cache of compiled trees
//!
//! # Example
//!
//! ```
//! use tick_tree::builder::*;
//! use tick_tree::{Clock, Registry, Status, TreeDef, TreeLibrary};
//!
//! struct World {
//!     time: f64,
//! }
//!
//! impl Clock for World {
//!     fn now(&self) -> f64 {
//!         self.time
//!     }
//! }
//!
//! let mut library = TreeLibrary::new(Registry::<World>::new().with_standard_leaves());
//! let def = TreeDef::new("idle", sequence(1, vec![log(2, "resting"), wait(3, 2.0)]));
//! let mut agent = library.create(&def, World { time: 0.0 }).unwrap();
//!
//! assert_eq!(agent.tick().unwrap(), Status::Running);
//! agent.ctx_mut().time = 2.0;
//! assert_eq!(agent.tick().unwrap(), Status::Success);
//! ```

pub mod action;
pub mod behavior;
pub mod builder;
pub mod composite;
pub mod condition;
pub mod decorator;
pub mod def;
mod engine;
pub mod env;
pub mod error;
pub mod instance;
pub mod registry;
pub mod status;
pub mod tree;
pub mod value;

#[cfg(test)]
mod testing;

// Re-export core types for ergonomic API
pub use action::{Clock, Log, Wait};
pub use behavior::{Behavior, Outcome};
pub use composite::Composite;
pub use condition::{CmpOp, Comparison};
pub use decorator::Decorator;
pub use def::{Args, NodeDef, TreeDef};
pub use env::{Branch, Continuation, RunEnv};
pub use error::{BtError, ErrorKind, Result};
pub use instance::{TreeInstance, TreeLibrary};
pub use registry::Registry;
pub use status::Status;
pub use tree::{BehaviorTree, Node, NodeIdx};
pub use value::{Blackboard, Value};
