//! Standard leaf kinds shipped with the engine.

use crate::env::continuation_mismatch;
use crate::{Behavior, Continuation, Node, NodeDef, Outcome, Result, RunEnv, Status, Value};

/// Source of the current time, in seconds, for time-based leaves.
///
/// Implemented by the host context so that `Wait` follows the host's game
/// clock rather than wall time.
pub trait Clock {
    fn now(&self) -> f64;
}

/// `Log`: emits its `str` argument and succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Log;

impl<C> Behavior<C> for Log {
    fn run(&self, node: &Node<C>, _env: &mut RunEnv<C>, _inputs: &[Value]) -> Result<Outcome> {
        let message = node.require_str("str")?;
        tracing::info!(target: "tick_tree::log", id = node.id(), "{message}");
        Ok(Status::Success.into())
    }

    fn validate(&self, def: &NodeDef) -> Result<()> {
        def.require_str("str").map(|_| ())
    }
}

/// `Wait`: stays `Running` until `duration` seconds of host time have
/// passed since it was entered, then succeeds.
///
/// The first entry never completes, even for a zero duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wait;

impl<C: Clock> Behavior<C> for Wait {
    fn run(&self, node: &Node<C>, env: &mut RunEnv<C>, _inputs: &[Value]) -> Result<Outcome> {
        let now = env.ctx().now();
        let deadline = match env.resume(node).cloned() {
            None => {
                let deadline = now + node.require_number("duration")?;
                return Ok(env.suspend(node, Continuation::Payload(Value::Number(deadline))).into());
            }
            Some(Continuation::Payload(Value::Number(deadline))) => deadline,
            Some(other) => return Err(continuation_mismatch(node, Some(&other))),
        };

        if now >= deadline {
            Ok(Status::Success.into())
        } else {
            Ok(Status::Running.into())
        }
    }

    fn validate(&self, def: &NodeDef) -> Result<()> {
        def.require_number("duration").map(|_| ())
    }
}
