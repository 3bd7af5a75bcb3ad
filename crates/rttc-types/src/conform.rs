//! Capability seam between the engine and custom conformance routines.

use crate::chain::Chain;
use crate::descriptor::Descriptor;
use crate::error::CheckOutcome;
use crate::value::Value;

/// Recursion handle handed to builtin and custom checkers.
///
/// Implemented by the engine; checkers call back into it for every nested
/// value so the active configuration and registry apply all the way down.
pub trait Walk {
    fn walk(&self, value: &Value, descriptor: &Descriptor, chain: &Chain<'_>) -> CheckOutcome;
}

/// A custom conformance routine, attached to a class (type-level) or to a
/// single instance (instance-level). Consulted before any builtin rule.
pub trait Conform: Send + Sync {
    /// Name used when reporting a broken routine.
    fn name(&self) -> &str;

    /// Calling contract: whether the routine handles `arity` type arguments.
    fn accepts(&self, arity: usize) -> bool {
        let _ = arity;
        true
    }

    /// Check `value` against the descriptor's type arguments.
    fn conform(
        &self,
        walker: &dyn Walk,
        value: &Value,
        args: &[Descriptor],
        chain: &Chain<'_>,
    ) -> CheckOutcome;
}
