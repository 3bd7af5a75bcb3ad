//! rttc guards: wrappers that run the conformance engine on whatever a
//! callable or constructor produces.
//!
//! - [`GuardedFn`] asserts a function's return value against a declared
//!   return descriptor.
//! - [`GuardedClass`] asserts each constructed instance against its class,
//!   and against the instantiated alias when type arguments are supplied.
//!
//! Conformance failures and construction errors both come back as
//! [`rttc_types::CheckError`]; neither is swallowed.

pub mod class;
pub mod function;

pub use class::{GuardedClass, Init};
pub use function::GuardedFn;
