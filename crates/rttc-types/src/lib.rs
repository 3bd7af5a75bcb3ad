//! Shared types for rttc.
//!
//! This crate defines the runtime value model, type descriptors, class
//! declarations, location chains, and the failure/result types used by
//! the conformance engine and the guards built on it.

mod chain;
mod class;
mod conform;
mod descriptor;
mod error;
mod result;
mod value;

pub use chain::{render_path, Chain, Segment};
pub use class::{ClassBuilder, ClassDef, Field, Instance};
pub use conform::{Conform, Walk};
pub use descriptor::{Builtin, Descriptor, TypeKey, TypeRef};
pub use error::{CheckError, CheckFailure, CheckOutcome, ConstructionError};
pub use result::CheckResult;
pub use value::Value;
