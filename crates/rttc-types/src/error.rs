use thiserror::Error;

use crate::chain::{render_path, Chain, Segment};
use crate::descriptor::Descriptor;
use crate::value::Value;

// ══════════════════════════════════════════════════════════════════════════════
// CheckFailure
// ══════════════════════════════════════════════════════════════════════════════

/// A value does not conform. Raised at the depth where the mismatch is
/// found and propagated unchanged up to the check boundary.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", self.message())]
pub struct CheckFailure {
    /// Root-to-leaf location of the offending value.
    pub path: Vec<Segment>,
    /// Descriptors the value was expected to match.
    pub expected: Vec<Descriptor>,
    /// The offending value.
    pub value: Value,
}

impl CheckFailure {
    pub fn new(chain: &Chain<'_>, expected: Vec<Descriptor>, value: &Value) -> Self {
        Self {
            path: chain.segments(),
            expected,
            value: value.clone(),
        }
    }

    /// Rendered location; empty for a top-level failure.
    pub fn location(&self) -> String {
        render_path(&self.path)
    }

    /// Human-readable reason:
    /// `list[1][1] = str('4') is not int` or, at the root, `float(1.0) is not int`.
    pub fn message(&self) -> String {
        let expected = self
            .expected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ");
        // Instances already render as `Name(...)`.
        let got = match &self.value {
            Value::Object(obj) => obj.to_string(),
            other => format!("{}({other})", other.type_name()),
        };
        let location = self.location();
        if location.is_empty() {
            format!("{got} is not {expected}")
        } else {
            format!("{location} = {got} is not {expected}")
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// ConstructionError
// ══════════════════════════════════════════════════════════════════════════════

/// The check itself is ill-formed. Never a property of the data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// A positional descriptor does not match the sequence length.
    #[error("{container} of length {len} cannot be checked against {args} type arguments")]
    Length {
        container: String,
        len: usize,
        args: usize,
    },

    /// A container checker received the wrong number of type arguments.
    #[error("{container} takes {expected} type argument(s), got {found}")]
    Arity {
        container: String,
        expected: &'static str,
        found: usize,
    },

    /// A value admitted as a container carries no container data.
    #[error("{value} is admitted as {kind} but holds no {kind} data")]
    NotAContainer { value: String, kind: &'static str },

    /// Checking would consume or enumerate an opaque container.
    #[error("type check on {value} is potentially destructive")]
    Destructive { value: String },

    /// Strict mode: nothing could check the value's structure.
    #[error("{descriptor} declares no checkable structure")]
    Unsupported { descriptor: String },

    /// A field hint names a type parameter with no binding.
    #[error("type parameter {param} not instantiated")]
    Uninstantiated { param: String },

    /// A union with no alternatives admits nothing and cannot be checked.
    #[error("cannot check against a union of no types")]
    EmptyUnion,

    /// More type arguments than the class declares parameters.
    #[error("{class} declares {params} type parameter(s), got {args} type argument(s)")]
    ParamCount {
        class: String,
        params: usize,
        args: usize,
    },

    /// A custom conformance routine broke its calling contract.
    #[error("type checker {routine} not implemented correctly: {reason}")]
    Routine { routine: String, reason: String },
}

// ══════════════════════════════════════════════════════════════════════════════
// CheckError
// ══════════════════════════════════════════════════════════════════════════════

/// Either outcome of a failed walk.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    #[error(transparent)]
    Failure(#[from] CheckFailure),
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

impl CheckError {
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckError::Failure(_))
    }

    pub fn as_failure(&self) -> Option<&CheckFailure> {
        match self {
            CheckError::Failure(failure) => Some(failure),
            CheckError::Construction(_) => None,
        }
    }

    pub fn as_construction(&self) -> Option<&ConstructionError> {
        match self {
            CheckError::Failure(_) => None,
            CheckError::Construction(err) => Some(err),
        }
    }

    /// Split at a check boundary: construction errors go out as `Err`,
    /// conformance failures come back as `Ok` to be reported.
    pub fn into_construction(self) -> Result<CheckFailure, ConstructionError> {
        match self {
            CheckError::Failure(failure) => Ok(failure),
            CheckError::Construction(err) => Err(err),
        }
    }
}

/// Result of one recursive conformance step.
pub type CheckOutcome = Result<(), CheckError>;
