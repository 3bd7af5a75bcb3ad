use std::fmt;

use crate::descriptor::Descriptor;
use crate::value::Value;

/// Outcome of a top-level check.
///
/// Equality and truthiness both reduce to the pass/fail flag.
#[derive(Debug, Clone)]
pub struct CheckResult {
    value: Value,
    descriptor: Descriptor,
    passed: bool,
    reason: Option<String>,
}

impl CheckResult {
    pub fn pass(value: Value, descriptor: Descriptor) -> Self {
        Self {
            value,
            descriptor,
            passed: true,
            reason: None,
        }
    }

    pub fn fail(value: Value, descriptor: Descriptor, reason: impl Into<String>) -> Self {
        Self {
            value,
            descriptor,
            passed: false,
            reason: Some(reason.into()),
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Why the check failed. `None` on success.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// One-line summary: `[1, 2] is list[int] => true`.
    pub fn summary(&self) -> String {
        format!("{} is {} => {}", self.value, self.descriptor, self.passed)
    }
}

impl PartialEq for CheckResult {
    fn eq(&self, other: &Self) -> bool {
        self.passed == other.passed
    }
}

impl PartialEq<bool> for CheckResult {
    fn eq(&self, other: &bool) -> bool {
        self.passed == *other
    }
}

impl From<CheckResult> for bool {
    fn from(result: CheckResult) -> bool {
        result.passed
    }
}

impl From<&CheckResult> for bool {
    fn from(result: &CheckResult) -> bool {
        result.passed
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reason, self.passed) {
            (Some(reason), _) => write!(f, "{reason}"),
            (None, true) => write!(f, "Type check passed"),
            (None, false) => write!(f, "Type check failed"),
        }
    }
}
