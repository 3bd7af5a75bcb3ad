//! Guarded callables: the return value is asserted against a declared
//! descriptor before it reaches the caller.

use std::fmt;

use rttc_check::{assert_conforms_with, Config};
use rttc_types::{CheckError, Descriptor, Value};
use tracing::{debug, warn};

/// A named function whose results must conform to `returns`.
#[derive(Clone)]
pub struct GuardedFn<F> {
    name: String,
    returns: Descriptor,
    func: F,
    config: Config,
}

impl<F> GuardedFn<F> {
    pub fn new(name: impl Into<String>, returns: Descriptor, func: F) -> Self {
        Self {
            name: name.into(),
            returns,
            func,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn returns(&self) -> &Descriptor {
        &self.returns
    }

    /// Invoke the function and assert its result.
    ///
    /// A non-conforming result is returned as [`CheckError::Failure`]; a
    /// malformed return descriptor surfaces as [`CheckError::Construction`].
    pub fn call<A, R>(&self, args: A) -> Result<Value, CheckError>
    where
        F: Fn(A) -> R,
        R: Into<Value>,
    {
        let result = (self.func)(args).into();
        match assert_conforms_with(&result, &self.returns, self.config) {
            Ok(()) => {
                debug!(function = %self.name, returns = %self.returns, "guarded call passed");
                Ok(result)
            }
            Err(err) => {
                warn!(function = %self.name, returns = %self.returns, error = %err, "guarded call rejected");
                Err(err)
            }
        }
    }
}

impl<F> fmt::Debug for GuardedFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedFn")
            .field("name", &self.name)
            .field("returns", &self.returns)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<F> fmt::Display for GuardedFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(...) -> {}", self.name, self.returns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rttc_types::Builtin;

    #[test]
    fn test_display_shows_signature() {
        let guarded = GuardedFn::new("ident", Descriptor::list(Builtin::Int.into()), |v: Value| v);
        assert_eq!(guarded.to_string(), "ident(...) -> list[int]");
    }

    #[test]
    fn test_passing_call_returns_value() {
        let guarded = GuardedFn::new("one", Builtin::Int.into(), |()| 1i64);
        assert_eq!(guarded.call(()).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_construction_error_is_not_swallowed() {
        let guarded = GuardedFn::new("param", Descriptor::param("T"), |()| Value::None);
        let err = guarded.call(()).unwrap_err();
        assert!(err.as_construction().is_some());
    }
}
