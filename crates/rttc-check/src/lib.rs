//! rttc conformance engine: decides whether a runtime value conforms to a
//! type descriptor.
//!
//! ```text
//! value + descriptor → Engine → unions / literals / nominal test
//!                             → custom routine | container checker | class fields
//!                             → CheckResult (or ConstructionError)
//! ```
//!
//! The free functions below run against the process-wide [`Registry`]; build
//! an [`Engine`] directly to use a private registry.

pub mod builtins;
pub mod config;
pub mod engine;
pub mod registry;

pub use config::{Config, ConfigError};
pub use engine::Engine;
pub use registry::{global_registry, register_container_checker, ContainerCheckFn, Registry};

use rttc_types::{CheckOutcome, CheckResult, ConstructionError, Descriptor, Value};

/// Check `value` against `descriptor` with the default [`Config`].
pub fn check(value: &Value, descriptor: &Descriptor) -> Result<CheckResult, ConstructionError> {
    check_with(value, descriptor, Config::default())
}

/// Check `value` against `descriptor`.
pub fn check_with(
    value: &Value,
    descriptor: &Descriptor,
    config: Config,
) -> Result<CheckResult, ConstructionError> {
    let registry = global_registry();
    Engine::new(&registry, config).check(value, descriptor)
}

/// Assert that `value` conforms, without building a [`CheckResult`].
pub fn assert_conforms(value: &Value, descriptor: &Descriptor) -> CheckOutcome {
    assert_conforms_with(value, descriptor, Config::default())
}

/// Assert that `value` conforms under `config`.
pub fn assert_conforms_with(value: &Value, descriptor: &Descriptor, config: Config) -> CheckOutcome {
    let registry = global_registry();
    Engine::new(&registry, config).assert_value(value, descriptor)
}
