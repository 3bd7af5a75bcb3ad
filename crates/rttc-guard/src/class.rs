//! Guarded constructors: every instance a [`GuardedClass`] builds is checked
//! against its class before it is handed out.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rttc_check::{assert_conforms_with, Config};
use rttc_types::{CheckError, ClassDef, Descriptor, Instance, Value};
use tracing::{debug, warn};

/// Constructor arguments for a guarded class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Init {
    attrs: BTreeMap<String, Value>,
    data: Option<Value>,
    type_args: Vec<Descriptor>,
}

impl Init {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the builtin payload for classes that extend a builtin container.
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Instantiate the class with explicit type arguments, as in `Pair[int, str](...)`.
    pub fn type_args(mut self, args: impl IntoIterator<Item = Descriptor>) -> Self {
        self.type_args = args.into_iter().collect();
        self
    }
}

/// A class whose constructor validates the instance it produces.
#[derive(Debug, Clone)]
pub struct GuardedClass {
    class: Arc<ClassDef>,
    config: Config,
}

impl GuardedClass {
    pub fn new(class: Arc<ClassDef>) -> Self {
        Self {
            class,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn class(&self) -> &Arc<ClassDef> {
        &self.class
    }

    /// Build an instance and assert it.
    ///
    /// The instance is always checked against the plain class. When `init`
    /// carries type arguments it is also checked against the instantiated
    /// alias, so `Pair[int, str](x=1, y=2)` is rejected at construction.
    pub fn construct(&self, init: Init) -> Result<Value, CheckError> {
        let Init {
            attrs,
            data,
            type_args,
        } = init;

        let mut instance = Instance::new(&self.class);
        for (name, value) in attrs {
            instance = instance.with_attr(name, value);
        }
        if let Some(data) = data {
            instance = instance.with_data(data);
        }
        let value = instance.into_value();

        self.assert(&value, &Descriptor::class(&self.class))?;
        if !type_args.is_empty() {
            self.assert(&value, &Descriptor::generic(&self.class, type_args))?;
        }
        debug!(class = self.class.name(), "guarded construction passed");
        Ok(value)
    }

    fn assert(&self, value: &Value, descriptor: &Descriptor) -> Result<(), CheckError> {
        assert_conforms_with(value, descriptor, self.config).map_err(|err| {
            warn!(class = self.class.name(), descriptor = %descriptor, error = %err, "guarded construction rejected");
            err
        })
    }
}

impl fmt::Display for GuardedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeGuard({})", self.class.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_class() {
        let guarded = GuardedClass::new(ClassDef::new("Point").build());
        assert_eq!(guarded.to_string(), "TypeGuard(Point)");
    }

    #[test]
    fn test_init_last_attr_wins() {
        let init = Init::new().attr("x", 1).attr("x", 2);
        assert_eq!(init.attrs.get("x"), Some(&Value::Int(2)));
    }
}
