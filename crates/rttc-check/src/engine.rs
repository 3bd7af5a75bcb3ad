//! The descriptor-walking engine.
//!
//! Entry points: [`Engine::check`] (converts conformance failures into a
//! [`CheckResult`]) and [`Engine::assert_conforms`] (the recursive walk).
//!
//! Dispatch per step:
//! 1. `Any` accepts; a bare `Param` is an uninstantiated template.
//! 2. Unions try each alternative from the same chain, first match wins.
//! 3. Literals test value equality.
//! 4. Plain types test the instance relation; scalars stop there, classes
//!    also walk their declared bases.
//! 5. Origins: type-level routine, then instance-level routine, then the
//!    container registry, then class field validation, then the strict policy.

use std::collections::HashMap;

use rttc_types::{
    Chain, CheckError, CheckFailure, CheckOutcome, CheckResult, ClassDef, Conform,
    ConstructionError, Descriptor, Segment, TypeRef, Value, Walk,
};
use tracing::{debug, trace};

use crate::config::Config;
use crate::registry::Registry;

// ══════════════════════════════════════════════════════════════════════════════
// Engine
// ══════════════════════════════════════════════════════════════════════════════

/// A configured walker over a borrowed checker registry.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'r> {
    registry: &'r Registry,
    config: Config,
}

impl<'r> Engine<'r> {
    pub fn new(registry: &'r Registry, config: Config) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check `value` against `descriptor`.
    ///
    /// Conformance failures become a failed [`CheckResult`]; construction
    /// errors are returned as-is.
    #[tracing::instrument(level = "debug", skip_all, fields(descriptor = %descriptor))]
    pub fn check(
        &self,
        value: &Value,
        descriptor: &Descriptor,
    ) -> Result<CheckResult, ConstructionError> {
        match self.assert_value(value, descriptor) {
            Ok(()) => Ok(CheckResult::pass(value.clone(), descriptor.clone())),
            Err(err) => {
                let failure = err.into_construction()?;
                debug!(reason = %failure, "value does not conform");
                Ok(CheckResult::fail(
                    value.clone(),
                    descriptor.clone(),
                    failure.to_string(),
                ))
            }
        }
    }

    /// Walk `value` from a fresh root labelled with its runtime type name.
    pub fn assert_value(&self, value: &Value, descriptor: &Descriptor) -> CheckOutcome {
        let root = Chain::root(value.type_name());
        self.assert_conforms(value, descriptor, &root)
    }

    /// One recursive step of the walk.
    pub fn assert_conforms(
        &self,
        value: &Value,
        descriptor: &Descriptor,
        chain: &Chain<'_>,
    ) -> CheckOutcome {
        match descriptor {
            Descriptor::Any => Ok(()),
            Descriptor::Param(name) => Err(ConstructionError::Uninstantiated {
                param: name.clone(),
            }
            .into()),
            Descriptor::Union(alternatives) => self.check_union(value, alternatives, chain),
            Descriptor::Literal(allowed) => {
                if allowed.contains(value) {
                    Ok(())
                } else {
                    Err(fail(chain, vec![descriptor.clone()], value))
                }
            }
            Descriptor::Plain(ty) => self.check_plain(value, descriptor, ty, chain),
            Descriptor::Parameterized { origin, args } => {
                self.check_origin(value, descriptor, origin, args, chain)
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Composite descriptors
    // ══════════════════════════════════════════════════════════════════════

    fn check_union(
        &self,
        value: &Value,
        alternatives: &[Descriptor],
        chain: &Chain<'_>,
    ) -> CheckOutcome {
        if alternatives.is_empty() {
            return Err(ConstructionError::EmptyUnion.into());
        }
        for alt in alternatives {
            match self.assert_conforms(value, alt, chain) {
                Ok(()) => return Ok(()),
                Err(CheckError::Failure(_)) => {
                    trace!(alternative = %alt, "union alternative rejected");
                }
                Err(err @ CheckError::Construction(_)) => return Err(err),
            }
        }
        Err(fail(chain, alternatives.to_vec(), value))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Nominal descriptors
    // ══════════════════════════════════════════════════════════════════════

    fn check_plain(
        &self,
        value: &Value,
        descriptor: &Descriptor,
        ty: &TypeRef,
        chain: &Chain<'_>,
    ) -> CheckOutcome {
        if !ty.admits(value) {
            return Err(fail(chain, vec![descriptor.clone()], value));
        }
        match ty {
            TypeRef::Builtin(kind) if kind.is_scalar() => return Ok(()),
            TypeRef::Builtin(_) => {}
            TypeRef::Class(class) => {
                for base in class.bases() {
                    if base.mentions_params() {
                        trace!(class = class.name(), base = %base, "generic base, deferred");
                        continue;
                    }
                    trace!(class = class.name(), base = %base, "checking declared base");
                    self.assert_conforms(value, base, chain)?;
                }
            }
        }
        self.check_origin(value, descriptor, ty, &[], chain)
    }

    fn check_origin(
        &self,
        value: &Value,
        descriptor: &Descriptor,
        origin: &TypeRef,
        args: &[Descriptor],
        chain: &Chain<'_>,
    ) -> CheckOutcome {
        if !origin.admits(value) {
            return Err(fail(chain, vec![Descriptor::Plain(origin.clone())], value));
        }

        if let Some(routine) = origin.routine() {
            trace!(routine = routine.name(), "type-level routine");
            return self.run_routine(routine.as_ref(), value, args, chain);
        }
        if let Some(routine) = value.routine() {
            trace!(routine = routine.name(), "instance-level routine");
            return self.run_routine(routine.as_ref(), value, args, chain);
        }
        if let Some(checker) = self.registry.get(&origin.key()) {
            trace!(origin = origin.name(), "container checker");
            return checker(self, value, args, chain);
        }
        if let TypeRef::Class(class) = origin {
            if class.fields().is_some() {
                return self.check_fields(value, descriptor, class, args, chain);
            }
        }

        if self.config.strict {
            Err(ConstructionError::Unsupported {
                descriptor: descriptor.to_string(),
            }
            .into())
        } else {
            trace!(descriptor = %descriptor, "no checkable structure, accepted");
            Ok(())
        }
    }

    /// Invoke a custom routine. Failures it reports are authoritative;
    /// contract breaches surface as [`ConstructionError::Routine`].
    fn run_routine(
        &self,
        routine: &dyn Conform,
        value: &Value,
        args: &[Descriptor],
        chain: &Chain<'_>,
    ) -> CheckOutcome {
        if !routine.accepts(args.len()) {
            return Err(ConstructionError::Routine {
                routine: routine.name().to_string(),
                reason: format!("called with {} type argument(s)", args.len()),
            }
            .into());
        }
        routine
            .conform(self, value, args, chain)
            .map_err(|err| match err {
                CheckError::Construction(inner @ ConstructionError::Routine { .. }) => inner.into(),
                CheckError::Construction(inner) => ConstructionError::Routine {
                    routine: routine.name().to_string(),
                    reason: inner.to_string(),
                }
                .into(),
                failure => failure,
            })
    }

    // ══════════════════════════════════════════════════════════════════════
    // Generic class fields
    // ══════════════════════════════════════════════════════════════════════

    fn check_fields(
        &self,
        value: &Value,
        descriptor: &Descriptor,
        class: &ClassDef,
        args: &[Descriptor],
        chain: &Chain<'_>,
    ) -> CheckOutcome {
        let params = class.params();
        if args.len() > params.len() {
            return Err(ConstructionError::ParamCount {
                class: class.name().to_string(),
                params: params.len(),
                args: args.len(),
            }
            .into());
        }
        if args.len() != params.len() {
            // Partial parameterization defers the whole field check.
            trace!(class = class.name(), "partially parameterized, deferred");
            return Ok(());
        }

        let bindings: HashMap<&str, &Descriptor> =
            params.iter().map(String::as_str).zip(args).collect();
        // Fields come from the value's own class. Fields the descriptor's
        // class declares take their hint and bindings from the descriptor.
        let declared = class.field_table();
        let table = match value.class() {
            Some(actual) if actual.is_subclass_of(class) => actual.field_table(),
            _ => declared.clone(),
        };
        for field in &table {
            let Some(item) = value.attr(&field.name) else {
                if self.config.check_missing_attrs {
                    return Err(fail(chain, vec![descriptor.clone()], value));
                }
                continue;
            };
            let hint = match declared.iter().find(|d| d.name == field.name) {
                Some(own) => own.hint.substitute(&bindings)?,
                None => match field.hint.substitute(&bindings) {
                    Ok(hint) => hint,
                    Err(ConstructionError::Uninstantiated { .. }) => {
                        trace!(field = %field.name, "subclass field generic over unbound parameter, skipped");
                        continue;
                    }
                    Err(err) => return Err(err.into()),
                },
            };
            self.assert_conforms(item, &hint, &chain.extend(Segment::Attr(field.name.clone())))?;
        }
        Ok(())
    }
}

impl Walk for Engine<'_> {
    fn walk(&self, value: &Value, descriptor: &Descriptor, chain: &Chain<'_>) -> CheckOutcome {
        self.assert_conforms(value, descriptor, chain)
    }
}

fn fail(chain: &Chain<'_>, expected: Vec<Descriptor>, value: &Value) -> CheckError {
    CheckFailure::new(chain, expected, value).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rttc_types::Builtin;

    fn int() -> Descriptor {
        Builtin::Int.into()
    }

    #[test]
    fn test_union_branches_from_same_chain() {
        let reg = Registry::with_builtins();
        let engine = Engine::new(&reg, Config::default());
        let root = Chain::root("list");
        let at = root.extend(Segment::index(0));
        let err = engine
            .assert_conforms(&Value::None, &(int() | Builtin::Str.into()), &at)
            .unwrap_err();
        let failure = err.as_failure().unwrap();
        assert_eq!(failure.location(), "list[0]");
        assert_eq!(failure.expected.len(), 2);
    }

    #[test]
    fn test_construction_error_escapes_union() {
        let reg = Registry::with_builtins();
        let engine = Engine::new(&reg, Config::default());
        let bad = Descriptor::tuple([int(), int()]) | Builtin::List.into();
        let value = Value::tuple([Value::Int(1)]);
        let err = engine.assert_value(&value, &bad).unwrap_err();
        assert!(matches!(
            err,
            CheckError::Construction(ConstructionError::Length { len: 1, args: 2, .. })
        ));
    }

    #[test]
    fn test_empty_registry_is_strict() {
        let reg = Registry::new();
        let engine = Engine::new(&reg, Config::default());
        let err = engine
            .assert_value(&Value::list([]), &Descriptor::list(int()))
            .unwrap_err();
        assert_eq!(
            err.as_construction(),
            Some(&ConstructionError::Unsupported {
                descriptor: "list[int]".into()
            })
        );

        let lenient = Engine::new(&reg, Config::lenient());
        assert!(lenient
            .assert_value(&Value::list([Value::None]), &Descriptor::list(int()))
            .is_ok());
    }
}
