//! Element-wise checkers for builtin containers.
//!
//! Each checker extends the chain by one segment per element and recurses
//! through the [`Walk`] handle.

use rttc_types::{
    Chain, CheckOutcome, ConstructionError, Descriptor, Segment, Value, Walk,
};

/// Ordered sequences (list, tuple, Sequence).
///
/// - no argument: anything goes
/// - one argument: every element conforms to it
/// - as many arguments as elements: positional correspondence
/// - anything else is a construction error
pub fn check_sequence(
    walker: &dyn Walk,
    value: &Value,
    args: &[Descriptor],
    chain: &Chain<'_>,
) -> CheckOutcome {
    let items = value
        .elements()
        .ok_or_else(|| not_a_container(value, "sequence"))?;
    match args {
        [] => Ok(()),
        [element] => {
            for (i, item) in items.iter().enumerate() {
                walker.walk(item, element, &chain.extend(Segment::index(i)))?;
            }
            Ok(())
        }
        _ if args.len() == items.len() => {
            for (i, (item, hint)) in items.iter().zip(args).enumerate() {
                walker.walk(item, hint, &chain.extend(Segment::index(i)))?;
            }
            Ok(())
        }
        _ => Err(ConstructionError::Length {
            container: value.type_name().to_string(),
            len: items.len(),
            args: args.len(),
        }
        .into()),
    }
}

/// Sets: exactly one element descriptor. Elements have no position, so
/// every element is reported under the `[?]` marker.
pub fn check_set(
    walker: &dyn Walk,
    value: &Value,
    args: &[Descriptor],
    chain: &Chain<'_>,
) -> CheckOutcome {
    let [element] = args else {
        return Err(arity(value, "exactly 1", args.len()));
    };
    let items = value.elements().ok_or_else(|| not_a_container(value, "set"))?;
    let at = chain.extend(Segment::ANY_ELEMENT);
    for item in items {
        walker.walk(item, element, &at)?;
    }
    Ok(())
}

/// Mappings: a key descriptor and an optional value descriptor
/// (defaults to [`Descriptor::Any`]). Values are located by their key.
pub fn check_mapping(
    walker: &dyn Walk,
    value: &Value,
    args: &[Descriptor],
    chain: &Chain<'_>,
) -> CheckOutcome {
    let (key_hint, value_hint) = match args {
        [key] => (key, &Descriptor::Any),
        [key, val] => (key, val),
        _ => return Err(arity(value, "1 or 2", args.len())),
    };
    let entries = value
        .entries()
        .ok_or_else(|| not_a_container(value, "mapping"))?;
    let at_key = chain.extend(Segment::MAP_KEY);
    for (key, val) in entries {
        walker.walk(key, key_hint, &at_key)?;
        walker.walk(val, value_hint, &chain.extend(Segment::Key(key.clone())))?;
    }
    Ok(())
}

/// Open-ended iterables and frozen sets: refuse rather than consume.
pub fn refuse_opaque(
    _walker: &dyn Walk,
    value: &Value,
    _args: &[Descriptor],
    _chain: &Chain<'_>,
) -> CheckOutcome {
    Err(ConstructionError::Destructive {
        value: value.repr(),
    }
    .into())
}

fn arity(value: &Value, expected: &'static str, found: usize) -> rttc_types::CheckError {
    ConstructionError::Arity {
        container: value.type_name().to_string(),
        expected,
        found,
    }
    .into()
}

fn not_a_container(value: &Value, kind: &'static str) -> ConstructionError {
    ConstructionError::NotAContainer {
        value: value.repr(),
        kind,
    }
}
