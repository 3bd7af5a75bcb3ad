//! Guarded callables and constructors end to end.

use pretty_assertions::assert_eq;
use rttc_check::Config;
use rttc_guard::{GuardedClass, GuardedFn, Init};
use rttc_types::{Builtin, CheckError, ClassDef, ConstructionError, Descriptor, Value};

fn int() -> Descriptor {
    Builtin::Int.into()
}

fn float() -> Descriptor {
    Builtin::Float.into()
}

fn str_() -> Descriptor {
    Builtin::Str.into()
}

fn failure_message(err: CheckError) -> String {
    match err {
        CheckError::Failure(failure) => failure.to_string(),
        CheckError::Construction(err) => panic!("expected a conformance failure, got {err}"),
    }
}

/// `int | str` addition: ints add, strings concatenate, lists concatenate.
fn add((x, y): (Value, Value)) -> Value {
    match (x, y) {
        (Value::Int(a), Value::Int(b)) => Value::Int(a + b),
        (Value::Str(a), Value::Str(b)) => Value::Str(a + &b),
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Value::List(a)
        }
        _ => Value::None,
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Guarded functions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_guarded_add_accepts_ints_and_strings() {
    let guarded = GuardedFn::new("add", int() | str_(), add);
    assert_eq!(
        guarded.call((Value::Int(1), Value::Int(2))).unwrap(),
        Value::Int(3)
    );
    assert_eq!(
        guarded.call((Value::str("1"), Value::str("2"))).unwrap(),
        Value::str("12")
    );
}

#[test]
fn test_guarded_add_rejects_lists() {
    let guarded = GuardedFn::new("add", int() | str_(), add);
    let err = guarded
        .call((Value::list([Value::Int(1)]), Value::list([Value::Int(2)])))
        .unwrap_err();
    assert_eq!(failure_message(err), "list([1, 2]) is not int | str");
}

#[test]
fn test_guarded_fn_reports_nested_location() {
    let guarded = GuardedFn::new("ident", Descriptor::list(int()), |v: Value| v);
    let err = guarded
        .call(Value::list([Value::Int(1), Value::Float(0.5)]))
        .unwrap_err();
    assert_eq!(failure_message(err), "list[1] = float(0.5) is not int");
}

#[test]
fn test_guarded_fn_construction_error_propagates() {
    let guarded = GuardedFn::new("pair", Descriptor::tuple([int(), int()]), |()| {
        Value::tuple([Value::Int(1)])
    });
    let err = guarded.call(()).unwrap_err();
    assert!(matches!(
        err.as_construction(),
        Some(ConstructionError::Length { len: 1, args: 2, .. })
    ));
}

// ══════════════════════════════════════════════════════════════════════════════
// Guarded classes
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_list_subclass_checks_payload() {
    let class = ClassDef::new("C").base(Descriptor::list(int())).build();
    let guarded = GuardedClass::new(class);

    let ints = Value::list([Value::Int(1), Value::Int(2), Value::Int(3)]);
    assert!(guarded.construct(Init::new().data(ints)).is_ok());

    let mixed = Value::list([Value::Int(1), Value::Int(2), Value::Float(0.0)]);
    let err = guarded.construct(Init::new().data(mixed)).unwrap_err();
    assert_eq!(failure_message(err), "C[2] = float(0.0) is not int");
}

#[test]
fn test_record_checks_fields() {
    let class = ClassDef::new("C")
        .field("x", int())
        .field("y", float())
        .build();
    let guarded = GuardedClass::new(class);

    let ok = guarded
        .construct(Init::new().attr("x", 1).attr("y", 2.0))
        .unwrap();
    assert_eq!(ok.attr("x"), Some(&Value::Int(1)));

    let err = guarded
        .construct(Init::new().attr("x", 1.0).attr("y", 2))
        .unwrap_err();
    assert_eq!(failure_message(err), "C.x = float(1.0) is not int");
}

#[test]
fn test_type_args_check_instantiated_alias() {
    let class = ClassDef::new("Pair")
        .param("T")
        .param("P")
        .field("x", Descriptor::param("T"))
        .field("y", Descriptor::param("P"))
        .build();
    let guarded = GuardedClass::new(class);

    // Unparameterized construction defers the field hints.
    assert!(guarded
        .construct(Init::new().attr("x", 1).attr("y", 2))
        .is_ok());

    let ok = Init::new()
        .attr("x", 1)
        .attr("y", "a")
        .type_args([int(), str_()]);
    assert!(guarded.construct(ok).is_ok());

    let bad = Init::new()
        .attr("x", 1)
        .attr("y", 2)
        .type_args([int(), str_()]);
    let err = guarded.construct(bad).unwrap_err();
    assert_eq!(failure_message(err), "Pair.y = int(2) is not str");
}

#[test]
fn test_too_many_type_args_is_construction_error() {
    let class = ClassDef::new("Box").param("T").field("v", Descriptor::param("T")).build();
    let guarded = GuardedClass::new(class);
    let err = guarded
        .construct(Init::new().attr("v", 1).type_args([int(), int()]))
        .unwrap_err();
    assert_eq!(
        err.as_construction(),
        Some(&ConstructionError::ParamCount {
            class: "Box".into(),
            params: 1,
            args: 2,
        })
    );
}

#[test]
fn test_opaque_class_follows_config() {
    let class = ClassDef::opaque("Handle").build();
    let strict = GuardedClass::new(class.clone());
    assert!(strict
        .construct(Init::new())
        .unwrap_err()
        .as_construction()
        .is_some());

    let lenient = GuardedClass::new(class).with_config(Config::lenient());
    assert!(lenient.construct(Init::new()).is_ok());
}

#[test]
fn test_missing_attr_policy() {
    let class = ClassDef::new("C").field("x", int()).field("y", float()).build();
    let guarded = GuardedClass::new(class);
    assert!(guarded.construct(Init::new().attr("x", 1)).is_ok());

    let checked = guarded
        .clone()
        .with_config(Config::default().with_check_missing_attrs(true));
    let err = checked.construct(Init::new().attr("x", 1)).unwrap_err();
    assert_eq!(failure_message(err), "C(x=1) is not C");
}
