//! Runtime value model checked by the conformance engine.
//!
//! [`Value`] is a dynamically typed value: scalars, builtin containers,
//! opaque streams, and instances of declared classes.

use std::fmt;
use std::sync::Arc;

use crate::class::{ClassDef, Instance};
use crate::conform::Conform;

// ══════════════════════════════════════════════════════════════════════════════
// Value
// ══════════════════════════════════════════════════════════════════════════════

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    // ── Scalars ──
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),

    // ── Builtin containers ──
    /// Ordered, mutable sequence.
    List(Vec<Value>),
    /// Ordered, fixed-arity sequence.
    Tuple(Vec<Value>),
    /// Unordered collection without duplicates. Build with [`Value::set`].
    Set(Vec<Value>),
    /// Immutable set. Never enumerated by the checker.
    FrozenSet(Vec<Value>),
    /// Insertion-ordered mapping. Build with [`Value::dict`].
    Dict(Vec<(Value, Value)>),

    // ── Opaque ──
    /// Single-pass source (generator, reader, ...). Only its label is known.
    Stream(String),

    // ── User-defined ──
    /// Instance of a declared class.
    Object(Arc<Instance>),
}

impl Value {
    /// Build a string value.
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Build a list value.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    /// Build a tuple value.
    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    /// Build a set value, dropping duplicate elements.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(dedup(items))
    }

    /// Build a frozen set value, dropping duplicate elements.
    pub fn frozen_set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::FrozenSet(dedup(items))
    }

    /// Build a dict value. A repeated key keeps its first position and
    /// takes the last value.
    pub fn dict(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut out: Vec<(Value, Value)> = Vec::new();
        for (key, value) in entries {
            match out.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => out.push((key, value)),
            }
        }
        Value::Dict(out)
    }

    /// Build an opaque stream value.
    pub fn stream(label: impl Into<String>) -> Self {
        Value::Stream(label.into())
    }

    /// Runtime type name, as shown in failure messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Set(_) => "set",
            Value::FrozenSet(_) => "frozenset",
            Value::Dict(_) => "dict",
            Value::Stream(_) => "stream",
            Value::Object(obj) => obj.class().name(),
        }
    }

    /// Literal rendering of the value.
    pub fn repr(&self) -> String {
        self.to_string()
    }

    /// Elements of a sequence or set, looking through an object's builtin
    /// payload. `None` for anything that cannot be enumerated safely.
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => Some(items),
            Value::Object(obj) => obj.data().and_then(Value::elements),
            _ => None,
        }
    }

    /// Entries of a mapping, looking through an object's builtin payload.
    pub fn entries(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Dict(entries) => Some(entries),
            Value::Object(obj) => obj.data().and_then(Value::entries),
            _ => None,
        }
    }

    /// Attribute lookup on an object. Other values have no attributes.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(obj) => obj.attr(name),
            _ => None,
        }
    }

    /// The declared class of an object value.
    pub fn class(&self) -> Option<&Arc<ClassDef>> {
        match self {
            Value::Object(obj) => Some(obj.class()),
            _ => None,
        }
    }

    /// Instance-level conformance routine, if this value carries one.
    pub fn routine(&self) -> Option<&Arc<dyn Conform>> {
        match self {
            Value::Object(obj) => obj.routine(),
            _ => None,
        }
    }
}

fn dedup(items: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Order-independent comparison of two deduplicated collections.
fn same_members(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.contains(x))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Set(a), Value::Set(b)) | (Value::FrozenSet(a), Value::FrozenSet(b)) => {
                same_members(a, b)
            }
            (Value::Dict(a), Value::Dict(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
            }
            (Value::Stream(a), Value::Stream(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b) || **a == **b,
            _ => false,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Conversions
// ══════════════════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::None,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Dict(
                map.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Display (repr)
// ══════════════════════════════════════════════════════════════════════════════

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Shortest round-trip form; exponents are signed and at least two digits
/// wide (`1e+16`, `1e-07`).
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return write!(f, "nan");
    }
    let text = format!("{x:?}");
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            write!(f, "{mantissa}e{sign}{digits:0>2}")
        }
        None => f.write_str(&text),
    }
}

fn write_str_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    write!(f, "{quote}")?;
    for c in s.chars() {
        match c {
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            c if c == quote => write!(f, "\\{c}")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "{quote}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write_float(f, *x),
            Value::Str(s) => write_str_literal(f, s),
            Value::List(items) => {
                write!(f, "[")?;
                write_seq(f, items)?;
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_seq(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Set(items) if items.is_empty() => write!(f, "set()"),
            Value::Set(items) => {
                write!(f, "{{")?;
                write_seq(f, items)?;
                write!(f, "}}")
            }
            Value::FrozenSet(items) if items.is_empty() => write!(f, "frozenset()"),
            Value::FrozenSet(items) => {
                write!(f, "frozenset({{")?;
                write_seq(f, items)?;
                write!(f, "}})")
            }
            Value::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Stream(label) => write!(f, "<stream {label}>"),
            Value::Object(obj) => write!(f, "{obj}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_repr() {
        assert_eq!(Value::None.repr(), "None");
        assert_eq!(Value::Bool(true).repr(), "True");
        assert_eq!(Value::Int(-3).repr(), "-3");
        assert_eq!(Value::Float(3.0).repr(), "3.0");
        assert_eq!(Value::Float(2.5).repr(), "2.5");
        assert_eq!(Value::Float(1e16).repr(), "1e+16");
        assert_eq!(Value::Float(1.5e300).repr(), "1.5e+300");
        assert_eq!(Value::Float(1e-7).repr(), "1e-07");
        assert_eq!(Value::Float(1e15).repr(), "1000000000000000.0");
        assert_eq!(Value::Float(f64::NEG_INFINITY).repr(), "-inf");
        assert_eq!(Value::str("alex").repr(), "'alex'");
        assert_eq!(Value::str("it's").repr(), "\"it's\"");
    }

    #[test]
    fn test_container_repr() {
        let list = Value::list([Value::Int(1), Value::str("2"), Value::Float(3.0)]);
        assert_eq!(list.repr(), "[1, '2', 3.0]");
        assert_eq!(Value::tuple([Value::Int(1)]).repr(), "(1,)");
        assert_eq!(Value::set([]).repr(), "set()");
        let dict = Value::dict([(Value::Int(1), Value::str("a"))]);
        assert_eq!(dict.repr(), "{1: 'a'}");
    }

    #[test]
    fn test_set_dedups() {
        let set = Value::set([Value::Int(1), Value::Int(1), Value::Int(2)]);
        assert_eq!(set.elements().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_dict_last_value_wins() {
        let dict = Value::dict([
            (Value::Int(1), Value::str("a")),
            (Value::Int(2), Value::str("b")),
            (Value::Int(1), Value::str("c")),
        ]);
        let entries = dict.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (Value::Int(1), Value::str("c")));
    }

    #[test]
    fn test_unordered_equality() {
        let a = Value::set([Value::Int(1), Value::Int(2)]);
        let b = Value::set([Value::Int(2), Value::Int(1)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::list([Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_bool_and_int_are_distinct() {
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"id": 7, "ratio": 0.5, "tags": ["a", null]});
        let value = Value::from(json);
        assert_eq!(value.type_name(), "dict");
        let entries = value.entries().unwrap();
        assert!(entries.contains(&(Value::str("id"), Value::Int(7))));
        assert!(entries.contains(&(Value::str("ratio"), Value::Float(0.5))));
        assert!(entries.contains(&(
            Value::str("tags"),
            Value::list([Value::str("a"), Value::None])
        )));
    }

    #[test]
    fn test_streams_do_not_enumerate() {
        let stream = Value::stream("lines(stdin)");
        assert!(stream.elements().is_none());
        assert_eq!(stream.type_name(), "stream");
    }
}
