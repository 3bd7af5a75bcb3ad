//! Type descriptors: what a conforming value must look like.
//!
//! A [`Descriptor`] is either a nominal type ([`TypeRef`]), a nominal origin
//! applied to type arguments, a union, a literal set, or a type-parameter
//! placeholder used inside class field tables.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

use crate::class::ClassDef;
use crate::conform::Conform;
use crate::error::ConstructionError;
use crate::value::Value;

// ══════════════════════════════════════════════════════════════════════════════
// Builtin
// ══════════════════════════════════════════════════════════════════════════════

/// Builtin nominal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    // ── Scalars ──
    None,
    Bool,
    Int,
    Float,
    Str,

    // ── Containers ──
    List,
    Tuple,
    Set,
    FrozenSet,
    Dict,

    // ── Abstract ──
    /// Lists and tuples.
    Sequence,
    /// Every container, strings and streams.
    Iterable,
    /// Everything.
    Object,
}

impl Builtin {
    /// Returns true if every value of kind `other` is also of kind `self`.
    pub fn subsumes(self, other: Builtin) -> bool {
        use Builtin::*;
        match self {
            Object => true,
            Iterable => matches!(other, Str | List | Tuple | Set | FrozenSet | Dict | Sequence | Iterable),
            Sequence => matches!(other, List | Tuple | Sequence),
            _ => self == other,
        }
    }

    /// Runtime instance test.
    pub fn admits(self, value: &Value) -> bool {
        let kind = match value {
            Value::None => Builtin::None,
            Value::Bool(_) => Builtin::Bool,
            Value::Int(_) => Builtin::Int,
            Value::Float(_) => Builtin::Float,
            Value::Str(_) => Builtin::Str,
            Value::List(_) => Builtin::List,
            Value::Tuple(_) => Builtin::Tuple,
            Value::Set(_) => Builtin::Set,
            Value::FrozenSet(_) => Builtin::FrozenSet,
            Value::Dict(_) => Builtin::Dict,
            Value::Stream(_) => return matches!(self, Builtin::Iterable | Builtin::Object),
            Value::Object(obj) => {
                return self == Builtin::Object || obj.class().extends_builtin(self);
            }
        };
        self.subsumes(kind)
    }

    /// Kinds whose instance test is the whole check: no structure below them.
    pub fn is_scalar(self) -> bool {
        use Builtin::*;
        matches!(self, None | Bool | Int | Float | Str | Object)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::None => "None",
            Builtin::Bool => "bool",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Str => "str",
            Builtin::List => "list",
            Builtin::Tuple => "tuple",
            Builtin::Set => "set",
            Builtin::FrozenSet => "frozenset",
            Builtin::Dict => "dict",
            Builtin::Sequence => "Sequence",
            Builtin::Iterable => "Iterable",
            Builtin::Object => "object",
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// TypeRef / TypeKey
// ══════════════════════════════════════════════════════════════════════════════

/// A nominal type: builtin kind or declared class.
#[derive(Debug, Clone)]
pub enum TypeRef {
    Builtin(Builtin),
    Class(Arc<ClassDef>),
}

/// Hashable identity of a [`TypeRef`], used to key checker registries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Builtin(Builtin),
    Class(String),
}

impl TypeRef {
    /// Runtime instance test.
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            TypeRef::Builtin(kind) => kind.admits(value),
            TypeRef::Class(class) => value
                .class()
                .is_some_and(|actual| actual.is_subclass_of(class)),
        }
    }

    pub fn key(&self) -> TypeKey {
        match self {
            TypeRef::Builtin(kind) => TypeKey::Builtin(*kind),
            TypeRef::Class(class) => TypeKey::Class(class.name().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TypeRef::Builtin(kind) => kind.name(),
            TypeRef::Class(class) => class.name(),
        }
    }

    /// Type-level conformance routine. Builtins never carry one.
    pub fn routine(&self) -> Option<&Arc<dyn Conform>> {
        match self {
            TypeRef::Builtin(_) => None,
            TypeRef::Class(class) => class.routine(),
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeRef::Builtin(a), TypeRef::Builtin(b)) => a == b,
            (TypeRef::Class(a), TypeRef::Class(b)) => Arc::ptr_eq(a, b) || a.name() == b.name(),
            _ => false,
        }
    }
}

impl From<Builtin> for TypeRef {
    fn from(kind: Builtin) -> Self {
        TypeRef::Builtin(kind)
    }
}

impl From<&Arc<ClassDef>> for TypeRef {
    fn from(class: &Arc<ClassDef>) -> Self {
        TypeRef::Class(Arc::clone(class))
    }
}

impl From<Builtin> for TypeKey {
    fn from(kind: Builtin) -> Self {
        TypeKey::Builtin(kind)
    }
}

impl From<&Arc<ClassDef>> for TypeKey {
    fn from(class: &Arc<ClassDef>) -> Self {
        TypeKey::Class(class.name().to_string())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Descriptor
// ══════════════════════════════════════════════════════════════════════════════

/// A type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    /// Matches every value.
    Any,
    /// A nominal type without arguments.
    Plain(TypeRef),
    /// A nominal origin applied to type arguments: `list[int]`, `Pair[int, str]`.
    Parameterized { origin: TypeRef, args: Vec<Descriptor> },
    /// Matches if any alternative matches. Build with [`Descriptor::union`].
    Union(Vec<Descriptor>),
    /// Matches values equal to one of the listed values.
    Literal(Vec<Value>),
    /// A type-parameter placeholder, only meaningful inside a field table.
    Param(String),
}

impl Descriptor {
    pub fn of(kind: Builtin) -> Self {
        Descriptor::Plain(TypeRef::Builtin(kind))
    }

    pub fn class(class: &Arc<ClassDef>) -> Self {
        Descriptor::Plain(TypeRef::from(class))
    }

    /// Apply `origin` to type arguments.
    pub fn generic(origin: impl Into<TypeRef>, args: impl IntoIterator<Item = Descriptor>) -> Self {
        Descriptor::Parameterized {
            origin: origin.into(),
            args: args.into_iter().collect(),
        }
    }

    /// `list[element]`
    pub fn list(element: Descriptor) -> Self {
        Self::generic(Builtin::List, [element])
    }

    /// `tuple[a, b, ...]`
    pub fn tuple(elements: impl IntoIterator<Item = Descriptor>) -> Self {
        Self::generic(Builtin::Tuple, elements)
    }

    /// `set[element]`
    pub fn set(element: Descriptor) -> Self {
        Self::generic(Builtin::Set, [element])
    }

    /// `dict[key, value]`
    pub fn dict(key: Descriptor, value: Descriptor) -> Self {
        Self::generic(Builtin::Dict, [key, value])
    }

    /// Flattened, deduplicated union. A single alternative stands for itself.
    pub fn union(alternatives: impl IntoIterator<Item = Descriptor>) -> Self {
        let mut flat: Vec<Descriptor> = Vec::new();
        for alt in alternatives {
            let nested = match alt {
                Descriptor::Union(inner) => inner,
                other => vec![other],
            };
            for d in nested {
                if !flat.contains(&d) {
                    flat.push(d);
                }
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Descriptor::Union(flat)
        }
    }

    pub fn literal(values: impl IntoIterator<Item = Value>) -> Self {
        Descriptor::Literal(values.into_iter().collect())
    }

    pub fn param(name: impl Into<String>) -> Self {
        Descriptor::Param(name.into())
    }

    /// Nominal origin of a plain or parameterized descriptor.
    pub fn origin(&self) -> Option<&TypeRef> {
        match self {
            Descriptor::Plain(origin) | Descriptor::Parameterized { origin, .. } => Some(origin),
            _ => None,
        }
    }

    /// Type arguments. Empty unless parameterized.
    pub fn args(&self) -> &[Descriptor] {
        match self {
            Descriptor::Parameterized { args, .. } => args,
            _ => &[],
        }
    }

    /// Returns true if a type-parameter placeholder occurs anywhere inside.
    pub fn mentions_params(&self) -> bool {
        match self {
            Descriptor::Param(_) => true,
            Descriptor::Parameterized { args, .. } => args.iter().any(Descriptor::mentions_params),
            Descriptor::Union(alternatives) => alternatives.iter().any(Descriptor::mentions_params),
            _ => false,
        }
    }

    /// Replace the placeholders named in `bindings`, keeping any others.
    pub fn rebind(&self, bindings: &HashMap<&str, &Descriptor>) -> Descriptor {
        match self {
            Descriptor::Param(name) => bindings
                .get(name.as_str())
                .map_or_else(|| self.clone(), |bound| (*bound).clone()),
            Descriptor::Parameterized { origin, args } => Descriptor::Parameterized {
                origin: origin.clone(),
                args: args.iter().map(|arg| arg.rebind(bindings)).collect(),
            },
            Descriptor::Union(alternatives) => Descriptor::Union(
                alternatives.iter().map(|alt| alt.rebind(bindings)).collect(),
            ),
            other => other.clone(),
        }
    }

    /// Replace type-parameter placeholders, recursively.
    pub fn substitute(
        &self,
        bindings: &HashMap<&str, &Descriptor>,
    ) -> Result<Descriptor, ConstructionError> {
        Ok(match self {
            Descriptor::Param(name) => match bindings.get(name.as_str()) {
                Some(bound) => (*bound).clone(),
                None => {
                    return Err(ConstructionError::Uninstantiated {
                        param: name.clone(),
                    })
                }
            },
            Descriptor::Parameterized { origin, args } => Descriptor::Parameterized {
                origin: origin.clone(),
                args: args
                    .iter()
                    .map(|arg| arg.substitute(bindings))
                    .collect::<Result<_, _>>()?,
            },
            Descriptor::Union(alternatives) => Descriptor::Union(
                alternatives
                    .iter()
                    .map(|alt| alt.substitute(bindings))
                    .collect::<Result<_, _>>()?,
            ),
            other => other.clone(),
        })
    }
}

impl From<Builtin> for Descriptor {
    fn from(kind: Builtin) -> Self {
        Descriptor::of(kind)
    }
}

impl BitOr for Descriptor {
    type Output = Descriptor;

    fn bitor(self, rhs: Descriptor) -> Descriptor {
        Descriptor::union([self, rhs])
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Any => write!(f, "Any"),
            Descriptor::Plain(origin) => write!(f, "{}", origin.name()),
            Descriptor::Parameterized { origin, args } => {
                write!(f, "{}[", origin.name())?;
                if args.is_empty() {
                    write!(f, "()")?;
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, "]")
            }
            Descriptor::Union(alternatives) if alternatives.is_empty() => write!(f, "Union[()]"),
            Descriptor::Union(alternatives) => {
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{alt}")?;
                }
                Ok(())
            }
            Descriptor::Literal(values) => {
                write!(f, "Literal[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Descriptor::Param(name) => write!(f, "{name}"),
        }
    }
}
