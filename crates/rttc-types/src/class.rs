//! Declared classes and their instances.
//!
//! A [`ClassDef`] is the explicit field table of a user-defined type:
//! type parameters, field hints, structural bases and an optional
//! type-level conformance routine. Tables are declared once and shared
//! behind an `Arc`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::conform::Conform;
use crate::descriptor::{Builtin, Descriptor, TypeRef};
use crate::value::Value;

// ══════════════════════════════════════════════════════════════════════════════
// ClassDef
// ══════════════════════════════════════════════════════════════════════════════

/// A declared field: name plus type hint (which may name a type parameter).
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub hint: Descriptor,
}

/// A user-defined class declaration.
pub struct ClassDef {
    name: String,
    params: Vec<String>,
    /// `None` for opaque classes that declare no field table at all.
    fields: Option<Vec<Field>>,
    bases: Vec<Descriptor>,
    routine: Option<Arc<dyn Conform>>,
}

impl ClassDef {
    /// Start declaring a class with an empty field table.
    pub fn new(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            def: ClassDef {
                name: name.into(),
                params: Vec::new(),
                fields: Some(Vec::new()),
                bases: Vec::new(),
                routine: None,
            },
        }
    }

    /// Start declaring a class without a field table.
    pub fn opaque(name: impl Into<String>) -> ClassBuilder {
        let mut builder = Self::new(name);
        builder.def.fields = None;
        builder
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type parameter names, in order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Declared field table, if any.
    pub fn fields(&self) -> Option<&[Field]> {
        self.fields.as_deref()
    }

    /// Fields inherited through class bases followed by the class's own.
    /// A later declaration of a name replaces the hint in place. Inherited
    /// hints are rebound through the base's type arguments.
    pub fn field_table(&self) -> Vec<Field> {
        let mut table: Vec<Field> = Vec::new();
        let inherited = self.bases.iter().filter_map(|base| {
            let Some(TypeRef::Class(class)) = base.origin() else {
                return None;
            };
            let mut fields = class.field_table();
            let args = base.args();
            if !args.is_empty() && args.len() == class.params().len() {
                let bindings: HashMap<&str, &Descriptor> =
                    class.params().iter().map(String::as_str).zip(args).collect();
                for field in &mut fields {
                    field.hint = field.hint.rebind(&bindings);
                }
            }
            Some(fields)
        });
        let own = self.fields.iter().flatten().cloned();
        for field in inherited.flatten().chain(own) {
            match table.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => existing.hint = field.hint,
                None => table.push(field),
            }
        }
        table
    }

    /// Declared structural bases.
    pub fn bases(&self) -> &[Descriptor] {
        &self.bases
    }

    /// Type-level conformance routine.
    pub fn routine(&self) -> Option<&Arc<dyn Conform>> {
        self.routine.as_ref()
    }

    /// Returns true if `self` is `other` or declares it as a base, transitively.
    pub fn is_subclass_of(&self, other: &ClassDef) -> bool {
        if std::ptr::eq(self, other) || self.name == other.name {
            return true;
        }
        self.bases.iter().any(|base| match base.origin() {
            Some(TypeRef::Class(class)) => class.is_subclass_of(other),
            _ => false,
        })
    }

    /// Returns true if the class extends a builtin admitted by `kind`,
    /// transitively through its class bases.
    pub fn extends_builtin(&self, kind: Builtin) -> bool {
        self.bases.iter().any(|base| match base.origin() {
            Some(TypeRef::Builtin(b)) => kind.subsumes(*b),
            Some(TypeRef::Class(class)) => class.extends_builtin(kind),
            None => false,
        })
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("fields", &self.fields)
            .field("bases", &self.bases)
            .field("routine", &self.routine.as_ref().map(|r| r.name().to_string()))
            .finish()
    }
}

/// Consuming builder for [`ClassDef`].
pub struct ClassBuilder {
    def: ClassDef,
}

impl ClassBuilder {
    /// Declare a type parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.def.params.push(name.into());
        self
    }

    /// Declare a field. Re-declaring a name replaces its hint.
    pub fn field(mut self, name: impl Into<String>, hint: Descriptor) -> Self {
        let name = name.into();
        let fields = self.def.fields.get_or_insert_with(Vec::new);
        match fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.hint = hint,
            None => fields.push(Field { name, hint }),
        }
        self
    }

    /// Declare a structural base.
    pub fn base(mut self, base: Descriptor) -> Self {
        self.def.bases.push(base);
        self
    }

    /// Attach a type-level conformance routine.
    pub fn routine(mut self, routine: Arc<dyn Conform>) -> Self {
        self.def.routine = Some(routine);
        self
    }

    pub fn build(self) -> Arc<ClassDef> {
        Arc::new(self.def)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Instance
// ══════════════════════════════════════════════════════════════════════════════

/// An instance of a declared class.
pub struct Instance {
    class: Arc<ClassDef>,
    attrs: BTreeMap<String, Value>,
    /// Builtin payload for classes extending a builtin container.
    data: Option<Value>,
    routine: Option<Arc<dyn Conform>>,
}

impl Instance {
    pub fn new(class: &Arc<ClassDef>) -> Self {
        Self {
            class: Arc::clone(class),
            attrs: BTreeMap::new(),
            data: None,
            routine: None,
        }
    }

    /// Set an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the builtin payload (the list of a list subclass, etc.).
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach an instance-level conformance routine.
    pub fn with_routine(mut self, routine: Arc<dyn Conform>) -> Self {
        self.routine = Some(routine);
        self
    }

    pub fn class(&self) -> &Arc<ClassDef> {
        &self.class
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn attrs(&self) -> &BTreeMap<String, Value> {
        &self.attrs
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn routine(&self) -> Option<&Arc<dyn Conform>> {
        self.routine.as_ref()
    }

    pub fn into_value(self) -> Value {
        Value::Object(Arc::new(self))
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        instance.into_value()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.class.name == other.class.name && self.attrs == other.attrs && self.data == other.data
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .field("attrs", &self.attrs)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.class.name)?;
        let mut first = true;
        if let Some(data) = &self.data {
            write!(f, "{data}")?;
            first = false;
        }
        for (name, value) in &self.attrs {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        write!(f, ")")
    }
}
