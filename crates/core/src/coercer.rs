//! Coercers: pure transforms applied before validation.
//!
//! Coercers never validate and never fail. Input they can not handle passes
//! through untouched, and the attribute's validator decides.

use std::fmt;
use std::sync::Arc;

use crate::class::ValueClass;
use crate::value::{Value, ValueMap};

/// Transform a raw input value into canonical form.
///
/// Any `Fn(Value) -> Value + Send + Sync` closure is a coercer.
pub trait Coercer: Send + Sync {
    fn transform(&self, raw: Value) -> Value;
}

/// Shared handle to a coercer.
pub type CoercerRef = Arc<dyn Coercer>;

impl<F> Coercer for F
where
    F: Fn(Value) -> Value + Send + Sync,
{
    fn transform(&self, raw: Value) -> Value {
        self(raw)
    }
}

/// How an attribute coerces its raw value.
#[derive(Clone)]
pub enum Coercion {
    /// Call the owning class's `coerce_<attribute name>` function.
    Delegated,
    With(CoercerRef),
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coercion::Delegated => f.write_str("Delegated"),
            Coercion::With(_) => f.write_str("With(..)"),
        }
    }
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Coercer for Identity {
    fn transform(&self, raw: Value) -> Value {
        raw
    }
}

/// Converts sequence-like input into an array, optionally coercing each
/// element.
#[derive(Clone, Default)]
pub struct ArrayCoercer {
    element: Option<CoercerRef>,
}

impl ArrayCoercer {
    pub fn new() -> Self {
        Self { element: None }
    }

    pub fn of(element: impl Coercer + 'static) -> Self {
        Self {
            element: Some(Arc::new(element)),
        }
    }

    pub fn from_ref(element: Option<CoercerRef>) -> Self {
        Self { element }
    }

    pub fn element_coercer(&self) -> Option<&CoercerRef> {
        self.element.as_ref()
    }
}

impl Coercer for ArrayCoercer {
    fn transform(&self, raw: Value) -> Value {
        let Some(items) = raw.to_sequence() else {
            return raw;
        };
        match &self.element {
            Some(element) => Value::Array(items.into_iter().map(|i| element.transform(i)).collect()),
            None => Value::Array(items),
        }
    }
}

/// Converts map-like input into a map, coercing every key and value.
#[derive(Clone)]
pub struct HashCoercer {
    keys: CoercerRef,
    values: CoercerRef,
}

impl HashCoercer {
    /// Identity coercion for both keys and values.
    pub fn new() -> Self {
        Self {
            keys: Arc::new(Identity),
            values: Arc::new(Identity),
        }
    }

    pub fn keys(mut self, coercer: impl Coercer + 'static) -> Self {
        self.keys = Arc::new(coercer);
        self
    }

    pub fn values(mut self, coercer: impl Coercer + 'static) -> Self {
        self.values = Arc::new(coercer);
        self
    }

    pub fn key_coercer(&self) -> &CoercerRef {
        &self.keys
    }

    pub fn value_coercer(&self) -> &CoercerRef {
        &self.values
    }
}

impl Default for HashCoercer {
    fn default() -> Self {
        Self::new()
    }
}

impl Coercer for HashCoercer {
    fn transform(&self, raw: Value) -> Value {
        let Some(map) = map_like(&raw) else {
            return raw;
        };
        Value::Map(
            map.into_iter()
                .map(|(k, v)| (self.keys.transform(k), self.values.transform(v)))
                .collect(),
        )
    }
}

fn map_like(raw: &Value) -> Option<ValueMap> {
    crate::value::ToMapping::to_mapping(raw)
}

/// Coerces map-like input into an instance of a value class.
///
/// Only the class's attribute names are picked out of the input (symbol key
/// first, then the same name as a string key); other keys are ignored.
/// Instances of the class pass through unchanged, and so does any input the
/// class can not be constructed from.
#[derive(Clone)]
pub struct ValueObjectCoercer {
    class: Arc<ValueClass>,
}

impl ValueObjectCoercer {
    pub fn new(class: Arc<ValueClass>) -> Self {
        Self { class }
    }

    pub fn class(&self) -> &Arc<ValueClass> {
        &self.class
    }

    fn attribute_map(&self, raw: &Value) -> Option<ValueMap> {
        let source = map_like(raw)?;
        let mut attrs = ValueMap::new();
        for attr in self.class.recipe().attributes() {
            let value = source
                .get(attr.key())
                .or_else(|| source.get(&Value::Str(attr.name().to_string())));
            if let Some(value) = value {
                attrs.insert(attr.key().clone(), value.clone());
            }
        }
        Some(attrs)
    }
}

impl Coercer for ValueObjectCoercer {
    fn transform(&self, raw: Value) -> Value {
        if let Value::Object(instance) = &raw {
            if instance.class().is_a(&self.class) {
                return raw;
            }
        }
        let Some(attrs) = self.attribute_map(&raw) else {
            return raw;
        };
        match self.class.construct(&attrs) {
            Ok(instance) => Value::Object(instance),
            Err(err) => {
                tracing::trace!(
                    class = %self.class.name(),
                    error = %err,
                    "value object coercion fell back to the raw value"
                );
                raw
            }
        }
    }
}
