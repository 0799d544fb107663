//! Validators: "does this value match?"
//!
//! Validators are pure, total predicates. Composite validators own their
//! sub-validators and never change after construction.

use std::sync::Arc;

use crate::class::ValueClass;
use crate::value::Value;

/// Predicate over values.
///
/// Any `Fn(&Value) -> bool + Send + Sync` closure is a validator.
pub trait Validator: Send + Sync {
    fn matches(&self, value: &Value) -> bool;
}

/// Shared handle to a validator.
pub type ValidatorRef = Arc<dyn Validator>;

impl<F> Validator for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn matches(&self, value: &Value) -> bool {
        self(value)
    }
}

/// Helps closure inference when passing a predicate as a validator.
pub fn predicate<F>(f: F) -> F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    f
}

/// Matches every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anything;

impl Validator for Anything {
    fn matches(&self, _value: &Value) -> bool {
        true
    }
}

/// Matches exactly `true` and `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bool;

impl Validator for Bool {
    fn matches(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }
}

/// Host type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Nil,
    Integer,
    Float,
    /// Integer or float.
    Numeric,
    String,
    Symbol,
    Time,
    Array,
    Set,
    Map,
    Range,
    /// Any value-object instance.
    Object,
}

impl Validator for Kind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Kind::Nil => matches!(value, Value::Nil),
            Kind::Integer => matches!(value, Value::Int(_)),
            Kind::Float => matches!(value, Value::Float(_)),
            Kind::Numeric => matches!(value, Value::Int(_) | Value::Float(_)),
            Kind::String => matches!(value, Value::Str(_)),
            Kind::Symbol => matches!(value, Value::Symbol(_)),
            Kind::Time => matches!(value, Value::Time(_)),
            Kind::Array => matches!(value, Value::Array(_)),
            Kind::Set => matches!(value, Value::Set(_)),
            Kind::Map => matches!(value, Value::Map(_)),
            Kind::Range => matches!(value, Value::Range(_)),
            Kind::Object => matches!(value, Value::Object(_)),
        }
    }
}

/// Matches if any sub-validator matches. Declared order is kept.
#[derive(Clone)]
pub struct Either {
    subvalidators: Vec<ValidatorRef>,
}

impl Either {
    pub fn new(subvalidators: Vec<ValidatorRef>) -> Self {
        Self { subvalidators }
    }

    pub fn of(first: impl Validator + 'static) -> Self {
        Self::new(vec![Arc::new(first)])
    }

    pub fn or(mut self, next: impl Validator + 'static) -> Self {
        self.subvalidators.push(Arc::new(next));
        self
    }

    pub fn subvalidators(&self) -> &[ValidatorRef] {
        &self.subvalidators
    }
}

impl Validator for Either {
    fn matches(&self, value: &Value) -> bool {
        self.subvalidators.iter().any(|v| v.matches(value))
    }
}

/// Matches arrays whose elements all match.
#[derive(Clone)]
pub struct ArrayOf {
    element: ValidatorRef,
}

impl ArrayOf {
    pub fn new(element: impl Validator + 'static) -> Self {
        Self {
            element: Arc::new(element),
        }
    }

    pub fn element_validator(&self) -> &ValidatorRef {
        &self.element
    }
}

impl Validator for ArrayOf {
    fn matches(&self, value: &Value) -> bool {
        match value {
            Value::Array(items) => items.iter().all(|item| self.element.matches(item)),
            _ => false,
        }
    }
}

/// Matches maps with homogeneous keys and values.
#[derive(Clone)]
pub struct HashOf {
    key: ValidatorRef,
    value: ValidatorRef,
}

impl std::fmt::Debug for HashOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashOf").finish_non_exhaustive()
    }
}

impl HashOf {
    pub fn new(key: impl Validator + 'static, value: impl Validator + 'static) -> Self {
        Self {
            key: Arc::new(key),
            value: Arc::new(value),
        }
    }

    pub fn key_validator(&self) -> &ValidatorRef {
        &self.key
    }

    pub fn value_validator(&self) -> &ValidatorRef {
        &self.value
    }
}

impl Validator for HashOf {
    fn matches(&self, value: &Value) -> bool {
        match value {
            Value::Map(map) => map
                .iter()
                .all(|(k, v)| self.key.matches(k) && self.value.matches(v)),
            _ => false,
        }
    }
}

/// Matches ranges whose present bounds match. Missing bounds (beginless or
/// endless ranges) are not failures.
#[derive(Clone)]
pub struct RangeOf {
    bound: ValidatorRef,
}

impl RangeOf {
    pub fn new(bound: impl Validator + 'static) -> Self {
        Self {
            bound: Arc::new(bound),
        }
    }

    pub fn subvalidator(&self) -> &ValidatorRef {
        &self.bound
    }
}

impl Validator for RangeOf {
    fn matches(&self, value: &Value) -> bool {
        match value {
            Value::Range(range) => range.bounds().all(|b| self.bound.matches(b)),
            _ => false,
        }
    }
}

/// Matches instances of a class or of any of its subclasses.
#[derive(Clone)]
pub struct InstanceOf {
    class: Arc<ValueClass>,
}

impl InstanceOf {
    pub fn new(class: Arc<ValueClass>) -> Self {
        Self { class }
    }

    pub fn class(&self) -> &Arc<ValueClass> {
        &self.class
    }
}

impl Validator for InstanceOf {
    fn matches(&self, value: &Value) -> bool {
        match value {
            Value::Object(instance) => instance.class().is_a(&self.class),
            _ => false,
        }
    }
}
