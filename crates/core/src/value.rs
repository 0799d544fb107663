//! Dynamic values flowing through recipes.
//!
//! Attributes are loosely typed on the way in: construction input is any
//! map-like [`Value`], coercers rewrite values, and validators decide what is
//! acceptable. Equality here is strict: `Int(1)` and `Float(1.0)` differ.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};

use crate::instance::Instance;
use crate::name::Name;

/// Insertion-ordered map of values. Equality ignores order.
pub type ValueMap = IndexMap<Value, Value>;

/// Insertion-ordered set of values. Equality ignores order.
pub type ValueSet = IndexSet<Value>;

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(Name),
    Time(DateTime<Utc>),
    Array(Vec<Value>),
    Set(ValueSet),
    Map(ValueMap),
    Range(Box<RangeValue>),
    Object(Instance),
}

/// Longest integer range that converts to a sequence; longer ranges are not
/// sequence-like.
pub const MAX_RANGE_EXPANSION: usize = 1 << 16;

/// A range with optional bounds (`1..5`, `1...5`, `1..`, `..5`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeValue {
    start: Option<Value>,
    end: Option<Value>,
    exclusive: bool,
}

impl RangeValue {
    /// A `Nil` bound is an absent bound.
    pub fn new(start: Option<Value>, end: Option<Value>, exclusive: bool) -> Self {
        Self {
            start: start.filter(|v| !v.is_nil()),
            end: end.filter(|v| !v.is_nil()),
            exclusive,
        }
    }

    pub fn inclusive(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self::new(Some(start.into()), Some(end.into()), false)
    }

    pub fn exclusive(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self::new(Some(start.into()), Some(end.into()), true)
    }

    /// Endless range.
    pub fn endless(start: impl Into<Value>) -> Self {
        Self::new(Some(start.into()), None, false)
    }

    /// Beginless range.
    pub fn beginless(end: impl Into<Value>) -> Self {
        Self::new(None, Some(end.into()), false)
    }

    pub fn start(&self) -> Option<&Value> {
        self.start.as_ref()
    }

    pub fn end(&self) -> Option<&Value> {
        self.end.as_ref()
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Present bounds, lower first.
    pub fn bounds(&self) -> impl Iterator<Item = &Value> {
        self.start.iter().chain(self.end.iter())
    }

    /// Expands integer ranges of at most [`MAX_RANGE_EXPANSION`] elements.
    fn to_sequence(&self) -> Option<Vec<Value>> {
        match (self.start.as_ref()?, self.end.as_ref()?) {
            (Value::Int(a), Value::Int(b)) => {
                let len = i128::from(*b) - i128::from(*a) + i128::from(!self.exclusive);
                if len > MAX_RANGE_EXPANSION as i128 {
                    return None;
                }
                let values = if self.exclusive {
                    (*a..*b).map(Value::Int).collect()
                } else {
                    (*a..=*b).map(Value::Int).collect()
                };
                Some(values)
            }
            _ => None,
        }
    }
}

impl Value {
    pub fn symbol(name: impl Into<Name>) -> Self {
        Value::Symbol(name.into())
    }

    pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn set<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    pub fn map<K: Into<Value>, V: Into<Value>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn range(range: RangeValue) -> Self {
        Value::Range(Box::new(range))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Name> {
        match self {
            Value::Symbol(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&ValueSet> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeValue> {
        match self {
            Value::Range(range) => Some(range),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Name of the concrete type, used in diagnostics. Instances report their
    /// class name.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Time(_) => "time",
            Value::Array(_) => "array",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Range(_) => "range",
            Value::Object(instance) => instance.class().name(),
        }
    }

    /// The "convert to sequence" capability.
    ///
    /// Arrays, sets, maps (as `[key, value]` pairs), integer ranges with both
    /// bounds and at most [`MAX_RANGE_EXPANSION`] elements, and `Nil` (empty)
    /// are sequence-like.
    pub fn to_sequence(&self) -> Option<Vec<Value>> {
        match self {
            Value::Nil => Some(Vec::new()),
            Value::Array(items) => Some(items.clone()),
            Value::Set(items) => Some(items.iter().cloned().collect()),
            Value::Map(map) => Some(
                map.iter()
                    .map(|(k, v)| Value::Array(vec![k.clone(), v.clone()]))
                    .collect(),
            ),
            Value::Range(range) => range.to_sequence(),
            _ => None,
        }
    }
}

/// The "convert to mapping" capability accepted by construction.
pub trait ToMapping {
    /// A fresh copy of this value as a map, or `None` if it is not map-like.
    fn to_mapping(&self) -> Option<ValueMap>;

    /// Concrete type name reported when conversion is refused.
    fn type_name(&self) -> &str;
}

impl ToMapping for Value {
    /// Maps, instances, arrays made only of `[key, value]` pairs, and `Nil`
    /// (empty) are map-like.
    fn to_mapping(&self) -> Option<ValueMap> {
        match self {
            Value::Nil => Some(ValueMap::new()),
            Value::Map(map) => Some(map.clone()),
            Value::Object(instance) => Some(instance.to_map()),
            Value::Array(items) => items
                .iter()
                .map(|item| match item.as_array() {
                    Some([k, v]) => Some((k.clone(), v.clone())),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    fn type_name(&self) -> &str {
        Value::type_name(self)
    }
}

impl ToMapping for ValueMap {
    fn to_mapping(&self) -> Option<ValueMap> {
        Some(self.clone())
    }

    fn type_name(&self) -> &str {
        "map"
    }
}

fn float_key(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

fn unordered_hash<T: Hash, H: Hasher>(items: impl ExactSizeIterator<Item = T>, state: &mut H) {
    state.write_usize(items.len());
    let combined = items
        .map(|item| {
            let mut hasher = DefaultHasher::new();
            item.hash(&mut hasher);
            hasher.finish()
        })
        .fold(0u64, u64::wrapping_add);
    state.write_u64(combined);
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_key(*a) == float_key(*b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => float_key(*f).hash(state),
            Value::Str(s) => s.hash(state),
            Value::Symbol(n) => n.hash(state),
            Value::Time(t) => t.hash(state),
            Value::Array(items) => items.hash(state),
            Value::Set(items) => unordered_hash(items.iter(), state),
            Value::Map(map) => unordered_hash(map.iter(), state),
            Value::Range(range) => range.hash(state),
            Value::Object(instance) => instance.hash(state),
        }
    }
}

fn write_symbol_key(f: &mut fmt::Formatter<'_>, name: &Name) -> fmt::Result {
    if name.is_plain_symbol() {
        write!(f, "{name}: ")
    } else {
        write!(f, "{:?}: ", name.as_str())
    }
}

/// Inspect-style rendering: `nil`, `"text"`, `:sym`, `[1, 2]`, `{name: 1}`.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Symbol(n) => write!(f, "{n:?}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                f.write_str("]")
            }
            Value::Set(items) => {
                f.write_str("#<Set: {")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                f.write_str("}>")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match k {
                        Value::Symbol(name) => write_symbol_key(f, name)?,
                        other => write!(f, "{other:?} => ")?,
                    }
                    write!(f, "{v:?}")?;
                }
                f.write_str("}")
            }
            Value::Range(range) => {
                match range.start() {
                    Some(start) => write!(f, "{start:?}")?,
                    None if range.end().is_none() => f.write_str("nil")?,
                    None => {}
                }
                f.write_str(if range.is_exclusive() { "..." } else { ".." })?;
                match range.end() {
                    Some(end) => write!(f, "{end:?}"),
                    None if range.start().is_none() => f.write_str("nil"),
                    None => Ok(()),
                }
            }
            Value::Object(instance) => write!(f, "{instance:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Symbol(n) => write!(f, "{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Name> for Value {
    fn from(value: Name) -> Self {
        Value::Symbol(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Time(value)
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Value::Object(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

impl From<ValueSet> for Value {
    fn from(value: ValueSet) -> Self {
        Value::Set(value)
    }
}

impl From<RangeValue> for Value {
    fn from(value: RangeValue) -> Self {
        Value::range(value)
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::array(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Array(vec![a.into(), b.into()])
    }
}

impl<T: Into<Value>> From<std::ops::Range<T>> for Value {
    fn from(value: std::ops::Range<T>) -> Self {
        Value::range(RangeValue::exclusive(value.start, value.end))
    }
}

impl<T: Into<Value>> From<std::ops::RangeInclusive<T>> for Value {
    fn from(value: std::ops::RangeInclusive<T>) -> Self {
        let (start, end) = value.into_inner();
        Value::range(RangeValue::inclusive(start, end))
    }
}

impl<T: Into<Value>> From<std::ops::RangeFrom<T>> for Value {
    fn from(value: std::ops::RangeFrom<T>) -> Self {
        Value::range(RangeValue::endless(value.start))
    }
}

impl<T: Into<Value>> From<std::ops::RangeTo<T>> for Value {
    fn from(value: std::ops::RangeTo<T>) -> Self {
        Value::range(RangeValue::new(None, Some(value.end.into()), true))
    }
}

impl<T: Into<Value>> From<std::ops::RangeToInclusive<T>> for Value {
    fn from(value: std::ops::RangeToInclusive<T>) -> Self {
        Value::range(RangeValue::beginless(value.end))
    }
}

impl From<std::ops::RangeFull> for Value {
    fn from(_: std::ops::RangeFull) -> Self {
        Value::range(RangeValue::new(None, None, false))
    }
}

/// JSON objects keep string keys; integers that fit `i64` stay integers.
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Nil, Value::Float),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::array(items),
            serde_json::Value::Object(object) => {
                Value::Map(object.into_iter().map(|(k, v)| (Value::Str(k), v.into())).collect())
            }
        }
    }
}

/// Builds a `Value::Map` keyed by attribute-name symbols.
///
/// ```
/// use valuekit_core::{attrs, Value};
///
/// let input = attrs! { "name" => "Fido", "trained?" => true };
/// assert_eq!(input.as_map().map(|m| m.len()), Some(2));
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::Value::Map($crate::ValueMap::new())
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ValueMap::new();
        $( map.insert($crate::Value::symbol($name), $crate::Value::from($value)); )+
        $crate::Value::Map(map)
    }};
}

/// Builds a `Value::Map` with arbitrary keys.
#[macro_export]
macro_rules! map {
    () => {
        $crate::Value::Map($crate::ValueMap::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ValueMap::new();
        $( map.insert($crate::Value::from($key), $crate::Value::from($value)); )+
        $crate::Value::Map(map)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equality_is_strict_about_numeric_kinds() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn map_equality_and_hash_ignore_order() {
        let a = map! { "x" => 1, "y" => 2 };
        let b = map! { "y" => 2, "x" => 1 };
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn pair_arrays_are_map_like() {
        let pairs = Value::array(vec![(Value::symbol("name"), Value::from("Rex"))]);
        let map = pairs.to_mapping().expect("pairs convert");
        assert_eq!(map.get(&Value::symbol("name")), Some(&Value::from("Rex")));

        assert!(Value::array(vec!["Fido"]).to_mapping().is_none());
        assert!(Value::from(5).to_mapping().is_none());
        assert_eq!(Value::Nil.to_mapping(), Some(ValueMap::new()));
    }

    #[test]
    fn sequences_cover_collections_and_integer_ranges() {
        assert_eq!(
            Value::from(1..4).to_sequence(),
            Some(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            Value::from(1..=2).to_sequence(),
            Some(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(Value::from(1..).to_sequence(), None);
        assert_eq!(
            map! { "a" => 1 }.to_sequence(),
            Some(vec![Value::array(vec![Value::from("a"), Value::from(1)])])
        );
        assert_eq!(Value::from("abc").to_sequence(), None);
    }

    #[test]
    fn huge_ranges_are_not_sequence_like() {
        assert_eq!(Value::from(0..i64::MAX).to_sequence(), None);
        assert_eq!(Value::from(i64::MIN..=i64::MAX).to_sequence(), None);
        assert_eq!(Value::from(5..1).to_sequence(), Some(Vec::new()));

        let limit = MAX_RANGE_EXPANSION as i64;
        assert_eq!(
            Value::from(0..limit).to_sequence().map(|items| items.len()),
            Some(MAX_RANGE_EXPANSION)
        );
        assert_eq!(Value::from(0..=limit).to_sequence(), None);
    }

    #[test]
    fn nil_bounds_are_absent_bounds() {
        let range = RangeValue::inclusive(Value::Nil, 5);
        assert_eq!(range, RangeValue::beginless(5));
        assert_eq!(range.start(), None);
        assert_eq!(format!("{:?}", Value::from(None::<i64>..=Some(5i64))), "..5");
        assert_eq!(Value::from(Some(1i64)..None), Value::from(RangeValue::new(Some(Value::Int(1)), None, true)));
    }

    #[test]
    fn inspect_rendering() {
        assert_eq!(format!("{:?}", Value::Nil), "nil");
        assert_eq!(format!("{:?}", Value::from("Fido")), "\"Fido\"");
        assert_eq!(format!("{:?}", Value::symbol("meow")), ":meow");
        assert_eq!(format!("{:?}", Value::array(vec![1, 2])), "[1, 2]");
        assert_eq!(
            format!("{:?}", attrs! { "name" => 1, "trained?" => true }),
            "{name: 1, trained?: true}"
        );
        assert_eq!(format!("{:?}", map! { "k" => 2 }), "{\"k\" => 2}");
        assert_eq!(format!("{:?}", Value::set(vec![1, 2])), "#<Set: {1, 2}>");
        assert_eq!(format!("{:?}", Value::from(1..5)), "1...5");
        assert_eq!(format!("{:?}", Value::from(1..=5)), "1..5");
        assert_eq!(format!("{:?}", Value::from(1..)), "1..");
        assert_eq!(format!("{:?}", Value::from(..=5)), "..5");
    }

    #[test]
    fn json_objects_keep_string_keys() {
        let json = serde_json::json!({ "name": "Jim", "age": 5, "ratio": 0.5, "tags": [] });
        let value = Value::from(json);
        let map = value.as_map().expect("object converts to map");
        assert_eq!(map.get(&Value::from("name")), Some(&Value::from("Jim")));
        assert_eq!(map.get(&Value::from("age")), Some(&Value::Int(5)));
        assert_eq!(map.get(&Value::from("ratio")), Some(&Value::Float(0.5)));
        assert_eq!(map.get(&Value::from("tags")), Some(&Value::Array(vec![])));
    }
}
