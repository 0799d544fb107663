//! Constructed value-object instances and their derived operations.
//!
//! Everything here is a function of the class's recipe and the resolved
//! values: `to_map`, `with`, equality, hashing, and the diagnostic string.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::class::ValueClass;
use crate::error::{ValueError, ValueResult};
use crate::name::Name;
use crate::recipe::Recipe;
use crate::value::{ToMapping, Value, ValueMap};

static NIL: Value = Value::Nil;

/// An immutable value object.
///
/// `==` is strict equality (same class, equal attributes) and agrees with
/// `Hash`. Use [`Instance::loosely_eq`] for equality across a subclass
/// relationship.
#[derive(Clone)]
pub struct Instance {
    class: Arc<ValueClass>,
    values: Arc<[Value]>,
}

impl Instance {
    /// `values` must be in recipe order.
    pub(crate) fn from_parts(class: Arc<ValueClass>, values: Vec<Value>) -> Self {
        debug_assert_eq!(class.recipe().len(), values.len());
        Self {
            class,
            values: values.into(),
        }
    }

    pub fn class(&self) -> &Arc<ValueClass> {
        &self.class
    }

    pub fn recipe(&self) -> &Recipe {
        self.class.recipe()
    }

    pub fn is_a(&self, class: &ValueClass) -> bool {
        self.class.is_a(class)
    }

    /// Value of the attribute with public name `name`.
    pub fn get(&self, name: &str) -> ValueResult<&Value> {
        match self.recipe().index_of(name) {
            Some(index) => Ok(&self.values[index]),
            None => Err(ValueError::unrecognized(
                self.class.name(),
                vec![Value::symbol(name)],
            )),
        }
    }

    /// Value stored under a storage slot name (`trained` for `trained?`).
    ///
    /// Unknown slots read as `Nil`; bound types check their accessors
    /// against the recipe when the class is built.
    pub fn slot(&self, storage_name: &str) -> &Value {
        self.recipe()
            .slot_index(storage_name)
            .map_or(&NIL, |index| &self.values[index])
    }

    /// `(name, value)` pairs in recipe order.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> {
        self.recipe().names().zip(self.values.iter())
    }

    /// Attribute values keyed by name symbols, in recipe order.
    pub fn to_map(&self) -> ValueMap {
        self.iter()
            .map(|(name, value)| (Value::Symbol(name.clone()), value.clone()))
            .collect()
    }

    /// A new instance with `overrides` applied over the current attributes.
    ///
    /// Every attribute is coerced and validated again.
    pub fn with<M>(&self, overrides: &M) -> ValueResult<Instance>
    where
        M: ToMapping + ?Sized,
    {
        let Some(overrides) = overrides.to_mapping() else {
            return Err(ValueError::type_error(self.class.name(), overrides.type_name()));
        };
        let mut merged = self.to_map();
        merged.extend(overrides);
        self.class.construct(&merged)
    }

    /// Equal attributes, and either class is the other or a subclass of it.
    pub fn loosely_eq(&self, other: &Instance) -> bool {
        (self.class.is_a(&other.class) || other.class.is_a(&self.class)) && self.values == other.values
    }

    /// The resolved attributes for pattern-matching consumers, optionally
    /// restricted to `keys`.
    pub fn deconstruct_keys(&self, keys: Option<&[&str]>) -> ValueMap {
        match keys {
            None => self.to_map(),
            Some(keys) => self
                .iter()
                .filter(|(name, _)| keys.contains(&name.as_str()))
                .map(|(name, value)| (Value::Symbol(name.clone()), value.clone()))
                .collect(),
        }
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.class.id() == other.class.id() && self.values == other.values
    }
}

impl Eq for Instance {}

impl Hash for Instance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class.id().hash(state);
        self.values.hash(state);
    }
}

impl ToMapping for Instance {
    fn to_mapping(&self) -> Option<ValueMap> {
        Some(self.to_map())
    }

    fn type_name(&self) -> &str {
        self.class.name()
    }
}

/// `#<Doggums name="Fido" trained?=true>`; `{:#?}` puts one attribute per line.
impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}", self.class.name())?;
        let separator = if f.alternate() { "\n " } else { " " };
        for (name, value) in self.iter() {
            write!(f, "{separator}{name}={value:?}")?;
        }
        f.write_str(">")
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Options;
    use crate::attrs;
    use crate::validator::{Anything, Bool, Kind};
    use std::collections::HashMap;

    fn dog() -> Arc<ValueClass> {
        ValueClass::for_attributes("Doggums", |dsl| {
            dsl.attr("name", Anything, Options::new())?;
            dsl.attr("trained?", Bool, Options::new())?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn accessors_by_name_and_slot() {
        let fido = dog()
            .construct(&attrs! { "name" => "Fido", "trained?" => true })
            .unwrap();
        assert_eq!(fido.get("name").unwrap(), &Value::from("Fido"));
        assert_eq!(fido.get("trained?").unwrap(), &Value::Bool(true));
        assert_eq!(fido.slot("trained"), &Value::Bool(true));
        assert_eq!(fido.slot("missing"), &Value::Nil);
    }

    #[test]
    fn unknown_names_are_unrecognized() {
        let fido = dog()
            .construct(&attrs! { "name" => "Fido", "trained?" => true })
            .unwrap();
        let err = fido.get("trained").unwrap_err();
        assert_eq!(err, ValueError::unrecognized("Doggums", vec![Value::symbol("trained")]));
    }

    #[test]
    fn diagnostic_strings() {
        let fido = dog()
            .construct(&attrs! { "name" => "Fido", "trained?" => true })
            .unwrap();
        assert_eq!(format!("{fido:?}"), "#<Doggums name=\"Fido\" trained?=true>");
        assert_eq!(format!("{fido}"), "#<Doggums name=\"Fido\" trained?=true>");
        assert_eq!(
            format!("{fido:#?}"),
            "#<Doggums\n name=\"Fido\"\n trained?=true>"
        );
    }

    #[test]
    fn with_revalidates_overrides() {
        let sally = dog()
            .construct(&attrs! { "name" => "Sally", "trained?" => false })
            .unwrap();
        let bob = sally.with(&attrs! { "name" => "Bob" }).unwrap();
        assert_eq!(bob.to_map(), attrs! { "name" => "Bob", "trained?" => false }.to_mapping().unwrap());

        let err = sally.with(&attrs! { "trained?" => "yes" }).unwrap_err();
        assert!(err.invalid_attributes().is_some());

        let err = sally.with(&Value::Int(1)).unwrap_err();
        assert_eq!(err, ValueError::type_error("Doggums", "integer"));
    }

    #[test]
    fn strict_and_loose_equality() {
        let dog = dog();
        let puppy = ValueClass::builder("Puppy").extends(&dog).build().unwrap();
        let input = attrs! { "name" => "Fido", "trained?" => true };

        let a = dog.construct(&input).unwrap();
        let b = dog.construct(&input).unwrap();
        let child = puppy.construct(&input).unwrap();

        assert_eq!(a, b);
        assert!(a.loosely_eq(&b));
        assert!(a.loosely_eq(&child));
        assert!(child.loosely_eq(&a));
        assert_ne!(a, child);
    }

    #[test]
    fn unrelated_classes_are_never_loosely_equal() {
        let cat = ValueClass::for_attributes("Cat", |dsl| {
            dsl.attr("name", Anything, Options::new())?;
            dsl.attr("trained?", Bool, Options::new())?;
            Ok(())
        })
        .unwrap();
        let input = attrs! { "name" => "Tom", "trained?" => false };
        let tom_dog = dog().construct(&input).unwrap();
        let tom_cat = cat.construct(&input).unwrap();
        assert!(!tom_dog.loosely_eq(&tom_cat));
    }

    #[test]
    fn usable_as_hash_keys() {
        let dog = dog();
        let puppy = ValueClass::builder("Puppy").extends(&dog).build().unwrap();
        let fido = dog.construct(&attrs! { "name" => "Fido", "trained?" => true }).unwrap();
        let fido_again = dog.construct(&attrs! { "name" => "Fido", "trained?" => true }).unwrap();
        let brutus = dog.construct(&attrs! { "name" => "Brutus", "trained?" => false }).unwrap();
        let pup = puppy.construct(&attrs! { "name" => "Fido", "trained?" => true }).unwrap();

        let mut sounds = HashMap::new();
        sounds.insert(fido.clone(), "woof");
        sounds.insert(brutus.clone(), "grr");
        sounds.insert(fido_again, "bark");
        sounds.insert(pup.clone(), "yip");

        assert_eq!(sounds.len(), 3);
        assert_eq!(sounds[&fido], "bark");
        assert_eq!(sounds[&pup], "yip");
    }

    #[test]
    fn deconstructs_to_a_map() {
        let person = ValueClass::for_attributes("Person", |dsl| {
            dsl.attr("name", Kind::String, Options::new())?;
            dsl.attr("age", Kind::Integer, Options::new())?;
            Ok(())
        })
        .unwrap();
        let tom = person.construct(&attrs! { "name" => "Tom", "age" => 69 }).unwrap();

        let all = tom.deconstruct_keys(None);
        match (all.get(&Value::symbol("name")), all.get(&Value::symbol("age"))) {
            (Some(Value::Str(name)), Some(Value::Int(age))) => {
                assert_eq!(name, "Tom");
                assert_eq!(*age, 69);
            }
            other => panic!("unexpected deconstruction: {other:?}"),
        }

        let only_age = tom.deconstruct_keys(Some(&["age"]));
        assert_eq!(only_age.len(), 1);
    }
}
