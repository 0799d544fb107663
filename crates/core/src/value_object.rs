//! Value object trait: binding a Rust type to its value class.
//!
//! Value objects have **no identity** - they are defined entirely by their
//! attribute values. Two value objects of the same class with the same values
//! are equal, and "changing" one always produces a new value.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::class::ValueClass;
use crate::coercer::ValueObjectCoercer;
use crate::error::{ValueError, ValueResult};
use crate::instance::Instance;
use crate::recipe::Recipe;
use crate::value::{ToMapping, Value, ValueMap};

/// A Rust type bound to exactly one [`ValueClass`].
///
/// Implemented by [`value_object!`](crate::value_object); the provided
/// methods are all derived from the class's recipe.
///
/// ## Usage Pattern
///
/// ```
/// use valuekit_core::{attrs, value_object, Kind, Options, ValueObject};
///
/// value_object! {
///     /// A tidy amount of money.
///     pub struct Money {
///         amount,
///         currency,
///     }
///     recipe(dsl) {
///         dsl.attr("amount", Kind::Integer, Options::new())?;
///         dsl.attr("currency", Kind::String, Options::new().default("USD"))?;
///         Ok(())
///     }
/// }
///
/// let m1 = Money::new(&attrs! { "amount" => 100 }).unwrap();
/// let m2 = Money::new(&attrs! { "amount" => 100, "currency" => "USD" }).unwrap();
/// assert_eq!(m1, m2);
/// assert_eq!(m1.currency().as_str(), Some("USD"));
/// ```
pub trait ValueObject: Clone + PartialEq + Eq + Hash + fmt::Debug {
    /// The class this type is bound to.
    fn value_class() -> &'static Arc<ValueClass>;

    /// Wraps an instance of this type's class (or of a subclass).
    fn from_instance(instance: Instance) -> Self;

    fn as_instance(&self) -> &Instance;

    fn recipe() -> &'static Recipe {
        Self::value_class().recipe()
    }

    fn construct<M>(attributes: &M) -> ValueResult<Self>
    where
        M: ToMapping + ?Sized,
    {
        Self::value_class()
            .construct(attributes)
            .map(Self::from_instance)
    }

    fn with<M>(&self, overrides: &M) -> ValueResult<Self>
    where
        M: ToMapping + ?Sized,
    {
        self.as_instance().with(overrides).map(Self::from_instance)
    }

    fn to_map(&self) -> ValueMap {
        self.as_instance().to_map()
    }

    fn coercer() -> ValueObjectCoercer {
        Self::value_class().coercer()
    }

    /// Loose equality with any other value object.
    fn loosely_eq<O: ValueObject>(&self, other: &O) -> bool {
        self.as_instance().loosely_eq(other.as_instance())
    }

    /// Accepts instances of this type's class (or a subclass) as they are, and
    /// constructs from anything else that is map-like.
    fn try_from_value(value: Value) -> ValueResult<Self> {
        match value {
            Value::Object(instance) if instance.is_a(Self::value_class()) => {
                Ok(Self::from_instance(instance))
            }
            other if other.to_mapping().is_some() => Self::construct(&other),
            other => Err(ValueError::type_error(
                Self::value_class().name(),
                other.type_name(),
            )),
        }
    }
}

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;

    pub fn declaration_failed(type_name: &str, err: &crate::ValueError) -> ! {
        panic!("invalid value object declaration for `{type_name}`: {err}")
    }
}

/// Declares a value object type.
///
/// The class is built on first use. Accessors read storage slots, so an
/// attribute named `trained?` is read with `trained()`. Declaration errors
/// panic on first use with the configuration error.
///
/// ```
/// use valuekit_core::{attrs, value_object, Bool, Kind, Options, ValueObject};
///
/// value_object! {
///     pub struct Doggums {
///         name,
///         trained,
///     }
///     recipe(dsl) {
///         dsl.attr("name", Kind::String, Options::new())?;
///         dsl.attr("trained?", Bool, Options::new())?;
///         Ok(())
///     }
/// }
///
/// value_object! {
///     pub struct Puppy extends Doggums {
///         name,
///         trained,
///     }
/// }
///
/// let dog = Doggums::new(&attrs! { "name" => "Fido", "trained?" => true }).unwrap();
/// let pup = Puppy::new(&attrs! { "name" => "Fido", "trained?" => true }).unwrap();
/// assert_eq!(format!("{dog:?}"), "#<Doggums name=\"Fido\" trained?=true>");
/// assert!(dog.loosely_eq(&pup));
/// ```
#[macro_export]
macro_rules! value_object {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($accessor:ident),* $(,)?
        }
        $(coercions { $($coercion:ident),* $(,)? })?
        recipe($dsl:ident) $body:block
    ) => {
        $crate::value_object!(@type $(#[$meta])* $vis $name { $($accessor),* });
        $crate::value_object!(@bind $name {
            $crate::ValueClass::builder(stringify!($name))
                .attributes(|$dsl: &mut $crate::Dsl| -> $crate::ValueResult<()> { $body })
                $($( .coercion(stringify!($coercion), |value, class| $name::$coercion(value, class)) )*)?
                .accessors([$(stringify!($accessor)),*])
        });
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident extends $parent:ty {
            $($accessor:ident),* $(,)?
        }
        $(coercions { $($coercion:ident),* $(,)? })?
    ) => {
        $crate::value_object!(@type $(#[$meta])* $vis $name { $($accessor),* });
        $crate::value_object!(@bind $name {
            $crate::ValueClass::builder(stringify!($name))
                .extends(<$parent as $crate::ValueObject>::value_class())
                $($( .coercion(stringify!($coercion), |value, class| $name::$coercion(value, class)) )*)?
                .accessors([$(stringify!($accessor)),*])
        });
    };
    (@type $(#[$meta:meta])* $vis:vis $name:ident { $($accessor:ident),* }) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        $vis struct $name($crate::Instance);

        #[allow(dead_code)]
        impl $name {
            pub fn new<M>(attributes: &M) -> $crate::ValueResult<Self>
            where
                M: $crate::ToMapping + ?Sized,
            {
                <Self as $crate::ValueObject>::construct(attributes)
            }

            pub fn with<M>(&self, overrides: &M) -> $crate::ValueResult<Self>
            where
                M: $crate::ToMapping + ?Sized,
            {
                <Self as $crate::ValueObject>::with(self, overrides)
            }

            pub fn to_map(&self) -> $crate::ValueMap {
                self.0.to_map()
            }

            $(
                pub fn $accessor(&self) -> &$crate::Value {
                    self.0.slot(stringify!($accessor))
                }
            )*
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(&self.0, f)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::convert::From<$name> for $crate::Value {
            fn from(value: $name) -> Self {
                $crate::Value::Object(value.0)
            }
        }
    };
    (@bind $name:ident { $builder:expr }) => {
        impl $crate::ValueObject for $name {
            fn value_class() -> &'static ::std::sync::Arc<$crate::ValueClass> {
                static CLASS: $crate::value_object::__private::Lazy<::std::sync::Arc<$crate::ValueClass>> =
                    $crate::value_object::__private::Lazy::new(|| match $builder.build() {
                        Ok(class) => class,
                        Err(err) => $crate::value_object::__private::declaration_failed(stringify!($name), &err),
                    });
                &CLASS
            }

            fn from_instance(instance: $crate::Instance) -> Self {
                Self(instance)
            }

            fn as_instance(&self) -> &$crate::Instance {
                &self.0
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Options;
    use crate::attrs;
    use crate::validator::{Anything, Kind};

    value_object! {
        struct CoercionTest {
            no_coercion,
            with_true,
            double_it,
        }
        coercions { coerce_with_true }
        recipe(dsl) {
            dsl.attr("no_coercion", Kind::String, Options::new().default(""))?;
            dsl.attr("with_true", Kind::String, Options::new().default("").coerce_delegated())?;
            dsl.attr(
                "double_it",
                Kind::String,
                Options::new().default("42").coerce_with(|v| match v {
                    Value::Str(s) => Value::Str(s.repeat(2)),
                    Value::Int(i) => Value::Int(i * 2),
                    other => other,
                }),
            )?;
            Ok(())
        }
    }

    impl CoercionTest {
        fn coerce_with_true(value: Value, _class: &ValueClass) -> Value {
            Value::Str(format!("class_method: {value}"))
        }
    }

    value_object! {
        struct Broken {
            thing,
        }
        recipe(dsl) {
            dsl.attr("thing", Anything, Options::new().default(1).default_generator(|| Value::Nil))?;
            Ok(())
        }
    }

    #[test]
    fn delegated_coercion_calls_the_class_function() {
        let subject = CoercionTest::new(&attrs! { "with_true" => "peter" }).unwrap();
        assert_eq!(subject.with_true(), &Value::from("class_method: peter"));
    }

    #[test]
    fn no_coercion_by_default() {
        let subject = CoercionTest::new(&attrs! { "no_coercion" => "dinklage" }).unwrap();
        assert_eq!(subject.no_coercion(), &Value::from("dinklage"));
    }

    #[test]
    fn defaults_are_coerced() {
        let subject = CoercionTest::new(&Value::Nil).unwrap();
        assert_eq!(subject.double_it(), &Value::from("4242"));
        assert_eq!(subject.with_true(), &Value::from("class_method: "));
    }

    #[test]
    fn coercion_runs_before_validation() {
        let err = CoercionTest::new(&attrs! { "double_it" => 6 }).unwrap_err();
        assert_eq!(
            err.to_string(),
            "some attributes of `CoercionTest` are invalid: double_it=12"
        );
    }

    #[test]
    fn try_from_value_accepts_instances_and_maps() {
        let built = CoercionTest::new(&Value::Nil).unwrap();
        let same = CoercionTest::try_from_value(Value::from(built.clone())).unwrap();
        assert_eq!(same, built);

        let from_map = CoercionTest::try_from_value(attrs! { "no_coercion" => "x" }).unwrap();
        assert_eq!(from_map.no_coercion(), &Value::from("x"));

        let err = CoercionTest::try_from_value(Value::Int(1)).unwrap_err();
        assert_eq!(err, ValueError::type_error("CoercionTest", "integer"));
    }

    #[test]
    fn recipe_is_shared_by_the_bound_type() {
        let recipe = CoercionTest::recipe();
        assert_eq!(recipe.len(), 3);
        assert!(std::ptr::eq(recipe, CoercionTest::value_class().recipe()));
    }

    #[test]
    #[should_panic(expected = "invalid value object declaration for `Broken`")]
    fn broken_declarations_panic_on_first_use() {
        let _ = Broken::new(&Value::Nil);
    }
}
