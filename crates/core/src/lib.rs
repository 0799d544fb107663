//! `valuekit-core`: immutable value objects built from attribute recipes.
//!
//! A recipe is an ordered list of attributes, each with a validator, an
//! optional coercer, and an optional default. Binding a recipe to a
//! [`ValueClass`] gives construction from map-like input, non-destructive
//! update via `with`, structural equality and hashing, and a diagnostic
//! string.
//!
//! This crate contains **pure** engine code (no process setup); see
//! `valuekit-observability` for subscriber initialization.

pub mod attribute;
pub mod class;
pub mod coercer;
pub mod dsl;
pub mod error;
pub mod fixture;
pub mod id;
pub mod instance;
pub mod name;
pub mod recipe;
pub mod validator;
pub mod value;
pub mod value_object;

pub use attribute::{Attribute, DefaultSpec, Options};
pub use class::{ValueClass, ValueClassBuilder};
pub use coercer::{ArrayCoercer, Coercer, Coercion, HashCoercer, Identity, ValueObjectCoercer};
pub use dsl::Dsl;
pub use error::{InvalidAttribute, ValueError, ValueResult};
pub use id::ClassId;
pub use instance::Instance;
pub use name::Name;
pub use recipe::Recipe;
pub use validator::{Anything, ArrayOf, Bool, Either, HashOf, InstanceOf, Kind, RangeOf, Validator};
pub use value::{RangeValue, ToMapping, Value, ValueMap, ValueSet};
pub use value_object::ValueObject;
