//! Declaration builder that compiles attribute declarations into a [`Recipe`].
//!
//! Two paths share the builder without colliding:
//!
//! - **Attribute declarations**: [`Dsl::attr`] for ordinary lower-case names,
//!   and [`Dsl::def_attr`] for anything else (names with punctuation, names
//!   that start upper-case).
//! - **Factories** for the built-in validators and coercers ([`Dsl::bool`],
//!   [`Dsl::either`], [`Dsl::array_of`], ...).
//!
//! ```
//! use valuekit_core::{Dsl, Kind, Options};
//!
//! let recipe = Dsl::run(|dsl| {
//!     dsl.attr("name", Kind::String, Options::new())?;
//!     dsl.attr("trained?", dsl.bool(), Options::new().default(false))?;
//!     dsl.def_attr("array test", dsl.array_of(Kind::Integer), Options::new())?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert_eq!(recipe.len(), 3);
//! ```

use crate::attribute::{Attribute, Options};
use crate::coercer::{ArrayCoercer, Coercer, CoercerRef, HashCoercer};
use crate::error::{ValueError, ValueResult};
use crate::name::Name;
use crate::recipe::Recipe;
use crate::validator::{Anything, ArrayOf, Bool, Either, HashOf, RangeOf, Validator, ValidatorRef};

/// Single-use recipe builder.
#[derive(Debug, Default)]
pub struct Dsl {
    attributes: Vec<Attribute>,
}

impl Dsl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a declaration block and finalizes the recipe.
    pub fn run<F>(declare: F) -> ValueResult<Recipe>
    where
        F: FnOnce(&mut Dsl) -> ValueResult<()>,
    {
        let mut dsl = Dsl::new();
        declare(&mut dsl)?;
        dsl.finish()
    }

    /// Declares an attribute with an ordinary name.
    ///
    /// Names starting with an upper-case character belong to the factory
    /// path and are rejected here; use [`Dsl::def_attr`] for those.
    pub fn attr(
        &mut self,
        name: &str,
        validator: impl Validator + 'static,
        options: Options,
    ) -> ValueResult<&mut Self> {
        let name = Name::new(name);
        if !name.is_bare_declarable() {
            return Err(ValueError::configuration(format!(
                "`{name}` can not be declared as a bare attribute; use `def_attr` for names that start upper-case"
            )));
        }
        self.def_attr(name, validator, options)
    }

    /// Declares an attribute with any non-empty name.
    pub fn def_attr(
        &mut self,
        name: impl Into<Name>,
        validator: impl Validator + 'static,
        options: Options,
    ) -> ValueResult<&mut Self> {
        let attr = Attribute::define(name, validator, options)?;
        self.push(attr)
    }

    /// Adds an already-built attribute.
    pub fn push(&mut self, attr: Attribute) -> ValueResult<&mut Self> {
        if let Some(existing) = self
            .attributes
            .iter()
            .find(|a| a.name() == attr.name() || a.storage_name() == attr.storage_name())
        {
            return Err(ValueError::configuration(format!(
                "attribute `{}` conflicts with already declared attribute `{}`",
                attr.name(),
                existing.name()
            )));
        }
        self.attributes.push(attr);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Freezes the declarations into a recipe, consuming the builder.
    pub fn finish(self) -> ValueResult<Recipe> {
        let recipe = Recipe::new(self.attributes)?;
        tracing::debug!(attributes = recipe.len(), "recipe finalized");
        Ok(recipe)
    }

    pub fn anything(&self) -> Anything {
        Anything
    }

    pub fn bool(&self) -> Bool {
        Bool
    }

    pub fn either(&self, subvalidators: impl IntoIterator<Item = ValidatorRef>) -> Either {
        Either::new(subvalidators.into_iter().collect())
    }

    pub fn array_of(&self, element: impl Validator + 'static) -> ArrayOf {
        ArrayOf::new(element)
    }

    /// Takes key/value validator pairs; exactly one pair is allowed.
    pub fn hash_of<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> ValueResult<HashOf>
    where
        K: Validator + 'static,
        V: Validator + 'static,
    {
        let mut pairs = pairs.into_iter();
        match (pairs.next(), pairs.next()) {
            (Some((key, value)), None) => Ok(HashOf::new(key, value)),
            _ => Err(ValueError::configuration(
                "hash_of takes exactly one key validator and one value validator",
            )),
        }
    }

    pub fn range_of(&self, bound: impl Validator + 'static) -> RangeOf {
        RangeOf::new(bound)
    }

    pub fn array_coercer(&self, element: Option<CoercerRef>) -> ArrayCoercer {
        ArrayCoercer::from_ref(element)
    }

    pub fn hash_coercer(
        &self,
        keys: impl Coercer + 'static,
        values: impl Coercer + 'static,
    ) -> HashCoercer {
        HashCoercer::new().keys(keys).values(values)
    }
}
