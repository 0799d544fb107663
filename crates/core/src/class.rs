//! Binding recipes to concrete value types, and constructing instances.
//!
//! A [`ValueClass`] is the runtime identity of one value type: exactly one
//! recipe, an optional parent class (subclasses share the parent's recipe),
//! and the coercion functions that delegated coercion resolves against.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::coercer::ValueObjectCoercer;
use crate::dsl::Dsl;
use crate::error::{ValueError, ValueResult};
use crate::id::ClassId;
use crate::instance::Instance;
use crate::recipe::Recipe;
use crate::validator::InstanceOf;
use crate::value::{ToMapping, Value};

/// A class-level coercion function, called with the raw value and the class
/// doing the constructing.
pub type CoercionFn = Arc<dyn Fn(Value, &ValueClass) -> Value + Send + Sync>;

pub struct ValueClass {
    id: ClassId,
    name: String,
    recipe: Arc<Recipe>,
    parent: Option<Arc<ValueClass>>,
    coercions: HashMap<String, CoercionFn>,
}

impl ValueClass {
    pub fn builder(name: impl Into<String>) -> ValueClassBuilder {
        ValueClassBuilder::new(name)
    }

    /// Declares and binds a class in one step.
    pub fn for_attributes<F>(name: impl Into<String>, declare: F) -> ValueResult<Arc<ValueClass>>
    where
        F: FnOnce(&mut Dsl) -> ValueResult<()>,
    {
        Self::builder(name).recipe(Dsl::run(declare)?).build()
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn shared_recipe(&self) -> &Arc<Recipe> {
        &self.recipe
    }

    pub fn parent(&self) -> Option<&Arc<ValueClass>> {
        self.parent.as_ref()
    }

    /// Whether `self` is `other` or one of its subclasses.
    pub fn is_a(&self, other: &ValueClass) -> bool {
        self.id == other.id || self.parent.as_ref().is_some_and(|p| p.is_a(other))
    }

    /// Resolves a coercion function by name, own functions first, then the
    /// parent chain.
    pub fn delegated_coercion(&self, method: &str) -> Option<&CoercionFn> {
        self.coercions
            .get(method)
            .or_else(|| self.parent.as_ref()?.delegated_coercion(method))
    }

    /// Coercer that builds instances of this class from map-like input.
    pub fn coercer(self: &Arc<Self>) -> ValueObjectCoercer {
        ValueObjectCoercer::new(Arc::clone(self))
    }

    /// Validator matching instances of this class and its subclasses.
    pub fn validator(self: &Arc<Self>) -> InstanceOf {
        InstanceOf::new(Arc::clone(self))
    }

    /// Builds a validated instance from map-like input.
    ///
    /// Every attribute is resolved before any error is reported, so each
    /// error lists every offender of its category. When several categories
    /// apply, unrecognized keys win over missing attributes, which win over
    /// invalid values. The input is copied, never mutated.
    pub fn construct<M>(self: &Arc<Self>, attributes: &M) -> ValueResult<Instance>
    where
        M: ToMapping + ?Sized,
    {
        let Some(mut remaining) = attributes.to_mapping() else {
            return Err(ValueError::type_error(&self.name, attributes.type_name()));
        };

        let mut values = Vec::with_capacity(self.recipe.len());
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        for attr in self.recipe.attributes() {
            match attr.determine(&remaining, self) {
                Ok((_, value)) => values.push(value),
                Err(ValueError::MissingAttributes { names, .. }) => missing.extend(names),
                Err(ValueError::InvalidValue { invalid: found, .. }) => invalid.extend(found),
                Err(other) => return Err(other),
            }
            remaining.shift_remove(attr.key());
        }

        if !remaining.is_empty() {
            tracing::debug!(class = %self.name, keys = remaining.len(), "unrecognized attributes");
            return Err(ValueError::unrecognized(
                &self.name,
                remaining.into_keys().collect(),
            ));
        }
        if !missing.is_empty() {
            tracing::debug!(class = %self.name, missing = missing.len(), "missing attributes");
            return Err(ValueError::missing(&self.name, missing));
        }
        if !invalid.is_empty() {
            tracing::debug!(class = %self.name, invalid = invalid.len(), "invalid attributes");
            return Err(ValueError::invalid(&self.name, invalid));
        }

        Ok(Instance::from_parts(Arc::clone(self), values))
    }
}

impl fmt::Debug for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueClass")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("recipe", &self.recipe)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder for [`ValueClass`].
pub struct ValueClassBuilder {
    name: String,
    recipe: Option<Recipe>,
    declaration_error: Option<ValueError>,
    parent: Option<Arc<ValueClass>>,
    coercions: HashMap<String, CoercionFn>,
    accessors: Vec<String>,
}

impl ValueClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recipe: None,
            declaration_error: None,
            parent: None,
            coercions: HashMap::new(),
            accessors: Vec::new(),
        }
    }

    pub fn recipe(mut self, recipe: Recipe) -> Self {
        self.recipe = Some(recipe);
        self
    }

    /// Runs a declaration block; any declaration error is reported by
    /// [`ValueClassBuilder::build`].
    pub fn attributes<F>(mut self, declare: F) -> Self
    where
        F: FnOnce(&mut Dsl) -> ValueResult<()>,
    {
        match Dsl::run(declare) {
            Ok(recipe) => self.recipe = Some(recipe),
            Err(err) => self.declaration_error = Some(err),
        }
        self
    }

    /// Makes the class a subclass of `parent`, sharing its recipe.
    pub fn extends(mut self, parent: &Arc<ValueClass>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Registers a coercion function under `method` (`coerce_<attribute>`).
    pub fn coercion<F>(mut self, method: impl Into<String>, coerce: F) -> Self
    where
        F: Fn(Value, &ValueClass) -> Value + Send + Sync + 'static,
    {
        self.coercions.insert(method.into(), Arc::new(coerce));
        self
    }

    /// Storage slot names that accessors will read; each must exist.
    pub fn accessors<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accessors.extend(slots.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> ValueResult<Arc<ValueClass>> {
        if let Some(err) = self.declaration_error {
            return Err(err);
        }

        let recipe = match (self.recipe, &self.parent) {
            (Some(_), Some(parent)) => {
                return Err(ValueError::configuration(format!(
                    "`{}` can not declare its own recipe while extending `{}`",
                    self.name,
                    parent.name()
                )));
            }
            (Some(recipe), None) => Arc::new(recipe),
            (None, Some(parent)) => Arc::clone(parent.shared_recipe()),
            (None, None) => {
                return Err(ValueError::configuration(format!(
                    "`{}` has no recipe",
                    self.name
                )));
            }
        };

        let class = ValueClass {
            id: ClassId::new(),
            name: self.name,
            recipe,
            parent: self.parent,
            coercions: self.coercions,
        };

        for attr in class.recipe.attributes().filter(|a| a.is_delegated()) {
            let method = attr.coercion_method();
            if class.delegated_coercion(&method).is_none() {
                return Err(ValueError::configuration(format!(
                    "`{}` must provide `{method}` to coerce attribute `{}`",
                    class.name,
                    attr.name()
                )));
            }
        }

        for slot in &self.accessors {
            if class.recipe.slot_index(slot).is_none() {
                return Err(ValueError::configuration(format!(
                    "`{}` has no attribute stored as `{slot}`",
                    class.name
                )));
            }
        }

        tracing::debug!(
            class = %class.name,
            id = %class.id,
            attributes = class.recipe.len(),
            "value class bound"
        );
        Ok(Arc::new(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Options;
    use crate::attrs;
    use crate::validator::{Anything, Kind};

    fn dog() -> Arc<ValueClass> {
        ValueClass::for_attributes("Doggums", |dsl| {
            dsl.attr("name", Anything, Options::new())?;
            dsl.attr("trained?", Anything, Options::new())?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn subclasses_share_the_parent_recipe() {
        let dog = dog();
        let puppy = ValueClass::builder("Puppy").extends(&dog).build().unwrap();

        assert!(Arc::ptr_eq(dog.shared_recipe(), puppy.shared_recipe()));
        assert!(puppy.is_a(&dog));
        assert!(!dog.is_a(&puppy));
        assert_ne!(dog.id(), puppy.id());
    }

    #[test]
    fn extending_with_a_new_recipe_is_rejected() {
        let dog = dog();
        let recipe = Dsl::run(|dsl| {
            dsl.attr("bark", Anything, Options::new())?;
            Ok(())
        })
        .unwrap();
        let err = ValueClass::builder("Wolf")
            .extends(&dog)
            .recipe(recipe)
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn a_recipe_is_required() {
        let err = ValueClass::builder("Empty").build().unwrap_err();
        assert_eq!(err, ValueError::configuration("`Empty` has no recipe"));
    }

    #[test]
    fn declaration_errors_surface_from_build() {
        let err = ValueClass::builder("Broken")
            .attributes(|dsl| {
                dsl.attr("x", Anything, Options::new().default(1).default_generator(|| Value::Nil))?;
                Ok(())
            })
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn delegated_coercion_is_resolved_at_binding() {
        let err = ValueClass::builder("Widgets")
            .attributes(|dsl| {
                dsl.attr("widgets", Kind::String, Options::new().coerce_delegated())?;
                Ok(())
            })
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValueError::configuration(
                "`Widgets` must provide `coerce_widgets` to coerce attribute `widgets`"
            )
        );
    }

    #[test]
    fn subclass_coercions_override_the_parent() {
        let parent = ValueClass::builder("Label")
            .attributes(|dsl| {
                dsl.attr("text", Kind::String, Options::new().coerce_delegated())?;
                Ok(())
            })
            .coercion("coerce_text", |v, _| match v {
                Value::Str(s) => Value::Str(s.to_uppercase()),
                other => other,
            })
            .build()
            .unwrap();
        let child = ValueClass::builder("QuietLabel")
            .extends(&parent)
            .coercion("coerce_text", |v, class: &ValueClass| match v {
                Value::Str(s) => Value::Str(format!("{}: {}", class.name(), s.to_lowercase())),
                other => other,
            })
            .build()
            .unwrap();

        let loud = parent.construct(&attrs! { "text" => "Hi" }).unwrap();
        let quiet = child.construct(&attrs! { "text" => "Hi" }).unwrap();
        assert_eq!(loud.get("text").unwrap(), &Value::from("HI"));
        assert_eq!(quiet.get("text").unwrap(), &Value::from("QuietLabel: hi"));
    }

    #[test]
    fn accessors_must_name_storage_slots() {
        let ok = ValueClass::builder("Doggums")
            .attributes(|dsl| {
                dsl.attr("trained?", Anything, Options::new())?;
                Ok(())
            })
            .accessors(["trained"])
            .build();
        assert!(ok.is_ok());

        let err = ValueClass::builder("Doggums")
            .attributes(|dsl| {
                dsl.attr("trained?", Anything, Options::new())?;
                Ok(())
            })
            .accessors(["trained?"])
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn non_map_input_is_a_type_error() {
        let err = dog().construct(&Value::array(vec!["Fido"])).unwrap_err();
        assert_eq!(err, ValueError::type_error("Doggums", "array"));
        let err = dog().construct(&Value::Int(3)).unwrap_err();
        assert_eq!(err, ValueError::type_error("Doggums", "integer"));
    }

    #[test]
    fn unrecognized_keys_take_priority() {
        let err = dog()
            .construct(&attrs! { "meow" => "cattt", "moo" => "cowww" })
            .unwrap_err();
        assert_eq!(
            err.unrecognized_keys(),
            Some(&[Value::symbol("meow"), Value::symbol("moo")][..])
        );
    }
}
