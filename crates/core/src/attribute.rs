//! A single named attribute: validator, coercion, and default policy.

use std::fmt;
use std::sync::Arc;

use crate::class::ValueClass;
use crate::coercer::{Coercer, Coercion};
use crate::error::{InvalidAttribute, ValueError, ValueResult};
use crate::name::Name;
use crate::validator::{Anything, Validator, ValidatorRef};
use crate::value::{Value, ValueMap};

/// Produces a fresh default value on every call.
pub type Generator = Arc<dyn Fn() -> Value + Send + Sync>;

/// What happens when an attribute is absent from the input.
#[derive(Clone)]
pub enum DefaultSpec {
    Required,
    Fixed(Value),
    Generator(Generator),
}

impl fmt::Debug for DefaultSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSpec::Required => f.write_str("Required"),
            DefaultSpec::Fixed(v) => write!(f, "Fixed({v:?})"),
            DefaultSpec::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Declaration options for one attribute.
///
/// `default` and `default_generator` are mutually exclusive; supplying both
/// is rejected by [`Attribute::define`].
#[derive(Clone)]
pub struct Options {
    default: Option<Value>,
    default_generator: Option<Generator>,
    coerce: Option<Coercion>,
}

impl Options {
    pub fn new() -> Self {
        Self {
            default: None,
            default_generator: None,
            coerce: None,
        }
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn default_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default_generator = Some(Arc::new(generator));
        self
    }

    pub fn coerce(mut self, coercer: impl Coercer + 'static) -> Self {
        self.coerce = Some(Coercion::With(Arc::new(coercer)));
        self
    }

    pub fn coerce_with<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.coerce(f)
    }

    /// Coerce through the owning class's `coerce_<attribute name>` function.
    pub fn coerce_delegated(mut self) -> Self {
        self.coerce = Some(Coercion::Delegated);
        self
    }
}

/// One attribute of a recipe. Immutable once built.
#[derive(Clone)]
pub struct Attribute {
    name: Name,
    key: Value,
    validator: ValidatorRef,
    coercion: Option<Coercion>,
    default: DefaultSpec,
}

impl Attribute {
    /// A required attribute that accepts anything and does not coerce.
    pub fn new(name: impl Into<Name>) -> Self {
        let name = name.into();
        Self {
            key: Value::Symbol(name.clone()),
            name,
            validator: Arc::new(Anything),
            coercion: None,
            default: DefaultSpec::Required,
        }
    }

    /// Declares an attribute, rejecting conflicting options immediately.
    pub fn define(
        name: impl Into<Name>,
        validator: impl Validator + 'static,
        options: Options,
    ) -> ValueResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValueError::configuration("attribute names can not be empty"));
        }

        let default = match (options.default, options.default_generator) {
            (Some(_), Some(_)) => {
                return Err(ValueError::configuration(format!(
                    "attribute `{name}` can not have both a `default` and a `default_generator`"
                )));
            }
            (Some(value), None) => DefaultSpec::Fixed(value),
            (None, Some(generator)) => DefaultSpec::Generator(generator),
            (None, None) => DefaultSpec::Required,
        };

        Ok(Self {
            key: Value::Symbol(name.clone()),
            name,
            validator: Arc::new(validator),
            coercion: options.coerce,
            default,
        })
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The name as an input-map key (a symbol).
    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn storage_name(&self) -> &str {
        self.name.storage_name()
    }

    pub fn validator(&self) -> &ValidatorRef {
        &self.validator
    }

    pub fn coercion(&self) -> Option<&Coercion> {
        self.coercion.as_ref()
    }

    pub fn default_spec(&self) -> &DefaultSpec {
        &self.default
    }

    pub fn is_required(&self) -> bool {
        matches!(self.default, DefaultSpec::Required)
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self.coercion, Some(Coercion::Delegated))
    }

    /// Name of the owning class's coercion function used by delegated
    /// coercion.
    pub fn coercion_method(&self) -> String {
        format!("coerce_{}", self.name)
    }

    /// The default for this attribute, generating a fresh one if needed.
    pub fn default_value(&self) -> ValueResult<Value> {
        match &self.default {
            DefaultSpec::Required => Err(ValueError::NoDefaultValue(self.name.clone())),
            DefaultSpec::Fixed(value) => Ok(value.clone()),
            DefaultSpec::Generator(generate) => Ok(generate()),
        }
    }

    pub fn coerce(&self, raw: Value, owner: &ValueClass) -> ValueResult<Value> {
        match &self.coercion {
            None => Ok(raw),
            Some(Coercion::With(coercer)) => Ok(coercer.transform(raw)),
            Some(Coercion::Delegated) => match owner.delegated_coercion(&self.coercion_method()) {
                Some(coerce) => Ok(coerce(raw, owner)),
                None => Err(ValueError::configuration(format!(
                    "`{}` has no `{}` coercion for attribute `{}`",
                    owner.name(),
                    self.coercion_method(),
                    self.name
                ))),
            },
        }
    }

    pub fn validate(&self, value: &Value) -> bool {
        self.validator.matches(value)
    }

    /// Resolves this attribute's value from construction input.
    ///
    /// Absent values fall back to the default (missing if required), are then
    /// coerced, and the coerced value is validated.
    pub fn determine(&self, inputs: &ValueMap, owner: &ValueClass) -> ValueResult<(Name, Value)> {
        let raw = match inputs.get(&self.key) {
            Some(value) => value.clone(),
            None => match &self.default {
                DefaultSpec::Required => {
                    return Err(ValueError::missing(owner.name(), vec![self.name.clone()]));
                }
                DefaultSpec::Fixed(value) => value.clone(),
                DefaultSpec::Generator(generate) => generate(),
            },
        };

        let coerced = self.coerce(raw, owner)?;

        if self.validate(&coerced) {
            Ok((self.name.clone(), coerced))
        } else {
            Err(ValueError::invalid(
                owner.name(),
                vec![InvalidAttribute {
                    name: self.name.clone(),
                    value: coerced,
                }],
            ))
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("coercion", &self.coercion)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}
