//! Error model for declarations and construction.

use thiserror::Error;

use crate::name::Name;
use crate::value::Value;

/// Result type used across the crate.
pub type ValueResult<T> = Result<T, ValueError>;

/// An attribute whose coerced value was rejected by its validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAttribute {
    pub name: Name,
    /// The value after coercion, which is what the validator saw.
    pub value: Value,
}

/// Errors raised while declaring recipes or constructing instances.
///
/// Construction aggregates per category: one error lists every unrecognized
/// key, every missing attribute, or every invalid attribute.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Declaration-time misuse (conflicting defaults, duplicate names, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Construction input can not be converted to a map of attributes.
    #[error(
        "`{owner}` could not be instantiated from a `{given}`; expected a map of attributes or something convertible to one"
    )]
    Type { owner: String, given: String },

    /// Input carried keys that are not attributes of the owner.
    #[error("`{owner}` does not define attributes: {}", render_keys(.keys))]
    UnrecognizedAttributes { owner: String, keys: Vec<Value> },

    /// Required attributes were absent and have no default.
    #[error("some attributes required by `{owner}` are missing: {}", render_names(.names))]
    MissingAttributes { owner: String, names: Vec<Name> },

    /// Coerced values failed their validators.
    #[error("some attributes of `{owner}` are invalid: {}", render_invalid(.invalid))]
    InvalidValue {
        owner: String,
        invalid: Vec<InvalidAttribute>,
    },

    /// A default was requested from a required attribute.
    #[error("attribute `{0}` does not have a default value")]
    NoDefaultValue(Name),
}

impl ValueError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn type_error(owner: impl Into<String>, given: impl Into<String>) -> Self {
        Self::Type {
            owner: owner.into(),
            given: given.into(),
        }
    }

    pub fn unrecognized(owner: impl Into<String>, keys: Vec<Value>) -> Self {
        Self::UnrecognizedAttributes {
            owner: owner.into(),
            keys,
        }
    }

    pub fn missing(owner: impl Into<String>, names: Vec<Name>) -> Self {
        Self::MissingAttributes {
            owner: owner.into(),
            names,
        }
    }

    pub fn invalid(owner: impl Into<String>, invalid: Vec<InvalidAttribute>) -> Self {
        Self::InvalidValue {
            owner: owner.into(),
            invalid,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Names of missing attributes, if this is a `MissingAttributes` error.
    pub fn missing_names(&self) -> Option<&[Name]> {
        match self {
            Self::MissingAttributes { names, .. } => Some(names),
            _ => None,
        }
    }

    /// Offending keys, if this is an `UnrecognizedAttributes` error.
    pub fn unrecognized_keys(&self) -> Option<&[Value]> {
        match self {
            Self::UnrecognizedAttributes { keys, .. } => Some(keys),
            _ => None,
        }
    }

    /// Invalid attributes, if this is an `InvalidValue` error.
    pub fn invalid_attributes(&self) -> Option<&[InvalidAttribute]> {
        match self {
            Self::InvalidValue { invalid, .. } => Some(invalid),
            _ => None,
        }
    }
}

fn render_keys(keys: &[Value]) -> String {
    keys.iter()
        .map(|k| format!("`{k:?}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_names(names: &[Name]) -> String {
    names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_invalid(invalid: &[InvalidAttribute]) -> String {
    invalid
        .iter()
        .map(|a| format!("{}={:?}", a.name, a.value))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_list_every_offender() {
        let err = ValueError::unrecognized(
            "Doggums",
            vec![Value::symbol("meow"), Value::symbol("moo")],
        );
        assert_eq!(
            err.to_string(),
            "`Doggums` does not define attributes: `:meow`, `:moo`"
        );

        let err = ValueError::missing("Doggums", vec![Name::new("trained?")]);
        assert_eq!(
            err.to_string(),
            "some attributes required by `Doggums` are missing: `trained?`"
        );

        let err = ValueError::invalid(
            "Birb",
            vec![InvalidAttribute {
                name: Name::new("wings"),
                value: Value::from("smooth feet"),
            }],
        );
        assert_eq!(
            err.to_string(),
            "some attributes of `Birb` are invalid: wings=\"smooth feet\""
        );
    }

    #[test]
    fn accessors_expose_structured_details() {
        let err = ValueError::missing("Person", vec![Name::new("age")]);
        assert_eq!(err.missing_names(), Some(&[Name::new("age")][..]));
        assert!(err.unrecognized_keys().is_none());
        assert!(err.invalid_attributes().is_none());
        assert!(!err.is_configuration());
    }
}
