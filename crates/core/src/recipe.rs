//! Compiled, immutable description of one value type.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::attribute::Attribute;
use crate::error::{ValueError, ValueResult};
use crate::name::Name;

/// Ordered set of attributes.
///
/// Order only matters for iteration and display; every attribute resolves
/// independently. Names are unique, and so are storage slot names (`ok` and
/// `ok?` would share a slot and are rejected together).
#[derive(Debug, Clone)]
pub struct Recipe {
    attributes: Arc<IndexMap<Name, Attribute>>,
}

impl Recipe {
    pub fn new(attributes: impl IntoIterator<Item = Attribute>) -> ValueResult<Self> {
        let mut by_name: IndexMap<Name, Attribute> = IndexMap::new();
        for attr in attributes {
            if let Some(existing) = by_name
                .values()
                .find(|a| a.name() == attr.name() || a.storage_name() == attr.storage_name())
            {
                return Err(ValueError::configuration(format!(
                    "attribute `{}` conflicts with already declared attribute `{}`",
                    attr.name(),
                    existing.name()
                )));
            }
            by_name.insert(attr.name().clone(), attr);
        }
        Ok(Self {
            attributes: Arc::new(by_name),
        })
    }

    pub fn attributes(&self) -> impl ExactSizeIterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.get_index_of(name)
    }

    /// Position of the attribute stored under `storage_name`.
    pub fn slot_index(&self, storage_name: &str) -> Option<usize> {
        self.attributes
            .values()
            .position(|a| a.storage_name() == storage_name)
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &Name> {
        self.attributes.keys()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Options;
    use crate::validator::Anything;

    fn attr(name: &str) -> Attribute {
        Attribute::define(name, Anything, Options::new()).unwrap()
    }

    #[test]
    fn preserves_declaration_order() {
        let recipe = Recipe::new([attr("b"), attr("a"), attr("c")]).unwrap();
        let names: Vec<&str> = recipe.names().map(Name::as_str).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(recipe.index_of("a"), Some(1));
        assert_eq!(recipe.len(), 3);
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Recipe::new([attr("a"), attr("a")]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn rejects_names_sharing_a_storage_slot() {
        let err = Recipe::new([attr("ok"), attr("ok?")]).unwrap_err();
        assert_eq!(
            err,
            ValueError::configuration(
                "attribute `ok?` conflicts with already declared attribute `ok`"
            )
        );
    }

    #[test]
    fn looks_up_by_public_and_storage_name() {
        let recipe = Recipe::new([attr("name"), attr("trained?")]).unwrap();
        assert!(recipe.contains("trained?"));
        assert!(!recipe.contains("trained"));
        assert_eq!(recipe.slot_index("trained"), Some(1));
        assert!(recipe.attribute("name").is_some());
    }

    #[test]
    fn clones_share_attributes() {
        let recipe = Recipe::new([attr("a")]).unwrap();
        let copy = recipe.clone();
        assert!(Arc::ptr_eq(&recipe.attributes, &copy.attributes));
    }
}
