//! Attribute names (symbols).

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// An interned-by-`Arc` attribute name.
///
/// The public name keeps any trailing `?` or `!` (it is what callers pass in
/// and what `to_map()` hands back). The storage slot name drops them, see
/// [`Name::storage_name`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Slot name used for storage and accessors: one trailing `!`, then one
    /// trailing `?`, are stripped (`"trained?"` -> `"trained"`).
    pub fn storage_name(&self) -> &str {
        let name = self.as_str();
        let name = name.strip_suffix('!').unwrap_or(name);
        name.strip_suffix('?').unwrap_or(name)
    }

    /// Whether this name can be declared with the bare declaration form,
    /// i.e. its first character is not upper-case.
    pub fn is_bare_declarable(&self) -> bool {
        self.0.chars().next().is_some_and(|c| !c.is_uppercase())
    }

    /// Whether the name renders as a bare symbol (`:name`, `name:`) rather
    /// than a quoted one (`:"array test"`).
    pub fn is_plain_symbol(&self) -> bool {
        !self.is_empty()
            && self
                .as_str()
                .trim_end_matches(['?', '!'])
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_')
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_plain_symbol() {
            write!(f, ":{}", self.0)
        } else {
            write!(f, ":{:?}", self.as_str())
        }
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&Name> for Name {
    fn from(value: &Name) -> Self {
        value.clone()
    }
}
