//! Identity of bound value classes.

use uuid::Uuid;

/// Identifier of a bound [`ValueClass`](crate::ValueClass).
///
/// Strict equality and hashing of instances key off this identity, so two
/// classes with the same name and recipe are still distinct types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(Uuid);

impl ClassId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl core::fmt::Display for ClassId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
