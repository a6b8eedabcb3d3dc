//! Capability keys
//!
//! A capability key names something that can be resolved from the graph:
//! an abstract type (usually a `dyn Trait`) plus an optional qualifier that
//! distinguishes several bindings of the same type.

use crate::constants::UNQUALIFIED;
use std::any::TypeId;
use std::fmt;

/// Identifies a requested capability independent of its implementation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapabilityKey {
    type_id: TypeId,
    type_name: &'static str,
    qualifier: Option<String>,
}

impl CapabilityKey {
    /// Unqualified key for `C`
    ///
    /// ```
    /// use keel_domain::CapabilityKey;
    ///
    /// trait Clock {}
    /// let key = CapabilityKey::of::<dyn Clock>();
    /// assert!(key.qualifier().is_none());
    /// assert!(key.is::<dyn Clock>());
    /// ```
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            type_name: std::any::type_name::<C>(),
            qualifier: None,
        }
    }

    /// Qualified key for `C`
    pub fn qualified<C: ?Sized + 'static, S: Into<String>>(qualifier: S) -> Self {
        Self::of::<C>().with_qualifier(Some(qualifier.into()))
    }

    /// Replace the qualifier
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Option<String>) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Type identifier of the requested capability
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Readable type name, used in errors and logs
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Qualifier, if any
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Whether this key requests `C` (any qualifier)
    pub fn is<C: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<C>()
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.type_name,
            self.qualifier.as_deref().unwrap_or(UNQUALIFIED)
        )
    }
}
