//! Shape keys: the identity a handler is registered under.
//!
//! A shape is either "command type `C`, no result" or "command type `C`
//! producing `R`". The two forms never collide, even for the same `C`.

use crate::type_names;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime identity of a type, carrying its name for diagnostics.
///
/// Equality and hashing use the `TypeId` only.
#[derive(Clone, Copy, Debug)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag for `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped.
    pub fn short_name(&self) -> &'static str {
        type_names::short_name(self.id, self.name)
    }

    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Key a handler is stored under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKey {
    /// Handles `command`, produces nothing.
    Void { command: TypeTag },
    /// Handles `command`, produces `result`.
    Result { command: TypeTag, result: TypeTag },
}

impl ShapeKey {
    /// Key for a void handler of `C`.
    #[inline]
    pub fn void<C: 'static>() -> Self {
        Self::Void {
            command: TypeTag::of::<C>(),
        }
    }

    /// Key for a handler of `C` producing `R`.
    #[inline]
    pub fn with_result<C: 'static, R: 'static>() -> Self {
        Self::Result {
            command: TypeTag::of::<C>(),
            result: TypeTag::of::<R>(),
        }
    }

    #[inline]
    pub fn command(&self) -> TypeTag {
        match self {
            Self::Void { command } | Self::Result { command, .. } => *command,
        }
    }

    #[inline]
    pub fn result(&self) -> Option<TypeTag> {
        match self {
            Self::Void { .. } => None,
            Self::Result { result, .. } => Some(*result),
        }
    }

    /// Number of type parameters in the key: 1 for void, 2 for result.
    #[inline]
    pub fn arity(&self) -> usize {
        match self {
            Self::Void { .. } => 1,
            Self::Result { .. } => 2,
        }
    }

    /// Static label for the shape kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Void { .. } => "void",
            Self::Result { .. } => "result",
        }
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void { command } => write!(f, "{command}"),
            Self::Result { command, result } => write!(f, "{command} -> {result}"),
        }
    }
}
