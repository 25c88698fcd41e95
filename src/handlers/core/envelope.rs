//! Type-erased command values.

use super::key::TypeTag;
use std::any::Any;
use std::fmt;

/// A command whose static type has been erased.
///
/// The concrete type is captured when the envelope is built, so the router
/// can match on the value's runtime type without the caller naming it.
pub struct AnyCommand {
    payload: Box<dyn Any + Send>,
    tag: TypeTag,
}

impl AnyCommand {
    /// Erase `command`. An `AnyCommand` passed in is returned as is, so it
    /// keeps the runtime type it was built with.
    pub fn new<C: Send + 'static>(command: C) -> Self {
        let payload: Box<dyn Any + Send> = Box::new(command);
        match payload.downcast::<AnyCommand>() {
            Ok(envelope) => *envelope,
            Err(payload) => Self {
                payload,
                tag: TypeTag::of::<C>(),
            },
        }
    }

    /// Runtime type of the wrapped command.
    #[inline]
    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.tag.name()
    }

    #[inline]
    pub fn is<C: 'static>(&self) -> bool {
        self.tag.is::<C>()
    }

    pub fn downcast_ref<C: 'static>(&self) -> Option<&C> {
        self.payload.downcast_ref::<C>()
    }

    /// Recover the concrete command, or get the envelope back on mismatch.
    pub fn downcast<C: 'static>(self) -> Result<C, Self> {
        let tag = self.tag;
        match self.payload.downcast::<C>() {
            Ok(command) => Ok(*command),
            Err(payload) => Err(Self { payload, tag }),
        }
    }
}

impl fmt::Debug for AnyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyCommand")
            .field("type", &self.tag.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    #[test]
    fn captures_runtime_type() {
        let cmd = AnyCommand::new(Ping(7));
        assert!(cmd.is::<Ping>());
        assert!(!cmd.is::<u32>());
        assert!(cmd.type_name().ends_with("Ping"));
        assert_eq!(cmd.downcast_ref::<Ping>(), Some(&Ping(7)));
    }

    #[test]
    fn downcast_mismatch_returns_envelope() {
        let cmd = AnyCommand::new(Ping(7));
        let cmd = cmd.downcast::<String>().unwrap_err();
        assert!(cmd.is::<Ping>());
        assert_eq!(cmd.downcast::<Ping>().unwrap(), Ping(7));
    }

    #[test]
    fn rewrapping_keeps_the_inner_type() {
        let cmd = AnyCommand::new(AnyCommand::new(Ping(3)));
        assert!(cmd.is::<Ping>());
        assert_eq!(cmd.downcast::<Ping>().unwrap(), Ping(3));
    }

    #[test]
    fn debug_shows_type_only() {
        let rendered = format!("{:?}", AnyCommand::new(Ping(1)));
        assert!(rendered.contains("Ping"));
    }
}
