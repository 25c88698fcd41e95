//! Command handlers and the router that dispatches to them.
//!
//! Commands are plain Rust values. A handler is bound to a command type, or
//! to a (command type, result type) pair, and dispatch picks the handler
//! from the command's runtime type alone.

pub mod core;

pub use self::core::{
    AnyCommand, CommandHandler, FnHandler, Registry, RequestHandler, ShapeKey, SharedRegistry,
    TypeTag,
};
