//! Core handler infrastructure.
//!
//! This module contains the fundamental types of the command router: shape
//! keys, handler traits, the erased command envelope, and the registries
//! that bind and dispatch handlers.
//!
//! ### Registries
//!
//! - [`Registry`]: registered during construction, read-only once shared
//! - [`SharedRegistry`]: accepts registrations concurrently with dispatch

pub mod envelope;
pub mod key;
pub mod registry;
pub mod shared;
pub mod traits;

// Re-export commonly used types
pub use envelope::AnyCommand;
pub use key::{ShapeKey, TypeTag};
pub use registry::Registry;
pub use shared::SharedRegistry;
pub use traits::{CommandHandler, FnHandler, RequestHandler};
