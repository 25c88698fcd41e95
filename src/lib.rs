//! # command-bus
//!
//! Type-indexed asynchronous command dispatch.
//!
//! Handlers are registered per *shape*: a command type alone ("void"), or a
//! command type paired with a result type. Dispatch looks the handler up
//! from the command's runtime type (and, for requests, the expected result
//! type) and awaits it. A command nobody registered a handler for is a
//! wiring mistake and fails immediately with an error naming its type.
//!
//! ```ignore
//! use command_bus::{Registry, CancellationToken};
//!
//! let mut registry = Registry::new();
//! registry.register_with_result(|cmd: DoStuff, _cancel| async move {
//!     Ok(Outcome(format!("{} - {}", cmd.id, cmd.message)))
//! })?;
//!
//! let outcome: Outcome = registry.request(DoStuff::new("42", "hello"), CancellationToken::new()).await?;
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod telemetry;
pub mod type_names;

pub use bus::CommandBus;
pub use config::{Config, DuplicatePolicy};
pub use error::{DispatchError, DispatchResult};
pub use handlers::{
    AnyCommand, CommandHandler, FnHandler, Registry, RequestHandler, ShapeKey, SharedRegistry,
    TypeTag,
};
pub use tokio_util::sync::CancellationToken;
