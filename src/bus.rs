//! Command bus base trait.
//!
//! A bus is any type that owns a [`Registry`]. Implementors bind their
//! handlers while constructing the registry and get `send`/`request` for
//! free.
//!
//! ```ignore
//! struct Accounts {
//!     registry: Registry,
//! }
//!
//! impl Accounts {
//!     fn new(store: Arc<Store>) -> Result<Self, DispatchError> {
//!         let mut registry = Registry::new();
//!         registry.register_handler::<OpenAccount, _>(OpenAccountHandler::new(store))?;
//!         Ok(Self { registry })
//!     }
//! }
//!
//! impl CommandBus for Accounts {
//!     fn registry(&self) -> &Registry {
//!         &self.registry
//!     }
//! }
//! ```

use crate::error::DispatchResult;
use crate::handlers::{AnyCommand, Registry};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait CommandBus: Send + Sync {
    /// The registry holding this bus's handlers.
    fn registry(&self) -> &Registry;

    /// Dispatch a command that produces no result.
    async fn send<C: Send + 'static>(
        &self,
        command: C,
        cancel: CancellationToken,
    ) -> DispatchResult {
        self.registry().send(command, cancel).await
    }

    /// Dispatch an erased command that produces no result.
    async fn send_any(&self, command: AnyCommand, cancel: CancellationToken) -> DispatchResult {
        self.registry().send_any(command, cancel).await
    }

    /// Dispatch a command and wait for its `R`.
    async fn request<C, R>(&self, command: C, cancel: CancellationToken) -> DispatchResult<R>
    where
        C: Send + 'static,
        R: Send + 'static,
    {
        self.registry().request(command, cancel).await
    }

    /// Dispatch an erased command and wait for its `R`.
    async fn request_any<R: Send + 'static>(
        &self,
        command: AnyCommand,
        cancel: CancellationToken,
    ) -> DispatchResult<R> {
        self.registry().request_any(command, cancel).await
    }
}
