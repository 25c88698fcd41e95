//! Registry that accepts registrations while dispatches are in flight.
//!
//! The lock only guards the handler map. Dispatch clones the resolved entry
//! out under a read lock and releases it before awaiting the handler.

use super::envelope::AnyCommand;
use super::key::{ShapeKey, TypeTag};
use super::registry::{Registry, dispatch};
use super::traits::{CommandHandler, RequestHandler};
use crate::error::DispatchResult;
use parking_lot::RwLock;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A [`Registry`] behind a read-write lock.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    inner: RwLock<Registry>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: RwLock::new(registry),
        }
    }

    pub fn register_void<C, F, Fut>(&self, handler: F) -> DispatchResult
    where
        C: Send + 'static,
        F: Fn(C, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.inner.write().register_void(handler)
    }

    pub fn register_with_result<C, R, F, Fut>(&self, handler: F) -> DispatchResult
    where
        C: Send + 'static,
        R: Send + 'static,
        F: Fn(C, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        self.inner.write().register_with_result(handler)
    }

    pub fn register_handler<C, H>(&self, handler: H) -> DispatchResult
    where
        C: Send + 'static,
        H: CommandHandler<C>,
    {
        self.inner.write().register_handler::<C, H>(handler)
    }

    pub fn register_request_handler<C, H>(&self, handler: H) -> DispatchResult
    where
        C: Send + 'static,
        H: RequestHandler<C>,
    {
        self.inner.write().register_request_handler::<C, H>(handler)
    }

    pub fn contains(&self, shape: &ShapeKey) -> bool {
        self.inner.read().contains(shape)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn stats(&self) -> Vec<(ShapeKey, u64)> {
        self.inner.read().stats()
    }

    pub async fn send<C: Send + 'static>(
        &self,
        command: C,
        cancel: CancellationToken,
    ) -> DispatchResult {
        self.send_any(AnyCommand::new(command), cancel).await
    }

    pub async fn send_any(&self, command: AnyCommand, cancel: CancellationToken) -> DispatchResult {
        let shape = ShapeKey::Void {
            command: command.type_tag(),
        };
        let (entry, slow_dispatch) = {
            let guard = self.inner.read();
            (guard.resolve(&shape), guard.slow_dispatch())
        };
        dispatch::<()>(entry, shape, command, cancel, slow_dispatch).await
    }

    pub async fn request<C, R>(&self, command: C, cancel: CancellationToken) -> DispatchResult<R>
    where
        C: Send + 'static,
        R: Send + 'static,
    {
        self.request_any(AnyCommand::new(command), cancel).await
    }

    pub async fn request_any<R: Send + 'static>(
        &self,
        command: AnyCommand,
        cancel: CancellationToken,
    ) -> DispatchResult<R> {
        let shape = ShapeKey::Result {
            command: command.type_tag(),
            result: TypeTag::of::<R>(),
        };
        let (entry, slow_dispatch) = {
            let guard = self.inner.read();
            (guard.resolve(&shape), guard.slow_dispatch())
        };
        dispatch::<R>(entry, shape, command, cancel, slow_dispatch).await
    }

    /// Unwrap the inner registry once sharing is over.
    pub fn into_inner(self) -> Registry {
        self.inner.into_inner()
    }
}

impl From<Registry> for SharedRegistry {
    fn from(registry: Registry) -> Self {
        Self::new(registry)
    }
}
