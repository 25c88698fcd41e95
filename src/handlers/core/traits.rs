//! Handler traits and their type-erased form.
//!
//! ## Handler Types
//!
//! - [`CommandHandler`]: handles `C`, produces nothing
//! - [`RequestHandler`]: handles `C`, produces [`RequestHandler::Output`]
//! - [`FnHandler`]: adapts an async closure to either trait
//!
//! The registry stores every handler as an `Arc<dyn ErasedHandler>`. Erased
//! handlers accept an [`AnyCommand`] and return a boxed `Any`; both ends are
//! recovered with checked downcasts.

use super::envelope::AnyCommand;
use crate::error::DispatchError;
use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Public handler traits
// ============================================================================

/// Handler for a command that produces no result.
///
/// ```ignore
/// struct Audit;
///
/// #[async_trait]
/// impl CommandHandler<UserDeleted> for Audit {
///     async fn handle(&self, cmd: UserDeleted, _cancel: CancellationToken) -> anyhow::Result<()> {
///         tracing::info!(user = %cmd.id, "user deleted");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait CommandHandler<C: Send + 'static>: Send + Sync + 'static {
    async fn handle(&self, command: C, cancel: CancellationToken) -> anyhow::Result<()>;
}

/// Handler for a command that produces a value.
#[async_trait]
pub trait RequestHandler<C: Send + 'static>: Send + Sync + 'static {
    type Output: Send + 'static;

    async fn handle(&self, command: C, cancel: CancellationToken)
    -> anyhow::Result<Self::Output>;
}

/// Adapter turning an async closure into a handler.
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<C, F, Fut> CommandHandler<C> for FnHandler<F>
where
    C: Send + 'static,
    F: Fn(C, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, command: C, cancel: CancellationToken) -> anyhow::Result<()> {
        (self.f)(command, cancel).await
    }
}

#[async_trait]
impl<C, R, F, Fut> RequestHandler<C> for FnHandler<F>
where
    C: Send + 'static,
    R: Send + 'static,
    F: Fn(C, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    type Output = R;

    async fn handle(&self, command: C, cancel: CancellationToken) -> anyhow::Result<R> {
        (self.f)(command, cancel).await
    }
}

// ============================================================================
// Type erasure
// ============================================================================

pub(crate) type ErasedOutput = Box<dyn Any + Send>;
pub(crate) type ErasedFuture = BoxFuture<'static, Result<ErasedOutput, DispatchError>>;

/// Object-safe handler form stored by the registry.
pub(crate) trait ErasedHandler: Send + Sync {
    fn call(&self, command: AnyCommand, cancel: CancellationToken) -> ErasedFuture;
}

fn recover<C: 'static>(command: AnyCommand) -> Result<C, DispatchError> {
    command
        .downcast::<C>()
        .map_err(|actual| DispatchError::CommandTypeMismatch {
            expected: std::any::type_name::<C>(),
            actual: actual.type_name(),
        })
}

/// Erases a [`CommandHandler`].
pub(crate) struct VoidAdapter<C, H> {
    handler: Arc<H>,
    _command: PhantomData<fn(C)>,
}

impl<C, H> VoidAdapter<C, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            _command: PhantomData,
        }
    }
}

impl<C, H> ErasedHandler for VoidAdapter<C, H>
where
    C: Send + 'static,
    H: CommandHandler<C>,
{
    fn call(&self, command: AnyCommand, cancel: CancellationToken) -> ErasedFuture {
        let handler = Arc::clone(&self.handler);
        async move {
            let command = recover::<C>(command)?;
            handler
                .handle(command, cancel)
                .await
                .map_err(DispatchError::Handler)?;
            Ok(Box::new(()) as ErasedOutput)
        }
        .boxed()
    }
}

/// Erases a [`RequestHandler`].
pub(crate) struct ResultAdapter<C, H> {
    handler: Arc<H>,
    _command: PhantomData<fn(C)>,
}

impl<C, H> ResultAdapter<C, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            _command: PhantomData,
        }
    }
}

impl<C, H> ErasedHandler for ResultAdapter<C, H>
where
    C: Send + 'static,
    H: RequestHandler<C>,
{
    fn call(&self, command: AnyCommand, cancel: CancellationToken) -> ErasedFuture {
        let handler = Arc::clone(&self.handler);
        async move {
            let command = recover::<C>(command)?;
            let output = handler
                .handle(command, cancel)
                .await
                .map_err(DispatchError::Handler)?;
            Ok(Box::new(output) as ErasedOutput)
        }
        .boxed()
    }
}
