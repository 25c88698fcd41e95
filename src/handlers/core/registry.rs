//! Command handler registry and dispatch.
//!
//! The `Registry` binds one handler per [`ShapeKey`] and routes commands to
//! it by runtime type. Registration needs `&mut Registry`; once the registry
//! is shared it is read-only, so lookups take no locks.

use super::envelope::AnyCommand;
use super::key::{ShapeKey, TypeTag};
use super::traits::{
    CommandHandler, ErasedHandler, FnHandler, RequestHandler, ResultAdapter, VoidAdapter,
};
use crate::config::{DuplicatePolicy, RegistryConfig};
use crate::error::{DispatchError, DispatchResult};
use crate::telemetry::{DispatchTimer, spans};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, warn};

/// A registered handler and its usage counter.
pub(crate) struct Entry {
    handler: Arc<dyn ErasedHandler>,
    dispatches: AtomicU64,
}

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<ShapeKey, Arc<Entry>>,
    policy: DuplicatePolicy,
    slow_dispatch: Option<Duration>,
}

impl Registry {
    /// Create an empty registry that replaces handlers on re-registration.
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::Replace)
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            handlers: HashMap::new(),
            policy,
            slow_dispatch: None,
        }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            policy: config.duplicate_policy,
            slow_dispatch: config.slow_dispatch_threshold(),
        }
    }

    /// Log dispatches that take longer than `threshold`.
    pub fn with_slow_dispatch_threshold(mut self, threshold: Duration) -> Self {
        self.slow_dispatch = Some(threshold);
        self
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Bind an async closure to command type `C`, with no result.
    pub fn register_void<C, F, Fut>(&mut self, handler: F) -> DispatchResult
    where
        C: Send + 'static,
        F: Fn(C, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register_handler::<C, _>(FnHandler::new(handler))
    }

    /// Bind an async closure to command type `C` producing `R`.
    pub fn register_with_result<C, R, F, Fut>(&mut self, handler: F) -> DispatchResult
    where
        C: Send + 'static,
        R: Send + 'static,
        F: Fn(C, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        self.register_request_handler::<C, _>(FnHandler::new(handler))
    }

    /// Bind a [`CommandHandler`] implementation to command type `C`.
    pub fn register_handler<C, H>(&mut self, handler: H) -> DispatchResult
    where
        C: Send + 'static,
        H: CommandHandler<C>,
    {
        self.insert(
            ShapeKey::void::<C>(),
            Arc::new(VoidAdapter::<C, H>::new(handler)),
        )
    }

    /// Bind a [`RequestHandler`] implementation to `(C, H::Output)`.
    pub fn register_request_handler<C, H>(&mut self, handler: H) -> DispatchResult
    where
        C: Send + 'static,
        H: RequestHandler<C>,
    {
        self.insert(
            ShapeKey::with_result::<C, H::Output>(),
            Arc::new(ResultAdapter::<C, H>::new(handler)),
        )
    }

    fn insert(&mut self, shape: ShapeKey, handler: Arc<dyn ErasedHandler>) -> DispatchResult {
        if self.handlers.contains_key(&shape) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    debug!(shape = %shape, "Rejected duplicate handler registration");
                    return Err(DispatchError::DuplicateHandler {
                        shape: shape.to_string(),
                    });
                }
                DuplicatePolicy::Replace => {
                    debug!(shape = %shape, "Replacing registered handler");
                }
            }
        }

        self.handlers.insert(
            shape,
            Arc::new(Entry {
                handler,
                dispatches: AtomicU64::new(0),
            }),
        );
        crate::metrics::record_registration(shape.kind());
        Ok(())
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn contains(&self, shape: &ShapeKey) -> bool {
        self.handlers.contains_key(shape)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered shapes, sorted by their display form.
    pub fn shapes(&self) -> Vec<ShapeKey> {
        let mut shapes: Vec<_> = self.handlers.keys().copied().collect();
        shapes.sort_by_cached_key(|s| s.to_string());
        shapes
    }

    /// Dispatch counts per shape, most used first. Unused shapes are omitted.
    pub fn stats(&self) -> Vec<(ShapeKey, u64)> {
        let mut stats: Vec<_> = self
            .handlers
            .iter()
            .map(|(shape, entry)| (*shape, entry.dispatches.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();

        stats.sort_by(|a, b| b.1.cmp(&a.1));
        stats
    }

    pub(crate) fn resolve(&self, shape: &ShapeKey) -> Option<Arc<Entry>> {
        self.handlers.get(shape).cloned()
    }

    pub(crate) fn slow_dispatch(&self) -> Option<Duration> {
        self.slow_dispatch
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Route `command` to the handler registered for `C` with no result.
    pub async fn send<C: Send + 'static>(
        &self,
        command: C,
        cancel: CancellationToken,
    ) -> DispatchResult {
        self.send_any(AnyCommand::new(command), cancel).await
    }

    /// Route an erased command to the void handler for its runtime type.
    pub async fn send_any(&self, command: AnyCommand, cancel: CancellationToken) -> DispatchResult {
        let shape = ShapeKey::Void {
            command: command.type_tag(),
        };
        let entry = self.resolve(&shape);
        dispatch::<()>(entry, shape, command, cancel, self.slow_dispatch).await
    }

    /// Route `command` to the handler registered for `(C, R)`.
    pub async fn request<C, R>(&self, command: C, cancel: CancellationToken) -> DispatchResult<R>
    where
        C: Send + 'static,
        R: Send + 'static,
    {
        self.request_any(AnyCommand::new(command), cancel).await
    }

    /// Route an erased command to the handler for `(runtime type, R)`.
    pub async fn request_any<R: Send + 'static>(
        &self,
        command: AnyCommand,
        cancel: CancellationToken,
    ) -> DispatchResult<R> {
        let shape = ShapeKey::Result {
            command: command.type_tag(),
            result: TypeTag::of::<R>(),
        };
        let entry = self.resolve(&shape);
        dispatch::<R>(entry, shape, command, cancel, self.slow_dispatch).await
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shapes: Vec<String> = self.shapes().iter().map(ToString::to_string).collect();
        f.debug_struct("Registry")
            .field("policy", &self.policy)
            .field("shapes", &shapes)
            .finish()
    }
}

fn no_handler(shape: &ShapeKey) -> DispatchError {
    match shape {
        ShapeKey::Void { command } => DispatchError::NoHandlerRegistered {
            command: command.name(),
        },
        ShapeKey::Result { command, result } => DispatchError::NoResultHandlerRegistered {
            command: command.name(),
            result: result.name(),
        },
    }
}

/// Invoke a resolved entry and recover its typed output.
///
/// Shared by [`Registry`] and [`super::SharedRegistry`]; takes the entry by
/// value so no registry borrow or lock lives across the handler's `.await`.
pub(crate) async fn dispatch<R: 'static>(
    entry: Option<Arc<Entry>>,
    shape: ShapeKey,
    command: AnyCommand,
    cancel: CancellationToken,
    slow_dispatch: Option<Duration>,
) -> DispatchResult<R> {
    let label = shape.command().short_name();

    let Some(entry) = entry else {
        let err = no_handler(&shape);
        debug!(shape = %shape, "No handler registered");
        crate::metrics::record_dispatch_error(label, err.error_code());
        return Err(err);
    };
    entry.dispatches.fetch_add(1, Ordering::Relaxed);

    let timer = DispatchTimer::new(label);
    let result = entry
        .handler
        .call(command, cancel)
        .instrument(spans::dispatch(&shape))
        .await;

    if let Some(threshold) = slow_dispatch
        && timer.elapsed() > threshold
    {
        warn!(
            shape = %shape,
            elapsed_ms = u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX),
            threshold_ms = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX),
            "Slow dispatch"
        );
    }
    drop(timer);

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            if matches!(e, DispatchError::CommandTypeMismatch { .. }) {
                error!(shape = %shape, error = %e, "Handler rejected dispatched command type");
            } else {
                debug!(shape = %shape, error = %e, "Handler failed");
            }
            crate::metrics::record_dispatch_error(label, e.error_code());
            return Err(e);
        }
    };

    output.downcast::<R>().map(|value| *value).map_err(|_| {
        let err = DispatchError::ResultTypeMismatch {
            command: shape.command().name(),
            expected: std::any::type_name::<R>(),
        };
        error!(shape = %shape, error = %err, "Handler produced an unexpected result type");
        crate::metrics::record_dispatch_error(label, err.error_code());
        err
    })
}
