//! Event dispatch protocol.
//!
//! Middleware can synthesize a different event kind against the same
//! underlying program while handling a request. Dispatch always reaches
//! the raw program, never re-enters the middleware chain.

use crate::error::FacadeResult;
use crate::types::{BoxFuture, Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Initialization data for a synthesized scheduled event.
///
/// Serializable so dev tooling can pass it over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduledInit {
    /// The cron expression to attribute to the event. `None` becomes an
    /// empty expression on the controller.
    pub cron: Option<String>,
}

impl ScheduledInit {
    /// Creates an init with the given cron expression.
    #[must_use]
    pub fn with_cron(cron: impl Into<String>) -> Self {
        Self {
            cron: Some(cron.into()),
        }
    }
}

/// An event a middleware can synthesize through [`Dispatcher::dispatch`].
#[derive(Debug)]
pub enum DispatchEvent {
    /// Deliver a request to the terminal fetch path, bypassing the chain.
    ///
    /// Rarely useful from middleware (the continuation already reaches the
    /// terminal), but part of the protocol.
    Fetch(Request),

    /// Synthesize a timer event.
    Scheduled(ScheduledInit),
}

type DispatchFn =
    dyn Fn(DispatchEvent) -> BoxFuture<'static, FacadeResult<Option<Response>>> + Send + Sync;

/// Dispatches synthesized events against one worker program.
///
/// Built once per invocation by the facade wrapper and bound to the
/// invocation's program, environment, and execution context. Cloning is
/// cheap and clones dispatch against the same binding.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatchFn>,
}

impl Dispatcher {
    /// Creates a dispatcher from its type-erased implementation.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(DispatchEvent) -> BoxFuture<'static, FacadeResult<Option<Response>>>
            + Send
            + Sync
            + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Dispatches an event against the bound program.
    ///
    /// Resolves to `Ok(None)` for event kinds that produce no response,
    /// including the no-op case where the program does not handle the
    /// kind at all. Errors raised by the target handler propagate
    /// unchanged.
    pub async fn dispatch(&self, event: DispatchEvent) -> FacadeResult<Option<Response>> {
        (self.inner)(event).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
