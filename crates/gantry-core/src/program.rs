//! The worker program model.
//!
//! A deployed program comes in one of two shapes, resolved once when the
//! program is loaded and never re-inspected per invocation:
//!
//! - a [`HandlerSet`]: a plain value exposing optional event handlers that
//!   each receive the environment and execution context as arguments;
//! - an [`EntrypointProgram`]: an instantiable type whose instances are
//!   constructed fresh per invocation with the environment and execution
//!   context, and expose the same optional handlers as methods taking only
//!   the event payload.
//!
//! [`WorkerModule`] is the unit the build pipeline hands over: the program
//! plus any named entrypoint exports declared alongside it, which must stay
//! reachable whether or not the program gets wrapped.

use crate::context::ExecutionContext;
use crate::controller::ScheduledController;
use crate::env::Env;
use crate::error::{FacadeError, FacadeResult};
use crate::types::{BoxFuture, Request, Response};
use indexmap::IndexMap;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A request handler callable of a [`HandlerSet`].
pub type FetchFn = Arc<
    dyn Fn(Request, Env, ExecutionContext) -> BoxFuture<'static, FacadeResult<Response>>
        + Send
        + Sync,
>;

/// A timer handler callable of a [`HandlerSet`].
pub type ScheduledFn = Arc<
    dyn Fn(ScheduledController, Env, ExecutionContext) -> BoxFuture<'static, FacadeResult<()>>
        + Send
        + Sync,
>;

/// A plain handler-object program: optional event handlers plus arbitrary
/// additional properties.
///
/// Cloning is shallow: handlers and properties are shared by reference,
/// which is what lets a wrapper replace one slot while provably leaving
/// the rest untouched.
#[derive(Clone, Default)]
pub struct HandlerSet {
    fetch: Option<FetchFn>,
    scheduled: Option<ScheduledFn>,
    properties: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl HandlerSet {
    /// Creates an empty handler set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request handler.
    #[must_use]
    pub fn with_fetch<F>(self, f: F) -> Self
    where
        F: Fn(Request, Env, ExecutionContext) -> BoxFuture<'static, FacadeResult<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.with_fetch_handler(Arc::new(f))
    }

    /// Sets the request handler from an already-shared callable.
    #[must_use]
    pub fn with_fetch_handler(mut self, f: FetchFn) -> Self {
        self.fetch = Some(f);
        self
    }

    /// Sets the timer handler.
    #[must_use]
    pub fn with_scheduled<F>(mut self, f: F) -> Self
    where
        F: Fn(ScheduledController, Env, ExecutionContext) -> BoxFuture<'static, FacadeResult<()>>
            + Send
            + Sync
            + 'static,
    {
        self.scheduled = Some(Arc::new(f));
        self
    }

    /// Attaches an arbitrary property.
    ///
    /// Properties are opaque to the facade; they exist so a program can
    /// carry additional values that survive wrapping by reference.
    #[must_use]
    pub fn with_property<T: Send + Sync + 'static>(
        mut self,
        name: impl Into<String>,
        value: T,
    ) -> Self {
        self.properties.insert(name.into(), Arc::new(value));
        self
    }

    /// The request handler, if declared.
    #[must_use]
    pub fn fetch_handler(&self) -> Option<&FetchFn> {
        self.fetch.as_ref()
    }

    /// The timer handler, if declared.
    #[must_use]
    pub fn scheduled_handler(&self) -> Option<&ScheduledFn> {
        self.scheduled.as_ref()
    }

    /// Looks up a property, downcast to the expected type.
    #[must_use]
    pub fn property<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.properties
            .get(name)
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Looks up a property without downcasting.
    ///
    /// Useful for identity comparisons across a wrap.
    #[must_use]
    pub fn property_handle(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.properties.get(name).cloned()
    }
}

impl std::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSet")
            .field("fetch", &self.fetch.is_some())
            .field("scheduled", &self.scheduled.is_some())
            .field("properties", &self.properties.len())
            .finish()
    }
}

/// Instance surface of an entrypoint program.
///
/// The environment and execution context are not parameters here: an
/// instance is constructed with them and carries them as its own state.
/// A method returning `None` means the type does not declare that
/// handler, mirroring an absent method on a handler object.
pub trait WorkerEntrypoint: Send + Sync + 'static {
    /// Handles a request.
    fn fetch(&self, request: Request) -> Option<BoxFuture<'_, FacadeResult<Response>>> {
        let _ = request;
        None
    }

    /// Handles a timer event.
    fn scheduled(&self, controller: ScheduledController) -> Option<BoxFuture<'_, FacadeResult<()>>> {
        let _ = controller;
        None
    }
}

type ConstructFn = dyn Fn(Env, ExecutionContext) -> Arc<dyn WorkerEntrypoint> + Send + Sync;

/// An instantiable entrypoint program: a constructor producing a fresh
/// instance per invocation.
#[derive(Clone)]
pub struct EntrypointProgram {
    construct: Arc<ConstructFn>,
}

impl EntrypointProgram {
    /// Creates a program from an entrypoint type's constructor.
    ///
    /// # Example
    ///
    /// ```
    /// use gantry_core::{Env, EntrypointProgram, ExecutionContext, WorkerEntrypoint};
    ///
    /// struct Api {
    ///     env: Env,
    ///     ctx: ExecutionContext,
    /// }
    ///
    /// impl Api {
    ///     fn new(env: Env, ctx: ExecutionContext) -> Self {
    ///         Self { env, ctx }
    ///     }
    /// }
    ///
    /// impl WorkerEntrypoint for Api {}
    ///
    /// let program = EntrypointProgram::new(Api::new);
    /// ```
    pub fn new<E, F>(construct: F) -> Self
    where
        E: WorkerEntrypoint,
        F: Fn(Env, ExecutionContext) -> E + Send + Sync + 'static,
    {
        Self {
            construct: Arc::new(move |env, ctx| Arc::new(construct(env, ctx))),
        }
    }

    /// Creates a program from a type-erased constructor.
    pub fn erased<F>(construct: F) -> Self
    where
        F: Fn(Env, ExecutionContext) -> Arc<dyn WorkerEntrypoint> + Send + Sync + 'static,
    {
        Self {
            construct: Arc::new(construct),
        }
    }

    /// Constructs a fresh instance for one invocation.
    #[must_use]
    pub fn instantiate(&self, env: Env, ctx: ExecutionContext) -> Arc<dyn WorkerEntrypoint> {
        (self.construct)(env, ctx)
    }
}

impl std::fmt::Debug for EntrypointProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntrypointProgram").finish_non_exhaustive()
    }
}

/// A worker program, tagged by shape.
#[derive(Clone, Debug)]
pub enum WorkerProgram {
    /// A plain handler object.
    Handlers(HandlerSet),
    /// An instantiable entrypoint type.
    Entrypoint(EntrypointProgram),
}

impl WorkerProgram {
    /// Serves a request.
    ///
    /// For an entrypoint program this constructs a fresh instance scoped
    /// to the invocation.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if the program declares no request
    /// handler; handler errors propagate unchanged.
    pub async fn fetch(
        &self,
        request: Request,
        env: Env,
        ctx: ExecutionContext,
    ) -> FacadeResult<Response> {
        match self {
            Self::Handlers(set) => {
                let Some(fetch) = set.fetch_handler().cloned() else {
                    return Err(FacadeError::FetchNotExported);
                };
                fetch(request, env, ctx).await
            }
            Self::Entrypoint(program) => {
                let instance = program.instantiate(env, ctx);
                let result = match instance.fetch(request) {
                    Some(fut) => fut.await,
                    None => Err(FacadeError::FetchNotDefined),
                };
                result
            }
        }
    }

    /// Delivers a timer event.
    ///
    /// # Errors
    ///
    /// Fails with [`FacadeError::ScheduledNotExported`] if the program
    /// declares no timer handler. (Synthesizing a timer event through the
    /// middleware dispatch protocol is a no-op instead; the request path
    /// is mandatory, auxiliary event kinds are optional.)
    pub async fn scheduled(
        &self,
        controller: ScheduledController,
        env: Env,
        ctx: ExecutionContext,
    ) -> FacadeResult<()> {
        match self {
            Self::Handlers(set) => {
                let Some(scheduled) = set.scheduled_handler().cloned() else {
                    return Err(FacadeError::ScheduledNotExported);
                };
                scheduled(controller, env, ctx).await
            }
            Self::Entrypoint(program) => {
                let instance = program.instantiate(env, ctx);
                let result = match instance.scheduled(controller) {
                    Some(fut) => fut.await,
                    None => Err(FacadeError::ScheduledNotExported),
                };
                result
            }
        }
    }
}

/// A program plus the named entrypoint exports declared alongside it.
///
/// This is the unit the transport invokes. Named exports are preserved by
/// reference across wrapping and stay independently instantiable.
#[derive(Clone, Debug)]
pub struct WorkerModule {
    program: WorkerProgram,
    named: IndexMap<String, EntrypointProgram>,
}

impl WorkerModule {
    /// Creates a module around a program with no named exports.
    #[must_use]
    pub fn new(program: WorkerProgram) -> Self {
        Self {
            program,
            named: IndexMap::new(),
        }
    }

    /// Adds a named entrypoint export alongside the program.
    #[must_use]
    pub fn with_export(mut self, name: impl Into<String>, entrypoint: EntrypointProgram) -> Self {
        self.named.insert(name.into(), entrypoint);
        self
    }

    /// The program itself.
    #[must_use]
    pub fn program(&self) -> &WorkerProgram {
        &self.program
    }

    /// Looks up a named entrypoint export.
    #[must_use]
    pub fn export(&self, name: &str) -> Option<&EntrypointProgram> {
        self.named.get(name)
    }

    /// Iterates named exports in declaration order.
    pub fn exports(&self) -> impl Iterator<Item = (&str, &EntrypointProgram)> {
        self.named.iter().map(|(name, ep)| (name.as_str(), ep))
    }

    /// Replaces the program, keeping named exports untouched.
    #[must_use]
    pub fn map_program(mut self, f: impl FnOnce(WorkerProgram) -> WorkerProgram) -> Self {
        self.program = f(self.program);
        self
    }

    /// Serves a request through the program.
    pub async fn fetch(
        &self,
        request: Request,
        env: Env,
        ctx: ExecutionContext,
    ) -> FacadeResult<Response> {
        self.program.fetch(request, env, ctx).await
    }

    /// Delivers a timer event to the program.
    pub async fn scheduled(
        &self,
        controller: ScheduledController,
        env: Env,
        ctx: ExecutionContext,
    ) -> FacadeResult<()> {
        self.program.scheduled(controller, env, ctx).await
    }
}
