//! The facade wrapper.
//!
//! [`wrap`] takes a worker module and a sealed-off registry and produces a
//! drop-in replacement whose request path runs the middleware chain before
//! the program's own handler. The program shape was tagged when the module
//! was built; each shape has its own wrap strategy and nothing re-inspects
//! the shape per invocation.
//!
//! With no middleware registered, wrapping is the identity: the original
//! module is returned with every component untouched.

use crate::dispatcher::{entrypoint_dispatcher, handler_dispatcher};
use gantry_core::{
    BoxFuture, Env, EntrypointProgram, ExecutionContext, FacadeError, FacadeResult, FetchFn,
    HandlerSet, Request, Response, ScheduledController, WorkerEntrypoint, WorkerModule,
    WorkerProgram,
};
use gantry_middleware::{MiddlewareChain, MiddlewareRegistry};
use std::sync::Arc;

/// Wraps a worker module with the registry's middleware chain.
///
/// The returned module presents exactly the surface of the original: the
/// transport calls the same methods with the same signatures whether or
/// not wrapping occurred. Named entrypoint exports pass through untouched.
#[must_use]
pub fn wrap(module: WorkerModule, registry: MiddlewareRegistry) -> WorkerModule {
    let chain = registry.seal();
    if chain.is_empty() {
        return module;
    }

    tracing::debug!(middleware = chain.len(), "wrapping worker program");
    module.map_program(|program| match program {
        WorkerProgram::Handlers(set) => WorkerProgram::Handlers(wrap_handler_set(set, chain)),
        WorkerProgram::Entrypoint(entrypoint) => {
            WorkerProgram::Entrypoint(wrap_entrypoint(entrypoint, chain))
        }
    })
}

/// Shallow-copies the handler set, replacing only the fetch slot.
///
/// The terminal adapter defers the missing-fetch check to the first
/// invocation: wrapping a fetchless program is not itself an error, but
/// serving a request through it is.
fn wrap_handler_set(worker: HandlerSet, chain: MiddlewareChain) -> HandlerSet {
    let original = Arc::new(worker);
    let shallow = original.as_ref().clone();

    let wrapped_fetch: FetchFn = {
        let worker = original;
        Arc::new(move |request: Request, env: Env, ctx: ExecutionContext| {
            let worker = worker.clone();
            let chain = chain.clone();
            Box::pin(async move {
                let terminal: FetchFn = {
                    let worker = worker.clone();
                    Arc::new(move |req: Request, env: Env, ctx: ExecutionContext| {
                        let worker = worker.clone();
                        Box::pin(async move {
                            let Some(fetch) = worker.fetch_handler().cloned() else {
                                return Err(FacadeError::FetchNotExported);
                            };
                            fetch(req, env, ctx).await
                        }) as BoxFuture<'static, FacadeResult<Response>>
                    })
                };
                let dispatcher = handler_dispatcher(worker, env.clone(), ctx.clone());
                chain.invoke(&dispatcher, terminal, request, env, ctx).await
            }) as BoxFuture<'static, FacadeResult<Response>>
        })
    };

    shallow.with_fetch_handler(wrapped_fetch)
}

/// Produces an entrypoint type that extends the base with the chain.
fn wrap_entrypoint(base: EntrypointProgram, chain: MiddlewareChain) -> EntrypointProgram {
    EntrypointProgram::erased(move |env: Env, ctx: ExecutionContext| {
        Arc::new(FacadeEntrypoint {
            inner: base.instantiate(env.clone(), ctx.clone()),
            env,
            ctx,
            chain: chain.clone(),
        }) as Arc<dyn WorkerEntrypoint>
    })
}

/// An entrypoint instance that runs the chain in front of the inner
/// instance's request method.
///
/// The invocation's environment and execution context are held as instance
/// state, exactly as on the inner instance; the terminal and dispatcher
/// both address the inner instance, so a timer handler still runs with
/// only the controller as its argument.
struct FacadeEntrypoint {
    inner: Arc<dyn WorkerEntrypoint>,
    env: Env,
    ctx: ExecutionContext,
    chain: MiddlewareChain,
}

impl WorkerEntrypoint for FacadeEntrypoint {
    fn fetch(&self, request: Request) -> Option<BoxFuture<'_, FacadeResult<Response>>> {
        Some(Box::pin(async move {
            let terminal: FetchFn = {
                let inner = self.inner.clone();
                Arc::new(move |req: Request, _env: Env, _ctx: ExecutionContext| {
                    let inner = inner.clone();
                    Box::pin(async move {
                        match inner.fetch(req) {
                            Some(fut) => fut.await,
                            None => Err(FacadeError::FetchNotDefined),
                        }
                    }) as BoxFuture<'static, FacadeResult<Response>>
                })
            };
            let dispatcher = entrypoint_dispatcher(self.inner.clone());
            self.chain
                .invoke(
                    &dispatcher,
                    terminal,
                    request,
                    self.env.clone(),
                    self.ctx.clone(),
                )
                .await
        }))
    }

    fn scheduled(
        &self,
        controller: ScheduledController,
    ) -> Option<BoxFuture<'_, FacadeResult<()>>> {
        // Only the request path is wrapped; timer delivery goes straight
        // to the inner instance.
        self.inner.scheduled(controller)
    }
}
