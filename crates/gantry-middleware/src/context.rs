//! The continuation and dispatch protocol.
//!
//! A [`MiddlewareContext`] is constructed per chain position, not per
//! invocation: each middleware gets its own, holding the continuation into
//! the remainder of the chain plus the invocation's event dispatcher.

use crate::middleware::Middleware;
use gantry_core::{
    DispatchEvent, Dispatcher, Env, ExecutionContext, FacadeResult, FetchFn, Request, Response,
};

/// Per-position context handed to a middleware.
///
/// `next` consumes the context, so the remainder of the chain can be
/// invoked at most once. The dispatcher reference can be copied out first
/// (see [`dispatcher`](Self::dispatcher)) if a middleware needs to
/// synthesize events after forwarding.
pub struct MiddlewareContext<'a> {
    dispatcher: &'a Dispatcher,
    next: Next<'a>,
}

impl<'a> MiddlewareContext<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher, next: Next<'a>) -> Self {
        Self { dispatcher, next }
    }

    /// Invokes the remainder of the chain with a possibly-rewritten
    /// request and environment.
    ///
    /// Everything after the current middleware runs, ending at the
    /// terminal handler. Errors propagate unchanged.
    pub async fn next(self, request: Request, env: Env) -> FacadeResult<Response> {
        self.next.run(request, env).await
    }

    /// Synthesizes a different event kind against the same underlying
    /// program, bypassing the middleware chain entirely.
    ///
    /// Dispatching an event kind the program does not handle resolves to
    /// `Ok(None)`; errors raised by the target handler propagate unchanged
    /// to this call's awaiter.
    pub async fn dispatch(&self, event: DispatchEvent) -> FacadeResult<Option<Response>> {
        self.dispatcher.dispatch(event).await
    }

    /// The invocation's dispatcher.
    ///
    /// The returned reference is not tied to this context, so it stays
    /// usable after `next` consumes it.
    #[must_use]
    pub fn dispatcher(&self) -> &'a Dispatcher {
        self.dispatcher
    }
}

impl std::fmt::Debug for MiddlewareContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareContext").finish_non_exhaustive()
    }
}

/// The continuation into the remainder of the chain.
///
/// Built back to front around the terminal handler, so a walk off the end
/// of the chain is unrepresentable: the last node is always the terminal.
pub(crate) struct Next<'a> {
    inner: NextInner<'a>,
    dispatcher: &'a Dispatcher,
    ctx: ExecutionContext,
}

enum NextInner<'a> {
    /// More middleware ahead.
    Chain {
        head: &'a dyn Middleware,
        rest: Box<Next<'a>>,
    },
    /// End of chain: the terminal handler, adapted to the middleware
    /// calling convention (its context argument is the one threaded
    /// through the whole invocation).
    Terminal(FetchFn),
}

impl<'a> Next<'a> {
    pub(crate) fn terminal(
        terminal: FetchFn,
        dispatcher: &'a Dispatcher,
        ctx: ExecutionContext,
    ) -> Self {
        Self {
            inner: NextInner::Terminal(terminal),
            dispatcher,
            ctx,
        }
    }

    pub(crate) fn chained(head: &'a dyn Middleware, rest: Next<'a>) -> Self {
        let dispatcher = rest.dispatcher;
        let ctx = rest.ctx.clone();
        Self {
            inner: NextInner::Chain {
                head,
                rest: Box::new(rest),
            },
            dispatcher,
            ctx,
        }
    }

    pub(crate) async fn run(self, request: Request, env: Env) -> FacadeResult<Response> {
        let Self {
            inner,
            dispatcher,
            ctx,
        } = self;
        match inner {
            NextInner::Chain { head, rest } => {
                let chain = MiddlewareContext::new(dispatcher, *rest);
                head.handle(request, env, ctx, chain).await
            }
            NextInner::Terminal(terminal) => terminal(request, env, ctx).await,
        }
    }
}
