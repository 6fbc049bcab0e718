//! Invocation chain execution.
//!
//! Given a sealed chain, a terminal handler, and a dispatcher, produce one
//! invocation: the continuation list is assembled back to front around the
//! terminal (so the terminal is always the last node), then walked from
//! the first middleware. Each position gets a fresh
//! [`MiddlewareContext`](crate::context::MiddlewareContext); nothing is
//! cached across invocations.

use crate::context::Next;
use crate::registry::MiddlewareChain;
use gantry_core::{BoxFuture, Dispatcher, Env, ExecutionContext, FacadeResult, FetchFn, Request, Response};

impl MiddlewareChain {
    /// Drives one invocation through the chain, ending at `terminal`.
    ///
    /// The same `ctx` handle is threaded to every middleware and the
    /// terminal; the executor neither wraps nor observes it. Errors from
    /// any position propagate unchanged.
    pub fn invoke<'a>(
        &'a self,
        dispatcher: &'a Dispatcher,
        terminal: FetchFn,
        request: Request,
        env: Env,
        ctx: ExecutionContext,
    ) -> BoxFuture<'a, FacadeResult<Response>> {
        let mut next = Next::terminal(terminal, dispatcher, ctx);
        for middleware in self.iter().rev() {
            next = Next::chained(middleware.as_ref(), next);
        }
        Box::pin(next.run(request, env))
    }
}
