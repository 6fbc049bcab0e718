//! Core middleware trait.
//!
//! Middleware intercept a worker's request path. Each middleware receives
//! the request, the environment, the invocation's execution context, and a
//! [`MiddlewareContext`] carrying the continuation and dispatch protocol.
//!
//! # Contract
//!
//! - Calling [`MiddlewareContext::next`] is the only way to reach later
//!   middleware and the terminal handler; not calling it short-circuits
//!   the chain and this middleware's return value becomes the response.
//! - A middleware that forwards unmodified must be invisible: same status,
//!   headers, and body as the terminal handler produced.
//! - Errors are not caught here or anywhere in the chain machinery; they
//!   propagate to whichever caller is most immediately awaiting.
//!
//! # Example
//!
//! ```
//! use gantry_core::{Env, ExecutionContext, FacadeResult, BoxFuture, Request, Response};
//! use gantry_middleware::{Middleware, MiddlewareContext};
//!
//! struct HeaderStamp;
//!
//! impl Middleware for HeaderStamp {
//!     fn name(&self) -> &'static str {
//!         "header_stamp"
//!     }
//!
//!     fn handle<'a>(
//!         &'a self,
//!         request: Request,
//!         env: Env,
//!         _ctx: ExecutionContext,
//!         chain: MiddlewareContext<'a>,
//!     ) -> BoxFuture<'a, FacadeResult<Response>> {
//!         Box::pin(async move {
//!             let mut response = chain.next(request, env).await?;
//!             response.headers_mut().insert("x-stamped", "1".parse().unwrap());
//!             Ok(response)
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use gantry_core::{BoxFuture, Env, ExecutionContext, FacadeResult, Request, Response};

/// An interceptor on the worker's request path.
///
/// Identity and order matter: the chain executes middleware strictly in
/// registration order and never deduplicates.
pub trait Middleware: Send + Sync + 'static {
    /// A short name used for logging.
    fn name(&self) -> &'static str;

    /// Processes the request.
    ///
    /// `chain` holds the continuation (`next`) and the event dispatcher;
    /// consuming it via [`MiddlewareContext::next`] invokes the remainder
    /// of the chain with a possibly-rewritten request and environment.
    fn handle<'a>(
        &'a self,
        request: Request,
        env: Env,
        ctx: ExecutionContext,
        chain: MiddlewareContext<'a>,
    ) -> BoxFuture<'a, FacadeResult<Response>>;
}

/// A middleware defined by a plain function.
///
/// Lifetime inference works best with `fn` items; closures usually need
/// their signature spelled out.
///
/// # Example
///
/// ```
/// use gantry_core::{Env, ExecutionContext, FacadeResult, BoxFuture, Request, Response};
/// use gantry_middleware::{FnMiddleware, MiddlewareContext};
///
/// fn passthrough<'a>(
///     request: Request,
///     env: Env,
///     _ctx: ExecutionContext,
///     chain: MiddlewareContext<'a>,
/// ) -> BoxFuture<'a, FacadeResult<Response>> {
///     Box::pin(async move { chain.next(request, env).await })
/// }
///
/// let middleware = FnMiddleware::new("passthrough", passthrough);
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(
            Request,
            Env,
            ExecutionContext,
            MiddlewareContext<'a>,
        ) -> BoxFuture<'a, FacadeResult<Response>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        request: Request,
        env: Env,
        ctx: ExecutionContext,
        chain: MiddlewareContext<'a>,
    ) -> BoxFuture<'a, FacadeResult<Response>> {
        (self.func)(request, env, ctx, chain)
    }
}
