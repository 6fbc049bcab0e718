//! # Gantry
//!
//! **Middleware dispatch facade for deployed worker programs.**
//!
//! A deployed worker is a single-process program exposing optional event
//! handlers: a request handler, a timer handler. Gantry wraps such a
//! program with an ordered chain of interceptors so that cross-cutting
//! behavior (logging, test scaffolding, request rewriting) can be layered
//! on without touching the program's own code:
//!
//! - two program shapes, a plain handler set and an instantiable
//!   entrypoint type, behind one tagged [`core::WorkerProgram`];
//! - a continuation protocol (`next`) that is the only path to later
//!   middleware, and a side-dispatch protocol that lets middleware
//!   synthesize timer events from inside a request;
//! - perfect transparency when no middleware is installed: wrapping with
//!   an empty chain returns the original program, and a chain of pure
//!   forwarders is byte-identical to no chain at all.
//!
//! ## Quick start
//!
//! ```
//! use gantry::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> FacadeResult<()> {
//! let program = WorkerProgram::Handlers(HandlerSet::new().with_fetch(
//!     |_req, _env, _ctx| Box::pin(async { Ok(Response::text("Hello world")) }),
//! ));
//!
//! let mut registry = MiddlewareRegistry::new();
//! registry.register_internal([
//!     Arc::new(ScheduledTestMiddleware::new()) as Arc<dyn Middleware>,
//! ]);
//!
//! let wrapped = wrap(WorkerModule::new(program), registry);
//!
//! let request = http::Request::builder()
//!     .uri("/")
//!     .body(http_body_util::Full::new(bytes::Bytes::new()))
//!     .unwrap();
//! let response = wrapped
//!     .fetch(request, Env::new(), ExecutionContext::new())
//!     .await?;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/gantry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use gantry_core as core;

// Re-export middleware types
pub use gantry_middleware as middleware;

// Re-export the facade wrapper
pub use gantry_facade as facade;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use gantry::prelude::*;
/// ```
pub mod prelude {
    pub use gantry_core::{
        DispatchEvent, Dispatcher, Env, EntrypointProgram, ExecutionContext, FacadeError,
        FacadeResult, HandlerSet, NoRetryHandle, Request, Response, ResponseExt,
        ScheduledController, ScheduledInit, WorkerEntrypoint, WorkerModule, WorkerProgram,
    };

    pub use gantry_middleware::{
        FnMiddleware, Middleware, MiddlewareChain, MiddlewareContext, MiddlewareRegistry,
    };

    pub use gantry_middleware::stages::{JsonErrorMiddleware, ScheduledTestMiddleware};

    pub use gantry_facade::wrap;
}
