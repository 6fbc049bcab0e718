//! # Gantry Core
//!
//! Core types for the gantry worker facade.
//!
//! This crate defines the vocabulary shared by the middleware chain and the
//! facade wrapper: the HTTP [`Request`]/[`Response`] aliases, the worker
//! [`Env`] bindings value, the [`ExecutionContext`] deferred-work handle,
//! the [`ScheduledController`] timer descriptor with its brand-checked
//! cancellation capability, the two worker program shapes behind
//! [`WorkerProgram`], and the [`Dispatcher`] event-synthesis protocol.

#![doc(html_root_url = "https://docs.rs/gantry-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod controller;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod program;
pub mod types;

pub use context::ExecutionContext;
pub use controller::{ControllerBrand, NoRetryHandle, ScheduledController};
pub use dispatch::{DispatchEvent, Dispatcher, ScheduledInit};
pub use env::Env;
pub use error::{FacadeError, FacadeResult};
pub use program::{
    EntrypointProgram, FetchFn, HandlerSet, ScheduledFn, WorkerEntrypoint, WorkerModule,
    WorkerProgram,
};
pub use types::{BoxFuture, Request, Response, ResponseExt};
