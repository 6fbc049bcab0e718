//! # Gantry Middleware
//!
//! The middleware chain for the gantry worker facade.
//!
//! A wrapped worker's request path runs through an ordered chain of
//! interceptors before reaching the program's own handler. This crate
//! provides the pieces the facade assembles:
//!
//! - the [`Middleware`] trait and [`FnMiddleware`] adapter;
//! - the [`MiddlewareContext`] continuation/dispatch protocol handed to
//!   each chain position;
//! - the [`MiddlewareRegistry`], which normalizes both declaration styles
//!   (a program's declarative list, and imperative registration calls)
//!   into one append-only ordered list, sealed into a [`MiddlewareChain`];
//! - the invocation executor (`MiddlewareChain::invoke`), which walks the
//!   chain and terminates at the program's request handler;
//! - built-in stages under [`stages`].
//!
//! ```text
//! Request → middleware[0] → middleware[1] → … → terminal (program fetch)
//!               │
//!               └── dispatch(event) ───────────→ program handler (no chain)
//! ```
//!
//! The chain order is exactly registration order; nothing is reordered,
//! deduplicated, or caught.

#![doc(html_root_url = "https://docs.rs/gantry-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
pub mod context;
pub mod middleware;
pub mod registry;
pub mod stages;

pub use context::MiddlewareContext;
pub use middleware::{FnMiddleware, Middleware};
pub use registry::{MiddlewareChain, MiddlewareRegistry};
