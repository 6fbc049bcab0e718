//! # Gantry Facade
//!
//! The top-level wrapper of the gantry worker facade.
//!
//! [`wrap`] turns a worker module plus a middleware registry into a
//! drop-in replacement module whose request path runs the chain before
//! the program's own handler, and whose middleware can synthesize other
//! event kinds (currently timer events) against the same program.
//!
//! Wrapping is perfectly transparent when no middleware is registered,
//! and never touches anything but the request entry point: timer
//! handlers, arbitrary properties, and named entrypoint exports pass
//! through by reference.

#![doc(html_root_url = "https://docs.rs/gantry-facade/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatcher;
mod wrap;

pub use wrap::wrap;
