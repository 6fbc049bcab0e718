//! Built-in middleware stages.
//!
//! These are ordinary middleware with no special standing: the build
//! pipeline registers them through the same registry entry points as any
//! program-declared middleware.

pub mod json_error;
pub mod scheduled;

pub use json_error::JsonErrorMiddleware;
pub use scheduled::ScheduledTestMiddleware;
