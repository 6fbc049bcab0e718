//! Middleware registration.
//!
//! Worker programs declare middleware in one of two styles: a declarative
//! array-valued export collected by the build pipeline, or imperative
//! registration calls made while the program's globals run. Both styles
//! feed one append-only ordered list; nothing is deduplicated or
//! reordered.

use crate::middleware::Middleware;
use std::sync::Arc;

/// Accumulates middleware in registration order.
///
/// Two imperative entry points exist: [`register`](Self::register) for
/// program code and [`register_internal`](Self::register_internal) for
/// middleware injected by the build pipeline. They append to the same
/// list; call order across both is what determines chain order.
#[derive(Default)]
pub struct MiddlewareRegistry {
    chain: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded from a program's declarative middleware
    /// list, in array order.
    ///
    /// Declared middleware precede anything registered imperatively.
    #[must_use]
    pub fn with_declared<I>(declared: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        let mut registry = Self::new();
        registry.append("declared", declared);
        registry
    }

    /// Registers middleware.
    ///
    /// Accepts any iterable — a single-element array or a whole batch —
    /// flattened into the list in order. An empty batch is a no-op;
    /// repeated calls append, never overwrite.
    pub fn register<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.append("public", batch);
    }

    /// Registers middleware on behalf of the build pipeline.
    ///
    /// Identical semantics to [`register`](Self::register); the separate
    /// entry point only marks origin in logs.
    pub fn register_internal<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.append("internal", batch);
    }

    fn append<I>(&mut self, origin: &'static str, batch: I)
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        for middleware in batch {
            tracing::debug!(origin, middleware = middleware.name(), "registered middleware");
            self.chain.push(middleware);
        }
    }

    /// Number of registered middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Freezes the registry into an immutable chain.
    #[must_use]
    pub fn seal(self) -> MiddlewareChain {
        MiddlewareChain {
            chain: self.chain.into(),
        }
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.chain.iter().map(|m| m.name()))
            .finish()
    }
}

/// An immutable, ordered middleware chain.
///
/// Built once at wrap time and shared for the lifetime of the wrapped
/// program; cloning shares the underlying list.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    chain: Arc<[Arc<dyn Middleware>]>,
}

impl MiddlewareChain {
    /// Number of middleware in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Iterates middleware in chain order.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn Middleware>> {
        self.chain.iter()
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.chain.iter().map(|m| m.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MiddlewareContext;
    use gantry_core::{BoxFuture, Env, ExecutionContext, FacadeResult, Request, Response};

    struct Named(&'static str);

    impl Middleware for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn handle<'a>(
            &'a self,
            request: Request,
            env: Env,
            _ctx: ExecutionContext,
            chain: MiddlewareContext<'a>,
        ) -> BoxFuture<'a, FacadeResult<Response>> {
            Box::pin(async move { chain.next(request, env).await })
        }
    }

    fn named(name: &'static str) -> Arc<dyn Middleware> {
        Arc::new(Named(name))
    }

    fn names(chain: &MiddlewareChain) -> Vec<&'static str> {
        chain.iter().map(|m| m.name()).collect()
    }

    #[test]
    fn test_empty_registry_seals_to_empty_chain() {
        let chain = MiddlewareRegistry::new().seal();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_declared_precede_registered() {
        let mut registry = MiddlewareRegistry::with_declared([named("a"), named("b")]);
        registry.register([named("c")]);

        let chain = registry.seal();
        assert_eq!(names(&chain), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_call_order_interleaves_both_entry_points() {
        let mut registry = MiddlewareRegistry::new();
        registry.register([named("one")]);
        registry.register_internal([named("two"), named("three")]);
        registry.register([named("four")]);

        let chain = registry.seal();
        assert_eq!(names(&chain), vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut registry = MiddlewareRegistry::new();
        registry.register(Vec::new());
        registry.register_internal(Vec::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mw = named("dup");
        let mut registry = MiddlewareRegistry::new();
        registry.register([mw.clone()]);
        registry.register([mw]);

        assert_eq!(registry.len(), 2);
    }
}
