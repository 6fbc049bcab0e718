//! Worker environment bindings.
//!
//! [`Env`] is the bindings value handed to a worker on every invocation:
//! a name-keyed table of type-erased values (emulated stores, secrets,
//! plain variables). The facade itself never reads bindings; it only
//! threads the value through middleware, which may substitute a different
//! one when continuing the chain.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// The environment passed to handlers and middleware.
///
/// Cloning is cheap (the underlying table is shared), and a clone observes
/// the same bindings. Building a modified environment copies the table, so
/// an upstream `Env` is never mutated behind a handler's back.
///
/// # Example
///
/// ```
/// use gantry_core::Env;
///
/// let env = Env::new()
///     .with_binding("GREETING", "hello".to_string())
///     .with_binding("LIMIT", 3u32);
///
/// assert_eq!(env.binding::<String>("GREETING").as_deref(), Some(&"hello".to_string()));
/// assert_eq!(env.binding::<u32>("LIMIT").as_deref(), Some(&3));
/// assert!(env.binding::<u32>("GREETING").is_none());
/// ```
#[derive(Clone, Default)]
pub struct Env {
    bindings: Arc<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Env {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new environment with the given binding added.
    #[must_use]
    pub fn with_binding<T: Send + Sync + 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        Arc::make_mut(&mut self.bindings).insert(name.into(), Arc::new(value));
        self
    }

    /// Looks up a binding by name, downcast to the expected type.
    ///
    /// Returns `None` if the name is absent or the stored value has a
    /// different type.
    #[must_use]
    pub fn binding<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.bindings
            .get(name)
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Returns true if a binding with the given name exists.
    #[must_use]
    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if there are no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Env").field("bindings", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_env() {
        let env = Env::new();
        assert!(env.is_empty());
        assert!(env.binding::<String>("missing").is_none());
    }

    #[test]
    fn test_clone_shares_bindings() {
        let env = Env::new().with_binding("COUNT", 7i64);
        let clone = env.clone();
        assert_eq!(clone.binding::<i64>("COUNT").as_deref(), Some(&7));
    }

    #[test]
    fn test_with_binding_does_not_mutate_original() {
        let base = Env::new().with_binding("A", 1u8);
        let extended = base.clone().with_binding("B", 2u8);

        assert!(base.binding::<u8>("B").is_none());
        assert!(extended.has_binding("A"));
        assert!(extended.has_binding("B"));
    }

    #[test]
    fn test_wrong_type_downcast() {
        let env = Env::new().with_binding("N", 1u32);
        assert!(env.binding::<u64>("N").is_none());
    }
}
