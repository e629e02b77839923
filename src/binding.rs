//! The registry boundary: bindings and the lookup contract the external
//! registrar implements.
//!
//! The core never decides how types are registered. It consumes exactly two
//! facts about a requested type, its [`Lifetime`] and a construction
//! procedure, through the [`Registry`] trait. [`BindingMap`] is the minimal
//! shipped implementation of that boundary; richer registration layers
//! (modules, constructor wiring, graph validation) live outside this crate.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::DiResult;
use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::traits::{AnyArc, AsyncCloser, Closer, Resolver};

/// A freshly constructed instance together with its cleanup capabilities.
///
/// Capability detection happens here, once, at construction time: the
/// binding that builds the value decides whether it carries a
/// [`Closer`]/[`AsyncCloser`] handle, and the owning scope consults those
/// handles, never the value itself, during teardown.
pub struct Constructed {
    pub(crate) value: AnyArc,
    pub(crate) closer: Option<Arc<dyn Closer>>,
    pub(crate) async_closer: Option<Arc<dyn AsyncCloser>>,
}

impl Constructed {
    /// An instance with no cleanup capability; skipped silently at close.
    pub fn plain<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            closer: None,
            async_closer: None,
        }
    }

    /// An instance whose [`Closer`] capability is attached for teardown.
    ///
    /// The same allocation backs both the resolved value and the closer
    /// handle, so close runs against the instance callers were handed.
    pub fn closeable<T: Closer>(value: T) -> Self {
        let value = Arc::new(value);
        Self {
            closer: Some(value.clone()),
            async_closer: None,
            value,
        }
    }

    /// An instance whose [`AsyncCloser`] capability is attached for
    /// teardown via [`Scope::close_async`](crate::Scope::close_async).
    pub fn async_closeable<T: AsyncCloser>(value: T) -> Self {
        let value = Arc::new(value);
        Self {
            closer: None,
            async_closer: Some(value.clone()),
            value,
        }
    }
}

type Factory = Arc<dyn Fn(&dyn Resolver) -> DiResult<Constructed> + Send + Sync>;

/// What the registry knows about one type: its lifetime and how to build it.
///
/// The factory receives the resolver it was invoked through, so instances
/// can pull their own dependencies. Singleton factories are always invoked
/// with the root resolver regardless of which scope triggered construction;
/// this keeps a singleton from capturing a scoped instance that would be
/// closed out from under it.
pub struct Binding {
    lifetime: Lifetime,
    factory: Factory,
}

impl Binding {
    /// Creates a binding from a lifetime and a construction procedure.
    pub fn new<F>(lifetime: Lifetime, factory: F) -> Self
    where
        F: Fn(&dyn Resolver) -> DiResult<Constructed> + Send + Sync + 'static,
    {
        Self {
            lifetime,
            factory: Arc::new(factory),
        }
    }

    /// The sharing policy configured for this binding.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub(crate) fn construct(&self, resolver: &dyn Resolver) -> DiResult<Constructed> {
        (self.factory)(resolver)
    }
}

impl Clone for Binding {
    fn clone(&self) -> Self {
        Self {
            lifetime: self.lifetime,
            factory: self.factory.clone(),
        }
    }
}

/// The external-collaborator boundary: given a type key, report its binding.
///
/// A `None` return means the type is not registered and resolution fails
/// with [`DiError::NotFound`](crate::DiError::NotFound).
pub trait Registry: Send + Sync {
    /// Looks up the binding for a requested type.
    fn binding(&self, key: &TypeKey) -> Option<Binding>;
}

/// Minimal map-backed [`Registry`].
///
/// Later bindings for the same type replace earlier ones. This is
/// deliberately just a map: no wiring, no graph analysis, no
/// circular-dependency detection. Those belong to a registration layer
/// built on top of this boundary.
///
/// # Examples
///
/// ```rust
/// use filament_di::{BindingMap, Lifetime, ResolverExt, ServiceProvider};
/// use std::sync::Arc;
///
/// struct Config {
///     url: String,
/// }
///
/// let mut bindings = BindingMap::new();
/// bindings.bind::<Config, _>(Lifetime::Singleton, |_| {
///     Ok(Config { url: "postgres://localhost".to_string() })
/// });
///
/// let provider = ServiceProvider::new(Arc::new(bindings));
/// let config = provider.get::<Config>().unwrap();
/// assert_eq!(config.url, "postgres://localhost");
/// ```
#[derive(Default)]
pub struct BindingMap {
    bindings: HashMap<TypeKey, Binding>,
}

impl BindingMap {
    /// Creates an empty binding map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `T` to a plain factory with the given lifetime.
    pub fn bind<T, F>(&mut self, lifetime: Lifetime, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> DiResult<T> + Send + Sync + 'static,
    {
        self.bind_with::<T, _>(lifetime, move |resolver| {
            Ok(Constructed::plain(factory(resolver)?))
        });
    }

    /// Binds `T` to a factory whose instances carry the [`Closer`]
    /// capability.
    pub fn bind_closeable<T, F>(&mut self, lifetime: Lifetime, factory: F)
    where
        T: Closer,
        F: Fn(&dyn Resolver) -> DiResult<T> + Send + Sync + 'static,
    {
        self.bind_with::<T, _>(lifetime, move |resolver| {
            Ok(Constructed::closeable(factory(resolver)?))
        });
    }

    /// Binds `T` to a factory whose instances carry the [`AsyncCloser`]
    /// capability.
    pub fn bind_async_closeable<T, F>(&mut self, lifetime: Lifetime, factory: F)
    where
        T: AsyncCloser,
        F: Fn(&dyn Resolver) -> DiResult<T> + Send + Sync + 'static,
    {
        self.bind_with::<T, _>(lifetime, move |resolver| {
            Ok(Constructed::async_closeable(factory(resolver)?))
        });
    }

    /// Binds `T` to a factory producing a fully assembled [`Constructed`].
    pub fn bind_with<T, F>(&mut self, lifetime: Lifetime, factory: F)
    where
        T: 'static,
        F: Fn(&dyn Resolver) -> DiResult<Constructed> + Send + Sync + 'static,
    {
        self.insert(TypeKey::of::<T>(), Binding::new(lifetime, factory));
    }

    /// Inserts a binding under an explicit key, replacing any existing one.
    pub fn insert(&mut self, key: TypeKey, binding: Binding) {
        self.bindings.insert(key, binding);
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when no bindings are registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Registry for BindingMap {
    fn binding(&self, key: &TypeKey) -> Option<Binding> {
        self.bindings.get(key).cloned()
    }
}
