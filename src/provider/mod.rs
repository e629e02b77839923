//! The root provider: singleton cache owner and scope factory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

use crate::binding::{Binding, Registry};
use crate::cancellation::CancellationToken;
use crate::error::{CloseError, DiError, DiResult};
use crate::internal::{CloseBag, TrackedInstance};
use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::traits::{AnyArc, Resolver};

pub mod scope;
pub use scope::Scope;

/// Capability to spawn fresh isolation boundaries.
///
/// Separated from [`Resolver`] so code that only needs to create scopes can
/// say so. Every created scope starts with an empty scoped cache and an
/// empty tracked-instance set; nothing is inherited from sibling scopes.
pub trait Scoper {
    /// Creates a new scope in the open state.
    ///
    /// May be called any number of times and concurrently.
    fn create_scope(&self) -> Scope;
}

/// The root resolver: owner of the singleton cache and factory for
/// [`Scope`]s.
///
/// A `ServiceProvider` is built from any [`Registry`] implementation and is
/// the only legal place to resolve `Transient` and `Singleton` bindings
/// without a scope. Resolving a `Scoped` binding from the root is a defect
/// and fails with [`DiError::ScopedFromRoot`].
///
/// Cloning is cheap (`Arc` internally) and every clone shares the same
/// singleton cache.
///
/// # Thread Safety
///
/// `ServiceProvider` is fully thread-safe. Concurrent first resolutions of
/// the same singleton serialize per type key, so exactly one construction
/// occurs and every caller observes the same instance.
///
/// # Examples
///
/// ```rust
/// use filament_di::{BindingMap, Lifetime, ResolverExt, Scoper, ServiceProvider};
/// use std::sync::Arc;
///
/// struct Logger {
///     level: String,
/// }
///
/// let mut bindings = BindingMap::new();
/// bindings.bind::<Logger, _>(Lifetime::Singleton, |_| {
///     Ok(Logger { level: "info".to_string() })
/// });
///
/// let provider = ServiceProvider::new(Arc::new(bindings));
/// let a = provider.get::<Logger>().unwrap();
///
/// let scope = provider.create_scope();
/// let b = scope.get::<Logger>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b)); // shared across root and scopes
/// ```
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    pub(crate) registry: Arc<dyn Registry>,
    // Per-key cells so first construction is at-most-once without holding
    // the map lock across a factory call.
    singletons: Mutex<HashMap<TypeKey, Arc<OnceCell<AnyArc>>>>,
    closers: Mutex<CloseBag>,
}

impl ServiceProvider {
    /// Creates a root provider over the given registry.
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                registry,
                singletons: Mutex::new(HashMap::new()),
                closers: Mutex::new(CloseBag::default()),
            }),
        }
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ProviderInner {
        &self.inner
    }

    /// Resolves a singleton through its per-key cell.
    ///
    /// The factory always runs against the root resolver, even when a scope
    /// triggered the resolution: a singleton outlives every scope, so
    /// letting it capture a scoped instance would leave it holding a closed
    /// value. With the root as context, such a dependency fails with
    /// [`DiError::ScopedFromRoot`] instead.
    pub(crate) fn resolve_singleton(
        &self,
        key: &TypeKey,
        binding: &Binding,
    ) -> DiResult<AnyArc> {
        let cell = {
            let mut singletons = self.inner.singletons.lock().unwrap();
            singletons
                .entry(*key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        // The map lock is released here; the cell serializes construction
        // per key so concurrent first uses build exactly once.
        cell.get_or_try_init(|| {
            let constructed = binding.construct(self)?;
            if constructed.closer.is_some() || constructed.async_closer.is_some() {
                self.inner.closers.lock().unwrap().push(TrackedInstance {
                    type_name: key.name(),
                    closer: constructed.closer,
                    async_closer: constructed.async_closer,
                });
            }
            Ok(constructed.value)
        })
        .map(|value| value.clone())
    }

    /// Tears down the root, closing every singleton that carries a sync
    /// [`Closer`](crate::Closer), in reverse construction order.
    ///
    /// Singletons with an async closer require
    /// [`close_async`](Self::close_async). Failures are aggregated; cleanup
    /// never short-circuits.
    pub fn close(&self, token: &CancellationToken) -> Result<(), CloseError> {
        let mut bag = std::mem::take(&mut *self.inner.closers.lock().unwrap());
        match CloseError::from_failures(bag.close_sync_reverse(token)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Async variant of [`close`](Self::close): async closers run first,
    /// then sync closers, both in reverse construction order.
    pub async fn close_async(&self, token: &CancellationToken) -> Result<(), CloseError> {
        let mut bag = std::mem::take(&mut *self.inner.closers.lock().unwrap());
        match CloseError::from_failures(bag.close_async_reverse(token).await) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Clone for ServiceProvider {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Resolver for ServiceProvider {
    fn get_any(&self, key: &TypeKey) -> DiResult<AnyArc> {
        let binding = self
            .inner
            .registry
            .binding(key)
            .ok_or(DiError::NotFound(key.name()))?;

        match binding.lifetime() {
            Lifetime::Singleton => self.resolve_singleton(key, &binding),
            Lifetime::Scoped => Err(DiError::ScopedFromRoot(key.name())),
            // Root-resolved transients belong to the caller; the framework
            // never tracks or closes them.
            Lifetime::Transient => binding.construct(self).map(|c| c.value),
            Lifetime::Undefined => Err(DiError::UndefinedLifetime(key.name())),
        }
    }
}

impl Scoper for ServiceProvider {
    fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }
}

impl Drop for ServiceProvider {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            if let Ok(bag) = self.inner.closers.try_lock() {
                if bag.has_pending_closers() {
                    eprintln!(
                        "[filament-di] root provider dropped with unclosed singletons. \
                         Call close() or close_async() before dropping."
                    );
                }
            }
        }
    }
}
