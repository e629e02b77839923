//! The resolver capability and the typed resolution helper.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

/// Type-erased shared instance handed across the resolver boundary.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Capability to obtain an instance of a requested type.
///
/// This is the minimal, object-safe lookup contract. Many resolvers may
/// exist at once: the root [`ServiceProvider`](crate::ServiceProvider) and
/// one per [`Scope`](crate::Scope), all sharing the root's singleton cache.
///
/// Contract: on success the returned value must downcast to the requested
/// type; violating that is a defect in the resolver implementation itself,
/// surfaced by the typed helper as
/// [`DiError::InvalidResolution`](crate::DiError::InvalidResolution).
/// Failures from the underlying registry or factory are propagated
/// unchanged.
pub trait Resolver: Send + Sync {
    /// Returns an instance of the requested type, type-erased.
    ///
    /// Side effects depend on the binding's lifetime: `Transient` always
    /// constructs; `Scoped` and `Singleton` may hit a cache or trigger
    /// construction-and-insertion.
    fn get_any(&self, key: &TypeKey) -> DiResult<AnyArc>;
}

/// Typed resolution sugar available on every [`Resolver`].
///
/// # Examples
///
/// ```rust
/// use filament_di::{Binding, BindingMap, Constructed, Lifetime, ResolverExt, ServiceProvider};
/// use std::sync::Arc;
///
/// let mut bindings = BindingMap::new();
/// bindings.bind::<u32, _>(Lifetime::Singleton, |_| Ok(7));
///
/// let provider = ServiceProvider::new(Arc::new(bindings));
/// let value = provider.get::<u32>().unwrap();
/// assert_eq!(*value, 7);
/// ```
pub trait ResolverExt: Resolver {
    /// Resolves an instance of `T`, narrowing the type-erased result.
    ///
    /// Resolver errors pass through unchanged; a value that does not
    /// downcast to `T` yields
    /// [`DiError::InvalidResolution`](crate::DiError::InvalidResolution)
    /// carrying both the requested and the returned type descriptors.
    fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let key = TypeKey::of::<T>();
        let any = self.get_any(&key)?;
        let returned = any.as_ref().type_id();
        any.downcast::<T>().map_err(|_| DiError::InvalidResolution {
            requested: key,
            returned,
        })
    }
}

impl<R: Resolver + ?Sized> ResolverExt for R {}

/// Obtains an instance of `T` from an optional resolver.
///
/// This is the guard-rail entry point for code handed a resolver it does not
/// control: a missing resolver fails with
/// [`DiError::NilResolver`](crate::DiError::NilResolver) before any type
/// information is consulted, resolver errors propagate unchanged, and a
/// mis-typed result fails with
/// [`DiError::InvalidResolution`](crate::DiError::InvalidResolution). The
/// helper never caches, never mutates resolver state, and never retries.
///
/// # Examples
///
/// ```rust
/// use filament_di::{resolve, DiError};
///
/// let err = resolve::<String>(None).unwrap_err();
/// assert!(matches!(err, DiError::NilResolver));
/// ```
pub fn resolve<T: Send + Sync + 'static>(
    resolver: Option<&dyn Resolver>,
) -> DiResult<Arc<T>> {
    let resolver = resolver.ok_or(DiError::NilResolver)?;
    resolver.get::<T>()
}
