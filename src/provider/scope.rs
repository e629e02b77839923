//! Scoped resolution and cleanup-on-close.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

use super::ServiceProvider;
use crate::binding::Binding;
use crate::cancellation::CancellationToken;
use crate::error::{CloseError, DiError, DiResult};
use crate::internal::{CloseBag, TrackedInstance};
use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::traits::{AnyArc, AsyncCloser, Closer, Resolver};

/// An isolation boundary owning scoped instances and responsible for their
/// release.
///
/// A `Scope` is created by [`Scoper::create_scope`](crate::Scoper) in the
/// open state, with an empty scoped cache and an empty tracked-instance
/// set. It resolves:
///
/// - **Singleton** bindings against the root's shared cache (the scope
///   takes no ownership and never closes them),
/// - **Scoped** bindings at most once per (scope, type) pair, tracked for
///   close,
/// - **Transient** bindings fresh on every call, each instance tracked for
///   close.
///
/// The scope's only state transition is Open → Closed via
/// [`close`](Scope::close) / [`close_async`](Scope::close_async). Once
/// closed, every
/// resolution fails with [`DiError::ScopeClosed`]; closing again is a no-op
/// returning `Ok(())`.
///
/// # Examples
///
/// ```rust
/// use filament_di::{
///     BindingMap, CancellationToken, Lifetime, ResolverExt, Scoper, ServiceProvider,
/// };
/// use std::sync::Arc;
///
/// struct RequestContext {
///     id: u64,
/// }
///
/// let mut bindings = BindingMap::new();
/// bindings.bind::<RequestContext, _>(Lifetime::Scoped, |_| Ok(RequestContext { id: 7 }));
///
/// let provider = ServiceProvider::new(Arc::new(bindings));
/// let scope = provider.create_scope();
///
/// let a = scope.get::<RequestContext>().unwrap();
/// let b = scope.get::<RequestContext>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b)); // identical within the scope
///
/// scope.close(&CancellationToken::new()).unwrap();
/// assert!(scope.get::<RequestContext>().is_err());
/// ```
pub struct Scope {
    root: ServiceProvider,
    // Per-key cells; first construction is at-most-once per (scope, key).
    scoped: Mutex<HashMap<TypeKey, Arc<OnceCell<AnyArc>>>>,
    tracked: Mutex<TrackedState>,
}

#[derive(Default)]
struct TrackedState {
    closed: bool,
    bag: CloseBag,
}

impl Scope {
    pub(crate) fn new(root: ServiceProvider) -> Self {
        Self {
            root,
            scoped: Mutex::new(HashMap::new()),
            tracked: Mutex::new(TrackedState::default()),
        }
    }

    /// The resolver bound to this scope.
    ///
    /// `Scope` is itself the resolver; this accessor exists for call sites
    /// that want to hand out the capability without exposing the scope.
    pub fn resolver(&self) -> &dyn Resolver {
        self
    }

    /// True once [`close`](Self::close) or [`close_async`](Self::close_async)
    /// has begun.
    pub fn is_closed(&self) -> bool {
        self.tracked.lock().unwrap().closed
    }

    /// Records an instance this scope produced. Rejects the registration if
    /// close began while the construction was in flight: the resolution
    /// fails with [`DiError::ScopeClosed`] and the fresh instance's sync
    /// closer is invoked immediately. An instance carrying only an
    /// [`AsyncCloser`] cannot be driven from this synchronous path; it is
    /// dropped unclosed with a warning.
    fn track(
        &self,
        type_name: &'static str,
        closer: Option<Arc<dyn Closer>>,
        async_closer: Option<Arc<dyn AsyncCloser>>,
    ) -> DiResult<()> {
        let mut state = self.tracked.lock().unwrap();
        if state.closed {
            drop(state);
            if let Some(closer) = closer {
                // Best effort; the resolution already failed.
                let _ = closer.close(&CancellationToken::new());
            } else if async_closer.is_some() {
                eprintln!(
                    "[filament-di] {} finished constructing after its scope \
                     closed; its async closer was not run",
                    type_name
                );
            }
            return Err(DiError::ScopeClosed(type_name));
        }
        state.bag.push(TrackedInstance {
            type_name,
            closer,
            async_closer,
        });
        Ok(())
    }

    fn resolve_scoped(&self, key: &TypeKey, binding: &Binding) -> DiResult<AnyArc> {
        let cell = {
            let mut scoped = self.scoped.lock().unwrap();
            scoped
                .entry(*key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        // Construction runs without the cache lock; the cell serializes
        // concurrent first uses so exactly one instance is built.
        cell.get_or_try_init(|| {
            let constructed = binding.construct(self)?;
            self.track(key.name(), constructed.closer, constructed.async_closer)?;
            Ok(constructed.value)
        })
        .map(|value| value.clone())
    }

    /// Closes the scope, releasing every tracked instance that carries a
    /// sync [`Closer`], in reverse construction order.
    ///
    /// The first call transitions the scope to Closed; in-flight
    /// resolutions that finish after that point are rejected rather than
    /// silently returning instances of a dead scope. Subsequent calls are a
    /// no-op returning `Ok(())`.
    ///
    /// The token is forwarded to every closer. Cleanup never stops early:
    /// failures, including cancellation errors a closer reports, are
    /// aggregated into a single [`CloseError`].
    ///
    /// Instances carrying only an [`AsyncCloser`] are skipped here; use
    /// [`close_async`](Self::close_async) when async closers are in play.
    pub fn close(&self, token: &CancellationToken) -> Result<(), CloseError> {
        let mut bag = match self.begin_close() {
            Some(bag) => bag,
            None => return Ok(()),
        };
        match CloseError::from_failures(bag.close_sync_reverse(token)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Async variant of [`close`](Self::close): async closers run first,
    /// then sync closers, both in reverse construction order. Same
    /// double-close policy.
    pub async fn close_async(&self, token: &CancellationToken) -> Result<(), CloseError> {
        let mut bag = match self.begin_close() {
            Some(bag) => bag,
            None => return Ok(()),
        };
        match CloseError::from_failures(bag.close_async_reverse(token).await) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Transitions Open → Closed and takes the tracked set, or returns
    /// `None` when the scope was already closed.
    fn begin_close(&self) -> Option<CloseBag> {
        let mut state = self.tracked.lock().unwrap();
        if state.closed {
            return None;
        }
        state.closed = true;
        Some(std::mem::take(&mut state.bag))
    }
}

impl Resolver for Scope {
    fn get_any(&self, key: &TypeKey) -> DiResult<AnyArc> {
        if self.is_closed() {
            return Err(DiError::ScopeClosed(key.name()));
        }

        let binding = self
            .root
            .inner()
            .registry
            .binding(key)
            .ok_or(DiError::NotFound(key.name()))?;

        match binding.lifetime() {
            // Shared with the root; this scope takes no ownership.
            Lifetime::Singleton => self.root.resolve_singleton(key, &binding),
            Lifetime::Scoped => self.resolve_scoped(key, &binding),
            Lifetime::Transient => {
                let constructed = binding.construct(self)?;
                self.track(key.name(), constructed.closer, constructed.async_closer)?;
                Ok(constructed.value)
            }
            Lifetime::Undefined => Err(DiError::UndefinedLifetime(key.name())),
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        let state = self.tracked.get_mut().unwrap();
        if !state.closed && state.bag.has_pending_closers() {
            eprintln!(
                "[filament-di] scope dropped with unclosed instances. \
                 Call close() or close_async() before dropping."
            );
        }
    }
}
