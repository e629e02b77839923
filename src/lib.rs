//! # filament-di
//!
//! A container-agnostic dependency-resolution core: the lookup contract,
//! the three sharing lifetimes, the root/scope topology, and
//! cleanup-on-close semantics. Registration, meaning how a type is bound to
//! a factory, stays behind the [`Registry`] boundary, so any registration
//! layer can sit on top.
//!
//! ## Features
//!
//! - **Three lifetimes**: `Singleton`, `Scoped`, and `Transient`, plus an
//!   `Undefined` sentinel that is never resolvable
//! - **Identity guarantees**: at-most-once construction per (root, type)
//!   for singletons and per (scope, type) for scoped instances, even under
//!   concurrent first use
//! - **Scope isolation**: sibling scopes never share scoped instances and
//!   never inherit state
//! - **Cleanup-on-close**: tracked instances are released in reverse
//!   construction order, exactly once, with failures aggregated and a
//!   cancellation token forwarded to every closer
//! - **Thread-safe**: `Arc`-based sharing; root and scope caches behind
//!   their own locks
//!
//! ## Quick Start
//!
//! ```rust
//! use filament_di::{
//!     BindingMap, CancellationToken, Lifetime, ResolverExt, Scoper, ServiceProvider,
//! };
//! use std::sync::Arc;
//!
//! struct Logger {
//!     level: String,
//! }
//!
//! struct RequestContext {
//!     request_id: u64,
//! }
//!
//! let mut bindings = BindingMap::new();
//! bindings.bind::<Logger, _>(Lifetime::Singleton, |_| {
//!     Ok(Logger { level: "info".to_string() })
//! });
//! bindings.bind::<RequestContext, _>(Lifetime::Scoped, |_| {
//!     Ok(RequestContext { request_id: 42 })
//! });
//!
//! let provider = ServiceProvider::new(Arc::new(bindings));
//!
//! // Singletons resolve from the root and from any scope, always the
//! // same instance.
//! let logger = provider.get::<Logger>().unwrap();
//! assert_eq!(logger.level, "info");
//!
//! // Scoped instances need a scope to own them.
//! let scope = provider.create_scope();
//! let ctx_a = scope.get::<RequestContext>().unwrap();
//! let ctx_b = scope.get::<RequestContext>().unwrap();
//! assert!(Arc::ptr_eq(&ctx_a, &ctx_b));
//!
//! // Closing the scope releases what it tracked.
//! scope.close(&CancellationToken::new()).unwrap();
//! ```
//!
//! ## Lifetimes
//!
//! - **Singleton**: one instance per root, shared by every scope; never
//!   closed by a scope
//! - **Scoped**: one instance per scope; closed when the scope closes;
//!   not resolvable from the root
//! - **Transient**: a fresh instance per resolution; closed by the scope
//!   that produced it, or owned entirely by the caller when resolved from
//!   the root
//!
//! ## Cleanup
//!
//! A constructed instance may carry the [`Closer`] capability (attached at
//! construction time via [`Constructed::closeable`]). When a scope closes,
//! every tracked instance's closer runs exactly once, in reverse
//! construction order; instances without the capability are skipped.
//! Failures never short-circuit the pass; they are collected into one
//! [`CloseError`].
//!
//! ```rust
//! use filament_di::{
//!     BindingMap, BoxError, CancellationToken, Closer, Constructed, Lifetime,
//!     ResolverExt, Scoper, ServiceProvider,
//! };
//! use std::sync::Arc;
//!
//! struct Connection;
//!
//! impl Closer for Connection {
//!     fn close(&self, _token: &CancellationToken) -> Result<(), BoxError> {
//!         // release the underlying resource
//!         Ok(())
//!     }
//! }
//!
//! let mut bindings = BindingMap::new();
//! bindings.bind_closeable::<Connection, _>(Lifetime::Scoped, |_| Ok(Connection));
//!
//! let provider = ServiceProvider::new(Arc::new(bindings));
//! let scope = provider.create_scope();
//! let _conn = scope.get::<Connection>().unwrap();
//! scope.close(&CancellationToken::new()).unwrap();
//! ```

// Module declarations
pub mod binding;
pub mod cancellation;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod provider;
pub mod traits;

// Internal modules
mod internal;

// Re-export core types
pub use binding::{Binding, BindingMap, Constructed, Registry};
pub use cancellation::{CancellationToken, CancelledError};
pub use error::{BoxError, CloseError, CloseFailure, DiError, DiResult};
pub use key::TypeKey;
pub use lifetime::Lifetime;
pub use provider::{Scope, Scoper, ServiceProvider};
pub use traits::{resolve, AnyArc, AsyncCloser, Closer, Resolver, ResolverExt};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn singleton_resolution_is_shared() {
        let mut bindings = BindingMap::new();
        bindings.bind::<usize, _>(Lifetime::Singleton, |_| Ok(42usize));

        let provider = ServiceProvider::new(Arc::new(bindings));
        let a = provider.get::<usize>().unwrap();
        let b = provider.get::<usize>().unwrap();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn transient_resolution_is_fresh() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let mut bindings = BindingMap::new();
        bindings.bind::<String, _>(Lifetime::Transient, move |_| {
            let n = counter_clone.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("instance-{}", n))
        });

        let provider = ServiceProvider::new(Arc::new(bindings));
        let a = provider.get::<String>().unwrap();
        let b = provider.get::<String>().unwrap();

        assert_eq!(a.as_str(), "instance-1");
        assert_eq!(b.as_str(), "instance-2");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn scoped_resolution_is_per_scope() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let mut bindings = BindingMap::new();
        bindings.bind::<String, _>(Lifetime::Scoped, move |_| {
            let n = counter_clone.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("scoped-{}", n))
        });

        let provider = ServiceProvider::new(Arc::new(bindings));

        let scope1 = provider.create_scope();
        let s1a = scope1.get::<String>().unwrap();
        let s1b = scope1.get::<String>().unwrap();
        assert!(Arc::ptr_eq(&s1a, &s1b));

        let scope2 = provider.create_scope();
        let s2 = scope2.get::<String>().unwrap();
        assert!(!Arc::ptr_eq(&s1a, &s2));
    }

    #[test]
    fn factories_resolve_their_dependencies() {
        struct Config {
            port: u16,
        }

        struct Server {
            config: Arc<Config>,
        }

        let mut bindings = BindingMap::new();
        bindings.bind::<Config, _>(Lifetime::Singleton, |_| Ok(Config { port: 8080 }));
        bindings.bind::<Server, _>(Lifetime::Singleton, |resolver| {
            Ok(Server {
                config: resolver.get::<Config>()?,
            })
        });

        let provider = ServiceProvider::new(Arc::new(bindings));
        let server = provider.get::<Server>().unwrap();
        assert_eq!(server.config.port, 8080);
    }
}
