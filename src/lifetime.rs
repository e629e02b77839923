//! Sharing-lifetime definitions.

use std::fmt;

/// Sharing policy attached to a binding, controlling instance caching behavior.
///
/// Defines how many distinct instances of a bound type exist, which cache
/// (if any) they live in, and who is responsible for closing them.
///
/// The `Undefined` variant is the zero value: none of the defined policies is
/// a suitable default, because the right lifetime for a type depends on the
/// contract it provides and how the application uses it. A binding carrying
/// `Undefined` is never resolvable.
///
/// # Lifetime Characteristics
///
/// - **Singleton**: one instance per root, shared by every scope, never
///   closed by a scope
/// - **Scoped**: one instance per scope, closed when that scope closes
/// - **Transient**: fresh instance on every resolution; closed by the scope
///   it was resolved from, or owned by the caller when resolved from the root
///
/// # Examples
///
/// ```rust
/// use filament_di::Lifetime;
///
/// assert!(Lifetime::Singleton.is_defined());
/// assert!(!Lifetime::Undefined.is_defined());
/// assert_eq!(Lifetime::default(), Lifetime::Undefined);
/// assert_eq!(Lifetime::Scoped.to_string(), "Scoped");
/// assert_eq!(Lifetime::Undefined.to_string(), "Undefined");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Unset sentinel; never a valid binding.
    #[default]
    Undefined,
    /// New instance per resolution, never cached.
    ///
    /// Transient instances resolved through a scope are tracked by that
    /// scope and closed with it. Transient instances resolved from the root
    /// belong to the caller and are never closed by the framework.
    Transient,
    /// Single instance per scope, cached for the scope's lifetime.
    ///
    /// Every resolution through the same scope returns the identical
    /// instance; distinct scopes always hold distinct instances. Scoped
    /// bindings cannot be resolved from the root, because no scope would
    /// exist to own the instance.
    Scoped,
    /// Single instance per root provider, cached forever.
    ///
    /// The same instance is shared by the root and all scopes derived from
    /// it, no matter which resolver first triggered construction. Scopes
    /// never close singleton instances.
    Singleton,
}

impl Lifetime {
    /// True iff this is one of the defined policies:
    /// [`Transient`](Lifetime::Transient), [`Scoped`](Lifetime::Scoped), or
    /// [`Singleton`](Lifetime::Singleton).
    pub fn is_defined(self) -> bool {
        !matches!(self, Lifetime::Undefined)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifetime::Transient => "Transient",
            Lifetime::Scoped => "Scoped",
            Lifetime::Singleton => "Singleton",
            Lifetime::Undefined => "Undefined",
        };
        f.write_str(name)
    }
}
