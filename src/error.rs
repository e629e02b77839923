//! Error types for the resolution core.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::key::TypeKey;

/// Boxed error type returned by [`Closer`](crate::Closer) implementations
/// and accepted from factory failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Resolution errors.
///
/// Represents every failure the core itself can surface from
/// [`resolve`](crate::resolve) / [`Resolver::get_any`](crate::Resolver::get_any).
/// Factory failures pass through [`DiError::Construction`] with the original
/// cause reachable via [`std::error::Error::source`]; the core never wraps an
/// error a second time.
///
/// # Examples
///
/// ```rust
/// use filament_di::{resolve, DiError};
///
/// let err = resolve::<String>(None).unwrap_err();
/// assert!(matches!(err, DiError::NilResolver));
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// The typed helper was invoked without a resolver. A programmer error,
    /// checked before any type information is used.
    NilResolver,
    /// No binding exists for the requested type.
    NotFound(&'static str),
    /// The resolver returned a value not assignable to the requested type.
    ///
    /// Always indicates a broken [`Resolver`](crate::Resolver)
    /// implementation, never a caller mistake: the resolver contract
    /// requires returned values to downcast to the requested type.
    InvalidResolution {
        /// The type that was requested.
        requested: TypeKey,
        /// The dynamic type the resolver actually returned.
        returned: TypeId,
    },
    /// A scoped binding was resolved from the root provider, where no scope
    /// exists to own the instance.
    ScopedFromRoot(&'static str),
    /// Any resolution through a scope that has been closed.
    ScopeClosed(&'static str),
    /// The binding carried the `Undefined` lifetime sentinel.
    UndefinedLifetime(&'static str),
    /// The binding's factory failed. The original error is exposed verbatim
    /// through `source()`.
    Construction {
        /// The type whose factory failed.
        type_name: &'static str,
        /// The factory's error, unwrapped and shared.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl DiError {
    /// Wraps a factory failure, keeping the original error reachable via
    /// [`std::error::Error::source`].
    pub fn construction(type_name: &'static str, source: impl Into<BoxError>) -> Self {
        DiError::Construction {
            type_name,
            source: Arc::from(source.into()),
        }
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NilResolver => {
                write!(f, "cannot resolve instances from a nil resolver")
            }
            DiError::NotFound(name) => write!(f, "no binding for type: {}", name),
            DiError::InvalidResolution { requested, returned } => write!(
                f,
                "resolver returned a value of type {:?} when {} was requested",
                returned,
                requested.name()
            ),
            DiError::ScopedFromRoot(name) => write!(
                f,
                "cannot resolve scoped binding {} from the root provider",
                name
            ),
            DiError::ScopeClosed(name) => {
                write!(f, "cannot resolve {} from a closed scope", name)
            }
            DiError::UndefinedLifetime(name) => {
                write!(f, "binding for {} has an undefined lifetime", name)
            }
            DiError::Construction { type_name, source } => {
                write!(f, "failed to construct {}: {}", type_name, source)
            }
        }
    }
}

impl std::error::Error for DiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiError::Construction { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type for resolution operations.
pub type DiResult<T> = Result<T, DiError>;

/// A single closer failure recorded during a close pass.
#[derive(Debug)]
pub struct CloseFailure {
    /// The type whose closer failed.
    pub type_name: &'static str,
    /// The error the closer returned.
    pub source: BoxError,
}

impl fmt::Display for CloseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.source)
    }
}

/// Aggregate of every closer failure from a single close pass.
///
/// Close never short-circuits: every tracked instance gets its close
/// attempt, and the failures are collected here so operators can see every
/// resource that failed to release at once.
#[derive(Debug)]
pub struct CloseError {
    failures: Vec<CloseFailure>,
}

impl CloseError {
    pub(crate) fn from_failures(failures: Vec<CloseFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// Number of closers that failed.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// True when no failures were recorded. Always false for a constructed
    /// `CloseError`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// The individual failures, in the order the close pass hit them.
    pub fn failures(&self) -> &[CloseFailure] {
        &self.failures
    }
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} closer(s) failed:", self.failures.len())?;
        for failure in &self.failures {
            write!(f, " [{}]", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for CloseError {}
