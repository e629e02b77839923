//! Cancellation and deadline signalling for close passes.
//!
//! A [`CancellationToken`] is handed to [`Scope::close`](crate::Scope::close)
//! and forwarded to every [`Closer`](crate::Closer) invocation, so cleanup
//! work that blocks or performs I/O can be abandoned cooperatively.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A token that signals cancellation across cleanup operations.
///
/// The close pass itself never stops early on cancellation; it forwards the
/// token to each closer and lets the closer decide how to honor it. Tokens
/// form a chain: a child token observes its parent's cancellation as well as
/// its own.
///
/// # Examples
///
/// ```rust
/// use filament_di::CancellationToken;
///
/// let parent = CancellationToken::new();
/// let child = parent.child_token();
///
/// parent.cancel();
/// assert!(child.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

struct TokenInner {
    cancelled: AtomicBool,
    parent: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Creates a new token that never cancels on its own.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                parent: None,
                deadline: None,
            }),
        }
    }

    /// Creates a token that reports cancellation once `timeout` has elapsed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use filament_di::CancellationToken;
    /// use std::time::Duration;
    ///
    /// let token = CancellationToken::with_deadline(Duration::from_secs(30));
    /// assert!(!token.is_cancelled());
    /// ```
    pub fn with_deadline(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                parent: None,
                deadline: Instant::now().checked_add(timeout),
            }),
        }
    }

    /// Creates a child token that is cancelled when either it or this token
    /// is cancelled.
    pub fn child_token(&self) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                parent: Some(self.clone()),
                deadline: None,
            }),
        }
    }

    /// Signals that associated cleanup work should stop.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// True once cancellation was requested, the deadline passed, or any
    /// ancestor token was cancelled.
    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::Acquire) {
            return true;
        }
        if let Some(deadline) = self.inner.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        match &self.inner.parent {
            Some(parent) => parent.is_cancelled(),
            None => false,
        }
    }

    /// Returns an error if the token is cancelled, for use with `?` inside
    /// closer implementations.
    pub fn error_if_cancelled(&self) -> Result<(), CancelledError> {
        if self.is_cancelled() {
            Err(CancelledError)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Error produced by [`CancellationToken::error_if_cancelled`].
#[derive(Debug, Clone)]
pub struct CancelledError;

impl std::fmt::Display for CancelledError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("operation was cancelled")
    }
}

impl std::error::Error for CancelledError {}
