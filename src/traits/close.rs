//! Optional cleanup capabilities for resolved instances.

use crate::cancellation::CancellationToken;
use crate::error::BoxError;

/// Optional capability an instance may support to release resources when
/// its lifetime ends.
///
/// The owning scope invokes `close` at most once per instance, during scope
/// teardown, in reverse construction order. Instances that do not carry the
/// capability are skipped silently. A returned error is collected into the
/// scope's [`CloseError`](crate::CloseError) aggregate; it never prevents
/// the remaining instances from being closed.
///
/// The token is the caller's cancellation/deadline signal. Honoring it is
/// the closer's responsibility; a closer that performs no blocking work can
/// ignore it.
///
/// # Examples
///
/// ```rust
/// use filament_di::{BoxError, CancellationToken, Closer};
///
/// struct Connection {
///     id: u32,
/// }
///
/// impl Closer for Connection {
///     fn close(&self, token: &CancellationToken) -> Result<(), BoxError> {
///         token.error_if_cancelled()?;
///         println!("releasing connection {}", self.id);
///         Ok(())
///     }
/// }
/// ```
pub trait Closer: Send + Sync + 'static {
    /// Releases the instance's resources.
    fn close(&self, token: &CancellationToken) -> Result<(), BoxError>;
}

/// Async variant of [`Closer`] for instances whose teardown must await I/O
/// (graceful connection shutdown, buffer flushes, and the like).
///
/// Async closers run before sync closers during
/// [`Scope::close_async`](crate::Scope::close_async), both in reverse
/// construction order. The synchronous [`Scope::close`](crate::Scope::close)
/// cannot drive them and skips them.
///
/// # Examples
///
/// ```rust
/// use filament_di::{AsyncCloser, BoxError, CancellationToken};
/// use async_trait::async_trait;
///
/// struct Client {
///     endpoint: String,
/// }
///
/// #[async_trait]
/// impl AsyncCloser for Client {
///     async fn close(&self, _token: &CancellationToken) -> Result<(), BoxError> {
///         // flush pending requests, then drop the connection
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait AsyncCloser: Send + Sync + 'static {
    /// Releases the instance's resources asynchronously.
    async fn close(&self, token: &CancellationToken) -> Result<(), BoxError>;
}
