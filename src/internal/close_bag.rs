//! Tracked-instance bag with LIFO close semantics.

use std::sync::Arc;

use crate::cancellation::CancellationToken;
use crate::error::CloseFailure;
use crate::traits::{AsyncCloser, Closer};

/// One tracked instance: the type it was resolved as plus whatever cleanup
/// capability it carries. The value itself is not retained; holding the
/// closer handle keeps the instance alive exactly as long as cleanup needs
/// it.
pub(crate) struct TrackedInstance {
    pub(crate) type_name: &'static str,
    pub(crate) closer: Option<Arc<dyn Closer>>,
    pub(crate) async_closer: Option<Arc<dyn AsyncCloser>>,
}

impl TrackedInstance {
    pub(crate) fn has_closer(&self) -> bool {
        self.closer.is_some() || self.async_closer.is_some()
    }
}

/// Ordered collection of tracked instances, closed in reverse construction
/// order so later-constructed instances (which may depend on earlier ones)
/// go first.
#[derive(Default)]
pub(crate) struct CloseBag {
    tracked: Vec<TrackedInstance>,
}

impl CloseBag {
    pub(crate) fn push(&mut self, instance: TrackedInstance) {
        self.tracked.push(instance);
    }

    /// Runs every sync closer in LIFO order, forwarding the token to each.
    /// Failures are collected, never short-circuited; entries are consumed
    /// so no closer can run twice.
    pub(crate) fn close_sync_reverse(
        &mut self,
        token: &CancellationToken,
    ) -> Vec<CloseFailure> {
        let mut failures = Vec::new();
        while let Some(instance) = self.tracked.pop() {
            if let Some(closer) = instance.closer {
                if let Err(source) = closer.close(token) {
                    failures.push(CloseFailure {
                        type_name: instance.type_name,
                        source,
                    });
                }
            }
        }
        failures
    }

    /// Runs async closers first, then sync closers, both in LIFO order.
    pub(crate) async fn close_async_reverse(
        &mut self,
        token: &CancellationToken,
    ) -> Vec<CloseFailure> {
        let mut failures = Vec::new();
        let mut sync_only = Vec::new();
        while let Some(instance) = self.tracked.pop() {
            if let Some(closer) = &instance.async_closer {
                if let Err(source) = closer.close(token).await {
                    failures.push(CloseFailure {
                        type_name: instance.type_name,
                        source,
                    });
                }
            } else {
                sync_only.push(instance);
            }
        }
        for instance in sync_only {
            if let Some(closer) = instance.closer {
                if let Err(source) = closer.close(token) {
                    failures.push(CloseFailure {
                        type_name: instance.type_name,
                        source,
                    });
                }
            }
        }
        failures
    }

    /// True when any tracked instance still carries an unclosed capability.
    pub(crate) fn has_pending_closers(&self) -> bool {
        self.tracked.iter().any(TrackedInstance::has_closer)
    }
}
