//! Internal implementation details.

pub(crate) mod close_bag;

pub(crate) use close_bag::{CloseBag, TrackedInstance};
