//! Core capability traits of the resolution contract.

mod close;
mod resolver;

pub use close::{AsyncCloser, Closer};
pub use resolver::{resolve, AnyArc, Resolver, ResolverExt};
