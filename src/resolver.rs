//! The seam to whatever turns a user's query into something playable.

use std::future::Future;

use crate::PlayableItem;

/// The resolver couldn't produce a playable item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("empty query")]
    Empty,

    #[error("no results for {0:?}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

/// Looks up media for a query.
///
/// Resolution happens on the caller's task, so implementations are free to be slow.
pub trait Resolver: Send + Sync + 'static {
    /// The audio handle stored in each [`PlayableItem`].
    type Handle: Send + 'static;

    fn resolve(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<PlayableItem<Self::Handle>, ResolveError>> + Send;
}
