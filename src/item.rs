//! Has the types describing what gets queued, and where.

use std::fmt::{self, Debug, Display};

/// Identifies one independent playback context, like a guild.
///
/// The value is opaque to the scheduler; it only has to be stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SessionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A resolved track, which is ready to be handed to a device.
///
/// `H` is whatever the device needs to actually produce sound,
/// and is never inspected by the scheduler itself.
#[derive(PartialEq, Eq)]
pub struct PlayableItem<H> {
    /// Display name of the track.
    pub title: String,

    /// The query this item was resolved from.
    pub query: String,

    /// The opaque audio handle.
    pub handle: H,
}

impl<H> Debug for PlayableItem<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayableItem")
            .field("title", &self.title)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl<H> PlayableItem<H> {
    pub fn new(title: impl Into<String>, query: impl Into<String>, handle: H) -> Self {
        Self {
            title: title.into(),
            query: query.into(),
            handle,
        }
    }
}
