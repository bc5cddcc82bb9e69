use crate::{device::DeviceError, resolver::ResolveError};

pub type Result<T> = std::result::Result<T, Error>;

/// A command was issued while the session was in the wrong state.
///
/// These are reported back to the user and never change anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("nothing is playing right now")]
    NotPlaying,

    #[error("there's nothing playing to change the volume of")]
    NothingPlaying,

    #[error("the track is already paused")]
    AlreadyPaused,

    #[error("the track is not paused")]
    NotPaused,

    #[error("not connected to this session")]
    NotConnected,

    #[error("volume must be between 0 and 100, got {0}")]
    OutOfRange(i64),
}

/// Any errors which might be returned to the command surface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("couldn't resolve track: {0}")]
    Resolve(#[from] ResolveError),

    #[error("device failure: {0}")]
    Device(#[from] DeviceError),

    #[error("the playback controller has shut down")]
    Closed,
}

impl Error {
    /// Returns the [`StateError`], if this is one.
    pub const fn state(&self) -> Option<&StateError> {
        match self {
            Self::State(error) => Some(error),
            _ => None,
        }
    }
}
