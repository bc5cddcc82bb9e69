use tokio::sync::oneshot;

use crate::{device::DeviceError, PlayableItem, SessionId, Volume};

/// Where the server sends the outcome of a command.
pub type Reply<T> = oneshot::Sender<crate::Result<T>>;

/// Handles communication between the [`crate::Controller`] and the server.
pub enum Message<H> {
    /// Attaches a device to the session, creating it if needed.
    Join {
        session: SessionId,
        reply: Reply<()>,
    },

    /// Adds an already resolved track to the end of the queue.
    Enqueue {
        session: SessionId,
        item: PlayableItem<H>,
        reply: Reply<Enqueued>,
    },

    /// Pauses the device.
    Pause {
        session: SessionId,
        reply: Reply<()>,
    },

    /// Unpauses the device.
    Resume {
        session: SessionId,
        reply: Reply<()>,
    },

    /// Stops the current track, which moves the queue along.
    Skip {
        session: SessionId,
        reply: Reply<()>,
    },

    /// Disconnects and forgets the session.
    Leave {
        session: SessionId,
        reply: Reply<()>,
    },

    /// Empties the pending tracks.
    Clear {
        session: SessionId,
        reply: Reply<()>,
    },

    /// Change the volume of playback.
    Volume {
        session: SessionId,
        volume: Volume,
        reply: Reply<()>,
    },

    /// Flips loop mode.
    Loop {
        session: SessionId,
        reply: Reply<bool>,
    },

    /// Asks for the current track's title.
    NowPlaying {
        session: SessionId,
        reply: Reply<String>,
    },

    /// Asks for a [`Snapshot`] of the queue.
    Peek {
        session: SessionId,
        reply: oneshot::Sender<Snapshot>,
    },

    /// Disconnects every session and stops the server.
    Quit,
}

impl<H> Message<H> {
    /// A short name for the message, used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Enqueue { .. } => "enqueue",
            Self::Pause { .. } => "pause",
            Self::Resume { .. } => "resume",
            Self::Skip { .. } => "skip",
            Self::Leave { .. } => "leave",
            Self::Clear { .. } => "clear",
            Self::Volume { .. } => "volume",
            Self::Loop { .. } => "loop",
            Self::NowPlaying { .. } => "now playing",
            Self::Peek { .. } => "peek",
            Self::Quit => "quit",
        }
    }
}

/// What happened to a track handed to [`crate::Controller::enqueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enqueued {
    /// The session was idle, so the track started right away.
    NowPlaying(String),

    /// Something is already playing, so the track is waiting at `position`.
    Queued { title: String, position: usize },
}

/// A read-only view of a session's queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub current: Option<String>,
    pub pending: Vec<String>,
    pub looping: bool,
    pub volume: Volume,
}

/// Notifications for the command surface, which aren't a reply to anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A track has started on the device.
    NowPlaying { session: SessionId, title: String },

    /// A track was added behind the current one.
    Queued {
        session: SessionId,
        title: String,
        position: usize,
    },

    /// A track failed to start or failed midway. The queue moves on regardless.
    PlaybackFailed {
        session: SessionId,
        title: Option<String>,
        error: DeviceError,
    },

    /// The session was torn down, either by leaving or by running out of tracks.
    Closed { session: SessionId },
}
