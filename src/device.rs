//! The playback device abstraction, along with the one-shot
//! [`Completion`] which devices use to report the end of a track.
//!
//! A device is attached to exactly one session, and is only ever driven from
//! within the controller's server task. Completions however may be finished
//! from anywhere, including a device driver's own thread.

use tokio::sync::mpsc::UnboundedSender;

use crate::{PlayableItem, SessionId};

#[cfg(feature = "sink")]
pub mod sink;

/// Errors which can be reported by a device, either immediately or later on
/// through a [`Completion`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("unable to connect: {0}")]
    Connect(String),

    #[error("unable to start playback: {0}")]
    Start(String),

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("the device dropped its completion without reporting")]
    Abandoned,
}

/// Stamps a single playback attempt.
///
/// Tickets are handed out in increasing order and never reused, which is
/// what lets the server recognize a completion that no longer matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub(crate) u64);

/// Sent to the server whenever a [`Completion`] is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    /// The session which the attempt belonged to.
    pub session: SessionId,

    /// Which attempt this is about.
    pub ticket: Ticket,

    /// Set if playback ended because of an error.
    pub error: Option<DeviceError>,
}

/// The completion callback for one call to [`Device::start`].
///
/// It can only be finished once, since [`Completion::finish`] consumes it.
/// If a device drops it without finishing, the server is told anyway
/// with [`DeviceError::Abandoned`].
#[derive(Debug)]
pub struct Completion {
    /// The session this completion is bound to.
    session: SessionId,

    /// The attempt this completion is bound to.
    ticket: Ticket,

    /// Taken on the first (and only) send.
    tx: Option<UnboundedSender<Finished>>,
}

impl Completion {
    /// Binds a completion to one attempt, reporting back on `tx`.
    pub(crate) const fn new(
        session: SessionId,
        ticket: Ticket,
        tx: UnboundedSender<Finished>,
    ) -> Self {
        Self {
            session,
            ticket,
            tx: Some(tx),
        }
    }

    /// The session the completion reports to.
    pub const fn session(&self) -> SessionId {
        self.session
    }

    /// Reports that playback has ended, optionally because of `error`.
    ///
    /// This never blocks, so it's fine to call from a driver thread.
    pub fn finish(mut self, error: Option<DeviceError>) {
        self.send(error);
    }

    /// Actually sends the [`Finished`] notice, if that hasn't happened yet.
    fn send(&mut self, error: Option<DeviceError>) {
        if let Some(tx) = self.tx.take() {
            // The server being gone means there's nobody left to advance.
            let _ = tx.send(Finished {
                session: self.session,
                ticket: self.ticket,
                error,
            });
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.send(Some(DeviceError::Abandoned));
    }
}

/// A playback device attached to one session.
///
/// Every call is fire-and-forget: the outcome of a track always
/// arrives later, through the [`Completion`] passed to [`Device::start`].
pub trait Device<H>: Send {
    /// Starts playing `item` at `volume`, replacing anything already playing.
    ///
    /// `done` must be finished exactly once, when the track ends for any reason,
    /// including [`Device::stop`] and [`Device::disconnect`].
    fn start(
        &mut self,
        item: &PlayableItem<H>,
        volume: f32,
        done: Completion,
    ) -> Result<(), DeviceError>;

    fn pause(&mut self);
    fn resume(&mut self);

    /// Stops the current track, which finishes its completion without an error.
    fn stop(&mut self);

    /// Whether a track is started and not paused.
    ///
    /// This must turn false as soon as [`Device::stop`] returns, even if the
    /// completion is only finished later.
    fn is_playing(&self) -> bool;

    /// Whether a track is started, but paused.
    fn is_paused(&self) -> bool;

    /// Applies a new volume to whatever is currently playing.
    ///
    /// Devices which can't change volume live can leave this as is.
    fn set_volume(&mut self, volume: f32) {
        let _ = volume;
    }

    /// Detaches from the session. This has to tolerate already being disconnected.
    fn disconnect(&mut self);
}

/// Attaches devices to sessions, for example by joining a voice channel.
pub trait Connector<H>: Send {
    /// Makes a new device for `session`.
    fn connect(&mut self, session: SessionId) -> Result<Box<dyn Device<H>>, DeviceError>;
}
