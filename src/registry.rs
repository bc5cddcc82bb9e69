//! Keeps track of which sessions exist, and what they own.

use std::collections::{hash_map::Entry, HashMap};

use crate::{
    device::{Device, DeviceError, Ticket},
    SessionId, SessionQueue, Volume,
};

/// Everything that belongs to one live session.
pub struct Session<H> {
    /// The session's queue.
    pub queue: SessionQueue<H>,

    /// The attached device.
    pub device: Box<dyn Device<H>>,

    /// The playback attempt currently in flight, if any.
    ///
    /// Completions for any other ticket are ignored.
    pub ticket: Option<Ticket>,
}

impl<H> Session<H> {
    pub fn new(device: Box<dyn Device<H>>, volume: Volume) -> Self {
        Self {
            queue: SessionQueue::new(volume),
            device,
            ticket: None,
        }
    }
}

/// Maps session ids to their [`Session`].
///
/// Entries are created when a device is first attached, and removed exactly
/// once by [`Registry::remove`]. The registry is owned by the server task,
/// so inserts and removals are never observed halfway through.
pub struct Registry<H> {
    /// The sessions themselves.
    sessions: HashMap<SessionId, Session<H>>,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }
}

impl<H> Registry<H> {
    pub fn get(&self, id: SessionId) -> Option<&Session<H>> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session<H>> {
        self.sessions.get_mut(&id)
    }

    /// Returns the session for `id`, creating it with a freshly connected device if needed.
    ///
    /// `connect` is only called when the session doesn't exist yet, and if it
    /// fails, nothing gets inserted.
    pub fn get_or_connect(
        &mut self,
        id: SessionId,
        volume: Volume,
        connect: impl FnOnce() -> Result<Box<dyn Device<H>>, DeviceError>,
    ) -> Result<&mut Session<H>, DeviceError> {
        match self.sessions.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(Session::new(connect()?, volume))),
        }
    }

    /// Takes the session out of the registry. Unknown ids are fine.
    pub fn remove(&mut self, id: SessionId) -> Option<Session<H>> {
        self.sessions.remove(&id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Every session id, in no particular order.
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }
}
