//! Contains [`SessionQueue`], the per-session list of tracks.

use std::collections::VecDeque;

use crate::{PlayableItem, Volume};

/// Holds everything waiting to be played in one session, as well as the track
/// which is currently attached to the device.
///
/// This does no I/O and no locking, the server owns it outright.
#[derive(Debug)]
pub struct SessionQueue<H> {
    /// Tracks waiting to be played, in play order.
    pending: VecDeque<PlayableItem<H>>,

    /// The track the device is playing (or has paused).
    /// This is [`None`] when nothing is active.
    current: Option<PlayableItem<H>>,

    /// Whether [`SessionQueue::advance`] should repeat `current`.
    looping: bool,

    /// Applied to the device whenever a new track starts.
    pub volume: Volume,
}

impl<H> Default for SessionQueue<H> {
    fn default() -> Self {
        Self::new(Volume::default())
    }
}

impl<H> SessionQueue<H> {
    pub const fn new(volume: Volume) -> Self {
        Self {
            pending: VecDeque::new(),
            current: None,
            looping: false,
            volume,
        }
    }

    /// Appends `item` to the end of the queue, returning its 1-based position.
    pub fn add(&mut self, item: PlayableItem<H>) -> usize {
        self.pending.push_back(item);
        self.pending.len()
    }

    /// Moves on to the next track and returns it.
    ///
    /// With looping on, the current track is kept and `pending` isn't touched.
    /// Otherwise the head of `pending` becomes current, and [`None`] means the
    /// queue has run dry, leaving the whole queue empty.
    pub fn advance(&mut self) -> Option<&PlayableItem<H>> {
        if !(self.looping && self.current.is_some()) {
            self.current = self.pending.pop_front();
        }

        self.current.as_ref()
    }

    /// Drops the current track, so that the next advance can't repeat it.
    pub const fn discard(&mut self) -> Option<PlayableItem<H>> {
        self.current.take()
    }

    /// Empties `pending`. The current track and loop flag stay as they are.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Whether there's nothing current and nothing pending.
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    /// The amount of pending tracks, not counting the current one.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub const fn current(&self) -> Option<&PlayableItem<H>> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> impl Iterator<Item = &PlayableItem<H>> {
        self.pending.iter()
    }

    pub const fn looping(&self) -> bool {
        self.looping
    }

    /// Flips loop mode and returns the new value.
    ///
    /// This only affects the next [`SessionQueue::advance`].
    pub const fn toggle_loop(&mut self) -> bool {
        self.looping = !self.looping;
        self.looping
    }
}
