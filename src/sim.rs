//! Simulated collaborators, which "play" tracks by just waiting.
//!
//! These are what the `jukebox` binary runs on, and are also handy for
//! trying out the scheduler without any real audio.

use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        mpsc::{self, RecvTimeoutError},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use tracing::debug;

use crate::{
    device::{self, Completion, DeviceError},
    resolver::{self, ResolveError},
    PlayableItem, SessionId,
};

/// Resolves any query into a track of roughly `length`.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    /// The average track length.
    pub length: Duration,
}

impl Resolver {
    /// Picks a length up to half again shorter or longer than [`Resolver::length`].
    fn length(&self) -> Duration {
        let base = u64::try_from(self.length.as_millis()).unwrap_or(u64::MAX);
        let spread = base / 2;

        Duration::from_millis(fastrand::u64(base - spread..=base.saturating_add(spread)))
    }
}

impl resolver::Resolver for Resolver {
    type Handle = Duration;

    async fn resolve(&self, query: &str) -> Result<PlayableItem<Duration>, ResolveError> {
        let title = query.trim();
        if title.is_empty() {
            return Err(ResolveError::Empty);
        }

        Ok(PlayableItem::new(title, query, self.length()))
    }
}

/// Hands out a new [`Device`] for every session.
#[derive(Debug, Default, Clone, Copy)]
pub struct Connector;

impl device::Connector<Duration> for Connector {
    fn connect(
        &mut self,
        session: SessionId,
    ) -> Result<Box<dyn device::Device<Duration>>, DeviceError> {
        Ok(Box::new(Device {
            session,
            playback: None,
        }))
    }
}

/// Playback state, shared between a [`Playback`] and its thread as a [`u8`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// The track ended, one way or another.
    Stopped = 0,

    /// Counting down.
    Playing = 1,

    /// Waiting to be resumed.
    Paused = 2,
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Playing,
            2 => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

/// Sent from the device to a playback thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    /// Stop counting down.
    Pause,

    /// Carry on counting down.
    Resume,

    /// End the track early.
    Stop,
}

/// One running track.
struct Playback {
    /// Controls the playback thread.
    control: mpsc::Sender<Control>,

    /// Written by the playback thread, see [`Status`].
    state: Arc<AtomicU8>,
}

impl Playback {
    /// Spawns a thread which waits out `length`, then finishes `done`.
    fn spawn(length: Duration, done: Completion) -> std::io::Result<Self> {
        let (control, rx) = mpsc::channel();
        let state = Arc::new(AtomicU8::new(Status::Playing as u8));

        thread::Builder::new()
            .name(format!("sim-{}", done.session()))
            .spawn({
                let state = Arc::clone(&state);
                move || Self::run(length, &rx, &state, done)
            })?;

        Ok(Self { control, state })
    }

    /// The body of the playback thread.
    fn run(length: Duration, rx: &mpsc::Receiver<Control>, state: &AtomicU8, done: Completion) {
        let mut remaining = length;

        loop {
            let started = Instant::now();
            let paused = Status::from(state.load(Ordering::Relaxed)) == Status::Paused;
            let received = if paused {
                rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
            } else {
                rx.recv_timeout(remaining)
            };

            if !paused {
                remaining = remaining.saturating_sub(started.elapsed());
            }

            match received {
                Ok(Control::Pause) => state.store(Status::Paused as u8, Ordering::Relaxed),
                Ok(Control::Resume) => state.store(Status::Playing as u8, Ordering::Relaxed),
                Ok(Control::Stop) | Err(_) => break,
            }
        }

        state.store(Status::Stopped as u8, Ordering::Relaxed);
        done.finish(None);
    }

    /// What the playback thread last said it was doing.
    fn status(&self) -> Status {
        Status::from(self.state.load(Ordering::Relaxed))
    }

    /// Tells the playback thread to do something.
    fn send(&self, control: Control) {
        // The thread being gone means the track already ended.
        let _ = self.control.send(control);
    }
}

/// A device which plays a track by sleeping for its length.
pub struct Device {
    /// Only used for logging.
    session: SessionId,

    /// The current track, if there is one.
    playback: Option<Playback>,
}

impl device::Device<Duration> for Device {
    fn start(
        &mut self,
        item: &PlayableItem<Duration>,
        volume: f32,
        done: Completion,
    ) -> Result<(), DeviceError> {
        self.stop();

        if item.handle.is_zero() {
            return Err(DeviceError::Start(format!("{} has no audio", item.title)));
        }

        debug!(session = %self.session, title = %item.title, length = ?item.handle, volume, "sim start");
        let playback =
            Playback::spawn(item.handle, done).map_err(|e| DeviceError::Start(e.to_string()))?;
        self.playback = Some(playback);

        Ok(())
    }

    fn pause(&mut self) {
        if let Some(playback) = &self.playback {
            playback.send(Control::Pause);
            let _ = playback.state.compare_exchange(
                Status::Playing as u8,
                Status::Paused as u8,
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
        }
    }

    fn resume(&mut self) {
        if let Some(playback) = &self.playback {
            playback.send(Control::Resume);
            let _ = playback.state.compare_exchange(
                Status::Paused as u8,
                Status::Playing as u8,
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
        }
    }

    fn stop(&mut self) {
        if let Some(playback) = self.playback.take() {
            playback.send(Control::Stop);
        }
    }

    fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|x| x.status() == Status::Playing)
    }

    fn is_paused(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|x| x.status() == Status::Paused)
    }

    fn set_volume(&mut self, volume: f32) {
        debug!(session = %self.session, volume, "sim volume");
    }

    fn disconnect(&mut self) {
        self.stop();
    }
}
