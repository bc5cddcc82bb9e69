//! The server task, which owns every session and drives playback.
//!
//! Commands and completions are handled one at a time, so a session can
//! never be mutated by two things at once. Nothing in here ever awaits
//! anything other than the next input.

use std::ops::ControlFlow;

use tokio::{
    select,
    sync::{
        broadcast,
        mpsc::{self, UnboundedReceiver, UnboundedSender},
    },
};
use tracing::{debug, info, warn};

use crate::{
    device::{Completion, Connector, DeviceError, Finished, Ticket},
    error::{Error, StateError},
    message::{Enqueued, Event, Message, Snapshot},
    registry::{Registry, Session},
    PlayableItem, SessionId, Volume,
};

use super::Config;

/// The two kinds of input the server reacts to.
enum Input<H> {
    /// A device finished a track.
    Finished(Finished),

    /// A command from a [`crate::Controller`].
    Message(Message<H>),
}

/// Owns the [`Registry`], and is the only thing which ever touches it.
pub(super) struct Server<H> {
    /// Commands from the controllers.
    rx: UnboundedReceiver<Message<H>>,

    /// Completions from the devices.
    finished: UnboundedReceiver<Finished>,

    /// Cloned into every [`Completion`].
    done: UnboundedSender<Finished>,

    /// Every live session.
    registry: Registry<H>,

    /// Attaches devices to new sessions.
    connector: Box<dyn Connector<H>>,

    /// Where [`Event`]s are broadcast.
    events: broadcast::Sender<Event>,

    /// The volume new sessions start with.
    volume: Volume,

    /// The last [`Ticket`] handed out.
    tickets: u64,
}

impl<H: Send + 'static> Server<H> {
    /// Makes a server which listens on `rx`, with no sessions yet.
    pub fn new(
        config: Config,
        rx: UnboundedReceiver<Message<H>>,
        connector: Box<dyn Connector<H>>,
        events: broadcast::Sender<Event>,
    ) -> Self {
        let (done, finished) = mpsc::unbounded_channel();

        Self {
            rx,
            finished,
            done,
            registry: Registry::default(),
            connector,
            events,
            volume: config.volume,
            tickets: 0,
        }
    }

    /// Handles inputs until told to quit, then disconnects every session.
    pub async fn run(mut self) {
        loop {
            // Completions go first, so that a stop caused by one command is
            // fully handled before the next command is looked at.
            let input = select! {
                biased;

                Some(finished) = self.finished.recv() => Input::Finished(finished),
                message = self.rx.recv() => match message {
                    Some(message) => Input::Message(message),
                    None => break,
                },
            };

            let flow = match input {
                Input::Finished(finished) => {
                    self.finished(finished);
                    ControlFlow::Continue(())
                }
                Input::Message(message) => self.handle(message),
            };

            if flow.is_break() {
                break;
            }
        }

        for session in self.registry.ids() {
            self.cleanup(session);
        }

        debug!("server stopped");
    }

    /// Dispatches a single command, and sends back its reply.
    ///
    /// A reply failing to send just means the caller stopped waiting.
    fn handle(&mut self, message: Message<H>) -> ControlFlow<()> {
        debug!(message = message.name(), "handling message");

        match message {
            Message::Join { session, reply } => {
                let _ = reply.send(self.join(session));
            }
            Message::Enqueue {
                session,
                item,
                reply,
            } => {
                let _ = reply.send(self.enqueue(session, item));
            }
            Message::Pause { session, reply } => {
                let _ = reply.send(self.pause(session));
            }
            Message::Resume { session, reply } => {
                let _ = reply.send(self.resume(session));
            }
            Message::Skip { session, reply } => {
                let _ = reply.send(self.skip(session));
            }
            Message::Leave { session, reply } => {
                let _ = reply.send(self.leave(session));
            }
            Message::Clear { session, reply } => {
                if let Some(session) = self.registry.get_mut(session) {
                    session.queue.clear();
                }

                let _ = reply.send(Ok(()));
            }
            Message::Volume {
                session,
                volume,
                reply,
            } => {
                let _ = reply.send(self.set_volume(session, volume));
            }
            Message::Loop { session, reply } => {
                let _ = reply.send(self.toggle_loop(session));
            }
            Message::NowPlaying { session, reply } => {
                let _ = reply.send(self.now_playing(session));
            }
            Message::Peek { session, reply } => {
                let _ = reply.send(self.peek(session));
            }
            Message::Quit => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    /// Broadcasts an [`Event`]. Having no subscribers is fine.
    fn emit(&self, event: Event) {
        let _ = self.events.send(event);
    }

    /// Gets the session, connecting a device to a brand new one if needed.
    fn connect(&mut self, id: SessionId) -> Result<&mut Session<H>, DeviceError> {
        let connector = &mut self.connector;
        self.registry.get_or_connect(id, self.volume, || {
            info!(session = %id, "connecting");
            connector.connect(id)
        })
    }

    /// Makes sure the session exists, without queueing anything.
    fn join(&mut self, id: SessionId) -> crate::Result<()> {
        self.connect(id)?;
        Ok(())
    }

    /// Queues `item`, and starts it straight away if nothing is current.
    fn enqueue(&mut self, id: SessionId, item: PlayableItem<H>) -> crate::Result<Enqueued> {
        let session = self.connect(id)?;

        if session.queue.current().is_some() {
            let title = item.title.clone();
            let position = session.queue.add(item);

            debug!(session = %id, %title, position, "queued");
            self.emit(Event::Queued {
                session: id,
                title: title.clone(),
                position,
            });

            return Ok(Enqueued::Queued { title, position });
        }

        session.queue.add(item);
        match self.advance(id) {
            Ok(Some(title)) => Ok(Enqueued::NowPlaying(title)),
            Ok(None) => {
                unreachable!("session {id} had a track queued, but nothing started or failed")
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Moves the session on to its next track and starts it.
    ///
    /// Tracks which fail to start are dropped, and the next one is tried.
    /// Once the queue is exhausted the session is cleaned up, and if that
    /// happened because of a failure, the last failure is returned.
    fn advance(&mut self, id: SessionId) -> Result<Option<String>, DeviceError> {
        let mut failure = None;

        loop {
            let Some(session) = self.registry.get_mut(id) else {
                return Ok(None);
            };

            let volume = session.queue.volume.float();
            let Some(item) = session.queue.advance() else {
                break;
            };

            self.tickets += 1;
            let ticket = Ticket(self.tickets);
            let done = Completion::new(id, ticket, self.done.clone());
            let title = item.title.clone();

            match session.device.start(item, volume, done) {
                Ok(()) => {
                    session.ticket = Some(ticket);

                    info!(session = %id, %title, "now playing");
                    self.emit(Event::NowPlaying { session: id, title: title.clone() });

                    return Ok(Some(title));
                }
                Err(error) => {
                    // Never retried, even when looping.
                    session.ticket = None;
                    session.queue.discard();

                    warn!(session = %id, %title, %error, "couldn't start track");
                    self.emit(Event::PlaybackFailed {
                        session: id,
                        title: Some(title),
                        error: error.clone(),
                    });

                    failure = Some(error);
                }
            }
        }

        self.cleanup(id);
        failure.map_or(Ok(None), Err)
    }

    /// Reacts to a device finishing a track, by advancing the queue.
    fn finished(&mut self, finished: Finished) {
        let Finished {
            session: id,
            ticket,
            error,
        } = finished;

        let Some(session) = self.registry.get_mut(id) else {
            debug!(session = %id, "completion for a closed session");
            return;
        };

        if session.ticket != Some(ticket) {
            debug!(session = %id, ?ticket, "stale completion");
            return;
        }

        session.ticket = None;
        if let Some(error) = error {
            // Dropped so that looping can't repeat a broken track.
            let title = session.queue.discard().map(|x| x.title);

            warn!(session = %id, ?title, %error, "playback failed");
            self.emit(Event::PlaybackFailed {
                session: id,
                title,
                error,
            });
        }

        if let Err(error) = self.advance(id) {
            debug!(session = %id, %error, "queue ended on a failure");
        }
    }

    /// Disconnects the session's device and removes it from the registry.
    ///
    /// Calling this for a session which doesn't exist does nothing.
    fn cleanup(&mut self, id: SessionId) {
        let Some(mut session) = self.registry.remove(id) else {
            return;
        };

        session.device.disconnect();

        info!(session = %id, "session closed");
        self.emit(Event::Closed { session: id });
    }

    /// Pauses the device, as long as it's actually playing.
    fn pause(&mut self, id: SessionId) -> crate::Result<()> {
        let session = self.registry.get_mut(id).ok_or(StateError::NotPlaying)?;

        if session.device.is_paused() {
            return Err(StateError::AlreadyPaused.into());
        }

        if !session.device.is_playing() {
            return Err(StateError::NotPlaying.into());
        }

        session.device.pause();
        Ok(())
    }

    /// Resumes a paused device.
    fn resume(&mut self, id: SessionId) -> crate::Result<()> {
        let session = self.registry.get_mut(id).ok_or(StateError::NotConnected)?;

        if !session.device.is_paused() {
            return Err(StateError::NotPaused.into());
        }

        session.device.resume();
        Ok(())
    }

    /// Stops the current track.
    ///
    /// A device which was already stopped, but hasn't reported back yet,
    /// counts as not playing, since stopping it again wouldn't do anything.
    fn skip(&mut self, id: SessionId) -> crate::Result<()> {
        let session = self
            .registry
            .get_mut(id)
            .filter(|x| x.queue.current().is_some())
            .filter(|x| x.device.is_playing() || x.device.is_paused())
            .ok_or(StateError::NotPlaying)?;

        // The device finishes the completion, which is what actually advances.
        session.device.stop();
        Ok(())
    }

    /// Tears down a session which exists.
    fn leave(&mut self, id: SessionId) -> crate::Result<()> {
        if !self.registry.contains(id) {
            return Err(Error::State(StateError::NotConnected));
        }

        self.cleanup(id);
        Ok(())
    }

    /// Stores the new volume, and applies it to the current track.
    fn set_volume(&mut self, id: SessionId, volume: Volume) -> crate::Result<()> {
        let session = self
            .registry
            .get_mut(id)
            .filter(|x| x.queue.current().is_some())
            .ok_or(StateError::NothingPlaying)?;

        session.queue.volume = volume;
        session.device.set_volume(volume.float());

        debug!(session = %id, %volume, "volume changed");
        Ok(())
    }

    /// Flips loop mode, creating the session first if it doesn't exist yet.
    fn toggle_loop(&mut self, id: SessionId) -> crate::Result<bool> {
        let session = self.connect(id)?;
        let looping = session.queue.toggle_loop();

        debug!(session = %id, looping, "loop toggled");
        Ok(looping)
    }

    /// The title of the current track.
    fn now_playing(&self, id: SessionId) -> crate::Result<String> {
        self.registry
            .get(id)
            .and_then(|x| x.queue.current())
            .map(|x| x.title.clone())
            .ok_or_else(|| StateError::NotPlaying.into())
    }

    /// A copy of the session's queue, or an empty one if it doesn't exist.
    fn peek(&self, id: SessionId) -> Snapshot {
        self.registry.get(id).map_or_else(
            || Snapshot {
                volume: self.volume,
                ..Snapshot::default()
            },
            |session| Snapshot {
                current: session.queue.current().map(|x| x.title.clone()),
                pending: session.queue.pending().map(|x| x.title.clone()).collect(),
                looping: session.queue.looping(),
                volume: session.queue.volume,
            },
        )
    }
}
