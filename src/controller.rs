//! The public face of the scheduler.
//!
//! A [`Controller`] is a cheap, cloneable handle. Every command is turned into
//! a [`Message`] and answered by the server task, which is the only place
//! any session state is touched.

use std::sync::Arc;

use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    device::Connector,
    error::Error,
    message::{Enqueued, Event, Message, Reply, Snapshot},
    resolver::Resolver,
    PlayableItem, SessionId, Volume,
};

mod server;
use server::Server;

/// Settings applied when the server starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// The volume new sessions start out with.
    pub volume: Volume,

    /// How many [`Event`]s a slow subscriber may lag behind before missing some.
    pub events: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            volume: Volume::default(),
            events: 16,
        }
    }
}

/// Sends commands to the playback server.
pub struct Controller<R: Resolver> {
    /// The server's mailbox.
    tx: mpsc::UnboundedSender<Message<R::Handle>>,

    /// Kept around so that new subscribers can be made.
    events: broadcast::Sender<Event>,

    /// Used by [`Controller::play`].
    resolver: Arc<R>,
}

impl<R: Resolver> Clone for Controller<R> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            events: self.events.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R: Resolver> Controller<R> {
    /// Starts the server in the background, and returns a handle to it.
    ///
    /// The server keeps running until [`Controller::shutdown`] is called,
    /// or every handle has been dropped.
    pub fn spawn<C>(config: Config, resolver: R, connector: C) -> (Self, JoinHandle<()>)
    where
        C: Connector<R::Handle> + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(config.events.max(1));

        let server = Server::new(config, rx, Box::new(connector), events.clone());
        let task = tokio::spawn(server.run());

        let controller = Self {
            tx,
            events,
            resolver: Arc::new(resolver),
        };

        (controller, task)
    }

    /// Sends a message built around a fresh reply channel, and waits for the answer.
    async fn request<T>(
        &self,
        message: impl FnOnce(Reply<T>) -> Message<R::Handle>,
    ) -> crate::Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(message(reply)).map_err(|_| Error::Closed)?;

        rx.await.map_err(|_| Error::Closed)?
    }

    /// Resolves `query` and queues the result.
    ///
    /// If resolution fails, the session isn't touched (or created) at all.
    pub async fn play(&self, session: SessionId, query: &str) -> crate::Result<Enqueued> {
        let item = self.resolver.resolve(query).await?;
        self.enqueue(session, item).await
    }

    /// Queues an already resolved track, starting it right away if the session is idle.
    pub async fn enqueue(
        &self,
        session: SessionId,
        item: PlayableItem<R::Handle>,
    ) -> crate::Result<Enqueued> {
        self.request(|reply| Message::Enqueue {
            session,
            item,
            reply,
        })
        .await
    }

    /// Attaches a device to the session without queueing anything.
    pub async fn join(&self, session: SessionId) -> crate::Result<()> {
        self.request(|reply| Message::Join { session, reply }).await
    }

    /// Pauses the current track.
    pub async fn pause(&self, session: SessionId) -> crate::Result<()> {
        self.request(|reply| Message::Pause { session, reply }).await
    }

    /// Resumes a paused track.
    pub async fn resume(&self, session: SessionId) -> crate::Result<()> {
        self.request(|reply| Message::Resume { session, reply }).await
    }

    /// Stops the current track. The queue then advances like it would at the end of a track.
    pub async fn skip(&self, session: SessionId) -> crate::Result<()> {
        self.request(|reply| Message::Skip { session, reply }).await
    }

    /// Disconnects the device and forgets about the session.
    pub async fn leave(&self, session: SessionId) -> crate::Result<()> {
        self.request(|reply| Message::Leave { session, reply }).await
    }

    /// Removes every pending track, leaving the current one playing.
    pub async fn clear(&self, session: SessionId) -> crate::Result<()> {
        self.request(|reply| Message::Clear { session, reply }).await
    }

    /// Sets the volume from a percentage, which has to be within `0..=100`.
    pub async fn set_volume(&self, session: SessionId, percent: i64) -> crate::Result<Volume> {
        let volume = Volume::from_percent(percent)?;
        self.request(|reply| Message::Volume {
            session,
            volume,
            reply,
        })
        .await?;

        Ok(volume)
    }

    /// Flips loop mode, returning whether it's now enabled.
    ///
    /// Like [`Controller::join`], this connects the session if it doesn't exist yet,
    /// so loop mode can be set up before anything is played.
    pub async fn toggle_loop(&self, session: SessionId) -> crate::Result<bool> {
        self.request(|reply| Message::Loop { session, reply }).await
    }

    /// Gets the title of the current track.
    pub async fn now_playing(&self, session: SessionId) -> crate::Result<String> {
        self.request(|reply| Message::NowPlaying { session, reply })
            .await
    }

    /// Takes a [`Snapshot`] of the session's queue.
    pub async fn peek(&self, session: SessionId) -> crate::Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Peek { session, reply })
            .map_err(|_| Error::Closed)?;

        rx.await.map_err(|_| Error::Closed)
    }

    /// Listens for [`Event`]s from every session.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Tells the server to disconnect everything and stop.
    pub fn shutdown(&self) -> crate::Result<()> {
        self.tx.send(Message::Quit).map_err(|_| Error::Closed)
    }
}
