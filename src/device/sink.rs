//! A [`Device`] which actually makes sound, by way of a [rodio] [`Sink`].
//!
//! Handles are the raw, still encoded bytes of a track.

use std::{
    io::Cursor,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, sleep},
    time::Duration,
};

use bytes::Bytes;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use crate::{
    device::{self, Completion, Device, DeviceError},
    PlayableItem, SessionId,
};

/// How often the waiter checks whether the sink has drained.
const POLL: Duration = Duration::from_millis(8);

/// Opens the default output once, and mixes every session into it.
pub struct Connector {
    /// The [`OutputStream`], which has to be kept alive for anything to play.
    stream: OutputStream,
}

/// SAFETY: This is necessary because [`OutputStream`] does not implement [`Send`],
/// SAFETY: even though it is only ever touched from the server task.
unsafe impl Send for Connector {}

impl Connector {
    pub fn new() -> Result<Self, DeviceError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| DeviceError::Connect(e.to_string()))?;
        stream.log_on_drop(false);

        Ok(Self { stream })
    }
}

impl device::Connector<Bytes> for Connector {
    fn connect(&mut self, _: SessionId) -> Result<Box<dyn Device<Bytes>>, DeviceError> {
        Ok(Box::new(SinkDevice {
            sink: Arc::new(Sink::connect_new(self.stream.mixer())),
            waiter: None,
        }))
    }
}

/// A session's own [`Sink`], plus whatever is waiting for it to drain.
pub struct SinkDevice {
    /// [rodio]'s [`Sink`] which can control playback.
    sink: Arc<Sink>,

    /// Set to cancel the current waiter.
    waiter: Option<Arc<AtomicBool>>,
}

impl SinkDevice {
    /// Waits until `sink` is empty, then finishes `done`.
    ///
    /// This runs on its own thread, since [`Sink`] offers no async way to wait.
    fn waiter(sink: &Sink, cancelled: &AtomicBool, done: Completion) {
        while !sink.empty() && !cancelled.load(Ordering::Relaxed) {
            sleep(POLL);
        }

        done.finish(None);
    }
}

impl Device<Bytes> for SinkDevice {
    fn start(
        &mut self,
        item: &PlayableItem<Bytes>,
        volume: f32,
        done: Completion,
    ) -> Result<(), DeviceError> {
        if let Some(cancelled) = self.waiter.take() {
            cancelled.store(true, Ordering::Relaxed);
        }
        self.sink.stop();

        let source = Decoder::new(Cursor::new(item.handle.clone()))
            .map_err(|e| DeviceError::Start(format!("{}: {e}", item.title)))?;

        self.sink.set_volume(volume);
        self.sink.append(source);
        self.sink.play();

        let cancelled = Arc::new(AtomicBool::new(false));
        thread::Builder::new()
            .name(format!("sink-{}", done.session()))
            .spawn({
                let sink = Arc::clone(&self.sink);
                let cancelled = Arc::clone(&cancelled);
                move || Self::waiter(&sink, &cancelled, done)
            })
            .map_err(|e| DeviceError::Start(e.to_string()))?;

        self.waiter = Some(cancelled);
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.sink.play();
    }

    fn stop(&mut self) {
        // The waiter notices the sink is empty, and finishes the completion.
        self.sink.stop();
    }

    fn is_playing(&self) -> bool {
        !self.sink.empty() && !self.sink.is_paused()
    }

    fn is_paused(&self) -> bool {
        !self.sink.empty() && self.sink.is_paused()
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn disconnect(&mut self) {
        self.sink.stop();
    }
}
