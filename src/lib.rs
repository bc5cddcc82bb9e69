//! A per-session audio playback scheduler.
//!
//! Every session (a guild, a room, whatever the host calls it) gets its own
//! queue of tracks, one active playback at a time, and moves on by itself
//! when a track ends. Commands go through a [`Controller`], which hands them
//! to a single server task along with every completion reported by devices.

pub mod controller;
pub mod device;
pub mod error;
pub mod item;
pub mod message;
pub mod queue;
pub mod registry;
pub mod resolver;
pub mod sim;
pub mod volume;

#[cfg(test)]
mod tests;

pub use controller::{Config, Controller};
pub use device::{Completion, Connector, Device, DeviceError};
pub use error::{Error, Result, StateError};
pub use item::{PlayableItem, SessionId};
pub use message::{Enqueued, Event, Snapshot};
pub use queue::SessionQueue;
pub use registry::Registry;
pub use resolver::{ResolveError, Resolver};
pub use volume::Volume;
