use std::fmt::{self, Display};

use crate::error::StateError;

/// The playback volume of a session, stored as a percentage.
///
/// Devices only ever see [`Volume::float`], which is always within `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    /// The volume, as a percentage.
    pub(crate) inner: u16,
}

impl Volume {
    /// The highest accepted percentage.
    pub const MAX: u16 = 100;

    /// Validates a user supplied percentage.
    pub fn from_percent(percent: i64) -> Result<Self, StateError> {
        u16::try_from(percent)
            .ok()
            .filter(|x| *x <= Self::MAX)
            .map(|inner| Self { inner })
            .ok_or(StateError::OutOfRange(percent))
    }

    /// Returns the volume as a percentage.
    pub const fn percent(self) -> u16 {
        self.inner
    }

    /// Returns the volume as a float from 0 to 1.
    pub fn float(self) -> f32 {
        f32::from(self.inner) / 100.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self { inner: 50 }
    }
}

impl Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.inner)
    }
}
