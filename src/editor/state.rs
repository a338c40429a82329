//! Transport states tracked by the editor

use std::fmt;

/// Where the editor believes playback is
///
/// The transitional states (`Starting`, `Pausing`, `Stopping`) mean a
/// request has gone to the transport and its confirmation has not arrived
/// yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Starting,
    Playing,
    Pausing,
    Paused,
    Stopping,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Stopped => write!(f, "Stopped"),
            TransportState::Starting => write!(f, "Starting"),
            TransportState::Playing => write!(f, "Playing"),
            TransportState::Pausing => write!(f, "Pausing"),
            TransportState::Paused => write!(f, "Paused"),
            TransportState::Stopping => write!(f, "Stopping"),
        }
    }
}
