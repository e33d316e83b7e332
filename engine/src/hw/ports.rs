use std::fmt;

/// Kind of port a client can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    AudioIn,
    AudioOut,
    MidiIn,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AudioIn => write!(f, "audio input"),
            Self::AudioOut => write!(f, "audio output"),
            Self::MidiIn => write!(f, "MIDI input"),
        }
    }
}

/// Direction of the physical ports used for automatic patching.
///
/// Capture ports are the server's physical *outputs* (sound coming from the
/// hardware), playback ports its physical *inputs*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortFlow {
    Capture,
    Playback,
}

impl fmt::Display for PortFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture => write!(f, "capture"),
            Self::Playback => write!(f, "playback"),
        }
    }
}

/// Backend-local identifier of a registered port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(pub usize);

/// A port registered by this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortHandle {
    pub id: PortId,
    pub kind: PortKind,
    /// Full server-side name, `client:port`.
    pub name: String,
}

impl PortHandle {
    pub fn new(id: PortId, kind: PortKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
        }
    }
}

/// Short names used when registering the client's ports.
pub const INPUT_PORT: &str = "input";
pub const OUTPUT_PORT: &str = "output";
pub const MIDI_INPUT_PORT: &str = "midi_input";
