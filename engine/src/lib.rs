//! Client wrapper for a real-time audio server.
//!
//! [`AudioClientHandle`] opens a connection, registers an audio input, an audio
//! output and optionally a MIDI input port, installs a [`ProcessCallback`], and on
//! `run` patches the ports to the first physical capture and playback ports.

pub mod client;
pub mod error;
pub mod hw;
pub mod message;
pub mod midi;
pub mod process;
pub mod state;

pub use client::{
    AudioClientHandle, ClientIdentity, ClientPorts, ConnectionReport, EngineParameters,
    PortConnectFailure,
};
pub use error::{Error, Result, ServerError};
pub use hw::config::{ClientConfig, ConfigError};
pub use hw::jack::JackServer;
pub use hw::ports::{PortFlow, PortHandle, PortId, PortKind};
pub use hw::traits::{AudioServer, OpenStatus};
pub use message::ServerEvent;
pub use midi::io::{MidiEvent, MidiSource, MidiView};
pub use process::{Control, Cycle, ProcessCallback};
pub use state::ClientState;
