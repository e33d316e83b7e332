//! Lifecycle of one client connection.
//!
//! ```ignore
//! use jackwrap_engine::{AudioClientHandle, ClientConfig, Control, Cycle};
//!
//! let mut client = AudioClientHandle::new(ClientConfig::new("simple"));
//! client.open(|cycle: &mut Cycle<'_>| {
//!     let (input, output) = cycle.buffers();
//!     output.copy_from_slice(input);
//!     Control::Continue
//! })?;
//! client.run()?;
//! ```

use crate::{
    error::{Error, Result, ServerError},
    hw::{
        config::ClientConfig,
        jack::JackServer,
        ports::{INPUT_PORT, MIDI_INPUT_PORT, OUTPUT_PORT, PortFlow, PortHandle, PortKind},
        traits::AudioServer,
    },
    message::{ServerEvent, event_channel},
    process::ProcessCallback,
    state::ClientState,
};
use tokio::sync::mpsc::Receiver;
use tracing::{error, info, warn};

/// Name requested by the caller and name granted by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub requested: String,
    pub assigned: String,
}

impl ClientIdentity {
    /// The server replaced the requested name because it was already taken.
    pub fn was_renamed(&self) -> bool {
        self.requested != self.assigned
    }
}

/// Engine settings captured right after the connection was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParameters {
    pub sample_rate: usize,
    pub buffer_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPorts {
    pub input: PortHandle,
    pub output: PortHandle,
    pub midi_input: Option<PortHandle>,
}

/// A patch attempt the server rejected during `run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConnectFailure {
    pub source: String,
    pub destination: String,
    pub reason: String,
}

/// Outcome of the automatic patching done by `run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionReport {
    /// Physical port feeding our input, if the connection was made.
    pub capture: Option<String>,
    /// Physical port fed by our output, if the connection was made.
    pub playback: Option<String>,
    pub failures: Vec<PortConnectFailure>,
}

impl ConnectionReport {
    pub fn is_fully_connected(&self) -> bool {
        self.capture.is_some() && self.playback.is_some()
    }
}

pub struct AudioClientHandle<S: AudioServer = JackServer> {
    server: S,
    config: ClientConfig,
    state: ClientState,
    identity: Option<ClientIdentity>,
    parameters: Option<EngineParameters>,
    ports: Option<ClientPorts>,
    events: Option<Receiver<ServerEvent>>,
}

impl AudioClientHandle<JackServer> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_server(JackServer::new(), config)
    }
}

impl<S: AudioServer> AudioClientHandle<S> {
    pub fn with_server(server: S, config: ClientConfig) -> Self {
        Self {
            server,
            config,
            state: ClientState::Unopened,
            identity: None,
            parameters: None,
            ports: None,
            events: None,
        }
    }

    /// Connects to the server, installs `callback` and the shutdown notifier and
    /// registers the ports.
    ///
    /// On failure whatever was already set up is released and the handle ends up
    /// [`ClientState::Closed`].
    pub fn open(&mut self, callback: impl ProcessCallback) -> Result<&ClientIdentity> {
        if self.state != ClientState::Unopened {
            return Err(Error::InvalidState {
                operation: "open",
                state: self.state,
            });
        }
        if self.config.name.trim().is_empty() {
            return Err(Error::InvalidClientName);
        }

        match self.connect_and_register(Box::new(callback)) {
            Ok(()) => {
                self.state = ClientState::Opened;
                self.identity.as_ref().ok_or(Error::NotOpen)
            }
            Err(e) => {
                error!("{e}");
                self.server.close();
                self.identity = None;
                self.parameters = None;
                self.ports = None;
                self.events = None;
                self.state = ClientState::Closed;
                Err(e)
            }
        }
    }

    fn connect_and_register(&mut self, callback: Box<dyn ProcessCallback>) -> Result<()> {
        let name = self.config.name.clone();
        let status = self
            .server
            .open(&name, self.config.start_server)
            .map_err(|e| Error::Connection {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        if status.server_started {
            info!("Audio server started");
        }
        let identity = ClientIdentity {
            requested: name,
            assigned: status.name,
        };
        if status.name_not_unique || identity.was_renamed() {
            warn!("Unique name assigned: {}", identity.assigned);
        }
        self.identity = Some(identity);

        let (tx, rx) = event_channel();
        self.server
            .set_process_callback(callback)
            .map_err(|e| self.connection_error(e))?;
        self.server
            .set_event_sender(tx)
            .map_err(|e| self.connection_error(e))?;
        self.events = Some(rx);

        let parameters = EngineParameters {
            sample_rate: self
                .server
                .sample_rate()
                .map_err(|e| self.connection_error(e))?,
            buffer_size: self
                .server
                .buffer_size()
                .map_err(|e| self.connection_error(e))?,
        };
        info!("Engine sample rate: {}", parameters.sample_rate);
        info!("Engine buffer size: {}", parameters.buffer_size);
        self.parameters = Some(parameters);

        let input = self.register(INPUT_PORT, PortKind::AudioIn)?;
        let output = self.register(OUTPUT_PORT, PortKind::AudioOut)?;
        let midi_input = if self.config.midi_input {
            Some(self.register(MIDI_INPUT_PORT, PortKind::MidiIn)?)
        } else {
            None
        };
        self.ports = Some(ClientPorts {
            input,
            output,
            midi_input,
        });
        Ok(())
    }

    fn connection_error(&self, e: ServerError) -> Error {
        Error::Connection {
            name: self.config.name.clone(),
            reason: e.to_string(),
        }
    }

    fn register(&mut self, name: &str, kind: PortKind) -> Result<PortHandle> {
        self.server
            .register_port(name, kind)
            .map_err(|e| Error::PortExhaustion {
                port: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Activates the client, then patches the first physical capture port to our
    /// input and our output to the first physical playback port.
    ///
    /// A rejected patch is logged and reported; a direction without any physical
    /// port is an error. Capture is always looked at first.
    pub fn run(&mut self) -> Result<ConnectionReport> {
        if self.state != ClientState::Opened {
            return Err(Error::InvalidState {
                operation: "run",
                state: self.state,
            });
        }
        self.server.activate().map_err(|e| {
            let err = Error::Activation {
                reason: e.to_string(),
            };
            error!("{err}");
            err
        })?;
        self.state = ClientState::Activated;

        let mut report = ConnectionReport::default();
        if !self.config.auto_connect {
            return Ok(report);
        }
        let (input, output) = match &self.ports {
            Some(ports) => (ports.input.name.clone(), ports.output.name.clone()),
            None => return Err(Error::NotOpen),
        };

        let capture = self.first_physical_port(PortFlow::Capture)?;
        match self.server.connect(&capture, &input) {
            Ok(()) => {
                info!("Connected to capture port: {capture}");
                report.capture = Some(capture);
            }
            Err(e) => {
                error!("Cannot connect input ports: {e}");
                report.failures.push(PortConnectFailure {
                    source: capture,
                    destination: input,
                    reason: e.to_string(),
                });
            }
        }

        let playback = self.first_physical_port(PortFlow::Playback)?;
        match self.server.connect(&output, &playback) {
            Ok(()) => {
                info!("Connected to playback port: {playback}");
                report.playback = Some(playback);
            }
            Err(e) => {
                error!("Cannot connect output ports: {e}");
                report.failures.push(PortConnectFailure {
                    source: output,
                    destination: playback,
                    reason: e.to_string(),
                });
            }
        }

        Ok(report)
    }

    fn first_physical_port(&self, flow: PortFlow) -> Result<String> {
        // first found wins
        self.server
            .physical_ports(flow)
            .into_iter()
            .next()
            .ok_or_else(|| {
                let err = Error::NoPhysicalPorts(flow);
                error!("{err}");
                err
            })
    }

    /// Disconnects from the server. Safe to call any number of times.
    pub fn close(&mut self) {
        if !self.state.is_connected() {
            return;
        }
        self.server.close();
        self.identity = None;
        self.parameters = None;
        self.ports = None;
        self.events = None;
        self.state = ClientState::Closed;
        info!("Client closed");
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Names of the current connection; `None` before open and after close.
    pub fn identity(&self) -> Option<&ClientIdentity> {
        self.identity.as_ref()
    }

    pub fn parameters(&self) -> Result<EngineParameters> {
        if !self.state.is_connected() {
            return Err(Error::NotOpen);
        }
        self.parameters.ok_or(Error::NotOpen)
    }

    pub fn sample_rate(&self) -> Result<usize> {
        self.parameters().map(|p| p.sample_rate)
    }

    pub fn buffer_size(&self) -> Result<usize> {
        self.parameters().map(|p| p.buffer_size)
    }

    pub fn ports(&self) -> Result<&ClientPorts> {
        if !self.state.is_connected() {
            return Err(Error::NotOpen);
        }
        self.ports.as_ref().ok_or(Error::NotOpen)
    }

    /// Receiver of server notifications. Handed out once per connection.
    pub fn take_events(&mut self) -> Option<Receiver<ServerEvent>> {
        self.events.take()
    }

    pub fn server(&self) -> &S {
        &self.server
    }
}

impl<S: AudioServer> Drop for AudioClientHandle<S> {
    fn drop(&mut self) {
        self.close();
    }
}
