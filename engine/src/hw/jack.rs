use crate::{
    error::ServerError,
    hw::{
        ports::{PortFlow, PortHandle, PortId, PortKind},
        traits::{AudioServer, OpenStatus},
    },
    message::ServerEvent,
    midi::io::{MidiSource, MidiView},
    process::{Cycle, ProcessCallback},
};
use jack::{
    AudioIn, AudioOut, Client, ClientOptions, ClientStatus, Control, Frames, MidiIn,
    NotificationHandler, Port, PortFlags, ProcessHandler, ProcessScope,
};
use tokio::sync::mpsc::Sender;
use tracing::{debug, error};

#[derive(Debug, Default)]
struct Notifications {
    tx: Option<Sender<ServerEvent>>,
}

impl NotificationHandler for Notifications {
    unsafe fn shutdown(&mut self, _status: ClientStatus, reason: &str) {
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(ServerEvent::Shutdown {
                reason: reason.to_string(),
            });
        }
    }
}

struct JackMidi<'a> {
    port: &'a Port<MidiIn>,
    ps: &'a ProcessScope,
}

impl MidiSource for JackMidi<'_> {
    fn event_count(&self) -> usize {
        self.port.iter(self.ps).count()
    }

    fn event(&self, index: usize) -> Option<MidiView<'_>> {
        self.port.iter(self.ps).nth(index).map(|raw| MidiView {
            frame: raw.time,
            bytes: raw.bytes,
        })
    }
}

struct Process {
    audio_in: Port<AudioIn>,
    audio_out: Port<AudioOut>,
    midi_in: Option<Port<MidiIn>>,
    callback: Box<dyn ProcessCallback>,
    tx: Option<Sender<ServerEvent>>,
    buffer_size: Frames,
}

impl ProcessHandler for Process {
    fn process(&mut self, _client: &Client, ps: &ProcessScope) -> Control {
        let midi = self.midi_in.as_ref().map(|port| JackMidi { port, ps });
        let mut cycle = Cycle::new(
            ps.n_frames(),
            self.audio_in.as_slice(ps),
            self.audio_out.as_mut_slice(ps),
            midi.as_ref().map(|m| m as &dyn MidiSource),
        );
        self.callback.process(&mut cycle).into()
    }

    fn buffer_size(&mut self, _client: &Client, size: Frames) -> Control {
        track_buffer_size(&mut self.buffer_size, size, self.tx.as_ref());
        Control::Continue
    }
}

/// Records the new period size and reports it only when it actually changed.
fn track_buffer_size(current: &mut Frames, size: Frames, tx: Option<&Sender<ServerEvent>>) {
    if size == *current {
        return;
    }
    *current = size;
    if let Some(tx) = tx {
        let _ = tx.try_send(ServerEvent::BufferSizeChanged {
            frames: size as usize,
        });
    }
}

/// [`AudioServer`] backed by a JACK (or PipeWire-JACK) server.
#[derive(Default)]
pub struct JackServer {
    client: Option<Client>,
    active: Option<jack::AsyncClient<Notifications, Process>>,
    callback: Option<Box<dyn ProcessCallback>>,
    tx: Option<Sender<ServerEvent>>,
    audio_in: Option<Port<AudioIn>>,
    audio_out: Option<Port<AudioOut>>,
    midi_in: Option<Port<MidiIn>>,
    port_count: usize,
}

impl JackServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Option<&Client> {
        self.client
            .as_ref()
            .or_else(|| self.active.as_ref().map(|active| active.as_client()))
    }

    fn inactive_client(&self) -> Result<&Client, ServerError> {
        if self.active.is_some() {
            return Err(ServerError::new("client is already active"));
        }
        self.client
            .as_ref()
            .ok_or_else(|| ServerError::new("client is not open"))
    }

    fn next_port_id(&mut self) -> PortId {
        let id = PortId(self.port_count);
        self.port_count += 1;
        id
    }
}

fn open_failure_reason(status: ClientStatus) -> String {
    let mut reason = format!("status = 0x{:x}", status.bits());
    if status.contains(ClientStatus::SERVER_FAILED) {
        reason.push_str(", unable to connect to JACK server");
    }
    reason
}

fn slot_taken(kind: PortKind) -> ServerError {
    ServerError::new(format!("{kind} port already registered"))
}

impl AudioServer for JackServer {
    fn open(&mut self, name: &str, start_server: bool) -> Result<OpenStatus, ServerError> {
        if self.client().is_some() {
            return Err(ServerError::new("client is already open"));
        }
        let options = if start_server {
            ClientOptions::empty()
        } else {
            ClientOptions::NO_START_SERVER
        };
        let (client, status) = Client::new(name, options).map_err(|e| match e {
            jack::Error::ClientError(status) => ServerError::new(open_failure_reason(status)),
            other => ServerError::from(other),
        })?;
        let opened = OpenStatus {
            name: client.name().to_string(),
            name_not_unique: status.contains(ClientStatus::NAME_NOT_UNIQUE),
            server_started: status.contains(ClientStatus::SERVER_STARTED),
        };
        debug!("JACK client opened as '{}' (status 0x{:x})", opened.name, status.bits());
        self.client = Some(client);
        Ok(opened)
    }

    fn sample_rate(&self) -> Result<usize, ServerError> {
        self.client()
            .map(|c| c.sample_rate() as usize)
            .ok_or_else(|| ServerError::new("client is not open"))
    }

    fn buffer_size(&self) -> Result<usize, ServerError> {
        self.client()
            .map(|c| c.buffer_size() as usize)
            .ok_or_else(|| ServerError::new("client is not open"))
    }

    fn set_process_callback(
        &mut self,
        callback: Box<dyn ProcessCallback>,
    ) -> Result<(), ServerError> {
        self.inactive_client()?;
        self.callback = Some(callback);
        Ok(())
    }

    fn set_event_sender(&mut self, tx: Sender<ServerEvent>) -> Result<(), ServerError> {
        self.inactive_client()?;
        self.tx = Some(tx);
        Ok(())
    }

    fn register_port(&mut self, name: &str, kind: PortKind) -> Result<PortHandle, ServerError> {
        let client = self.inactive_client()?;
        let full_name = match kind {
            PortKind::AudioIn => {
                if self.audio_in.is_some() {
                    return Err(slot_taken(kind));
                }
                let port = client.register_port(name, AudioIn::default())?;
                let full_name = port.name()?;
                self.audio_in = Some(port);
                full_name
            }
            PortKind::AudioOut => {
                if self.audio_out.is_some() {
                    return Err(slot_taken(kind));
                }
                let port = client.register_port(name, AudioOut::default())?;
                let full_name = port.name()?;
                self.audio_out = Some(port);
                full_name
            }
            PortKind::MidiIn => {
                if self.midi_in.is_some() {
                    return Err(slot_taken(kind));
                }
                let port = client.register_port(name, MidiIn::default())?;
                let full_name = port.name()?;
                self.midi_in = Some(port);
                full_name
            }
        };
        Ok(PortHandle::new(self.next_port_id(), kind, full_name))
    }

    fn activate(&mut self) -> Result<(), ServerError> {
        self.inactive_client()?;
        if self.audio_in.is_none() || self.audio_out.is_none() {
            return Err(ServerError::new("audio ports are not registered"));
        }
        if self.callback.is_none() {
            return Err(ServerError::new("no process callback installed"));
        }
        let (Some(client), Some(audio_in), Some(audio_out), Some(callback)) = (
            self.client.take(),
            self.audio_in.take(),
            self.audio_out.take(),
            self.callback.take(),
        ) else {
            return Err(ServerError::new("client is not open"));
        };
        let buffer_size = client.buffer_size();
        let process = Process {
            audio_in,
            audio_out,
            midi_in: self.midi_in.take(),
            callback,
            tx: self.tx.clone(),
            buffer_size,
        };
        let notifications = Notifications {
            tx: self.tx.clone(),
        };
        let active = client.activate_async(notifications, process)?;
        self.active = Some(active);
        Ok(())
    }

    fn physical_ports(&self, flow: PortFlow) -> Vec<String> {
        let direction = match flow {
            PortFlow::Capture => PortFlags::IS_OUTPUT,
            PortFlow::Playback => PortFlags::IS_INPUT,
        };
        self.client().map_or_else(Vec::new, |c| {
            c.ports(None, None, PortFlags::IS_PHYSICAL | direction)
        })
    }

    fn connect(&self, source: &str, destination: &str) -> Result<(), ServerError> {
        let client = self
            .client()
            .ok_or_else(|| ServerError::new("client is not open"))?;
        client.connect_ports_by_name(source, destination)?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(active) = self.active.take() {
            if let Err(e) = active.deactivate() {
                error!("Failed to deactivate JACK client: {e}");
            }
        }
        self.client = None;
        self.callback = None;
        self.tx = None;
        self.audio_in = None;
        self.audio_out = None;
        self.midi_in = None;
    }
}

impl Drop for JackServer {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::event_channel;

    #[test]
    fn shutdown_is_forwarded_to_the_owner() {
        let (tx, mut rx) = event_channel();
        let mut notifications = Notifications { tx: Some(tx) };
        unsafe { notifications.shutdown(ClientStatus::empty(), "bye") };

        assert_eq!(
            rx.try_recv().unwrap(),
            ServerEvent::Shutdown {
                reason: "bye".to_string()
            }
        );
    }

    #[test]
    fn shutdown_without_owner_is_ignored() {
        let mut notifications = Notifications::default();
        unsafe { notifications.shutdown(ClientStatus::empty(), "bye") };
    }

    #[test]
    fn unchanged_buffer_size_is_not_reported() {
        let (tx, mut rx) = event_channel();
        let mut current: Frames = 256;
        track_buffer_size(&mut current, 256, Some(&tx));

        assert_eq!(current, 256);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn changed_buffer_size_is_reported_once() {
        let (tx, mut rx) = event_channel();
        let mut current: Frames = 256;
        track_buffer_size(&mut current, 512, Some(&tx));
        track_buffer_size(&mut current, 512, Some(&tx));

        assert_eq!(current, 512);
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerEvent::BufferSizeChanged { frames: 512 }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn failed_server_start_is_explained() {
        let reason = open_failure_reason(ClientStatus::FAILURE | ClientStatus::SERVER_FAILED);
        assert!(reason.starts_with("status = 0x"));
        assert!(reason.contains("unable to connect to JACK server"));

        let reason = open_failure_reason(ClientStatus::FAILURE);
        assert!(!reason.contains("unable to connect"));
    }

    #[test]
    fn parameters_need_an_open_client() {
        let server = JackServer::new();
        assert!(server.sample_rate().is_err());
        assert!(server.buffer_size().is_err());
        assert!(server.physical_ports(PortFlow::Capture).is_empty());
    }
}
