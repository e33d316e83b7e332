#![allow(dead_code)]

use jackwrap_engine::{
    AudioServer, Control, Cycle, MidiEvent, MidiSource, OpenStatus, PortFlow, PortHandle, PortId,
    PortKind, ProcessCallback, ServerError, ServerEvent,
};
use std::{cell::RefCell, rc::Rc};
use tokio::sync::mpsc::Sender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(String),
    SetCallback,
    SetEventSender,
    Register(PortKind),
    Activate,
    PhysicalPorts(PortFlow),
    Connect(String, String),
    Close,
}

/// Everything the fake saw, shared with the test after the fake moved into a handle.
#[derive(Default)]
pub struct FakeLog {
    pub calls: Vec<Call>,
    pub callback: Option<Box<dyn ProcessCallback>>,
    pub events: Option<Sender<ServerEvent>>,
}

impl FakeLog {
    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn registered(&self) -> Vec<PortKind> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Register(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn connections(&self) -> Vec<(String, String)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Connect(src, dst) => Some((src.clone(), dst.clone())),
                _ => None,
            })
            .collect()
    }

    /// Runs the installed callback once over `input`, returning the output buffer.
    pub fn run_cycle(&mut self, input: &[f32], midi: &Vec<MidiEvent>) -> (Control, Vec<f32>) {
        let callback = self.callback.as_mut().expect("no callback installed");
        let mut output = vec![0.0; input.len()];
        let mut cycle = Cycle::new(
            input.len() as u32,
            input,
            &mut output,
            Some(midi as &dyn MidiSource),
        );
        let control = callback.process(&mut cycle);
        (control, output)
    }
}

pub struct FakeServer {
    log: Rc<RefCell<FakeLog>>,
    pub fail_open: bool,
    pub assigned_name: Option<String>,
    pub sample_rate: usize,
    pub buffer_size: usize,
    pub fail_parameters: bool,
    pub port_limit: usize,
    pub fail_activate: bool,
    pub capture: Vec<String>,
    pub playback: Vec<String>,
    /// Connections whose source is listed here are refused.
    pub refused_sources: Vec<String>,
    client_name: String,
    registered: usize,
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(FakeLog::default())),
            fail_open: false,
            assigned_name: None,
            sample_rate: 48_000,
            buffer_size: 256,
            fail_parameters: false,
            port_limit: usize::MAX,
            fail_activate: false,
            capture: vec!["system:capture_1".to_string(), "system:capture_2".to_string()],
            playback: vec![
                "system:playback_1".to_string(),
                "system:playback_2".to_string(),
            ],
            refused_sources: vec![],
            client_name: String::new(),
            registered: 0,
        }
    }

    pub fn log(&self) -> Rc<RefCell<FakeLog>> {
        self.log.clone()
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().calls.push(call);
    }
}

impl AudioServer for FakeServer {
    fn open(&mut self, name: &str, _start_server: bool) -> Result<OpenStatus, ServerError> {
        self.record(Call::Open(name.to_string()));
        if self.fail_open {
            return Err(ServerError::new("unable to connect to server"));
        }
        self.client_name = self
            .assigned_name
            .clone()
            .unwrap_or_else(|| name.to_string());
        Ok(OpenStatus {
            name: self.client_name.clone(),
            name_not_unique: self.client_name != name,
            server_started: false,
        })
    }

    fn sample_rate(&self) -> Result<usize, ServerError> {
        if self.fail_parameters {
            return Err(ServerError::new("server went away"));
        }
        Ok(self.sample_rate)
    }

    fn buffer_size(&self) -> Result<usize, ServerError> {
        if self.fail_parameters {
            return Err(ServerError::new("server went away"));
        }
        Ok(self.buffer_size)
    }

    fn set_process_callback(
        &mut self,
        callback: Box<dyn ProcessCallback>,
    ) -> Result<(), ServerError> {
        self.record(Call::SetCallback);
        self.log.borrow_mut().callback = Some(callback);
        Ok(())
    }

    fn set_event_sender(&mut self, tx: Sender<ServerEvent>) -> Result<(), ServerError> {
        self.record(Call::SetEventSender);
        self.log.borrow_mut().events = Some(tx);
        Ok(())
    }

    fn register_port(&mut self, name: &str, kind: PortKind) -> Result<PortHandle, ServerError> {
        self.record(Call::Register(kind));
        if self.registered >= self.port_limit {
            return Err(ServerError::new("port limit reached"));
        }
        let id = PortId(self.registered);
        self.registered += 1;
        Ok(PortHandle::new(
            id,
            kind,
            format!("{}:{}", self.client_name, name),
        ))
    }

    fn activate(&mut self) -> Result<(), ServerError> {
        self.record(Call::Activate);
        if self.fail_activate {
            return Err(ServerError::new("activation refused"));
        }
        Ok(())
    }

    fn physical_ports(&self, flow: PortFlow) -> Vec<String> {
        self.record(Call::PhysicalPorts(flow));
        match flow {
            PortFlow::Capture => self.capture.clone(),
            PortFlow::Playback => self.playback.clone(),
        }
    }

    fn connect(&self, source: &str, destination: &str) -> Result<(), ServerError> {
        self.record(Call::Connect(source.to_string(), destination.to_string()));
        if self.refused_sources.iter().any(|s| s == source) {
            return Err(ServerError::new(format!("cannot connect {source}")));
        }
        Ok(())
    }

    fn close(&mut self) {
        self.record(Call::Close);
    }
}

/// Callback copying input to output.
pub fn passthrough(cycle: &mut Cycle<'_>) -> Control {
    let (input, output) = cycle.buffers();
    output.copy_from_slice(input);
    Control::Continue
}
