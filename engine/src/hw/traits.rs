use crate::{
    error::ServerError,
    hw::ports::{PortFlow, PortHandle, PortKind},
    message::ServerEvent,
    process::ProcessCallback,
};
use tokio::sync::mpsc::Sender;

/// What the server reported when the connection was established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenStatus {
    /// Name the server actually gave the client.
    pub name: String,
    /// The requested name was taken and the server picked another one.
    pub name_not_unique: bool,
    /// The server was not running and got started for this client.
    pub server_started: bool,
}

/// Native client API of a real-time audio server, as used by
/// [`AudioClientHandle`](crate::client::AudioClientHandle).
///
/// Calls arrive in lifecycle order: `open`, then parameter queries, callback and
/// notification installation and port registration, then `activate`, then port
/// discovery and `connect`, and finally `close`.
pub trait AudioServer {
    fn open(&mut self, name: &str, start_server: bool) -> Result<OpenStatus, ServerError>;
    fn sample_rate(&self) -> Result<usize, ServerError>;
    fn buffer_size(&self) -> Result<usize, ServerError>;
    fn set_process_callback(
        &mut self,
        callback: Box<dyn ProcessCallback>,
    ) -> Result<(), ServerError>;
    fn set_event_sender(&mut self, tx: Sender<ServerEvent>) -> Result<(), ServerError>;
    fn register_port(&mut self, name: &str, kind: PortKind) -> Result<PortHandle, ServerError>;
    fn activate(&mut self) -> Result<(), ServerError>;
    /// Full names of the physical ports in `flow`, in server order.
    fn physical_ports(&self, flow: PortFlow) -> Vec<String>;
    fn connect(&self, source: &str, destination: &str) -> Result<(), ServerError>;
    fn close(&mut self);
}
