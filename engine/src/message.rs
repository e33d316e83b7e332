use tokio::sync::mpsc::{Receiver, Sender, channel};

/// Capacity of the notification channel between the server threads and the owner.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Notifications raised by the audio server on one of its own threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    /// The server shut down or kicked the client out. Nothing will be processed
    /// after this.
    Shutdown { reason: String },
    /// The server switched to a new period size. Engine parameters captured at
    /// open time are not updated.
    BufferSizeChanged { frames: usize },
}

pub fn event_channel() -> (Sender<ServerEvent>, Receiver<ServerEvent>) {
    channel::<ServerEvent>(EVENT_CHANNEL_CAPACITY)
}
