use std::fmt;

/// Lifecycle state of an [`AudioClientHandle`](crate::client::AudioClientHandle).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClientState {
    #[default]
    Unopened,
    Opened,
    Activated,
    Closed,
}

impl ClientState {
    /// Ports and engine parameters are only valid while connected.
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Opened | Self::Activated)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unopened => write!(f, "unopened"),
            Self::Opened => write!(f, "opened"),
            Self::Activated => write!(f, "activated"),
            Self::Closed => write!(f, "closed"),
        }
    }
}
