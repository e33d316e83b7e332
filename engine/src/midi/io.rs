/// MIDI event owned outside of a process cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiEvent {
    pub frame: u32,
    pub data: Vec<u8>,
}

impl MidiEvent {
    pub fn new(frame: u32, data: Vec<u8>) -> Self {
        Self { frame, data }
    }

    pub fn view(&self) -> MidiView<'_> {
        MidiView {
            frame: self.frame,
            bytes: &self.data,
        }
    }
}

/// MIDI event borrowed from a port buffer for the current process cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiView<'a> {
    /// Offset of the event inside the cycle, in frames.
    pub frame: u32,
    pub bytes: &'a [u8],
}

impl MidiView<'_> {
    pub fn to_event(&self) -> MidiEvent {
        MidiEvent::new(self.frame, self.bytes.to_vec())
    }
}

/// Read-only, index-addressed access to the MIDI events queued for one cycle.
pub trait MidiSource {
    fn event_count(&self) -> usize;
    fn event(&self, index: usize) -> Option<MidiView<'_>>;
}

impl MidiSource for Vec<MidiEvent> {
    fn event_count(&self) -> usize {
        self.len()
    }

    fn event(&self, index: usize) -> Option<MidiView<'_>> {
        self.get(index).map(MidiEvent::view)
    }
}
