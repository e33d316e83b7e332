//! Real-time processing contract.
//!
//! The server calls the installed [`ProcessCallback`] once per period on its own
//! real-time thread. Implementations must not block, allocate, log or do I/O.

use crate::midi::io::{MidiSource, MidiView};

/// Status returned to the server after each cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Control {
    #[default]
    Continue,
    /// Ask the server to stop calling this client.
    Quit,
}

impl From<Control> for jack::Control {
    fn from(control: Control) -> Self {
        match control {
            Control::Continue => jack::Control::Continue,
            Control::Quit => jack::Control::Quit,
        }
    }
}

/// Processes one period of audio.
pub trait ProcessCallback: Send + 'static {
    fn process(&mut self, cycle: &mut Cycle<'_>) -> Control;
}

impl<F> ProcessCallback for F
where
    F: FnMut(&mut Cycle<'_>) -> Control + Send + 'static,
{
    fn process(&mut self, cycle: &mut Cycle<'_>) -> Control {
        self(cycle)
    }
}

/// Buffers and MIDI events for a single process cycle.
///
/// Every view handed out borrows the cycle, so nothing obtained here can be kept
/// after the callback returns.
pub struct Cycle<'a> {
    frames: u32,
    input: &'a [f32],
    output: &'a mut [f32],
    midi: Option<&'a dyn MidiSource>,
}

impl<'a> Cycle<'a> {
    pub fn new(
        frames: u32,
        input: &'a [f32],
        output: &'a mut [f32],
        midi: Option<&'a dyn MidiSource>,
    ) -> Self {
        Self {
            frames,
            input,
            output,
            midi,
        }
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    fn frame_count(&self) -> usize {
        self.frames as usize
    }

    pub fn input(&self) -> &[f32] {
        let n = self.frame_count().min(self.input.len());
        &self.input[..n]
    }

    pub fn output(&mut self) -> &mut [f32] {
        let n = self.frame_count().min(self.output.len());
        &mut self.output[..n]
    }

    /// Input and output views at once, for in-place style processing.
    pub fn buffers(&mut self) -> (&[f32], &mut [f32]) {
        let n = self.frame_count();
        let input = &self.input[..n.min(self.input.len())];
        let output_len = n.min(self.output.len());
        (input, &mut self.output[..output_len])
    }

    pub fn has_midi_input(&self) -> bool {
        self.midi.is_some()
    }

    pub fn midi_event_count(&self) -> usize {
        self.midi.map_or(0, |midi| midi.event_count())
    }

    pub fn midi_event(&self, index: usize) -> Option<MidiView<'_>> {
        self.midi.and_then(|midi| midi.event(index))
    }

    pub fn midi_events(&self) -> impl Iterator<Item = MidiView<'_>> + '_ {
        (0..self.midi_event_count()).filter_map(move |index| self.midi_event(index))
    }
}
