#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::patch::ParamId;

/// Control messages delivered to the instrument between render calls.
///
/// The queue is the single-writer/single-reader boundary of the engine:
/// a UI or MIDI thread pushes, the audio thread drains at block start.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    PitchBend { value: f32 },
    SetParam { id: ParamId, value: f32 },
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}
