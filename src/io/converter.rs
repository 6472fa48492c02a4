use crate::io::midi::MidiEvent;
use crate::synth::SynthMessage;

/// CC 123: all notes off.
const CC_ALL_NOTES_OFF: u8 = 123;

/// Translate a parsed MIDI event into an engine message.
///
/// `channel_filter` of `None` listens omni; `Some(ch)` drops events on
/// other channels. Note-on with velocity zero becomes a note-off, per
/// the running-status convention most controllers use.
pub fn midi_to_message(event: MidiEvent, channel_filter: Option<u8>) -> Option<SynthMessage> {
    let channel = match event {
        MidiEvent::NoteOn { channel, .. }
        | MidiEvent::NoteOff { channel, .. }
        | MidiEvent::ControlChange { channel, .. }
        | MidiEvent::PitchBend { channel, .. } => channel,
    };
    if let Some(want) = channel_filter {
        if channel != want {
            return None;
        }
    }

    match event {
        MidiEvent::NoteOn { key, velocity: 0, .. } => {
            Some(SynthMessage::NoteOff { note: key })
        }
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity: velocity as f32 / 127.0,
        }),
        MidiEvent::NoteOff { key, .. } => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::ControlChange {
            controller: CC_ALL_NOTES_OFF,
            ..
        } => Some(SynthMessage::AllNotesOff),
        MidiEvent::ControlChange { .. } => None,
        MidiEvent::PitchBend { value, .. } => Some(SynthMessage::PitchBend {
            value: value as f32 / 8192.0,
        }),
    }
}
