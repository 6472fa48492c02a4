#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
}

/// Parse a raw channel-voice message (2 or 3 bytes).
///
/// Returns `None` for system messages, truncated messages, and status
/// bytes this synth does not consume. Pitch bend is decoded from its
/// 14-bit pair into -8192..8191.
pub fn parse(bytes: &[u8]) -> Option<MidiEvent> {
    if bytes.len() < 2 {
        return None;
    }
    let status = bytes[0];
    if status < 0x80 {
        return None;
    }
    let channel = status & 0x0F;
    let data1 = bytes[1] & 0x7F;
    let data2 = bytes.get(2).copied().unwrap_or(0) & 0x7F;

    match status & 0xF0 {
        0x90 => Some(MidiEvent::NoteOn {
            channel,
            key: data1,
            velocity: data2,
        }),
        0x80 => Some(MidiEvent::NoteOff {
            channel,
            key: data1,
            velocity: data2,
        }),
        0xB0 => Some(MidiEvent::ControlChange {
            channel,
            controller: data1,
            value: data2,
        }),
        0xE0 => Some(MidiEvent::PitchBend {
            channel,
            value: (((data2 as i16) << 7) | data1 as i16) - 8192,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_on_and_off() {
        assert_eq!(
            parse(&[0x90, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 0,
                key: 60,
                velocity: 100
            })
        );
        assert_eq!(
            parse(&[0x83, 60, 0]),
            Some(MidiEvent::NoteOff {
                channel: 3,
                key: 60,
                velocity: 0
            })
        );
    }

    #[test]
    fn parses_pitch_bend_range() {
        // Center
        assert_eq!(
            parse(&[0xE0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 0
            })
        );
        // Extremes
        assert_eq!(
            parse(&[0xE0, 0x00, 0x00]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: -8192
            })
        );
        assert_eq!(
            parse(&[0xE0, 0x7F, 0x7F]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 8191
            })
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse(&[]), None);
        assert_eq!(parse(&[0x90]), None);
        assert_eq!(parse(&[0x42, 0x42, 0x42]), None); // data byte as status
        assert_eq!(parse(&[0xF8, 0x00]), None); // system realtime
    }
}
