//! Standalone player: renders a short arpeggio through the default
//! audio output. Mostly useful as a smoke test and as wiring reference
//! for embedding the engine behind a real-time callback.

#[cfg(feature = "rtrb")]
fn main() -> color_eyre::Result<()> {
    player::run()
}

#[cfg(not(feature = "rtrb"))]
fn main() {
    eprintln!("The player needs the message queue; build with the default `rtrb` feature.");
}

#[cfg(feature = "rtrb")]
mod player {
    use std::thread;
    use std::time::Duration;

    use color_eyre::eyre::eyre;
    use color_eyre::Result;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{SampleFormat, StreamConfig};

    use sawbank::patch::ParamId;
    use sawbank::synth::SynthMessage;
    use sawbank::{Instrument, MAX_BLOCK_SIZE, SAMPLE_RATE};

    /// Message queue capacity. The main thread sends a handful of
    /// events per second; 256 is generous.
    const QUEUE_CAPACITY: usize = 256;

    pub fn run() -> Result<()> {
        color_eyre::install()?;
        simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Info)
            .init()?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no audio output device available"))?;
        let default_config = device.default_output_config()?;
        if default_config.sample_format() != SampleFormat::F32 {
            return Err(eyre!(
                "unsupported output sample format {:?}",
                default_config.sample_format()
            ));
        }

        let config: StreamConfig = default_config.into();
        let channels = config.channels as usize;
        if config.sample_rate.0 as f32 != SAMPLE_RATE {
            log::warn!(
                "device runs at {} Hz, engine renders at {} Hz; pitch will be off",
                config.sample_rate.0,
                SAMPLE_RATE
            );
        }

        let (mut producer, mut consumer) = rtrb::RingBuffer::<SynthMessage>::new(QUEUE_CAPACITY);

        let mut instrument = Instrument::new();
        instrument.load_preset(1).map_err(|e| eyre!("{e}"))?;
        log::info!(
            "playing preset {:?} on {:?}",
            instrument.preset_name(1),
            device.name().unwrap_or_else(|_| "<unnamed>".into())
        );

        let mut left = [0.0f32; MAX_BLOCK_SIZE];
        let mut right = [0.0f32; MAX_BLOCK_SIZE];
        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _| {
                instrument.pump_messages(&mut consumer);
                for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    let frames = chunk.len() / channels;
                    instrument.render(&mut left[..frames], &mut right[..frames]);
                    for (n, frame) in chunk.chunks_mut(channels).enumerate() {
                        frame[0] = left[n];
                        if channels > 1 {
                            frame[1] = right[n];
                        }
                    }
                }
            },
            |err| log::error!("stream error: {err}"),
            None,
        )?;
        stream.play()?;

        // A rising minor arpeggio, then let the delay tail ring out
        let mut send = |message| {
            if producer.push(message).is_err() {
                log::warn!("message queue full, dropping event");
            }
        };
        send(SynthMessage::SetParam {
            id: ParamId::DelayMix,
            value: 0.25,
        });
        for note in [45u8, 57, 60, 64, 69, 72] {
            send(SynthMessage::NoteOn {
                note,
                velocity: 0.85,
            });
            thread::sleep(Duration::from_millis(300));
            send(SynthMessage::NoteOff { note });
        }
        thread::sleep(Duration::from_millis(2500));

        Ok(())
    }
}
