//! Audio processor for the carta plugin: a deliberate passthrough.
//!
//! The plugin exists for its control surface; the audio path only records
//! the sample rate at activation and copies input to output, honoring
//! hosts that hand us the same buffer for both directions.

use clack_plugin::prelude::*;

use crate::main_thread::CartaMainThread;
use crate::shared::CartaShared;

/// Audio-thread processor. Created during `activate()`, destroyed during
/// `deactivate()`.
pub struct CartaAudioProcessor<'a> {
    _shared: &'a CartaShared,
}

impl<'a> PluginAudioProcessor<'a, CartaShared, CartaMainThread<'a>> for CartaAudioProcessor<'a> {
    fn activate(
        _host: HostAudioProcessorHandle<'a>,
        _main_thread: &mut CartaMainThread<'a>,
        shared: &'a CartaShared,
        audio_config: PluginAudioConfiguration,
    ) -> Result<Self, PluginError> {
        shared.set_sample_rate(audio_config.sample_rate);
        Ok(Self { _shared: shared })
    }

    fn process(
        &mut self,
        _process: Process,
        mut audio: Audio,
        _events: Events,
    ) -> Result<ProcessStatus, PluginError> {
        for mut port_pair in &mut audio {
            let channels = port_pair.channels()?;

            // f32 ports only; f64-only ports are left to the host's fallback.
            let Some(mut channels) = channels.into_f32() else {
                continue;
            };

            for index in 0..channels.channel_pair_count() {
                match channels.channel_pair(index) {
                    Some(ChannelPair::InputOutput(input, output)) => {
                        let frames = input.len().min(output.len());
                        output[..frames].copy_from_slice(&input[..frames]);
                    }
                    // Host reused the input buffer as the output; the
                    // samples are already where they belong.
                    Some(ChannelPair::InPlace(_)) => {}
                    Some(ChannelPair::OutputOnly(output)) => {
                        output.fill(0.0);
                    }
                    _ => {}
                }
            }
        }

        Ok(ProcessStatus::ContinueIfNotQuiet)
    }

    fn deactivate(self, _main_thread: &mut CartaMainThread<'_>) {}
}
