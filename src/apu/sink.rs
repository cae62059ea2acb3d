//! The audio output seam.
//!
//! The APU is a pure state engine; everything audible goes through this
//! trait. A channel pushes derived values (amplitude, frequency,
//! waveform selection) whenever they change and never reads them back.

/// Capability set consumed per pulse channel.
///
/// Contract: an amplitude of 0 must yield silence indistinguishable
/// from `stop`.
pub trait AudioSink {
    /// New output amplitude in `[0, 1]`.
    fn set_amplitude(&mut self, amplitude: f32);
    /// New oscillator frequency in Hz (always positive).
    fn set_frequency(&mut self, hz: f32);
    /// Duty selection: index 0..=3 into the fixed pulse waveforms
    /// (12.5%, 25%, 50%, 75%).
    fn set_waveform_index(&mut self, index: u8);
    fn start(&mut self);
    fn stop(&mut self);
    /// Rewind the oscillator to the start of its waveform, as a channel
    /// trigger does on hardware. Sinks that cannot seek their oscillator
    /// may ignore this.
    fn reset_phase(&mut self) {}
}

/// A sink that discards every update.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn set_amplitude(&mut self, _amplitude: f32) {}
    fn set_frequency(&mut self, _hz: f32) {}
    fn set_waveform_index(&mut self, _index: u8) {}
    fn start(&mut self) {}
    fn stop(&mut self) {}
}
