//! The pulse channel state machine: duty, length counter, volume
//! envelope, 11-bit frequency, and (for pulse 1) the frequency sweep.

use std::cell::RefCell;
use std::rc::Rc;

use super::sink::AudioSink;

/// Length counter reload value for a trigger with an expired counter.
const MAX_LENGTH: u16 = 64;

/// Largest representable channel frequency (11 bits).
const MAX_FREQUENCY: u16 = 2047;

/// Frequency sweep unit. Only pulse 1 owns one.
#[derive(Debug, Default)]
pub struct Sweep {
    pub period: u8,
    pub negate: bool,
    pub shift: u8,
}

pub struct PulseChannel {
    duty: u8,
    length_load: u8,
    length_counter: u16,
    length_enable: bool,
    starting_volume: u8,
    envelope_add_mode: bool,
    envelope_period: u8,
    envelope_counter: u8,
    frequency: u16,
    volume: u8,
    enabled: bool,
    sweep: Option<Sweep>,
    sink: Rc<RefCell<dyn AudioSink>>,
}

impl PulseChannel {
    pub(crate) fn new(sink: Rc<RefCell<dyn AudioSink>>) -> Self {
        PulseChannel {
            duty: 0,
            length_load: 0,
            length_counter: 0,
            length_enable: false,
            starting_volume: 0,
            envelope_add_mode: false,
            envelope_period: 0,
            envelope_counter: 0,
            frequency: 0,
            volume: 0,
            enabled: false,
            sweep: None,
            sink,
        }
    }

    pub(crate) fn with_sweep(sink: Rc<RefCell<dyn AudioSink>>) -> Self {
        let mut channel = Self::new(sink);
        channel.sweep = Some(Sweep::default());
        channel
    }

    // --- Register Decode Targets ---

    /// NR10: writes reach only the channel that owns a sweep unit.
    pub(crate) fn set_sweep(&mut self, period: u8, negate: bool, shift: u8) {
        debug_assert!(period <= 7 && shift <= 7);
        if let Some(sweep) = self.sweep.as_mut() {
            sweep.period = period;
            sweep.negate = negate;
            sweep.shift = shift;
        }
    }

    /// NR11/NR21: duty bits and length load. Loading restarts the
    /// countdown from 64 - load.
    pub(crate) fn set_duty_length(&mut self, duty: u8, length_load: u8) {
        debug_assert!(duty <= 3, "duty {} out of range", duty);
        debug_assert!(length_load <= 63, "length load {} out of range", length_load);
        self.duty = duty;
        self.length_load = length_load;
        self.length_counter = MAX_LENGTH - length_load as u16;
        self.push_tone();
    }

    /// NR12/NR22: envelope parameters. The running volume is untouched
    /// until the next trigger.
    pub(crate) fn set_envelope(&mut self, starting_volume: u8, add_mode: bool, period: u8) {
        debug_assert!(starting_volume <= 15 && period <= 7);
        self.starting_volume = starting_volume;
        self.envelope_add_mode = add_mode;
        self.envelope_period = period;
    }

    /// NR13+NR14/NR23+NR24: the recomposed 11-bit frequency.
    pub(crate) fn set_frequency(&mut self, frequency: u16) {
        debug_assert!(frequency <= MAX_FREQUENCY);
        self.frequency = frequency;
        self.push_tone();
    }

    pub(crate) fn set_length_enable(&mut self, enable: bool) {
        self.length_enable = enable;
    }

    /// The trigger edge: enable, reload an expired length counter to its
    /// maximum, rewind the envelope, reset the waveform position and
    /// restart the voice.
    pub(crate) fn trigger(&mut self) {
        self.enabled = true;
        if self.length_counter == 0 {
            self.length_counter = MAX_LENGTH;
        }
        self.envelope_counter = self.envelope_period;
        self.volume = self.starting_volume;
        {
            let mut sink = self.sink.borrow_mut();
            sink.reset_phase();
            sink.start();
        }
        self.push_tone();
    }

    // --- Frame Sequencer Clocks ---

    /// 256 Hz: length countdown while enabled by NRx4 bit 6. Hitting
    /// zero silences the channel.
    pub(crate) fn clock_length(&mut self) {
        if self.length_enable && self.length_counter > 0 {
            self.length_counter -= 1;
            if self.length_counter == 0 {
                self.disable();
            }
        }
    }

    /// 128 Hz: frequency sweep (pulse 1 only). The overflow check runs
    /// twice, the second time against the freshly written frequency.
    pub(crate) fn clock_sweep(&mut self) {
        let Some(sweep) = &self.sweep else {
            return;
        };
        if sweep.period == 0 || sweep.shift == 0 {
            return;
        }
        let shift = sweep.shift;
        let negate = sweep.negate;

        let swept = Self::sweep_next(self.frequency, shift, negate);
        if swept > MAX_FREQUENCY {
            self.disable();
            return;
        }
        self.frequency = swept;
        self.push_tone();

        if Self::sweep_next(swept, shift, negate) > MAX_FREQUENCY {
            self.disable();
        }
    }

    fn sweep_next(frequency: u16, shift: u8, negate: bool) -> u16 {
        let delta = frequency >> shift;
        if negate {
            frequency - delta
        } else {
            frequency + delta
        }
    }

    /// 64 Hz: volume envelope. A period of zero freezes the volume.
    pub(crate) fn clock_envelope(&mut self) {
        if self.envelope_period == 0 {
            return;
        }
        self.envelope_counter = self.envelope_counter.saturating_sub(1);
        if self.envelope_counter > 0 {
            return;
        }
        self.envelope_counter = self.envelope_period;

        let next = if self.envelope_add_mode {
            (self.volume + 1).min(15)
        } else {
            self.volume.saturating_sub(1)
        };
        if next != self.volume {
            self.volume = next;
            self.push_tone();
        }
    }

    /// Silence the channel. All other parameters are retained so a
    /// re-trigger resumes cleanly; no frequency update is sent.
    fn disable(&mut self) {
        self.enabled = false;
        self.sink.borrow_mut().set_amplitude(0.0);
    }

    /// Push the derived amplitude, frequency and waveform selection.
    fn push_tone(&mut self) {
        debug_assert!(self.duty <= 3);
        debug_assert!(self.volume <= 15);
        debug_assert!(self.length_counter <= MAX_LENGTH);
        let mut sink = self.sink.borrow_mut();
        if self.enabled {
            sink.set_amplitude(self.volume as f32 / 15.0);
            sink.set_frequency(131_072.0 / (2048 - self.frequency) as f32);
            sink.set_waveform_index(self.duty);
        } else {
            sink.set_amplitude(0.0);
        }
    }

    // --- State Accessors ---
    pub fn duty(&self) -> u8 {
        self.duty
    }
    pub fn frequency(&self) -> u16 {
        self.frequency
    }
    pub fn volume(&self) -> u8 {
        self.volume
    }
    pub fn enabled(&self) -> bool {
        self.enabled
    }
    pub fn length_counter(&self) -> u16 {
        self.length_counter
    }
    pub fn length_load(&self) -> u8 {
        self.length_load
    }
    pub fn length_enable(&self) -> bool {
        self.length_enable
    }
}

impl Drop for PulseChannel {
    // The sink outlives the channel; stop the voice before the handle
    // goes away.
    fn drop(&mut self) {
        self.sink.borrow_mut().stop();
    }
}
