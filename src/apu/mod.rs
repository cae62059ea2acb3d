//! The APU register file and frame sequencer.
//!
//! The APU owns the bus window 0xFF10..=0xFF3F. Every write lands in a
//! RAM shadow of the hardware register and, for the recognized pulse
//! registers, is decoded into channel parameters on the spot. Reads
//! return the shadow byte. The host drives [`Apu::clock_256hz`]; the
//! 128 Hz (sweep) and 64 Hz (envelope) sub-clocks are derived from a
//! four-step sequencer index.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::Peripheral;
use crate::memory_map::*;
use crate::ram::Ram;

pub mod pulse;
pub mod sink;

use pulse::PulseChannel;
use sink::AudioSink;

pub struct Apu {
    shadow: Ram,
    pulse1: PulseChannel,
    pulse2: PulseChannel,
    sequencer_index: u8,
}

impl Apu {
    /// One sink per voice; the sinks are external long-lived
    /// collaborators and the channels hold non-owning handles.
    pub fn new(
        pulse1_sink: Rc<RefCell<dyn AudioSink>>,
        pulse2_sink: Rc<RefCell<dyn AudioSink>>,
    ) -> Self {
        Apu {
            shadow: Ram::new(APU_START, APU_WINDOW_SIZE),
            pulse1: PulseChannel::with_sweep(pulse1_sink),
            pulse2: PulseChannel::new(pulse2_sink),
            sequencer_index: 0,
        }
    }

    /// The external 256 Hz frame clock.
    ///
    /// Length counters tick on every call; pulse 1's sweep on indexes 1
    /// and 3 (128 Hz); envelopes on index 3 (64 Hz).
    pub fn clock_256hz(&mut self) {
        self.pulse1.clock_length();
        self.pulse2.clock_length();
        if self.sequencer_index == 1 || self.sequencer_index == 3 {
            self.pulse1.clock_sweep();
        }
        if self.sequencer_index == 3 {
            self.pulse1.clock_envelope();
            self.pulse2.clock_envelope();
        }
        self.sequencer_index = (self.sequencer_index + 1) & 3;
    }

    pub fn pulse1(&self) -> &PulseChannel {
        &self.pulse1
    }

    pub fn pulse2(&self) -> &PulseChannel {
        &self.pulse2
    }

    /// The 11-bit channel frequency lives split across two registers;
    /// recompose it from the current shadow of both.
    fn shadow_frequency(&self, low_addr: u16, high_addr: u16) -> u16 {
        let low = self.shadow.read(low_addr) as u16;
        let high = (self.shadow.read(high_addr) & 0x07) as u16;
        (high << 8) | low
    }

    /// Register write side effects. The shadow byte has already been
    /// stored, so frequency recomposition sees the fresh value on
    /// whichever half was just written.
    fn dispatch(&mut self, address: u16, value: u8) {
        match address {
            NR10_ADDR => {
                self.pulse1
                    .set_sweep((value >> 4) & 0x07, value & 0x08 != 0, value & 0x07);
            }
            NR11_ADDR => self.pulse1.set_duty_length(value >> 6, value & 0x3F),
            NR12_ADDR => {
                self.pulse1
                    .set_envelope(value >> 4, value & 0x08 != 0, value & 0x07);
            }
            NR13_ADDR => {
                let frequency = self.shadow_frequency(NR13_ADDR, NR14_ADDR);
                self.pulse1.set_frequency(frequency);
            }
            NR14_ADDR => {
                let frequency = self.shadow_frequency(NR13_ADDR, NR14_ADDR);
                self.pulse1.set_frequency(frequency);
                self.pulse1.set_length_enable(value & 0x40 != 0);
                if value & 0x80 != 0 {
                    self.pulse1.trigger();
                }
            }
            NR21_ADDR => self.pulse2.set_duty_length(value >> 6, value & 0x3F),
            NR22_ADDR => {
                self.pulse2
                    .set_envelope(value >> 4, value & 0x08 != 0, value & 0x07);
            }
            NR23_ADDR => {
                let frequency = self.shadow_frequency(NR23_ADDR, NR24_ADDR);
                self.pulse2.set_frequency(frequency);
            }
            NR24_ADDR => {
                let frequency = self.shadow_frequency(NR23_ADDR, NR24_ADDR);
                self.pulse2.set_frequency(frequency);
                self.pulse2.set_length_enable(value & 0x40 != 0);
                if value & 0x80 != 0 {
                    self.pulse2.trigger();
                }
            }
            // The rest of the window (0xFF15, wave/noise/control space)
            // is shadow-only here.
            _ => {}
        }
    }
}

impl Peripheral for Apu {
    fn first_address(&self) -> u16 {
        APU_START
    }

    fn last_address(&self) -> u16 {
        APU_END
    }

    fn read(&self, address: u16) -> u8 {
        self.shadow.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.shadow.write(address, value);
        self.dispatch(address, value);
    }
}
