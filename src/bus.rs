//! The address-dispatching data bus.
//!
//! Peripherals register a closed address range at bring-up; every 8-bit
//! access inside a registered range is delivered to exactly that
//! peripheral. 16-bit accesses are two 8-bit accesses, little-endian,
//! wrapping from 0xFFFF to 0x0000.

use std::cell::RefCell;
use std::rc::Rc;

/// Value driven onto the bus by reads that hit no registered peripheral.
pub const OPEN_BUS_VALUE: u8 = 0xFF;

/// A device mapped into the 16-bit address space.
///
/// `read` and `write` receive the full bus address, not an offset; the
/// bus guarantees it lies inside `[first_address, last_address]`.
pub trait Peripheral {
    fn first_address(&self) -> u16;
    fn last_address(&self) -> u16;
    fn read(&self, address: u16) -> u8;
    fn write(&mut self, address: u16, value: u8);
}

struct Registration {
    first: u16,
    last: u16,
    peripheral: Rc<RefCell<dyn Peripheral>>,
}

/// The data bus.
///
/// The registration count is tiny, so dispatch is a linear range scan.
pub struct Bus {
    registrations: Vec<Registration>,
}

impl Bus {
    pub fn new() -> Self {
        Bus {
            registrations: Vec::new(),
        }
    }

    /// Registers a peripheral for the closed range `[first, last]`.
    ///
    /// Peripherals are shared handles so the host can keep one (e.g. to
    /// clock the APU) while the bus dispatches to it.
    ///
    /// # Panics
    ///
    /// Panics if the range is inverted or overlaps an existing
    /// registration. Both are bring-up misconfigurations, not runtime
    /// conditions.
    pub fn register(&mut self, peripheral: Rc<RefCell<dyn Peripheral>>, first: u16, last: u16) {
        assert!(
            first <= last,
            "bus::register: inverted range {:#06X}..={:#06X}",
            first,
            last
        );
        for existing in &self.registrations {
            if first <= existing.last && existing.first <= last {
                panic!(
                    "bus::register: range {:#06X}..={:#06X} overlaps existing {:#06X}..={:#06X}",
                    first, last, existing.first, existing.last
                );
            }
        }
        self.registrations.push(Registration {
            first,
            last,
            peripheral,
        });
    }

    #[inline(always)]
    fn lookup(&self, address: u16) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|r| r.first <= address && address <= r.last)
    }

    /// Reads one byte. Unmapped addresses read as [`OPEN_BUS_VALUE`].
    pub fn read8(&self, address: u16) -> u8 {
        match self.lookup(address) {
            Some(registration) => registration.peripheral.borrow().read(address),
            None => {
                log::warn!("bus: read from unmapped address {:#06X}", address);
                OPEN_BUS_VALUE
            }
        }
    }

    /// Writes one byte. Writes to unmapped addresses are dropped.
    pub fn write8(&mut self, address: u16, value: u8) {
        match self.lookup(address) {
            Some(registration) => registration.peripheral.borrow_mut().write(address, value),
            None => log::warn!(
                "bus: dropped write of {:#04X} to unmapped address {:#06X}",
                value,
                address
            ),
        }
    }

    /// Reads a little-endian word; `address + 1` wraps at 0xFFFF.
    pub fn read16(&self, address: u16) -> u16 {
        let low = self.read8(address);
        let high = self.read8(address.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    /// Writes a little-endian word; `address + 1` wraps at 0xFFFF.
    pub fn write16(&mut self, address: u16, value: u16) {
        let bytes = value.to_le_bytes();
        self.write8(address, bytes[0]);
        self.write8(address.wrapping_add(1), bytes[1]);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Bus::new()
    }
}
