//! Address-mapped RAM: a fixed-size byte window anchored at a base
//! address. Used both as general working memory and as the APU's
//! register shadow storage.

use crate::bus::Peripheral;

pub struct Ram {
    base: u16,
    storage: Vec<u8>,
}

impl Ram {
    /// Creates a zero-filled window covering `[base, base + size)`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or the window would extend past the top
    /// of the 16-bit address space.
    pub fn new(base: u16, size: usize) -> Self {
        assert!(size > 0, "ram: zero-sized window at {:#06X}", base);
        assert!(
            (base as usize) + size <= 0x1_0000,
            "ram: window at {:#06X} with size {:#X} exceeds the address space",
            base,
            size
        );
        Ram {
            base,
            storage: vec![0; size],
        }
    }

    /// Copies `bytes` into the window starting at the absolute `address`.
    /// Useful for preloading programs and data at bring-up.
    pub fn load(&mut self, address: u16, bytes: &[u8]) {
        let offset = self.offset(address);
        assert!(
            offset + bytes.len() <= self.storage.len(),
            "ram: load of {} bytes at {:#06X} overruns the window",
            bytes.len(),
            address
        );
        self.storage[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    // The bus makes out-of-range dispatch impossible; anything else is a
    // caller bug.
    #[inline(always)]
    fn offset(&self, address: u16) -> usize {
        assert!(
            address >= self.base && ((address - self.base) as usize) < self.storage.len(),
            "ram: address {:#06X} outside window starting at {:#06X}",
            address,
            self.base
        );
        (address - self.base) as usize
    }
}

impl Peripheral for Ram {
    fn first_address(&self) -> u16 {
        self.base
    }

    fn last_address(&self) -> u16 {
        self.base + (self.storage.len() as u16).wrapping_sub(1)
    }

    fn read(&self, address: u16) -> u8 {
        self.storage[self.offset(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        let offset = self.offset(address);
        self.storage[offset] = value;
    }
}
