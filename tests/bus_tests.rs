use std::cell::RefCell;
use std::rc::Rc;

use duet::{Bus, Peripheral, Ram};

fn map_ram(bus: &mut Bus, base: u16, size: usize) -> Rc<RefCell<Ram>> {
    let ram = Rc::new(RefCell::new(Ram::new(base, size)));
    bus.register(ram.clone(), base, base + (size as u16 - 1));
    ram
}

#[test]
fn test_dispatch_to_owning_peripheral() {
    let mut bus = Bus::new();
    let low = map_ram(&mut bus, 0x1000, 0x100);
    let high = map_ram(&mut bus, 0x2000, 0x100);

    bus.write8(0x1010, 0xAA);
    bus.write8(0x2010, 0xBB);

    assert_eq!(bus.read8(0x1010), 0xAA);
    assert_eq!(bus.read8(0x2010), 0xBB);

    // Each write landed in exactly one peripheral, at the bus address.
    assert_eq!(low.borrow().read(0x1010), 0xAA);
    assert_eq!(high.borrow().read(0x2010), 0xBB);
}

#[test]
fn test_unmapped_read_is_open_bus() {
    let mut bus = Bus::new();
    map_ram(&mut bus, 0x1000, 0x100);

    assert_eq!(bus.read8(0x5000), 0xFF);
}

#[test]
fn test_unmapped_write_is_dropped() {
    let mut bus = Bus::new();
    let ram = map_ram(&mut bus, 0x1000, 0x100);

    bus.write8(0x5000, 0x12);

    assert_eq!(bus.read8(0x5000), 0xFF);
    assert_eq!(ram.borrow().read(0x1000), 0x00);
}

#[test]
fn test_words_are_little_endian() {
    let mut bus = Bus::new();
    map_ram(&mut bus, 0xC000, 0x100);

    bus.write8(0xC000, 0x34);
    bus.write8(0xC001, 0x12);
    assert_eq!(bus.read16(0xC000), 0x1234);

    bus.write16(0xC010, 0xBEEF);
    assert_eq!(bus.read8(0xC010), 0xEF);
    assert_eq!(bus.read8(0xC011), 0xBE);
}

#[test]
fn test_word_access_wraps_at_top_of_address_space() {
    let mut bus = Bus::new();
    map_ram(&mut bus, 0xFFF0, 0x10);
    map_ram(&mut bus, 0x0000, 0x10);

    bus.write16(0xFFFF, 0xABCD);
    assert_eq!(bus.read8(0xFFFF), 0xCD);
    assert_eq!(bus.read8(0x0000), 0xAB);
    assert_eq!(bus.read16(0xFFFF), 0xABCD);
}

#[test]
#[should_panic(expected = "overlaps")]
fn test_overlapping_registration_panics() {
    let mut bus = Bus::new();
    map_ram(&mut bus, 0x1000, 0x100);
    map_ram(&mut bus, 0x10FF, 0x10);
}

#[test]
#[should_panic(expected = "inverted")]
fn test_inverted_range_panics() {
    let mut bus = Bus::new();
    let ram = Rc::new(RefCell::new(Ram::new(0x1000, 0x100)));
    bus.register(ram, 0x10FF, 0x1000);
}

#[test]
fn test_ram_reports_its_range() {
    let ram = Ram::new(0xFF10, 0x30);
    assert_eq!(ram.first_address(), 0xFF10);
    assert_eq!(ram.last_address(), 0xFF3F);
    assert_eq!(ram.len(), 48);
}

#[test]
fn test_ram_load_places_bytes_at_absolute_addresses() {
    let mut bus = Bus::new();
    let ram = map_ram(&mut bus, 0xC000, 0x100);
    ram.borrow_mut().load(0xC020, &[0x11, 0x22, 0x33]);

    assert_eq!(bus.read8(0xC020), 0x11);
    assert_eq!(bus.read8(0xC021), 0x22);
    assert_eq!(bus.read8(0xC022), 0x33);
}

#[test]
#[should_panic(expected = "outside window")]
fn test_ram_out_of_window_access_asserts() {
    let ram = Ram::new(0xC000, 0x100);
    ram.read(0xBFFF);
}
