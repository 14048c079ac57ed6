//! On-chip EEPROM of the ATmega128

use avr_device::atmega128a::EEPROM;

use crate::drivers::ByteStore;

const EERE: u8 = 1 << 0;
const EEWE: u8 = 1 << 1;
const EEMWE: u8 = 1 << 2;

pub struct Eeprom {
    _private: (),
}

impl Eeprom {
    pub fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    fn control() -> u8 {
        unsafe { (*EEPROM::ptr()).eecr.read().bits() }
    }
}

impl Default for Eeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStore for Eeprom {
    fn wait_ready(&mut self) {
        while Self::control() & EEWE != 0 {}
    }

    fn read(&mut self, address: u16) -> u8 {
        self.wait_ready();
        unsafe {
            let p = EEPROM::ptr();
            (*p).eear.write(|w| w.bits(address));
            (*p).eecr.write(|w| w.bits(EERE));
            (*p).eedr.read().bits()
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        self.wait_ready();
        unsafe {
            let p = EEPROM::ptr();
            (*p).eear.write(|w| w.bits(address));
            (*p).eedr.write(|w| w.bits(value));
            // EEWE must follow EEMWE within four cycles; interrupts are off.
            (*p).eecr.write(|w| w.bits(EEMWE));
            (*p).eecr.write(|w| w.bits(EEMWE | EEWE));
        }
    }
}
