//! EEPROM side of PROG_PAGE / READ_PAGE

use embedded_hal::serial;
use embedded_hal::watchdog::Watchdog;
use ufmt::uWrite;

use super::{Fault, Programmer};
use crate::drivers::{ByteStore, ProgramMemory};

/// Write `value` unless the store already holds it. Returns whether a
/// physical write was started.
pub fn write_if_changed<E: ByteStore>(store: &mut E, address: u16, value: u8) -> bool {
    store.wait_ready();
    if store.read(address) == value {
        return false;
    }
    store.write(address, value);
    true
}

impl<S, W, F, E, L> Programmer<S, W, F, E, L>
where
    S: serial::Read<u8> + serial::Write<u8>,
    W: Watchdog,
    F: ProgramMemory,
    E: ByteStore,
    L: uWrite,
{
    /// LOAD_ADDRESS doubled the address for flash; EEPROM addresses are byte
    /// addresses on the wire, so undo that once. From here on the cursor
    /// counts EEPROM bytes.
    fn enter_eeprom_addressing(&mut self) {
        self.address.offset >>= 1;
    }

    /// Cell under the cursor. EEAR has no bits above the part's size, so
    /// larger addresses wrap.
    fn eeprom_cell(&self) -> u16 {
        self.address.offset % self.config.device.eeprom_size
    }

    pub(crate) fn program_eeprom(&mut self, length: usize) -> Result<(), Fault> {
        self.link.receive_into(self.page.head_mut(length));
        self.link.verify_space()?;

        self.enter_eeprom_addressing();
        for i in 0..length {
            let value = self.page.head(length)[i];
            let cell = self.eeprom_cell();
            write_if_changed(&mut self.eeprom, cell, value);
            self.address.advance();
        }
        Ok(())
    }

    pub(crate) fn read_eeprom(&mut self, length: usize) -> Result<(), Fault> {
        self.enter_eeprom_addressing();
        self.link.verify_space()?;

        for _ in 0..length {
            let cell = self.eeprom_cell();
            let byte = self.eeprom.read(cell);
            self.link.putch(byte);
            self.address.advance();
        }
        Ok(())
    }
}
