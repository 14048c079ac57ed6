//! Byte-addressable persistent store (EEPROM) driver interface

/// A store written one byte at a time.
pub trait ByteStore {
    /// Block until no write is in progress.
    fn wait_ready(&mut self) {}

    fn read(&mut self, address: u16) -> u8;

    /// Start writing one byte. The caller decides whether the write is needed.
    fn write(&mut self, address: u16, value: u8);
}

impl<T: ByteStore + ?Sized> ByteStore for &mut T {
    fn wait_ready(&mut self) {
        (**self).wait_ready()
    }

    fn read(&mut self, address: u16) -> u8 {
        (**self).read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        (**self).write(address, value)
    }
}
