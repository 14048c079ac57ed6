//! Program memory (self-programmable flash) driver interface

/// Byte address into program memory, split the way SPM and ELPM see it:
/// a 16-bit offset in Z plus the RAMPZ bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlashAddress {
    pub offset: u16,
    pub bank: u8,
}

impl FlashAddress {
    pub const fn new(offset: u16, bank: u8) -> Self {
        Self { offset, bank }
    }

    /// Translate a word address from the wire. The bank bit is the top bit of
    /// the word address, taken before the doubling shifts it out.
    pub const fn from_word(word: u16, extended: bool) -> Self {
        let bank = if extended { (word >> 15) as u8 } else { 0 };
        Self {
            offset: word << 1,
            bank,
        }
    }

    pub const fn from_linear(linear: u32) -> Self {
        Self {
            offset: linear as u16,
            bank: (linear >> 16) as u8,
        }
    }

    pub const fn linear(self) -> u32 {
        ((self.bank as u32) << 16) | self.offset as u32
    }

    /// Step one byte. The bank is a separate register and never carries.
    pub fn advance(&mut self) {
        self.offset = self.offset.wrapping_add(1);
    }

    pub const fn word_offset(self, words: u16) -> Self {
        Self {
            offset: self.offset.wrapping_add(words.wrapping_mul(2)),
            bank: self.bank,
        }
    }
}

/// Raw page operations of a self-programmable flash.
///
/// Erase and write only start the operation; completion is observed through
/// `is_busy`. Nothing here feeds the watchdog, so a flash that never
/// completes ends in a watchdog reset.
pub trait ProgramMemory {
    /// Start erasing the page holding `page`.
    fn erase_page(&mut self, page: FlashAddress);

    /// Load one little-endian word into the temporary page buffer.
    fn fill_word(&mut self, address: FlashAddress, word: u16);

    /// Start programming the temporary page buffer into the page at `page`.
    fn write_page(&mut self, page: FlashAddress);

    fn is_busy(&mut self) -> bool;

    fn wait_ready(&mut self) {
        while self.is_busy() {}
    }

    /// Make the read-while-write section readable again after SPM.
    fn enable_rww(&mut self);

    fn read_byte(&mut self, address: FlashAddress) -> u8;
}

impl<T: ProgramMemory + ?Sized> ProgramMemory for &mut T {
    fn erase_page(&mut self, page: FlashAddress) {
        (**self).erase_page(page)
    }

    fn fill_word(&mut self, address: FlashAddress, word: u16) {
        (**self).fill_word(address, word)
    }

    fn write_page(&mut self, page: FlashAddress) {
        (**self).write_page(page)
    }

    fn is_busy(&mut self) -> bool {
        (**self).is_busy()
    }

    fn wait_ready(&mut self) {
        (**self).wait_ready()
    }

    fn enable_rww(&mut self) {
        (**self).enable_rww()
    }

    fn read_byte(&mut self, address: FlashAddress) -> u8 {
        (**self).read_byte(address)
    }
}
