//! Program memory side of PROG_PAGE / READ_PAGE

use embedded_hal::serial;
use embedded_hal::watchdog::Watchdog;
use ufmt::derive::uDebug;
use ufmt::uWrite;

use super::{Fault, Programmer, VectorShadow};
use crate::device::Device;
use crate::drivers::{ByteStore, FlashAddress, ProgramMemory};

#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Erasable while the programmer keeps executing.
    ReadWhileWrite,
    /// Shares the flash section the programmer executes from.
    NoReadWhileWrite,
}

pub const fn classify(device: &Device, address: FlashAddress) -> Region {
    if device.is_read_while_write(address.linear()) {
        Region::ReadWhileWrite
    } else {
        Region::NoReadWhileWrite
    }
}

impl<S, W, F, E, L> Programmer<S, W, F, E, L>
where
    S: serial::Read<u8> + serial::Write<u8>,
    W: Watchdog,
    F: ProgramMemory,
    E: ByteStore,
    L: uWrite,
{
    /// PROG_PAGE into flash at the session address. The address is not
    /// advanced; hosts send LOAD_ADDRESS before every page.
    pub(crate) fn program_flash(&mut self, length: usize) -> Result<(), Fault> {
        let device = self.config.device;
        let target = self.address;
        let mut erased = false;

        // RWW pages erase in hardware while the payload streams in.
        if classify(&device, target) == Region::ReadWhileWrite {
            self.flash.erase_page(target);
            self.trace.erase(target, false);
            erased = true;
        }

        self.link.receive_into(self.page.head_mut(length));

        let protected = device.is_programmer_image(target.linear());
        if !erased && !protected {
            self.flash.erase_page(target);
            self.trace.erase(target, true);
        }

        self.link.verify_space()?;

        if protected {
            self.trace.protected(target);
            return Ok(());
        }
        self.commit(target);
        Ok(())
    }

    /// Copy the page buffer into flash at `target`.
    fn commit(&mut self, target: FlashAddress) {
        let device = self.config.device;

        // A short payload can get here before the erase finished.
        self.flash.wait_ready();

        if self.config.redirect && target.linear() == 0 {
            let shadow = VectorShadow::install(&mut self.page, device.boot_start);
            self.trace.redirect(&shadow);
            self.shadow = Some(shadow);
        }

        let mut address = target;
        for word in self.page.words() {
            self.flash.fill_word(address, word);
            address = address.word_offset(1);
        }
        self.flash.write_page(target);
        self.flash.wait_ready();

        if device.rww_reenable {
            self.flash.enable_rww();
        }
        self.trace.commit(target);
    }

    /// READ_PAGE from flash, advancing the session address per byte.
    pub(crate) fn read_flash(&mut self, length: usize) -> Result<(), Fault> {
        self.link.verify_space()?;

        let shadow = if self.config.redirect { self.shadow } else { None };
        for _ in 0..length {
            let address = self.address;
            let original = match shadow {
                Some(shadow) if address.bank == 0 => shadow.byte_at(address.offset),
                _ => None,
            };
            let byte = match original {
                Some(byte) => byte,
                None => self.flash.read_byte(address),
            };
            self.link.putch(byte);
            self.address.advance();
        }
        Ok(())
    }
}
